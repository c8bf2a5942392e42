//! Committee keeper
//!
//! The keeper owns the committee module's keyspace. It holds no state of its
//! own besides the sealed handler router: every operation reads and writes
//! through the [`icn_core::Context`] it is given.

use std::marker::PhantomData;

use icn_core::{KVStore, StorageError};
use serde::de::DeserializeOwned;

use crate::router::Router;
use crate::types::{Permission, PubProposal};
use crate::GovernanceResult;

mod committee;
mod proposal;
mod proposal_store;
mod votes;

pub struct Keeper<C, P> {
    router: Router<C>,
    _permission: PhantomData<fn() -> P>,
}

impl<C, P> Keeper<C, P>
where
    C: PubProposal,
    P: Permission<C>,
{
    /// Build a keeper over `router`, sealing it
    pub fn new(mut router: Router<C>) -> Self {
        router.seal();
        Self {
            router,
            _permission: PhantomData,
        }
    }
}

/// Decode every value under `prefix` in key order, stopping when `visit`
/// returns `true`.
fn iterate_json<T, F>(store: &dyn KVStore, prefix: &[u8], mut visit: F) -> GovernanceResult<()>
where
    T: DeserializeOwned,
    F: FnMut(T) -> bool,
{
    for (_, value) in store.iter_prefix(prefix)? {
        let item: T = serde_json::from_slice(&value).map_err(StorageError::from)?;
        if visit(item) {
            break;
        }
    }
    Ok(())
}

