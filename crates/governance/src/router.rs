//! Proposal handler routing
//!
//! Handlers are registered per route key before the keeper is built. The
//! keeper seals its router, so the set of routes is fixed for the lifetime of
//! the state machine.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use icn_core::Context;

use crate::{GovernanceError, GovernanceResult};

/// Applies a proposal's content to state
pub type Handler<C> = Box<dyn Fn(&mut Context<'_>, &C) -> GovernanceResult<()> + Send + Sync>;

pub struct Router<C> {
    routes: BTreeMap<String, Handler<C>>,
    sealed: bool,
}

impl<C> Router<C> {
    pub fn new() -> Self {
        Self {
            routes: BTreeMap::new(),
            sealed: false,
        }
    }

    /// Register `handler` for `route`. Routes are non-empty ASCII alphanumeric
    /// strings and may only be registered once.
    pub fn add_route<F>(&mut self, route: &str, handler: F) -> GovernanceResult<&mut Self>
    where
        F: Fn(&mut Context<'_>, &C) -> GovernanceResult<()> + Send + Sync + 'static,
    {
        if self.sealed {
            return Err(GovernanceError::Router(
                "router sealed; cannot add route handler".to_string(),
            ));
        }
        if route.is_empty() || !route.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(GovernanceError::Router(format!(
                "route expressions can only contain alphanumeric characters: {:?}",
                route
            )));
        }
        if self.routes.contains_key(route) {
            return Err(GovernanceError::Router(format!(
                "route {} has already been initialized",
                route
            )));
        }
        self.routes.insert(route.to_string(), Box::new(handler));
        Ok(self)
    }

    pub fn has_route(&self, route: &str) -> bool {
        self.routes.contains_key(route)
    }

    pub fn get_route(&self, route: &str) -> Option<&Handler<C>> {
        self.routes.get(route)
    }

    /// Registered route keys in order
    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }
}

impl<C> Default for Router<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a handler, turning a panic into `Err(message)`.
///
/// The caller owns `ctx`; whatever the handler wrote before panicking is left
/// there, which is why handlers are only ever invoked over a cache store.
pub(crate) fn call_guarded<C>(
    handler: &Handler<C>,
    ctx: &mut Context<'_>,
    content: &C,
) -> Result<GovernanceResult<()>, String> {
    panic::catch_unwind(AssertUnwindSafe(|| handler(ctx, content)))
        .map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
