//! Execution context for a single state transition
//!
//! A [`Context`] carries everything an operation may touch: the state store,
//! the block height and time supplied by the ledger, and an append-only event
//! list. Nothing is read from the system clock.

use serde::{Deserialize, Serialize};

use crate::storage::KVStore;
use crate::Timestamp;

/// A key/value attribute attached to an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

/// An observability event emitted by a state transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event type, e.g. `proposal_submit`
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: Vec<Attribute>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    /// Append an attribute, keeping insertion order
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push(Attribute {
            key: key.into(),
            value: value.to_string(),
        });
        self
    }

    /// First value recorded for `key`
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }
}

/// Append-only event sink
#[derive(Debug, Clone, Default)]
pub struct EventManager {
    events: Vec<Event>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Drain all events collected so far
    pub fn take(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

/// State handle passed into every governance operation
pub struct Context<'a> {
    store: &'a mut dyn KVStore,
    block_height: u64,
    block_time: Timestamp,
    events: EventManager,
}

impl<'a> Context<'a> {
    pub fn new(store: &'a mut dyn KVStore, block_height: u64, block_time: Timestamp) -> Self {
        Self {
            store,
            block_height,
            block_time,
            events: EventManager::new(),
        }
    }

    /// Create a context over a different store with the same block header and
    /// an empty event list. Used to run code against a [`crate::storage::CacheStore`].
    pub fn branch<'b>(&self, store: &'b mut dyn KVStore) -> Context<'b> {
        Context::new(store, self.block_height, self.block_time)
    }

    pub fn store(&self) -> &dyn KVStore {
        &*self.store
    }

    pub fn store_mut(&mut self) -> &mut dyn KVStore {
        &mut *self.store
    }

    pub fn block_height(&self) -> u64 {
        self.block_height
    }

    pub fn block_time(&self) -> Timestamp {
        self.block_time
    }

    pub fn events(&self) -> &EventManager {
        &self.events
    }

    pub fn emit_event(&mut self, event: Event) {
        self.events.emit(event);
    }

    /// Append events collected by a branched context
    pub fn emit_events(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    /// Drain the events emitted so far, for the caller to flush
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take()
    }
}
