//! Core ICN module
//!
//! This module provides the state machine primitives shared by the ICN
//! governance crates: ordered key/value storage, copy-on-write overlays and
//! the per-transition execution context.

pub mod context;
pub mod storage;
pub mod utils;

// Re-export key components
pub use context::{Attribute, Context, Event, EventManager};
pub use storage::{
    CacheStore, ChangeSet, JsonStore, KVStore, MemoryStore, StorageError, StorageResult,
};

/// Block timestamps are always UTC
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Package description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Initialize tracing for ICN
///
/// `RUST_LOG` takes precedence over `default_level` when set.
pub fn init_tracing(default_level: &str) {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    // Set the subscriber as the global default
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global tracing subscriber");
}
