//! ICN committee governance engine
//!
//! Wires the committee module to the reference proposal handlers and runs
//! scenarios block by block over an in-memory store.

pub mod handlers;
pub mod scenario;

pub use handlers::{gov_handler, param_key, params_handler, standard_router, upgrade_handler};
pub use scenario::{
    load_genesis, run_scenario, Block, BlockOutput, EventRecord, MsgResult, Runner, Scenario,
    ScenarioError, ScenarioReport,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
