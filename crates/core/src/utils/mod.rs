//! Utility functions for ICN
//!
//! Helpers shared by the governance crates.

pub mod serialization;
