//! Governance data types

pub mod address;
pub mod committee;
pub mod content;
pub mod events;
pub mod keys;
pub mod permissions;
pub mod proposal;

pub use address::Address;
pub use committee::{Committee, MAX_COMMITTEE_DESCRIPTION_LENGTH};
pub use content::{ParamChange, ProposalContent, UpgradePlan};
pub use permissions::{AllowedParam, CommitteePermission, Permission};
pub use proposal::{CloseStatus, Proposal, PubProposal, Vote};

/// Module name used in events and store namespacing
pub const MODULE_NAME: &str = "committee";

/// Proposal ids start here unless genesis says otherwise
pub const DEFAULT_NEXT_PROPOSAL_ID: u64 = 1;
