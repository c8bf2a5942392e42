//! Committee governance module for ICN
//!
//! Committees are fixed groups of members holding a set of permissions. A
//! member submits a proposal, other members vote on it, and once enough of
//! them have voted the proposal's content is enacted through a handler
//! registered for its route. Proposals that miss their deadline are swept at
//! the start of each block.
//!
//! Everything here is deterministic: state is only touched through the
//! [`icn_core::Context`] passed into each call, thresholds are compared in
//! exact decimal arithmetic, and every iteration walks keys in order. Handler
//! panics are caught and reported as errors.

pub mod abci;
pub mod error;
pub mod genesis;
pub mod handler;
pub mod keeper;
pub mod msgs;
pub mod router;
pub mod types;

pub use error::{GovernanceError, GovernanceResult};
pub use genesis::{export_genesis, init_genesis, GenesisState};
pub use handler::{handle_msg, MsgOutcome};
pub use keeper::Keeper;
pub use msgs::{Msg, MsgSubmitProposal, MsgVote};
pub use router::{Handler, Router};
pub use types::{
    Address, AllowedParam, CloseStatus, Committee, CommitteePermission, ParamChange, Permission,
    Proposal, ProposalContent, PubProposal, Vote,
};

/// Keeper over the standard content and permission types
pub type StandardKeeper = Keeper<ProposalContent, CommitteePermission>;
/// Router over the standard content type
pub type StandardRouter = Router<ProposalContent>;
/// Genesis over the standard content and permission types
pub type StandardGenesis = GenesisState<ProposalContent, CommitteePermission>;
