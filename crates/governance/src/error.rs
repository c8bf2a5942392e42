use icn_core::{StorageError, Timestamp};
use thiserror::Error;

/// Error types for governance operations
#[derive(Error, Debug)]
pub enum GovernanceError {
    /// No committee is stored under the id
    #[error("Unknown committee: {0}")]
    UnknownCommittee(u64),

    /// No proposal is stored under the id
    #[error("Unknown proposal: {0}")]
    UnknownProposal(u64),

    /// Caller is not a member, or the committee lacks the permission
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Proposal expired at {deadline}, current time is {now}")]
    ProposalExpired { now: Timestamp, deadline: Timestamp },

    /// Content failed validation, has no handler, or its dry run failed
    #[error("Invalid pub proposal: {0}")]
    InvalidPubProposal(String),

    /// An enactment handler returned an error or panicked
    #[error("Proposal handler error: {0}")]
    HandlerError(String),

    #[error("Invalid committee: {0}")]
    InvalidCommittee(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid genesis state: {0}")]
    InvalidGenesis(String),

    #[error("Router error: {0}")]
    Router(String),

    /// Error with storage
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

/// Result type for governance operations
pub type GovernanceResult<T> = Result<T, GovernanceError>;
