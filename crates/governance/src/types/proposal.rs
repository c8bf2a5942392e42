use std::fmt;

use icn_core::Timestamp;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::Address;
use crate::GovernanceResult;

/// An opaque description of a proposed state change.
///
/// Content is routed to a handler by [`PubProposal::proposal_route`]. New
/// kinds of content are added by implementing this trait and registering a
/// handler for the route, never by changing the engine.
pub trait PubProposal: Clone + fmt::Debug + Serialize + DeserializeOwned {
    /// Router key of the handler that enacts this content
    fn proposal_route(&self) -> &str;

    /// Human readable kind, used in error messages
    fn proposal_type(&self) -> &str;

    /// Stateless checks
    fn validate_basic(&self) -> GovernanceResult<()>;
}

/// A proposal awaiting votes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal<C> {
    pub id: u64,
    pub committee_id: u64,
    pub content: C,
    pub deadline: Timestamp,
}

impl<C: PubProposal> Proposal<C> {
    pub fn new(id: u64, committee_id: u64, content: C, deadline: Timestamp) -> Self {
        Self {
            id,
            committee_id,
            content,
            deadline,
        }
    }

    pub fn proposal_route(&self) -> &str {
        self.content.proposal_route()
    }

    /// A proposal has expired once block time reaches its deadline
    pub fn has_expired_by(&self, time: Timestamp) -> bool {
        time >= self.deadline
    }
}

/// A yes vote. Its presence is the whole signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub proposal_id: u64,
    pub voter: Address,
}

impl Vote {
    pub fn new(proposal_id: u64, voter: Address) -> Self {
        Self { proposal_id, voter }
    }
}

/// Why a proposal left the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseStatus {
    /// Enough votes and the handler succeeded
    Passed,
    /// Enough votes but the handler failed
    Failed,
    /// Deadline reached
    Timeout,
}

impl CloseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseStatus::Passed => "proposal_passed",
            CloseStatus::Failed => "proposal_failed",
            CloseStatus::Timeout => "proposal_timeout",
        }
    }
}

impl fmt::Display for CloseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProposalContent;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_has_expired_by_is_inclusive() {
        let deadline = Utc.timestamp_opt(100, 0).unwrap();
        let proposal = Proposal::new(1, 1, ProposalContent::text("title", "description"), deadline);

        assert!(!proposal.has_expired_by(Utc.timestamp_opt(99, 0).unwrap()));
        assert!(proposal.has_expired_by(deadline));
        assert!(proposal.has_expired_by(Utc.timestamp_opt(101, 0).unwrap()));
    }
}
