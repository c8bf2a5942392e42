//! Transaction messages handled by the committee module

use serde::{Deserialize, Serialize};

use crate::types::{Address, PubProposal};
use crate::{GovernanceError, GovernanceResult};

/// Submit `pub_proposal` to a committee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsgSubmitProposal<C> {
    pub proposer: Address,
    pub committee_id: u64,
    /// Absent content is representable on the wire and rejected here
    pub pub_proposal: Option<C>,
}

impl<C: PubProposal> MsgSubmitProposal<C> {
    pub fn new(proposer: Address, committee_id: u64, pub_proposal: C) -> Self {
        Self {
            proposer,
            committee_id,
            pub_proposal: Some(pub_proposal),
        }
    }

    pub fn validate_basic(&self) -> GovernanceResult<()> {
        let content = self.pub_proposal.as_ref().ok_or_else(|| {
            GovernanceError::InvalidPubProposal("pub proposal cannot be empty".to_string())
        })?;
        self.proposer.validate()?;
        content.validate_basic()
    }
}

/// Vote yes on a proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgVote {
    pub proposal_id: u64,
    pub voter: Address,
}

impl MsgVote {
    pub fn new(proposal_id: u64, voter: Address) -> Self {
        Self { proposal_id, voter }
    }

    pub fn validate_basic(&self) -> GovernanceResult<()> {
        self.voter.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Msg<C> {
    SubmitProposal(MsgSubmitProposal<C>),
    Vote(MsgVote),
}

impl<C: PubProposal> Msg<C> {
    /// Address that signed the message
    pub fn signer(&self) -> &Address {
        match self {
            Msg::SubmitProposal(msg) => &msg.proposer,
            Msg::Vote(msg) => &msg.voter,
        }
    }

    pub fn validate_basic(&self) -> GovernanceResult<()> {
        match self {
            Msg::SubmitProposal(msg) => msg.validate_basic(),
            Msg::Vote(msg) => msg.validate_basic(),
        }
    }
}
