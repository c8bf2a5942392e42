use std::collections::BTreeSet;
use std::time::Duration;

use icn_core::utils::serialization::duration_secs;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Address, Permission};
use crate::{GovernanceError, GovernanceResult};

pub const MAX_COMMITTEE_DESCRIPTION_LENGTH: usize = 512;

/// A group of members allowed to enact a restricted set of proposals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Committee<P> {
    pub id: u64,
    #[serde(default)]
    pub description: String,
    pub members: BTreeSet<Address>,
    pub permissions: Vec<P>,
    /// Fraction of members whose votes are needed, in (0, 1]
    pub vote_threshold: Decimal,
    #[serde(with = "duration_secs")]
    pub proposal_duration: Duration,
}

impl<P> Committee<P> {
    pub fn new(
        id: u64,
        description: impl Into<String>,
        members: impl IntoIterator<Item = Address>,
        permissions: Vec<P>,
        vote_threshold: Decimal,
        proposal_duration: Duration,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            members: members.into_iter().collect(),
            permissions,
            vote_threshold,
            proposal_duration,
        }
    }

    pub fn has_member(&self, address: &Address) -> bool {
        self.members.contains(address)
    }

    /// True if any of the committee's permissions allows the content
    pub fn has_permissions_for<C>(&self, content: &C) -> bool
    where
        P: Permission<C>,
    {
        self.permissions.iter().any(|permission| permission.allows(content))
    }

    pub fn validate(&self) -> GovernanceResult<()> {
        if self.members.is_empty() {
            return Err(GovernanceError::InvalidCommittee(format!(
                "committee {} has no members",
                self.id
            )));
        }
        for member in &self.members {
            member.validate()?;
        }
        if self.description.len() > MAX_COMMITTEE_DESCRIPTION_LENGTH {
            return Err(GovernanceError::InvalidCommittee(format!(
                "description length {} longer than max allowed {}",
                self.description.len(),
                MAX_COMMITTEE_DESCRIPTION_LENGTH
            )));
        }
        if self.vote_threshold <= Decimal::ZERO || self.vote_threshold > Decimal::ONE {
            return Err(GovernanceError::InvalidCommittee(format!(
                "invalid threshold {}, must be in (0, 1]",
                self.vote_threshold
            )));
        }
        if self.proposal_duration.is_zero() {
            return Err(GovernanceError::InvalidCommittee(
                "proposal duration must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
