//! Genesis import and export for the committee module

use std::collections::{BTreeMap, BTreeSet};

use icn_core::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::keeper::Keeper;
use crate::types::{Committee, Permission, Proposal, PubProposal, Vote, DEFAULT_NEXT_PROPOSAL_ID};
use crate::{GovernanceError, GovernanceResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "C: Deserialize<'de>, P: Deserialize<'de>"))]
pub struct GenesisState<C, P> {
    #[serde(default = "default_next_proposal_id")]
    pub next_proposal_id: u64,
    #[serde(default)]
    pub committees: Vec<Committee<P>>,
    #[serde(default)]
    pub proposals: Vec<Proposal<C>>,
    #[serde(default)]
    pub votes: Vec<Vote>,
}

fn default_next_proposal_id() -> u64 {
    DEFAULT_NEXT_PROPOSAL_ID
}

impl<C, P> Default for GenesisState<C, P> {
    fn default() -> Self {
        Self {
            next_proposal_id: DEFAULT_NEXT_PROPOSAL_ID,
            committees: Vec::new(),
            proposals: Vec::new(),
            votes: Vec::new(),
        }
    }
}

impl<C, P> GenesisState<C, P>
where
    C: PubProposal,
    P: Permission<C>,
{
    pub fn new(
        next_proposal_id: u64,
        committees: Vec<Committee<P>>,
        proposals: Vec<Proposal<C>>,
        votes: Vec<Vote>,
    ) -> Self {
        Self {
            next_proposal_id,
            committees,
            proposals,
            votes,
        }
    }

    /// Stateless checks on the whole genesis state
    pub fn validate(&self) -> GovernanceResult<()> {
        let mut committees = BTreeMap::new();
        for com in &self.committees {
            if committees.insert(com.id, com).is_some() {
                return Err(invalid(format!(
                    "duplicate committee ID found in genesis state; id: {}",
                    com.id
                )));
            }
            com.validate()?;
        }

        let mut proposals = BTreeMap::new();
        for proposal in &self.proposals {
            if proposals.insert(proposal.id, proposal).is_some() {
                return Err(invalid(format!(
                    "duplicate proposal ID found in genesis state; id: {}",
                    proposal.id
                )));
            }
            if proposal.id >= self.next_proposal_id {
                return Err(invalid(format!(
                    "proposal id {} is not less than the next proposal id {}",
                    proposal.id, self.next_proposal_id
                )));
            }
            if !committees.contains_key(&proposal.committee_id) {
                return Err(invalid(format!(
                    "proposal {} refers to unknown committee {}",
                    proposal.id, proposal.committee_id
                )));
            }
            proposal.content.validate_basic()?;
        }

        let mut seen_votes = BTreeSet::new();
        for vote in &self.votes {
            let proposal = proposals.get(&vote.proposal_id).ok_or_else(|| {
                invalid(format!("vote refers to unknown proposal {}", vote.proposal_id))
            })?;
            // every proposal was checked against the committee map above
            let com = committees.get(&proposal.committee_id).ok_or_else(|| {
                invalid(format!("proposal {} refers to unknown committee", proposal.id))
            })?;
            if !com.has_member(&vote.voter) {
                return Err(invalid(format!(
                    "voter {} on proposal {} is not a member of committee {}",
                    vote.voter, proposal.id, com.id
                )));
            }
            if !seen_votes.insert((vote.proposal_id, vote.voter.clone())) {
                return Err(invalid(format!(
                    "duplicate vote by {} on proposal {}",
                    vote.voter, vote.proposal_id
                )));
            }
        }
        Ok(())
    }
}

fn invalid(msg: String) -> GovernanceError {
    GovernanceError::InvalidGenesis(msg)
}

/// Load a genesis state into the store.
///
/// # Panics
///
/// Panics if the genesis state is invalid. A node cannot run correctly from a
/// bad genesis, so this is not reported as an ordinary error.
pub fn init_genesis<C, P>(
    ctx: &mut Context<'_>,
    keeper: &Keeper<C, P>,
    genesis: &GenesisState<C, P>,
) -> GovernanceResult<()>
where
    C: PubProposal,
    P: Permission<C>,
{
    if let Err(err) = genesis.validate() {
        panic!("failed to validate committee genesis state: {}", err);
    }

    keeper.set_next_proposal_id(ctx, genesis.next_proposal_id)?;
    for com in &genesis.committees {
        keeper.set_committee(ctx, com)?;
    }
    for proposal in &genesis.proposals {
        keeper.set_proposal(ctx, proposal)?;
    }
    for vote in &genesis.votes {
        keeper.set_vote(ctx, vote)?;
    }

    info!(
        "Initialized committee genesis: {} committees, {} proposals, {} votes",
        genesis.committees.len(),
        genesis.proposals.len(),
        genesis.votes.len()
    );
    Ok(())
}

/// Dump the module's state
pub fn export_genesis<C, P>(
    ctx: &Context<'_>,
    keeper: &Keeper<C, P>,
) -> GovernanceResult<GenesisState<C, P>>
where
    C: PubProposal,
    P: Permission<C>,
{
    let mut votes = Vec::new();
    keeper.iterate_all_votes(ctx, |vote| {
        votes.push(vote);
        false
    })?;

    Ok(GenesisState::new(
        keeper.get_next_proposal_id(ctx)?,
        keeper.get_committees(ctx)?,
        keeper.get_proposals(ctx)?,
        votes,
    ))
}
