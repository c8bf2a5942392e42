use icn_core::{Context, JsonStore};

use super::{iterate_json, Keeper};
use crate::types::keys;
use crate::types::{Address, Permission, PubProposal, Vote};
use crate::GovernanceResult;

impl<C, P> Keeper<C, P>
where
    C: PubProposal,
    P: Permission<C>,
{
    pub fn get_vote(
        &self,
        ctx: &Context<'_>,
        proposal_id: u64,
        voter: &Address,
    ) -> GovernanceResult<Option<Vote>> {
        Ok(ctx.store().get_json(&keys::vote_key(proposal_id, voter))?)
    }

    /// Store a vote, overwriting any earlier vote by the same voter
    pub fn set_vote(&self, ctx: &mut Context<'_>, vote: &Vote) -> GovernanceResult<()> {
        ctx.store_mut()
            .set_json(&keys::vote_key(vote.proposal_id, &vote.voter), vote)?;
        Ok(())
    }

    pub fn delete_vote(
        &self,
        ctx: &mut Context<'_>,
        proposal_id: u64,
        voter: &Address,
    ) -> GovernanceResult<()> {
        ctx.store_mut().delete(&keys::vote_key(proposal_id, voter))?;
        Ok(())
    }

    /// Visit the votes on one proposal in voter order
    pub fn iterate_votes<F>(
        &self,
        ctx: &Context<'_>,
        proposal_id: u64,
        visit: F,
    ) -> GovernanceResult<()>
    where
        F: FnMut(Vote) -> bool,
    {
        iterate_json(ctx.store(), &keys::votes_key_prefix(proposal_id), visit)
    }

    /// Visit every vote on every proposal
    pub fn iterate_all_votes<F>(&self, ctx: &Context<'_>, visit: F) -> GovernanceResult<()>
    where
        F: FnMut(Vote) -> bool,
    {
        iterate_json(ctx.store(), keys::VOTE_KEY_PREFIX, visit)
    }

    pub fn get_votes_by_proposal(
        &self,
        ctx: &Context<'_>,
        proposal_id: u64,
    ) -> GovernanceResult<Vec<Vote>> {
        let mut votes = Vec::new();
        self.iterate_votes(ctx, proposal_id, |vote| {
            votes.push(vote);
            false
        })?;
        Ok(votes)
    }

    /// Count the votes cast on a proposal
    pub fn tally_votes(&self, ctx: &Context<'_>, proposal_id: u64) -> GovernanceResult<u64> {
        let mut count = 0u64;
        self.iterate_votes(ctx, proposal_id, |_| {
            count += 1;
            false
        })?;
        Ok(count)
    }
}
