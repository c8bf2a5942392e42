use icn_core::{Context, JsonStore, StorageError, Timestamp};
use tracing::debug;

use super::{iterate_json, Keeper};
use crate::types::keys;
use crate::types::{Permission, Proposal, PubProposal};
use crate::{GovernanceError, GovernanceResult};

impl<C, P> Keeper<C, P>
where
    C: PubProposal,
    P: Permission<C>,
{
    /// The id the next stored proposal will receive. Genesis must have set it.
    pub fn get_next_proposal_id(&self, ctx: &Context<'_>) -> GovernanceResult<u64> {
        ctx.store()
            .get_json::<u64>(keys::NEXT_PROPOSAL_ID_KEY)?
            .ok_or_else(|| {
                GovernanceError::InvalidGenesis("initial proposal ID hasn't been set".to_string())
            })
    }

    pub fn set_next_proposal_id(
        &self,
        ctx: &mut Context<'_>,
        proposal_id: u64,
    ) -> GovernanceResult<()> {
        ctx.store_mut().set_json(keys::NEXT_PROPOSAL_ID_KEY, &proposal_id)?;
        Ok(())
    }

    /// Allocate the next id, persist the proposal and advance the counter
    pub fn store_new_proposal(
        &self,
        ctx: &mut Context<'_>,
        content: C,
        committee_id: u64,
        deadline: Timestamp,
    ) -> GovernanceResult<u64> {
        let proposal_id = self.get_next_proposal_id(ctx)?;
        let next_id = proposal_id
            .checked_add(1)
            .ok_or_else(|| StorageError::Other("proposal ID space exhausted".to_string()))?;

        let proposal = Proposal::new(proposal_id, committee_id, content, deadline);
        self.set_proposal(ctx, &proposal)?;
        self.set_next_proposal_id(ctx, next_id)?;

        debug!("Stored proposal {} for committee {}", proposal_id, committee_id);
        Ok(proposal_id)
    }

    pub fn get_proposal(
        &self,
        ctx: &Context<'_>,
        proposal_id: u64,
    ) -> GovernanceResult<Option<Proposal<C>>> {
        Ok(ctx.store().get_json(&keys::proposal_key(proposal_id))?)
    }

    pub fn set_proposal(
        &self,
        ctx: &mut Context<'_>,
        proposal: &Proposal<C>,
    ) -> GovernanceResult<()> {
        ctx.store_mut().set_json(&keys::proposal_key(proposal.id), proposal)?;
        Ok(())
    }

    pub fn delete_proposal(&self, ctx: &mut Context<'_>, proposal_id: u64) -> GovernanceResult<()> {
        ctx.store_mut().delete(&keys::proposal_key(proposal_id))?;
        Ok(())
    }

    /// Visit proposals in id order until `visit` returns `true`
    pub fn iterate_proposals<F>(&self, ctx: &Context<'_>, visit: F) -> GovernanceResult<()>
    where
        F: FnMut(Proposal<C>) -> bool,
    {
        iterate_json(ctx.store(), keys::PROPOSAL_KEY_PREFIX, visit)
    }

    pub fn get_proposals(&self, ctx: &Context<'_>) -> GovernanceResult<Vec<Proposal<C>>> {
        let mut proposals = Vec::new();
        self.iterate_proposals(ctx, |proposal| {
            proposals.push(proposal);
            false
        })?;
        Ok(proposals)
    }
}
