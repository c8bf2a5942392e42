use icn_core::{Context, JsonStore};
use tracing::debug;

use super::{iterate_json, Keeper};
use crate::types::keys;
use crate::types::{Committee, Permission, PubProposal};
use crate::GovernanceResult;

impl<C, P> Keeper<C, P>
where
    C: PubProposal,
    P: Permission<C>,
{
    /// Look up a committee by id
    pub fn get_committee(
        &self,
        ctx: &Context<'_>,
        committee_id: u64,
    ) -> GovernanceResult<Option<Committee<P>>> {
        Ok(ctx.store().get_json(&keys::committee_key(committee_id))?)
    }

    /// Store a committee, replacing any committee with the same id.
    /// Committees that fail [`Committee::validate`] are rejected.
    pub fn set_committee(
        &self,
        ctx: &mut Context<'_>,
        committee: &Committee<P>,
    ) -> GovernanceResult<()> {
        committee.validate()?;
        ctx.store_mut()
            .set_json(&keys::committee_key(committee.id), committee)?;
        debug!("Stored committee {}", committee.id);
        Ok(())
    }

    pub fn delete_committee(
        &self,
        ctx: &mut Context<'_>,
        committee_id: u64,
    ) -> GovernanceResult<()> {
        ctx.store_mut().delete(&keys::committee_key(committee_id))?;
        Ok(())
    }

    /// Visit committees in id order until `visit` returns `true`
    pub fn iterate_committees<F>(&self, ctx: &Context<'_>, visit: F) -> GovernanceResult<()>
    where
        F: FnMut(Committee<P>) -> bool,
    {
        iterate_json(ctx.store(), keys::COMMITTEE_KEY_PREFIX, visit)
    }

    pub fn get_committees(&self, ctx: &Context<'_>) -> GovernanceResult<Vec<Committee<P>>> {
        let mut committees = Vec::new();
        self.iterate_committees(ctx, |committee| {
            committees.push(committee);
            false
        })?;
        Ok(committees)
    }
}
