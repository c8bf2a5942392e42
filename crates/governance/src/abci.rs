use icn_core::Context;

use crate::keeper::Keeper;
use crate::types::{Permission, PubProposal};
use crate::GovernanceResult;

/// Runs at the start of every block: sweeps proposals past their deadline
pub fn begin_blocker<C, P>(ctx: &mut Context<'_>, keeper: &Keeper<C, P>) -> GovernanceResult<()>
where
    C: PubProposal,
    P: Permission<C>,
{
    keeper.close_expired_proposals(ctx)
}
