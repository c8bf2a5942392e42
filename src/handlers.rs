//! Reference proposal handlers
//!
//! One handler per standard route. Parameters live under
//! `params/<subspace>/<key>`; a subspace exists once any key in it has been
//! set, normally at genesis.

use icn_core::{Context, Event, JsonStore, KVStore};
use icn_governance::types::content::{ROUTE_GOV, ROUTE_PARAMS, ROUTE_UPGRADE};
use icn_governance::types::UpgradePlan;
use icn_governance::{
    GovernanceError, GovernanceResult, ProposalContent, PubProposal, StandardRouter,
};
use tracing::{debug, info};

pub const PARAMS_PREFIX: &str = "params/";
pub const UPGRADE_PLAN_KEY: &[u8] = b"upgrade/plan";

pub const EVENT_TYPE_PARAM_CHANGE: &str = "param_change";
pub const EVENT_TYPE_SCHEDULE_UPGRADE: &str = "schedule_upgrade";

pub fn param_key(subspace: &str, key: &str) -> Vec<u8> {
    format!("{}{}/{}", PARAMS_PREFIX, subspace, key).into_bytes()
}

fn subspace_prefix(subspace: &str) -> Vec<u8> {
    format!("{}{}/", PARAMS_PREFIX, subspace).into_bytes()
}

fn unexpected(route: &str, content: &ProposalContent) -> GovernanceError {
    GovernanceError::HandlerError(format!(
        "unrecognized {} proposal content type: {}",
        route,
        content.proposal_type()
    ))
}

/// Text proposals only signal; nothing is written
pub fn gov_handler(_ctx: &mut Context<'_>, content: &ProposalContent) -> GovernanceResult<()> {
    match content {
        ProposalContent::Text { .. } => Ok(()),
        other => Err(unexpected(ROUTE_GOV, other)),
    }
}

/// Assign each parameter in turn. Both the subspace and the key must
/// already exist.
pub fn params_handler(ctx: &mut Context<'_>, content: &ProposalContent) -> GovernanceResult<()> {
    let ProposalContent::ParamChange { changes, .. } = content else {
        return Err(unexpected(ROUTE_PARAMS, content));
    };

    for change in changes {
        let known_subspace = ctx
            .store()
            .iter_prefix(&subspace_prefix(&change.subspace))?
            .next()
            .is_some();
        if !known_subspace {
            return Err(GovernanceError::HandlerError(format!(
                "unknown subspace: {}",
                change.subspace
            )));
        }
        let key = param_key(&change.subspace, &change.key);
        if !ctx.store().has(&key)? {
            return Err(GovernanceError::HandlerError(format!(
                "parameter {} not registered in subspace {}",
                change.key, change.subspace
            )));
        }

        ctx.store_mut().set(&key, change.value.as_bytes())?;
        ctx.emit_event(
            Event::new(EVENT_TYPE_PARAM_CHANGE)
                .with_attribute("subspace", &change.subspace)
                .with_attribute("key", &change.key)
                .with_attribute("value", &change.value),
        );
        debug!("Set parameter {}/{} to {}", change.subspace, change.key, change.value);
    }
    Ok(())
}

/// Record the plan, replacing any plan already scheduled
pub fn upgrade_handler(ctx: &mut Context<'_>, content: &ProposalContent) -> GovernanceResult<()> {
    let ProposalContent::SoftwareUpgrade { plan, .. } = content else {
        return Err(unexpected(ROUTE_UPGRADE, content));
    };
    if plan.height <= ctx.block_height() {
        return Err(GovernanceError::HandlerError(format!(
            "upgrade cannot be scheduled in the past: height {} is not after current height {}",
            plan.height,
            ctx.block_height()
        )));
    }

    ctx.store_mut().set_json(UPGRADE_PLAN_KEY, plan)?;
    ctx.emit_event(
        Event::new(EVENT_TYPE_SCHEDULE_UPGRADE)
            .with_attribute("name", &plan.name)
            .with_attribute("height", plan.height),
    );
    info!("Scheduled upgrade {} at height {}", plan.name, plan.height);
    Ok(())
}

/// The currently scheduled upgrade, if any
pub fn scheduled_upgrade(store: &dyn KVStore) -> GovernanceResult<Option<UpgradePlan>> {
    Ok(store.get_json(UPGRADE_PLAN_KEY)?)
}

/// Router with all three reference handlers registered
pub fn standard_router() -> GovernanceResult<StandardRouter> {
    let mut router = StandardRouter::new();
    router
        .add_route(ROUTE_GOV, gov_handler)?
        .add_route(ROUTE_PARAMS, params_handler)?
        .add_route(ROUTE_UPGRADE, upgrade_handler)?;
    Ok(router)
}
