//! Tests for the committee keeper
//!
//! These tests drive the keeper the way the ledger does: one context per
//! block over a shared store, with the block time supplied by the test.

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use icn_core::{Context, Event, KVStore, MemoryStore, StorageError, Timestamp};
use icn_governance::types::content::{ROUTE_GOV, ROUTE_PARAMS};
use icn_governance::types::events::*;
use icn_governance::{
    init_genesis, Address, Committee, CommitteePermission, GovernanceError, GovernanceResult,
    ParamChange, ProposalContent, StandardGenesis, StandardKeeper, StandardRouter,
};
use rust_decimal::Decimal;

const ALICE: &str = "alice";
const BOB: &str = "bob";
const CAROL: &str = "carol";
const DAVE: &str = "dave";

fn addr(name: &str) -> Address {
    Address::new(name)
}

fn time(secs: i64) -> Timestamp {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn at(store: &mut MemoryStore, secs: i64) -> Context<'_> {
    Context::new(store, secs as u64, time(secs))
}

fn committee(
    id: u64,
    permissions: Vec<CommitteePermission>,
    threshold: &str,
) -> Committee<CommitteePermission> {
    Committee::new(
        id,
        "test committee",
        [ALICE, BOB, CAROL].into_iter().map(Address::from),
        permissions,
        Decimal::from_str(threshold).unwrap(),
        Duration::from_secs(100),
    )
}

fn subspace_key(subspace: &str) -> Vec<u8> {
    format!("subspaces/{}", subspace).into_bytes()
}

fn param_key(subspace: &str, key: &str) -> Vec<u8> {
    format!("params/{}/{}", subspace, key).into_bytes()
}

/// Writes each change under `params/`, refusing subspaces that are not
/// registered in state. The `panic` subspace writes and then panics.
fn params_handler(ctx: &mut Context<'_>, content: &ProposalContent) -> GovernanceResult<()> {
    let ProposalContent::ParamChange { changes, .. } = content else {
        return Err(GovernanceError::HandlerError("not a parameter change".to_string()));
    };
    for change in changes {
        ctx.store_mut()
            .set(&param_key(&change.subspace, &change.key), change.value.as_bytes())?;
        if change.subspace == "panic" {
            panic!("parameter {} is not registered", change.key);
        }
        if !ctx.store().has(&subspace_key(&change.subspace))? {
            return Err(GovernanceError::HandlerError(format!(
                "unknown subspace {}",
                change.subspace
            )));
        }
    }
    ctx.emit_event(Event::new("param_change"));
    Ok(())
}

fn router() -> StandardRouter {
    let mut router = StandardRouter::new();
    router
        .add_route(ROUTE_GOV, |_: &mut Context<'_>, _: &ProposalContent| Ok(()))
        .unwrap();
    router.add_route(ROUTE_PARAMS, params_handler).unwrap();
    router
}

fn setup_with(
    router: StandardRouter,
    committees: Vec<Committee<CommitteePermission>>,
) -> (StandardKeeper, MemoryStore) {
    let keeper = StandardKeeper::new(router);
    let mut store = MemoryStore::new();
    store.set(&subspace_key("cdp"), b"registered").unwrap();
    {
        let mut ctx = at(&mut store, 0);
        let genesis = StandardGenesis {
            committees,
            ..Default::default()
        };
        init_genesis(&mut ctx, &keeper, &genesis).unwrap();
    }
    (keeper, store)
}

/// Committee 1: God, threshold 0.5. Committee 2: text only, threshold 1.
fn setup() -> (StandardKeeper, MemoryStore) {
    setup_with(
        router(),
        vec![
            committee(1, vec![CommitteePermission::God], "0.5"),
            committee(2, vec![CommitteePermission::Text], "1"),
        ],
    )
}

fn text() -> ProposalContent {
    ProposalContent::text("Signal", "A proposal with no state effect")
}

fn param_change(subspace: &str) -> ProposalContent {
    ProposalContent::param_change(
        "Raise debt limit",
        "Raise the cdp debt limit",
        vec![ParamChange::new(subspace, "DebtLimit", "1000")],
    )
}

#[test]
fn test_submit_proposal() {
    let (keeper, mut store) = setup();
    let mut ctx = at(&mut store, 0);

    let id = keeper.submit_proposal(&mut ctx, &addr(ALICE), 1, text()).unwrap();
    assert_eq!(id, 1);

    let proposal = keeper.get_proposal(&ctx, id).unwrap().unwrap();
    assert_eq!(proposal.committee_id, 1);
    assert_eq!(proposal.deadline, time(100));
    assert_eq!(proposal.content, text());

    let events = ctx.take_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EVENT_TYPE_PROPOSAL_SUBMIT);
    assert_eq!(events[0].attribute(ATTRIBUTE_KEY_COMMITTEE_ID), Some("1"));
    assert_eq!(events[0].attribute(ATTRIBUTE_KEY_PROPOSAL_ID), Some("1"));
}

#[test]
fn test_submit_checks_in_order() {
    let (keeper, mut store) = setup();
    let mut ctx = at(&mut store, 0);

    let err = keeper.submit_proposal(&mut ctx, &addr(ALICE), 9, text()).unwrap_err();
    assert!(matches!(err, GovernanceError::UnknownCommittee(9)));

    // Non-member with content the committee could not enact anyway
    let err = keeper
        .submit_proposal(&mut ctx, &addr(DAVE), 2, param_change("cdp"))
        .unwrap_err();
    assert!(matches!(err, GovernanceError::Unauthorized(ref msg) if msg.contains("proposer")));

    let err = keeper
        .submit_proposal(&mut ctx, &addr(ALICE), 2, param_change("cdp"))
        .unwrap_err();
    assert!(matches!(err, GovernanceError::Unauthorized(ref msg) if msg.contains("permissions")));

    assert!(ctx.events().events().is_empty());
    assert_eq!(keeper.get_next_proposal_id(&ctx).unwrap(), 1);
}

#[test]
fn test_submit_without_registered_handler() {
    let (keeper, mut store) = setup();
    let before = store.clone();
    let mut ctx = at(&mut store, 0);

    let upgrade = ProposalContent::software_upgrade("Upgrade", "Move to v2", "v2", 1000);
    let err = keeper.submit_proposal(&mut ctx, &addr(ALICE), 1, upgrade).unwrap_err();
    assert!(matches!(
        err,
        GovernanceError::InvalidPubProposal(ref msg) if msg.contains("no handler")
    ));

    drop(ctx);
    assert_eq!(store, before);
}

#[test]
fn test_submit_with_failing_dry_run() {
    let (keeper, mut store) = setup();
    let before = store.clone();
    let mut ctx = at(&mut store, 0);

    let err = keeper
        .submit_proposal(&mut ctx, &addr(ALICE), 1, param_change("unregistered"))
        .unwrap_err();
    assert!(matches!(
        err,
        GovernanceError::InvalidPubProposal(ref msg) if msg.contains("unknown subspace")
    ));

    let err = keeper
        .submit_proposal(&mut ctx, &addr(ALICE), 1, param_change("panic"))
        .unwrap_err();
    assert!(matches!(
        err,
        GovernanceError::InvalidPubProposal(ref msg) if msg.contains("panicked")
    ));

    let err = keeper
        .submit_proposal(&mut ctx, &addr(ALICE), 1, ProposalContent::text("", "empty title"))
        .unwrap_err();
    assert!(matches!(err, GovernanceError::InvalidPubProposal(_)));

    drop(ctx);
    assert_eq!(store, before);
}

#[test]
fn test_dry_run_leaves_live_state_untouched() {
    let (keeper, mut store) = setup();
    let before = store.clone();

    {
        let ctx = at(&mut store, 0);
        // success: the handler writes a parameter
        keeper.validate_pub_proposal(&ctx, &param_change("cdp")).unwrap();
        // handler error after writing
        assert!(keeper.validate_pub_proposal(&ctx, &param_change("unregistered")).is_err());
        // handler panic after writing
        assert!(keeper.validate_pub_proposal(&ctx, &param_change("panic")).is_err());
        assert!(ctx.events().events().is_empty());
    }

    assert_eq!(store, before);
    assert!(!store.has(&param_key("cdp", "DebtLimit")).unwrap());
}

#[test]
fn test_proposal_ids_strictly_increase() {
    let (keeper, mut store) = setup();
    let mut ctx = at(&mut store, 0);

    let ids: Vec<u64> = (0..5)
        .map(|_| keeper.submit_proposal(&mut ctx, &addr(BOB), 1, text()).unwrap())
        .collect();
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_revote_is_idempotent() {
    let (keeper, mut store) = setup();
    let mut ctx = at(&mut store, 0);
    let id = keeper.submit_proposal(&mut ctx, &addr(ALICE), 1, text()).unwrap();

    keeper.add_vote(&mut ctx, id, &addr(BOB)).unwrap();
    keeper.add_vote(&mut ctx, id, &addr(BOB)).unwrap();

    assert_eq!(keeper.tally_votes(&ctx, id).unwrap(), 1);
    assert_eq!(keeper.get_votes_by_proposal(&ctx, id).unwrap().len(), 1);
}

#[test]
fn test_add_vote_errors() {
    let (keeper, mut store) = setup();
    let id = {
        let mut ctx = at(&mut store, 0);
        keeper.submit_proposal(&mut ctx, &addr(ALICE), 1, text()).unwrap()
    };

    let mut ctx = at(&mut store, 10);
    let err = keeper.add_vote(&mut ctx, id, &addr(DAVE)).unwrap_err();
    assert!(matches!(err, GovernanceError::Unauthorized(_)));

    let err = keeper.add_vote(&mut ctx, 42, &addr(BOB)).unwrap_err();
    assert!(matches!(err, GovernanceError::UnknownProposal(42)));
    drop(ctx);

    // The deadline itself is already too late
    let mut ctx = at(&mut store, 100);
    let err = keeper.add_vote(&mut ctx, id, &addr(BOB)).unwrap_err();
    assert!(matches!(
        err,
        GovernanceError::ProposalExpired { now, deadline }
            if now == time(100) && deadline == time(100)
    ));
    assert_eq!(keeper.tally_votes(&ctx, id).unwrap(), 0);
}

#[test]
fn test_vote_on_removed_committee() {
    let (keeper, mut store) = setup();
    let mut ctx = at(&mut store, 0);
    let id = keeper.submit_proposal(&mut ctx, &addr(ALICE), 1, text()).unwrap();

    keeper.delete_committee(&mut ctx, 1).unwrap();
    let err = keeper.add_vote(&mut ctx, id, &addr(BOB)).unwrap_err();
    assert!(matches!(err, GovernanceError::UnknownCommittee(1)));
    assert!(matches!(
        keeper.get_proposal_result(&ctx, id),
        Err(GovernanceError::UnknownCommittee(1))
    ));
}

#[test]
fn test_committee_scenario() {
    let (keeper, mut store) = setup();

    let id = {
        let mut ctx = at(&mut store, 0);
        let id = keeper.submit_proposal(&mut ctx, &addr(ALICE), 1, text()).unwrap();
        assert_eq!(keeper.get_proposal(&ctx, id).unwrap().unwrap().deadline, time(100));

        keeper.add_vote(&mut ctx, id, &addr(ALICE)).unwrap();
        assert!(!keeper.get_proposal_result(&ctx, id).unwrap());
        keeper.add_vote(&mut ctx, id, &addr(BOB)).unwrap();
        assert!(keeper.get_proposal_result(&ctx, id).unwrap());
        id
    };

    let mut ctx = at(&mut store, 150);
    keeper.close_expired_proposals(&mut ctx).unwrap();

    assert!(keeper.get_proposal(&ctx, id).unwrap().is_none());
    assert_eq!(keeper.tally_votes(&ctx, id).unwrap(), 0);

    let events = ctx.take_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EVENT_TYPE_PROPOSAL_CLOSE);
    assert_eq!(events[0].attribute(ATTRIBUTE_KEY_PROPOSAL_CLOSE_STATUS), Some("proposal_timeout"));
}

#[test]
fn test_expiry_sweep_boundaries() {
    let (keeper, mut store) = setup();

    // Deadlines 100, 150 and 200
    let mut ids = Vec::new();
    for submitted_at in [0, 50, 100] {
        let mut ctx = at(&mut store, submitted_at);
        let id = keeper.submit_proposal(&mut ctx, &addr(ALICE), 1, text()).unwrap();
        keeper.add_vote(&mut ctx, id, &addr(CAROL)).unwrap();
        ids.push(id);
    }

    let mut ctx = at(&mut store, 150);
    keeper.close_expired_proposals(&mut ctx).unwrap();

    assert!(keeper.get_proposal(&ctx, ids[0]).unwrap().is_none());
    assert!(keeper.get_proposal(&ctx, ids[1]).unwrap().is_none());
    assert!(keeper.get_proposal(&ctx, ids[2]).unwrap().is_some());
    assert_eq!(keeper.tally_votes(&ctx, ids[0]).unwrap(), 0);
    assert_eq!(keeper.tally_votes(&ctx, ids[1]).unwrap(), 0);
    assert_eq!(keeper.tally_votes(&ctx, ids[2]).unwrap(), 1);

    let closed: Vec<String> = ctx
        .take_events()
        .iter()
        .filter_map(|event| event.attribute(ATTRIBUTE_KEY_PROPOSAL_ID).map(str::to_string))
        .collect();
    assert_eq!(closed, vec![ids[0].to_string(), ids[1].to_string()]);

    // A second sweep at the same time finds nothing
    keeper.close_expired_proposals(&mut ctx).unwrap();
    assert!(ctx.take_events().is_empty());
}

#[test]
fn test_quorum_uses_exact_decimal() {
    let mut com = committee(1, vec![CommitteePermission::God], "0.667");
    com.members = ["a", "b", "c", "d", "e", "f"].into_iter().map(Address::from).collect();
    let (keeper, mut store) = setup_with(router(), vec![com]);
    let mut ctx = at(&mut store, 0);
    let id = keeper.submit_proposal(&mut ctx, &addr("a"), 1, text()).unwrap();

    // 0.667 * 6 = 4.002, so four votes are not enough
    for voter in ["a", "b", "c", "d"] {
        keeper.add_vote(&mut ctx, id, &addr(voter)).unwrap();
    }
    assert!(!keeper.get_proposal_result(&ctx, id).unwrap());

    keeper.add_vote(&mut ctx, id, &addr("e")).unwrap();
    assert!(keeper.get_proposal_result(&ctx, id).unwrap());
}

#[test]
fn test_enact_proposal_applies_changes() {
    let (keeper, mut store) = setup();
    let mut ctx = at(&mut store, 0);
    let id = keeper
        .submit_proposal(&mut ctx, &addr(ALICE), 1, param_change("cdp"))
        .unwrap();
    ctx.take_events();

    keeper.enact_proposal(&mut ctx, id).unwrap();

    assert_eq!(
        ctx.store().get(&param_key("cdp", "DebtLimit")).unwrap(),
        Some(b"1000".to_vec())
    );
    let events = ctx.take_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, "param_change");

    // Enactment does not remove the proposal; that is the caller's job
    assert!(keeper.get_proposal(&ctx, id).unwrap().is_some());
}

#[test]
fn test_enact_revalidates_against_current_state() {
    let (keeper, mut store) = setup();
    let mut ctx = at(&mut store, 0);
    let id = keeper
        .submit_proposal(&mut ctx, &addr(ALICE), 1, param_change("cdp"))
        .unwrap();

    // The subspace disappears between submission and enactment
    ctx.store_mut().delete(&subspace_key("cdp")).unwrap();

    let err = keeper.enact_proposal(&mut ctx, id).unwrap_err();
    assert!(matches!(err, GovernanceError::InvalidPubProposal(_)));
    assert!(!ctx.store().has(&param_key("cdp", "DebtLimit")).unwrap());

    assert!(matches!(
        keeper.enact_proposal(&mut ctx, 99),
        Err(GovernanceError::UnknownProposal(99))
    ));
}

#[derive(Debug, Clone, Copy)]
enum Failure {
    Handler,
    Storage,
    Panic,
}

/// A gov handler that writes a marker, then fails on its `fail_on`th call
fn failing_router(calls: Arc<AtomicUsize>, fail_on: usize, failure: Failure) -> StandardRouter {
    let mut router = StandardRouter::new();
    router
        .add_route(ROUTE_GOV, move |ctx: &mut Context<'_>, _: &ProposalContent| {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            ctx.store_mut().set(b"marker", b"written")?;
            if call != fail_on {
                return Ok(());
            }
            match failure {
                Failure::Handler => Err(GovernanceError::HandlerError(format!(
                    "failed on call {}",
                    call
                ))),
                Failure::Storage => Err(StorageError::Other("disk unavailable".to_string()).into()),
                Failure::Panic => panic!("handler gave up on call {}", call),
            }
        })
        .unwrap();
    router
}

fn setup_failing(
    fail_on: usize,
    failure: Failure,
) -> (StandardKeeper, MemoryStore, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let (keeper, store) = setup_with(
        failing_router(calls.clone(), fail_on, failure),
        vec![committee(1, vec![CommitteePermission::God], "0.5")],
    );
    (keeper, store, calls)
}

#[test]
fn test_enact_handler_error_writes_nothing() {
    // call 1: submit dry run, call 2: enact dry run, call 3: enactment
    for failure in [Failure::Handler, Failure::Storage, Failure::Panic] {
        let (keeper, mut store, calls) = setup_failing(3, failure);
        let mut ctx = at(&mut store, 0);
        let id = keeper.submit_proposal(&mut ctx, &addr(ALICE), 1, text()).unwrap();
        ctx.take_events();

        assert!(keeper.enact_proposal(&mut ctx, id).is_err(), "{:?}", failure);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(!ctx.store().has(b"marker").unwrap());
        assert!(ctx.take_events().is_empty());
    }
}

#[test]
fn test_enact_error_kinds() {
    let (keeper, mut store, _) = setup_failing(3, Failure::Handler);
    let mut ctx = at(&mut store, 0);
    let id = keeper.submit_proposal(&mut ctx, &addr(ALICE), 1, text()).unwrap();
    let err = keeper.enact_proposal(&mut ctx, id).unwrap_err();
    assert!(matches!(err, GovernanceError::HandlerError(ref msg) if msg == "failed on call 3"));
    assert_eq!(err.to_string(), "Proposal handler error: failed on call 3");
    drop(ctx);

    let (keeper, mut store, _) = setup_failing(3, Failure::Storage);
    let mut ctx = at(&mut store, 0);
    let id = keeper.submit_proposal(&mut ctx, &addr(ALICE), 1, text()).unwrap();
    let err = keeper.enact_proposal(&mut ctx, id).unwrap_err();
    assert!(matches!(
        err,
        GovernanceError::StorageError(StorageError::Other(ref msg)) if msg == "disk unavailable"
    ));
    drop(ctx);

    let (keeper, mut store, _) = setup_failing(3, Failure::Panic);
    let mut ctx = at(&mut store, 0);
    let id = keeper.submit_proposal(&mut ctx, &addr(ALICE), 1, text()).unwrap();
    let err = keeper.enact_proposal(&mut ctx, id).unwrap_err();
    assert!(matches!(
        err,
        GovernanceError::HandlerError(ref msg) if msg.starts_with("proposal handler panicked")
    ));
}

#[test]
fn test_dry_run_storage_fault_is_not_a_validation_error() {
    let (keeper, mut store, calls) = setup_failing(1, Failure::Storage);
    let mut ctx = at(&mut store, 0);

    let err = keeper.submit_proposal(&mut ctx, &addr(ALICE), 1, text()).unwrap_err();
    assert!(matches!(err, GovernanceError::StorageError(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(keeper.get_proposal(&ctx, 1).unwrap().is_none());
}

#[test]
fn test_delete_proposal_and_votes() {
    let (keeper, mut store) = setup();
    let mut ctx = at(&mut store, 0);
    let first = keeper.submit_proposal(&mut ctx, &addr(ALICE), 1, text()).unwrap();
    let second = keeper.submit_proposal(&mut ctx, &addr(ALICE), 1, text()).unwrap();
    for voter in [ALICE, BOB, CAROL] {
        keeper.add_vote(&mut ctx, first, &addr(voter)).unwrap();
        keeper.add_vote(&mut ctx, second, &addr(voter)).unwrap();
    }

    keeper.delete_proposal_and_votes(&mut ctx, first).unwrap();

    assert!(keeper.get_proposal(&ctx, first).unwrap().is_none());
    assert_eq!(keeper.tally_votes(&ctx, first).unwrap(), 0);
    assert_eq!(keeper.tally_votes(&ctx, second).unwrap(), 3);
}
