//! Message processing
//!
//! A vote that brings a proposal to its threshold enacts it immediately and
//! then removes the proposal, whether or not enactment succeeded. Storage
//! faults abort the message instead.

use icn_core::{Context, Event};
use tracing::warn;

use crate::keeper::Keeper;
use crate::msgs::{Msg, MsgSubmitProposal, MsgVote};
use crate::types::events::*;
use crate::types::{CloseStatus, Permission, PubProposal, MODULE_NAME};
use crate::{GovernanceError, GovernanceResult};

/// What a processed message did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgOutcome {
    Submitted { proposal_id: u64 },
    Voted { proposal_id: u64, closed: Option<CloseStatus> },
}

pub fn handle_msg<C, P>(
    ctx: &mut Context<'_>,
    keeper: &Keeper<C, P>,
    msg: Msg<C>,
) -> GovernanceResult<MsgOutcome>
where
    C: PubProposal,
    P: Permission<C>,
{
    msg.validate_basic()?;
    match msg {
        Msg::SubmitProposal(msg) => handle_msg_submit_proposal(ctx, keeper, msg),
        Msg::Vote(msg) => handle_msg_vote(ctx, keeper, msg),
    }
}

pub fn handle_msg_submit_proposal<C, P>(
    ctx: &mut Context<'_>,
    keeper: &Keeper<C, P>,
    msg: MsgSubmitProposal<C>,
) -> GovernanceResult<MsgOutcome>
where
    C: PubProposal,
    P: Permission<C>,
{
    let content = msg.pub_proposal.ok_or_else(|| {
        GovernanceError::InvalidPubProposal("pub proposal cannot be empty".to_string())
    })?;
    let proposal_id = keeper.submit_proposal(ctx, &msg.proposer, msg.committee_id, content)?;

    ctx.emit_event(message_event(&msg.proposer));
    Ok(MsgOutcome::Submitted { proposal_id })
}

pub fn handle_msg_vote<C, P>(
    ctx: &mut Context<'_>,
    keeper: &Keeper<C, P>,
    msg: MsgVote,
) -> GovernanceResult<MsgOutcome>
where
    C: PubProposal,
    P: Permission<C>,
{
    keeper.add_vote(ctx, msg.proposal_id, &msg.voter)?;
    ctx.emit_event(message_event(&msg.voter));

    if !keeper.get_proposal_result(ctx, msg.proposal_id)? {
        return Ok(MsgOutcome::Voted {
            proposal_id: msg.proposal_id,
            closed: None,
        });
    }

    let proposal = keeper
        .get_proposal(ctx, msg.proposal_id)?
        .ok_or(GovernanceError::UnknownProposal(msg.proposal_id))?;

    let status = match keeper.enact_proposal(ctx, proposal.id) {
        Ok(()) => CloseStatus::Passed,
        Err(err @ GovernanceError::StorageError(_)) => return Err(err),
        Err(err) => {
            warn!("Proposal {} passed but could not be enacted: {}", proposal.id, err);
            CloseStatus::Failed
        }
    };
    keeper.delete_proposal_and_votes(ctx, proposal.id)?;

    ctx.emit_event(
        Event::new(EVENT_TYPE_PROPOSAL_CLOSE)
            .with_attribute(ATTRIBUTE_KEY_COMMITTEE_ID, proposal.committee_id)
            .with_attribute(ATTRIBUTE_KEY_PROPOSAL_ID, proposal.id)
            .with_attribute(ATTRIBUTE_KEY_PROPOSAL_CLOSE_STATUS, status),
    );
    Ok(MsgOutcome::Voted {
        proposal_id: proposal.id,
        closed: Some(status),
    })
}

fn message_event(sender: &crate::types::Address) -> Event {
    Event::new(EVENT_TYPE_MESSAGE)
        .with_attribute(ATTRIBUTE_KEY_MODULE, MODULE_NAME)
        .with_attribute(ATTRIBUTE_KEY_SENDER, sender)
}
