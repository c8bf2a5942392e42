use chrono::Duration as ChronoDuration;
use icn_core::{CacheStore, Context, Event, Timestamp};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::Keeper;
use crate::router::{call_guarded, Handler};
use crate::types::events::*;
use crate::types::{Address, CloseStatus, Committee, Permission, PubProposal, Vote};
use crate::{GovernanceError, GovernanceResult};

impl<C, P> Keeper<C, P>
where
    C: PubProposal,
    P: Permission<C>,
{
    /// Submit a proposal to a committee so that it can be voted on.
    ///
    /// The proposer must be a member, the committee must hold a permission
    /// for the content, and the content must survive a dry run of its handler.
    /// Nothing is written unless every check passes.
    pub fn submit_proposal(
        &self,
        ctx: &mut Context<'_>,
        proposer: &Address,
        committee_id: u64,
        content: C,
    ) -> GovernanceResult<u64> {
        let com = self
            .get_committee(ctx, committee_id)?
            .ok_or(GovernanceError::UnknownCommittee(committee_id))?;
        if !com.has_member(proposer) {
            return Err(GovernanceError::Unauthorized(
                "proposer not member of committee".to_string(),
            ));
        }
        if !com.has_permissions_for(&content) {
            return Err(GovernanceError::Unauthorized(
                "committee does not have permissions to enact proposal".to_string(),
            ));
        }

        self.validate_pub_proposal(ctx, &content)?;

        let deadline = proposal_deadline(ctx.block_time(), &com)?;
        let proposal_id = self.store_new_proposal(ctx, content, committee_id, deadline)?;

        ctx.emit_event(
            Event::new(EVENT_TYPE_PROPOSAL_SUBMIT)
                .with_attribute(ATTRIBUTE_KEY_COMMITTEE_ID, com.id)
                .with_attribute(ATTRIBUTE_KEY_PROPOSAL_ID, proposal_id),
        );
        info!(
            "Proposal {} submitted to committee {} by {}, deadline {}",
            proposal_id, com.id, proposer, deadline
        );
        Ok(proposal_id)
    }

    /// Record a member's vote on an open proposal, overwriting any prior vote
    pub fn add_vote(
        &self,
        ctx: &mut Context<'_>,
        proposal_id: u64,
        voter: &Address,
    ) -> GovernanceResult<()> {
        let proposal = self
            .get_proposal(ctx, proposal_id)?
            .ok_or(GovernanceError::UnknownProposal(proposal_id))?;
        if proposal.has_expired_by(ctx.block_time()) {
            return Err(GovernanceError::ProposalExpired {
                now: ctx.block_time(),
                deadline: proposal.deadline,
            });
        }
        let com = self
            .get_committee(ctx, proposal.committee_id)?
            .ok_or(GovernanceError::UnknownCommittee(proposal.committee_id))?;
        if !com.has_member(voter) {
            return Err(GovernanceError::Unauthorized(
                "voter must be a member of committee".to_string(),
            ));
        }

        self.set_vote(ctx, &Vote::new(proposal_id, voter.clone()))?;

        ctx.emit_event(
            Event::new(EVENT_TYPE_PROPOSAL_VOTE)
                .with_attribute(ATTRIBUTE_KEY_COMMITTEE_ID, com.id)
                .with_attribute(ATTRIBUTE_KEY_PROPOSAL_ID, proposal.id)
                .with_attribute(ATTRIBUTE_KEY_VOTER, voter),
        );
        debug!("{} voted on proposal {}", voter, proposal_id);
        Ok(())
    }

    /// Whether a proposal currently has enough votes to pass.
    ///
    /// Passes when `votes >= threshold * members`, compared in exact decimal
    /// arithmetic.
    pub fn get_proposal_result(
        &self,
        ctx: &Context<'_>,
        proposal_id: u64,
    ) -> GovernanceResult<bool> {
        let proposal = self
            .get_proposal(ctx, proposal_id)?
            .ok_or(GovernanceError::UnknownProposal(proposal_id))?;
        let com = self
            .get_committee(ctx, proposal.committee_id)?
            .ok_or(GovernanceError::UnknownCommittee(proposal.committee_id))?;

        let votes = self.tally_votes(ctx, proposal_id)?;
        let required = com
            .vote_threshold
            .checked_mul(Decimal::from(com.members.len()))
            .ok_or_else(|| {
                GovernanceError::InvalidCommittee(format!(
                    "vote threshold of committee {} overflows",
                    com.id
                ))
            })?;

        Ok(Decimal::from(votes) >= required)
    }

    /// Apply a proposal's content through its handler.
    ///
    /// The content is validated again first since state may have changed
    /// since submission. The handler runs over a cache of live state; its
    /// writes and events are committed only if it returns `Ok`. Whether the
    /// proposal has enough votes is the caller's decision.
    ///
    /// Handler errors come back as [`GovernanceError::HandlerError`]; a
    /// storage fault raised inside the handler is returned as is.
    pub fn enact_proposal(&self, ctx: &mut Context<'_>, proposal_id: u64) -> GovernanceResult<()> {
        let proposal = self
            .get_proposal(ctx, proposal_id)?
            .ok_or(GovernanceError::UnknownProposal(proposal_id))?;

        self.validate_pub_proposal(ctx, &proposal.content)?;
        let handler = self.handler_for(&proposal.content)?;

        let (outcome, changes, events) = {
            let mut cache = CacheStore::new(ctx.store());
            let (outcome, events) = {
                let mut cache_ctx = ctx.branch(&mut cache);
                let outcome = call_guarded(handler, &mut cache_ctx, &proposal.content);
                (outcome, cache_ctx.take_events())
            };
            (outcome, cache.into_changes(), events)
        };

        match outcome {
            Ok(Ok(())) => {
                changes.apply(ctx.store_mut())?;
                ctx.emit_events(events);
                info!("Enacted proposal {} via route {}", proposal_id, proposal.proposal_route());
                Ok(())
            }
            Ok(Err(err @ GovernanceError::StorageError(_))) => Err(err),
            Ok(Err(err)) => {
                warn!("Handler for proposal {} failed: {}", proposal_id, err);
                match err {
                    GovernanceError::HandlerError(_) => Err(err),
                    other => Err(GovernanceError::HandlerError(other.to_string())),
                }
            }
            Err(panic) => {
                warn!("Handler for proposal {} panicked: {}", proposal_id, panic);
                Err(GovernanceError::HandlerError(format!(
                    "proposal handler panicked: {}",
                    panic
                )))
            }
        }
    }

    /// Remove every proposal whose deadline is at or before the block time,
    /// along with its votes.
    pub fn close_expired_proposals(&self, ctx: &mut Context<'_>) -> GovernanceResult<()> {
        let now = ctx.block_time();
        let mut expired = Vec::new();
        self.iterate_proposals(ctx, |proposal| {
            if proposal.has_expired_by(now) {
                expired.push((proposal.id, proposal.committee_id));
            }
            false
        })?;

        for (proposal_id, committee_id) in expired {
            self.delete_proposal_and_votes(ctx, proposal_id)?;
            ctx.emit_event(
                Event::new(EVENT_TYPE_PROPOSAL_CLOSE)
                    .with_attribute(ATTRIBUTE_KEY_COMMITTEE_ID, committee_id)
                    .with_attribute(ATTRIBUTE_KEY_PROPOSAL_ID, proposal_id)
                    .with_attribute(ATTRIBUTE_KEY_PROPOSAL_CLOSE_STATUS, CloseStatus::Timeout),
            );
            info!("Closed expired proposal {} of committee {}", proposal_id, committee_id);
        }
        Ok(())
    }

    /// Check that content is valid and that its handler would accept it.
    ///
    /// The handler is dry-run over a throwaway cache of live state. A handler
    /// error or panic is reported as [`GovernanceError::InvalidPubProposal`],
    /// except storage faults, which are returned unchanged.
    pub fn validate_pub_proposal(&self, ctx: &Context<'_>, content: &C) -> GovernanceResult<()> {
        content.validate_basic()?;
        let handler = self.handler_for(content)?;

        let mut cache = CacheStore::new(ctx.store());
        let mut cache_ctx = ctx.branch(&mut cache);
        match call_guarded(handler, &mut cache_ctx, content) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err @ GovernanceError::InvalidPubProposal(_))) => Err(err),
            Ok(Err(err @ GovernanceError::StorageError(_))) => Err(err),
            Ok(Err(err)) => Err(GovernanceError::InvalidPubProposal(err.to_string())),
            Err(panic) => {
                warn!(
                    "Proposal handler for route {} panicked during validation: {}",
                    content.proposal_route(),
                    panic
                );
                Err(GovernanceError::InvalidPubProposal(format!(
                    "proposal handler panicked: {}",
                    panic
                )))
            }
        }
    }

    /// Remove a proposal and all votes cast on it
    pub fn delete_proposal_and_votes(
        &self,
        ctx: &mut Context<'_>,
        proposal_id: u64,
    ) -> GovernanceResult<()> {
        let votes = self.get_votes_by_proposal(ctx, proposal_id)?;
        for vote in &votes {
            self.delete_vote(ctx, vote.proposal_id, &vote.voter)?;
        }
        self.delete_proposal(ctx, proposal_id)?;
        debug!("Deleted proposal {} and {} votes", proposal_id, votes.len());
        Ok(())
    }

    fn handler_for(&self, content: &C) -> GovernanceResult<&Handler<C>> {
        self.router.get_route(content.proposal_route()).ok_or_else(|| {
            GovernanceError::InvalidPubProposal(format!(
                "no handler exists for proposal type {} on route {}",
                content.proposal_type(),
                content.proposal_route()
            ))
        })
    }
}

fn proposal_deadline<P>(now: Timestamp, com: &Committee<P>) -> GovernanceResult<Timestamp> {
    ChronoDuration::from_std(com.proposal_duration)
        .ok()
        .and_then(|duration| now.checked_add_signed(duration))
        .ok_or_else(|| {
            GovernanceError::InvalidCommittee(format!(
                "proposal duration of committee {} is out of range",
                com.id
            ))
        })
}
