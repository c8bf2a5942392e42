//! Store key layout
//!
//! Ids are encoded big-endian so that key order is numeric order.

use icn_core::utils::serialization::u64_to_bytes;

use super::Address;

pub const COMMITTEE_KEY_PREFIX: &[u8] = &[0x00];
pub const PROPOSAL_KEY_PREFIX: &[u8] = &[0x01];
pub const VOTE_KEY_PREFIX: &[u8] = &[0x02];
pub const NEXT_PROPOSAL_ID_KEY: &[u8] = &[0x03];

fn with_id(prefix: &[u8], id: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + 8);
    key.extend_from_slice(prefix);
    key.extend_from_slice(&u64_to_bytes(id));
    key
}

pub fn committee_key(committee_id: u64) -> Vec<u8> {
    with_id(COMMITTEE_KEY_PREFIX, committee_id)
}

pub fn proposal_key(proposal_id: u64) -> Vec<u8> {
    with_id(PROPOSAL_KEY_PREFIX, proposal_id)
}

/// Prefix shared by every vote on one proposal
pub fn votes_key_prefix(proposal_id: u64) -> Vec<u8> {
    with_id(VOTE_KEY_PREFIX, proposal_id)
}

pub fn vote_key(proposal_id: u64, voter: &Address) -> Vec<u8> {
    let mut key = votes_key_prefix(proposal_id);
    key.extend_from_slice(voter.as_bytes());
    key
}
