//! Event types and attribute keys emitted by the committee module

pub const EVENT_TYPE_MESSAGE: &str = "message";
pub const EVENT_TYPE_PROPOSAL_SUBMIT: &str = "proposal_submit";
pub const EVENT_TYPE_PROPOSAL_VOTE: &str = "proposal_vote";
pub const EVENT_TYPE_PROPOSAL_CLOSE: &str = "proposal_close";

pub const ATTRIBUTE_KEY_MODULE: &str = "module";
pub const ATTRIBUTE_KEY_SENDER: &str = "sender";
pub const ATTRIBUTE_KEY_COMMITTEE_ID: &str = "committee_id";
pub const ATTRIBUTE_KEY_PROPOSAL_ID: &str = "proposal_id";
pub const ATTRIBUTE_KEY_VOTER: &str = "voter";
pub const ATTRIBUTE_KEY_PROPOSAL_CLOSE_STATUS: &str = "status";
