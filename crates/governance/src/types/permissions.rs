//! Committee permissions
//!
//! A permission is a predicate over proposal content. A committee may submit
//! a proposal if any one of its permissions allows the content.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::content::ProposalContent;

/// Decides whether a committee holding it may enact `content`.
///
/// Implementations must be pure and total.
pub trait Permission<C>: Clone + fmt::Debug + Serialize + DeserializeOwned {
    fn allows(&self, content: &C) -> bool;
}

/// A parameter a committee may change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedParam {
    pub subspace: String,
    pub key: String,
}

impl AllowedParam {
    pub fn new(subspace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            subspace: subspace.into(),
            key: key.into(),
        }
    }
}

/// Permissions understood by [`ProposalContent`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommitteePermission {
    /// Allows any proposal
    God,
    Text,
    SoftwareUpgrade,
    /// Allows parameter changes touching only the listed parameters
    ParamChange { allowed_params: Vec<AllowedParam> },
}

impl Permission<ProposalContent> for CommitteePermission {
    fn allows(&self, content: &ProposalContent) -> bool {
        match (self, content) {
            (CommitteePermission::God, _) => true,
            (CommitteePermission::Text, ProposalContent::Text { .. }) => true,
            (CommitteePermission::SoftwareUpgrade, ProposalContent::SoftwareUpgrade { .. }) => true,
            (
                CommitteePermission::ParamChange { allowed_params },
                ProposalContent::ParamChange { changes, .. },
            ) => changes.iter().all(|change| {
                allowed_params
                    .iter()
                    .any(|allowed| allowed.subspace == change.subspace && allowed.key == change.key)
            }),
            _ => false,
        }
    }
}
