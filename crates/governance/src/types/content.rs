//! Standard proposal content
//!
//! These are the proposal kinds shipped with the module. Deployments with
//! other governance actions implement [`PubProposal`] for their own type.

use serde::{Deserialize, Serialize};

use super::PubProposal;
use crate::{GovernanceError, GovernanceResult};

pub const ROUTE_GOV: &str = "gov";
pub const ROUTE_PARAMS: &str = "params";
pub const ROUTE_UPGRADE: &str = "upgrade";

pub const MAX_TITLE_LENGTH: usize = 140;
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

/// A single parameter assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamChange {
    pub subspace: String,
    pub key: String,
    pub value: String,
}

impl ParamChange {
    pub fn new(
        subspace: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            subspace: subspace.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Software upgrade plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradePlan {
    pub name: String,
    pub height: u64,
    #[serde(default)]
    pub info: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProposalContent {
    /// Signalling proposal with no state effect
    Text { title: String, description: String },
    ParamChange {
        title: String,
        description: String,
        changes: Vec<ParamChange>,
    },
    SoftwareUpgrade {
        title: String,
        description: String,
        plan: UpgradePlan,
    },
}

impl ProposalContent {
    pub fn text(title: impl Into<String>, description: impl Into<String>) -> Self {
        ProposalContent::Text {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn param_change(
        title: impl Into<String>,
        description: impl Into<String>,
        changes: Vec<ParamChange>,
    ) -> Self {
        ProposalContent::ParamChange {
            title: title.into(),
            description: description.into(),
            changes,
        }
    }

    pub fn software_upgrade(
        title: impl Into<String>,
        description: impl Into<String>,
        name: impl Into<String>,
        height: u64,
    ) -> Self {
        ProposalContent::SoftwareUpgrade {
            title: title.into(),
            description: description.into(),
            plan: UpgradePlan {
                name: name.into(),
                height,
                info: String::new(),
            },
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ProposalContent::Text { title, .. }
            | ProposalContent::ParamChange { title, .. }
            | ProposalContent::SoftwareUpgrade { title, .. } => title,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            ProposalContent::Text { description, .. }
            | ProposalContent::ParamChange { description, .. }
            | ProposalContent::SoftwareUpgrade { description, .. } => description,
        }
    }
}

fn invalid(msg: impl Into<String>) -> GovernanceError {
    GovernanceError::InvalidPubProposal(msg.into())
}

impl PubProposal for ProposalContent {
    fn proposal_route(&self) -> &str {
        match self {
            ProposalContent::Text { .. } => ROUTE_GOV,
            ProposalContent::ParamChange { .. } => ROUTE_PARAMS,
            ProposalContent::SoftwareUpgrade { .. } => ROUTE_UPGRADE,
        }
    }

    fn proposal_type(&self) -> &str {
        match self {
            ProposalContent::Text { .. } => "Text",
            ProposalContent::ParamChange { .. } => "ParameterChange",
            ProposalContent::SoftwareUpgrade { .. } => "SoftwareUpgrade",
        }
    }

    fn validate_basic(&self) -> GovernanceResult<()> {
        let title = self.title();
        if title.trim().is_empty() {
            return Err(invalid("proposal title cannot be blank"));
        }
        if title.len() > MAX_TITLE_LENGTH {
            return Err(invalid(format!(
                "proposal title is longer than max length of {}",
                MAX_TITLE_LENGTH
            )));
        }
        let description = self.description();
        if description.is_empty() {
            return Err(invalid("proposal description cannot be blank"));
        }
        if description.len() > MAX_DESCRIPTION_LENGTH {
            return Err(invalid(format!(
                "proposal description is longer than max length of {}",
                MAX_DESCRIPTION_LENGTH
            )));
        }

        match self {
            ProposalContent::Text { .. } => Ok(()),
            ProposalContent::ParamChange { changes, .. } => {
                if changes.is_empty() {
                    return Err(invalid("submitted parameter changes are empty"));
                }
                for change in changes {
                    if change.subspace.is_empty() {
                        return Err(invalid("parameter subspace cannot be empty"));
                    }
                    if change.key.is_empty() {
                        return Err(invalid("parameter key cannot be empty"));
                    }
                }
                Ok(())
            }
            ProposalContent::SoftwareUpgrade { plan, .. } => {
                if plan.name.trim().is_empty() {
                    return Err(invalid("upgrade plan name cannot be empty"));
                }
                if plan.height == 0 {
                    return Err(invalid("upgrade plan height must be greater than 0"));
                }
                Ok(())
            }
        }
    }
}
