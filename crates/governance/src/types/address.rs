use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{GovernanceError, GovernanceResult};

/// Account identifier of a committee member or proposer
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reject empty or whitespace-padded addresses
    pub fn validate(&self) -> GovernanceResult<()> {
        if self.0.is_empty() {
            return Err(GovernanceError::InvalidAddress("address cannot be empty".to_string()));
        }
        if self.0.trim() != self.0 {
            return Err(GovernanceError::InvalidAddress(format!(
                "address '{}' has surrounding whitespace",
                self.0
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}
