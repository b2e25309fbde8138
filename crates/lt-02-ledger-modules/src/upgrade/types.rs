use serde::{Deserialize, Serialize};

/// A scheduled software upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,
    /// Height at which the upgrade must be applied.
    pub height: u64,
    pub info: String,
}

impl Plan {
    pub fn new(name: impl Into<String>, height: u64) -> Self {
        Self {
            name: name.into(),
            height,
            info: String::new(),
        }
    }

    pub fn validate_basic(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name cannot be empty".into());
        }
        if self.height == 0 {
            return Err("height must be greater than 0".into());
        }
        Ok(())
    }

    /// True once the chain has reached the plan height.
    pub fn should_execute(&self, height: u64) -> bool {
        height >= self.height
    }
}

/// Name and height of an applied upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedUpgrade {
    pub name: String,
    pub height: u64,
}
