use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Coins};

/// Allowance with an optional total spend limit and an optional expiry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAllowance {
    /// Remaining amount the grantee may spend; `None` is unlimited.
    pub spend_limit: Option<Coins>,
    pub expiration: Option<DateTime<Utc>>,
}

impl BasicAllowance {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_spend_limit(mut self, limit: Coins) -> Self {
        self.spend_limit = Some(limit);
        self
    }

    pub fn with_expiration(mut self, at: DateTime<Utc>) -> Self {
        self.expiration = Some(at);
        self
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration.map_or(false, |at| now >= at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub granter: Address,
    pub grantee: Address,
    pub allowance: BasicAllowance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgGrantAllowance {
    pub granter: Address,
    pub grantee: Address,
    pub allowance: BasicAllowance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRevokeAllowance {
    pub granter: Address,
    pub grantee: Address,
}
