//! Typed events emitted by message handlers.

use serde::{Deserialize, Serialize};

/// Event type names.
pub mod event_types {
    pub const TRANSFER: &str = "transfer";
    pub const COIN_SPENT: &str = "coin_spent";
    pub const COIN_RECEIVED: &str = "coin_received";
    pub const COINBASE: &str = "coinbase";
    pub const BURN: &str = "burn";
    pub const MESSAGE: &str = "message";
    pub const TX: &str = "tx";
    pub const CREATE_VALIDATOR: &str = "create_validator";
    pub const DELEGATE: &str = "delegate";
    pub const UNBOND: &str = "unbond";
    pub const WITHDRAW_REWARDS: &str = "withdraw_rewards";
    pub const SET_WITHDRAW_ADDRESS: &str = "set_withdraw_address";
    pub const SET_FEEGRANT: &str = "set_feegrant";
    pub const REVOKE_FEEGRANT: &str = "revoke_feegrant";
    pub const USE_FEEGRANT: &str = "use_feegrant";
}

/// Key/value pair attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAttribute {
    pub key: String,
    pub value: String,
}

/// A typed event with ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: Vec<EventAttribute>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    /// Builder-style attribute append.
    pub fn attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push(EventAttribute {
            key: key.into(),
            value: value.to_string(),
        });
        self
    }

    /// First value stored under `key`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}
