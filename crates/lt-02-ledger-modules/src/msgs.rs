//! # Messages
//!
//! State-transition messages carried by transactions. Every message has
//! exactly one signer.

use serde::{Deserialize, Serialize};
use shared_types::Address;

use crate::bank::MsgSend;
use crate::distribution::{MsgFundCommunityPool, MsgSetWithdrawAddress, MsgWithdrawDelegatorReward};
use crate::errors::ModuleError;
use crate::feegrant::{MsgGrantAllowance, MsgRevokeAllowance};
use crate::staking::{MsgCreateValidator, MsgDelegate, MsgUndelegate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Msg {
    Send(MsgSend),
    CreateValidator(MsgCreateValidator),
    Delegate(MsgDelegate),
    Undelegate(MsgUndelegate),
    WithdrawDelegatorReward(MsgWithdrawDelegatorReward),
    SetWithdrawAddress(MsgSetWithdrawAddress),
    FundCommunityPool(MsgFundCommunityPool),
    GrantAllowance(MsgGrantAllowance),
    RevokeAllowance(MsgRevokeAllowance),
}

impl Msg {
    pub fn type_url(&self) -> &'static str {
        match self {
            Msg::Send(_) => "/bank.v1.MsgSend",
            Msg::CreateValidator(_) => "/staking.v1.MsgCreateValidator",
            Msg::Delegate(_) => "/staking.v1.MsgDelegate",
            Msg::Undelegate(_) => "/staking.v1.MsgUndelegate",
            Msg::WithdrawDelegatorReward(_) => "/distribution.v1.MsgWithdrawDelegatorReward",
            Msg::SetWithdrawAddress(_) => "/distribution.v1.MsgSetWithdrawAddress",
            Msg::FundCommunityPool(_) => "/distribution.v1.MsgFundCommunityPool",
            Msg::GrantAllowance(_) => "/feegrant.v1.MsgGrantAllowance",
            Msg::RevokeAllowance(_) => "/feegrant.v1.MsgRevokeAllowance",
        }
    }

    /// Module that handles this message.
    pub fn route(&self) -> &'static str {
        match self {
            Msg::Send(_) => crate::bank::STORE_KEY,
            Msg::CreateValidator(_) | Msg::Delegate(_) | Msg::Undelegate(_) => {
                crate::staking::STORE_KEY
            }
            Msg::WithdrawDelegatorReward(_)
            | Msg::SetWithdrawAddress(_)
            | Msg::FundCommunityPool(_) => crate::distribution::STORE_KEY,
            Msg::GrantAllowance(_) | Msg::RevokeAllowance(_) => crate::feegrant::STORE_KEY,
        }
    }

    /// The account whose signature authorizes this message.
    pub fn signer(&self) -> Address {
        match self {
            Msg::Send(m) => m.from_address,
            Msg::CreateValidator(m) => m.validator_address,
            Msg::Delegate(m) => m.delegator_address,
            Msg::Undelegate(m) => m.delegator_address,
            Msg::WithdrawDelegatorReward(m) => m.delegator_address,
            Msg::SetWithdrawAddress(m) => m.delegator_address,
            Msg::FundCommunityPool(m) => m.depositor,
            Msg::GrantAllowance(m) => m.granter,
            Msg::RevokeAllowance(m) => m.granter,
        }
    }

    /// Stateless checks.
    pub fn validate_basic(&self) -> Result<(), ModuleError> {
        let invalid = |reason: &str| Err(ModuleError::InvalidRequest(reason.to_string()));
        match self {
            Msg::Send(m) if m.amount.is_empty() => invalid("send amount must be positive"),
            Msg::Delegate(m) if m.amount.is_zero() => invalid("delegation amount must be positive"),
            Msg::Undelegate(m) if m.amount.is_zero() => invalid("undelegation amount must be positive"),
            Msg::CreateValidator(m) if m.pubkey.is_empty() => invalid("validator pubkey is empty"),
            Msg::CreateValidator(m) if m.description.moniker.trim().is_empty() => {
                invalid("validator moniker is empty")
            }
            Msg::FundCommunityPool(m) if m.amount.is_empty() => invalid("deposit amount must be positive"),
            Msg::GrantAllowance(m) if m.granter == m.grantee => {
                invalid("cannot self-grant fee authorization")
            }
            _ => Ok(()),
        }
    }
}

macro_rules! impl_from_msg {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Msg {
                fn from(msg: $ty) -> Self {
                    Msg::$variant(msg)
                }
            }
        )*
    };
}

impl_from_msg! {
    Send => MsgSend,
    CreateValidator => MsgCreateValidator,
    Delegate => MsgDelegate,
    Undelegate => MsgUndelegate,
    WithdrawDelegatorReward => MsgWithdrawDelegatorReward,
    SetWithdrawAddress => MsgSetWithdrawAddress,
    FundCommunityPool => MsgFundCommunityPool,
    GrantAllowance => MsgGrantAllowance,
    RevokeAllowance => MsgRevokeAllowance,
}
