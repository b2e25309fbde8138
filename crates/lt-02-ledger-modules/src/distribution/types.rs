use serde::{Deserialize, Serialize};
use shared_types::{Address, Coins};

use crate::staking::BPS_DENOMINATOR;

/// Distribution protocol parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Share of collected fees routed to the community pool, in bps.
    pub community_tax_bps: u32,
    pub withdraw_addr_enabled: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            community_tax_bps: 200,
            withdraw_addr_enabled: true,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), String> {
        if self.community_tax_bps > BPS_DENOMINATOR {
            return Err(format!(
                "community tax must be at most 100%, got {} bps",
                self.community_tax_bps
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePool {
    pub community_pool: Coins,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgWithdrawDelegatorReward {
    pub delegator_address: Address,
    pub validator_address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSetWithdrawAddress {
    pub delegator_address: Address,
    pub withdraw_address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgFundCommunityPool {
    pub amount: Coins,
    pub depositor: Address,
}
