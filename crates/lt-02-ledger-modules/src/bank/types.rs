use serde::{Deserialize, Serialize};
use shared_types::{Address, Coins};

/// Transfer coins from one account to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSend {
    pub from_address: Address,
    pub to_address: Address,
    pub amount: Coins,
}
