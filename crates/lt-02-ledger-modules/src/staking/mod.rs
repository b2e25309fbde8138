pub mod keeper;
pub mod types;

pub use keeper::{StakingKeeper, STORE_KEY};
pub use types::*;
