pub mod keeper;
pub mod types;

pub use keeper::{
    NoopProtocolVersionSetter, PlanStatus, ProtocolVersionSetter, UpgradeKeeper, STORE_KEY,
};
pub use types::*;
