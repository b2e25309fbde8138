pub mod keeper;
pub mod types;

pub use keeper::{DistributionKeeper, STORE_KEY};
pub use types::*;
