pub mod keeper;
pub mod types;

pub use keeper::{FeeGrantKeeper, STORE_KEY};
pub use types::*;
