pub mod keeper;
pub mod types;

pub use keeper::{BankKeeper, STORE_KEY};
pub use types::*;
