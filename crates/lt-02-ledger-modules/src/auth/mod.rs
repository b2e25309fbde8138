pub mod keeper;

pub use keeper::{AccountKeeper, ModuleAccount, STORE_KEY};
