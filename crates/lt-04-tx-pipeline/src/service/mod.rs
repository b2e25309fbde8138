pub mod broadcaster;
pub mod builder;
pub mod resolver;

pub use broadcaster::Broadcaster;
pub use builder::{TxBuilder, TxGenInfo, DEFAULT_GAS_LIMIT};
pub use resolver::AccountResolver;
