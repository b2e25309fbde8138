pub mod outbound;

pub use outbound::{NodeInfo, QueryClient, TxSubmitter};
