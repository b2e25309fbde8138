pub mod broadcast;
pub mod codec;
pub mod errors;
pub mod sign_mode;
pub mod tx;

pub use broadcast::{BroadcastMode, TxResponse, OK_CODE};
pub use codec::TxEncoding;
pub use errors::{BroadcastError, BuildError, CodecError, QueryError, TransportError};
pub use sign_mode::{sign_bytes, SignMode, SignerData};
pub use tx::{tx_hash, AuthInfo, Fee, SignerInfo, Tx, TxBody};
