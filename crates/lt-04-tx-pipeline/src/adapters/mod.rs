pub mod json_rpc;

pub use json_rpc::{JsonRpcNodeClient, NOT_FOUND_CODE};
