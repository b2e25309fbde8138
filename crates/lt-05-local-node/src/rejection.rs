//! Transaction rejections and the codes a node reports for them.

use lt_02_ledger_modules::{ModuleError, ROOT_CODESPACE};
use lt_04_tx_pipeline::{CodecError, TxResponse};
use thiserror::Error;

/// Result codes in the root codespace.
pub mod codes {
    pub const TX_DECODE: u32 = 2;
    pub const UNAUTHORIZED: u32 = 4;
    pub const INSUFFICIENT_FUNDS: u32 = 5;
    pub const INVALID_PUBKEY: u32 = 8;
    pub const UNKNOWN_ADDRESS: u32 = 9;
    pub const OUT_OF_GAS: u32 = 11;
    pub const INSUFFICIENT_FEE: u32 = 13;
    pub const INVALID_REQUEST: u32 = 18;
    pub const TX_TIMEOUT_HEIGHT: u32 = 30;
    pub const WRONG_SEQUENCE: u32 = 32;
}

/// Why a transaction was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{codespace} code {code}: {log}")]
pub struct Rejection {
    pub codespace: String,
    pub code: u32,
    pub log: String,
}

impl Rejection {
    /// Rejection in the root codespace.
    pub fn root(code: u32, log: impl Into<String>) -> Self {
        Self {
            codespace: ROOT_CODESPACE.to_string(),
            code,
            log: log.into(),
        }
    }

    /// Same codes as `err`, with `context` prefixed to the log.
    pub fn from_module(err: &ModuleError, context: &str) -> Self {
        let (codespace, code) = err.abci_code();
        let log = if context.is_empty() {
            err.to_string()
        } else {
            format!("{context}: {err}")
        };
        Self {
            codespace: codespace.to_string(),
            code,
            log,
        }
    }

    pub fn into_response(self, txhash: impl Into<String>) -> TxResponse {
        TxResponse::rejected(txhash, self.codespace, self.code, self.log)
    }
}

impl From<ModuleError> for Rejection {
    fn from(err: ModuleError) -> Self {
        Rejection::from_module(&err, "")
    }
}

impl From<CodecError> for Rejection {
    fn from(err: CodecError) -> Self {
        Rejection::root(codes::TX_DECODE, format!("tx parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Address;

    #[test]
    fn test_module_errors_keep_their_codes() {
        let err = ModuleError::ValidatorNotFound(Address::derive(b"v"));
        let rejection = Rejection::from_module(&err, "message index: 0");
        assert_eq!(rejection.codespace, "staking");
        assert_eq!(rejection.code, 3);
        assert!(rejection.log.starts_with("message index: 0: "));
    }

    #[test]
    fn test_decode_errors_are_code_2() {
        let rejection: Rejection = CodecError::Json("eof".into()).into();
        assert_eq!(rejection.code, codes::TX_DECODE);
        assert_eq!(rejection.codespace, ROOT_CODESPACE);
    }

    #[test]
    fn test_into_response() {
        let response = Rejection::root(codes::WRONG_SEQUENCE, "account sequence mismatch").into_response("AB");
        assert!(!response.is_ok());
        assert_eq!(response.code, 32);
        assert_eq!(response.txhash, "AB");
    }
}
