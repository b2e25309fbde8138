//! # Sign Documents
//!
//! The bytes a signature is computed over. Two modes are supported:
//!
//! - [`SignMode::Direct`]: the encoded body and auth info plus chain id and
//!   account number. The sequence is bound through the signer info inside
//!   the auth info.
//! - [`SignMode::LegacyJson`]: a JSON document with sorted keys carrying the
//!   sequence explicitly.
//!
//! Both sides of the wire (builder and node) compute the document with
//! [`sign_bytes`], so they agree byte for byte.

use std::fmt;
use std::str::FromStr;

use lt_02_ledger_modules::Msg;
use serde::{Deserialize, Serialize};

use super::errors::CodecError;
use super::tx::{Fee, Tx};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignMode {
    #[default]
    Direct,
    LegacyJson,
}

impl fmt::Display for SignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignMode::Direct => f.write_str("direct"),
            SignMode::LegacyJson => f.write_str("legacy-json"),
        }
    }
}

impl FromStr for SignMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(SignMode::Direct),
            "legacy-json" | "amino-json" => Ok(SignMode::LegacyJson),
            other => Err(format!("unknown sign mode {other:?}")),
        }
    }
}

/// Chain-side facts a signature commits to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerData {
    pub chain_id: String,
    pub account_number: u64,
    pub sequence: u64,
}

#[derive(Serialize)]
struct DirectSignDoc<'a> {
    body_bytes: Vec<u8>,
    auth_info_bytes: Vec<u8>,
    chain_id: &'a str,
    account_number: u64,
}

#[derive(Serialize)]
struct LegacyFee {
    amount: String,
    gas: String,
    granter: Option<String>,
}

impl From<&Fee> for LegacyFee {
    fn from(fee: &Fee) -> Self {
        Self {
            amount: fee.amount.to_string(),
            gas: fee.gas_limit.to_string(),
            granter: fee.granter.map(|g| g.to_string()),
        }
    }
}

#[derive(Serialize)]
struct LegacySignDoc<'a> {
    account_number: String,
    chain_id: &'a str,
    fee: LegacyFee,
    memo: &'a str,
    msgs: &'a [Msg],
    sequence: String,
    timeout_height: String,
}

/// Canonical bytes `signer` signs for `tx` under `mode`.
///
/// Signatures already present on `tx` are ignored.
pub fn sign_bytes(tx: &Tx, signer: &SignerData, mode: SignMode) -> Result<Vec<u8>, CodecError> {
    match mode {
        SignMode::Direct => {
            let doc = DirectSignDoc {
                body_bytes: bincode::serialize(&tx.body)?,
                auth_info_bytes: bincode::serialize(&tx.auth_info)?,
                chain_id: &signer.chain_id,
                account_number: signer.account_number,
            };
            Ok(bincode::serialize(&doc)?)
        }
        SignMode::LegacyJson => {
            let doc = LegacySignDoc {
                account_number: signer.account_number.to_string(),
                chain_id: &signer.chain_id,
                fee: LegacyFee::from(&tx.auth_info.fee),
                memo: &tx.body.memo,
                msgs: &tx.body.messages,
                sequence: signer.sequence.to_string(),
                timeout_height: tx.body.timeout_height.to_string(),
            };
            // Round-trip through Value so nested object keys come out sorted.
            let value = serde_json::to_value(&doc)?;
            Ok(serde_json::to_vec(&value)?)
        }
    }
}
