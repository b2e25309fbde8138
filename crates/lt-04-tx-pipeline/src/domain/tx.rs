//! # Transaction Envelope
//!
//! ```text
//! Tx
//! ├── body:       messages, memo, timeout height
//! ├── auth_info:  signer infos (public key, sign mode, sequence), fee
//! └── signatures: one per signer info, same order
//! ```
//!
//! A signature binds the body, the auth info, the chain id and the signer's
//! account number. The signer's sequence lives in its signer info, so a
//! stale sequence invalidates the signature along with the replay check.

use lt_02_ledger_modules::Msg;
use serde::{Deserialize, Serialize};
use shared_crypto::{sha256_hex, Secp256k1PublicKey};
use shared_types::{Address, Coins};

use super::sign_mode::SignMode;

/// Fee paid by the first signer, or by `granter` under a fee allowance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub amount: Coins,
    pub gas_limit: u64,
    pub granter: Option<Address>,
}

impl Fee {
    pub fn new(amount: Coins, gas_limit: u64) -> Self {
        Self {
            amount,
            gas_limit,
            granter: None,
        }
    }

    pub fn with_granter(mut self, granter: Address) -> Self {
        self.granter = Some(granter);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxBody {
    pub messages: Vec<Msg>,
    pub memo: String,
    /// Last height at which the transaction may be included. Zero disables
    /// the check.
    pub timeout_height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerInfo {
    pub public_key: Secp256k1PublicKey,
    pub sign_mode: SignMode,
    pub sequence: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    pub signer_infos: Vec<SignerInfo>,
    pub fee: Fee,
}

/// A transaction as it travels on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub body: TxBody,
    pub auth_info: AuthInfo,
    pub signatures: Vec<Vec<u8>>,
}

impl Tx {
    /// Distinct message signers in order of first appearance.
    pub fn signers(&self) -> Vec<Address> {
        let mut signers = Vec::new();
        for signer in self.body.messages.iter().map(Msg::signer) {
            if !signers.contains(&signer) {
                signers.push(signer);
            }
        }
        signers
    }

    /// The account charged for the fee when no granter is set.
    pub fn fee_payer(&self) -> Option<Address> {
        self.signers().first().copied()
    }
}

/// Upper-case hex SHA-256 of the encoded transaction.
pub fn tx_hash(tx_bytes: &[u8]) -> String {
    sha256_hex(tx_bytes).to_uppercase()
}
