//! # Transaction Builder
//!
//! ```text
//! resolve account ──► assemble body + fee ──► placeholder signer info
//!        │                                           │
//!  (sequence skipped                                 ▼
//!   when overridden)             sign-doc ──► sign ──► replace placeholder ──► encode
//! ```
//!
//! The builder keeps no state between calls. Two concurrent builds for the
//! same account resolve the same sequence, and the node accepts only one.

use lt_02_ledger_modules::Msg;
use shared_crypto::Identity;
use shared_types::{Address, Coins};
use tracing::{debug, info, instrument};

use crate::domain::{
    sign_bytes, AuthInfo, BuildError, Fee, SignMode, SignerData, SignerInfo, Tx, TxBody,
    TxEncoding,
};
use crate::service::resolver::AccountResolver;

/// Default gas limit for generated transactions.
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;

/// Per-transaction inputs.
#[derive(Debug, Clone)]
pub struct TxGenInfo {
    pub account: Identity,
    pub gas_limit: u64,
    /// Zero means no timeout.
    pub timeout_height: u64,
    pub fee: Coins,
    pub fee_granter: Option<Address>,
    pub memo: String,
    /// Sign with `sequence` instead of the resolved one.
    pub override_sequence: bool,
    pub sequence: u64,
}

impl TxGenInfo {
    pub fn new(account: Identity) -> Self {
        Self {
            account,
            gas_limit: DEFAULT_GAS_LIMIT,
            timeout_height: 0,
            fee: Coins::empty(),
            fee_granter: None,
            memo: String::new(),
            override_sequence: false,
            sequence: 0,
        }
    }

    pub fn with_fee(mut self, fee: Coins) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn with_timeout_height(mut self, height: u64) -> Self {
        self.timeout_height = height;
        self
    }

    pub fn with_fee_granter(mut self, granter: Address) -> Self {
        self.fee_granter = Some(granter);
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Pin the signing sequence. The resolved sequence is ignored.
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.override_sequence = true;
        self.sequence = sequence;
        self
    }
}

/// Builds, signs and encodes transactions for one chain.
#[derive(Clone)]
pub struct TxBuilder {
    resolver: AccountResolver,
    chain_id: String,
    sign_mode: SignMode,
    encoding: TxEncoding,
}

impl TxBuilder {
    pub fn new(resolver: AccountResolver, chain_id: impl Into<String>) -> Self {
        Self {
            resolver,
            chain_id: chain_id.into(),
            sign_mode: SignMode::default(),
            encoding: TxEncoding::default(),
        }
    }

    pub fn with_sign_mode(mut self, mode: SignMode) -> Self {
        self.sign_mode = mode;
        self
    }

    pub fn with_encoding(mut self, encoding: TxEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn sign_mode(&self) -> SignMode {
        self.sign_mode
    }

    pub fn encoding(&self) -> TxEncoding {
        self.encoding
    }

    /// Build and sign, then encode to wire bytes.
    pub async fn create_tx_bytes(&self, info: &TxGenInfo, msgs: Vec<Msg>) -> Result<Vec<u8>, BuildError> {
        let tx = self.build_signed(info, msgs).await?;
        Ok(self.encoding.encode(&tx)?)
    }

    /// Resolve the signer, then produce a signed envelope.
    #[instrument(skip_all, fields(signer = %info.account.address(), msgs = msgs.len()))]
    pub async fn build_signed(&self, info: &TxGenInfo, msgs: Vec<Msg>) -> Result<Tx, BuildError> {
        let account = info.account.address();
        if msgs.is_empty() {
            return Err(BuildError::NoMessages);
        }
        if let Some(signer) = msgs.iter().map(Msg::signer).find(|s| *s != account) {
            return Err(BuildError::SignerMismatch { signer, account });
        }

        // The account number is needed either way; only the sequence is
        // overridable.
        let record = self.resolver.resolve(&account).await?;
        let sequence = if info.override_sequence {
            debug!(resolved = record.sequence, pinned = info.sequence, "sequence overridden");
            info.sequence
        } else {
            record.sequence
        };

        let signer = SignerData {
            chain_id: self.chain_id.clone(),
            account_number: record.account_number,
            sequence,
        };
        let tx = self.sign(&info.account, &signer, Self::unsigned(info, msgs))?;
        info!(
            account_number = signer.account_number,
            sequence,
            mode = %self.sign_mode,
            "transaction signed"
        );
        Ok(tx)
    }

    /// Envelope with body and fee set and no signer infos yet.
    pub fn unsigned(info: &TxGenInfo, msgs: Vec<Msg>) -> Tx {
        let mut fee = Fee::new(info.fee.clone(), info.gas_limit);
        fee.granter = info.fee_granter;
        Tx {
            body: TxBody {
                messages: msgs,
                memo: info.memo.clone(),
                timeout_height: info.timeout_height,
            },
            auth_info: AuthInfo {
                signer_infos: Vec::new(),
                fee,
            },
            signatures: Vec::new(),
        }
    }

    /// Attach a placeholder signer info for `identity`, compute the sign-doc
    /// over the envelope, and replace the placeholder with the real
    /// signature.
    pub fn sign(&self, identity: &Identity, signer: &SignerData, mut tx: Tx) -> Result<Tx, BuildError> {
        tx.auth_info.signer_infos = vec![SignerInfo {
            public_key: identity.public_key(),
            sign_mode: self.sign_mode,
            sequence: signer.sequence,
        }];
        tx.signatures = vec![Vec::new()];

        let doc = sign_bytes(&tx, signer, self.sign_mode)?;
        let signature = identity.private_key().sign(&doc);
        tx.signatures = vec![signature.as_bytes().to_vec()];
        Ok(tx)
    }
}
