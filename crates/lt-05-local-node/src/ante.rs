//! # Admission Checks
//!
//! Runs before any message of a transaction executes, in this order:
//!
//! | Step | Rejects with |
//! |------|--------------|
//! | messages present, stateless message checks | 18 |
//! | one signature and signer info per signer | 4 |
//! | timeout height not passed | 30 |
//! | size gas within the gas limit | 11 |
//! | fee covers `gas_limit * min_gas_price` | 13 |
//! | fee deducted (from the granter under an allowance) | 5 / fee-grant codes |
//! | public key matches the signer | 8 |
//! | signature gas within the gas limit | 11 |
//! | sequence equals the account's | 32 |
//! | signature verifies | 4 |
//!
//! Each accepted signer's sequence is then incremented. Callers run this on
//! a checkpoint and roll back on rejection.

use lt_02_ledger_modules::{event_types, Event, ExecutionContext};
use lt_03_bootstrap::{NetworkConfig, TestKeepers};
use lt_04_tx_pipeline::{sign_bytes, SignerData, Tx};
use shared_crypto::Secp256k1Signature;
use shared_types::{Address, FEE_COLLECTOR_NAME};
use tracing::{debug, instrument};

use crate::rejection::{codes, Rejection};

/// Gas charged per encoded transaction byte.
pub const TX_SIZE_COST_PER_BYTE: u64 = 10;

/// Gas charged per secp256k1 signature check.
pub const SIG_VERIFY_COST_SECP256K1: u64 = 1_000;

/// Effects of a successful admission.
#[derive(Debug, Clone, Default)]
pub struct AnteOutcome {
    pub events: Vec<Event>,
    pub gas_used: u64,
}

struct GasMeter {
    limit: u64,
    consumed: u64,
}

impl GasMeter {
    fn new(limit: u64) -> Self {
        Self { limit, consumed: 0 }
    }

    fn consume(&mut self, amount: u64, descriptor: &str) -> Result<(), Rejection> {
        self.consumed = self.consumed.saturating_add(amount);
        if self.consumed > self.limit {
            return Err(Rejection::root(
                codes::OUT_OF_GAS,
                format!(
                    "out of gas in location: {descriptor}; gasWanted: {}, gasUsed: {}",
                    self.limit, self.consumed
                ),
            ));
        }
        Ok(())
    }
}

pub struct AnteHandler<'a> {
    keepers: &'a TestKeepers,
    config: &'a NetworkConfig,
}

impl<'a> AnteHandler<'a> {
    pub fn new(keepers: &'a TestKeepers, config: &'a NetworkConfig) -> Self {
        Self { keepers, config }
    }

    #[instrument(skip_all, fields(height = ctx.block_height()))]
    pub fn run(&self, ctx: &ExecutionContext, tx: &Tx, tx_len: usize) -> Result<AnteOutcome, Rejection> {
        let signers = validate_basic(tx)?;
        check_timeout(ctx, tx)?;

        let mut gas = GasMeter::new(tx.auth_info.fee.gas_limit);
        gas.consume((tx_len as u64).saturating_mul(TX_SIZE_COST_PER_BYTE), "txSize")?;

        let mut events = self.deduct_fee(ctx, tx, &signers)?;
        for (index, signer) in signers.iter().enumerate() {
            gas.consume(SIG_VERIFY_COST_SECP256K1, "ante verify: secp256k1")?;
            events.push(self.verify_signer(ctx, tx, index, signer)?);
        }

        debug!(signers = signers.len(), gas_used = gas.consumed, "admitted");
        Ok(AnteOutcome {
            events,
            gas_used: gas.consumed,
        })
    }

    fn deduct_fee(&self, ctx: &ExecutionContext, tx: &Tx, signers: &[Address]) -> Result<Vec<Event>, Rejection> {
        let fee = &tx.auth_info.fee;
        let required = self.config.min_fee(fee.gas_limit);
        if fee.amount.amount_of(&self.config.bond_denom) < required {
            return Err(Rejection::root(
                codes::INSUFFICIENT_FEE,
                format!(
                    "insufficient fees; got: {} required: {required}{}",
                    fee.amount, self.config.bond_denom
                ),
            ));
        }

        let mut events = Vec::new();
        let payer = signers[0];
        let deduct_from = match fee.granter {
            Some(granter) if granter != payer => {
                let used = self
                    .keepers
                    .feegrant
                    .use_granted_fees(ctx, &granter, &payer, &fee.amount)
                    .map_err(|e| {
                        Rejection::from_module(&e, &format!("{granter} does not allow to pay fees for {payer}"))
                    })?;
                events.extend(used);
                granter
            }
            _ => payer,
        };

        if self.keepers.accounts.get_account(ctx, &deduct_from)?.is_none() {
            return Err(Rejection::root(
                codes::UNKNOWN_ADDRESS,
                format!("fee payer address: {deduct_from} does not exist"),
            ));
        }
        if !fee.amount.is_zero() {
            self.keepers
                .bank
                .send_coins_from_account_to_module(ctx, &deduct_from, FEE_COLLECTOR_NAME, &fee.amount)
                .map_err(|e| Rejection::from_module(&e, "insufficient funds to pay fee"))?;
        }
        events.push(
            Event::new(event_types::TX)
                .attr("fee", &fee.amount)
                .attr("fee_payer", deduct_from),
        );
        Ok(events)
    }

    fn verify_signer(
        &self,
        ctx: &ExecutionContext,
        tx: &Tx,
        index: usize,
        signer: &Address,
    ) -> Result<Event, Rejection> {
        let info = &tx.auth_info.signer_infos[index];
        let accounts = &self.keepers.accounts;
        let record = accounts.get_account(ctx, signer)?.ok_or_else(|| {
            Rejection::root(codes::UNKNOWN_ADDRESS, format!("account {signer} does not exist"))
        })?;

        let key_bytes = info.public_key.as_bytes();
        let key_mismatch = || {
            Rejection::root(
                codes::INVALID_PUBKEY,
                format!("pubKey does not match signer address {signer} with signer index: {index}"),
            )
        };
        if info.public_key.to_address() != *signer {
            return Err(key_mismatch());
        }
        match &record.public_key {
            Some(known) if known.as_slice() != key_bytes.as_slice() => return Err(key_mismatch()),
            Some(_) => {}
            None => accounts.set_public_key(ctx, signer, key_bytes.to_vec())?,
        }

        if info.sequence != record.sequence {
            return Err(Rejection::root(
                codes::WRONG_SEQUENCE,
                format!(
                    "account sequence mismatch, expected {}, got {}",
                    record.sequence, info.sequence
                ),
            ));
        }

        let signer_data = SignerData {
            chain_id: ctx.chain_id().to_string(),
            account_number: record.account_number,
            sequence: info.sequence,
        };
        let doc = sign_bytes(tx, &signer_data, info.sign_mode)?;
        let verified = Secp256k1Signature::from_slice(&tx.signatures[index])
            .and_then(|sig| info.public_key.verify(&doc, &sig));
        if verified.is_err() {
            return Err(Rejection::root(
                codes::UNAUTHORIZED,
                format!(
                    "signature verification failed; please verify account number ({}) and chain-id ({})",
                    record.account_number,
                    ctx.chain_id()
                ),
            ));
        }

        accounts.increment_sequence(ctx, signer)?;
        Ok(Event::new(event_types::TX).attr("acc_seq", format!("{signer}/{}", info.sequence)))
    }
}

/// Stateless checks. Returns the signers in signature order.
fn validate_basic(tx: &Tx) -> Result<Vec<Address>, Rejection> {
    if tx.body.messages.is_empty() {
        return Err(Rejection::root(
            codes::INVALID_REQUEST,
            "must contain at least one message",
        ));
    }
    for msg in &tx.body.messages {
        msg.validate_basic()?;
    }

    let signers = tx.signers();
    if tx.auth_info.signer_infos.len() != signers.len() || tx.signatures.len() != signers.len() {
        return Err(Rejection::root(
            codes::UNAUTHORIZED,
            format!(
                "wrong number of signers; expected {}, got {} signer infos and {} signatures",
                signers.len(),
                tx.auth_info.signer_infos.len(),
                tx.signatures.len()
            ),
        ));
    }
    Ok(signers)
}

fn check_timeout(ctx: &ExecutionContext, tx: &Tx) -> Result<(), Rejection> {
    let timeout = tx.body.timeout_height;
    let next_height = ctx.block_height() + 1;
    if timeout != 0 && next_height > timeout {
        return Err(Rejection::root(
            codes::TX_TIMEOUT_HEIGHT,
            format!("block height: {next_height}, timeout height: {timeout}: tx timeout height"),
        ));
    }
    Ok(())
}
