//! Genesis: validator accounts, balances and self-delegations.

use lt_02_ledger_modules::staking::{self, Description, MsgCreateValidator};
use lt_02_ledger_modules::{ExecutionContext, ModuleError};
use lt_03_bootstrap::{NetworkConfig, TestKeepers};
use shared_crypto::Identity;
use shared_types::{Coin, Coins};
use tracing::info;

use crate::errors::NodeError;

/// Commission every genesis validator charges, in basis points.
pub const GENESIS_COMMISSION_BPS: u32 = 1_000;

/// Create `config.num_validators` funded, bonded validators.
///
/// Each validator account receives `account_tokens` of `node<i>token` and
/// `staking_tokens` of the bond denom, then self-delegates `bonded_tokens`.
/// The self-delegation counts as the account's first signed transaction,
/// so validators start at sequence 1.
pub fn init_validators(
    ctx: &ExecutionContext,
    keepers: &TestKeepers,
    config: &NetworkConfig,
) -> Result<Vec<Identity>, NodeError> {
    if config.bond_denom != staking::DEFAULT_BOND_DENOM {
        let params = staking::Params {
            bond_denom: config.bond_denom.clone(),
            ..staking::Params::default()
        };
        keepers.staking.set_params(ctx, &params).map_err(NodeError::Genesis)?;
    }

    let mut validators = Vec::with_capacity(config.num_validators);
    for index in 0..config.num_validators {
        let identity = Identity::generate();
        let address = identity.address();

        let balance = Coins::new([
            Coin::new(format!("node{index}token"), config.account_tokens),
            Coin::new(config.bond_denom.clone(), config.staking_tokens),
        ])
        .map_err(|e| NodeError::Genesis(ModuleError::Coins(e)))?;
        keepers
            .mint_to_account(ctx, &address, &balance)
            .map_err(NodeError::Genesis)?;

        let msg = MsgCreateValidator {
            description: Description::new(format!("node{index}")),
            commission_rate_bps: GENESIS_COMMISSION_BPS,
            min_self_delegation: 1,
            validator_address: address,
            pubkey: identity.public_key().as_bytes().to_vec(),
            value: Coin::new(config.bond_denom.clone(), config.bonded_tokens),
        };
        keepers
            .staking
            .handle_create_validator(ctx, &msg)
            .map_err(NodeError::Genesis)?;
        keepers
            .accounts
            .set_public_key(ctx, &address, identity.public_key().as_bytes().to_vec())
            .map_err(NodeError::Genesis)?;
        keepers
            .accounts
            .increment_sequence(ctx, &address)
            .map_err(NodeError::Genesis)?;

        info!(index, %address, bonded = config.bonded_tokens, "  [genesis] validator created");
        validators.push(identity);
    }
    Ok(validators)
}
