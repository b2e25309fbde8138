//! # Bootstrap
//!
//! One call builds the whole ledger:
//!
//! 1. Merge caller permissions into a fresh copy of the base table
//! 2. Mount and construct keepers in dependency order
//! 3. Load the store
//! 4. Apply default distribution params, then default staking params
//!
//! The context carries [`example_timestamp`] and [`EXAMPLE_HEIGHT`].

use lt_02_ledger_modules::{distribution, staking, ExecutionContext};
use shared_types::{ConfigError, PermissionTable};
use tracing::{info, instrument};

use crate::config::{example_timestamp, BootstrapOptions, DEFAULT_CHAIN_ID, EXAMPLE_HEIGHT};
use crate::errors::BootstrapError;
use crate::initializer::Initializer;
use crate::keepers::TestKeepers;

/// Build the ledger, aborting the test on any setup failure.
///
/// # Panics
///
/// On any configuration error: a namespace mounted twice, a failed store
/// load, or default params that cannot be applied.
pub fn bootstrap(options: BootstrapOptions) -> (ExecutionContext, TestKeepers) {
    match try_bootstrap(options) {
        Ok(built) => built,
        Err(err) => panic!("ledger bootstrap failed: {err}"),
    }
}

/// Fallible form of [`bootstrap`].
#[instrument(name = "ledger_bootstrap", skip(options))]
pub fn try_bootstrap(options: BootstrapOptions) -> Result<(ExecutionContext, TestKeepers), BootstrapError> {
    info!("Initializing ledger modules");

    // Phase 1: permissions
    let permissions = PermissionTable::default_base().merged(&options.additional_permissions);
    info!(
        base = PermissionTable::default_base().len(),
        merged = permissions.len(),
        "Phase 1: module permissions merged"
    );
    let initializer = Initializer::new(permissions);

    // Phase 2: keepers, leaf-first
    info!("Phase 2: constructing keepers");
    let accounts = initializer.accounts()?;
    let bank = initializer.bank(&accounts)?;
    let staking = initializer.staking(&accounts, &bank)?;
    let distribution = initializer.distribution(&accounts, &bank, &staking)?;
    let feegrant = initializer.feegrant(&accounts)?;
    let upgrade = initializer.upgrade(options.upgrade_skip_heights)?;

    // Phase 3: load
    info!("Phase 3: loading store");
    initializer.load_latest()?;

    let ctx = ExecutionContext::new(
        initializer.store().clone(),
        example_timestamp(),
        EXAMPLE_HEIGHT,
        DEFAULT_CHAIN_ID,
    );

    // Phase 4: default params
    info!("Phase 4: applying default params");
    distribution
        .set_params(&ctx, &distribution::Params::default())
        .map_err(|e| ConfigError::DefaultParams {
            module: distribution::STORE_KEY.to_string(),
            reason: e.to_string(),
        })?;
    staking
        .set_params(&ctx, &staking::Params::default())
        .map_err(|e| ConfigError::DefaultParams {
            module: staking::STORE_KEY.to_string(),
            reason: e.to_string(),
        })?;

    info!(height = ctx.block_height(), "ledger ready");
    Ok((
        ctx,
        TestKeepers {
            initializer,
            accounts,
            bank,
            staking,
            distribution,
            feegrant,
            upgrade,
        },
    ))
}
