//! # Upgrade Keeper
//!
//! Tracks the scheduled upgrade plan, applied upgrades and the protocol
//! version. Has no module dependencies.

use std::collections::BTreeSet;
use std::sync::Arc;

use lt_01_versioned_store::{KvStore, StoreKey};
use shared_types::Address;
use tracing::{info, warn};

use crate::context::ExecutionContext;
use crate::errors::ModuleError;
use crate::upgrade::types::{AppliedUpgrade, Plan};

pub const STORE_KEY: &str = "upgrade";

const PLAN_KEY: &[u8] = b"p";
const PROTOCOL_VERSION_KEY: &[u8] = b"v";
const LAST_APPLIED_KEY: &[u8] = b"l";
const DONE_PREFIX: &[u8] = b"d/";

/// Receives the new protocol version whenever an upgrade is applied.
pub trait ProtocolVersionSetter: Send + Sync {
    fn set_protocol_version(&self, version: u64);
}

/// Setter that ignores the version.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProtocolVersionSetter;

impl ProtocolVersionSetter for NoopProtocolVersionSetter {
    fn set_protocol_version(&self, _version: u64) {}
}

/// What `begin_block` decided about the current plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStatus {
    /// No plan, or not yet at its height.
    Idle,
    /// The plan height is in the skip set; the plan was cleared.
    Skipped(Plan),
    /// The plan must be applied at this height.
    Due(Plan),
}

pub struct UpgradeKeeper {
    store_key: StoreKey,
    skip_heights: BTreeSet<u64>,
    authority: Address,
    version_setter: Arc<dyn ProtocolVersionSetter>,
}

impl UpgradeKeeper {
    pub fn new(
        store_key: StoreKey,
        skip_heights: BTreeSet<u64>,
        authority: Address,
        version_setter: Arc<dyn ProtocolVersionSetter>,
    ) -> Self {
        Self {
            store_key,
            skip_heights,
            authority,
            version_setter,
        }
    }

    pub fn authority(&self) -> Address {
        self.authority
    }

    pub fn is_skip_height(&self, height: u64) -> bool {
        self.skip_heights.contains(&height)
    }

    fn kv(&self, ctx: &ExecutionContext) -> Result<KvStore, ModuleError> {
        ctx.kv_store(&self.store_key)
    }

    /// Schedule `plan`, replacing any existing one.
    pub fn schedule_upgrade(&self, ctx: &ExecutionContext, plan: Plan) -> Result<(), ModuleError> {
        plan.validate_basic().map_err(ModuleError::InvalidPlan)?;
        if plan.height <= ctx.block_height() {
            return Err(ModuleError::InvalidPlan(
                "upgrade cannot be scheduled in the past".into(),
            ));
        }
        if self.get_done_height(ctx, &plan.name)?.is_some() {
            return Err(ModuleError::UpgradeAlreadyApplied(plan.name));
        }
        if let Some(previous) = self.get_upgrade_plan(ctx)? {
            warn!(replaced = %previous.name, "replacing scheduled upgrade plan");
        }
        self.kv(ctx)?.set_value(PLAN_KEY, &plan)?;
        info!(name = %plan.name, height = plan.height, "upgrade scheduled");
        Ok(())
    }

    /// Authority-gated `schedule_upgrade`.
    pub fn software_upgrade(&self, ctx: &ExecutionContext, signer: &Address, plan: Plan) -> Result<(), ModuleError> {
        self.check_authority(signer)?;
        self.schedule_upgrade(ctx, plan)
    }

    /// Authority-gated `clear_upgrade_plan`.
    pub fn cancel_upgrade(&self, ctx: &ExecutionContext, signer: &Address) -> Result<(), ModuleError> {
        self.check_authority(signer)?;
        self.clear_upgrade_plan(ctx)
    }

    fn check_authority(&self, signer: &Address) -> Result<(), ModuleError> {
        if *signer != self.authority {
            return Err(ModuleError::Unauthorized(format!(
                "expected {} as authority, got {}",
                self.authority, signer
            )));
        }
        Ok(())
    }

    pub fn clear_upgrade_plan(&self, ctx: &ExecutionContext) -> Result<(), ModuleError> {
        self.kv(ctx)?.delete(PLAN_KEY);
        Ok(())
    }

    pub fn get_upgrade_plan(&self, ctx: &ExecutionContext) -> Result<Option<Plan>, ModuleError> {
        Ok(self.kv(ctx)?.get_value(PLAN_KEY)?)
    }

    pub fn get_done_height(&self, ctx: &ExecutionContext, name: &str) -> Result<Option<u64>, ModuleError> {
        Ok(self.kv(ctx)?.prefixed(DONE_PREFIX).get_value(name)?)
    }

    pub fn get_last_completed_upgrade(&self, ctx: &ExecutionContext) -> Result<Option<AppliedUpgrade>, ModuleError> {
        Ok(self.kv(ctx)?.get_value(LAST_APPLIED_KEY)?)
    }

    pub fn protocol_version(&self, ctx: &ExecutionContext) -> Result<u64, ModuleError> {
        Ok(self.kv(ctx)?.get_value(PROTOCOL_VERSION_KEY)?.unwrap_or(0))
    }

    /// Mark `plan` done at the current height and bump the protocol version.
    pub fn apply_upgrade(&self, ctx: &ExecutionContext, plan: &Plan) -> Result<u64, ModuleError> {
        if self.get_done_height(ctx, &plan.name)?.is_some() {
            return Err(ModuleError::UpgradeAlreadyApplied(plan.name.clone()));
        }
        let kv = self.kv(ctx)?;
        let height = ctx.block_height();
        kv.prefixed(DONE_PREFIX).set_value(&plan.name, &height)?;
        kv.set_value(
            LAST_APPLIED_KEY,
            &AppliedUpgrade {
                name: plan.name.clone(),
                height,
            },
        )?;

        let version = self.protocol_version(ctx)? + 1;
        kv.set_value(PROTOCOL_VERSION_KEY, &version)?;
        self.version_setter.set_protocol_version(version);
        self.clear_upgrade_plan(ctx)?;

        info!(name = %plan.name, height, version, "upgrade applied");
        Ok(version)
    }

    /// Inspect the plan at the start of a block.
    pub fn begin_block(&self, ctx: &ExecutionContext) -> Result<PlanStatus, ModuleError> {
        let Some(plan) = self.get_upgrade_plan(ctx)? else {
            return Ok(PlanStatus::Idle);
        };
        if !plan.should_execute(ctx.block_height()) {
            return Ok(PlanStatus::Idle);
        }
        if self.is_skip_height(ctx.block_height()) {
            warn!(name = %plan.name, height = ctx.block_height(), "skipping upgrade");
            self.clear_upgrade_plan(ctx)?;
            return Ok(PlanStatus::Skipped(plan));
        }
        Ok(PlanStatus::Due(plan))
    }
}
