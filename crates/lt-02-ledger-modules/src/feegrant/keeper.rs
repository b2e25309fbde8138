//! # Fee-Grant Keeper
//!
//! Lets a granter pay transaction fees on behalf of a grantee, up to an
//! optional spend limit and until an optional expiry.

use std::sync::Arc;

use lt_01_versioned_store::{KvStore, StoreKey};
use shared_types::{Address, Coins};
use tracing::debug;

use crate::auth::AccountKeeper;
use crate::context::ExecutionContext;
use crate::errors::ModuleError;
use crate::events::{event_types, Event};
use crate::feegrant::types::{BasicAllowance, Grant, MsgGrantAllowance, MsgRevokeAllowance};

pub const STORE_KEY: &str = "feegrant";

const GRANT_PREFIX: &[u8] = b"g/";

fn grant_key(granter: &Address, grantee: &Address) -> Vec<u8> {
    let mut key = grantee.as_bytes().to_vec();
    key.extend_from_slice(granter.as_bytes());
    key
}

/// Fee allowances. Depends on the account keeper.
pub struct FeeGrantKeeper {
    store_key: StoreKey,
    accounts: Arc<AccountKeeper>,
}

impl FeeGrantKeeper {
    pub fn new(store_key: StoreKey, accounts: Arc<AccountKeeper>) -> Self {
        Self {
            store_key,
            accounts,
        }
    }

    fn grants(&self, ctx: &ExecutionContext) -> Result<KvStore, ModuleError> {
        Ok(ctx.kv_store(&self.store_key)?.prefixed(GRANT_PREFIX))
    }

    pub fn grant_allowance(
        &self,
        ctx: &ExecutionContext,
        granter: &Address,
        grantee: &Address,
        allowance: BasicAllowance,
    ) -> Result<Vec<Event>, ModuleError> {
        if granter == grantee {
            return Err(ModuleError::InvalidRequest(
                "cannot self-grant fee authorization".into(),
            ));
        }
        if allowance.is_expired(ctx.block_time()) {
            return Err(ModuleError::InvalidRequest(
                "expiration is before current block time".into(),
            ));
        }
        if matches!(&allowance.spend_limit, Some(limit) if limit.is_empty()) {
            return Err(ModuleError::InvalidRequest("spend limit must be positive".into()));
        }
        if self.get_allowance(ctx, granter, grantee)?.is_some() {
            return Err(ModuleError::AllowanceExists {
                granter: *granter,
                grantee: *grantee,
            });
        }

        self.accounts.ensure_account(ctx, *grantee)?;
        let grant = Grant {
            granter: *granter,
            grantee: *grantee,
            allowance,
        };
        self.grants(ctx)?.set_value(grant_key(granter, grantee), &grant)?;
        debug!(%granter, %grantee, "fee allowance granted");

        Ok(vec![Event::new(event_types::SET_FEEGRANT)
            .attr("granter", granter)
            .attr("grantee", grantee)])
    }

    pub fn get_allowance(
        &self,
        ctx: &ExecutionContext,
        granter: &Address,
        grantee: &Address,
    ) -> Result<Option<Grant>, ModuleError> {
        Ok(self.grants(ctx)?.get_value(grant_key(granter, grantee))?)
    }

    /// Every grant naming `grantee`.
    pub fn grants_by_grantee(&self, ctx: &ExecutionContext, grantee: &Address) -> Result<Vec<Grant>, ModuleError> {
        Ok(self
            .grants(ctx)?
            .scan_values::<Grant>(grantee.as_bytes())?
            .into_iter()
            .map(|(_, g)| g)
            .collect())
    }

    pub fn revoke_allowance(
        &self,
        ctx: &ExecutionContext,
        granter: &Address,
        grantee: &Address,
    ) -> Result<Vec<Event>, ModuleError> {
        if self.get_allowance(ctx, granter, grantee)?.is_none() {
            return Err(ModuleError::AllowanceNotFound {
                granter: *granter,
                grantee: *grantee,
            });
        }
        self.grants(ctx)?.delete(grant_key(granter, grantee));
        Ok(vec![Event::new(event_types::REVOKE_FEEGRANT)
            .attr("granter", granter)
            .attr("grantee", grantee)])
    }

    /// Charge `fee` against the allowance. An expired allowance is removed.
    pub fn use_granted_fees(
        &self,
        ctx: &ExecutionContext,
        granter: &Address,
        grantee: &Address,
        fee: &Coins,
    ) -> Result<Vec<Event>, ModuleError> {
        let mut grant = self
            .get_allowance(ctx, granter, grantee)?
            .ok_or(ModuleError::AllowanceNotFound {
                granter: *granter,
                grantee: *grantee,
            })?;

        if grant.allowance.is_expired(ctx.block_time()) {
            self.grants(ctx)?.delete(grant_key(granter, grantee));
            return Err(ModuleError::AllowanceExpired);
        }
        if let Some(limit) = &grant.allowance.spend_limit {
            let remaining = limit
                .checked_sub(fee)
                .map_err(|_| ModuleError::FeeLimitExceeded)?;
            grant.allowance.spend_limit = Some(remaining);
        }
        self.grants(ctx)?.set_value(grant_key(granter, grantee), &grant)?;

        Ok(vec![Event::new(event_types::USE_FEEGRANT)
            .attr("granter", granter)
            .attr("grantee", grantee)])
    }

    pub fn handle_grant_allowance(&self, ctx: &ExecutionContext, msg: &MsgGrantAllowance) -> Result<Vec<Event>, ModuleError> {
        self.grant_allowance(ctx, &msg.granter, &msg.grantee, msg.allowance.clone())
    }

    pub fn handle_revoke_allowance(&self, ctx: &ExecutionContext, msg: &MsgRevokeAllowance) -> Result<Vec<Event>, ModuleError> {
        self.revoke_allowance(ctx, &msg.granter, &msg.grantee)
    }
}
