//! # Bank Keeper
//!
//! Balance ledger and total supply. Moves coins between user and module
//! accounts, mints and burns on behalf of modules holding the matching
//! capability, and refuses to credit blocked (module) addresses through
//! user-facing sends.

use std::collections::BTreeSet;
use std::sync::Arc;

use lt_01_versioned_store::{KvStore, StoreKey};
use shared_types::{Address, Capability, Coin, Coins, ADDRESS_LEN};
use tracing::{debug, instrument};

use crate::auth::{AccountKeeper, ModuleAccount};
use crate::bank::types::MsgSend;
use crate::context::ExecutionContext;
use crate::errors::ModuleError;
use crate::events::{event_types, Event};

pub const STORE_KEY: &str = "bank";

const BALANCES_PREFIX: &[u8] = b"b/";
const SUPPLY_PREFIX: &[u8] = b"s/";

/// Balance ledger. Depends on the account keeper.
pub struct BankKeeper {
    store_key: StoreKey,
    accounts: Arc<AccountKeeper>,
    blocked_addrs: BTreeSet<Address>,
    authority: Address,
}

impl BankKeeper {
    pub fn new(
        store_key: StoreKey,
        accounts: Arc<AccountKeeper>,
        blocked_addrs: BTreeSet<Address>,
        authority: Address,
    ) -> Self {
        Self {
            store_key,
            accounts,
            blocked_addrs,
            authority,
        }
    }

    pub fn authority(&self) -> Address {
        self.authority
    }

    pub fn account_keeper(&self) -> &Arc<AccountKeeper> {
        &self.accounts
    }

    /// True if `address` may not receive funds through `MsgSend`.
    pub fn is_blocked(&self, address: &Address) -> bool {
        self.blocked_addrs.contains(address)
    }

    pub fn blocked_addrs(&self) -> &BTreeSet<Address> {
        &self.blocked_addrs
    }

    fn balances(&self, ctx: &ExecutionContext, address: &Address) -> Result<KvStore, ModuleError> {
        Ok(ctx
            .kv_store(&self.store_key)?
            .prefixed(BALANCES_PREFIX)
            .prefixed(address.as_bytes()))
    }

    fn supply(&self, ctx: &ExecutionContext) -> Result<KvStore, ModuleError> {
        Ok(ctx.kv_store(&self.store_key)?.prefixed(SUPPLY_PREFIX))
    }

    pub fn get_balance(&self, ctx: &ExecutionContext, address: &Address, denom: &str) -> Result<Coin, ModuleError> {
        let amount = self
            .balances(ctx, address)?
            .get_value::<u128>(denom)?
            .unwrap_or(0);
        Ok(Coin::new(denom, amount))
    }

    pub fn get_all_balances(&self, ctx: &ExecutionContext, address: &Address) -> Result<Coins, ModuleError> {
        let coins = self
            .balances(ctx, address)?
            .scan_values::<u128>(b"")?
            .into_iter()
            .map(|(denom, amount)| Coin::new(String::from_utf8_lossy(&denom), amount));
        Coins::new(coins).map_err(ModuleError::Coins)
    }

    /// Balances of every holder, ordered by address.
    pub fn all_balances(&self, ctx: &ExecutionContext) -> Result<Vec<(Address, Coins)>, ModuleError> {
        let mut holders: Vec<(Address, Coins)> = Vec::new();
        let pairs = ctx
            .kv_store(&self.store_key)?
            .prefixed(BALANCES_PREFIX)
            .scan_values::<u128>(b"")?;
        for (key, amount) in pairs {
            if key.len() <= ADDRESS_LEN {
                continue;
            }
            let mut raw = [0u8; ADDRESS_LEN];
            raw.copy_from_slice(&key[..ADDRESS_LEN]);
            let address = Address(raw);
            let coin = Coins::single(String::from_utf8_lossy(&key[ADDRESS_LEN..]), amount);
            match holders.last_mut() {
                Some((last, coins)) if *last == address => {
                    *coins = coins.checked_add(&coin).map_err(ModuleError::Coins)?;
                }
                _ => holders.push((address, coin)),
            }
        }
        Ok(holders)
    }

    pub fn get_supply(&self, ctx: &ExecutionContext, denom: &str) -> Result<Coin, ModuleError> {
        let amount = self.supply(ctx)?.get_value::<u128>(denom)?.unwrap_or(0);
        Ok(Coin::new(denom, amount))
    }

    pub fn total_supply(&self, ctx: &ExecutionContext) -> Result<Coins, ModuleError> {
        let coins = self
            .supply(ctx)?
            .scan_values::<u128>(b"")?
            .into_iter()
            .map(|(denom, amount)| Coin::new(String::from_utf8_lossy(&denom), amount));
        Coins::new(coins).map_err(ModuleError::Coins)
    }

    fn write_balances(&self, ctx: &ExecutionContext, address: &Address, old: &Coins, new: &Coins) -> Result<(), ModuleError> {
        let kv = self.balances(ctx, address)?;
        for coin in old {
            if new.amount_of(&coin.denom) == 0 {
                kv.delete(coin.denom.as_bytes());
            }
        }
        for coin in new {
            kv.set_value(coin.denom.as_bytes(), &coin.amount)?;
        }
        Ok(())
    }

    fn add_coins(&self, ctx: &ExecutionContext, address: &Address, amount: &Coins) -> Result<(), ModuleError> {
        let old = self.get_all_balances(ctx, address)?;
        let new = old.checked_add(amount).map_err(ModuleError::Coins)?;
        self.write_balances(ctx, address, &old, &new)
    }

    fn sub_coins(&self, ctx: &ExecutionContext, address: &Address, amount: &Coins) -> Result<(), ModuleError> {
        let old = self.get_all_balances(ctx, address)?;
        let new = old
            .checked_sub(amount)
            .map_err(|e| ModuleError::insufficient(*address, e))?;
        self.write_balances(ctx, address, &old, &new)
    }

    fn adjust_supply(&self, ctx: &ExecutionContext, amount: &Coins, increase: bool) -> Result<(), ModuleError> {
        let kv = self.supply(ctx)?;
        for coin in amount {
            let current = kv.get_value::<u128>(coin.denom.as_bytes())?.unwrap_or(0);
            let next = if increase {
                current.checked_add(coin.amount).ok_or(ModuleError::Coins(
                    shared_types::CoinsError::Overflow,
                ))?
            } else {
                current.saturating_sub(coin.amount)
            };
            if next == 0 {
                kv.delete(coin.denom.as_bytes());
            } else {
                kv.set_value(coin.denom.as_bytes(), &next)?;
            }
        }
        Ok(())
    }

    /// Move coins between two accounts, creating the recipient if needed.
    pub fn send_coins(
        &self,
        ctx: &ExecutionContext,
        from: &Address,
        to: &Address,
        amount: &Coins,
    ) -> Result<Vec<Event>, ModuleError> {
        self.sub_coins(ctx, from, amount)?;
        self.add_coins(ctx, to, amount)?;
        self.accounts.ensure_account(ctx, *to)?;
        debug!(%from, %to, %amount, "coins sent");

        Ok(vec![
            Event::new(event_types::COIN_SPENT)
                .attr("spender", from)
                .attr("amount", amount),
            Event::new(event_types::COIN_RECEIVED)
                .attr("receiver", to)
                .attr("amount", amount),
            Event::new(event_types::TRANSFER)
                .attr("recipient", to)
                .attr("sender", from)
                .attr("amount", amount),
        ])
    }

    fn module_account_with(
        &self,
        ctx: &ExecutionContext,
        module: &str,
        capability: Option<Capability>,
    ) -> Result<ModuleAccount, ModuleError> {
        let account = self.accounts.get_module_account(ctx, module)?;
        if let Some(capability) = capability {
            if !account.has_permission(capability) {
                return Err(ModuleError::MissingPermission {
                    module: module.to_string(),
                    capability,
                });
            }
        }
        Ok(account)
    }

    /// Create coins in the module account of `module`. Requires `Minter`.
    #[instrument(skip(self, ctx, amount), fields(amount = %amount))]
    pub fn mint_coins(&self, ctx: &ExecutionContext, module: &str, amount: &Coins) -> Result<Vec<Event>, ModuleError> {
        let account = self.module_account_with(ctx, module, Some(Capability::Minter))?;
        self.add_coins(ctx, &account.address(), amount)?;
        self.adjust_supply(ctx, amount, true)?;
        debug!(module, "minted");

        Ok(vec![
            Event::new(event_types::COIN_RECEIVED)
                .attr("receiver", account.address())
                .attr("amount", amount),
            Event::new(event_types::COINBASE)
                .attr("minter", account.address())
                .attr("amount", amount),
        ])
    }

    /// Destroy coins held by the module account of `module`. Requires
    /// `Burner`.
    #[instrument(skip(self, ctx, amount), fields(amount = %amount))]
    pub fn burn_coins(&self, ctx: &ExecutionContext, module: &str, amount: &Coins) -> Result<Vec<Event>, ModuleError> {
        let account = self.module_account_with(ctx, module, Some(Capability::Burner))?;
        self.sub_coins(ctx, &account.address(), amount)?;
        self.adjust_supply(ctx, amount, false)?;

        Ok(vec![
            Event::new(event_types::COIN_SPENT)
                .attr("spender", account.address())
                .attr("amount", amount),
            Event::new(event_types::BURN)
                .attr("burner", account.address())
                .attr("amount", amount),
        ])
    }

    /// Pay out of a module account. Blocked recipients are refused.
    pub fn send_coins_from_module_to_account(
        &self,
        ctx: &ExecutionContext,
        module: &str,
        to: &Address,
        amount: &Coins,
    ) -> Result<Vec<Event>, ModuleError> {
        if self.is_blocked(to) {
            return Err(ModuleError::BlockedAddress(*to));
        }
        let account = self.module_account_with(ctx, module, None)?;
        self.send_coins(ctx, &account.address(), to, amount)
    }

    pub fn send_coins_from_account_to_module(
        &self,
        ctx: &ExecutionContext,
        from: &Address,
        module: &str,
        amount: &Coins,
    ) -> Result<Vec<Event>, ModuleError> {
        let account = self.module_account_with(ctx, module, None)?;
        self.send_coins(ctx, from, &account.address(), amount)
    }

    pub fn send_coins_from_module_to_module(
        &self,
        ctx: &ExecutionContext,
        from_module: &str,
        to_module: &str,
        amount: &Coins,
    ) -> Result<Vec<Event>, ModuleError> {
        let from = self.module_account_with(ctx, from_module, None)?;
        let to = self.module_account_with(ctx, to_module, None)?;
        self.send_coins(ctx, &from.address(), &to.address(), amount)
    }

    /// Lock a delegator's coins in a staking pool. The pool must hold
    /// `Staking`.
    pub fn delegate_coins_from_account_to_module(
        &self,
        ctx: &ExecutionContext,
        delegator: &Address,
        module: &str,
        amount: &Coins,
    ) -> Result<Vec<Event>, ModuleError> {
        let pool = self.module_account_with(ctx, module, Some(Capability::Staking))?;
        self.send_coins(ctx, delegator, &pool.address(), amount)
    }

    /// Release coins from a staking pool back to a delegator.
    pub fn undelegate_coins_from_module_to_account(
        &self,
        ctx: &ExecutionContext,
        module: &str,
        delegator: &Address,
        amount: &Coins,
    ) -> Result<Vec<Event>, ModuleError> {
        let pool = self.module_account_with(ctx, module, Some(Capability::Staking))?;
        self.send_coins(ctx, &pool.address(), delegator, amount)
    }

    /// `MsgSend` handler.
    pub fn handle_send(&self, ctx: &ExecutionContext, msg: &MsgSend) -> Result<Vec<Event>, ModuleError> {
        if self.is_blocked(&msg.to_address) {
            return Err(ModuleError::BlockedAddress(msg.to_address));
        }
        self.send_coins(ctx, &msg.from_address, &msg.to_address, &msg.amount)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::TestStack;
    use shared_types::{
        Address, Capability, Coins, BONDED_POOL_NAME, FEE_COLLECTOR_NAME, MINT_MODULE_NAME,
    };

    use super::*;

    fn coins(s: &str) -> Coins {
        s.parse().unwrap()
    }

    #[test]
    fn test_mint_requires_minter() {
        let stack = TestStack::new();
        let err = stack
            .bank
            .mint_coins(&stack.ctx, FEE_COLLECTOR_NAME, &coins("10stake"))
            .unwrap_err();
        assert_eq!(
            err,
            ModuleError::MissingPermission {
                module: FEE_COLLECTOR_NAME.into(),
                capability: Capability::Minter
            }
        );
    }

    #[test]
    fn test_mint_updates_supply_and_module_balance() {
        let stack = TestStack::new();
        stack
            .bank
            .mint_coins(&stack.ctx, MINT_MODULE_NAME, &coins("100stake,5token"))
            .unwrap();

        let mint = Address::for_module(MINT_MODULE_NAME);
        assert_eq!(
            stack.bank.get_all_balances(&stack.ctx, &mint).unwrap(),
            coins("100stake,5token")
        );
        assert_eq!(
            stack.bank.get_supply(&stack.ctx, "stake").unwrap().amount,
            100
        );
    }

    #[test]
    fn test_send_creates_recipient_account() {
        let stack = TestStack::new();
        let alice = stack.funded(b"alice", "50stake");
        let bob = Address::derive(b"bob");

        let events = stack
            .bank
            .send_coins(&stack.ctx, &alice, &bob, &coins("20stake"))
            .unwrap();
        assert_eq!(events.last().unwrap().kind, event_types::TRANSFER);
        assert!(stack.accounts.has_account(&stack.ctx, &bob).unwrap());
        assert_eq!(
            stack.bank.get_balance(&stack.ctx, &alice, "stake").unwrap().amount,
            30
        );
        assert_eq!(
            stack.bank.get_balance(&stack.ctx, &bob, "stake").unwrap().amount,
            20
        );
    }

    #[test]
    fn test_insufficient_funds_leaves_balances_untouched() {
        let stack = TestStack::new();
        let alice = stack.funded(b"alice", "5stake");
        let err = stack
            .bank
            .send_coins(&stack.ctx, &alice, &Address::derive(b"bob"), &coins("6stake"))
            .unwrap_err();
        assert!(matches!(err, ModuleError::InsufficientFunds { .. }));
        assert_eq!(
            stack.bank.get_balance(&stack.ctx, &alice, "stake").unwrap().amount,
            5
        );
    }

    #[test]
    fn test_msg_send_to_module_address_is_blocked() {
        let stack = TestStack::new();
        let alice = stack.funded(b"alice", "5stake");
        let pool = Address::for_module(BONDED_POOL_NAME);
        let msg = MsgSend {
            from_address: alice,
            to_address: pool,
            amount: coins("1stake"),
        };
        assert_eq!(
            stack.bank.handle_send(&stack.ctx, &msg).unwrap_err(),
            ModuleError::BlockedAddress(pool)
        );
    }

    #[test]
    fn test_burn_reduces_supply() {
        let stack = TestStack::new();
        let alice = stack.funded(b"alice", "40stake");
        stack
            .bank
            .delegate_coins_from_account_to_module(&stack.ctx, &alice, BONDED_POOL_NAME, &coins("40stake"))
            .unwrap();
        stack
            .bank
            .burn_coins(&stack.ctx, BONDED_POOL_NAME, &coins("15stake"))
            .unwrap();
        assert_eq!(stack.bank.get_supply(&stack.ctx, "stake").unwrap().amount, 25);
        assert_eq!(stack.bank.total_supply(&stack.ctx).unwrap(), coins("25stake"));
    }

    #[test]
    fn test_delegate_requires_staking_capability() {
        let stack = TestStack::new();
        let alice = stack.funded(b"alice", "10stake");
        let err = stack
            .bank
            .delegate_coins_from_account_to_module(&stack.ctx, &alice, MINT_MODULE_NAME, &coins("1stake"))
            .unwrap_err();
        assert!(matches!(err, ModuleError::MissingPermission { .. }));
    }

    #[test]
    fn test_all_balances_groups_by_holder() {
        let stack = TestStack::new();
        let alice = stack.funded(b"alice", "10stake,3token");
        let holders = stack.bank.all_balances(&stack.ctx).unwrap();
        let (_, alice_coins) = holders.iter().find(|(a, _)| *a == alice).unwrap();
        assert_eq!(alice_coins, &coins("10stake,3token"));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn sends_conserve_supply(
                funds in 1u128..1_000,
                sends in proptest::collection::vec((0usize..3, 0usize..3, 0u128..500), 1..12),
            ) {
                let stack = TestStack::new();
                let holders = [
                    stack.funded(b"p0", &format!("{funds}stake")),
                    stack.funded(b"p1", &format!("{funds}stake")),
                    stack.funded(b"p2", &format!("{funds}stake")),
                ];
                for (from, to, amount) in sends {
                    // Failures must leave state untouched, so the result is irrelevant.
                    let _ = stack.bank.send_coins(
                        &stack.ctx,
                        &holders[from],
                        &holders[to],
                        &Coins::single("stake", amount),
                    );
                }
                let held: u128 = holders
                    .iter()
                    .map(|h| stack.bank.get_balance(&stack.ctx, h, "stake").unwrap().amount)
                    .sum();
                prop_assert_eq!(held, funds * 3);
                prop_assert_eq!(stack.bank.get_supply(&stack.ctx, "stake").unwrap().amount, funds * 3);
            }
        }
    }
}
