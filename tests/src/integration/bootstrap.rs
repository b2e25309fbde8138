//! # Bootstrap Flows
//!
//! A test author working directly against the keepers, no node involved:
//! wiring, minting, module-to-module flows and the block hooks.

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use lt_02_ledger_modules::distribution::MsgFundCommunityPool;
    use lt_02_ledger_modules::staking::{Description, MsgCreateValidator, MsgDelegate};
    use lt_02_ledger_modules::upgrade::{Plan, PlanStatus};
    use lt_03_bootstrap::{bootstrap, BootstrapOptions, EXAMPLE_HEIGHT};
    use proptest::prelude::*;
    use shared_crypto::Identity;
    use shared_types::{module_account_addrs, Address, Capability, Coin, Coins, PermissionTable};

    // =========================================================================
    // MODULE WIRING
    // =========================================================================

    #[test]
    fn test_extra_minter_can_mint_and_fund_users() {
        lt_telemetry::init_test_tracing();
        let (ctx, keepers) = bootstrap(
            BootstrapOptions::new().with_module_account("faucet", [Capability::Minter]),
        );
        let faucet_coins = Coins::single("stake", 50);
        keepers.bank.mint_coins(&ctx, "faucet", &faucet_coins).unwrap();

        let user = Address::derive(b"user");
        keepers
            .bank
            .send_coins_from_module_to_account(&ctx, "faucet", &user, &faucet_coins)
            .unwrap();
        assert_eq!(keepers.balance_query().balance(&ctx, &user, "stake").unwrap().amount, 50);
        assert_eq!(keepers.balance_query().supply_of(&ctx, "stake").unwrap().amount, 50);
    }

    #[test]
    fn test_module_without_minter_cannot_mint() {
        let (ctx, keepers) = bootstrap(
            BootstrapOptions::new().with_module_account("vault", std::iter::empty()),
        );
        assert!(keepers
            .bank
            .mint_coins(&ctx, "vault", &Coins::single("stake", 1))
            .is_err());
    }

    // =========================================================================
    // STAKING AND DISTRIBUTION
    // =========================================================================

    #[test]
    fn test_delegate_then_fees_reach_validator() {
        lt_telemetry::init_test_tracing();
        let (ctx, keepers) = bootstrap(BootstrapOptions::default());
        let operator = Identity::generate();
        let delegator = Address::derive(b"delegator");
        keepers
            .mint_to_account(&ctx, &operator.address(), &"1000stake".parse().unwrap())
            .unwrap();
        keepers
            .mint_to_account(&ctx, &delegator, &"300stake".parse().unwrap())
            .unwrap();

        keepers
            .deliver_msg(
                &ctx,
                &MsgCreateValidator {
                    description: Description::new("op"),
                    commission_rate_bps: 0,
                    min_self_delegation: 1,
                    validator_address: operator.address(),
                    pubkey: operator.public_key().as_bytes().to_vec(),
                    value: Coin::new("stake", 100),
                }
                .into(),
            )
            .unwrap();
        keepers
            .deliver_msg(
                &ctx,
                &MsgDelegate {
                    delegator_address: delegator,
                    validator_address: operator.address(),
                    amount: Coin::new("stake", 100),
                }
                .into(),
            )
            .unwrap();

        let validator = keepers
            .stake_query()
            .validator(&ctx, &operator.address())
            .unwrap()
            .unwrap();
        assert_eq!(validator.tokens, 200);
        assert_eq!(keepers.stake_query().delegations_of(&ctx, &delegator).unwrap().len(), 1);

        // fees land in the collector, the block hook splits them
        keepers
            .bank
            .send_coins_from_account_to_module(
                &ctx,
                &delegator,
                shared_types::FEE_COLLECTOR_NAME,
                &Coins::single("stake", 100),
            )
            .unwrap();
        keepers.begin_block(&ctx.with_block_height(EXAMPLE_HEIGHT + 1)).unwrap();

        // 2 to the community pool, 98 split evenly between equal shares
        let distribution = keepers.distribution_query();
        for holder in [delegator, operator.address()] {
            let rewards = distribution
                .pending_rewards(&ctx, &holder, &operator.address())
                .unwrap();
            assert_eq!(rewards, Coins::single("stake", 49));
        }
        assert_eq!(distribution.community_pool(&ctx).unwrap(), Coins::single("stake", 2));
    }

    #[test]
    fn test_fund_community_pool() {
        let (ctx, keepers) = bootstrap(BootstrapOptions::default());
        let depositor = Address::derive(b"depositor");
        keepers
            .mint_to_account(&ctx, &depositor, &"40stake".parse().unwrap())
            .unwrap();
        keepers
            .deliver_msg(
                &ctx,
                &MsgFundCommunityPool {
                    amount: Coins::single("stake", 15),
                    depositor,
                }
                .into(),
            )
            .unwrap();
        assert_eq!(
            keepers.distribution_query().community_pool(&ctx).unwrap().amount_of("stake"),
            15
        );
        assert_eq!(keepers.balance_query().balance(&ctx, &depositor, "stake").unwrap().amount, 25);
    }

    // =========================================================================
    // UPGRADES
    // =========================================================================

    #[test]
    fn test_upgrade_applies_at_height_unless_skipped() {
        let height = EXAMPLE_HEIGHT + 5;
        let (ctx, keepers) = bootstrap(BootstrapOptions::default());
        keepers.upgrade.schedule_upgrade(&ctx, Plan::new("v2", height)).unwrap();
        let at = ctx.with_block_height(height);
        assert!(matches!(keepers.begin_block(&at).unwrap(), PlanStatus::Due(_)));
        assert_eq!(keepers.upgrade_query().done_height(&at, "v2").unwrap(), Some(height));
        assert_eq!(keepers.upgrade_query().current_protocol_version(&at).unwrap(), 1);

        let (ctx, keepers) = bootstrap(BootstrapOptions::default().with_upgrade_skip_heights([height]));
        keepers.upgrade.schedule_upgrade(&ctx, Plan::new("v2", height)).unwrap();
        let at = ctx.with_block_height(height);
        assert!(matches!(keepers.begin_block(&at).unwrap(), PlanStatus::Skipped(_)));
        assert_eq!(keepers.upgrade_query().done_height(&at, "v2").unwrap(), None);
        assert!(keepers.upgrade_query().current_plan(&at).unwrap().is_none());
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    fn arb_names() -> impl Strategy<Value = BTreeSet<String>> {
        prop::collection::btree_set("[a-z]{3,10}", 0..4)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_module_addresses_are_union(first in arb_names(), second in arb_names()) {
            let table = |names: &BTreeSet<String>| {
                names.iter().fold(PermissionTable::new(), |t, n| t.with(n.clone(), [Capability::Burner]))
            };
            let (a, b) = (table(&first), table(&second));
            let (_, keepers) = bootstrap(
                BootstrapOptions::new()
                    .with_additional_module_accounts(a.clone())
                    .with_additional_module_accounts(b.clone()),
            );

            let expected: BTreeSet<Address> = module_account_addrs(&PermissionTable::default_base())
                .into_iter()
                .chain(module_account_addrs(&a))
                .chain(module_account_addrs(&b))
                .collect();
            prop_assert_eq!(keepers.account_query().module_addresses(), expected);
        }

        #[test]
        fn prop_minting_accumulates(amounts in prop::collection::vec(1u128..1_000_000, 1..6)) {
            let (ctx, keepers) = bootstrap(BootstrapOptions::default());
            let target = Address::derive(b"target");
            prop_assert!(keepers.account_query().account(&ctx, &target).unwrap().is_none());
            for amount in &amounts {
                keepers.mint_to_account(&ctx, &target, &Coins::single("stake", *amount)).unwrap();
                prop_assert!(keepers.account_query().account(&ctx, &target).unwrap().is_some());
            }
            let total: u128 = amounts.iter().sum();
            prop_assert_eq!(keepers.balance_query().balance(&ctx, &target, "stake").unwrap().amount, total);
        }
    }
}
