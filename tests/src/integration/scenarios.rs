//! # Reference Scenarios
//!
//! | Scenario | Flow | Expectation |
//! |----------|------|-------------|
//! | A | default bootstrap | five module addresses, nothing else |
//! | B | mint 1000 then 500 | balance 1500 |
//! | C | override sequence 0, commit twice | first ok, second wrong sequence |
//! | D | unknown broadcast mode | config error, nothing submitted |

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lt_03_bootstrap::{bootstrap, BootstrapOptions};
    use lt_04_tx_pipeline::{BroadcastError, QueryError, TestSuite};
    use lt_05_local_node::codes;
    use shared_types::{
        Address, ConfigError, BONDED_POOL_NAME, DISTRIBUTION_MODULE_NAME, FEE_COLLECTOR_NAME,
        MINT_MODULE_NAME, NOT_BONDED_POOL_NAME,
    };

    use crate::fixtures::{gen_info, send, CountingNode, LocalNetwork};

    #[test]
    fn scenario_a_default_module_addresses() {
        lt_telemetry::init_test_tracing();
        let (_, keepers) = bootstrap(BootstrapOptions::default());
        let addresses = keepers.account_query().module_addresses();

        assert_eq!(addresses.len(), 5);
        for name in [
            FEE_COLLECTOR_NAME,
            DISTRIBUTION_MODULE_NAME,
            MINT_MODULE_NAME,
            BONDED_POOL_NAME,
            NOT_BONDED_POOL_NAME,
        ] {
            assert!(addresses.contains(&Address::for_module(name)), "{name} missing");
        }
        assert!(!addresses.contains(&Address::derive(b"someone else")));
    }

    #[tokio::test]
    async fn scenario_b_minting_adds_up() {
        let net = LocalNetwork::start().await.unwrap();
        let target = Address::derive(b"scenario-b");
        assert!(matches!(
            net.suite.get_account(&target).await,
            Err(QueryError::NotFound(_))
        ));

        net.node.fund_account(&target, &"1000stake".parse().unwrap()).unwrap();
        assert_eq!(net.balance(&target, "stake").await.unwrap(), 1000);
        assert!(net.suite.get_account(&target).await.is_ok());

        net.node.fund_account(&target, &"500stake".parse().unwrap()).unwrap();
        assert_eq!(net.balance(&target, "stake").await.unwrap(), 1500);
    }

    #[tokio::test]
    async fn scenario_c_replayed_sequence_is_rejected() {
        let net = LocalNetwork::start().await.unwrap();
        let alice = net.funded("1000stake").unwrap();
        let info = gen_info(&alice).with_sequence(0);
        let msgs = vec![send(&alice, Address::derive(b"bob"), 10)];

        let bytes = net.suite.create_tx_bytes(&info, msgs.clone()).await.unwrap();
        let first = net.suite.broadcast_tx_commit(&bytes).await.unwrap();
        assert!(first.is_ok(), "{}", first.log);
        assert_eq!(net.suite.get_account(&alice.address()).await.unwrap().sequence, 1);

        // the override is taken verbatim, never bumped
        let again = net.suite.create_tx_bytes(&info, msgs).await.unwrap();
        assert_eq!(again, bytes);
        let second = net.suite.broadcast_tx_commit(&again).await.unwrap();
        assert_eq!(second.code, codes::WRONG_SEQUENCE);
        assert!(second.log.contains("account sequence mismatch"), "{}", second.log);
    }

    #[tokio::test]
    async fn scenario_d_unknown_mode_never_reaches_node() {
        let net = LocalNetwork::start().await.unwrap();
        let counting = Arc::new(CountingNode::new(net.node.clone()));
        let suite = TestSuite::connect(counting.clone()).await.unwrap();
        let alice = net.funded("100stake").unwrap();
        let bytes = suite
            .create_tx_bytes(&gen_info(&alice), vec![send(&alice, Address::derive(b"bob"), 1)])
            .await
            .unwrap();

        let err = suite.broadcast_tx(&bytes, 42i32).await.unwrap_err();
        assert!(matches!(
            err,
            BroadcastError::Config(ConfigError::UnsupportedBroadcastMode(_))
        ));
        let err = suite.broadcaster().broadcast_with_name(&bytes, "block").await.unwrap_err();
        assert!(matches!(err, BroadcastError::Config(_)));

        assert_eq!(counting.submissions(), 0);
        assert_eq!(net.node.mempool_len(), 0);
        assert_eq!(net.balance(&alice.address(), "stake").await.unwrap(), 100);
    }
}
