//! # Pipeline Flows
//!
//! Resolver, builder and broadcaster driving the in-process node:
//!
//! ```text
//! TestSuite ──resolve──► LocalNode (query port)
//!     │
//!     ├── build + sign ──► wire bytes
//!     │
//!     └── broadcast ─────► LocalNode (submission port) ──► TxResponse
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lt_02_ledger_modules::feegrant::{BasicAllowance, MsgGrantAllowance};
    use lt_02_ledger_modules::staking::MsgDelegate;
    use lt_02_ledger_modules::MsgSend;
    use lt_03_bootstrap::NetworkConfig;
    use lt_04_tx_pipeline::{
        sign_bytes, BroadcastMode, JsonRpcNodeClient, QueryError, SignMode, SignerData,
        TestSuite, TxEncoding,
    };
    use lt_05_local_node::codes;
    use shared_crypto::Secp256k1Signature;
    use shared_types::{Address, Coin, Coins};

    use crate::fixtures::{gen_info, send, LocalNetwork, DEFAULT_FEE};

    // =========================================================================
    // ENVELOPE
    // =========================================================================

    async fn assert_round_trip(encoding: TxEncoding, mode: SignMode) {
        let net = LocalNetwork::start_with(NetworkConfig::default(), encoding)
            .await
            .unwrap();
        let suite = TestSuite::connect(net.node.clone())
            .await
            .unwrap()
            .with_encoding(encoding)
            .with_sign_mode(mode);
        let alice = net.funded("100stake").unwrap();
        let bob = Address::derive(b"bob");
        let info = gen_info(&alice).with_memo("round trip").with_timeout_height(5_000);

        let bytes = suite.create_tx_bytes(&info, vec![send(&alice, bob, 7)]).await.unwrap();
        let tx = encoding.decode(&bytes).unwrap();

        assert_eq!(tx.body.messages, vec![send(&alice, bob, 7)]);
        assert_eq!(tx.body.memo, "round trip");
        assert_eq!(tx.body.timeout_height, 5_000);
        assert_eq!(tx.auth_info.fee.amount, Coins::single("stake", DEFAULT_FEE));
        assert_eq!(tx.auth_info.fee.gas_limit, info.gas_limit);
        assert_eq!(tx.auth_info.signer_infos[0].sign_mode, mode);

        let account = suite.get_account(&alice.address()).await.unwrap();
        let doc = sign_bytes(
            &tx,
            &SignerData {
                chain_id: net.node.chain_id().to_string(),
                account_number: account.account_number,
                sequence: account.sequence,
            },
            mode,
        )
        .unwrap();
        let signature = Secp256k1Signature::from_slice(&tx.signatures[0]).unwrap();
        assert!(alice.public_key().verify(&doc, &signature).is_ok());

        let response = suite.broadcast_tx_commit(&bytes).await.unwrap();
        assert!(response.is_ok(), "{}", response.log);
    }

    #[tokio::test]
    async fn test_round_trip_direct_bincode() {
        assert_round_trip(TxEncoding::Bincode, SignMode::Direct).await;
    }

    #[tokio::test]
    async fn test_round_trip_legacy_json() {
        assert_round_trip(TxEncoding::Json, SignMode::LegacyJson).await;
    }

    #[tokio::test]
    async fn test_node_refuses_foreign_encoding() {
        let net = LocalNetwork::start().await.unwrap();
        let alice = net.funded("100stake").unwrap();
        let bytes = TestSuite::connect(net.node.clone())
            .await
            .unwrap()
            .with_encoding(TxEncoding::Json)
            .create_tx_bytes(&gen_info(&alice), vec![send(&alice, Address::derive(b"bob"), 1)])
            .await
            .unwrap();
        let response = net.suite.broadcast_tx(&bytes, BroadcastMode::Sync).await.unwrap();
        assert_eq!(response.code, codes::TX_DECODE);
    }

    // =========================================================================
    // ADMISSION
    // =========================================================================

    #[tokio::test]
    async fn test_future_sequence_is_rejected() {
        let net = LocalNetwork::start().await.unwrap();
        let alice = net.funded("100stake").unwrap();
        let bytes = net
            .suite
            .create_tx_bytes(
                &gen_info(&alice).with_sequence(5),
                vec![send(&alice, Address::derive(b"bob"), 1)],
            )
            .await
            .unwrap();
        let response = net.suite.broadcast_tx(&bytes, BroadcastMode::Sync).await.unwrap();
        assert_eq!(response.code, codes::WRONG_SEQUENCE);
        assert_eq!(net.balance(&alice.address(), "stake").await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_low_fee_and_expired_timeout() {
        let net = LocalNetwork::start().await.unwrap();
        let alice = net.funded("100stake").unwrap();
        let msgs = || vec![send(&alice, Address::derive(b"bob"), 1)];

        let cheap = gen_info(&alice).with_fee(Coins::single("stake", 1));
        let bytes = net.suite.create_tx_bytes(&cheap, msgs()).await.unwrap();
        let response = net.suite.broadcast_tx(&bytes, BroadcastMode::Sync).await.unwrap();
        assert_eq!(response.code, codes::INSUFFICIENT_FEE);

        let late = gen_info(&alice).with_timeout_height(net.node.height());
        let bytes = net.suite.create_tx_bytes(&late, msgs()).await.unwrap();
        let response = net.suite.broadcast_tx(&bytes, BroadcastMode::Sync).await.unwrap();
        assert_eq!(response.code, codes::TX_TIMEOUT_HEIGHT);
    }

    #[tokio::test]
    async fn test_async_broadcast_lands_in_next_block() {
        let net = LocalNetwork::start().await.unwrap();
        let alice = net.funded("100stake").unwrap();
        let bob = Address::derive(b"bob");
        let bytes = net
            .suite
            .create_tx_bytes(&gen_info(&alice), vec![send(&alice, bob, 30)])
            .await
            .unwrap();

        let ack = net.suite.broadcast_tx(&bytes, 1i32).await.unwrap();
        assert!(ack.is_ok());
        assert_eq!(net.balance(&bob, "stake").await.unwrap(), 0);

        let block = net.node.produce_block().unwrap();
        assert_eq!(block.txs[0].txhash, ack.txhash);
        assert_eq!(net.balance(&bob, "stake").await.unwrap(), 30);
    }

    // =========================================================================
    // MODULE FLOWS
    // =========================================================================

    #[tokio::test]
    async fn test_fee_grant_pays_for_grantee() {
        let net = LocalNetwork::start().await.unwrap();
        let granter = net.funded("1000stake").unwrap();
        let grantee = net.funded("5token").unwrap();

        let grant = MsgGrantAllowance {
            granter: granter.address(),
            grantee: grantee.address(),
            allowance: BasicAllowance::default().with_spend_limit(Coins::single("stake", 10)),
        };
        let bytes = net.suite.create_tx_bytes(&gen_info(&granter), vec![grant.into()]).await.unwrap();
        let response = net.suite.broadcast_tx_commit(&bytes).await.unwrap();
        assert!(response.is_ok(), "{}", response.log);

        let spend = MsgSend {
            from_address: grantee.address(),
            to_address: Address::derive(b"bob"),
            amount: Coins::single("token", 1),
        };
        let info = gen_info(&grantee).with_fee_granter(granter.address());
        let bytes = net.suite.create_tx_bytes(&info, vec![spend.into()]).await.unwrap();
        let response = net.suite.broadcast_tx_commit(&bytes).await.unwrap();
        assert!(response.is_ok(), "{}", response.log);

        assert_eq!(
            net.balance(&granter.address(), "stake").await.unwrap(),
            1000 - 2 * DEFAULT_FEE
        );
        assert_eq!(net.balance(&grantee.address(), "token").await.unwrap(), 4);
        let remaining = net.node.inspect(|ctx, keepers| {
            keepers
                .feegrant_query()
                .allowance(ctx, &granter.address(), &grantee.address())
                .unwrap()
        });
        assert_eq!(
            remaining.unwrap().allowance.spend_limit,
            Some(Coins::single("stake", 10 - DEFAULT_FEE))
        );
    }

    #[tokio::test]
    async fn test_validator_tx_self_delegates() {
        let net = LocalNetwork::start().await.unwrap();
        let validator = net.validator();
        let before = net.suite.validators().await.unwrap()[0].tokens;

        let delegate = MsgDelegate {
            delegator_address: validator,
            validator_address: validator,
            amount: Coin::new("stake", 1_000),
        };
        let bytes = net
            .suite
            .create_validator_tx_bytes(Coin::new("stake", DEFAULT_FEE), 200_000, vec![delegate.into()])
            .await
            .unwrap();
        let response = net.suite.broadcast_tx_commit(&bytes).await.unwrap();
        assert!(response.is_ok(), "{}", response.log);

        assert_eq!(net.suite.validators().await.unwrap()[0].tokens, before + 1_000);
        assert_eq!(net.suite.get_account(&validator).await.unwrap().sequence, 2);
        assert_eq!(net.suite.delegations(&validator).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delegator_sees_delegation() {
        let net = LocalNetwork::start().await.unwrap();
        let alice = net.funded("500stake").unwrap();
        let delegate = MsgDelegate {
            delegator_address: alice.address(),
            validator_address: net.validator(),
            amount: Coin::new("stake", 200),
        };
        let bytes = net.suite.create_tx_bytes(&gen_info(&alice), vec![delegate.into()]).await.unwrap();
        let response = net.suite.broadcast_tx_commit(&bytes).await.unwrap();
        assert!(response.is_ok(), "{}", response.log);

        let delegations = net.suite.delegations(&alice.address()).await.unwrap();
        assert_eq!(delegations.len(), 1);
        assert_eq!(delegations[0].validator_address, net.validator());
        assert_eq!(
            net.balance(&alice.address(), "stake").await.unwrap(),
            500 - 200 - DEFAULT_FEE
        );
    }

    // =========================================================================
    // ERROR CLASSES
    // =========================================================================

    #[tokio::test]
    async fn test_not_found_and_transport_are_distinct() {
        let net = LocalNetwork::start().await.unwrap();
        let ghost = Address::derive(b"ghost");
        assert_eq!(
            net.suite.get_account(&ghost).await.unwrap_err(),
            QueryError::NotFound(ghost)
        );

        let offline = Arc::new(JsonRpcNodeClient::new("http://127.0.0.1:1"));
        assert!(matches!(
            TestSuite::connect(offline).await,
            Err(QueryError::Transport(_))
        ));
    }
}
