//! # Ledger Testkit Pipeline Benchmarks
//!
//! | Group | Measures |
//! |-------|----------|
//! | signing | sign-document + secp256k1 signature per mode |
//! | encoding | wire encoding of a signed envelope |
//! | local-node | admission and delivery of a block of transfers |

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use lt_04_tx_pipeline::{SignMode, SignerData, TxBuilder, TxEncoding};
use lt_tests::fixtures::{gen_info, send, LocalNetwork};
use shared_types::Address;
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    Runtime::new().expect("tokio runtime")
}

fn bench_signing(c: &mut Criterion) {
    let rt = runtime();
    let net = rt.block_on(LocalNetwork::start()).expect("local network");
    let alice = net.funded("1000stake").expect("funded account");
    let bob = Address::derive(b"bob");
    let signer = SignerData {
        chain_id: net.node.chain_id().to_string(),
        account_number: 0,
        sequence: 0,
    };

    let mut group = c.benchmark_group("signing");
    for mode in [SignMode::Direct, SignMode::LegacyJson] {
        let builder = net.suite.builder().clone().with_sign_mode(mode);
        group.bench_with_input(BenchmarkId::new("sign", mode), &mode, |b, _| {
            b.iter(|| {
                let unsigned = TxBuilder::unsigned(&gen_info(&alice), vec![send(&alice, bob, 1)]);
                black_box(builder.sign(&alice, &signer, unsigned).expect("signed"))
            })
        });
    }
    group.finish();
}

fn bench_encoding(c: &mut Criterion) {
    let rt = runtime();
    let net = rt.block_on(LocalNetwork::start()).expect("local network");
    let alice = net.funded("1000stake").expect("funded account");
    let msgs = (0..10).map(|i| send(&alice, Address::derive(&[i]), 1)).collect();
    let bytes = rt
        .block_on(net.suite.create_tx_bytes(&gen_info(&alice), msgs))
        .expect("tx bytes");
    let tx = TxEncoding::Bincode.decode(&bytes).expect("decoded");

    let mut group = c.benchmark_group("encoding");
    for encoding in [TxEncoding::Bincode, TxEncoding::Json] {
        group.bench_with_input(BenchmarkId::new("encode", encoding), &encoding, |b, enc| {
            b.iter(|| black_box(enc.encode(&tx).expect("encoded")))
        });
    }
    group.finish();
}

fn bench_block(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("local-node");
    group.sample_size(10);

    for size in [10u64, 50] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("check_and_deliver", size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let net = rt.block_on(LocalNetwork::start()).expect("local network");
                    let alice = net.funded("1000000stake").expect("funded account");
                    let bob = Address::derive(b"bob");
                    let txs: Vec<Vec<u8>> = (0..size)
                        .map(|seq| {
                            let info = gen_info(&alice).with_sequence(seq);
                            rt.block_on(net.suite.create_tx_bytes(&info, vec![send(&alice, bob, 1)]))
                                .expect("tx bytes")
                        })
                        .collect();
                    (net, txs)
                },
                |(net, txs)| {
                    for tx in &txs {
                        black_box(net.node.check_tx(tx));
                    }
                    black_box(net.node.produce_block().expect("block"))
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_signing, bench_encoding, bench_block);
criterion_main!(benches);
