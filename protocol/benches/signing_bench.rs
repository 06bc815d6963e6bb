// Signing & verification benchmarks for the Weave protocol.
//
// Covers RSA-PSS signing and verification of raw messages, canonical
// message construction, and full transaction signing at several payload
// sizes. Uses the 2048-bit fixture wallet so runs are comparable.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use weave_protocol::crypto::KeyMaterial;
use weave_protocol::transaction::{sign_transaction, verify_transaction, Tag, TransactionBuilder};

const WALLET: &str = include_str!("../tests/fixtures/wallet_a.json");

fn wallet() -> KeyMaterial {
    KeyMaterial::from_jwk_json(WALLET).expect("fixture wallet")
}

fn bench_sign_message(c: &mut Criterion) {
    let key = wallet();
    let message = b"store 500 bytes forever; reward=1000";

    c.bench_function("rsa_pss/sign_message", |b| {
        b.iter(|| key.sign(message).unwrap());
    });
}

fn bench_verify_signature(c: &mut Criterion) {
    let key = wallet();
    let message = b"store 500 bytes forever; reward=1000";
    let signature = key.sign(message).unwrap();

    c.bench_function("rsa_pss/verify_signature", |b| {
        b.iter(|| key.verify(message, &signature).unwrap());
    });
}

fn bench_canonical_message(c: &mut Criterion) {
    let key = wallet();
    let unsigned = TransactionBuilder::new()
        .data(vec![0xABu8; 4096])
        .tags((0..16).map(|i| Tag::new(format!("name-{i}"), format!("value-{i}"))))
        .reward("1000")
        .build(&key)
        .unwrap();

    c.bench_function("transaction/canonical_message_4k", |b| {
        b.iter(|| unsigned.canonical_message().unwrap());
    });
}

fn bench_sign_transaction(c: &mut Criterion) {
    let key = wallet();
    let mut group = c.benchmark_group("transaction/sign");

    for size in [0usize, 1024, 64 * 1024, 1024 * 1024] {
        let unsigned = TransactionBuilder::new()
            .data(vec![0x5Au8; size])
            .tag(Tag::new("Content-Type", "application/octet-stream"))
            .reward("1000")
            .build(&key)
            .unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &unsigned, |b, unsigned| {
            b.iter(|| sign_transaction(unsigned.clone(), &key).unwrap());
        });
    }

    group.finish();
}

fn bench_verify_transaction(c: &mut Criterion) {
    let key = wallet();
    let unsigned = TransactionBuilder::new()
        .data(vec![0x5Au8; 1024])
        .reward("1000")
        .build(&key)
        .unwrap();
    let tx = sign_transaction(unsigned, &key).unwrap();

    c.bench_function("transaction/verify_1k", |b| {
        b.iter(|| verify_transaction(&tx).unwrap());
    });
}

criterion_group!(
    benches,
    bench_sign_message,
    bench_verify_signature,
    bench_canonical_message,
    bench_sign_transaction,
    bench_verify_transaction,
);
criterion_main!(benches);
