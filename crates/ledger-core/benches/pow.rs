use criterion::{criterion_group, criterion_main, Criterion};
use ledger_core::{Ledger, ProofOfWork, SuffixProofOfWork};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn bench_pow(c: &mut Criterion) {
    c.bench_function("find_proof_suffix_0000", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| {
            let last_hash: [u8; 32] = rng.gen();
            SuffixProofOfWork.find(rng.gen_range(0..1_000), &last_hash)
        });
    });
}

fn bench_add_block(c: &mut Criterion) {
    c.bench_function("add_block_10_txs", |b| {
        let mut rng = StdRng::seed_from_u64(7);
        let mut ledger = Ledger::default();
        b.iter(|| {
            for i in 0..10 {
                ledger.add_transaction(format!("alice-{i}"), "bob", rng.gen_range(1..10));
            }
            ledger.add_block()
        });
    });
}

criterion_group!(benches, bench_pow, bench_add_block);
criterion_main!(benches);
