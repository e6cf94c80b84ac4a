use criterion::{criterion_group, criterion_main, Criterion};
use powledger_core::mine::mine_parallel;
use powledger_core::{Block, Transaction};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn bench_pow(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let txs: Vec<Transaction> = (0..10)
        .map(|i| Transaction::new(format!("alice-{i}"), "bob", rng.gen_range(1..10)))
        .collect();
    let block = Block::new(txs, "");

    c.bench_function("mine_difficulty_3", |b| {
        b.iter(|| {
            let mut candidate = block.clone();
            candidate.mine(3);
        });
    });

    c.bench_function("mine_parallel_difficulty_3", |b| {
        b.iter(|| {
            let mut candidate = block.clone();
            mine_parallel(&mut candidate, 3);
        });
    });
}

criterion_group!(benches, bench_pow);
criterion_main!(benches);
