use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use hmm_viterbi::{DecoderBuilder, HmmModel};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_obs(rng: &mut StdRng, len: usize, vocab: usize) -> Vec<usize> {
    (0..len).map(|_| rng.gen_range(0..vocab)).collect()
}

fn random_rows(rng: &mut StdRng, rows: usize, cols: usize) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|_| {
            let w: Vec<f64> = (0..cols).map(|_| rng.gen_range(0.01..1.0)).collect();
            let total: f64 = w.iter().sum();
            w.into_iter().map(|x| x / total).collect()
        })
        .collect()
}

fn demo_hmm() -> HmmModel<usize, usize> {
    HmmModel::from_dense(
        vec![0, 1],
        vec![0, 1],
        vec![0.5, 0.5],
        vec![vec![0.9, 0.1], vec![0.2, 0.8]],
        vec![vec![0.8, 0.2], vec![0.3, 0.7]],
    )
    .unwrap()
}

fn wide_hmm(n: usize, m: usize) -> HmmModel<usize, usize> {
    let mut rng = StdRng::seed_from_u64(17);
    let initial = random_rows(&mut rng, 1, n).remove(0);
    let transition = random_rows(&mut rng, n, n);
    let emission = random_rows(&mut rng, n, m);
    HmmModel::from_dense((0..n).collect(), (0..m).collect(), initial, transition, emission)
        .unwrap()
}

fn bench_long_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("viterbi_long_chain");
    let hmm = demo_hmm();
    let decoder = DecoderBuilder::new().build();
    for &len in &[10_000usize, 50_000] {
        group.bench_function(format!("viterbi_len_{len}"), |b| {
            b.iter_batched(
                || {
                    let mut rng = StdRng::seed_from_u64(44);
                    random_obs(&mut rng, len, 2)
                },
                |obs| {
                    let decoding = decoder.decode(&hmm, &obs).unwrap();
                    criterion::black_box(decoding.log_probability());
                },
                BatchSize::PerIteration,
            )
        });
    }
    group.finish();
}

fn bench_wide_states(c: &mut Criterion) {
    let mut group = c.benchmark_group("viterbi_wide_states");
    let mut rng = StdRng::seed_from_u64(45);
    let obs = random_obs(&mut rng, 500, 8);
    for &n in &[16usize, 128, 512] {
        let hmm = wide_hmm(n, 8);
        // usize::MAX keeps every row serial, even with the `parallel` feature
        for (label, threshold) in [("serial", usize::MAX), ("default", 64)] {
            let decoder = DecoderBuilder::new()
                .with_parallel_threshold(threshold)
                .build();
            group.bench_function(format!("states_{n}_{label}"), |b| {
                b.iter(|| criterion::black_box(decoder.decode(&hmm, &obs).unwrap()))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_long_chain, bench_wide_states);
criterion_main!(benches);
