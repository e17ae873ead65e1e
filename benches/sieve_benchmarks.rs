//! Benchmarks for combiners and sieve rounds

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lattice_sieve::{
    combiner::{difference, modified_average, modified_average_with_noise, random_point},
    utils::matrix_utils::generate_random_lattice,
    CoefficientRange, Combiner, Lattice, LatticePoint, SieveEngine, SieveParams,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn test_lattice(n: usize) -> Lattice {
    generate_random_lattice(n, n, 1, 99, Some(42)).unwrap()
}

fn parents(lattice: &Lattice) -> (LatticePoint, LatticePoint) {
    let mut rng = StdRng::seed_from_u64(1);
    let range = CoefficientRange::default();
    (
        random_point(lattice, range, &mut rng).unwrap(),
        random_point(lattice, range, &mut rng).unwrap(),
    )
}

fn bench_combiners(c: &mut Criterion) {
    let mut group = c.benchmark_group("Combiners");

    for size in [4, 12, 32].iter() {
        let lattice = test_lattice(*size);
        let (p, q) = parents(&lattice);

        group.bench_with_input(BenchmarkId::new("difference", size), size, |b, _| {
            b.iter(|| black_box(difference(&lattice, black_box(&p), black_box(&q)).unwrap()))
        });

        group.bench_with_input(BenchmarkId::new("modified_average", size), size, |b, _| {
            let mut rng = StdRng::seed_from_u64(2);
            b.iter(|| black_box(modified_average(&lattice, &p, &q, &mut rng).unwrap()))
        });

        group.bench_with_input(BenchmarkId::new("noisy", size), size, |b, _| {
            let mut rng = StdRng::seed_from_u64(3);
            b.iter(|| {
                black_box(modified_average_with_noise(&lattice, &p, &q, 3, 2, &mut rng).unwrap())
            })
        });
    }

    group.finish();
}

fn bench_sieve_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sieve Round");
    group.sample_size(20);

    for size in [6, 12].iter() {
        let lattice = test_lattice(*size);
        let params = SieveParams::default()
            .with_population_size(200)
            .with_combiner(Combiner::noisy())
            .with_seed(7);

        group.bench_with_input(BenchmarkId::new("augment", size), size, |b, _| {
            b.iter_batched(
                || {
                    let mut engine = SieveEngine::new(&lattice, params.clone()).unwrap();
                    engine.seed_population().unwrap();
                    engine
                },
                |mut engine| black_box(engine.augment().unwrap()),
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_combiners, bench_sieve_round);
criterion_main!(benches);
