use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::atomic::AtomicUsize;

use cgea::{
    caching::EvaluationCache,
    candidate::Candidate,
    problem::{IsingRing, IsingTorus},
    rng::{RandomNumberGenerator, UniformRandomSource},
    solver::{PartialRestartOptions, PartialRestartSolver, SmartRestartOptions, SmartRestartSolver, Solver},
};

// A pool of random bitstrings, a quarter of them duplicates
fn random_pool(size: usize, dimension: usize, seed: u64) -> Vec<Candidate<i64>> {
    let mut rng = RandomNumberGenerator::from_seed(seed);
    let mut pool: Vec<Candidate<i64>> = (0..size).map(|_| Candidate::new(dimension)).collect();
    for candidate in pool.iter_mut() {
        for gene in candidate.genes_mut() {
            *gene = rng.next_bit();
        }
        candidate.rehash();
    }
    for index in (0..size).step_by(4).skip(1) {
        let source = pool[index - 1].clone();
        pool[index].copy_genes_from(&source);
    }
    pool
}

fn bench_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation_cache");
    let problem = IsingTorus::new(1024).unwrap();

    for size in [16, 128, 1024].iter() {
        let template = random_pool(*size, 1024, 7);

        for (name, threshold) in [("sequential", usize::MAX), ("parallel", 1)] {
            let mut cache = EvaluationCache::new(*size).with_parallel_threshold(threshold);
            group.bench_with_input(BenchmarkId::new(name, size), &template, |b, template| {
                b.iter(|| {
                    let mut pool = template.clone();
                    let counter = AtomicUsize::new(0);
                    cache.clear();
                    cache.evaluate(&mut pool, 0..*size, black_box(&problem), &counter);
                    pool
                })
            });
        }
    }

    group.finish();
}

fn bench_partial_restart(c: &mut Criterion) {
    let mut group = c.benchmark_group("partial_restart");
    group.sample_size(10);

    for dimension in [64, 256].iter() {
        let problem = IsingRing::new(*dimension).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(dimension), &problem, |b, problem| {
            b.iter(|| {
                let mut solver = PartialRestartSolver::new(
                    *problem,
                    RandomNumberGenerator::from_seed(42),
                    PartialRestartOptions::default(),
                )
                .unwrap();
                solver.run(black_box(20_000))
            })
        });
    }

    group.finish();
}

fn bench_smart_restart(c: &mut Criterion) {
    let mut group = c.benchmark_group("smart_restart");
    group.sample_size(10);

    for dimension in [64, 256].iter() {
        let problem = IsingRing::new(*dimension).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(dimension), &problem, |b, problem| {
            b.iter(|| {
                let mut solver = SmartRestartSolver::new(
                    *problem,
                    RandomNumberGenerator::from_seed(42),
                    SmartRestartOptions::default(),
                )
                .unwrap();
                solver.run(black_box(20_000))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cache, bench_partial_restart, bench_smart_restart);
criterion_main!(benches);
