use cgea::{
    problem::{FitnessOracle, IsingRing, IsingTorus, MaximumIndependentVertexSet},
    rng::RandomNumberGenerator,
    solver::{HitEvent, PartialRestartOptions, PartialRestartSolver, Solver, TrialRecord},
};
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn assert_strictly_increasing<F: Ord + Copy + std::fmt::Debug>(events: &[HitEvent<F>]) {
    for pair in events.windows(2) {
        assert!(pair[0].fitness < pair[1].fitness, "events {:?}", events);
        assert!(pair[0].evaluation < pair[1].evaluation, "events {:?}", events);
    }
}

// Counts every oracle call, no known optimum
struct CountingOneMax {
    dimension: usize,
    calls: AtomicUsize,
}

impl CountingOneMax {
    fn new(dimension: usize) -> Self {
        Self {
            dimension,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FitnessOracle for CountingOneMax {
    type Fitness = usize;

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn fitness(&self, bitstring: &[u8]) -> usize {
        self.calls.fetch_add(1, Ordering::SeqCst);
        bitstring.iter().map(|&bit| bit as usize).sum()
    }
}

// An irregular landscape given by a lookup table
struct Table {
    dimension: usize,
    values: Vec<i64>,
    calls: Mutex<HashMap<Vec<u8>, usize>>,
}

impl Table {
    fn scrambled(dimension: usize) -> Self {
        let values = (0..1i64 << dimension)
            .map(|index| (index * 7_919 + 13) % 101 - 50)
            .collect();
        Self {
            dimension,
            values,
            calls: Mutex::new(HashMap::new()),
        }
    }

    fn index(bitstring: &[u8]) -> usize {
        bitstring
            .iter()
            .enumerate()
            .map(|(gene, &bit)| (bit as usize) << gene)
            .sum()
    }
}

impl FitnessOracle for Table {
    type Fitness = i64;

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn fitness(&self, bitstring: &[u8]) -> i64 {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(bitstring.to_vec())
            .or_insert(0) += 1;
        self.values[Self::index(bitstring)]
    }
}

#[test]
fn test_four_gene_ring_reaches_optimum() {
    init_tracing();

    let problem = IsingRing::new(4).unwrap();
    let rng = RandomNumberGenerator::from_seed(167_776_193);
    let mut solver =
        PartialRestartSolver::new(problem, rng, PartialRestartOptions::default()).unwrap();

    let events = solver.run(10_000);

    assert_eq!(events.last().map(|event| event.fitness), Some(4));
    assert_eq!(solver.best_fitness(), Some(4));
    let best = solver.best_bitstring();
    assert!(best == [0, 0, 0, 0] || best == [1, 1, 1, 1], "best {:?}", best);
    assert_strictly_increasing(&events);
}

#[test]
fn test_events_are_strictly_increasing() {
    init_tracing();

    let problems = [
        IsingRing::new(32).unwrap(),
        IsingRing::new(17).unwrap(),
        IsingRing::new(3).unwrap(),
    ];
    for (seed, problem) in problems.into_iter().enumerate() {
        let rng = RandomNumberGenerator::from_seed(seed as u64);
        let mut solver =
            PartialRestartSolver::new(problem, rng, PartialRestartOptions::default()).unwrap();

        let events = solver.run(5_000);
        assert!(!events.is_empty());
        assert_strictly_increasing(&events);
        assert_eq!(events.last().map(|event| event.fitness), solver.best_fitness());
        assert_eq!(solver.best_bitstring().len(), problem.dimension());
        assert_eq!(
            Some(problem.fitness(solver.best_bitstring())),
            solver.best_fitness()
        );
    }
}

#[test]
fn test_budget_bound() {
    init_tracing();

    let population_size = 12;
    let options = PartialRestartOptions::new(population_size, 0.1);
    for budget in [1, 50, 333, 2_000] {
        let oracle = CountingOneMax::new(30);
        let rng = RandomNumberGenerator::from_seed(budget as u64);
        let mut solver = PartialRestartSolver::new(&oracle, rng, options.clone()).unwrap();

        let events = solver.run(budget);

        let count = solver.evaluation_count();
        assert_eq!(count, oracle.calls());
        assert!(count >= budget);
        // a generation evaluates a population plus its twins
        assert!(count < budget + 2 * population_size, "{} > {}", count, budget);
        let last = events.last().map(|event| event.evaluation).unwrap_or(0);
        assert!(last <= count);
    }
}

#[test]
fn test_run_resets_state() {
    let oracle = CountingOneMax::new(16);
    let rng = RandomNumberGenerator::from_seed(5);
    let mut solver =
        PartialRestartSolver::new(&oracle, rng, PartialRestartOptions::default()).unwrap();

    let first = solver.run(400);
    let calls_after_first = oracle.calls();
    let second = solver.run(400);

    assert!(!first.is_empty());
    assert!(!second.is_empty());
    // the first event comes from the first population or its twins
    assert!(second[0].evaluation <= 20);
    assert_eq!(solver.evaluation_count(), oracle.calls() - calls_after_first);
}

#[test]
fn test_duplicates_cost_one_oracle_call() {
    init_tracing();

    // 5 genes, population 24: most samples are duplicates
    let oracle = Table::scrambled(5);
    let rng = RandomNumberGenerator::from_seed(31);
    let options = PartialRestartOptions::builder()
        .population_size(24)
        .reset_probability(0.5)
        .parallel_threshold(4)
        .build();
    let mut solver = PartialRestartSolver::new(&oracle, rng, options).unwrap();

    solver.run(3_000);

    let calls = oracle.calls.lock().unwrap();
    let total: usize = calls.values().sum();
    assert_eq!(total, solver.evaluation_count());
}

#[test]
fn test_exhaustive_enumeration_finds_true_maximum() {
    let oracle = Table::scrambled(4);
    let brute_force = oracle.values.iter().copied().max();

    // log2(16) = 4 open genes, so the first epoch enumerates all 16 bitstrings
    let rng = RandomNumberGenerator::from_seed(8);
    let options = PartialRestartOptions::new(16, 0.1);
    let mut solver = PartialRestartSolver::new(&oracle, rng, options).unwrap();

    let events = solver.run(16);

    assert_eq!(solver.evaluation_count(), 16);
    assert_eq!(solver.best_fitness(), brute_force);
    assert_eq!(events.last().map(|event| event.fitness), brute_force);
    let calls = oracle.calls.lock().unwrap();
    assert_eq!(calls.len(), 16);
    assert!(calls.values().all(|&count| count == 1));
}

#[test]
fn test_reset_probability_zero_restarts_from_best() {
    let oracle = CountingOneMax::new(12);
    let rng = RandomNumberGenerator::from_seed(77);
    let options = PartialRestartOptions::new(8, 0.0);
    let mut solver = PartialRestartSolver::new(&oracle, rng, options).unwrap();

    solver.run(600);

    let expected: Vec<f64> = solver
        .best_bitstring()
        .iter()
        .map(|&bit| f64::from(bit))
        .collect();
    assert_eq!(solver.starting_distribution().marginals(), expected.as_slice());
}

#[test]
fn test_reset_probability_one_restarts_uniform() {
    let oracle = CountingOneMax::new(12);
    let rng = RandomNumberGenerator::from_seed(78);
    let options = PartialRestartOptions::new(8, 1.0);
    let mut solver = PartialRestartSolver::new(&oracle, rng, options).unwrap();

    solver.run(600);

    assert!(solver
        .starting_distribution()
        .marginals()
        .iter()
        .all(|&p| p == 0.5));
}

#[test]
fn test_torus_and_independent_set() {
    init_tracing();

    let torus = IsingTorus::new(16).unwrap();
    let mut solver = PartialRestartSolver::new(
        torus,
        RandomNumberGenerator::from_seed(2),
        PartialRestartOptions::default(),
    )
    .unwrap();
    let events = solver.run(20_000);
    assert_strictly_increasing(&events);
    assert!(solver.best_fitness() <= torus.fitness_upper_bound());

    let mivs = MaximumIndependentVertexSet::new(12).unwrap();
    let mut solver = PartialRestartSolver::new(
        mivs,
        RandomNumberGenerator::from_seed(3),
        PartialRestartOptions::default(),
    )
    .unwrap();
    let events = solver.run(20_000);
    assert_strictly_increasing(&events);
    assert!(solver.best_fitness() <= mivs.fitness_upper_bound());

    let record = TrialRecord::from(events.as_slice());
    assert_eq!(record.hitting_times.len(), record.targets.len());
}

#[test]
fn test_same_seed_same_trajectory() {
    let run = |seed: u64| {
        let problem = IsingRing::new(24).unwrap();
        // sequential evaluation keeps evaluation indices reproducible too
        let options = PartialRestartOptions::builder()
            .parallel_threshold(usize::MAX)
            .build();
        let mut solver =
            PartialRestartSolver::new(problem, RandomNumberGenerator::from_seed(seed), options)
                .unwrap();
        let events = solver.run(3_000);
        (events, solver.best_bitstring().to_vec())
    };

    assert_eq!(run(11), run(11));
}
