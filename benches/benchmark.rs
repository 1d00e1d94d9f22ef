use criterion::{
    criterion_group,
    criterion_main,
    BenchmarkGroup,
    Criterion,
    SamplingMode
};
use criterion::measurement::WallTime;

use sudoku_tutor::Puzzle;
use sudoku_tutor::engine::Options;
use sudoku_tutor::explain::Explainer;
use sudoku_tutor::generator::Generator;
use sudoku_tutor::solver::{BacktrackingSolver, Solution, Solver};

use rand::SeedableRng;

use rand_chacha::ChaCha8Rng;

use std::time::Duration;

// Explanation of benchmark classes:
//
// backtracking: Solving fixed puzzles with cell-oriented branching.
// set backtracking: The same puzzles with set-oriented branching.
// generation: A full generator run from a fixed seed.
// explanation: Deriving a hint through the deduction oracle.

const MEASUREMENT_TIME_SECS: u64 = 10;
const SOLVER_SAMPLE_SIZE: usize = 100;
const GENERATOR_SAMPLE_SIZE: usize = 10;
const ORACLE_SAMPLE_SIZE: usize = 10;
const GENERATOR_SEED: u64 = 42;

// The first puzzle and its solution are the introductory example from
// https://en.wikipedia.org/wiki/Sudoku
//
// The second one is taken from the World Puzzle Federation Sudoku Grand
// Prix: GP 2020 Round 8 (Puzzle 2)
// Puzzles: https://gp.worldpuzzle.org/sites/default/files/Puzzles/2020/2020_SudokuRound8.pdf
// Solutions: https://gp.worldpuzzle.org/sites/default/files/Puzzles/2020/2020_SudokuRound8_SB.pdf

fn wikipedia_puzzle() -> Puzzle {
    Puzzle::parse(
        "530070000\n\
         600195000\n\
         098000060\n\
         800060003\n\
         400803001\n\
         700020006\n\
         060000280\n\
         000419005\n\
         000080079").unwrap()
}

fn wikipedia_solution() -> Puzzle {
    Puzzle::parse(
        "534678912\n\
         672195348\n\
         198342567\n\
         859761423\n\
         426853791\n\
         713924856\n\
         961537284\n\
         287419635\n\
         345286179").unwrap()
}

fn wpf_puzzle() -> Puzzle {
    Puzzle::parse(
        "000081000\n\
         002007800\n\
         053000170\n\
         370000000\n\
         600000003\n\
         000000024\n\
         069000230\n\
         005900400\n\
         000650000").unwrap()
}

fn wpf_solution() -> Puzzle {
    Puzzle::parse(
        "746281359\n\
         912537846\n\
         853496172\n\
         374125698\n\
         628749513\n\
         591368724\n\
         169874235\n\
         285913467\n\
         437652981").unwrap()
}

fn configure(group: &mut BenchmarkGroup<WallTime>, sample_size: usize) {
    group.measurement_time(Duration::from_secs(MEASUREMENT_TIME_SECS));
    group.sample_size(sample_size);
    group.sampling_mode(SamplingMode::Flat);
}

fn solve_task(solver: &BacktrackingSolver, puzzle: &Puzzle,
        solution: &Puzzle) {
    let assessment = solver.solve(puzzle).unwrap();

    if let Solution::Unique(filled) = assessment.solution {
        let mut merged = puzzle.clone();
        merged.merge(&filled);
        assert_eq!(solution, &merged);
    }
    else {
        panic!("Benchmark puzzle not uniquely solvable.");
    }
}

fn benchmark_solver(c: &mut Criterion, group_name: &str, sofa: bool) {
    let solver = BacktrackingSolver::new_configured(sofa, None);
    let mut group = c.benchmark_group(group_name);
    configure(&mut group, SOLVER_SAMPLE_SIZE);

    let puzzle = wikipedia_puzzle();
    let solution = wikipedia_solution();
    group.bench_function("wikipedia",
        |b| b.iter(|| solve_task(&solver, &puzzle, &solution)));

    let puzzle = wpf_puzzle();
    let solution = wpf_solution();
    group.bench_function("wpf-gp-2020",
        |b| b.iter(|| solve_task(&solver, &puzzle, &solution)));
}

fn benchmark_backtracking(c: &mut Criterion) {
    benchmark_solver(c, "backtracking", false)
}

fn benchmark_set_backtracking(c: &mut Criterion) {
    benchmark_solver(c, "set backtracking", true)
}

fn benchmark_generation(c: &mut Criterion) {
    let options = Options {
        target_difficulty: 200,
        iterations: 50,
        ..Options::default()
    };
    let mut group = c.benchmark_group("generation");
    configure(&mut group, GENERATOR_SAMPLE_SIZE);

    group.bench_function("choose-solution", |b| b.iter(|| {
        let mut generator =
            Generator::new(ChaCha8Rng::seed_from_u64(GENERATOR_SEED));
        generator.choose_solution().unwrap()
    }));
    group.bench_function("target-200", |b| b.iter(|| {
        let mut generator =
            Generator::new(ChaCha8Rng::seed_from_u64(GENERATOR_SEED));
        generator.generate(&options).unwrap()
    }));
}

fn benchmark_explanation(c: &mut Criterion) {
    let puzzle = wikipedia_puzzle();
    let mut group = c.benchmark_group("explanation");
    configure(&mut group, ORACLE_SAMPLE_SIZE);

    group.bench_function("hint",
        |b| b.iter(|| Explainer::new_default().hint(&puzzle).unwrap()));
}

criterion_group!(all,
    benchmark_backtracking,
    benchmark_set_backtracking,
    benchmark_generation,
    benchmark_explanation
);

criterion_main!(all);
