use crate::Puzzle;
use crate::engine::Options;
use crate::error::ExplainError;
use crate::explain::Explainer;
use crate::generator::Generator;
use crate::regions::{coordinates, regions};
use crate::solver::{BacktrackingSolver, Solution, Solver};
use crate::util::{CELL_COUNT, DigitSet};

use rand::Rng;

const MUTATIONS_PER_RUN: usize = 200;
const SOLVER_RUNS: usize = 30;
const ORACLE_RUNS: usize = 10;
const GENERATION_RUNS: usize = 5;

fn derived_freedom(puzzle: &Puzzle, row: usize, col: usize) -> DigitSet {
    let mut forbidden = DigitSet::new();
    let peers = regions().peers(row, col).unwrap();

    for peer in peers.iter() {
        let (peer_row, peer_col) = coordinates(peer);

        if let Some(value) = puzzle.get_cell(peer_row, peer_col).unwrap() {
            forbidden.insert(value).unwrap();
        }
    }

    forbidden.complement()
}

fn assert_bookkeeping_consistent(puzzle: &Puzzle) {
    let mut empty_count = 0;

    for row in 0..9 {
        for col in 0..9 {
            let expected = derived_freedom(puzzle, row, col);

            assert_eq!(expected, puzzle.freedom_set(row, col).unwrap(),
                "Freedom sets diverged at ({}, {}).", row, col);

            if puzzle.get_cell(row, col).unwrap().is_none() {
                empty_count += 1;
            }
        }
    }

    assert_eq!(empty_count, puzzle.empty_cells());

    for value in 1..=9 {
        let sofa = puzzle.sofa(value).unwrap();
        let cells_with = puzzle.cells_with(value).unwrap();

        for index in 0..CELL_COUNT {
            let (row, col) = coordinates(index);
            let content = puzzle.get_cell(row, col).unwrap();
            let stuck = content.is_none()
                && !puzzle.freedom_set(row, col).unwrap().contains(value);

            assert_eq!(stuck, sofa.contains(index),
                "Stuck set of {} diverged at ({}, {}).", value, row, col);
            assert_eq!(content == Some(value), cells_with.contains(index),
                "Value map of {} diverged at ({}, {}).", value, row, col);
        }
    }
}

#[test]
fn bookkeeping_survives_random_edits() {
    let mut rng = rand::thread_rng();
    let mut puzzle = Puzzle::new_empty();

    for _ in 0..MUTATIONS_PER_RUN {
        let row = rng.gen_range(0..9);
        let col = rng.gen_range(0..9);

        if rng.gen_bool(0.7) {
            // overwrites and rule conflicts are legal here, the derived
            // state has to survive them
            puzzle.set_cell(row, col, rng.gen_range(1..=9)).unwrap();
        }
        else {
            puzzle.erase_cell(row, col).unwrap();
        }

        assert_bookkeeping_consistent(&puzzle);
    }
}

fn run_generation_test(options: &Options, iterations: usize) {
    for _ in 0..iterations {
        let mut generator = Generator::new_default();
        let (difficulty, puzzle) = generator.generate(options).unwrap();
        let solver = BacktrackingSolver::new_configured(options.sofa, None);
        let assessment = solver.solve(&puzzle).unwrap();

        assert_eq!(difficulty, assessment.difficulty);

        if let Solution::Unique(filled) = assessment.solution {
            let mut merged = puzzle.clone();
            merged.merge(&filled);
            assert!(merged.is_full());
            assert!(merged.sanity_check());
        }
        else {
            panic!("Generated puzzle is not uniquely solvable.");
        }
    }
}

#[test]
fn generated_puzzles_solve_uniquely() {
    let options = Options {
        target_difficulty: 60,
        iterations: 20,
        ..Options::default()
    };

    run_generation_test(&options, GENERATION_RUNS)
}

#[test]
fn set_oriented_generation_solves_uniquely() {
    let options = Options {
        target_difficulty: 60,
        iterations: 20,
        sofa: true,
        ..Options::default()
    };

    run_generation_test(&options, GENERATION_RUNS)
}

#[test]
fn branching_modes_agree_on_random_puzzles() {
    let mut rng = rand::thread_rng();
    let cell_mode = BacktrackingSolver::new();
    let set_mode = BacktrackingSolver::new_configured(true, None);

    for _ in 0..SOLVER_RUNS {
        let mut puzzle = Generator::new_default().choose_solution().unwrap();

        for _ in 0..30 {
            let row = rng.gen_range(0..9);
            let col = rng.gen_range(0..9);
            puzzle.erase_cell(row, col).unwrap();
        }

        assert_eq!(cell_mode.solve(&puzzle).unwrap().solution,
            set_mode.solve(&puzzle).unwrap().solution);
    }
}

#[test]
fn oracle_verdicts_match_the_solver() {
    let mut rng = rand::thread_rng();
    let solver = BacktrackingSolver::new();

    for _ in 0..ORACLE_RUNS {
        let mut puzzle = Generator::new_default().choose_solution().unwrap();

        for _ in 0..12 {
            let row = rng.gen_range(0..9);
            let col = rng.gen_range(0..9);
            puzzle.erase_cell(row, col).unwrap();
        }

        let assessment = solver.solve(&puzzle).unwrap();
        let justified = Explainer::new_default().justify(&puzzle);

        match assessment.solution {
            Solution::Unique(_) =>
                assert_eq!(puzzle.empty_cells(), justified.unwrap().len()),
            Solution::Ambiguous => match justified {
                Err(ExplainError::NoUniqueSolution) => { },
                _ => panic!("Justification of an ambiguous puzzle must fail.")
            },
            Solution::Impossible =>
                panic!("Erasing cells cannot make a grid unsolvable.")
        }
    }
}

#[test]
fn erasable_agrees_with_solution_counting() {
    let mut rng = rand::thread_rng();
    let solver = BacktrackingSolver::new();

    for _ in 0..ORACLE_RUNS {
        let mut puzzle = Generator::new_default().choose_solution().unwrap();

        for _ in 0..10 {
            let row = rng.gen_range(0..9);
            let col = rng.gen_range(0..9);
            puzzle.erase_cell(row, col).unwrap();
        }

        if solver.count_solutions(&puzzle, 2).unwrap() != 1 {
            continue;
        }

        let (row, col) = loop {
            let row = rng.gen_range(0..9);
            let col = rng.gen_range(0..9);

            if puzzle.get_cell(row, col).unwrap().is_some() {
                break (row, col);
            }
        };
        let mut reduced = puzzle.clone();
        reduced.erase_cell(row, col).unwrap();
        let still_unique = solver.count_solutions(&reduced, 2).unwrap() == 1;
        let erasable = Explainer::new_default()
            .erasable(&puzzle, row, col).unwrap();

        assert_eq!(still_unique, erasable);
    }
}
