use crate::Puzzle;
use crate::engine::Options;
use crate::explain::Explainer;
use crate::generator::Generator;
use crate::solver::{BacktrackingSolver, Solution, Solver};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// The puzzle and its solution are the introductory example from
// https://en.wikipedia.org/wiki/Sudoku

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

fn full_grid() -> Puzzle {
    Puzzle::parse(
        "123456789\n\
         456789123\n\
         789123456\n\
         231564897\n\
         564897231\n\
         897231564\n\
         312645978\n\
         645978312\n\
         978312645").unwrap()
}

fn solve_to_full(solver: &BacktrackingSolver, puzzle: &Puzzle) -> Puzzle {
    let assessment = solver.solve(puzzle).unwrap();

    if let Solution::Unique(filled) = assessment.solution {
        let mut merged = puzzle.clone();
        merged.merge(&filled);
        merged
    }
    else {
        panic!("Puzzle not uniquely solvable.");
    }
}

#[test]
fn wikipedia_example_solves_to_the_published_solution() {
    let merged =
        solve_to_full(&BacktrackingSolver::new(), &wikipedia_puzzle());

    assert_eq!(wikipedia_solution(), merged);
}

#[test]
fn set_oriented_branching_agrees_on_the_wikipedia_example() {
    let solver = BacktrackingSolver::new_configured(true, None);
    let merged = solve_to_full(&solver, &wikipedia_puzzle());

    assert_eq!(wikipedia_solution(), merged);
}

#[test]
fn wikipedia_difficulty_is_stable() {
    let puzzle = wikipedia_puzzle();
    let solver = BacktrackingSolver::new();
    let first = solver.solve(&puzzle).unwrap().difficulty;
    let second = solver.solve(&puzzle).unwrap().difficulty;

    assert_eq!(first, second);
    assert_eq!(51, puzzle.empty_cells());
    assert_eq!(51, first % 100);
}

#[test]
fn wikipedia_example_has_exactly_one_solution() {
    let count = BacktrackingSolver::new()
        .count_solutions(&wikipedia_puzzle(), 64).unwrap();

    assert_eq!(1, count);
}

#[test]
fn wikipedia_code_round_trips() {
    let puzzle = wikipedia_puzzle();
    let code = puzzle.to_string();

    assert_eq!(puzzle, Puzzle::parse(&code).unwrap());
}

#[test]
fn hint_on_the_wikipedia_example_is_consistent() {
    let puzzle = wikipedia_puzzle();
    let solution = wikipedia_solution();
    let hint = Explainer::new_default().hint(&puzzle).unwrap();

    assert_eq!(None, puzzle.get_cell(hint.row, hint.col).unwrap());
    assert_eq!(solution.get_cell(hint.row, hint.col).unwrap(),
        Some(hint.value));
    assert!(!hint.rules.is_empty());
    assert!(hint.rules.len() <= 27);
}

#[test]
fn scattered_erasures_justify_with_single_rules() {
    // every erased cell is the only empty one in its row, column and block
    let cells = [
        (0, 0, 1), (1, 3, 7), (2, 6, 4),
        (3, 1, 3), (4, 4, 9), (5, 7, 6),
        (6, 2, 2), (7, 5, 8), (8, 8, 5)
    ];
    let mut puzzle = full_grid();

    for &(row, col, _) in cells.iter() {
        puzzle.erase_cell(row, col).unwrap();
    }

    let cores = Explainer::new_default().justify(&puzzle).unwrap();

    assert_eq!(9, cores.len());
    assert_eq!(0, cores.metric());

    for justification in cores.iter() {
        assert_eq!(1, justification.rules.len(),
            "A lone empty cell needs more than one rule.");
        assert!(cells.contains(
            &(justification.row, justification.col, justification.value)));
    }
}

#[test]
fn generation_is_reproducible_for_a_fixed_seed() {
    let options = Options {
        target_difficulty: 60,
        iterations: 30,
        ..Options::default()
    };
    let mut first_generator = Generator::new(ChaCha8Rng::seed_from_u64(7));
    let mut second_generator = Generator::new(ChaCha8Rng::seed_from_u64(7));

    assert_eq!(first_generator.generate(&options).unwrap(),
        second_generator.generate(&options).unwrap());
}
