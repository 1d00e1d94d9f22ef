//! This module contains the logic for generating random Sudoku.
//!
//! Most importantly, this module contains the definition of [Generator],
//! which first chooses a uniformly random complete grid and then hardens it
//! towards a requested difficulty. Hardening erases and restores clues in
//! point-symmetric pairs and keeps the hardest variant that remains
//! uniquely solvable.

use crate::Puzzle;
use crate::engine::Options;
use crate::error::{SudokuError, SudokuResult};
use crate::regions::coordinates;
use crate::solver::{BacktrackingSolver, Interrupt, Solution, Solver};
use crate::util::{CELL_COUNT, DigitSet};

use rand::Rng;
use rand::rngs::ThreadRng;

/// The number of cell pairs that are erased or restored between two
/// gradings during hardening. Applying a whole batch before grading again
/// lets the search wander out of local difficulty maxima.
const PERTURBATIONS_PER_ITERATION: usize = 18;

pub(crate) fn shuffle<T>(rng: &mut impl Rng, values: impl Iterator<Item = T>)
        -> Vec<T> {
    let mut vec: Vec<T> = values.collect();
    let len = vec.len();

    for i in 0..(len - 1) {
        let j = rng.gen_range(i..len);
        vec.swap(i, j);
    }

    vec
}

fn restore_cell(puzzle: &mut Puzzle, solution: &Puzzle, index: usize) {
    let (row, col) = coordinates(index);
    let value = solution.get_cell(row, col).unwrap().unwrap();
    puzzle.set_cell(row, col, value).unwrap();
}

fn erase_by_index(puzzle: &mut Puzzle, index: usize) {
    let (row, col) = coordinates(index);
    puzzle.erase_cell(row, col).unwrap();
}

/// A `Generator` produces random Sudoku puzzles. Every choice is drawn from
/// the wrapped random number generator, so a generator over a seeded RNG
/// reproduces its puzzles. Puzzles are hardened towards a difficulty goal
/// specified in the [Options] passed to [Generator::generate].
pub struct Generator<R: Rng> {
    rng: R,
    interrupt: Option<Interrupt>
}

impl Generator<ThreadRng> {

    /// Creates a new generator that wraps the thread-local RNG
    /// ([rand::thread_rng]).
    pub fn new_default() -> Generator<ThreadRng> {
        Generator::new(rand::thread_rng())
    }
}

impl<R: Rng> Generator<R> {

    /// Creates a new generator that wraps the given RNG.
    pub fn new(rng: R) -> Generator<R> {
        Generator {
            rng,
            interrupt: None
        }
    }

    /// Creates a new generator that wraps the given RNG and polls the given
    /// [Interrupt] while searching, both while choosing a solution grid and
    /// in the solver used for grading.
    pub fn new_interruptible(rng: R, interrupt: Interrupt) -> Generator<R> {
        Generator {
            rng,
            interrupt: Some(interrupt)
        }
    }

    fn check_interrupt(&self) -> SudokuResult<()> {
        match &self.interrupt {
            Some(interrupt) if interrupt.is_triggered() =>
                Err(SudokuError::Interrupted),
            _ => Ok(())
        }
    }

    fn pick_value(&mut self, values: DigitSet) -> Option<usize> {
        if values.is_empty() {
            return None;
        }

        let choice = self.rng.gen_range(0..values.len());
        values.iter().nth(choice)
    }

    fn fill_first_block(&mut self, puzzle: &mut Puzzle) {
        let mut digits = shuffle(&mut self.rng, 1..=9).into_iter();

        for row in 0..3 {
            for col in 0..3 {
                puzzle.set_cell(row, col, digits.next().unwrap()).unwrap();
            }
        }
    }

    fn try_fill_top_block(&mut self, puzzle: &mut Puzzle, start_col: usize)
            -> bool {
        for row in 0..3 {
            for col in start_col..(start_col + 3) {
                let free = puzzle.freedom_set(row, col).unwrap();

                match self.pick_value(free) {
                    Some(value) =>
                        puzzle.set_cell(row, col, value).unwrap(),
                    None => return false
                }
            }
        }

        true
    }

    fn fill_top_block(&mut self, puzzle: &mut Puzzle, start_col: usize)
            -> SudokuResult<()> {
        loop {
            self.check_interrupt()?;

            if self.try_fill_top_block(puzzle, start_col) {
                return Ok(());
            }

            for row in 0..3 {
                for col in start_col..(start_col + 3) {
                    puzzle.erase_cell(row, col).unwrap();
                }
            }
        }
    }

    fn fill_first_column(&mut self, puzzle: &mut Puzzle) {
        for row in 3..9 {
            let free = puzzle.freedom_set(row, 0).unwrap();

            // only the column itself constrains these cells, so the digits
            // it still misses are all legal
            let value = self.pick_value(free).unwrap();
            puzzle.set_cell(row, 0, value).unwrap();
        }
    }

    fn fill_rec(&mut self, puzzle: &mut Puzzle) -> SudokuResult<bool> {
        self.check_interrupt()?;

        let (row, col) = match puzzle.least_free() {
            Some(cell) => cell,
            None => return Ok(true)
        };

        let free = puzzle.freedom_set(row, col).unwrap();

        if free.is_empty() {
            return Ok(false);
        }

        for value in shuffle(&mut self.rng, free.iter()) {
            puzzle.set_cell(row, col, value).unwrap();

            if self.fill_rec(puzzle)? {
                return Ok(true);
            }

            puzzle.erase_cell(row, col).unwrap();
        }

        Ok(false)
    }

    /// Chooses a uniformly random completely filled grid. The top-left
    /// block receives a random permutation of the digits, the two other top
    /// blocks are sampled cell by cell and resampled wholesale whenever a
    /// cell runs out of legal digits, the rest of the first column is drawn
    /// from its remaining digits and all other cells are completed by a
    /// randomized backtracking search over the most constrained cell.
    ///
    /// # Errors
    ///
    /// `SudokuError::Interrupted` if this generator carries an [Interrupt]
    /// that was triggered during the search.
    pub fn choose_solution(&mut self) -> SudokuResult<Puzzle> {
        let mut puzzle = Puzzle::new_empty();

        self.fill_first_block(&mut puzzle);
        self.fill_top_block(&mut puzzle, 3)?;
        self.fill_top_block(&mut puzzle, 6)?;
        self.fill_first_column(&mut puzzle);

        if !self.fill_rec(&mut puzzle)? {
            panic!("Top band and first column could not be completed.");
        }

        Ok(puzzle)
    }

    fn harden(&mut self, solution: &Puzzle, mut puzzle: Puzzle,
            options: &Options) -> SudokuResult<(usize, Puzzle)> {
        let solver = BacktrackingSolver::new_configured(options.sofa,
            self.interrupt.clone());
        let mut best = solver.solve(&puzzle)?.difficulty;

        for _ in 0..options.iterations {
            if best >= options.target_difficulty {
                return Ok((best, puzzle));
            }

            let mut next = puzzle.clone();

            for _ in 0..PERTURBATIONS_PER_ITERATION {
                let index = self.rng.gen_range(0..CELL_COUNT);
                let partner = CELL_COUNT - index - 1;

                if self.rng.gen_bool(0.5) {
                    restore_cell(&mut next, solution, index);
                    restore_cell(&mut next, solution, partner);
                }
                else {
                    erase_by_index(&mut next, index);
                    erase_by_index(&mut next, partner);
                }
            }

            let assessment = solver.solve(&next)?;
            let within_cap = options.max_difficulty
                .map_or(true, |cap| assessment.difficulty <= cap);

            if within_cap && assessment.difficulty >= best {
                if let Solution::Unique(_) = assessment.solution {
                    best = assessment.difficulty;
                    puzzle = next;
                }
            }
        }

        Ok((best, puzzle))
    }

    /// Generates a new puzzle together with its difficulty score.
    ///
    /// First a complete solution grid is chosen with
    /// [Generator::choose_solution], then the puzzle is hardened: starting
    /// from the full grid, clues are erased and restored in point-symmetric
    /// pairs and every perturbed candidate that is still uniquely solvable,
    /// at least as difficult as the current best and within
    /// `options.max_difficulty` replaces the best. Hardening returns as
    /// soon as the best difficulty reaches `options.target_difficulty`. If
    /// the budget of `options.iterations` rounds runs out first, the best
    /// puzzle found so far is returned even though it falls short of the
    /// target.
    ///
    /// # Arguments
    ///
    /// * `options`: The [Options] providing the difficulty goals, the
    /// iteration budget and the branching mode of the grading solver.
    ///
    /// # Errors
    ///
    /// `SudokuError::Interrupted` if this generator carries an [Interrupt]
    /// that was triggered during the search.
    pub fn generate(&mut self, options: &Options)
            -> SudokuResult<(usize, Puzzle)> {
        let solution = self.choose_solution()?;
        let puzzle = solution.clone();
        self.harden(&solution, puzzle, options)
    }
}
