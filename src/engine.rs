//! This module contains the engine facade that bundles the expensive
//! puzzle operations behind one interface.
//!
//! [InProcessEngine] runs the solver and generator of this crate. If the
//! `native` feature is enabled, [NativeEngine] instead delegates to the
//! external `sugen` C library through its byte-level interface. Both
//! implement [Engine], so a backend is chosen at construction and callers
//! stay agnostic afterwards.

use crate::Puzzle;
use crate::error::SudokuResult;
use crate::generator::Generator;
use crate::solver::{Assessment, BacktrackingSolver, Interrupt, Solver};

use rand::Rng;
use rand::rngs::ThreadRng;

use serde::{Deserialize, Serialize};

/// The tuning knobs for generating, grading and explaining puzzles,
/// consumed at engine construction. [Options::default] provides the values
/// used by the interactive application.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Options {

    /// The difficulty score at which hardening stops during generation.
    pub target_difficulty: usize,

    /// An optional upper difficulty bound. Hardening never adopts a
    /// candidate that grades above this bound.
    pub max_difficulty: Option<usize>,

    /// The maximum number of hardening rounds spent on one puzzle.
    pub iterations: usize,

    /// Whether solvers branch set-oriented over a region in which some
    /// digit has fewer possible placements than the most constrained cell
    /// has candidates. Difficulty scores of the two branching modes are
    /// not comparable.
    pub sofa: bool,

    /// The number of smallest raw rule cores a hint minimizes before
    /// choosing the best one.
    pub hint_cutoff: usize,

    /// The cap up to which solutions are counted.
    pub model_cap: usize
}

impl Default for Options {
    fn default() -> Options {
        Options {
            target_difficulty: 400,
            max_difficulty: None,
            iterations: 200,
            sofa: false,
            hint_cutoff: 5,
            model_cap: 64
        }
    }
}

/// A trait for the backends implementing the expensive puzzle operations.
pub trait Engine {

    /// Solves and grades the given puzzle.
    ///
    /// # Errors
    ///
    /// `SudokuError::Interrupted` if the backend carries an [Interrupt]
    /// that was triggered during the search.
    fn solve(&self, puzzle: &Puzzle) -> SudokuResult<Assessment>;

    /// Generates a new puzzle hardened according to this engine's
    /// [Options], together with its difficulty score.
    ///
    /// # Errors
    ///
    /// `SudokuError::Interrupted` if the backend carries an [Interrupt]
    /// that was triggered during the search.
    fn generate(&mut self) -> SudokuResult<(usize, Puzzle)>;

    /// Counts the solutions of the given puzzle, stopping at this engine's
    /// `model_cap`.
    ///
    /// # Errors
    ///
    /// `SudokuError::Interrupted` if the backend carries an [Interrupt]
    /// that was triggered during the search.
    fn count_solutions(&self, puzzle: &Puzzle) -> SudokuResult<usize>;
}

/// An [Engine] that runs the search algorithms of this crate in the
/// calling thread.
pub struct InProcessEngine<R: Rng> {
    options: Options,
    solver: BacktrackingSolver,
    generator: Generator<R>
}

impl InProcessEngine<ThreadRng> {

    /// Creates a new in-process engine over the thread-local RNG, without
    /// an interrupt.
    pub fn new_default(options: Options) -> InProcessEngine<ThreadRng> {
        InProcessEngine::new(options, rand::thread_rng(), None)
    }
}

impl<R: Rng> InProcessEngine<R> {

    /// Creates a new in-process engine.
    ///
    /// # Arguments
    ///
    /// * `options`: The [Options] that configure all operations of this
    /// engine.
    /// * `rng`: The random number generator that drives puzzle generation.
    /// * `interrupt`: An optional [Interrupt] polled by all searches this
    /// engine runs.
    pub fn new(options: Options, rng: R, interrupt: Option<Interrupt>)
            -> InProcessEngine<R> {
        let solver = BacktrackingSolver::new_configured(options.sofa,
            interrupt.clone());
        let generator = match interrupt {
            Some(interrupt) => Generator::new_interruptible(rng, interrupt),
            None => Generator::new(rng)
        };

        InProcessEngine {
            options,
            solver,
            generator
        }
    }
}

impl<R: Rng> Engine for InProcessEngine<R> {

    fn solve(&self, puzzle: &Puzzle) -> SudokuResult<Assessment> {
        self.solver.solve(puzzle)
    }

    fn generate(&mut self) -> SudokuResult<(usize, Puzzle)> {
        self.generator.generate(&self.options)
    }

    fn count_solutions(&self, puzzle: &Puzzle) -> SudokuResult<usize> {
        self.solver.count_solutions(puzzle, self.options.model_cap)
    }
}

#[cfg(feature = "native")]
mod native {

    use super::*;

    use crate::regions::coordinates;
    use crate::solver::Solution;
    use crate::util::CELL_COUNT;

    #[link(name = "sugen")]
    extern "C" {
        fn db_solve_puzzle(puzzle: *const u8, solution: *mut u8,
            difficulty: *mut u32, sofa: bool) -> i32;

        fn db_generate_puzzle(puzzle: *mut u8, difficulty: *mut u32,
            target_difficulty: u32, max_difficulty: i32, iterations: u32,
            sofa: bool);
    }

    /// An [Engine] that delegates solving and generation to the external
    /// `sugen` C library. Puzzles cross the boundary in the 81-byte
    /// encoding of [Puzzle::to_bytes]. The library does not support
    /// cooperative interruption, so its searches always run to completion.
    pub struct NativeEngine {
        options: Options
    }

    impl NativeEngine {

        /// Creates a new native engine with the given [Options].
        pub fn new(options: Options) -> NativeEngine {
            NativeEngine {
                options
            }
        }
    }

    impl Engine for NativeEngine {

        fn solve(&self, puzzle: &Puzzle) -> SudokuResult<Assessment> {
            let input = puzzle.to_bytes();
            let mut output = [0u8; CELL_COUNT];
            let mut difficulty = 0u32;

            // the status is the solution count, capped at 2, minus 1
            let status = unsafe {
                db_solve_puzzle(input.as_ptr(), output.as_mut_ptr(),
                    &mut difficulty, self.options.sofa)
            };

            match status {
                status if status < 0 => Ok(Assessment {
                    solution: Solution::Impossible,
                    difficulty: 0
                }),
                0 => {
                    let full = Puzzle::from_bytes(&output)?;
                    let mut filled = Puzzle::new_empty();

                    for index in 0..CELL_COUNT {
                        let (row, col) = coordinates(index);

                        if puzzle.get_cell(row, col)?.is_none() {
                            let value = full.get_cell(row, col)?.unwrap();
                            filled.set_cell(row, col, value)?;
                        }
                    }

                    Ok(Assessment {
                        solution: Solution::Unique(filled),
                        difficulty: difficulty as usize
                    })
                },
                _ => Ok(Assessment {
                    solution: Solution::Ambiguous,
                    difficulty: difficulty as usize
                })
            }
        }

        fn generate(&mut self) -> SudokuResult<(usize, Puzzle)> {
            let mut output = [0u8; CELL_COUNT];
            let mut difficulty = 0u32;
            let max_difficulty = self.options.max_difficulty
                .map_or(-1, |cap| cap as i32);

            unsafe {
                db_generate_puzzle(output.as_mut_ptr(), &mut difficulty,
                    self.options.target_difficulty as u32, max_difficulty,
                    self.options.iterations as u32, self.options.sofa);
            }

            let puzzle = Puzzle::from_bytes(&output)?;
            Ok((difficulty as usize, puzzle))
        }

        fn count_solutions(&self, puzzle: &Puzzle) -> SudokuResult<usize> {
            // the library has no counting entry point
            BacktrackingSolver::new()
                .count_solutions(puzzle, self.options.model_cap)
        }
    }
}

#[cfg(feature = "native")]
pub use native::NativeEngine;
