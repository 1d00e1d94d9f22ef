//! This module contains the logic for solving Sudoku.
//!
//! Most importantly, this module contains the definition of the [Solver]
//! trait and the [BacktrackingSolver] as a generally usable implementation.
//! Besides deciding solvability, solving also grades the difficulty of a
//! puzzle, which is wrapped together with the [Solution] in an [Assessment].

use crate::Puzzle;
use crate::error::{SudokuError, SudokuResult};
use crate::regions::{coordinates, RegionId};
use crate::util::{CELL_COUNT, DigitSet};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// An enumeration of the different ways a Sudoku puzzle can be solvable.
/// The solver implemented in this crate is perfect, so `Ambiguous` really
/// means more than one solution rather than an inconclusive search.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Solution {

    /// Indicates that the puzzle is not solvable at all.
    Impossible,

    /// Indicates that the puzzle has a unique solution. The wrapped puzzle
    /// holds the digits the solver filled in, not the original clues, so
    /// merging it onto the problem yields the complete grid.
    Unique(Puzzle),

    /// Indicates that the puzzle has more than one solution.
    Ambiguous
}

/// The result of grading a puzzle, consisting of the [Solution] and the
/// difficulty score derived from the search that found it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assessment {

    /// The solvability verdict for the puzzle.
    pub solution: Solution,

    /// The difficulty score, computed as 100 times the branching penalty
    /// accumulated on the path to the first solution plus the number of
    /// empty cells. Every branch point with `k` candidates contributes
    /// `(k - 1)²`, so a puzzle solvable without backtracking scores just
    /// its empty cell count. For impossible puzzles this is 0. Scores are
    /// only comparable between runs with the same branching mode.
    pub difficulty: usize
}

/// A trait for structs which have the ability to solve Sudoku puzzles and
/// grade their difficulty.
pub trait Solver {

    /// Solves the provided puzzle, determining whether it has no solution,
    /// exactly one, or more than one, together with a difficulty grade.
    ///
    /// # Errors
    ///
    /// `SudokuError::Interrupted` if the solver carries an [Interrupt] that
    /// was triggered during the search. The provided puzzle is never
    /// mutated, so an interrupted search poisons no state.
    fn solve(&self, puzzle: &Puzzle) -> SudokuResult<Assessment>;
}

/// A cloneable cancellation handle for long-running searches. An interrupt
/// trips either when [Interrupt::trigger] is called on any clone or when an
/// optional deadline passes. Solvers and generators poll it at every
/// recursive call and abort with `SudokuError::Interrupted`.
#[derive(Clone, Debug)]
pub struct Interrupt {
    triggered: Arc<AtomicBool>,
    deadline: Option<Instant>
}

impl Interrupt {

    /// Creates a new interrupt that only trips when [Interrupt::trigger] is
    /// called.
    pub fn new() -> Interrupt {
        Interrupt {
            triggered: Arc::new(AtomicBool::new(false)),
            deadline: None
        }
    }

    /// Creates a new interrupt that trips once the given deadline has
    /// passed, in addition to explicit triggering.
    pub fn with_deadline(deadline: Instant) -> Interrupt {
        Interrupt {
            triggered: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline)
        }
    }

    /// Trips this interrupt and all of its clones.
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::Relaxed);
    }

    /// Indicates whether this interrupt has been triggered or its deadline
    /// has passed.
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Relaxed)
            || self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }
}

struct Search {
    count: usize,
    branch_score: usize,
    solution: Option<Puzzle>,
    empties: Vec<(usize, usize)>
}

struct SofaBranch {
    cells: Vec<(usize, usize)>,
    value: usize
}

fn extract_filled(puzzle: &Puzzle, empties: &[(usize, usize)]) -> Puzzle {
    let mut filled = Puzzle::new_empty();

    for &(row, col) in empties {
        if let Some(value) = puzzle.get_cell(row, col).unwrap() {
            filled.set_cell(row, col, value).unwrap();
        }
    }

    filled
}

/// Finds the (region, digit) pair with the fewest possible placements,
/// where a placement is an empty cell of the region whose freedom set
/// allows the digit. Only digits missing from the region are considered.
/// Ties keep the first candidate in region order, then the lowest digit.
/// Returns `None` only if every region is complete.
fn best_sofa_branch(puzzle: &Puzzle) -> Option<SofaBranch> {
    let mut best: Option<SofaBranch> = None;

    for region in RegionId::all() {
        let mut missing = DigitSet::full();
        let mut counts = [0usize; 9];

        for index in region.cells().iter() {
            let (row, col) = coordinates(index);

            match puzzle.get_cell(row, col).unwrap() {
                Some(value) => {
                    missing.remove(value).unwrap();
                },
                None => {
                    for value in puzzle.freedom_set(row, col).unwrap().iter() {
                        counts[value - 1] += 1;
                    }
                }
            }
        }

        let mut region_best = None;

        for value in missing.iter() {
            let better = match region_best {
                None => true,
                Some(best_value) => counts[value - 1] < counts[best_value - 1]
            };

            if better {
                region_best = Some(value);
            }
        }

        if let Some(value) = region_best {
            let size = counts[value - 1];
            let improves = match &best {
                None => true,
                Some(best) => size < best.cells.len()
            };

            if improves {
                let cells = region.cells().iter()
                    .map(coordinates)
                    .filter(|&(row, col)|
                        puzzle.get_cell(row, col).unwrap().is_none()
                            && puzzle.freedom_set(row, col).unwrap()
                                .contains(value))
                    .collect();
                best = Some(SofaBranch {
                    cells,
                    value
                });
            }
        }
    }

    best
}

/// A perfect [Solver] which solves puzzles by recursively testing all legal
/// digits for the most constrained cell. The search stops as soon as two
/// solutions have been found, so proving non-uniqueness never explores the
/// full solution space.
///
/// Optionally the solver branches set-oriented: when the chosen cell has
/// more than one candidate, it looks for a region and digit where the digit
/// fits in fewer places than the cell has candidates, and branches over
/// those placements instead. This often removes the need for backtracking
/// entirely, but it changes the difficulty scale, so scores from the two
/// modes must not be compared.
pub struct BacktrackingSolver {
    sofa: bool,
    interrupt: Option<Interrupt>
}

impl BacktrackingSolver {

    /// Creates a new solver with cell-oriented branching and no interrupt.
    pub fn new() -> BacktrackingSolver {
        BacktrackingSolver::new_configured(false, None)
    }

    /// Creates a new solver with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `sofa`: Whether to use set-oriented branching where it lowers the
    /// branching factor.
    /// * `interrupt`: An optional [Interrupt] polled at every recursive
    /// call of the search.
    pub fn new_configured(sofa: bool, interrupt: Option<Interrupt>)
            -> BacktrackingSolver {
        BacktrackingSolver {
            sofa,
            interrupt
        }
    }

    fn check_interrupt(&self) -> SudokuResult<()> {
        match &self.interrupt {
            Some(interrupt) if interrupt.is_triggered() =>
                Err(SudokuError::Interrupted),
            _ => Ok(())
        }
    }

    fn branch_on_placements(&self, puzzle: &mut Puzzle, search: &mut Search,
            diff: usize, branch: &SofaBranch) -> SudokuResult<()> {
        if branch.cells.is_empty() {
            // a region misses the digit but has nowhere to put it
            return Ok(());
        }

        let branch_factor = branch.cells.len() - 1;
        let diff = diff + branch_factor * branch_factor;

        for &(row, col) in &branch.cells {
            puzzle.set_cell(row, col, branch.value).unwrap();
            self.solve_rec(puzzle, search, diff)?;
            puzzle.erase_cell(row, col).unwrap();

            if search.count >= 2 {
                return Ok(());
            }
        }

        Ok(())
    }

    fn solve_rec(&self, puzzle: &mut Puzzle, search: &mut Search, diff: usize)
            -> SudokuResult<()> {
        self.check_interrupt()?;

        let (row, col) = match puzzle.least_free() {
            Some(cell) => cell,
            None => {
                if search.count == 0 {
                    search.branch_score = diff;
                    search.solution =
                        Some(extract_filled(puzzle, &search.empties));
                }

                search.count += 1;
                return Ok(());
            }
        };

        let free = puzzle.freedom_set(row, col).unwrap();

        if free.is_empty() {
            return Ok(());
        }

        if self.sofa && free.len() > 1 {
            if let Some(branch) = best_sofa_branch(puzzle) {
                if branch.cells.len() < free.len() {
                    return self.branch_on_placements(puzzle, search, diff,
                        &branch);
                }
            }
        }

        let branch_factor = free.len() - 1;
        let diff = diff + branch_factor * branch_factor;

        for value in free.iter() {
            puzzle.set_cell(row, col, value).unwrap();
            self.solve_rec(puzzle, search, diff)?;

            if search.count >= 2 {
                return Ok(());
            }
        }

        puzzle.erase_cell(row, col).unwrap();
        Ok(())
    }

    fn count_rec(&self, puzzle: &mut Puzzle, cap: usize, count: &mut usize)
            -> SudokuResult<()> {
        self.check_interrupt()?;

        let (row, col) = match puzzle.least_free() {
            Some(cell) => cell,
            None => {
                *count += 1;
                return Ok(());
            }
        };

        for value in puzzle.freedom_set(row, col).unwrap().iter() {
            puzzle.set_cell(row, col, value).unwrap();
            self.count_rec(puzzle, cap, count)?;

            if *count >= cap {
                return Ok(());
            }
        }

        puzzle.erase_cell(row, col).unwrap();
        Ok(())
    }

    /// Counts the complete solutions of the given puzzle, stopping as soon
    /// as `cap` solutions have been found. The return value is therefore
    /// the minimum of the true solution count and `cap`.
    ///
    /// # Arguments
    ///
    /// * `puzzle`: The puzzle whose solutions to count. It is not mutated.
    /// * `cap`: The maximum number of solutions to count. A cap of 0
    /// returns 0 without searching.
    ///
    /// # Errors
    ///
    /// `SudokuError::Interrupted` if the solver carries an [Interrupt] that
    /// was triggered during the search.
    pub fn count_solutions(&self, puzzle: &Puzzle, cap: usize)
            -> SudokuResult<usize> {
        if cap == 0 || !puzzle.sanity_check() {
            return Ok(0);
        }

        let mut workspace = puzzle.clone();
        let mut count = 0;
        self.count_rec(&mut workspace, cap, &mut count)?;
        Ok(count)
    }
}

impl Solver for BacktrackingSolver {
    fn solve(&self, puzzle: &Puzzle) -> SudokuResult<Assessment> {
        if !puzzle.sanity_check() {
            return Ok(Assessment {
                solution: Solution::Impossible,
                difficulty: 0
            });
        }

        let empties: Vec<(usize, usize)> = (0..CELL_COUNT)
            .map(coordinates)
            .filter(|&(row, col)| puzzle.get_cell(row, col).unwrap().is_none())
            .collect();
        let empty_cells = empties.len();
        let mut workspace = puzzle.clone();
        let mut search = Search {
            count: 0,
            branch_score: 0,
            solution: None,
            empties
        };

        self.solve_rec(&mut workspace, &mut search, 0)?;

        let difficulty =
            if search.count == 0 {
                0
            }
            else {
                search.branch_score * 100 + empty_cells
            };
        let solution = match search.count {
            0 => Solution::Impossible,
            1 => Solution::Unique(search.solution.take().unwrap()),
            _ => Solution::Ambiguous
        };

        Ok(Assessment {
            solution,
            difficulty
        })
    }
}
