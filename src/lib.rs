// Code lints

#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_import_braces)]
#![warn(unused_lifetimes)]
#![warn(unused_qualifications)]

// Doc lints

#![warn(broken_intra_doc_links)]
#![warn(missing_docs)]
#![warn(missing_crate_level_docs)]
#![warn(invalid_codeblock_attributes)]

//! This crate implements a complete engine for classic 9x9 Sudoku. It
//! supports the following key features:
//!
//! * Parsing and printing puzzles
//! * Solving puzzles with a perfect backtracking algorithm that also grades
//! their difficulty
//! * Generating puzzles hardened towards a target difficulty
//! * Explaining puzzles, that is, justifying every forced cell with a minimal
//! set of Sudoku rules, which also yields hints and a rule-based difficulty
//! metric
//!
//! # Parsing and printing puzzles
//!
//! A puzzle is written as nine lines of nine digits, where `'0'` denotes an
//! empty cell. See [Puzzle::parse] for the details. The same format is
//! emitted by the [Display](std::fmt::Display) implementation, while
//! [Puzzle::pretty] draws a box-art grid for human consumption.
//!
//! ```
//! use sudoku_tutor::Puzzle;
//!
//! let puzzle = Puzzle::parse(
//!     "530070000\n\
//!      600195000\n\
//!      098000060\n\
//!      800060003\n\
//!      400803001\n\
//!      700020006\n\
//!      060000280\n\
//!      000419005\n\
//!      000080079").unwrap();
//! println!("{}", puzzle.pretty());
//! ```
//!
//! # Solving puzzles
//!
//! The [BacktrackingSolver](solver::BacktrackingSolver) decides whether a
//! puzzle has no solution, exactly one, or more than one, and grades the
//! amount of branching it needed on the way to the first solution.
//!
//! ```
//! use sudoku_tutor::Puzzle;
//! use sudoku_tutor::solver::{BacktrackingSolver, Solution, Solver};
//!
//! let mut puzzle = Puzzle::parse(
//!     "123456789\n\
//!      456789123\n\
//!      789123456\n\
//!      231564897\n\
//!      564897231\n\
//!      897231564\n\
//!      312645978\n\
//!      645978312\n\
//!      978312645").unwrap();
//! puzzle.erase_cell(0, 0).unwrap();
//! puzzle.erase_cell(4, 4).unwrap();
//!
//! let assessment = BacktrackingSolver::new().solve(&puzzle).unwrap();
//!
//! match assessment.solution {
//!     Solution::Unique(filled) => {
//!         assert_eq!(Some(1), filled.get_cell(0, 0).unwrap());
//!         assert_eq!(Some(9), filled.get_cell(4, 4).unwrap());
//!     },
//!     _ => panic!("solution should be unique")
//! }
//!
//! assert_eq!(2, assessment.difficulty);
//! ```
//!
//! # Generating puzzles
//!
//! The [Generator](generator::Generator) first chooses a random complete
//! solution and then hardens it by repeatedly erasing and restoring clues,
//! keeping every change that raises the graded difficulty while the puzzle
//! stays uniquely solvable. A target difficulty of 0 returns the untouched
//! solution.
//!
//! ```
//! use sudoku_tutor::engine::Options;
//! use sudoku_tutor::generator::Generator;
//!
//! let mut generator = Generator::new_default();
//! let options = Options {
//!     target_difficulty: 0,
//!     ..Options::default()
//! };
//! let (difficulty, puzzle) = generator.generate(&options).unwrap();
//!
//! assert_eq!(0, difficulty);
//! assert!(puzzle.is_full());
//! ```
//!
//! # Explaining puzzles
//!
//! The [Explainer](explain::Explainer) justifies every forced cell with an
//! inclusion-minimal set of the 27 uniqueness rules, which makes for hints
//! that tell the player *why* a cell is determined rather than just its
//! value.
//!
//! ```
//! use sudoku_tutor::Puzzle;
//! use sudoku_tutor::explain::Explainer;
//!
//! let mut puzzle = Puzzle::parse(
//!     "123456789\n\
//!      456789123\n\
//!      789123456\n\
//!      231564897\n\
//!      564897231\n\
//!      897231564\n\
//!      312645978\n\
//!      645978312\n\
//!      978312645").unwrap();
//! puzzle.erase_cell(8, 8).unwrap();
//!
//! let mut explainer = Explainer::new_default();
//! let justification = explainer.hint(&puzzle).unwrap();
//!
//! assert_eq!(8, justification.row);
//! assert_eq!(8, justification.col);
//! assert_eq!(5, justification.value);
//! assert_eq!(1, justification.rules.len());
//! ```
//!
//! # Note regarding performance
//!
//! Solving and generating single puzzles is fast, but hardening towards high
//! difficulty targets and computing full justifications solve the puzzle
//! many times over. It is strongly recommended to use at least
//! `opt-level = 2` for tests that generate or explain puzzles; the test
//! profile of this crate does so.

pub mod engine;
pub mod error;
pub mod explain;
pub mod generator;
pub mod oracle;
pub mod regions;
pub mod solver;
pub mod util;

mod freedom;

#[cfg(test)]
mod fix_tests;

#[cfg(test)]
mod random_tests;

use error::{
    PuzzleParseError,
    PuzzleParseResult,
    SudokuError,
    SudokuResult
};
use freedom::Freedom;
use regions::{cell_index, coordinates};
use serde::{Deserialize, Serialize};
use util::{CELL_COUNT, CellSet, DigitSet};

use std::convert::TryFrom;
use std::fmt::{self, Display, Formatter};

/// A classic 9x9 Sudoku puzzle. The grid is composed of 81 cells organized
/// into nine rows, nine columns, and nine 3x3 blocks, each of which must
/// contain every digit from 1 to 9 at most once. Each cell may or may not be
/// occupied by a digit; the puzzle itself never enforces the uniqueness
/// rules on writes, so temporarily contradictory states are legal (see
/// [Puzzle::sanity_check]).
///
/// Besides the grid, a puzzle maintains derived state in lockstep with every
/// mutation: the set of cells holding each digit, the number of empty cells,
/// and for every cell the set of digits that appear among its peers, that
/// is, the digits the cell cannot take (see [Puzzle::freedom_set]). All of
/// this is updated incrementally by [Puzzle::set_cell] and
/// [Puzzle::erase_cell], so no caller ever observes a partially updated
/// state.
///
/// `Puzzle` implements `Display` using the nine-line digit format of
/// [Puzzle::parse], with which it round-trips exactly. Serde support
/// serializes a puzzle as that code string.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(into = "String")]
#[serde(try_from = "String")]
pub struct Puzzle {
    cells: [Option<usize>; CELL_COUNT],
    value_map: [CellSet; 9],
    empty_cells: usize,
    freedom: Freedom
}

fn to_char(cell: Option<usize>) -> char {
    if let Some(n) = cell {
        ('0' as u8 + n as u8) as char
    }
    else {
        ' '
    }
}

fn to_code_char(cell: Option<usize>) -> char {
    if let Some(n) = cell {
        ('0' as u8 + n as u8) as char
    }
    else {
        '0'
    }
}

fn line(start: char, thick_sep: char, thin_sep: char,
        segment: impl Fn(usize) -> char, pad: char, end: char, newline: bool)
        -> String {
    let mut result = String::new();

    for col in 0..9 {
        if col == 0 {
            result.push(start);
        }
        else if col % 3 == 0 {
            result.push(thick_sep);
        }
        else {
            result.push(thin_sep);
        }

        result.push(pad);
        result.push(segment(col));
        result.push(pad);
    }

    result.push(end);

    if newline {
        result.push('\n');
    }

    result
}

fn top_row() -> String {
    line('╔', '╦', '╤', |_| '═', '═', '╗', true)
}

fn thin_separator_line() -> String {
    line('╟', '╫', '┼', |_| '─', '─', '╢', true)
}

fn thick_separator_line() -> String {
    line('╠', '╬', '╪', |_| '═', '═', '╣', true)
}

fn bottom_row() -> String {
    line('╚', '╩', '╧', |_| '═', '═', '╝', false)
}

fn content_row(puzzle: &Puzzle, row: usize) -> String {
    line('║', '║', '│', |col| to_char(puzzle.get_cell(row, col).unwrap()),
        ' ', '║', true)
}

impl Display for Puzzle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for row in 0..9 {
            if row > 0 {
                f.write_str("\n")?;
            }

            for col in 0..9 {
                let index = row * 9 + col;
                write!(f, "{}", to_code_char(self.cells[index]))?;
            }
        }

        Ok(())
    }
}

impl From<Puzzle> for String {
    fn from(puzzle: Puzzle) -> String {
        puzzle.to_string()
    }
}

impl TryFrom<String> for Puzzle {
    type Error = PuzzleParseError;

    fn try_from(code: String) -> Result<Puzzle, PuzzleParseError> {
        Puzzle::parse(&code)
    }
}

impl Puzzle {

    /// Creates a new, empty puzzle in which all 81 cells are empty and
    /// every digit is allowed everywhere.
    pub fn new_empty() -> Puzzle {
        Puzzle {
            cells: [None; CELL_COUNT],
            value_map: [CellSet::new(); 9],
            empty_cells: CELL_COUNT,
            freedom: Freedom::new()
        }
    }

    /// Creates a puzzle from a matrix of digits in row-major order, where 0
    /// denotes an empty cell. The cells are assigned by sequential
    /// [Puzzle::set_cell] calls.
    ///
    /// # Errors
    ///
    /// `SudokuError::InvalidNumber` if any entry is greater than 9.
    pub fn from_array(values: &[[usize; 9]; 9]) -> SudokuResult<Puzzle> {
        let mut puzzle = Puzzle::new_empty();

        for (row, row_values) in values.iter().enumerate() {
            for (col, &value) in row_values.iter().enumerate() {
                if value != 0 {
                    puzzle.set_cell(row, col, value)?;
                }
            }
        }

        Ok(puzzle)
    }

    /// Parses a code encoding a puzzle. The code has to consist of nine
    /// lines of nine characters each, where every character is a digit and
    /// `'0'` denotes an empty cell. Rows are given top to bottom and cells
    /// left to right within each row. Leading and trailing whitespace on
    /// each line as well as blank lines are ignored to allow for more
    /// intuitive formatting of string literals.
    ///
    /// As an example, the first three lines of a code could look like this:
    ///
    /// ```text
    /// 530070000
    /// 600195000
    /// 098000060
    /// ```
    ///
    /// # Errors
    ///
    /// Any specialization of `PuzzleParseError` (see that documentation).
    pub fn parse(code: &str) -> PuzzleParseResult<Puzzle> {
        let lines: Vec<&str> = code.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.len() != 9 {
            return Err(PuzzleParseError::WrongNumberOfLines);
        }

        let mut puzzle = Puzzle::new_empty();

        for (row, line) in lines.iter().enumerate() {
            if line.chars().count() != 9 {
                return Err(PuzzleParseError::WrongLineLength);
            }

            for (col, c) in line.chars().enumerate() {
                match c.to_digit(10) {
                    Some(0) => { },
                    Some(digit) =>
                        puzzle.set_cell(row, col, digit as usize).unwrap(),
                    None => return Err(PuzzleParseError::InvalidCharacter)
                }
            }
        }

        Ok(puzzle)
    }

    /// Converts the puzzle into a box-art string for human consumption,
    /// with thick separators around the 3x3 blocks and a blank for every
    /// empty cell.
    ///
    /// ```text
    /// ╔═══╤═══╤═══╦═══╤═══╤═══╦═══╤═══╤═══╗
    /// ║ 5 │ 3 │   ║   │ 7 │   ║   │   │   ║
    /// ╟───┼───┼───╫───┼───┼───╫───┼───┼───╢
    /// ║ 6 │   │   ║ 1 │ 9 │ 5 ║   │   │   ║
    /// ...
    /// ```
    pub fn pretty(&self) -> String {
        let mut result = String::new();
        let thin_separator_line = thin_separator_line();
        let thick_separator_line = thick_separator_line();

        for row in 0..9 {
            if row == 0 {
                result.push_str(top_row().as_str());
            }
            else if row % 3 == 0 {
                result.push_str(thick_separator_line.as_str());
            }
            else {
                result.push_str(thin_separator_line.as_str());
            }

            result.push_str(content_row(self, row).as_str());
        }

        result.push_str(bottom_row().as_str());
        result
    }

    /// Gets the content of the cell in the given row and column.
    ///
    /// # Arguments
    ///
    /// * `row`: The row of the desired cell. Must be in the range `[0, 8]`.
    /// * `col`: The column of the desired cell. Must be in the range
    /// `[0, 8]`.
    ///
    /// # Errors
    ///
    /// If either `row` or `col` are not in the specified range. In that
    /// case, `SudokuError::OutOfBounds` is returned.
    pub fn get_cell(&self, row: usize, col: usize)
            -> SudokuResult<Option<usize>> {
        let index = cell_index(row, col)?;
        Ok(self.cells[index])
    }

    /// Sets the content of the cell in the given row and column to the
    /// given digit. If the cell was not empty, the old digit is
    /// overwritten; if it already holds the given digit, nothing changes.
    /// The digit is *not* checked against the uniqueness rules, only
    /// against the value range.
    ///
    /// # Arguments
    ///
    /// * `row`: The row of the assigned cell. Must be in the range
    /// `[0, 8]`.
    /// * `col`: The column of the assigned cell. Must be in the range
    /// `[0, 8]`.
    /// * `value`: The digit to assign to the specified cell. Must be in the
    /// range `[1, 9]`.
    ///
    /// # Errors
    ///
    /// * `SudokuError::OutOfBounds` If either `row` or `col` are not in the
    /// specified range.
    /// * `SudokuError::InvalidNumber` If `value` is not in the specified
    /// range.
    pub fn set_cell(&mut self, row: usize, col: usize, value: usize)
            -> SudokuResult<()> {
        let index = cell_index(row, col)?;

        if value == 0 || value > 9 {
            return Err(SudokuError::InvalidNumber);
        }

        let old_value = self.cells[index];

        if old_value == Some(value) {
            return Ok(());
        }

        self.cells[index] = Some(value);
        self.value_map[value - 1].insert(index).unwrap();

        match old_value {
            None => {
                self.empty_cells -= 1;
                self.freedom.place(&self.cells, index, value);
            },
            Some(old_value) => {
                self.value_map[old_value - 1].remove(index).unwrap();
                self.freedom.update(&self.cells, index, Some(old_value),
                    Some(value));
            }
        }

        Ok(())
    }

    /// Clears the content of the cell in the given row and column, that is,
    /// if it contains a digit, that digit is removed. If the cell is
    /// already empty, it will be left that way.
    ///
    /// # Arguments
    ///
    /// * `row`: The row of the cleared cell. Must be in the range `[0, 8]`.
    /// * `col`: The column of the cleared cell. Must be in the range
    /// `[0, 8]`.
    ///
    /// # Errors
    ///
    /// If either `row` or `col` are not in the specified range. In that
    /// case, `SudokuError::OutOfBounds` is returned.
    pub fn erase_cell(&mut self, row: usize, col: usize) -> SudokuResult<()> {
        let index = cell_index(row, col)?;

        if let Some(old_value) = self.cells[index] {
            self.cells[index] = None;
            self.empty_cells += 1;
            self.value_map[old_value - 1].remove(index).unwrap();
            self.freedom.update(&self.cells, index, Some(old_value), None);
        }

        Ok(())
    }

    /// Gets the set of digits the cell in the given row and column could
    /// take without duplicating a digit that appears among its peers, that
    /// is, the cells sharing its row, column, or block. The set is derived
    /// from the current grid content and ignores whether the cell itself is
    /// assigned.
    ///
    /// # Errors
    ///
    /// If either `row` or `col` are not in the range `[0, 8]`. In that
    /// case, `SudokuError::OutOfBounds` is returned.
    pub fn freedom_set(&self, row: usize, col: usize)
            -> SudokuResult<DigitSet> {
        let index = cell_index(row, col)?;
        Ok(self.freedom.allowed(index))
    }

    /// Gets the set of empty cells that currently cannot take the given
    /// digit because it appears among their peers. This is the inverse view
    /// of [Puzzle::freedom_set], kept incrementally so solvers can branch
    /// on digit placements without scanning the grid.
    ///
    /// # Errors
    ///
    /// If `value` is not in the range `[1, 9]`. In that case,
    /// `SudokuError::InvalidNumber` is returned.
    pub fn sofa(&self, value: usize) -> SudokuResult<&CellSet> {
        if value == 0 || value > 9 {
            return Err(SudokuError::InvalidNumber);
        }

        Ok(self.freedom.sofa(value))
    }

    /// Gets the set of cells that currently hold the given digit.
    ///
    /// # Errors
    ///
    /// If `value` is not in the range `[1, 9]`. In that case,
    /// `SudokuError::InvalidNumber` is returned.
    pub fn cells_with(&self, value: usize) -> SudokuResult<&CellSet> {
        if value == 0 || value > 9 {
            return Err(SudokuError::InvalidNumber);
        }

        Ok(&self.value_map[value - 1])
    }

    /// Finds the empty cell with the fewest remaining candidate digits,
    /// scanning in row-major order and keeping the first cell that achieves
    /// the minimum. Returns `None` exactly if the puzzle is full; on an
    /// entirely empty puzzle this is the cell `(0, 0)`.
    pub fn least_free(&self) -> Option<(usize, usize)> {
        self.freedom.least_free(&self.cells).map(coordinates)
    }

    /// Gets the number of empty cells in this puzzle.
    pub fn empty_cells(&self) -> usize {
        self.empty_cells
    }

    /// Indicates whether this puzzle is full, i.e. every cell is filled
    /// with a digit.
    pub fn is_full(&self) -> bool {
        self.empty_cells == 0
    }

    /// Indicates whether this puzzle is empty, i.e. no cell is filled with
    /// a digit.
    pub fn is_empty(&self) -> bool {
        self.empty_cells == CELL_COUNT
    }

    /// Indicates whether this puzzle and the other one agree on every cell
    /// that is assigned in both. Cells that are empty in either puzzle are
    /// not compared, so two puzzles derived from the same solution agree
    /// regardless of which clues have been erased from each.
    pub fn agree(&self, other: &Puzzle) -> bool {
        self.cells.iter()
            .zip(other.cells.iter())
            .all(|(self_cell, other_cell)| {
                match (self_cell, other_cell) {
                    (Some(self_value), Some(other_value)) =>
                        self_value == other_value,
                    _ => true
                }
            })
    }

    /// Indicates whether every assigned cell's digit is allowed by the
    /// rest of the grid, that is, no digit appears twice in any row,
    /// column, or block. This is a guard against state corruption, not a
    /// solvability check: an empty puzzle passes trivially.
    pub fn sanity_check(&self) -> bool {
        (0..CELL_COUNT).all(|index| {
            match self.cells[index] {
                Some(value) => !self.freedom.forbidden(index).contains(value),
                None => true
            }
        })
    }

    /// Adopts every assigned cell of the other puzzle into this one,
    /// overwriting any digits already present at those positions. Cells
    /// that are empty in `other` are left untouched, so merging a puzzle
    /// with a solver's filled-cells-only solution recombines them into the
    /// complete grid.
    pub fn merge(&mut self, other: &Puzzle) {
        for index in 0..CELL_COUNT {
            if let Some(value) = other.cells[index] {
                let (row, col) = coordinates(index);
                self.set_cell(row, col, value).unwrap();
            }
        }
    }

    /// Converts the puzzle into its 81-byte row-major encoding, where 0
    /// denotes an empty cell and 1 to 9 denote digits. This is the wire
    /// form expected by the native backend.
    pub fn to_bytes(&self) -> [u8; CELL_COUNT] {
        let mut bytes = [0u8; CELL_COUNT];

        for (index, cell) in self.cells.iter().enumerate() {
            if let Some(value) = cell {
                bytes[index] = *value as u8;
            }
        }

        bytes
    }

    /// Creates a puzzle from its 81-byte row-major encoding, where 0
    /// denotes an empty cell and 1 to 9 denote digits. This is the inverse
    /// of [Puzzle::to_bytes].
    ///
    /// # Errors
    ///
    /// `SudokuError::InvalidNumber` if any byte is greater than 9.
    pub fn from_bytes(bytes: &[u8; CELL_COUNT]) -> SudokuResult<Puzzle> {
        let mut puzzle = Puzzle::new_empty();

        for (index, &byte) in bytes.iter().enumerate() {
            if byte != 0 {
                let (row, col) = coordinates(index);
                puzzle.set_cell(row, col, byte as usize)?;
            }
        }

        Ok(puzzle)
    }
}
