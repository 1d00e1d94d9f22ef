//! This module contains the error and result definitions used in this crate.

/// Miscellaneous errors that can occur on some methods in the
/// [root module](../index.html). This does not include errors that occur when
/// parsing a puzzle, see [PuzzleParseError](enum.PuzzleParseError.html) for
/// that.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SudokuError {

    /// Indicates that some number is invalid as a cell value. This is the
    /// case if it is less than 1 or greater than 9.
    InvalidNumber,

    /// Indicates that the specified coordinates (row and column) lie outside
    /// the grid, that is, at least one of them is greater than 8. Also raised
    /// for flat cell indices of 81 or more.
    OutOfBounds,

    /// Indicates that a long-running search was stopped by its
    /// [Interrupt](../solver/struct.Interrupt.html) handle before it could
    /// finish. The input puzzle is unchanged when this is raised.
    Interrupted
}

/// Syntactic sugar for `Result<V, SudokuError>`.
pub type SudokuResult<V> = Result<V, SudokuError>;

impl std::fmt::Display for SudokuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            SudokuError::InvalidNumber => "number is outside the range 1 to 9",
            SudokuError::OutOfBounds => "cell coordinates are outside the grid",
            SudokuError::Interrupted => "the operation was interrupted"
        };
        write!(f, "{}", message)
    }
}

/// An enumeration of the errors that may occur when parsing a
/// [Puzzle](../struct.Puzzle.html) from its 9-line text code.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PuzzleParseError {

    /// Indicates that the code does not consist of exactly 9 non-blank
    /// lines.
    WrongNumberOfLines,

    /// Indicates that some line does not consist of exactly 9 characters
    /// after surrounding whitespace has been removed.
    WrongLineLength,

    /// Indicates that some cell is written as a character other than `'0'`
    /// (empty) or the digits `'1'` to `'9'`.
    InvalidCharacter
}

/// Syntactic sugar for `Result<V, PuzzleParseError>`.
pub type PuzzleParseResult<V> = Result<V, PuzzleParseError>;

// TryFrom-based serde deserialization needs the parse error to display
// itself in the generated error message.
impl std::fmt::Display for PuzzleParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            PuzzleParseError::WrongNumberOfLines =>
                "wrong number of lines in puzzle code",
            PuzzleParseError::WrongLineLength =>
                "wrong line length in puzzle code",
            PuzzleParseError::InvalidCharacter =>
                "invalid character in puzzle code"
        };
        write!(f, "{}", message)
    }
}

/// An enumeration of the errors that an [Oracle](../oracle/trait.Oracle.html)
/// implementation may raise. The embedded backtracking oracle never fails,
/// but the trait allows backends which can become unavailable.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OracleError {

    /// Indicates that the oracle backend could not be reached or has shut
    /// down.
    Unavailable,

    /// Indicates that the oracle gave up on a query before completing it.
    Timeout
}

/// Syntactic sugar for `Result<V, OracleError>`.
pub type OracleResult<V> = Result<V, OracleError>;

/// An enumeration of the errors that can occur while computing
/// justifications, hints, or the core-based difficulty metric in the
/// [explain](../explain/index.html) module.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExplainError {

    /// Indicates that the puzzle has no solution at all, so there is nothing
    /// to justify.
    NoSolution,

    /// Indicates that the puzzle has more than one solution. Justifications
    /// are only defined for cells whose value is forced, which requires a
    /// unique solution.
    NoUniqueSolution,

    /// Indicates that the request addressed nothing explainable: a hint on
    /// a puzzle without empty cells, or an erasability probe on a cell that
    /// holds no clue.
    NothingToExplain,

    /// Indicates that the underlying oracle failed. This is distinct from
    /// [ExplainError::NoUniqueSolution]: the puzzle may well be fine.
    Oracle(OracleError)
}

/// Syntactic sugar for `Result<V, ExplainError>`.
pub type ExplainResult<V> = Result<V, ExplainError>;

impl From<OracleError> for ExplainError {
    fn from(e: OracleError) -> Self {
        ExplainError::Oracle(e)
    }
}
