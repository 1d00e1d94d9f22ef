//! This module defines the fixed geometry of the grid: the 27 uniqueness
//! regions (rows, columns, and 3x3 blocks) and the peer set of every cell.
//!
//! The geometry never changes, so it is computed once per process on first
//! use and shared immutably afterwards through [regions]. Regions carry no
//! per-puzzle state; they are addressed either by cell coordinates through
//! the [RegionIndex] lookups or by their [RegionId] label, which is also the
//! form in which the [oracle](crate::oracle) reports unsatisfiable cores.

use crate::error::{SudokuError, SudokuResult};
use crate::util::{CELL_COUNT, CellSet};

use serde::{Deserialize, Serialize};

use std::convert::TryFrom;
use std::fmt::{self, Display, Formatter};
use std::sync::OnceLock;

/// The number of labeled uniqueness regions: 9 rows, 9 columns, 9 blocks.
pub const REGION_COUNT: usize = 27;

/// Computes the flat index of the cell at the given coordinates.
///
/// # Errors
///
/// If `row` or `col` is greater than 8. In that case,
/// `SudokuError::OutOfBounds` is returned.
pub(crate) fn cell_index(row: usize, col: usize) -> SudokuResult<usize> {
    if row >= 9 || col >= 9 {
        Err(SudokuError::OutOfBounds)
    }
    else {
        Ok(row * 9 + col)
    }
}

/// Computes the coordinates of the cell with the given flat index.
pub(crate) fn coordinates(index: usize) -> (usize, usize) {
    (index / 9, index % 9)
}

/// The label of one of the 27 uniqueness regions. Labels are ordered rows
/// first (indices 0 to 8), then columns (9 to 17), then blocks in row-major
/// block order (18 to 26). This is also the order in which
/// [RegionId::all] yields them and in which cores are reported.
///
/// The `Display` implementation names the region the way a player would:
/// `Row 4`, `Column 7`, or `Top-left block`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(into = "usize", try_from = "usize")]
pub struct RegionId(usize);

impl RegionId {

    /// Returns the label of the row with the given index (0 to 8).
    ///
    /// # Errors
    ///
    /// If `index` is greater than 8. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn row(index: usize) -> SudokuResult<RegionId> {
        if index >= 9 {
            Err(SudokuError::OutOfBounds)
        }
        else {
            Ok(RegionId(index))
        }
    }

    /// Returns the label of the column with the given index (0 to 8).
    ///
    /// # Errors
    ///
    /// If `index` is greater than 8. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn column(index: usize) -> SudokuResult<RegionId> {
        if index >= 9 {
            Err(SudokuError::OutOfBounds)
        }
        else {
            Ok(RegionId(9 + index))
        }
    }

    /// Returns the label of the block with the given row-major block index
    /// (0 to 8, so the top-left block is 0 and the bottom-right block is 8).
    ///
    /// # Errors
    ///
    /// If `index` is greater than 8. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn block(index: usize) -> SudokuResult<RegionId> {
        if index >= 9 {
            Err(SudokuError::OutOfBounds)
        }
        else {
            Ok(RegionId(18 + index))
        }
    }

    /// Returns an iterator over all 27 region labels in their canonical
    /// order (rows, then columns, then blocks).
    pub fn all() -> impl Iterator<Item = RegionId> {
        (0..REGION_COUNT).map(RegionId)
    }

    /// Returns the set of the 9 cells that make up this region.
    pub fn cells(self) -> &'static CellSet {
        regions().region(self)
    }

    pub(crate) fn as_index(self) -> usize {
        self.0
    }
}

impl From<RegionId> for usize {
    fn from(id: RegionId) -> usize {
        id.0
    }
}

impl TryFrom<usize> for RegionId {
    type Error = SudokuError;

    fn try_from(index: usize) -> Result<RegionId, SudokuError> {
        if index >= REGION_COUNT {
            Err(SudokuError::OutOfBounds)
        }
        else {
            Ok(RegionId(index))
        }
    }
}

impl Display for RegionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            0..=8 => write!(f, "Row {}", self.0 + 1),
            9..=17 => write!(f, "Column {}", self.0 - 9 + 1),
            _ => {
                let block = self.0 - 18;
                let vertical = ["Top", "Middle", "Bottom"][block / 3];
                let horizontal = ["left", "center", "right"][block % 3];
                write!(f, "{}-{} block", vertical, horizontal)
            }
        }
    }
}

/// The precomputed, immutable lookup table for the grid geometry: the cell
/// sets of all rows, columns, and blocks, and the peer set of every cell. A
/// cell's peers are the 20 other cells that share a row, column, or block
/// with it.
pub struct RegionIndex {
    rows: [CellSet; 9],
    columns: [CellSet; 9],
    blocks: [CellSet; 9],
    peers: [CellSet; CELL_COUNT]
}

impl RegionIndex {
    fn build() -> RegionIndex {
        let mut rows = [CellSet::new(); 9];
        let mut columns = [CellSet::new(); 9];
        let mut blocks = [CellSet::new(); 9];

        for row in 0..9 {
            for col in 0..9 {
                let index = row * 9 + col;
                let block = (row / 3) * 3 + col / 3;
                rows[row].insert(index).unwrap();
                columns[col].insert(index).unwrap();
                blocks[block].insert(index).unwrap();
            }
        }

        let mut peers = [CellSet::new(); CELL_COUNT];

        for row in 0..9 {
            for col in 0..9 {
                let index = row * 9 + col;
                let block = (row / 3) * 3 + col / 3;
                let mut cell_peers = rows[row] | columns[col] | blocks[block];
                cell_peers.remove(index).unwrap();
                peers[index] = cell_peers;
            }
        }

        RegionIndex {
            rows,
            columns,
            blocks,
            peers
        }
    }

    /// Returns the set of the 9 cells in the row containing the given cell.
    ///
    /// # Errors
    ///
    /// If `row` or `col` is greater than 8. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn row(&self, row: usize, col: usize) -> SudokuResult<&CellSet> {
        cell_index(row, col)?;
        Ok(&self.rows[row])
    }

    /// Returns the set of the 9 cells in the column containing the given
    /// cell.
    ///
    /// # Errors
    ///
    /// If `row` or `col` is greater than 8. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn column(&self, row: usize, col: usize) -> SudokuResult<&CellSet> {
        cell_index(row, col)?;
        Ok(&self.columns[col])
    }

    /// Returns the set of the 9 cells in the block containing the given
    /// cell.
    ///
    /// # Errors
    ///
    /// If `row` or `col` is greater than 8. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn block(&self, row: usize, col: usize) -> SudokuResult<&CellSet> {
        cell_index(row, col)?;
        Ok(&self.blocks[(row / 3) * 3 + col / 3])
    }

    /// Returns the set of the 20 peers of the given cell, that is, all other
    /// cells sharing a row, column, or block with it.
    ///
    /// # Errors
    ///
    /// If `row` or `col` is greater than 8. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn peers(&self, row: usize, col: usize) -> SudokuResult<&CellSet> {
        let index = cell_index(row, col)?;
        Ok(&self.peers[index])
    }

    pub(crate) fn peers_of_index(&self, index: usize) -> &CellSet {
        &self.peers[index]
    }

    pub(crate) fn region(&self, id: RegionId) -> &CellSet {
        match id.0 {
            0..=8 => &self.rows[id.0],
            9..=17 => &self.columns[id.0 - 9],
            _ => &self.blocks[id.0 - 18]
        }
    }
}

static REGIONS: OnceLock<RegionIndex> = OnceLock::new();

/// Returns the process-wide [RegionIndex], computing it on first use.
pub fn regions() -> &'static RegionIndex {
    REGIONS.get_or_init(RegionIndex::build)
}
