//! This module contains the incremental freedom analysis that a
//! [Puzzle](crate::Puzzle) keeps in lockstep with its grid.
//!
//! For every cell the engine tracks the set of values that currently appear
//! among its peers, that is, the values the cell cannot take. The complement
//! of that set is the cell's allowed set. In addition, an inverse map (the
//! SOFA map) records for every value the empty cells that cannot take it,
//! which supports set-oriented branching in the solver without scanning the
//! whole grid.

use crate::regions::{coordinates, regions};
use crate::util::{CELL_COUNT, CellSet, DigitSet};

/// The incremental forbidden-value tracker owned by a `Puzzle`. All methods
/// expect the grid to have been updated already; the grid passed in is the
/// state after the mutation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Freedom {
    forbidden: [DigitSet; CELL_COUNT],
    sofa: [CellSet; 9]
}

fn forbidden_by_scan(cells: &[Option<usize>; CELL_COUNT], index: usize)
        -> DigitSet {
    let mut result = DigitSet::new();

    for peer in regions().peers_of_index(index).iter() {
        if let Some(value) = cells[peer] {
            result.insert(value).unwrap();
        }
    }

    result
}

impl Freedom {
    pub(crate) fn new() -> Freedom {
        Freedom {
            forbidden: [DigitSet::new(); CELL_COUNT],
            sofa: [CellSet::new(); 9]
        }
    }

    /// The set of values that appear among the peers of the given cell.
    pub(crate) fn forbidden(&self, index: usize) -> &DigitSet {
        &self.forbidden[index]
    }

    /// The set of values the given cell could legally take right now.
    pub(crate) fn allowed(&self, index: usize) -> DigitSet {
        self.forbidden[index].complement()
    }

    /// The set of empty cells that currently cannot take the given value.
    pub(crate) fn sofa(&self, value: usize) -> &CellSet {
        &self.sofa[value - 1]
    }

    /// Reconciles the sofa membership of a single cell for a single value
    /// with the invariant: a cell is in `sofa[value]` exactly if it is empty
    /// and forbids the value.
    fn reconcile_sofa(&mut self, cells: &[Option<usize>; CELL_COUNT],
            index: usize, value: usize) {
        if cells[index].is_none() && self.forbidden[index].contains(value) {
            self.sofa[value - 1].insert(index).unwrap();
        }
        else {
            self.sofa[value - 1].remove(index).unwrap();
        }
    }

    /// Records the transition of a previously empty cell to `value`. Only
    /// additions are necessary in this case: every peer's forbidden set
    /// gains `value`, empty peers enter `sofa[value]`, and the cell itself
    /// leaves every sofa bucket since it is no longer empty.
    pub(crate) fn place(&mut self, cells: &[Option<usize>; CELL_COUNT],
            index: usize, value: usize) {
        let (row, col) = coordinates(index);
        let peers = *regions().peers(row, col).unwrap();

        for peer in peers.iter() {
            self.forbidden[peer].insert(value).unwrap();

            if cells[peer].is_none() {
                self.sofa[value - 1].insert(peer).unwrap();
            }
        }

        for bucket in self.sofa.iter_mut() {
            bucket.remove(index).unwrap();
        }
    }

    /// Records a general transition of the given cell from `old_value` to
    /// `new_value`, where either side may be empty. The forbidden sets of
    /// all peers are recomputed from the grid; sofa buckets can only change
    /// for the two values involved, restricted to the peers, plus every
    /// bucket for the mutated cell itself (whose emptiness changed).
    pub(crate) fn update(&mut self, cells: &[Option<usize>; CELL_COUNT],
            index: usize, old_value: Option<usize>,
            new_value: Option<usize>) {
        let (row, col) = coordinates(index);
        let peers = *regions().peers(row, col).unwrap();

        for peer in peers.iter() {
            self.forbidden[peer] = forbidden_by_scan(cells, peer);
        }

        for &value in [old_value, new_value].iter() {
            if let Some(value) = value {
                for peer in peers.iter() {
                    self.reconcile_sofa(cells, peer, value);
                }
            }
        }

        if cells[index].is_some() {
            for bucket in self.sofa.iter_mut() {
                bucket.remove(index).unwrap();
            }
        }
        else {
            for value in 1..=9 {
                self.reconcile_sofa(cells, index, value);
            }
        }
    }

    /// Finds the empty cell with the smallest allowed set, scanning in
    /// row-major order and keeping the first cell that achieves the
    /// minimum (later cells replace the candidate only with a strictly
    /// larger forbidden set). Returns `None` exactly if the grid is full;
    /// on an entirely empty grid this is cell 0.
    pub(crate) fn least_free(&self, cells: &[Option<usize>; CELL_COUNT])
            -> Option<usize> {
        let mut best = None;
        let mut best_forbidden = 0;

        for index in 0..CELL_COUNT {
            if cells[index].is_some() {
                continue;
            }

            let forbidden = self.forbidden[index].len();

            if best.is_none() || forbidden > best_forbidden {
                best = Some(index);
                best_forbidden = forbidden;
            }
        }

        best
    }
}
