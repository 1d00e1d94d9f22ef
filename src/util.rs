//! This module contains utility functionality needed for this crate. Most
//! prominently, it contains the definitions of the [DigitSet] and [CellSet]
//! bitsets used for storing cell candidates and cell groups.

use crate::error::{SudokuError, SudokuResult};

use std::ops::{
    BitAnd,
    BitAndAssign,
    BitOr,
    BitOrAssign,
    Sub,
    SubAssign
};

/// The number of cells in the grid.
pub(crate) const CELL_COUNT: usize = 81;

/// Bits 1 to 9 of a [DigitSet], i.e. the full set of digits.
const ALL_DIGITS: u16 = 0b11_1111_1110;

/// All 81 bits of a [CellSet].
const ALL_CELLS: u128 = (1u128 << CELL_COUNT) - 1;

/// A set of digits in the range 1 to 9 that is implemented as a bit field.
/// Each digit is represented by the bit at its own value, which makes
/// iteration yield digits directly. This generally has better performance
/// than a hash set and is cheap to copy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DigitSet {
    bits: u16
}

/// An iterator over the digits contained in a [DigitSet], in ascending
/// order.
pub struct DigitSetIter {
    bits: u16
}

impl Iterator for DigitSetIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.bits == 0 {
            None
        }
        else {
            let digit = self.bits.trailing_zeros() as usize;
            self.bits &= self.bits - 1;
            Some(digit)
        }
    }
}

fn check_digit(digit: usize) -> SudokuResult<u16> {
    if digit < 1 || digit > 9 {
        Err(SudokuError::InvalidNumber)
    }
    else {
        Ok(1u16 << digit)
    }
}

impl DigitSet {

    /// Creates a new, empty `DigitSet`.
    pub fn new() -> DigitSet {
        DigitSet {
            bits: 0
        }
    }

    /// Creates a new `DigitSet` that contains all digits from 1 to 9.
    pub fn full() -> DigitSet {
        DigitSet {
            bits: ALL_DIGITS
        }
    }

    /// Creates a new `DigitSet` that contains only the given digit.
    ///
    /// # Errors
    ///
    /// If `digit` is less than 1 or greater than 9. In that case,
    /// `SudokuError::InvalidNumber` is returned.
    pub fn singleton(digit: usize) -> SudokuResult<DigitSet> {
        Ok(DigitSet {
            bits: check_digit(digit)?
        })
    }

    /// Indicates whether this set contains the given digit, in which case
    /// this method returns `true`. If it is not contained or out of range,
    /// `false` will be returned.
    pub fn contains(&self, digit: usize) -> bool {
        if let Ok(mask) = check_digit(digit) {
            self.bits & mask > 0
        }
        else {
            false
        }
    }

    /// Inserts the given digit into this set, such that [DigitSet::contains]
    /// returns `true` for it afterwards.
    ///
    /// This method returns `true` if the set has changed (i.e. the digit was
    /// not present before) and `false` otherwise.
    ///
    /// # Errors
    ///
    /// If `digit` is less than 1 or greater than 9. In that case,
    /// `SudokuError::InvalidNumber` is returned.
    pub fn insert(&mut self, digit: usize) -> SudokuResult<bool> {
        let mask = check_digit(digit)?;
        let changed = self.bits & mask == 0;
        self.bits |= mask;
        Ok(changed)
    }

    /// Removes the given digit from this set, such that [DigitSet::contains]
    /// returns `false` for it afterwards.
    ///
    /// This method returns `true` if the set has changed (i.e. the digit was
    /// present before) and `false` otherwise.
    ///
    /// # Errors
    ///
    /// If `digit` is less than 1 or greater than 9. In that case,
    /// `SudokuError::InvalidNumber` is returned.
    pub fn remove(&mut self, digit: usize) -> SudokuResult<bool> {
        let mask = check_digit(digit)?;
        let changed = self.bits & mask > 0;
        self.bits &= !mask;
        Ok(changed)
    }

    /// Returns the number of digits in this set.
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Indicates whether this set is empty.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Returns the set of all digits from 1 to 9 which are not contained in
    /// this set.
    pub fn complement(&self) -> DigitSet {
        DigitSet {
            bits: ALL_DIGITS & !self.bits
        }
    }

    /// Returns an iterator over the digits in this set in ascending order.
    pub fn iter(&self) -> DigitSetIter {
        DigitSetIter {
            bits: self.bits
        }
    }
}

impl BitAnd for DigitSet {
    type Output = DigitSet;

    fn bitand(self, rhs: DigitSet) -> DigitSet {
        DigitSet {
            bits: self.bits & rhs.bits
        }
    }
}

impl BitAndAssign for DigitSet {
    fn bitand_assign(&mut self, rhs: DigitSet) {
        self.bits &= rhs.bits;
    }
}

impl BitOr for DigitSet {
    type Output = DigitSet;

    fn bitor(self, rhs: DigitSet) -> DigitSet {
        DigitSet {
            bits: self.bits | rhs.bits
        }
    }
}

impl BitOrAssign for DigitSet {
    fn bitor_assign(&mut self, rhs: DigitSet) {
        self.bits |= rhs.bits;
    }
}

impl Sub for DigitSet {
    type Output = DigitSet;

    fn sub(self, rhs: DigitSet) -> DigitSet {
        DigitSet {
            bits: self.bits & !rhs.bits
        }
    }
}

impl SubAssign for DigitSet {
    fn sub_assign(&mut self, rhs: DigitSet) {
        self.bits &= !rhs.bits;
    }
}

/// A set of flat cell indices in the range 0 to 80 that is implemented as a
/// bit field, analogously to [DigitSet]. Regions, peer sets, and the SOFA
/// map are stored in this form.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CellSet {
    bits: u128
}

/// An iterator over the flat cell indices contained in a [CellSet], in
/// ascending order.
pub struct CellSetIter {
    bits: u128
}

impl Iterator for CellSetIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.bits == 0 {
            None
        }
        else {
            let index = self.bits.trailing_zeros() as usize;
            self.bits &= self.bits - 1;
            Some(index)
        }
    }
}

fn check_index(index: usize) -> SudokuResult<u128> {
    if index >= CELL_COUNT {
        Err(SudokuError::OutOfBounds)
    }
    else {
        Ok(1u128 << index)
    }
}

impl CellSet {

    /// Creates a new, empty `CellSet`.
    pub fn new() -> CellSet {
        CellSet {
            bits: 0
        }
    }

    /// Creates a new `CellSet` that contains all 81 cell indices.
    pub fn full() -> CellSet {
        CellSet {
            bits: ALL_CELLS
        }
    }

    /// Indicates whether this set contains the given flat cell index.
    pub fn contains(&self, index: usize) -> bool {
        if let Ok(mask) = check_index(index) {
            self.bits & mask > 0
        }
        else {
            false
        }
    }

    /// Inserts the given flat cell index into this set and returns whether
    /// the set has changed.
    ///
    /// # Errors
    ///
    /// If `index` is 81 or greater. In that case, `SudokuError::OutOfBounds`
    /// is returned.
    pub fn insert(&mut self, index: usize) -> SudokuResult<bool> {
        let mask = check_index(index)?;
        let changed = self.bits & mask == 0;
        self.bits |= mask;
        Ok(changed)
    }

    /// Removes the given flat cell index from this set and returns whether
    /// the set has changed.
    ///
    /// # Errors
    ///
    /// If `index` is 81 or greater. In that case, `SudokuError::OutOfBounds`
    /// is returned.
    pub fn remove(&mut self, index: usize) -> SudokuResult<bool> {
        let mask = check_index(index)?;
        let changed = self.bits & mask > 0;
        self.bits &= !mask;
        Ok(changed)
    }

    /// Returns the number of cell indices in this set.
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Indicates whether this set is empty.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Returns an iterator over the flat cell indices in this set in
    /// ascending order.
    pub fn iter(&self) -> CellSetIter {
        CellSetIter {
            bits: self.bits
        }
    }
}

impl BitAnd for CellSet {
    type Output = CellSet;

    fn bitand(self, rhs: CellSet) -> CellSet {
        CellSet {
            bits: self.bits & rhs.bits
        }
    }
}

impl BitAndAssign for CellSet {
    fn bitand_assign(&mut self, rhs: CellSet) {
        self.bits &= rhs.bits;
    }
}

impl BitOr for CellSet {
    type Output = CellSet;

    fn bitor(self, rhs: CellSet) -> CellSet {
        CellSet {
            bits: self.bits | rhs.bits
        }
    }
}

impl BitOrAssign for CellSet {
    fn bitor_assign(&mut self, rhs: CellSet) {
        self.bits |= rhs.bits;
    }
}

impl Sub for CellSet {
    type Output = CellSet;

    fn sub(self, rhs: CellSet) -> CellSet {
        CellSet {
            bits: self.bits & !rhs.bits
        }
    }
}

impl SubAssign for CellSet {
    fn sub_assign(&mut self, rhs: CellSet) {
        self.bits &= !rhs.bits;
    }
}
