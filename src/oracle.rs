//! This module contains the declarative oracle used by the explanation
//! engine.
//!
//! An [Oracle] answers satisfiability questions about point facts over the
//! grid under a caller-chosen subset of the 27 uniqueness rules, and
//! reports which rules were responsible when the facts cannot be
//! satisfied. The embedded [BacktrackingOracle] answers them by exhaustive
//! search. The trait exists so that an external solver process can act as
//! a drop-in replacement.

use crate::error::{OracleResult, SudokuResult};
use crate::regions::{cell_index, RegionId};
use crate::util::{CELL_COUNT, CellSet, DigitSet};

/// A point fact about a single cell of the grid. Rows and columns are
/// indexed 0 to 8 and values range from 1 to 9.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Formula {

    /// States that the cell at the wrapped row and column holds the
    /// wrapped value.
    Equals(usize, usize, usize),

    /// States that the cell at the wrapped row and column does not hold
    /// the wrapped value.
    NotEquals(usize, usize, usize)
}

/// One total assignment of digits to all 81 cells that satisfies the facts
/// and rules of a successful [Oracle::check] call. Cells outside every
/// active rule are assigned an arbitrary digit consistent with the facts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Model {
    values: [usize; CELL_COUNT]
}

impl Model {

    /// Returns the digit this model assigns to the given cell.
    ///
    /// # Errors
    ///
    /// If `row` or `col` is greater than 8. In that case,
    /// `SudokuError::OutOfBounds` is returned.
    pub fn get(&self, row: usize, col: usize) -> SudokuResult<usize> {
        Ok(self.values[cell_index(row, col)?])
    }
}

/// The verdict of an [Oracle::check] call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {

    /// The asserted facts can be satisfied under the active rules. The
    /// wrapped [Model] is one witnessing assignment.
    Satisfiable(Model),

    /// The asserted facts cannot be satisfied under the active rules. The
    /// wrapped regions are the active rules that took part in refuting the
    /// facts, in the order in which they were activated. The core is empty
    /// if the facts already contradict each other without any rule.
    Unsatisfiable(Vec<RegionId>)
}

/// A trait for solvers that decide the satisfiability of asserted point
/// facts under a subset of the uniqueness rules. Facts live in frames:
/// [Oracle::push] opens a frame and [Oracle::pop] discards the most recent
/// one with everything asserted in it, which makes speculative probes
/// cheap.
pub trait Oracle {

    /// Opens a new fact frame.
    fn push(&mut self);

    /// Discards the most recently pushed frame together with all facts
    /// asserted in it.
    fn pop(&mut self);

    /// Asserts the given fact in the current frame.
    fn assert(&mut self, formula: Formula);

    /// Decides whether the asserted facts are satisfiable under exactly
    /// the given uniqueness rules. All other rules are suspended, so cells
    /// outside the given regions only have to respect the facts.
    ///
    /// # Errors
    ///
    /// `OracleError` if the backing implementation cannot deliver a
    /// verdict. The embedded [BacktrackingOracle] always delivers one.
    fn check(&mut self, rules: &[RegionId]) -> OracleResult<Outcome>;
}

struct CoreSearch {
    rules: Vec<RegionId>,
    participated: Vec<bool>,
    candidates: [DigitSet; CELL_COUNT],
    assignment: [usize; CELL_COUNT]
}

impl CoreSearch {

    /// Decides whether assigning `value` to the cell at `index` violates
    /// an active rule, marking every rule that forbids it.
    fn blocked(&mut self, index: usize, value: usize) -> bool {
        let mut blocked = false;

        for position in 0..self.rules.len() {
            let region = self.rules[position].cells();

            if !region.contains(index) {
                continue;
            }

            let conflict = region.iter()
                .any(|peer| peer != index && self.assignment[peer] == value);

            if conflict {
                self.participated[position] = true;
                blocked = true;
            }
        }

        blocked
    }

    fn search(&mut self, cells: &[usize], position: usize) -> bool {
        if position == cells.len() {
            return true;
        }

        let index = cells[position];

        for value in self.candidates[index].iter() {
            if self.blocked(index, value) {
                continue;
            }

            self.assignment[index] = value;

            if self.search(cells, position + 1) {
                return true;
            }
        }

        self.assignment[index] = 0;
        false
    }
}

/// An embedded [Oracle] that decides satisfiability by exhaustive search.
///
/// The search only branches over cells covered by an active rule; all
/// other cells merely have to be consistent with the facts. Whenever a
/// rule eliminates a candidate digit during the search, it is marked, and
/// an exhausted search reports the marked rules as the unsatisfiable core.
/// A rule that never eliminated anything cannot have influenced the
/// search, so the core is sound, though not necessarily minimal.
pub struct BacktrackingOracle {
    frames: Vec<Vec<Formula>>
}

impl BacktrackingOracle {

    /// Creates a new oracle with no asserted facts and a single base
    /// frame.
    pub fn new() -> BacktrackingOracle {
        BacktrackingOracle {
            frames: vec![Vec::new()]
        }
    }

    /// Intersects the candidate sets derived from all asserted facts.
    /// Facts must address cells on the grid and digits from 1 to 9.
    fn candidates(&self) -> [DigitSet; CELL_COUNT] {
        let mut candidates = [DigitSet::full(); CELL_COUNT];

        for formula in self.frames.iter().flatten() {
            match *formula {
                Formula::Equals(row, col, value) => {
                    let index = cell_index(row, col).unwrap();
                    candidates[index] = candidates[index]
                        & DigitSet::singleton(value).unwrap();
                },
                Formula::NotEquals(row, col, value) => {
                    let index = cell_index(row, col).unwrap();
                    candidates[index].remove(value).unwrap();
                }
            }
        }

        candidates
    }
}

impl Oracle for BacktrackingOracle {

    fn push(&mut self) {
        self.frames.push(Vec::new());
    }

    fn pop(&mut self) {
        if self.frames.len() == 1 {
            panic!("No open frame to pop.");
        }

        self.frames.pop();
    }

    fn assert(&mut self, formula: Formula) {
        self.frames.last_mut().unwrap().push(formula);
    }

    fn check(&mut self, rules: &[RegionId]) -> OracleResult<Outcome> {
        let candidates = self.candidates();

        if candidates.iter().any(|candidates| candidates.is_empty()) {
            // the facts alone are contradictory, no rule took part
            return Ok(Outcome::Unsatisfiable(Vec::new()));
        }

        let mut active = CellSet::new();

        for rule in rules {
            active |= *rule.cells();
        }

        let cells: Vec<usize> = active.iter().collect();
        let mut core_search = CoreSearch {
            rules: rules.to_vec(),
            participated: vec![false; rules.len()],
            candidates,
            assignment: [0; CELL_COUNT]
        };

        if core_search.search(&cells, 0) {
            let mut values = [0; CELL_COUNT];

            for (index, value) in values.iter_mut().enumerate() {
                *value =
                    if active.contains(index) {
                        core_search.assignment[index]
                    }
                    else {
                        candidates[index].iter().next().unwrap()
                    };
            }

            Ok(Outcome::Satisfiable(Model {
                values
            }))
        }
        else {
            let core = core_search.rules.iter()
                .zip(core_search.participated.iter())
                .filter(|(_, &participated)| participated)
                .map(|(&rule, _)| rule)
                .collect();

            Ok(Outcome::Unsatisfiable(core))
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn all_rules() -> Vec<RegionId> {
        RegionId::all().collect()
    }

    fn check_all(oracle: &mut BacktrackingOracle) -> Outcome {
        let rules = all_rules();
        oracle.check(&rules).unwrap()
    }

    #[test]
    fn satisfiable_facts_produce_a_model() {
        let mut oracle = BacktrackingOracle::new();
        oracle.assert(Formula::Equals(0, 0, 5));

        if let Outcome::Satisfiable(model) = check_all(&mut oracle) {
            assert_eq!(5, model.get(0, 0).unwrap());

            let mut seen = DigitSet::new();

            for col in 0..9 {
                let value = model.get(0, col).unwrap();

                assert!(seen.insert(value).unwrap(),
                    "Model repeats a digit in an active row.");
            }
        }
        else {
            panic!("Satisfiable facts reported unsatisfiable.");
        }
    }

    #[test]
    fn contradictory_facts_yield_an_empty_core() {
        let mut oracle = BacktrackingOracle::new();
        oracle.assert(Formula::Equals(0, 0, 5));
        oracle.assert(Formula::NotEquals(0, 0, 5));

        assert_eq!(Outcome::Unsatisfiable(Vec::new()),
            oracle.check(&[]).unwrap());
    }

    #[test]
    fn conflicting_equalities_yield_an_empty_core() {
        let mut oracle = BacktrackingOracle::new();
        oracle.assert(Formula::Equals(4, 4, 1));
        oracle.assert(Formula::Equals(4, 4, 2));

        assert_eq!(Outcome::Unsatisfiable(Vec::new()),
            check_all(&mut oracle));
    }

    #[test]
    fn active_row_rule_refutes_a_duplicate() {
        let mut oracle = BacktrackingOracle::new();
        oracle.assert(Formula::Equals(0, 0, 5));
        oracle.assert(Formula::Equals(0, 8, 5));

        let row = RegionId::row(0).unwrap();

        if let Outcome::Unsatisfiable(core) = oracle.check(&[row]).unwrap() {
            assert_eq!(vec![row], core);
        }
        else {
            panic!("Duplicate in an active row reported satisfiable.");
        }
    }

    #[test]
    fn core_contains_the_violated_rule() {
        let mut oracle = BacktrackingOracle::new();
        oracle.assert(Formula::Equals(0, 0, 5));
        oracle.assert(Formula::Equals(0, 8, 5));

        if let Outcome::Unsatisfiable(core) = check_all(&mut oracle) {
            assert!(core.contains(&RegionId::row(0).unwrap()),
                "Core misses the rule the facts violate.");
        }
        else {
            panic!("Duplicate in an active row reported satisfiable.");
        }
    }

    #[test]
    fn suspended_rules_leave_cells_unconstrained() {
        let mut oracle = BacktrackingOracle::new();
        oracle.assert(Formula::Equals(0, 0, 5));
        oracle.assert(Formula::Equals(0, 8, 5));

        let rules = [RegionId::column(0).unwrap()];

        if let Outcome::Satisfiable(model) = oracle.check(&rules).unwrap() {
            assert_eq!(5, model.get(0, 0).unwrap());
            assert_eq!(5, model.get(0, 8).unwrap());
        }
        else {
            panic!("Duplicate in a suspended row reported unsatisfiable.");
        }
    }

    #[test]
    fn popping_a_frame_withdraws_its_facts() {
        let mut oracle = BacktrackingOracle::new();
        oracle.assert(Formula::Equals(0, 0, 5));
        oracle.push();
        oracle.assert(Formula::NotEquals(0, 0, 5));

        assert_eq!(Outcome::Unsatisfiable(Vec::new()),
            oracle.check(&[]).unwrap());

        oracle.pop();

        if let Outcome::Satisfiable(model) = oracle.check(&[]).unwrap() {
            assert_eq!(5, model.get(0, 0).unwrap());
        }
        else {
            panic!("Base frame fact lost after pop.");
        }
    }

    #[test]
    #[should_panic]
    fn popping_the_base_frame_panics() {
        BacktrackingOracle::new().pop();
    }

    #[test]
    fn model_is_total_and_in_range() {
        let mut oracle = BacktrackingOracle::new();
        oracle.assert(Formula::NotEquals(8, 8, 9));

        let rules = [RegionId::block(8).unwrap()];

        if let Outcome::Satisfiable(model) = oracle.check(&rules).unwrap() {
            for row in 0..9 {
                for col in 0..9 {
                    let value = model.get(row, col).unwrap();

                    assert!(value >= 1 && value <= 9,
                        "Model value out of range.");
                }
            }

            assert_ne!(9, model.get(8, 8).unwrap());
        }
        else {
            panic!("Single exclusion reported unsatisfiable.");
        }
    }
}
