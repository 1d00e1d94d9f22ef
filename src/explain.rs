//! This module contains the explanation engine, which tells a player *why*
//! a cell must hold its value.
//!
//! For every empty cell of a uniquely solvable puzzle, an [Explainer]
//! computes a [Justification]: an inclusion-minimal subset of the 27
//! uniqueness rules which, together with the visible clues, forces the
//! cell's value. The smallest justification makes a good hint, and the
//! sizes of all justifications combine into a difficulty metric that
//! reflects how much of the rule set a player has to juggle. All reasoning
//! is delegated to an [Oracle].

use crate::Puzzle;
use crate::engine::Options;
use crate::error::{ExplainError, ExplainResult};
use crate::oracle::{BacktrackingOracle, Formula, Oracle, Outcome};
use crate::regions::RegionId;

use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

fn all_rules() -> Vec<RegionId> {
    RegionId::all().collect()
}

/// The reason why one cell must hold one value: a set of uniqueness rules
/// which, together with the visible clues, admits no other digit for the
/// cell. Justifications produced by [Explainer::justify] and
/// [Explainer::hint] are inclusion-minimal, so every listed rule is
/// necessary for the argument.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Justification {

    /// The row of the justified cell.
    pub row: usize,

    /// The column of the justified cell.
    pub col: usize,

    /// The digit the justified cell must hold.
    pub value: usize,

    /// The rules that force the value, in the canonical region order.
    pub rules: Vec<RegionId>
}

impl Justification {

    /// Renders this justification for a player, one numbered line per
    /// rule, such as `Rule 1: Row 4 cannot contain duplicates`.
    pub fn explain(&self) -> String {
        let lines: Vec<String> = self.rules.iter()
            .enumerate()
            .map(|(position, rule)|
                format!("Rule {}: {} cannot contain duplicates",
                    position + 1, rule))
            .collect();

        lines.join("\n")
    }
}

/// The minimized justifications of a puzzle, bucketed by the number of
/// rules each one needs. Within a bucket, justifications keep the order in
/// which the cells were scanned.
#[derive(Clone, Debug, PartialEq)]
pub struct Cores {
    by_size: BTreeMap<usize, Vec<Justification>>
}

impl Cores {

    /// Creates a new, empty collection.
    pub fn new() -> Cores {
        Cores {
            by_size: BTreeMap::new()
        }
    }

    /// Adds the given justification to the bucket for its rule count.
    pub fn add(&mut self, justification: Justification) {
        self.by_size.entry(justification.rules.len())
            .or_insert_with(Vec::new)
            .push(justification);
    }

    /// Returns an iterator over all justifications, ascending by rule
    /// count.
    pub fn iter(&self) -> impl Iterator<Item = &Justification> {
        self.by_size.values().flatten()
    }

    /// Returns the `count` justifications with the fewest rules.
    pub fn least(&self, count: usize) -> Vec<&Justification> {
        self.iter().take(count).collect()
    }

    /// Returns the justification with the fewest rules, if there is any.
    /// Ties are broken by cell scan order.
    pub fn hint(&self) -> Option<&Justification> {
        self.iter().next()
    }

    /// Returns the number of collected justifications.
    pub fn len(&self) -> usize {
        self.by_size.values().map(Vec::len).sum()
    }

    /// Indicates whether this collection holds no justifications.
    pub fn is_empty(&self) -> bool {
        self.by_size.is_empty()
    }

    /// Computes the difficulty metric of this collection: every
    /// justification contributes two times its rule count divided by the
    /// total rule count of 27, and the sum is truncated to an integer.
    /// Larger justifications therefore weigh in superlinearly while
    /// ordinary puzzles stay on a scale of roughly 0 to 100.
    pub fn metric(&self) -> usize {
        let mut metric = 0.0;

        for (&size, bucket) in &self.by_size {
            metric += 2.0 * size as f64 / 27.0 * bucket.len() as f64;
        }

        metric as usize
    }
}

/// Computes [Justification]s for the empty cells of a puzzle through an
/// [Oracle].
///
/// The puzzle's clues are asserted as point facts in an outer oracle
/// frame. Each probe then pushes an inner frame with the hypothesis that
/// its cell does *not* hold the solution value and asks which uniqueness
/// rules refute it. The returned unsatisfiable core is minimized by
/// dropping one rule at a time and re-checking.
pub struct Explainer<O: Oracle> {
    oracle: O,
    hint_cutoff: usize
}

impl Explainer<BacktrackingOracle> {

    /// Creates a new explainer over the embedded [BacktrackingOracle] with
    /// the default hint cutoff.
    pub fn new_default() -> Explainer<BacktrackingOracle> {
        Explainer::new(BacktrackingOracle::new())
    }
}

impl<O: Oracle> Explainer<O> {

    /// Creates a new explainer over the given oracle with the default hint
    /// cutoff.
    pub fn new(oracle: O) -> Explainer<O> {
        Explainer::new_configured(oracle, Options::default().hint_cutoff)
    }

    /// Creates a new explainer over the given oracle.
    ///
    /// # Arguments
    ///
    /// * `oracle`: The [Oracle] that answers all satisfiability queries.
    /// * `hint_cutoff`: The number of smallest raw cores
    /// [Explainer::hint] minimizes before choosing the best one.
    pub fn new_configured(oracle: O, hint_cutoff: usize) -> Explainer<O> {
        Explainer {
            oracle,
            hint_cutoff
        }
    }

    fn assert_diagram(&mut self, puzzle: &Puzzle,
            skip: Option<(usize, usize)>) {
        for row in 0..9 {
            for col in 0..9 {
                if skip == Some((row, col)) {
                    continue;
                }

                if let Some(value) = puzzle.get_cell(row, col).unwrap() {
                    self.oracle.assert(Formula::Equals(row, col, value));
                }
            }
        }
    }

    /// Solves the given puzzle through the oracle. Like
    /// [Solution::Unique](crate::solver::Solution::Unique), the returned
    /// puzzle holds only the digits for the previously empty cells. If the
    /// puzzle has several solutions, an arbitrary one is returned.
    ///
    /// # Errors
    ///
    /// * `ExplainError::NoSolution` if the puzzle cannot be completed.
    /// * `ExplainError::Oracle` if the oracle fails.
    pub fn solve_via_oracle(&mut self, puzzle: &Puzzle)
            -> ExplainResult<Puzzle> {
        let rules = all_rules();

        self.oracle.push();
        self.assert_diagram(puzzle, None);
        let outcome = self.oracle.check(&rules);
        self.oracle.pop();

        match outcome? {
            Outcome::Satisfiable(model) => {
                let mut filled = Puzzle::new_empty();

                for row in 0..9 {
                    for col in 0..9 {
                        if puzzle.get_cell(row, col).unwrap().is_none() {
                            let value = model.get(row, col).unwrap();
                            filled.set_cell(row, col, value).unwrap();
                        }
                    }
                }

                Ok(filled)
            },
            Outcome::Unsatisfiable(_) => Err(ExplainError::NoSolution)
        }
    }

    /// Computes the raw core for one cell. The diagram frame must already
    /// be open.
    fn raw_core(&mut self, row: usize, col: usize, value: usize,
            rules: &[RegionId]) -> ExplainResult<Vec<RegionId>> {
        self.oracle.push();
        self.oracle.assert(Formula::NotEquals(row, col, value));
        let outcome = self.oracle.check(rules);
        self.oracle.pop();

        match outcome? {
            Outcome::Unsatisfiable(core) => Ok(core),
            Outcome::Satisfiable(_) => Err(ExplainError::NoUniqueSolution)
        }
    }

    /// Minimizes a core by dropping one rule at a time, keeping a rule
    /// dropped only if the remainder still refutes the hypothesis. The
    /// result is inclusion-minimal, though not necessarily the globally
    /// smallest refuting set. The diagram frame must already be open.
    fn minimize(&mut self, row: usize, col: usize, value: usize,
            core: &[RegionId]) -> ExplainResult<Vec<RegionId>> {
        self.oracle.push();
        self.oracle.assert(Formula::NotEquals(row, col, value));

        let mut kept = core.to_vec();
        let mut position = 0;

        while position < kept.len() {
            let mut trial = kept.clone();
            trial.remove(position);

            match self.oracle.check(&trial) {
                Ok(Outcome::Unsatisfiable(_)) => kept = trial,
                Ok(Outcome::Satisfiable(_)) => position += 1,
                Err(error) => {
                    self.oracle.pop();
                    return Err(error.into());
                }
            }
        }

        self.oracle.pop();
        Ok(kept)
    }

    fn collect_cores(&mut self, puzzle: &Puzzle, solution: &Puzzle,
            rules: &[RegionId], cutoff: usize) -> ExplainResult<Cores> {
        let mut raw = Vec::new();

        for row in 0..9 {
            for col in 0..9 {
                if puzzle.get_cell(row, col).unwrap().is_some() {
                    continue;
                }

                let value = solution.get_cell(row, col).unwrap().unwrap();
                let core = self.raw_core(row, col, value, rules)?;

                raw.push(Justification {
                    row,
                    col,
                    value,
                    rules: core
                });
            }
        }

        let mut order: Vec<usize> = (0..raw.len()).collect();
        order.sort_by_key(|&index| raw[index].rules.len());
        order.truncate(cutoff);

        // buckets must keep cell scan order, not selection order
        order.sort_unstable();

        let mut cores = Cores::new();

        for index in order {
            let minimized = self.minimize(raw[index].row, raw[index].col,
                raw[index].value, &raw[index].rules)?;

            cores.add(Justification {
                rules: minimized,
                ..raw[index].clone()
            });
        }

        Ok(cores)
    }

    fn cores_with_cutoff(&mut self, puzzle: &Puzzle, cutoff: usize)
            -> ExplainResult<Cores> {
        let solution = self.solve_via_oracle(puzzle)?;
        let rules = all_rules();

        self.oracle.push();
        self.assert_diagram(puzzle, None);
        let result = self.collect_cores(puzzle, &solution, &rules, cutoff);
        self.oracle.pop();

        result
    }

    /// Computes a minimized [Justification] for every empty cell of the
    /// given puzzle and buckets them by rule count.
    ///
    /// # Errors
    ///
    /// * `ExplainError::NoSolution` if the puzzle cannot be completed.
    /// * `ExplainError::NoUniqueSolution` if the puzzle has more than one
    /// solution. Justifications only exist for forced cells.
    /// * `ExplainError::Oracle` if the oracle fails.
    pub fn justify(&mut self, puzzle: &Puzzle) -> ExplainResult<Cores> {
        self.cores_with_cutoff(puzzle, puzzle.empty_cells())
    }

    /// Computes the best hint for the given puzzle: the justification with
    /// the fewest rules among the cells with the smallest raw cores. Only
    /// as many raw cores as the hint cutoff allows are minimized, which
    /// bounds the oracle work per hint.
    ///
    /// # Errors
    ///
    /// * `ExplainError::NoSolution` if the puzzle cannot be completed.
    /// * `ExplainError::NoUniqueSolution` if the puzzle has more than one
    /// solution.
    /// * `ExplainError::NothingToExplain` if the puzzle has no empty cell.
    /// * `ExplainError::Oracle` if the oracle fails.
    pub fn hint(&mut self, puzzle: &Puzzle) -> ExplainResult<Justification> {
        let cores = self.cores_with_cutoff(puzzle, self.hint_cutoff)?;

        match cores.hint() {
            Some(justification) => Ok(justification.clone()),
            None => Err(ExplainError::NothingToExplain)
        }
    }

    /// Computes the difficulty metric of the given puzzle, i.e. the metric
    /// of the [Cores] collection [Explainer::justify] produces for it.
    ///
    /// # Errors
    ///
    /// As for [Explainer::justify].
    pub fn metric(&mut self, puzzle: &Puzzle) -> ExplainResult<usize> {
        Ok(self.justify(puzzle)?.metric())
    }

    /// Reports whether the clue at the given cell is redundant: whether
    /// the remaining clues together with all uniqueness rules already
    /// force its value, so erasing it keeps the puzzle uniquely solvable
    /// at that cell.
    ///
    /// # Errors
    ///
    /// * `ExplainError::NothingToExplain` if the cell holds no clue or
    /// lies outside the grid.
    /// * `ExplainError::Oracle` if the oracle fails.
    pub fn erasable(&mut self, puzzle: &Puzzle, row: usize, col: usize)
            -> ExplainResult<bool> {
        let value = match puzzle.get_cell(row, col) {
            Ok(Some(value)) => value,
            _ => return Err(ExplainError::NothingToExplain)
        };
        let rules = all_rules();

        self.oracle.push();
        self.assert_diagram(puzzle, Some((row, col)));
        self.oracle.assert(Formula::NotEquals(row, col, value));
        let outcome = self.oracle.check(&rules);
        self.oracle.pop();

        match outcome? {
            Outcome::Satisfiable(_) => Ok(false),
            Outcome::Unsatisfiable(_) => Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

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

    fn justification(row: usize, col: usize, value: usize,
            rules: Vec<RegionId>) -> Justification {
        Justification {
            row,
            col,
            value,
            rules
        }
    }

    #[test]
    fn hint_names_the_missing_cell() {
        let mut puzzle = full_grid();
        puzzle.erase_cell(8, 8).unwrap();

        let hint = Explainer::new_default().hint(&puzzle).unwrap();

        assert_eq!(8, hint.row);
        assert_eq!(8, hint.col);
        assert_eq!(5, hint.value);
        assert_eq!(1, hint.rules.len());
    }

    #[test]
    fn hint_on_a_full_puzzle_is_an_error() {
        assert_eq!(Err(ExplainError::NothingToExplain),
            Explainer::new_default().hint(&full_grid()));
    }

    #[test]
    fn justify_covers_every_empty_cell() {
        let mut puzzle = full_grid();
        puzzle.erase_cell(0, 0).unwrap();
        puzzle.erase_cell(4, 4).unwrap();
        puzzle.erase_cell(8, 8).unwrap();

        let cores = Explainer::new_default().justify(&puzzle).unwrap();

        assert_eq!(3, cores.len());

        let cells: Vec<(usize, usize, usize)> = cores.iter()
            .map(|justification|
                (justification.row, justification.col, justification.value))
            .collect();

        assert!(cells.contains(&(0, 0, 1)));
        assert!(cells.contains(&(4, 4, 9)));
        assert!(cells.contains(&(8, 8, 5)));
    }

    #[test]
    fn justifications_are_inclusion_minimal() {
        let mut puzzle = full_grid();
        puzzle.erase_cell(0, 0).unwrap();
        puzzle.erase_cell(4, 4).unwrap();
        puzzle.erase_cell(8, 8).unwrap();

        let cores = Explainer::new_default().justify(&puzzle).unwrap();

        for justification in cores.iter() {
            for dropped in 0..justification.rules.len() {
                let mut oracle = BacktrackingOracle::new();

                for row in 0..9 {
                    for col in 0..9 {
                        if let Some(value) =
                                puzzle.get_cell(row, col).unwrap() {
                            oracle.assert(Formula::Equals(row, col, value));
                        }
                    }
                }

                oracle.assert(Formula::NotEquals(justification.row,
                    justification.col, justification.value));

                let rules: Vec<RegionId> = justification.rules.iter()
                    .enumerate()
                    .filter(|&(position, _)| position != dropped)
                    .map(|(_, &rule)| rule)
                    .collect();

                if let Outcome::Unsatisfiable(_) =
                        oracle.check(&rules).unwrap() {
                    panic!("Justification still refutes with a rule \
                        removed.");
                }
            }
        }
    }

    #[test]
    fn ambiguous_puzzle_aborts_justification() {
        assert_eq!(Err(ExplainError::NoUniqueSolution),
            Explainer::new_default().justify(&Puzzle::new_empty()));
    }

    #[test]
    fn unsolvable_puzzle_reports_no_solution() {
        let mut puzzle = Puzzle::new_empty();
        puzzle.set_cell(0, 0, 5).unwrap();
        puzzle.set_cell(0, 8, 5).unwrap();

        assert_eq!(Err(ExplainError::NoSolution),
            Explainer::new_default().justify(&puzzle));
    }

    #[test]
    fn oracle_solution_matches_the_erased_cells() {
        let mut puzzle = full_grid();
        puzzle.erase_cell(0, 0).unwrap();
        puzzle.erase_cell(4, 4).unwrap();

        let filled =
            Explainer::new_default().solve_via_oracle(&puzzle).unwrap();

        assert_eq!(Some(1), filled.get_cell(0, 0).unwrap());
        assert_eq!(Some(9), filled.get_cell(4, 4).unwrap());
        assert_eq!(79, filled.empty_cells());
    }

    #[test]
    fn redundant_clue_is_erasable() {
        assert_eq!(Ok(true),
            Explainer::new_default().erasable(&full_grid(), 0, 0));
    }

    #[test]
    fn load_bearing_clue_is_not_erasable() {
        let mut puzzle = Puzzle::new_empty();
        puzzle.set_cell(0, 0, 1).unwrap();

        assert_eq!(Ok(false),
            Explainer::new_default().erasable(&puzzle, 0, 0));
    }

    #[test]
    fn probing_an_empty_cell_is_an_error() {
        assert_eq!(Err(ExplainError::NothingToExplain),
            Explainer::new_default().erasable(&Puzzle::new_empty(), 0, 0));
    }

    #[test]
    fn cores_rank_by_rule_count() {
        let row = |index: usize| RegionId::row(index).unwrap();
        let mut cores = Cores::new();
        cores.add(justification(0, 0, 1, vec![row(0), row(1), row(2)]));
        cores.add(justification(1, 1, 2, vec![row(1)]));
        cores.add(justification(2, 2, 3, vec![row(2), row(3)]));

        assert_eq!(3, cores.len());
        assert!(!cores.is_empty());
        assert_eq!((1, 1), {
            let hint = cores.hint().unwrap();
            (hint.row, hint.col)
        });

        let least = cores.least(2);

        assert_eq!(1, least[0].rules.len());
        assert_eq!(2, least[1].rules.len());
    }

    #[test]
    fn cores_metric_weights_rule_counts() {
        assert_eq!(0, Cores::new().metric());

        // 13 singleton cores truncate to 0, one more pushes past 1
        let mut cores = Cores::new();

        for index in 0..13 {
            cores.add(justification(index / 9, index % 9, 1,
                vec![RegionId::row(0).unwrap()]));
        }

        assert_eq!(0, cores.metric());

        cores.add(justification(2, 0, 1, vec![RegionId::row(0).unwrap()]));

        assert_eq!(1, cores.metric());

        // a justification needing all 27 rules contributes exactly 2
        let mut full = Cores::new();
        full.add(justification(0, 0, 1, all_rules()));

        assert_eq!(2, full.metric());
    }

    #[test]
    fn explanations_render_one_line_per_rule() {
        let justification = justification(3, 6, 2,
            vec![RegionId::row(3).unwrap(), RegionId::block(4).unwrap()]);

        assert_eq!(
            "Rule 1: Row 4 cannot contain duplicates\n\
             Rule 2: Middle-center block cannot contain duplicates",
            justification.explain());
    }

    #[test]
    fn justification_serde_round_trip() {
        let justification = justification(3, 6, 2,
            vec![RegionId::row(3).unwrap(), RegionId::column(6).unwrap()]);
        let json = serde_json::to_string(&justification).unwrap();
        let deserialized: Justification =
            serde_json::from_str(&json).unwrap();

        assert_eq!(justification, deserialized);
    }
}
