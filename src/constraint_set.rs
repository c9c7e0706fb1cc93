//! The incremental façade: add and remove constraints one at a time,
//! query variable values, and minimize an expression against the current
//! constraint set.

use indexmap::IndexSet;

use crate::constraint::{Constraint, Relation};
use crate::error::SolverError;
use crate::expression::LinearExpression;
use crate::tableau::Tableau;
use crate::variable::{self, DUMMY_PREFIX, OBJECTIVE_PREFIX, SLACK_PREFIX};

/// Mints fresh marker and objective variable names. One counter per
/// [`ConstraintSet`] rather than a process-wide counter, so that two
/// independent constraint sets never need to agree on a shared naming
/// authority.
#[derive(Debug, Clone, Default)]
struct VariableCounter {
    next_slack: u64,
    next_dummy: u64,
    next_objective: u64,
}

impl VariableCounter {
    fn next_slack_name(&mut self) -> String {
        let name = format!("{SLACK_PREFIX}{}", self.next_slack);
        self.next_slack += 1;
        name
    }

    fn next_dummy_name(&mut self) -> String {
        let name = format!("{DUMMY_PREFIX}{}", self.next_dummy);
        self.next_dummy += 1;
        name
    }

    fn next_objective_name(&mut self) -> String {
        let name = format!("{OBJECTIVE_PREFIX}{}", self.next_objective);
        self.next_objective += 1;
        name
    }
}

/// An incrementally maintained set of linear constraints over named
/// variables, backed by a basic feasible solved tableau.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    tableau: Tableau,
    active: IndexSet<String>,
    counter: VariableCounter,
}

impl ConstraintSet {
    /// An empty constraint set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a constraint, minting it a fresh marker variable drawn from
    /// this set's own counter. The constraint is not yet added; call
    /// [`Self::add`] with the result.
    ///
    /// `variable_name` and a non-empty `related_variable_name` must be
    /// external names (no `s_`/`d_`/`z_` prefix); an empty
    /// `related_variable_name` means the constraint has no related term.
    pub fn build_constraint(
        &mut self,
        variable_name: impl Into<String>,
        relation: Relation,
        related_variable_name: impl Into<String>,
        multiplier: f64,
        constant: f64,
    ) -> Result<Constraint, SolverError> {
        let variable_name = variable_name.into();
        let related_variable_name = related_variable_name.into();
        variable::validate_external_name(&variable_name)?;
        if !related_variable_name.is_empty() {
            variable::validate_external_name(&related_variable_name)?;
        }
        let marker = match relation {
            Relation::Equal => self.counter.next_dummy_name(),
            Relation::LessOrEqual | Relation::GreaterOrEqual => self.counter.next_slack_name(),
        };
        Ok(Constraint::new(
            variable_name,
            relation,
            related_variable_name,
            multiplier,
            constant,
            marker,
        ))
    }

    /// The current value of a variable: its row constant if basic,
    /// otherwise `0.0` (every non-basic variable sits at its implicit
    /// default in a basic feasible solution).
    pub fn value_of(&self, variable_name: &str) -> f64 {
        self.tableau
            .expression_for(variable_name)
            .map(|expr| expr.constant())
            .unwrap_or(0.0)
    }

    /// True if `constraint` is currently part of this set.
    pub fn contains(&self, constraint: &Constraint) -> bool {
        self.active.contains(constraint.marker_variable_name())
    }

    /// Re-express `expr` so every term refers to a current column
    /// (non-basic) variable, by substituting any basic variable it
    /// mentions with that variable's row. The tableau's disjointness
    /// invariant guarantees a single pass suffices: a row's expression
    /// can only ever reference column variables, never another basic one.
    fn express_in_columns(&self, expr: &LinearExpression) -> LinearExpression {
        let basic_terms: Vec<String> = expr
            .terms()
            .filter(|(name, _)| self.tableau.is_basic(name))
            .map(|(name, _)| name.to_string())
            .collect();
        let mut result = expr.clone();
        for name in basic_terms {
            if let Some(row) = self.tableau.expression_for(&name) {
                result = result.substitute(&name, row);
            }
        }
        result
    }

    /// Pick the variable a freshly added constraint's expression should
    /// be solved for: the lexicographically smallest unrestricted,
    /// not-yet-basic variable it mentions, falling back to the
    /// constraint's own marker if the marker's coefficient is negative
    /// and it is not already basic. Returns `None` when neither is
    /// available, meaning the marker must be forced into the basis and
    /// feasibility restored afterward.
    ///
    /// Candidates are sorted before picking, not taken in the
    /// expression's term order, so this decision point is as
    /// deterministic as entry/exit selection elsewhere in the solver.
    fn choose_subject(&self, expr: &LinearExpression, marker: &str) -> Option<String> {
        let mut candidates: Vec<&str> = expr
            .terms()
            .filter(|(name, _)| variable::is_unrestricted(name) && !self.tableau.is_basic(name))
            .map(|(name, _)| name)
            .collect();
        candidates.sort();
        if let Some(name) = candidates.into_iter().next() {
            return Some(name.to_string());
        }
        if expr.coefficient_for(marker) < 0.0 && !self.tableau.is_basic(marker) {
            return Some(marker.to_string());
        }
        None
    }

    /// Add a constraint. If it is already present this is a no-op. On
    /// [`SolverError::Infeasible`] the constraint set is left exactly as
    /// it was before the call.
    pub fn add(&mut self, constraint: &Constraint) -> Result<(), SolverError> {
        let marker = constraint.marker_variable_name().to_string();
        if self.active.contains(&marker) {
            return Ok(());
        }

        let expr = self.express_in_columns(constraint.expression());
        let subject = self
            .choose_subject(&expr, &marker)
            .unwrap_or_else(|| marker.clone());
        let row = expr.solve_for(&subject)?;

        let snapshot = self.tableau.clone();
        self.tableau.substitute_column(&subject, &row);
        self.tableau.set_row(&subject, row);

        if let Err(e) = self.restore_feasibility() {
            self.tableau = snapshot;
            return Err(e);
        }

        self.active.insert(marker);
        Ok(())
    }

    /// Repeatedly pivot to eliminate negative-constant restricted rows,
    /// bounded to `(row_count + 1)^2` iterations (minimum 64). Exhausting
    /// the bound without reaching feasibility means the constraint just
    /// added is infeasible with the rest of the set.
    fn restore_feasibility(&mut self) -> Result<(), SolverError> {
        let row_count = self.tableau.row_variable_names().len();
        let bound = ((row_count + 1) * (row_count + 1)).max(64);
        for _ in 0..bound {
            let Some(leaving) = self.tableau.infeasible_rows().into_iter().next() else {
                return Ok(());
            };
            let leaving_row = self
                .tableau
                .expression_for(&leaving)
                .expect("row just reported infeasible must exist")
                .clone();
            let mut candidates: Vec<String> = leaving_row
                .terms()
                .filter(|(_, coefficient)| *coefficient < 0.0)
                .map(|(name, _)| name.to_string())
                .collect();
            candidates.sort();
            let Some(entering) = candidates.into_iter().next() else {
                return Err(SolverError::Infeasible);
            };
            self.tableau.pivot(&leaving, &entering)?;
        }
        Err(SolverError::Infeasible)
    }

    /// Among rows containing `marker` as a non-basic term, choose the one
    /// to pivot it into for removal: the row with the smallest ratio
    /// `constant / -coefficient` among restricted rows with a negative
    /// marker coefficient (keeping the tableau feasible), falling back to
    /// any restricted row, then any row at all that mentions it. Ties
    /// break toward the lexicographically smallest row name.
    fn choose_exit_row_for_marker(&self, marker: &str) -> Option<String> {
        let mut best_ratio: Option<(String, f64)> = None;
        let mut any_restricted: Option<String> = None;
        let mut any_row: Option<String> = None;

        for row_name in self.tableau.row_variable_names() {
            let expr = self
                .tableau
                .expression_for(&row_name)
                .expect("row_variable_names is consistent with the tableau");
            let coefficient = expr.coefficient_for(marker);
            if coefficient == 0.0 {
                continue;
            }
            if any_row.is_none() {
                any_row = Some(row_name.clone());
            }
            let restricted = variable::is_restricted(&row_name);
            if restricted && any_restricted.is_none() {
                any_restricted = Some(row_name.clone());
            }
            if restricted && coefficient < 0.0 {
                let ratio = expr.constant() / -coefficient;
                let better = match &best_ratio {
                    None => true,
                    Some((best_name, best_r)) => {
                        ratio < *best_r || (ratio == *best_r && row_name < *best_name)
                    }
                };
                if better {
                    best_ratio = Some((row_name, ratio));
                }
            }
        }

        best_ratio.map(|(name, _)| name).or(any_restricted).or(any_row)
    }

    /// Remove a previously added constraint. A no-op if `constraint` is
    /// not currently in the set.
    pub fn remove(&mut self, constraint: &Constraint) -> Result<(), SolverError> {
        let marker = constraint.marker_variable_name();
        if !self.active.contains(marker) {
            return Ok(());
        }

        if self.tableau.is_basic(marker) {
            self.tableau.remove_row(marker);
        } else if let Some(exit_row) = self.choose_exit_row_for_marker(marker) {
            self.tableau.pivot(&exit_row, marker)?;
            self.tableau.remove_row(marker);
        } else {
            self.tableau.remove_column(marker);
        }

        // Pivoting the marker into the basis picks its exit row by the
        // same minimum-ratio rule `add` uses to restore feasibility, so
        // this is normally a no-op; it guards the same degenerate cases.
        self.restore_feasibility()?;

        self.active.shift_remove(marker);
        Ok(())
    }

    /// Minimize `objective` against the current constraint set and return
    /// its minimal value. Leaves the constraint set's feasible region
    /// unchanged (only the choice of basic variables may differ
    /// afterward, an equivalent re-expression of the same solutions).
    pub fn minimize(&mut self, objective: &LinearExpression) -> Result<f64, SolverError> {
        let row = self.express_in_columns(objective);
        let objective_name = self.counter.next_objective_name();
        self.tableau.set_row(&objective_name, row);

        let result = self.tableau.minimize(&objective_name);
        let value = self
            .tableau
            .expression_for(&objective_name)
            .map(|expr| expr.constant());
        self.tableau.remove_row(&objective_name);

        result?;
        Ok(value.expect("objective row was just inserted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(constant: f64, pairs: &[(&str, f64)]) -> LinearExpression {
        LinearExpression::with_terms(constant, pairs.iter().map(|(n, c)| (n.to_string(), *c)))
    }

    #[test]
    fn add_and_query_a_simple_upper_bound() {
        let mut set = ConstraintSet::new();
        let c = set
            .build_constraint("width", Relation::LessOrEqual, "", 0.0, 100.0)
            .unwrap();
        set.add(&c).unwrap();
        assert!(set.contains(&c));
        // width is unrestricted and is chosen as its own row's subject, so
        // with no other constraint pulling it down it sits at the bound.
        assert_eq!(set.value_of("width"), 100.0);
    }

    #[test]
    fn add_is_idempotent() {
        let mut set = ConstraintSet::new();
        let c = set
            .build_constraint("x", Relation::Equal, "", 0.0, 5.0)
            .unwrap();
        set.add(&c).unwrap();
        set.add(&c).unwrap();
        assert_eq!(set.value_of("x"), 5.0);
    }

    #[test]
    fn equality_constraint_pins_the_value() {
        let mut set = ConstraintSet::new();
        let c = set
            .build_constraint("x", Relation::Equal, "", 0.0, 42.0)
            .unwrap();
        set.add(&c).unwrap();
        assert_eq!(set.value_of("x"), 42.0);
    }

    #[test]
    fn conflicting_equalities_are_rejected_and_rolled_back() {
        let mut set = ConstraintSet::new();
        let c1 = set
            .build_constraint("x", Relation::Equal, "", 0.0, 1.0)
            .unwrap();
        let c2 = set
            .build_constraint("x", Relation::Equal, "", 0.0, 2.0)
            .unwrap();
        set.add(&c1).unwrap();
        let before = set.value_of("x");
        let result = set.add(&c2);
        assert!(matches!(result, Err(SolverError::Infeasible)));
        assert_eq!(set.value_of("x"), before);
        assert!(!set.contains(&c2));
    }

    #[test]
    fn remove_unwinds_an_equality_constraint() {
        let mut set = ConstraintSet::new();
        let c = set
            .build_constraint("x", Relation::Equal, "", 0.0, 9.0)
            .unwrap();
        set.add(&c).unwrap();
        assert_eq!(set.value_of("x"), 9.0);
        set.remove(&c).unwrap();
        assert!(!set.contains(&c));
        assert_eq!(set.value_of("x"), 0.0);
    }

    #[test]
    fn remove_of_absent_constraint_is_a_no_op() {
        let mut set = ConstraintSet::new();
        let c = set
            .build_constraint("x", Relation::Equal, "", 0.0, 1.0)
            .unwrap();
        assert!(set.remove(&c).is_ok());
        assert!(!set.contains(&c));
    }

    #[test]
    fn minimize_finds_the_bound_an_inequality_imposes() {
        let mut set = ConstraintSet::new();
        let upper = set
            .build_constraint("width", Relation::LessOrEqual, "", 0.0, 50.0)
            .unwrap();
        let lower = set
            .build_constraint("width", Relation::GreaterOrEqual, "", 0.0, 0.0)
            .unwrap();
        set.add(&upper).unwrap();
        set.add(&lower).unwrap();

        let objective = expr(0.0, &[("width", -1.0)]); // maximize width == minimize -width
        let min = set.minimize(&objective).unwrap();
        assert_eq!(min, -50.0);
        assert_eq!(set.value_of("width"), 50.0);
    }

    #[test]
    fn build_constraint_rejects_reserved_names() {
        let mut set = ConstraintSet::new();
        assert!(matches!(
            set.build_constraint("s_5", Relation::Equal, "", 0.0, 1.0),
            Err(SolverError::ReservedName(_))
        ));
    }
}
