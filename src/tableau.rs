//! The basic feasible solved form: a map from basic variable to the
//! expression it is currently solved for.
//!
//! Three invariants hold after every public operation completes:
//! **disjointness** (no row's variable appears in any row's expression,
//! including its own), **feasibility** (every restricted row variable has
//! a non-negative constant), and **uniqueness** (each variable is the
//! basic variable of at most one row).

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::error::SolverError;
use crate::expression::LinearExpression;
use crate::variable;

/// Basic-variable-name → expression it is solved for. Private to the
/// crate: callers only ever see the effects of a tableau through
/// [`crate::ConstraintSet`].
#[derive(Debug, Clone, Default)]
pub(crate) struct Tableau {
    rows: IndexMap<String, LinearExpression>,
}

impl Tableau {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The expression a basic variable is solved for, if it is basic.
    pub(crate) fn expression_for(&self, name: &str) -> Option<&LinearExpression> {
        self.rows.get(name)
    }

    /// True if `name` is the basic variable of some row.
    pub(crate) fn is_basic(&self, name: &str) -> bool {
        self.rows.contains_key(name)
    }

    /// Basic variable names, sorted lexicographically for deterministic
    /// iteration during entry/exit selection.
    pub(crate) fn row_variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rows.keys().cloned().collect();
        names.sort();
        names
    }

    /// Every variable name that appears in some row's expression (the
    /// parametric/column variables), sorted lexicographically.
    pub(crate) fn column_variable_names(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        for expr in self.rows.values() {
            for (name, _) in expr.terms() {
                names.insert(name.to_string());
            }
        }
        names.into_iter().collect()
    }

    /// True if every restricted basic variable has a non-negative
    /// constant (the tableau represents a feasible solution).
    pub(crate) fn is_feasible(&self) -> bool {
        self.rows
            .iter()
            .all(|(name, expr)| !variable::is_restricted(name) || expr.constant() >= 0.0)
    }

    /// Restricted basic variables whose row constant is negative, sorted
    /// lexicographically (candidates for a feasibility-restoring exit
    /// pivot).
    pub(crate) fn infeasible_rows(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .rows
            .iter()
            .filter(|(name, expr)| variable::is_restricted(name) && expr.constant() < 0.0)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Insert a new row. The caller is responsible for having already
    /// eliminated `name` from every other row (via [`Self::substitute_column`]
    /// or [`Self::pivot`]) so disjointness holds.
    pub(crate) fn set_row(&mut self, name: impl Into<String>, expression: LinearExpression) {
        self.rows.insert(name.into(), expression);
    }

    /// Remove a row outright, returning its expression if it was basic.
    pub(crate) fn remove_row(&mut self, name: &str) -> Option<LinearExpression> {
        self.rows.shift_remove(name)
    }

    /// Strip `name`'s term from every row, regardless of its coefficient.
    /// Used when a marker variable that never became basic is eliminated
    /// from the problem entirely on constraint removal.
    pub(crate) fn remove_column(&mut self, name: &str) {
        for expr in self.rows.values_mut() {
            if expr.contains(name) {
                *expr = expr.remove_term(name);
            }
        }
    }

    /// Substitute `expression` for every occurrence of `name` across all
    /// rows. Used to re-establish disjointness after a pivot introduces a
    /// new basic variable.
    pub(crate) fn substitute_column(&mut self, name: &str, expression: &LinearExpression) {
        for expr in self.rows.values_mut() {
            if expr.contains(name) {
                *expr = expr.substitute(name, expression);
            }
        }
    }

    /// Pivot `entering` into the basis in place of `leaving`. `leaving`
    /// must currently be basic and its row must contain `entering` with a
    /// nonzero coefficient.
    pub(crate) fn pivot(&mut self, leaving: &str, entering: &str) -> Result<(), SolverError> {
        let leaving_row = self
            .rows
            .shift_remove(leaving)
            .ok_or_else(|| SolverError::NotPresent(leaving.to_string()))?;
        // A row stores `leaving = leaving_row`, i.e. the canonical form
        // `0 = leaving_row - leaving`. Fold the leaving variable in as a
        // term before solving for `entering`, so the result correctly
        // carries `leaving` as one of its own terms.
        let mut canonical_terms: IndexMap<String, f64> = IndexMap::new();
        for (name, coefficient) in leaving_row.terms() {
            crate::expression::insert_term(&mut canonical_terms, name.to_string(), coefficient);
        }
        crate::expression::insert_term(&mut canonical_terms, leaving.to_string(), -1.0);
        let canonical = LinearExpression::with_terms(leaving_row.constant(), canonical_terms);

        let entering_row = canonical.solve_for(entering)?;
        self.substitute_column(entering, &entering_row);
        self.rows.insert(entering.to_string(), entering_row);
        Ok(())
    }

    /// Run the primal simplex optimize phase on the row named
    /// `objective`, pivoting until no column has a negative coefficient
    /// there (optimal) or the objective is unbounded.
    ///
    /// Entering and leaving variables are chosen deterministically: the
    /// lexicographically smallest eligible column enters, ties in the
    /// minimum-ratio exit test break toward the lexicographically smallest
    /// row.
    pub(crate) fn minimize(&mut self, objective: &str) -> Result<(), SolverError> {
        loop {
            let objective_row = self
                .rows
                .get(objective)
                .ok_or_else(|| SolverError::NotPresent(objective.to_string()))?;

            let mut candidates: Vec<String> = objective_row
                .terms()
                .filter(|(_, coefficient)| *coefficient < 0.0)
                .map(|(name, _)| name.to_string())
                .collect();
            candidates.sort();

            let Some(entering) = candidates.into_iter().next() else {
                return Ok(());
            };

            let mut best: Option<(String, f64)> = None;
            for row_name in self.row_variable_names() {
                // Only a restricted basic variable has a non-negativity
                // floor to protect; unrestricted rows never limit how far
                // the entering column can move.
                if row_name == objective || !variable::is_restricted(&row_name) {
                    continue;
                }
                let expr = self.rows.get(&row_name).expect("row_variable_names is consistent");
                let coefficient = expr.coefficient_for(&entering);
                if coefficient < 0.0 {
                    let ratio = -expr.constant() / coefficient;
                    let better = match &best {
                        None => true,
                        Some((best_name, best_ratio)) => {
                            ratio < *best_ratio || (ratio == *best_ratio && row_name < *best_name)
                        }
                    };
                    if better {
                        best = Some((row_name, ratio));
                    }
                }
            }

            let (leaving, _) = best.ok_or(SolverError::Unbounded)?;
            self.pivot(&leaving, &entering)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(constant: f64, pairs: &[(&str, f64)]) -> LinearExpression {
        LinearExpression::with_terms(constant, pairs.iter().map(|(n, c)| (n.to_string(), *c)))
    }

    #[test]
    fn pivot_swaps_basic_and_column_variable() {
        let mut t = Tableau::new();
        // s_0 = 10 - x  (x currently parametric, s_0 basic)
        t.set_row("s_0", expr(10.0, &[("x", -1.0)]));
        t.pivot("s_0", "x").unwrap();

        assert!(t.is_basic("x"));
        assert!(!t.is_basic("s_0"));
        // x = 10 - s_0
        let row = t.expression_for("x").unwrap();
        assert_eq!(row.constant(), 10.0);
        assert_eq!(row.coefficient_for("s_0"), -1.0);
    }

    #[test]
    fn pivot_maintains_disjointness_across_rows() {
        let mut t = Tableau::new();
        t.set_row("s_0", expr(10.0, &[("x", -1.0)]));
        t.set_row("s_1", expr(4.0, &[("x", -1.0)]));
        t.pivot("s_0", "x").unwrap();

        // s_1 referenced x, which is now basic: it must be substituted.
        let s1 = t.expression_for("s_1").unwrap();
        assert!(!s1.contains("x"));
        // s_1 = 4 - x = 4 - (10 - s_0) = -6 + s_0
        assert_eq!(s1.constant(), -6.0);
        assert_eq!(s1.coefficient_for("s_0"), 1.0);
    }

    #[test]
    fn is_feasible_checks_restricted_rows_only() {
        let mut t = Tableau::new();
        t.set_row("s_0", expr(-1.0, &[]));
        assert!(!t.is_feasible());
        assert_eq!(t.infeasible_rows(), vec!["s_0".to_string()]);

        let mut t2 = Tableau::new();
        t2.set_row("x", expr(-1.0, &[])); // external, unrestricted: fine negative
        assert!(t2.is_feasible());
    }

    #[test]
    fn minimize_drives_negative_objective_coefficients_to_zero() {
        let mut t = Tableau::new();
        // minimize z = -x, subject to s_0 = 10 - x, x,s_0 >= 0
        t.set_row("z_obj", expr(0.0, &[("x", -1.0)]));
        t.set_row("s_0", expr(10.0, &[("x", -1.0)]));
        t.minimize("z_obj").unwrap();

        let objective = t.expression_for("z_obj").unwrap();
        for (name, coefficient) in objective.terms() {
            assert!(
                coefficient >= 0.0,
                "column {name} still has a negative coefficient"
            );
        }
        // optimum drives x to its upper bound of 10, so z = -10
        assert_eq!(objective.constant(), -10.0);
    }

    #[test]
    fn minimize_reports_unbounded_when_no_row_limits_the_entering_column() {
        let mut t = Tableau::new();
        t.set_row("z_obj", expr(0.0, &[("x", -1.0)]));
        assert!(matches!(t.minimize("z_obj"), Err(SolverError::Unbounded)));
    }

    #[test]
    fn remove_column_strips_a_marker_from_every_row() {
        let mut t = Tableau::new();
        t.set_row("s_0", expr(5.0, &[("d_0", 1.0)]));
        t.set_row("s_1", expr(2.0, &[("d_0", -3.0)]));
        t.remove_column("d_0");
        assert!(!t.expression_for("s_0").unwrap().contains("d_0"));
        assert!(!t.expression_for("s_1").unwrap().contains("d_0"));
    }
}
