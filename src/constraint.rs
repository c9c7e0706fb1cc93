//! Relational atoms: `subject ⟂ multiplier·related + constant`.

use crate::expression::{insert_term, LinearExpression};
use crate::variable;
use indexmap::IndexMap;

/// The relation a [`Constraint`] asserts between its two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
}

/// `subject ⟂ multiplier·related + constant`, reduced to a canonical
/// `0 = expression` form carrying a unique marker variable.
///
/// The marker is a slack (`s_`) for an inequality or a dummy (`d_`) for an
/// equality; it is what `ConstraintSet::remove` pivots out of the tableau
/// to undo the constraint later.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint {
    variable_name: String,
    relation: Relation,
    related_variable_name: String,
    multiplier: f64,
    constant: f64,
    expression: LinearExpression,
    marker_variable_name: String,
}

impl Constraint {
    /// Build a constraint's canonical expression and bind it to a marker
    /// variable the caller has already minted (see
    /// `ConstraintSet::build_constraint`, which owns the marker counter).
    ///
    /// An empty `related_variable_name` (or a zero `multiplier`) means the
    /// constraint bounds `variable_name` against a plain constant, with no
    /// related-variable term at all.
    pub fn new(
        variable_name: impl Into<String>,
        relation: Relation,
        related_variable_name: impl Into<String>,
        multiplier: f64,
        constant: f64,
        marker_variable_name: impl Into<String>,
    ) -> Self {
        let variable_name = variable_name.into();
        let related_variable_name = related_variable_name.into();
        let marker_variable_name = marker_variable_name.into();

        let mut terms: IndexMap<String, f64> = IndexMap::new();
        if !related_variable_name.is_empty() {
            insert_term(&mut terms, related_variable_name.clone(), multiplier);
        }
        insert_term(&mut terms, variable_name.clone(), -1.0);
        let marker_coefficient = match relation {
            Relation::LessOrEqual => -1.0,
            Relation::GreaterOrEqual => 1.0,
            Relation::Equal => 1.0,
        };
        insert_term(&mut terms, marker_variable_name.clone(), marker_coefficient);

        let expression = LinearExpression::with_terms(constant, terms);

        Self {
            variable_name,
            relation,
            related_variable_name,
            multiplier,
            constant,
            expression,
            marker_variable_name,
        }
    }

    pub fn variable_name(&self) -> &str {
        &self.variable_name
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn related_variable_name(&self) -> &str {
        &self.related_variable_name
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// The canonical `0 = expression` form, ready to be added to a tableau.
    pub fn expression(&self) -> &LinearExpression {
        &self.expression
    }

    /// The marker variable (`s_`/`d_` prefixed) that identifies this
    /// constraint's row once added.
    pub fn marker_variable_name(&self) -> &str {
        &self.marker_variable_name
    }

    /// True if the marker is a slack (the constraint is an inequality).
    pub fn has_slack_marker(&self) -> bool {
        variable::is_slack(&self.marker_variable_name)
    }

    /// True if the marker is a dummy (the constraint is an equality).
    pub fn has_dummy_marker(&self) -> bool {
        variable::is_dummy(&self.marker_variable_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn less_or_equal_gets_a_negative_slack_marker() {
        // width <= 2*other + 10
        let c = Constraint::new("width", Relation::LessOrEqual, "other", 2.0, 10.0, "s_0");
        assert_eq!(c.expression().constant(), 10.0);
        assert_eq!(c.expression().coefficient_for("other"), 2.0);
        assert_eq!(c.expression().coefficient_for("width"), -1.0);
        assert_eq!(c.expression().coefficient_for("s_0"), -1.0);
        assert!(c.has_slack_marker());
    }

    #[test]
    fn greater_or_equal_gets_a_positive_slack_marker() {
        let c = Constraint::new("width", Relation::GreaterOrEqual, "other", 1.0, 0.0, "s_1");
        assert_eq!(c.expression().coefficient_for("s_1"), 1.0);
    }

    #[test]
    fn equal_gets_a_dummy_marker_with_unit_coefficient() {
        let c = Constraint::new("width", Relation::Equal, "", 0.0, 100.0, "d_0");
        assert_eq!(c.expression().constant(), 100.0);
        assert_eq!(c.expression().coefficient_for("width"), -1.0);
        assert_eq!(c.expression().coefficient_for("d_0"), 1.0);
        assert!(c.has_dummy_marker());
        assert!(!c.expression().contains("")); // no related-variable term
    }

    #[test]
    fn zero_multiplier_omits_the_related_term() {
        let c = Constraint::new("width", Relation::LessOrEqual, "other", 0.0, 5.0, "s_2");
        assert!(!c.expression().contains("other"));
    }
}
