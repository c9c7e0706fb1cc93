//! Linear expressions: immutable symbolic sums `constant + Σ cᵢ·vᵢ`.
//!
//! Every operation here returns a new value; none mutate `self`. This
//! mirrors the tableau's own immutable-value style and keeps rollback in
//! `ConstraintSet::add` a matter of discarding a value rather than undoing
//! in-place edits.

use indexmap::IndexMap;

use crate::error::SolverError;
use crate::variable;

/// `constant + Σ cᵢ·vᵢ`, vᵢ identified by name.
///
/// Terms are stored in an [`IndexMap`] so that iteration order matches
/// insertion order; algorithms that need a deterministic *choice* among
/// several variables (entry/exit selection, tie-breaking) sort the
/// relevant names explicitly rather than relying on map order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearExpression {
    constant: f64,
    terms: IndexMap<String, f64>,
}

/// Insert `(name, coefficient)` into `terms`, dropping the entry when the
/// coefficient is exactly zero (unless `name` is a dummy marker, kept at
/// zero so it remains addressable: a zero-valued dummy marker must
/// still be removable from the tableau by name; see `Tableau::pivot`).
pub(crate) fn insert_term(terms: &mut IndexMap<String, f64>, name: String, coefficient: f64) {
    if coefficient == 0.0 && !variable::is_dummy(&name) {
        terms.shift_remove(&name);
    } else {
        terms.insert(name, coefficient);
    }
}

impl LinearExpression {
    /// The expression `constant` (no terms).
    pub fn from_constant(constant: f64) -> Self {
        Self {
            constant,
            terms: IndexMap::new(),
        }
    }

    /// Build an expression from a constant and an iterable of `(name,
    /// coefficient)` pairs, applying the zero-coefficient drop rule.
    pub fn with_terms(
        constant: f64,
        terms: impl IntoIterator<Item = (String, f64)>,
    ) -> Self {
        let mut map = IndexMap::new();
        for (name, coefficient) in terms {
            insert_term(&mut map, name, coefficient);
        }
        Self {
            constant,
            terms: map,
        }
    }

    /// Parse an expression string of the form `10 + 2*a - b` into a value.
    pub fn from_string(input: &str) -> Result<Self, SolverError> {
        crate::parser::parse(input)
    }

    /// The constant term.
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// An iterator over `(name, coefficient)` pairs in insertion order.
    pub fn terms(&self) -> impl Iterator<Item = (&str, f64)> {
        self.terms.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Coefficient of `name`, or `0.0` if it does not appear.
    pub fn coefficient_for(&self, name: &str) -> f64 {
        self.terms.get(name).copied().unwrap_or(0.0)
    }

    /// True if `name` has an explicit term (including a dummy kept at zero).
    pub fn contains(&self, name: &str) -> bool {
        self.terms.contains_key(name)
    }

    /// True if the expression has no terms at all.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// True if the expression has at least one term.
    pub fn is_parametric(&self) -> bool {
        !self.is_constant()
    }

    /// Names of the unrestricted (external or objective) variables that
    /// appear in this expression.
    pub fn unrestricted_variable_names(&self) -> Vec<String> {
        self.terms
            .keys()
            .filter(|name| variable::is_unrestricted(name))
            .cloned()
            .collect()
    }

    /// `-self`.
    pub fn negate(&self) -> Self {
        self.scale(-1.0)
    }

    /// `k * self`. Scaling by zero collapses the expression to the
    /// constant `0.0`, including any dummy terms (a pure algebraic
    /// operation, not a tableau row elimination, so the
    /// dummy-survives-at-zero exception does not apply here).
    pub fn scale(&self, k: f64) -> Self {
        if k == 0.0 {
            return Self::from_constant(0.0);
        }
        let terms = self.terms.iter().map(|(name, &c)| (name.clone(), c * k));
        Self::with_terms(self.constant * k, terms)
    }

    /// Replace every occurrence of `name` with `expression`, scaled by
    /// `name`'s coefficient here. If `name` does not appear, returns a
    /// clone of `self` unchanged.
    pub fn substitute(&self, name: &str, expression: &LinearExpression) -> Self {
        let Some(&coefficient) = self.terms.get(name) else {
            return self.clone();
        };
        self.remove_term(name).add_scaled(coefficient, expression)
    }

    /// `self + k * other`.
    fn add_scaled(&self, k: f64, other: &LinearExpression) -> Self {
        let mut terms: IndexMap<String, f64> = IndexMap::new();
        for (name, &c) in &self.terms {
            insert_term(&mut terms, name.clone(), c);
        }
        for (name, &c) in &other.terms {
            let combined = self.coefficient_for(name) + k * c;
            insert_term(&mut terms, name.clone(), combined);
        }
        Self {
            constant: self.constant + k * other.constant,
            terms,
        }
    }

    /// `self` with `name`'s term dropped entirely, regardless of whether
    /// `name` is a dummy. Unlike the zero-coefficient drop rule this is an
    /// explicit removal, used when a variable leaves the tableau for good.
    pub fn remove_term(&self, name: &str) -> Self {
        let mut terms = self.terms.clone();
        terms.shift_remove(name);
        Self {
            constant: self.constant,
            terms,
        }
    }

    /// Treat `self` as the right-hand side of `0 = self` and solve for
    /// `name`, producing the expression for `name` in terms of the rest.
    ///
    /// Fails with [`SolverError::NotPresent`] if `name` does not appear
    /// with a nonzero coefficient (a present-but-zero dummy coefficient
    /// cannot be pivoted on either, since that would divide by zero).
    pub fn solve_for(&self, name: &str) -> Result<Self, SolverError> {
        let coefficient = self.coefficient_for(name);
        if !self.contains(name) || coefficient == 0.0 {
            return Err(SolverError::NotPresent(name.to_string()));
        }
        let inverse = -1.0 / coefficient;
        let mut terms = IndexMap::new();
        for (other_name, &c) in &self.terms {
            if other_name == name {
                continue;
            }
            insert_term(&mut terms, other_name.clone(), c * inverse);
        }
        Ok(Self {
            constant: self.constant * inverse,
            terms,
        })
    }

    /// Treat `self` as the expression currently solved for `old_subject`
    /// (i.e. `old_subject = self`) and re-derive the expression solved for
    /// `new_subject`, a variable that must appear in `self` with a nonzero
    /// coefficient. `old_subject` appears as a term in the result.
    pub fn change_subject(
        &self,
        old_subject: &str,
        new_subject: &str,
    ) -> Result<Self, SolverError> {
        let coefficient = self.coefficient_for(new_subject);
        if !self.contains(new_subject) || coefficient == 0.0 {
            return Err(SolverError::NotPresent(new_subject.to_string()));
        }
        let inverse = 1.0 / coefficient;
        let mut terms = IndexMap::new();
        for (name, &c) in &self.terms {
            if name == new_subject {
                continue;
            }
            insert_term(&mut terms, name.clone(), -c * inverse);
        }
        insert_term(&mut terms, old_subject.to_string(), inverse);
        Ok(Self {
            constant: -self.constant * inverse,
            terms,
        })
    }
}
