//! An incremental linear-arithmetic constraint solver in the Cassowary
//! style: the algorithm behind UI layout engines that resolve systems of
//! `≤`/`=`/`≥` constraints over named quantities (`view.width <= 2*other +
//! 10`) without re-solving from scratch on every edit.
//!
//! The public surface is small and deliberately narrow:
//!
//! - [`LinearExpression`], an immutable symbolic sum (parseable from a
//!   string via [`LinearExpression::from_string`]).
//! - [`Constraint`] and [`Relation`], a relational atom between two
//!   sides (minted by [`ConstraintSet::build_constraint`]).
//! - [`ConstraintSet`], the incremental façade (`add`, `remove`,
//!   `contains`, `value_of`, `minimize`).
//!
//! Variable identity is just a string; reserved prefixes (`s_`, `d_`,
//! `z_`) mark the solver's own internal bookkeeping variables, and every
//! externally supplied name is validated against them. See [`variable`]
//! for the classification predicates.

mod constraint;
mod constraint_set;
mod error;
mod expression;
mod parser;
mod tableau;
pub mod variable;

pub use constraint::{Constraint, Relation};
pub use constraint_set::ConstraintSet;
pub use error::SolverError;
pub use expression::LinearExpression;
