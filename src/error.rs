//! Error types for the constraint solver.

use thiserror::Error;

/// Every way a solver operation can fail.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    /// An expression string could not be parsed.
    #[error("parse error at byte {position}: {message}")]
    Parse { position: usize, message: String },

    /// An algebraic precondition was violated: the expression has no term
    /// for the variable an operation names.
    #[error("variable {0:?} is not present in the expression")]
    NotPresent(String),

    /// Adding a constraint would leave the tableau with no feasible
    /// solution. The constraint set is left unchanged.
    #[error("constraint is infeasible with the existing constraint set")]
    Infeasible,

    /// The objective row has no lower bound. Well-formed, feasible
    /// constraint sets never produce this; seeing it signals an internal
    /// invariant violation rather than a caller mistake.
    #[error("objective row is unbounded")]
    Unbounded,

    /// A caller supplied an external-facing variable name that collides
    /// with a reserved internal prefix (`s_`, `d_`, `z_`).
    #[error("variable name {0:?} collides with a reserved internal prefix")]
    ReservedName(String),
}
