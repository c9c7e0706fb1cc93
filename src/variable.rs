//! Variable name classification.
//!
//! A variable is identified purely by a string; its class is derived from
//! a reserved prefix. External variables (the only kind a caller should
//! ever name) carry no reserved prefix at all.

use crate::error::SolverError;

/// Prefix for slack variables, introduced to turn an inequality into an
/// equality. Slack variables are restricted (≥ 0).
pub const SLACK_PREFIX: &str = "s_";

/// Prefix for dummy variables, zero-coefficient markers for required
/// equalities. Dummy variables are restricted (≥ 0).
pub const DUMMY_PREFIX: &str = "d_";

/// Prefix for objective variables, the left-hand side of an objective row.
/// Objective variables are unrestricted.
pub const OBJECTIVE_PREFIX: &str = "z_";

/// True if `name` is a slack variable (`s_` prefix).
pub fn is_slack(name: &str) -> bool {
    name.starts_with(SLACK_PREFIX)
}

/// True if `name` is a dummy variable (`d_` prefix).
pub fn is_dummy(name: &str) -> bool {
    name.starts_with(DUMMY_PREFIX)
}

/// True if `name` is an objective variable (`z_` prefix).
pub fn is_objective(name: &str) -> bool {
    name.starts_with(OBJECTIVE_PREFIX)
}

/// True if `name` is external (no reserved prefix, a user-facing quantity).
pub fn is_external(name: &str) -> bool {
    !is_slack(name) && !is_dummy(name) && !is_objective(name)
}

/// Restricted variables (slack, dummy) are constrained to be ≥ 0.
pub fn is_restricted(name: &str) -> bool {
    is_slack(name) || is_dummy(name)
}

/// Unrestricted variables (external, objective) may take any value.
pub fn is_unrestricted(name: &str) -> bool {
    is_external(name) || is_objective(name)
}

/// Reject a caller-supplied external variable name that collides with a
/// reserved prefix. Used at the boundary where user-facing names enter
/// the solver (`ConstraintSet::build_constraint`, the expression parser).
pub fn validate_external_name(name: &str) -> Result<(), SolverError> {
    if is_external(name) {
        Ok(())
    } else {
        Err(SolverError::ReservedName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_prefix() {
        assert!(is_slack("s_0"));
        assert!(is_dummy("d_12"));
        assert!(is_objective("z_3"));
        assert!(is_external("view.left"));
        assert!(is_external("x"));
    }

    #[test]
    fn predicates_are_mutually_exclusive() {
        for name in ["s_1", "d_1", "z_1", "x"] {
            let classes = [
                is_slack(name),
                is_dummy(name),
                is_objective(name),
                is_external(name),
            ];
            assert_eq!(classes.iter().filter(|&&c| c).count(), 1, "{name}");
        }
    }

    #[test]
    fn restricted_and_unrestricted_partition_all_names() {
        for name in ["s_1", "d_1", "z_1", "x"] {
            assert_ne!(is_restricted(name), is_unrestricted(name));
        }
    }

    #[test]
    fn reserved_prefixes_are_rejected() {
        assert!(validate_external_name("view.left").is_ok());
        assert!(matches!(
            validate_external_name("s_5"),
            Err(SolverError::ReservedName(_))
        ));
        assert!(matches!(
            validate_external_name("z_0"),
            Err(SolverError::ReservedName(_))
        ));
    }
}
