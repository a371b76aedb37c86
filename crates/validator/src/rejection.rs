use serde::{Deserialize, Serialize};
use std::fmt;

/// Why `validate` rejected a command. Carried synchronously back to the
/// submitter — never written to the store, since a rejected command was
/// never accepted in the first place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    TooLong { max_length: usize, actual_length: usize },
    Denied { pattern: String },
    NotInAllowList { token: String },
    ShellOperatorForbidden { operator: String },
}

impl Rejection {
    /// Stable machine-readable tag, matching the `reason` values spec.md
    /// §4.1 enumerates (`too_long`, `denied`, `not_in_allow_list`,
    /// `shell_operator_forbidden`).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TooLong { .. } => "too_long",
            Self::Denied { .. } => "denied",
            Self::NotInAllowList { .. } => "not_in_allow_list",
            Self::ShellOperatorForbidden { .. } => "shell_operator_forbidden",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong { max_length, actual_length } => {
                write!(f, "command length {actual_length} exceeds max {max_length}")
            }
            Self::Denied { pattern } => write!(f, "command matches deny pattern {pattern:?}"),
            Self::NotInAllowList { token } => {
                write!(f, "command {token:?} is not in the allow list")
            }
            Self::ShellOperatorForbidden { operator } => {
                write!(f, "shell operator {operator:?} is forbidden by policy")
            }
        }
    }
}

impl std::error::Error for Rejection {}
