//! Configurable validation policy.
//!
//! The same [`Policy`] shape is loaded on the coordinator (from server
//! config) and the agent runtime (from agent config), so `validate` makes
//! an identical decision on both ends of the wire for an identical command.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_LENGTH: usize = 1000;
pub const DEFAULT_MAX_TIMEOUT_SECONDS: u32 = 3600;

/// Shell metacharacters rejected when `allow_shell_operators` is false.
pub const SHELL_OPERATORS: &[&str] = &[";", "&&", "||", "|", ">", "<", "`", "$(", "\n"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub max_length: usize,
    pub deny_patterns: Vec<String>,
    pub allow_list_enabled: bool,
    pub allow_list: Vec<String>,
    pub allow_shell_operators: bool,
    pub max_timeout_seconds: u32,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            deny_patterns: default_deny_patterns(),
            allow_list_enabled: false,
            allow_list: Vec::new(),
            allow_shell_operators: true,
            max_timeout_seconds: DEFAULT_MAX_TIMEOUT_SECONDS,
        }
    }
}

/// Deny patterns that are always enforced regardless of config, per
/// spec: recursive root deletion, filesystem format, raw disk write, fork
/// bombs. Configured `deny_patterns` are added on top of these, never
/// instead of them — see [`crate::validate::validate`].
pub fn default_deny_patterns() -> Vec<String> {
    vec![
        r"rm\s+(-\w*r\w*f\w*|-\w*f\w*r\w*)\s+/\s*($|[^a-zA-Z0-9_./])".to_string(),
        r"rm\s+-rf\s+/\*".to_string(),
        r"mkfs(\.\w+)?\s".to_string(),
        r"dd\s+.*if=/dev/zero".to_string(),
        r"dd\s+.*of=/dev/sd".to_string(),
        r">\s*/dev/sd[a-z]".to_string(),
        r":\(\)\s*\{\s*:\|:&\s*\}\s*;\s*:".to_string(),
    ]
}
