use crate::policy::{Policy, SHELL_OPERATORS};
use crate::rejection::Rejection;
use regex::RegexSet;

/// Result of a successful validation: the submitted command plus the
/// *effective* timeout after silent clamping to policy's
/// `max_timeout_seconds`, as spec.md §4.1 requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub effective_timeout_seconds: u32,
}

/// Check `command` against `policy`, clamping `requested_timeout_seconds`
/// (absent means "use the policy default") to the effective value. Pure and
/// synchronous: no I/O, so the coordinator and the agent runtime — which
/// both link this crate — always agree given the same policy and the same
/// command string.
pub fn validate(
    command: &str,
    requested_timeout_seconds: Option<u32>,
    policy: &Policy,
) -> Result<Accepted, Rejection> {
    if command.len() > policy.max_length {
        return Err(Rejection::TooLong {
            max_length: policy.max_length,
            actual_length: command.len(),
        });
    }

    if let Some(pattern) = first_deny_match(command, policy) {
        return Err(Rejection::Denied { pattern });
    }

    if !policy.allow_shell_operators {
        if let Some(operator) = first_forbidden_operator(command) {
            return Err(Rejection::ShellOperatorForbidden { operator: operator.to_string() });
        }
    }

    if policy.allow_list_enabled {
        let token = command.trim().split_whitespace().next().unwrap_or("");
        if !policy.allow_list.iter().any(|allowed| allowed == token) {
            return Err(Rejection::NotInAllowList { token: token.to_string() });
        }
    }

    Ok(Accepted { effective_timeout_seconds: clamp_timeout(policy, requested_timeout_seconds) })
}

/// Clamp a submitted timeout (or the absence of one) to policy's cap.
pub fn clamp_timeout(policy: &Policy, requested_seconds: Option<u32>) -> u32 {
    requested_seconds
        .unwrap_or(policy.max_timeout_seconds)
        .min(policy.max_timeout_seconds)
        .max(1)
}

fn first_deny_match(command: &str, policy: &Policy) -> Option<String> {
    // Always-enforced patterns first, then operator-configured ones — a
    // deployment can add patterns but never remove the floor.
    let defaults = crate::policy::default_deny_patterns();
    let all_patterns: Vec<&str> = defaults
        .iter()
        .map(String::as_str)
        .chain(policy.deny_patterns.iter().map(String::as_str))
        .collect();

    let set = RegexSet::new(&all_patterns).ok()?;
    let matched = set.matches(command);
    matched.iter().next().map(|i| all_patterns[i].to_string())
}

fn first_forbidden_operator(command: &str) -> Option<&'static str> {
    SHELL_OPERATORS.iter().copied().find(|op| command.contains(op))
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
