use super::*;
use crate::policy::Policy;

#[test]
fn rejects_recursive_root_deletion() {
    let result = validate("rm -rf /", None, &Policy::default());
    assert_eq!(result.unwrap_err().kind(), "denied");
}

#[test]
fn rejects_mkfs() {
    let result = validate("mkfs.ext4 /dev/sda1", None, &Policy::default());
    assert_eq!(result.unwrap_err().kind(), "denied");
}

#[test]
fn rejects_raw_disk_write() {
    let result = validate("dd if=/dev/zero of=/dev/sda", None, &Policy::default());
    assert_eq!(result.unwrap_err().kind(), "denied");
}

#[test]
fn rejects_fork_bomb() {
    let result = validate(":(){ :|:& };:", None, &Policy::default());
    assert_eq!(result.unwrap_err().kind(), "denied");
}

#[test]
fn accepts_an_ordinary_command() {
    let result = validate("whoami", None, &Policy::default());
    assert!(result.is_ok());
}

#[test]
fn rejects_shell_operators_when_disabled() {
    let mut policy = Policy::default();
    policy.allow_shell_operators = false;
    let result = validate("ls; cat /etc/passwd", None, &policy);
    assert_eq!(result.unwrap_err().kind(), "shell_operator_forbidden");
}

#[test]
fn allows_shell_operators_by_default() {
    let policy = Policy::default();
    assert!(validate("ls && echo done", None, &policy).is_ok());
}

#[test]
fn rejects_commands_over_the_length_ceiling() {
    let mut policy = Policy::default();
    policy.max_length = 10;
    let result = validate("echo this is definitely too long", None, &policy);
    assert_eq!(result.unwrap_err().kind(), "too_long");
}

#[test]
fn allow_list_rejects_unlisted_first_token() {
    let mut policy = Policy::default();
    policy.allow_list_enabled = true;
    policy.allow_list = vec!["echo".to_string()];
    let result = validate("cat /etc/passwd", None, &policy);
    assert_eq!(result.unwrap_err().kind(), "not_in_allow_list");
}

#[test]
fn allow_list_accepts_listed_first_token_even_with_leading_whitespace() {
    let mut policy = Policy::default();
    policy.allow_list_enabled = true;
    policy.allow_list = vec!["echo".to_string()];
    assert!(validate("  echo hello", None, &policy).is_ok());
}

#[test]
fn timeout_is_clamped_silently_to_policy_cap() {
    let mut policy = Policy::default();
    policy.max_timeout_seconds = 30;
    assert_eq!(clamp_timeout(&policy, Some(600)), 30);
    assert_eq!(clamp_timeout(&policy, Some(5)), 5);
    assert_eq!(clamp_timeout(&policy, None), 30);
}

#[test]
fn validate_clamps_the_requested_timeout_into_accepted() {
    let mut policy = Policy::default();
    policy.max_timeout_seconds = 30;
    let accepted = validate("ls -la", Some(600), &policy).unwrap();
    assert_eq!(accepted.effective_timeout_seconds, 30);
}

#[test]
fn validate_is_a_pure_function_of_command_and_policy() {
    let policy = Policy::default();
    let a = validate("ls -la", Some(10), &policy);
    let b = validate("ls -la", Some(10), &policy);
    assert_eq!(a, b);
}
