//! Runs one validated command to completion (or to its hard deadline) and
//! turns the outcome into the wire-level `result`/`error` payload.

use std::os::unix::process::ExitStatusExt;
use std::process::Stdio;
use std::time::{Duration, Instant};

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::process::Command;

/// Exit code an agent reports when its own deadline — not the process's
/// natural exit — ended execution. Distinguishes a self-inflicted kill from
/// a command that genuinely exited with -1.
pub const DEADLINE_EXIT_CODE: i32 = -1;

#[derive(Debug)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub execution_time_seconds: f64,
}

/// The command never produced a result at all: local validation rejection
/// and spawn failure both report `error`, not `result`. Distinct from an
/// [`ExecutionResult`] with [`DEADLINE_EXIT_CODE`], which did run (and was
/// killed, or had its output lost) and so still gets a `result` frame.
#[derive(Debug, thiserror::Error)]
#[error("failed to spawn process: {0}")]
pub struct SpawnError(String);

/// Spawn `command` in its own process group via `/bin/sh -c`, capturing
/// stdout/stderr, and enforce `timeout` as a hard deadline: on expiry the
/// whole process group is killed (not just the immediate child), matching
/// the teacher's `nix`-based process-tree signaling rather than killing a
/// single pid that may have already forked grandchildren.
pub async fn execute(command: &str, timeout: Duration) -> Result<ExecutionResult, SpawnError> {
    execute_with_shell("/bin/sh", command, timeout).await
}

/// `execute`, with the shell binary parameterized so tests can force the
/// spawn-failure branch deterministically instead of relying on `/bin/sh`
/// being absent.
async fn execute_with_shell(shell: &str, command: &str, timeout: Duration) -> Result<ExecutionResult, SpawnError> {
    let start = Instant::now();

    let mut child = Command::new(shell)
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .spawn()
        .map_err(|e| SpawnError(e.to_string()))?;

    let pid = child.id();
    let output = tokio::time::timeout(timeout, child.wait_with_output()).await;

    Ok(match output {
        Ok(Ok(output)) => ExecutionResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or_else(|| output.status.signal().unwrap_or(-1)),
            execution_time_seconds: start.elapsed().as_secs_f64(),
        },
        Ok(Err(e)) => ExecutionResult {
            stdout: String::new(),
            stderr: format!("failed to collect process output: {e}"),
            exit_code: DEADLINE_EXIT_CODE,
            execution_time_seconds: start.elapsed().as_secs_f64(),
        },
        Err(_) => {
            if let Some(pid) = pid {
                let _ = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL);
            }
            ExecutionResult {
                stdout: String::new(),
                stderr: "command killed after exceeding its timeout".to_string(),
                exit_code: DEADLINE_EXIT_CODE,
                execution_time_seconds: start.elapsed().as_secs_f64(),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_normally() {
        let result = execute("echo hello", Duration::from_secs(5)).await.unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn reports_nonzero_exit() {
        let result = execute("exit 7", Duration::from_secs(5)).await.unwrap();
        assert_eq!(result.exit_code, 7);
    }

    #[tokio::test]
    async fn kills_on_deadline() {
        let result = execute("sleep 30", Duration::from_millis(100)).await.unwrap();
        assert_eq!(result.exit_code, DEADLINE_EXIT_CODE);
    }

    #[tokio::test]
    async fn spawn_failure_is_reported_as_an_error_not_a_result() {
        let err = execute_with_shell("/nonexistent/shell/binary-does-not-exist", "echo hi", Duration::from_secs(5))
            .await
            .expect_err("a missing shell binary should fail to spawn");
        assert!(err.to_string().contains("failed to spawn process"));
    }
}
