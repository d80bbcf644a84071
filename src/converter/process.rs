//! External tool execution
//!
//! Every converter and extractor goes through [`run_tool`]: spawn the
//! program directly (no shell), capture its output, and turn spawn failures,
//! non-zero exits and timeouts into [`ConvertError`]s.

use std::ffi::OsStr;
use std::process::Stdio;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::types::ConvertError;

/// Captured output of a tool that exited successfully.
#[derive(Debug, Clone, Serialize)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
}

/// Run `program` with `args` and wait for it.
///
/// With `timeout` set the child is killed once the limit passes. Without it
/// the call waits for as long as the tool runs.
pub async fn run_tool<S>(
    program: &str,
    args: &[S],
    timeout: Option<Duration>,
) -> Result<ToolOutput, ConvertError>
where
    S: AsRef<OsStr>,
{
    let start = Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(
        tool = %program,
        args = ?args.iter().map(|a| a.as_ref().to_string_lossy().into_owned()).collect::<Vec<_>>(),
        "Running external tool"
    );

    let output = match timeout {
        Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(tool = %program, timeout_ms = limit.as_millis() as u64, "External tool timed out");
                return Err(ConvertError::TimedOut {
                    tool: program.to_string(),
                    timeout: limit,
                });
            }
        },
        None => cmd.output().await,
    }
    .map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConvertError::NotInstalled {
            tool: program.to_string(),
        },
        _ => ConvertError::Io(e),
    })?;

    let result = ToolOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code(),
        duration_ms: start.elapsed().as_millis() as u64,
    };

    if !output.status.success() {
        return Err(ConvertError::Failed {
            tool: program.to_string(),
            code: result.exit_code,
            stderr: result.stderr.trim().to_string(),
        });
    }

    debug!(tool = %program, duration_ms = result.duration_ms, "External tool finished");
    Ok(result)
}
