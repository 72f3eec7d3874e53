//! Running external tools.

use std::{
    ffi::OsStr,
    io,
    process::{ExitStatus, Stdio},
    time::Duration,
};

use log::{debug, info, warn};
use tokio::process::Command;

use crate::{DrawportError, tool::ResolvedTool};

/// Captured result of a successful tool run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Run `tool` with `args` and wait for it to exit.
///
/// stdout and stderr are captured; stdin is closed. When `timeout` is `Some`
/// and elapses first, the child is killed.
///
/// # Errors
///
/// - [`DrawportError::ToolNotFound`] if the program cannot be spawned because it does not exist
/// - [`DrawportError::Timeout`] if the timeout elapses
/// - [`DrawportError::ToolFailed`] if the exit status is non-zero
/// - [`DrawportError::Io`] for any other spawn or wait failure
pub async fn run_tool<I, S>(
    tool: &ResolvedTool,
    args: I,
    timeout: Option<Duration>,
) -> Result<ToolOutput, DrawportError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args
        .into_iter()
        .map(|a| a.as_ref().to_os_string())
        .collect();
    let name = tool.tool().display_name();

    debug!(
        tool = name,
        program = tool.program().display().to_string(),
        args:? = args;
        "Spawning"
    );

    let child = Command::new(tool.program())
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => DrawportError::ToolNotFound {
                tool: tool.tool(),
                candidate: tool.program().display().to_string(),
            },
            _ => DrawportError::Io(err),
        })?;

    let output = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                // Dropping the future drops the child, and kill_on_drop reaps it.
                warn!(tool = name, timeout_secs = limit.as_secs(); "Timed out, killing process");
                return Err(DrawportError::Timeout {
                    tool: tool.tool(),
                    timeout: limit,
                });
            }
        },
        None => child.wait_with_output().await?,
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        warn!(tool = name, status:% = output.status; "Process failed");
        if !stdout.trim().is_empty() {
            warn!(tool = name; "stdout:\n{stdout}");
        }
        if !stderr.trim().is_empty() {
            warn!(tool = name; "stderr:\n{stderr}");
        }
        return Err(DrawportError::ToolFailed {
            tool: tool.tool(),
            status: output.status,
            stdout,
            stderr,
        });
    }

    info!(tool = name, status:% = output.status; "Process finished");

    Ok(ToolOutput {
        status: output.status,
        stdout,
        stderr,
    })
}
