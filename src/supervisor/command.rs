//! One-off command execution in a server's working directory.
//!
//! These calls are independent of the server's supervised long-running
//! process; both may be active at once and share only the console log.
//! The contract is log-everything-never-raise: output, exit codes, and
//! timeouts all land in the log, and only failures to even begin execution
//! (missing directory, spawn failure) surface as errors.

use crate::error::{Error, Result};
use crate::registry::SharedRegistry;
use async_process::{Command, Stdio};
use futures_lite::io::AsyncReadExt;
use std::path::Path;
use std::time::Duration;

/// Wall-clock timeout for one-off commands.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(15);

/// Wall-clock timeout for dependency installation.
pub const INSTALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Append a timestamped line to a server's console log and persist.
pub(crate) async fn append_log(registry: &SharedRegistry, name: &str, message: &str) {
    let mut registry = registry.lock().await;
    if let Some(record) = registry.get_mut(name) {
        record.push_log(message);
        if let Err(e) = registry.save() {
            tracing::warn!(server = %name, error = %e, "Failed to persist log line");
        }
    }
}

/// Run `command` through the shell in `server_dir`, capturing combined
/// output into the server's console log.
///
/// The log gains a `$ command` line, every non-empty output line, and
/// either a completion line noting the exit code or a single timed-out
/// line after the process is force-killed.
pub(crate) async fn run_in_dir(
    registry: &SharedRegistry,
    name: &str,
    server_dir: &Path,
    command: &str,
    timeout: Duration,
) -> Result<()> {
    if !server_dir.is_dir() {
        return Err(Error::Io("Server directory not found".to_string()));
    }

    append_log(registry, name, &format!("$ {}", command)).await;

    let spawned = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(server_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            append_log(registry, name, &format!("Error executing command: {}", e)).await;
            return Err(Error::LaunchFailed(format!("Failed to execute command: {}", e)));
        }
    };

    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();

    let collect = async {
        let mut out = String::new();
        let mut err = String::new();
        if let Some(stdout) = stdout.as_mut() {
            let _ = stdout.read_to_string(&mut out).await;
        }
        if let Some(stderr) = stderr.as_mut() {
            let _ = stderr.read_to_string(&mut err).await;
        }
        (out, err)
    };

    let (out, err) = match tokio::time::timeout(timeout, collect).await {
        Ok(output) => output,
        Err(_) => {
            if let Err(e) = child.kill() {
                tracing::warn!(server = %name, error = %e, "Failed to kill timed-out command");
            }
            let _ = child.status().await;
            append_log(
                registry,
                name,
                &format!("Command timed out after {} seconds", timeout.as_secs()),
            )
            .await;
            tracing::warn!(server = %name, command = %command, "One-off command timed out");
            return Ok(());
        }
    };

    for line in out.lines().chain(err.lines()) {
        let trimmed = line.trim_end();
        if !trimmed.is_empty() {
            append_log(registry, name, trimmed).await;
        }
    }

    match child.status().await {
        Ok(status) => {
            let code = status.code().unwrap_or(-1);
            if status.success() {
                append_log(
                    registry,
                    name,
                    &format!("Command completed successfully (exit code {})", code),
                )
                .await;
            } else {
                append_log(registry, name, &format!("Command failed with exit code: {}", code))
                    .await;
            }
        }
        Err(e) => {
            append_log(registry, name, &format!("Error executing command: {}", e)).await;
        }
    }

    Ok(())
}

/// Install dependencies from `requirements.txt` in the server's working
/// directory, if the file exists.
///
/// Shells out to the package installer with its own timeout and the same
/// log-everything-never-raise contract as [`run_in_dir`].
pub(crate) async fn install_dependencies(
    registry: &SharedRegistry,
    name: &str,
    server_dir: &Path,
) -> Result<()> {
    if !server_dir.join("requirements.txt").is_file() {
        append_log(registry, name, "No requirements.txt found, skipping install").await;
        return Ok(());
    }

    run_in_dir(
        registry,
        name,
        server_dir,
        "pip3 install -r requirements.txt",
        INSTALL_TIMEOUT,
    )
    .await
}
