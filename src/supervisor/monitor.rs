use crate::registry::{LaunchId, SharedRegistry};
use async_process::Child;
use futures::StreamExt;
use futures_lite::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

/// Spawn the background monitor for one launch of a server process.
///
/// Exactly one monitor exists per process instance: it is bound to the
/// launch id, not to the server name, so restarting a server gets a fresh
/// monitor for the fresh process while any stale one dies off harmlessly.
///
/// The monitor drains the child's combined stdout/stderr line by line,
/// appending each line (timestamped) to the record's console log and
/// persisting the registry. Buffered line reads preserve the order in which
/// the process emitted its output, and reading to EOF means output written
/// just before exit is never lost. When both streams end the child is
/// reaped, and terminal state (status=stopped, pid cleared) is written back
/// only if the record still belongs to this launch.
///
/// The loop never propagates an error: a read failure simply ends it as if
/// the process had exited.
pub(crate) fn spawn_monitor(
    name: String,
    launch_id: LaunchId,
    mut child: Child,
    registry: SharedRegistry,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (Some(stdout), Some(stderr)) = (stdout, stderr) else {
            tracing::error!(server = %name, "Monitor started without piped output");
            return;
        };

        let out_lines = BufReader::new(stdout).lines();
        let err_lines = BufReader::new(stderr).lines();
        let mut merged = futures::stream::select(out_lines, err_lines);

        while let Some(line) = merged.next().await {
            match line {
                Ok(line) => {
                    let trimmed = line.trim_end();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let mut registry = registry.lock().await;
                    if let Some(record) = registry.get_mut(&name) {
                        record.push_log(trimmed);
                    } else {
                        // Record deleted out from under us; stop draining.
                        tracing::debug!(server = %name, "Record gone, ending monitor");
                        break;
                    }
                    if let Err(e) = registry.save() {
                        tracing::warn!(server = %name, error = %e, "Failed to persist log line");
                    }
                }
                Err(e) => {
                    tracing::debug!(server = %name, error = %e, "Read error, ending monitor");
                    break;
                }
            }
        }

        // Both pipes hit EOF (or a read failed): reap the child.
        let exit_note = match child.status().await {
            Ok(status) => match status.code() {
                Some(code) => format!("Server process exited with code {}", code),
                None => "Server process terminated by signal".to_string(),
            },
            Err(e) => format!("Server process exited (wait failed: {})", e),
        };

        let mut registry = registry.lock().await;
        if let Some(record) = registry.get_mut(&name) {
            // Only this launch's monitor may write terminal state; a stop()
            // or a newer launch has already taken over otherwise.
            if record.launch_id == Some(launch_id) {
                record.push_log(&exit_note);
                record.mark_stopped();
                if let Err(e) = registry.save() {
                    tracing::warn!(server = %name, error = %e, "Failed to persist terminal status");
                }
                tracing::info!(server = %name, "Server process exited");
            }
        }
    })
}
