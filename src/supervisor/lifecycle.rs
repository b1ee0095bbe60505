use crate::error::{Error, Result};
use crate::registry::{LaunchId, ServerStatus, SharedRegistry};
use crate::supervisor::{command, monitor, process};
use chrono::{DateTime, Utc};
use nix::errno::Errno;
use std::path::PathBuf;
use std::time::Duration;

/// Grace period between the graceful and forceful termination signals.
const GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Result of a status query, reconciled against OS process liveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusReport {
    /// No record exists under the queried name
    NotFound,
    /// The record is stopped (possibly corrected from a stale running state)
    Stopped,
    /// The record is running and its pid is alive
    Running {
        /// OS process id of the live child
        pid: u32,
        /// Time of the most recent launch
        start_time: Option<DateTime<Utc>>,
    },
}

/// Launches, monitors, and terminates one OS process per server record.
///
/// The supervisor owns no state of its own beyond the servers root; every
/// observation and mutation goes through the shared registry, which is the
/// single point of serialization between request handling and the per-launch
/// monitor tasks.
#[derive(Clone)]
pub struct Supervisor {
    /// Shared registry of server records
    registry: SharedRegistry,
    /// Root directory of per-server working directories
    servers_root: PathBuf,
}

impl Supervisor {
    /// Create a new supervisor over a shared registry.
    pub fn new(registry: SharedRegistry, servers_root: PathBuf) -> Self {
        Self {
            registry,
            servers_root,
        }
    }

    /// Working directory for a server name.
    pub fn server_dir(&self, name: &str) -> PathBuf {
        self.servers_root.join(name)
    }

    /// Start the server process for `name`.
    ///
    /// Fails with `ServerNotFound` if no record exists and `AlreadyRunning`
    /// if the record claims to be running (the existing pid and start time
    /// are left untouched). On success the record holds the new pid, start
    /// time, and launch id, the registry is persisted, and a monitor task is
    /// bound to the launched process instance.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(server_name = %name))]
    pub async fn start(&self, name: &str) -> Result<()> {
        tracing::info!("Attempting to start server");

        // Everything from the precondition check to the registry update
        // happens under one lock acquisition, so two concurrent starts
        // cannot both pass the running check. Nothing below awaits.
        let mut registry = self.registry.lock().await;

        let record = registry
            .get(name)
            .ok_or_else(|| Error::ServerNotFound(name.to_string()))?;
        if record.is_running() {
            tracing::debug!("Server already running");
            return Err(Error::AlreadyRunning);
        }
        let record = record.clone();

        let server_dir = self.server_dir(name);
        if let Err(e) = std::fs::create_dir_all(&server_dir) {
            return Err(Error::Io(format!(
                "Failed to create server directory: {}",
                e
            )));
        }

        let child = match process::spawn_server(&record, &server_dir) {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(error = %e, "Failed to start server process");
                if let Some(record) = registry.get_mut(name) {
                    record.push_log(&format!("Error starting server: {}", e));
                }
                if let Err(save_err) = registry.save() {
                    tracing::warn!(error = %save_err, "Failed to persist launch diagnostic");
                }
                return Err(e);
            }
        };

        let pid = child.id();
        let launch_id = LaunchId::new();

        if let Some(record) = registry.get_mut(name) {
            record.mark_started(pid, launch_id);
            record.push_log(&format!("Server started with PID: {}", pid));
        }
        registry.save()?;
        drop(registry);

        monitor::spawn_monitor(name.to_string(), launch_id, child, self.registry.clone());

        tracing::info!(pid = pid, "Server started successfully");
        Ok(())
    }

    /// Stop the server process for `name`.
    ///
    /// Sends SIGTERM to the recorded pid, waits the grace period, then sends
    /// SIGKILL with errors swallowed (the process may have exited during the
    /// window). The record is unconditionally marked stopped afterwards; a
    /// graceful-signal failure other than "no such process" is logged for
    /// diagnosability but never blocks the stop from completing.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(server_name = %name))]
    pub async fn stop(&self, name: &str) -> Result<()> {
        tracing::info!("Attempting to stop server");

        let pid = {
            let registry = self.registry.lock().await;
            let record = registry
                .get(name)
                .ok_or_else(|| Error::ServerNotFound(name.to_string()))?;
            if !record.is_running() {
                tracing::debug!("Server not running");
                return Err(Error::NotRunning);
            }
            record.pid
        };

        if let Some(pid) = pid {
            match process::terminate(pid) {
                Ok(()) => tracing::debug!(pid = pid, "Sent SIGTERM"),
                Err(Errno::ESRCH) => {
                    tracing::debug!(pid = pid, "Process already gone before SIGTERM")
                }
                Err(e) => {
                    // Optimistic stop: record the failure, keep going.
                    let failure = Error::TerminationFailed(format!(
                        "Failed to deliver SIGTERM to pid {}: {}",
                        pid, e
                    ));
                    tracing::warn!(pid = pid, error = %failure, "Graceful termination signal failed");
                    command::append_log(&self.registry, name, &failure.to_string()).await;
                }
            }

            // The registry lock is not held across the grace sleep; monitor
            // tasks keep appending output in the meantime.
            tokio::time::sleep(GRACE_PERIOD).await;
            process::force_kill(pid);
        }

        let mut registry = self.registry.lock().await;
        if let Some(record) = registry.get_mut(name) {
            record.mark_stopped();
            record.push_log("Server stopped");
        }
        registry.save()?;

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Query the status of `name`, reconciling the record against OS
    /// process liveness.
    ///
    /// When the record claims to be running, the recorded pid is probed
    /// with signal-0 semantics; a dead pid corrects the record to stopped
    /// and persists the correction. This is the sole reconciliation path
    /// between recorded state and OS reality, and it only runs on status
    /// reads.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(server_name = %name))]
    pub async fn status(&self, name: &str) -> StatusReport {
        let mut registry = self.registry.lock().await;

        let Some(record) = registry.get(name) else {
            return StatusReport::NotFound;
        };

        if record.status == ServerStatus::Running {
            if let Some(pid) = record.pid {
                if process::probe_alive(pid) {
                    return StatusReport::Running {
                        pid,
                        start_time: record.start_time,
                    };
                }
            }

            // Stale running state: the process died without the record
            // being updated yet. Correct it now.
            tracing::debug!("Recorded pid is gone, correcting record to stopped");
            if let Some(record) = registry.get_mut(name) {
                record.mark_stopped();
            }
            if let Err(e) = registry.save() {
                tracing::warn!(error = %e, "Failed to persist status correction");
            }
        }

        StatusReport::Stopped
    }

    /// Run a one-off command in the server's working directory.
    ///
    /// Independent of the supervised process for the name; both share only
    /// the console log. See [`command`] for the logging contract.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(server_name = %name, command = %cmd))]
    pub async fn run_command(&self, name: &str, cmd: &str) -> Result<()> {
        {
            let registry = self.registry.lock().await;
            if !registry.contains(name) {
                return Err(Error::ServerNotFound(name.to_string()));
            }
        }

        command::run_in_dir(
            &self.registry,
            name,
            &self.server_dir(name),
            cmd,
            command::COMMAND_TIMEOUT,
        )
        .await
    }

    /// Install dependencies from the server's `requirements.txt`, if any.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(server_name = %name))]
    pub async fn install_dependencies(&self, name: &str) -> Result<()> {
        {
            let registry = self.registry.lock().await;
            if !registry.contains(name) {
                return Err(Error::ServerNotFound(name.to_string()));
            }
        }

        command::install_dependencies(&self.registry, name, &self.server_dir(name)).await
    }
}
