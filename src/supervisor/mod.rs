/// Supervisor module for Server Panel.
///
/// This module launches, monitors, and terminates one OS process per server
/// record, and streams each process's combined output into the record's
/// rolling console log. All public components are instrumented with
/// `tracing` spans.
///
/// # Components
///
/// * `lifecycle` - The start/stop/status operations and their reconciliation
/// * `monitor` - The per-launch background task draining child output
/// * `process` - Command preparation, spawning, and signal delivery
/// * `command` - One-off command execution and the dependency install helper
///
/// # Examples
///
/// Starting and stopping a server:
///
/// ```no_run
/// use server_panel::registry::{Registry, ServerRecord, ServerType};
/// use server_panel::supervisor::{StatusReport, Supervisor};
/// use std::sync::Arc;
/// use tokio::sync::Mutex;
///
/// #[tokio::main]
/// async fn main() -> server_panel::Result<()> {
///     let registry = Arc::new(Mutex::new(Registry::load("servers.json")));
///     let supervisor = Supervisor::new(Arc::clone(&registry), "servers".into());
///
///     supervisor.start("alpha").await?;
///     if let StatusReport::Running { pid, .. } = supervisor.status("alpha").await {
///         println!("alpha is running with pid {}", pid);
///     }
///     supervisor.stop("alpha").await?;
///     Ok(())
/// }
/// ```
pub mod command;
pub mod lifecycle;
mod monitor;
mod process;

pub use lifecycle::{StatusReport, Supervisor};
