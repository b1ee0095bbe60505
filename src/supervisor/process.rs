use crate::error::{Error, Result};
use crate::registry::ServerRecord;
use async_process::{Child, Command, Stdio};
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::path::Path;

/// Split a launch command into argv, normalizing it for the server's
/// working directory.
///
/// `python` is rewritten to `python3`, and a relative app-file argument of a
/// python command is resolved against the working directory so the child can
/// be launched with the directory as cwd regardless of where the panel
/// itself runs.
pub(crate) fn split_command(command: &str, server_dir: &Path) -> Result<Vec<String>> {
    let mut parts: Vec<String> = command.split_whitespace().map(String::from).collect();
    if parts.is_empty() {
        return Err(Error::LaunchFailed("Command is empty".to_string()));
    }

    if parts.len() >= 2 && (parts[0] == "python" || parts[0] == "python3") {
        parts[0] = "python3".to_string();

        let app_file = Path::new(&parts[1]);
        if !app_file.is_absolute() {
            parts[1] = server_dir.join(app_file).display().to_string();
        }
    }

    Ok(parts)
}

/// Build the launch command for a record and spawn it.
///
/// The child runs with the server's directory as its working directory and
/// with `PORT`, `HOST`, and `SERVER_NAME` merged over the inherited
/// environment. Stdout and stderr are piped so the monitor can drain them;
/// stdin is closed.
pub(crate) fn spawn_server(record: &ServerRecord, server_dir: &Path) -> Result<Child> {
    let parts = split_command(&record.command, server_dir)?;

    let mut command = Command::new(&parts[0]);
    command.args(&parts[1..]);
    command.current_dir(server_dir);
    command.env("PORT", record.port.to_string());
    command.env("HOST", &record.host);
    command.env("SERVER_NAME", &record.name);

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    command
        .spawn()
        .map_err(|e| Error::LaunchFailed(format!("Failed to start process: {}", e)))
}

/// Probe whether a process id is alive.
///
/// Uses signal-0 semantics: nothing is delivered, only existence and
/// permission are checked.
pub(crate) fn probe_alive(pid: u32) -> bool {
    match i32::try_from(pid) {
        Ok(raw) => signal::kill(Pid::from_raw(raw), None).is_ok(),
        Err(_) => false,
    }
}

/// Send SIGTERM to a process id.
pub(crate) fn terminate(pid: u32) -> std::result::Result<(), Errno> {
    let raw = i32::try_from(pid).map_err(|_| Errno::EINVAL)?;
    signal::kill(Pid::from_raw(raw), Signal::SIGTERM)
}

/// Send SIGKILL to a process id, swallowing any error.
///
/// The process may already have exited during the grace window, in which
/// case the signal fails with ESRCH; that failure is not surfaced.
pub(crate) fn force_kill(pid: u32) {
    if let Ok(raw) = i32::try_from(pid) {
        let _ = signal::kill(Pid::from_raw(raw), Signal::SIGKILL);
    }
}
