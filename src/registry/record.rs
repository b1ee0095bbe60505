use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use uuid::Uuid;

/// Maximum number of console log lines retained per server.
///
/// The log is a rolling window: appending a line beyond this capacity evicts
/// the oldest line first.
pub const LOG_CAPACITY: usize = 500;

/// Unique identifier for a single launch of a server process.
///
/// A fresh id is minted every time a server is started. The monitor task for
/// a launch carries its id and only writes terminal state back to the record
/// while the record still holds the same id, so a monitor left over from an
/// earlier launch can never clobber the state of a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaunchId(Uuid);

impl LaunchId {
    // Private constructor, only usable within our crate
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for LaunchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recorded status of a server.
///
/// This is the persisted view; it may lag OS reality until the next
/// reconciliation (a status read, or the monitor observing process exit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    /// Server process is not running
    Stopped,
    /// Server process was launched and has not been observed to exit
    Running,
}

/// Kind of server a record describes.
///
/// The type selects the default app file rendered at creation time and the
/// launch command built for it. `Custom` servers supply their own command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerType {
    /// Flask development server
    Flask,
    /// Flask app served by gunicorn
    Gunicorn,
    /// Plain Python HTTP server
    PythonHttp,
    /// Caller-supplied command
    Custom,
}

/// One managed server: the registry's stored description of a supervised
/// child process.
///
/// Invariant: `pid` is non-null iff `status == Running` immediately after a
/// reconciliation pass. Between passes the pair may be stale (the process can
/// die without the record being updated yet); this is corrected lazily on the
/// next status read rather than eagerly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRecord {
    /// Unique server name, immutable once created
    pub name: String,
    /// Host address injected into the child environment
    pub host: String,
    /// Port injected into the child environment
    pub port: u16,
    /// Command executed when the server is started
    pub command: String,
    /// Kind of server this record describes
    pub server_type: ServerType,
    /// App file rendered at creation time, if any
    #[serde(default)]
    pub app_file: Option<String>,
    /// Recorded status
    pub status: ServerStatus,
    /// OS process id of the running child, if any
    #[serde(default)]
    pub pid: Option<u32>,
    /// Time of the most recent launch
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// Id of the most recent launch
    #[serde(default)]
    pub launch_id: Option<LaunchId>,
    /// Rolling console log, most recent `LOG_CAPACITY` lines
    #[serde(default)]
    pub console_logs: VecDeque<String>,
}

impl ServerRecord {
    /// Create a new stopped record.
    pub fn new(
        name: String,
        host: String,
        port: u16,
        command: String,
        server_type: ServerType,
        app_file: Option<String>,
    ) -> Self {
        Self {
            name,
            host,
            port,
            command,
            server_type,
            app_file,
            status: ServerStatus::Stopped,
            pid: None,
            start_time: None,
            launch_id: None,
            console_logs: VecDeque::new(),
        }
    }

    /// Whether the record currently claims to be running.
    pub fn is_running(&self) -> bool {
        self.status == ServerStatus::Running
    }

    /// Append a timestamped line to the console log, evicting the oldest
    /// line once the log is at capacity.
    pub fn push_log(&mut self, message: &str) {
        let timestamp = Local::now().format("%H:%M:%S");
        self.console_logs.push_back(format!("[{}] {}", timestamp, message));
        while self.console_logs.len() > LOG_CAPACITY {
            self.console_logs.pop_front();
        }
    }

    /// Return the most recent `lines` log entries, oldest first.
    pub fn log_tail(&self, lines: usize) -> Vec<String> {
        let skip = self.console_logs.len().saturating_sub(lines);
        self.console_logs.iter().skip(skip).cloned().collect()
    }

    /// Record a successful launch.
    pub fn mark_started(&mut self, pid: u32, launch_id: LaunchId) {
        self.pid = Some(pid);
        self.status = ServerStatus::Running;
        self.start_time = Some(Utc::now());
        self.launch_id = Some(launch_id);
    }

    /// Record termination: clears the pid and launch id and sets the status
    /// back to stopped.
    pub fn mark_stopped(&mut self) {
        self.status = ServerStatus::Stopped;
        self.pid = None;
        self.launch_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ServerRecord {
        ServerRecord::new(
            "alpha".to_string(),
            "0.0.0.0".to_string(),
            9001,
            "python3 app.py".to_string(),
            ServerType::Flask,
            Some("app.py".to_string()),
        )
    }

    #[test]
    fn test_push_log_is_timestamped() {
        let mut rec = record();
        rec.push_log("hello");
        assert_eq!(rec.console_logs.len(), 1);
        let line = &rec.console_logs[0];
        assert!(line.starts_with('['), "line should start with a timestamp: {}", line);
        assert!(line.ends_with("] hello"), "unexpected line: {}", line);
    }

    #[test]
    fn test_log_capacity_evicts_oldest() {
        let mut rec = record();
        for i in 0..LOG_CAPACITY + 1 {
            rec.push_log(&format!("line {}", i));
        }
        assert_eq!(rec.console_logs.len(), LOG_CAPACITY);
        assert!(rec.console_logs[0].ends_with("line 1"));
        assert!(
            rec.console_logs[LOG_CAPACITY - 1].ends_with(&format!("line {}", LOG_CAPACITY))
        );
    }

    #[test]
    fn test_log_tail_returns_most_recent() {
        let mut rec = record();
        for i in 0..10 {
            rec.push_log(&format!("line {}", i));
        }
        let tail = rec.log_tail(3);
        assert_eq!(tail.len(), 3);
        assert!(tail[0].ends_with("line 7"));
        assert!(tail[2].ends_with("line 9"));
    }

    #[test]
    fn test_mark_started_and_stopped() {
        let mut rec = record();
        rec.mark_started(4242, LaunchId::new());
        assert!(rec.is_running());
        assert_eq!(rec.pid, Some(4242));
        assert!(rec.start_time.is_some());
        assert!(rec.launch_id.is_some());

        rec.mark_stopped();
        assert!(!rec.is_running());
        assert_eq!(rec.pid, None);
        assert_eq!(rec.launch_id, None);
    }
}
