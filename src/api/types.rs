//! Request and response types for the control API.

use crate::registry::{ServerRecord, ServerStatus, ServerType};
use crate::supervisor::StatusReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of one server record as returned by the list endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSummary {
    /// Server name
    pub name: String,
    /// Host address the child binds to
    pub host: String,
    /// Port the child binds to
    pub port: u16,
    /// Kind of server
    pub server_type: ServerType,
    /// Recorded status
    pub status: ServerStatus,
    /// Recorded pid, if running
    pub pid: Option<u32>,
    /// Time of the most recent launch
    pub start_time: Option<DateTime<Utc>>,
}

impl From<&ServerRecord> for ServerSummary {
    fn from(record: &ServerRecord) -> Self {
        Self {
            name: record.name.clone(),
            host: record.host.clone(),
            port: record.port,
            server_type: record.server_type,
            status: record.status,
            pid: record.pid,
            start_time: record.start_time,
        }
    }
}

/// Request body for creating a server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServerRequest {
    /// Server name
    pub name: String,
    /// Host address; defaults to all interfaces
    #[serde(default = "default_host")]
    pub host: String,
    /// Port the child binds to
    pub port: u16,
    /// Kind of server
    pub server_type: ServerType,
    /// Launch command, required for custom servers
    #[serde(default)]
    pub command: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Request body for a one-off command.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    /// Command line to run through the shell
    pub command: String,
}

/// Query parameters for the console log endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsQuery {
    /// Number of most recent lines to return; defaults to 50
    #[serde(default)]
    pub lines: Option<usize>,
}

/// Response body for the console log endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsResponse {
    /// Most recent log lines, oldest first
    pub logs: Vec<String>,
}

/// Response body for the status endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// One of `not_found`, `stopped`, `running`
    pub status: String,
    /// Pid of the live process, present only when running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    /// Time of the most recent launch, present only when running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
}

impl From<StatusReport> for StatusResponse {
    fn from(report: StatusReport) -> Self {
        match report {
            StatusReport::NotFound => Self {
                status: "not_found".to_string(),
                pid: None,
                start_time: None,
            },
            StatusReport::Stopped => Self {
                status: "stopped".to_string(),
                pid: None,
                start_time: None,
            },
            StatusReport::Running { pid, start_time } => Self {
                status: "running".to_string(),
                pid: Some(pid),
                start_time,
            },
        }
    }
}

/// Generic success/message response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMessage {
    /// Whether the operation succeeded
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
}

impl ApiMessage {
    /// A success response with the given message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
