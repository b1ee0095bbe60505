//! HTTP request handlers for the control API.
//!
//! Each handler is a thin adapter from HTTP to a [`ServerPanel`] operation;
//! domain errors map to HTTP statuses through the `ResponseError`
//! implementation in [`actix_error`](crate::api::actix_error).

use crate::ServerPanel;
use crate::api::actix_error::ApiError;
use crate::api::types::{
    ApiMessage, CommandRequest, CreateServerRequest, LogsQuery, LogsResponse, ServerSummary,
    StatusResponse,
};
use crate::error::Result;
use crate::registry::ServerType;

use actix_web::{
    HttpResponse, Responder,
    web::{Data, Json, Path, Query},
};
use tracing;

/// Number of console log lines returned when the query doesn't say.
const DEFAULT_LOG_LINES: usize = 50;

/// List all server records.
pub async fn list_servers(panel: Data<ServerPanel>) -> impl Responder {
    tracing::debug!("Listing servers");
    let summaries: Vec<ServerSummary> = panel
        .list_servers()
        .await
        .iter()
        .map(ServerSummary::from)
        .collect();
    Json(summaries)
}

/// Create a server.
///
/// Templated types get a rendered app file; custom servers must supply a
/// command.
pub async fn create_server(
    panel: Data<ServerPanel>,
    body: Json<CreateServerRequest>,
) -> std::result::Result<impl Responder, ApiError> {
    let req = body.into_inner();
    tracing::info!(server = %req.name, server_type = ?req.server_type, "Creating server");

    if req.server_type == ServerType::Custom {
        let command = req.command.as_deref().unwrap_or("").trim();
        if command.is_empty() {
            return Err(ApiError::InvalidRequest(
                "Custom servers require a command".to_string(),
            ));
        }
        panel
            .add_server(&req.name, &req.host, req.port, command)
            .await?;
    } else {
        panel
            .create_server(&req.name, &req.host, req.port, req.server_type)
            .await?;
    }

    Ok(HttpResponse::Created().json(ApiMessage::ok(format!(
        "Server \"{}\" created successfully",
        req.name
    ))))
}

/// Delete a server, stopping it first if running.
pub async fn delete_server(
    panel: Data<ServerPanel>,
    name: Path<String>,
) -> Result<impl Responder> {
    tracing::info!(server = %name, "Deleting server");
    panel.delete_server(&name).await?;
    Ok(Json(ApiMessage::ok(format!(
        "Server \"{}\" deleted successfully",
        name
    ))))
}

/// Start a server's process.
pub async fn start_server(panel: Data<ServerPanel>, name: Path<String>) -> Result<impl Responder> {
    tracing::info!(server = %name, "Starting server");
    panel.start_server(&name).await?;
    Ok(Json(ApiMessage::ok(format!(
        "Server \"{}\" started successfully",
        name
    ))))
}

/// Stop a server's process.
pub async fn stop_server(panel: Data<ServerPanel>, name: Path<String>) -> Result<impl Responder> {
    tracing::info!(server = %name, "Stopping server");
    panel.stop_server(&name).await?;
    Ok(Json(ApiMessage::ok(format!(
        "Server \"{}\" stopped successfully",
        name
    ))))
}

/// Get a server's reconciled status.
///
/// Unknown names are reported in the body (`status: not_found`) rather than
/// as an HTTP error, so pollers can treat deletion like any other state.
pub async fn server_status(panel: Data<ServerPanel>, name: Path<String>) -> impl Responder {
    tracing::debug!(server = %name, "Querying server status");
    let report = panel.server_status(&name).await;
    Json(StatusResponse::from(report))
}

/// Get the tail of a server's console log.
pub async fn console_logs(
    panel: Data<ServerPanel>,
    name: Path<String>,
    query: Query<LogsQuery>,
) -> Result<impl Responder> {
    let lines = query.lines.unwrap_or(DEFAULT_LOG_LINES);
    let logs = panel.console_logs(&name, lines).await?;
    Ok(Json(LogsResponse { logs }))
}

/// Run a one-off command in the server's working directory.
pub async fn run_command(
    panel: Data<ServerPanel>,
    name: Path<String>,
    body: Json<CommandRequest>,
) -> std::result::Result<impl Responder, ApiError> {
    let command = body.command.trim();
    if command.is_empty() {
        return Err(ApiError::InvalidRequest("No command provided".to_string()));
    }

    tracing::info!(server = %name, "Running one-off command");
    panel.run_command(&name, command).await?;
    Ok(Json(ApiMessage::ok("Command executed; output in console log")))
}

/// Install dependencies from the server's requirements file.
pub async fn install_dependencies(
    panel: Data<ServerPanel>,
    name: Path<String>,
) -> Result<impl Responder> {
    tracing::info!(server = %name, "Installing dependencies");
    panel.install_dependencies(&name).await?;
    Ok(Json(ApiMessage::ok(
        "Dependency install finished; output in console log",
    )))
}
