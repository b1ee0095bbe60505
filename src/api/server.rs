//! Control API server and its handle.
//!
//! This module contains the Actix Web server setup for the control API and
//! the handle used to stop it again.

use crate::ServerPanel;
use crate::api::auth::Authentication;
use crate::api::handlers;
use crate::config::{ApiConfig, DEFAULT_WORKERS};
use crate::error::{Error, Result};

use actix_cors::Cors;
use actix_web::{
    App, HttpServer, dev, middleware,
    web::{self, Data},
};

use std::net::ToSocketAddrs;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing;

/// Handle for controlling the running API server.
///
/// This handle is stored by the panel to stop the API without needing
/// access to the server task directly.
#[derive(Clone)]
pub struct ApiHandle {
    /// Actix server handle for graceful shutdown
    server_handle: dev::ServerHandle,
    /// Server task handle
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
    /// Configuration the server was started with
    config: ApiConfig,
}

impl ApiHandle {
    fn new(server_handle: dev::ServerHandle, task: JoinHandle<()>, config: ApiConfig) -> Self {
        Self {
            server_handle,
            task: Arc::new(Mutex::new(Some(task))),
            config,
        }
    }

    /// Shut the API server down gracefully.
    pub async fn shutdown(&self) -> Result<()> {
        self.server_handle.stop(true).await;

        // Wait for the server task to finish
        let mut task = self.task.lock().await;
        if let Some(handle) = task.take() {
            // Wait with a timeout
            match tokio::time::timeout(std::time::Duration::from_secs(5), handle).await {
                Ok(result) => {
                    if let Err(e) = result {
                        tracing::warn!("Error while joining API server task: {}", e);
                    }
                }
                Err(_) => {
                    tracing::warn!("Timeout waiting for API server task to finish");
                }
            }
        }

        Ok(())
    }

    /// Get the API configuration
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

/// Control API server for the panel.
///
/// Exposes the panel's operations over HTTP with bearer authentication and
/// CORS, using Actix Web.
pub struct ApiServer;

impl ApiServer {
    /// Start the control API server.
    ///
    /// Binds, spawns the server in a background task, and returns a handle
    /// that can be used to stop it.
    ///
    /// # Arguments
    ///
    /// * `panel` - A panel clone the handlers operate through
    /// * `config` - Configuration for the API server
    ///
    /// # Returns
    ///
    /// A `Result` containing an `ApiHandle` or an error
    pub async fn start(panel: ServerPanel, config: ApiConfig) -> Result<ApiHandle> {
        // Parse the socket address from the config
        let addr_str = format!("{}:{}", config.address, config.port);
        let addr = addr_str
            .to_socket_addrs()
            .map_err(|e| Error::Other(format!("Failed to parse socket address: {}", e)))?
            .next()
            .ok_or_else(|| {
                Error::Other(format!("Could not parse socket address: {}", addr_str))
            })?;

        tracing::info!(address = %addr_str, "Starting control API server with Actix Web");

        let panel_data = Data::new(panel);
        let config_arc = Arc::new(config.clone());

        let mut server_builder = HttpServer::new(move || {
            // Configure CORS
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            // Configure authentication middleware if required
            let auth_middleware = Authentication::new(config_arc.clone());

            App::new()
                .wrap(middleware::Logger::default())
                .wrap(cors)
                .app_data(panel_data.clone())
                // Apply Authentication middleware unconditionally; its internal logic handles conditions
                .wrap(auth_middleware)
                // Define routes
                .route("/api/servers", web::get().to(handlers::list_servers))
                .route("/api/servers", web::post().to(handlers::create_server))
                .route(
                    "/api/servers/{name}",
                    web::delete().to(handlers::delete_server),
                )
                .route(
                    "/api/servers/{name}/start",
                    web::post().to(handlers::start_server),
                )
                .route(
                    "/api/servers/{name}/stop",
                    web::post().to(handlers::stop_server),
                )
                .route(
                    "/api/servers/{name}/status",
                    web::get().to(handlers::server_status),
                )
                .route(
                    "/api/servers/{name}/logs",
                    web::get().to(handlers::console_logs),
                )
                .route(
                    "/api/servers/{name}/command",
                    web::post().to(handlers::run_command),
                )
                .route(
                    "/api/servers/{name}/install",
                    web::post().to(handlers::install_dependencies),
                )
        });

        // Configure workers - use the config value if specified, otherwise the default
        let workers = config.workers.unwrap_or(DEFAULT_WORKERS);
        tracing::info!(workers = workers, "Setting number of Actix Web workers");
        server_builder = server_builder.workers(workers);

        // Bind to the address
        let server = server_builder
            .bind(addr)
            .map_err(|e| Error::Other(format!("Failed to bind server: {}", e)))?
            .run();

        // Get the server handle for stopping later
        let server_handle = server.handle();

        // Run the Actix server in a background task
        let task = tokio::spawn(async move {
            if let Err(e) = server.await {
                tracing::error!(error = %e, "Control API server error");
            }
            tracing::info!("Control API server shut down");
        });

        tracing::info!("Control API server started successfully");

        Ok(ApiHandle::new(server_handle, task, config))
    }
}
