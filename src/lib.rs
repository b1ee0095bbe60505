/*!
 # Server Panel

 A Rust library for provisioning, supervising and monitoring small server
 processes (Flask apps, WSGI workers, plain HTTP servers, bot processes) on
 a single host.

 ## Overview

 Server Panel provides functionality to:
 - Create and delete named servers, each with its own working directory
 - Start, stop, and monitor server processes
 - Stream each process's combined output into a rolling console log
 - Run one-off commands in a server's working directory
 - Optionally expose the panel's operations over an HTTP control API

 ## Basic Usage

 ```no_run
 use server_panel::{Result, ServerPanel};
 use server_panel::registry::ServerType;

 #[tokio::main]
 async fn main() -> Result<()> {
     // Create a panel from a config file
     let panel = ServerPanel::from_config_file("panel.json")?;

     // Provision a server with a default Flask app
     panel.create_server("alpha", "0.0.0.0", 9001, ServerType::Flask).await?;

     // Start it and inspect its status
     panel.start_server("alpha").await?;
     let status = panel.server_status("alpha").await;
     println!("alpha: {:?}", status);

     // Tail its console log
     for line in panel.console_logs("alpha", 50).await? {
         println!("{}", line);
     }

     // Stop it again
     panel.stop_server("alpha").await?;

     Ok(())
 }
 ```

 ## Features

 - **Provisioning**: Per-server working directories with templated app files
 - **Supervision**: Start, stop, and status with OS-liveness reconciliation
 - **Console Logs**: Rolling, timestamped, persisted per-server logs
 - **One-Off Commands**: Timeout-bounded command execution per server
 - **Durable Registry**: Full state persisted as a single JSON file
 - **Control API**: Optional Actix Web API with bearer authentication

 ## License

 This project is licensed under the terms in the LICENSE file.
*/

pub mod api;
pub mod config;
pub mod error;
pub mod registry;
pub mod supervisor;
pub mod templates;

pub use api::ApiHandle;
pub use config::Config;
pub use error::{Error, Result};
pub use registry::{Registry, ServerRecord, ServerStatus, ServerType};
pub use supervisor::{StatusReport, Supervisor};

use registry::SharedRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Provision and supervise server processes
///
/// This struct is the main entry point for managing server lifecycles and
/// the durable registry behind them.
/// All public methods are instrumented with `tracing` spans.
pub struct ServerPanel {
    /// Configuration
    config: Config,
    /// Shared registry of server records
    registry: SharedRegistry,
    /// Supervisor over the shared registry
    supervisor: Supervisor,
    /// Control API handle (if running)
    api_handle: Option<ApiHandle>,
}

impl ServerPanel {
    /// Create a new panel from a configuration file path
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(path), fields(config_path = ?path.as_ref()))]
    pub fn from_config_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        tracing::info!("Loading configuration from file");
        let config = Config::from_file(path)?;
        Ok(Self::new(config))
    }

    /// Create a new panel from a configuration string
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(config))]
    pub fn from_config_str(config: &str) -> Result<Self> {
        tracing::info!("Loading configuration from string");
        let config = Config::parse_from_str(config)?;
        Ok(Self::new(config))
    }

    /// Create a new panel from a configuration
    ///
    /// Loads the persisted registry (an unreadable or missing file starts
    /// empty) and builds the supervisor over it.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(config))]
    pub fn new(config: Config) -> Self {
        tracing::info!("Creating new ServerPanel");
        let registry = Arc::new(Mutex::new(Registry::load(&config.registry_file)));
        let supervisor = Supervisor::new(Arc::clone(&registry), config.servers_root.clone());
        Self {
            config,
            registry,
            supervisor,
            api_handle: None,
        }
    }

    /// Create a server with a templated app file
    ///
    /// Allocates the working directory, renders the default app file for the
    /// server type, inserts a stopped record into the registry, and persists.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(server_name = %name))]
    pub async fn create_server(
        &self,
        name: &str,
        host: &str,
        port: u16,
        server_type: ServerType,
    ) -> Result<()> {
        config::validate_server_name(name)?;

        let app_file = templates::DEFAULT_APP_FILE;
        let command = templates::launch_command(server_type, host, port, app_file)
            .ok_or_else(|| {
                Error::ConfigInvalid(
                    "Custom servers need an explicit command; use add_server".to_string(),
                )
            })?;

        let mut registry = self.registry.lock().await;
        if registry.contains(name) {
            tracing::debug!("Server name already exists");
            return Err(Error::ConfigInvalid(format!(
                "Server '{}' already exists",
                name
            )));
        }

        let server_dir = self.server_dir(name);
        std::fs::create_dir_all(&server_dir)
            .map_err(|e| Error::Io(format!("Failed to create server directory: {}", e)))?;

        if let Some(contents) = templates::app_file_contents(server_type, name, port) {
            std::fs::write(server_dir.join(app_file), contents)
                .map_err(|e| Error::Io(format!("Failed to write app file: {}", e)))?;
        }

        registry.upsert(ServerRecord::new(
            name.to_string(),
            host.to_string(),
            port,
            command,
            server_type,
            Some(app_file.to_string()),
        ));
        registry.save()?;

        tracing::info!("Server created successfully");
        Ok(())
    }

    /// Create a server with a caller-supplied command
    ///
    /// Like [`create_server`](Self::create_server), but no app file is
    /// rendered: the command is taken as-is and the server type is recorded
    /// as custom.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(server_name = %name))]
    pub async fn add_server(
        &self,
        name: &str,
        host: &str,
        port: u16,
        command: &str,
    ) -> Result<()> {
        config::validate_server_name(name)?;
        config::validate_command(name, command)?;

        let mut registry = self.registry.lock().await;
        if registry.contains(name) {
            tracing::debug!("Server name already exists");
            return Err(Error::ConfigInvalid(format!(
                "Server '{}' already exists",
                name
            )));
        }

        let server_dir = self.server_dir(name);
        std::fs::create_dir_all(&server_dir)
            .map_err(|e| Error::Io(format!("Failed to create server directory: {}", e)))?;

        registry.upsert(ServerRecord::new(
            name.to_string(),
            host.to_string(),
            port,
            command.to_string(),
            ServerType::Custom,
            None,
        ));
        registry.save()?;

        tracing::info!("Server added successfully");
        Ok(())
    }

    /// Delete a server
    ///
    /// Stops the process first if the record claims to be running (best
    /// effort), removes the working directory, removes the registry entry,
    /// and persists.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(server_name = %name))]
    pub async fn delete_server(&self, name: &str) -> Result<()> {
        let running = {
            let registry = self.registry.lock().await;
            registry
                .get(name)
                .ok_or_else(|| Error::ServerNotFound(name.to_string()))?
                .is_running()
        };

        if running {
            if let Err(e) = self.supervisor.stop(name).await {
                tracing::warn!(error = %e, "Failed to stop server before delete, continuing");
            }
        }

        let server_dir = self.server_dir(name);
        if server_dir.exists() {
            std::fs::remove_dir_all(&server_dir)
                .map_err(|e| Error::Io(format!("Failed to remove server directory: {}", e)))?;
        }

        let mut registry = self.registry.lock().await;
        registry.remove(name)?;
        registry.save()?;

        tracing::info!("Server deleted successfully");
        Ok(())
    }

    /// Start a server's process
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(server_name = %name))]
    pub async fn start_server(&self, name: &str) -> Result<()> {
        self.supervisor.start(name).await
    }

    /// Stop a server's process
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(server_name = %name))]
    pub async fn stop_server(&self, name: &str) -> Result<()> {
        self.supervisor.stop(name).await
    }

    /// Get a server's status, reconciled against OS process liveness
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(server_name = %name))]
    pub async fn server_status(&self, name: &str) -> StatusReport {
        self.supervisor.status(name).await
    }

    /// Run a one-off command in a server's working directory
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self, command), fields(server_name = %name))]
    pub async fn run_command(&self, name: &str, command: &str) -> Result<()> {
        self.supervisor.run_command(name, command).await
    }

    /// Install dependencies from a server's `requirements.txt`, if present
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(server_name = %name))]
    pub async fn install_dependencies(&self, name: &str) -> Result<()> {
        self.supervisor.install_dependencies(name).await
    }

    /// Get the most recent `lines` console log entries for a server
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(server_name = %name))]
    pub async fn console_logs(&self, name: &str, lines: usize) -> Result<Vec<String>> {
        let registry = self.registry.lock().await;
        registry
            .get(name)
            .map(|record| record.log_tail(lines))
            .ok_or_else(|| Error::ServerNotFound(name.to_string()))
    }

    /// Get a snapshot of all server records
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self))]
    pub async fn list_servers(&self) -> Vec<ServerRecord> {
        let registry = self.registry.lock().await;
        registry.list().cloned().collect()
    }

    /// Get a snapshot of one server record
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(server_name = %name))]
    pub async fn server_record(&self, name: &str) -> Result<ServerRecord> {
        let registry = self.registry.lock().await;
        registry
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ServerNotFound(name.to_string()))
    }

    /// Stop every running server, and the control API if it is running
    ///
    /// Collects all errors but only returns the first one encountered.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self))]
    pub async fn stop_all_servers(&mut self) -> Result<()> {
        tracing::info!("Stopping all servers and API if running");

        if let Some(api_handle) = self.api_handle.take() {
            tracing::info!("Stopping control API");
            if let Err(e) = api_handle.shutdown().await {
                tracing::warn!(error = %e, "Error shutting down control API");
                // We continue anyway since we're in the process of clean-up
            }
        }

        let running: Vec<String> = {
            let registry = self.registry.lock().await;
            registry
                .list()
                .filter(|record| record.is_running())
                .map(|record| record.name.clone())
                .collect()
        };

        let mut errors = Vec::new();
        for name in running {
            if let Err(e) = self.supervisor.stop(&name).await {
                tracing::error!(server_name = %name, error = %e, "Failed to stop server");
                errors.push((name, e));
            }
        }

        if errors.is_empty() {
            tracing::info!("All servers stopped successfully");
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0).1)
        } else {
            let error_msg = errors
                .iter()
                .map(|(name, e)| format!("{}: {}", name, e))
                .collect::<Vec<_>>()
                .join("; ");
            Err(Error::Other(format!(
                "Multiple servers failed to stop: {}",
                error_msg
            )))
        }
    }

    /// Start the control API server if configured
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self))]
    pub async fn start_api(&mut self) -> Result<()> {
        if let Some(api_config) = self.config.api.clone() {
            tracing::info!("Initializing control API server");
            let handle = api::ApiServer::start(self.clone(), api_config.clone()).await?;
            self.api_handle = Some(handle);
            tracing::info!(
                "Control API server started on {}:{}",
                api_config.address,
                api_config.port
            );
            Ok(())
        } else {
            tracing::warn!("Control API not configured, skipping start");
            Err(Error::Other("Control API not configured in config".to_string()))
        }
    }

    /// Check if the control API is enabled in configuration
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self))]
    pub fn is_api_configured(&self) -> bool {
        self.config.api.is_some()
    }

    /// Get the running control API handle if it exists
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self))]
    pub fn api_handle(&self) -> Result<&ApiHandle> {
        self.api_handle.as_ref().ok_or_else(|| {
            tracing::warn!("API handle requested but no API is running");
            Error::Other("Control API not running".to_string())
        })
    }

    /// The panel configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Working directory for a server name.
    fn server_dir(&self, name: &str) -> PathBuf {
        self.config.servers_root.join(name)
    }
}

impl Clone for ServerPanel {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            registry: Arc::clone(&self.registry),
            supervisor: self.supervisor.clone(),
            api_handle: None, // We don't clone the handle as it can't be cleanly cloned
        }
    }
}
