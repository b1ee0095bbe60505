/// Error handling module for Server Panel.
///
/// This module defines the error types used throughout the library.
/// It provides a comprehensive set of errors that can occur when
/// provisioning and supervising server processes, along with helpful
/// context for debugging.
///
/// # Example
///
/// ```
/// use server_panel::error::{Error, Result};
///
/// fn handle_error(result: Result<()>) {
///     match result {
///         Ok(_) => println!("Operation succeeded"),
///         Err(Error::ServerNotFound(name)) => println!("Server '{}' does not exist", name),
///         Err(Error::AlreadyRunning) => println!("Server is already running"),
///         Err(Error::LaunchFailed(msg)) => println!("Launch failed: {}", msg),
///         Err(e) => println!("Other error: {}", e),
///     }
/// }
/// ```
use thiserror::Error;

/// Errors that can occur in the server-panel library.
///
/// This enum represents all possible error types that can be returned from
/// operations in the Server Panel library. Each variant includes context
/// information to help diagnose and handle the error appropriately.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to parse configuration from a file or string.
    ///
    /// This error occurs when:
    /// - The configuration JSON is malformed
    /// - Required fields are missing
    /// - Field types are incorrect
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration is valid JSON but contains invalid values.
    ///
    /// This error occurs when:
    /// - A server name contains path separators or is empty
    /// - A port is outside the allowed range
    /// - A command is empty
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Requested server does not exist in the registry.
    ///
    /// This error occurs when:
    /// - A server name is passed that was never created
    /// - A server was deleted and the caller still holds its name
    #[error("Server not found: {0}")]
    ServerNotFound(String),

    /// The server is already running.
    ///
    /// This error occurs when:
    /// - Attempting to start a server whose record says it is running
    #[error("Already running")]
    AlreadyRunning,

    /// The server is not running.
    ///
    /// This error occurs when:
    /// - Attempting to stop a server whose record says it is stopped
    #[error("Not running")]
    NotRunning,

    /// The child process could not be launched.
    ///
    /// This error occurs when:
    /// - The command is missing or not executable
    /// - Permission is denied
    /// - The working directory cannot be created
    #[error("Launch failed: {0}")]
    LaunchFailed(String),

    /// A termination signal could not be delivered.
    ///
    /// This is reported for diagnosability but never blocks a stop from
    /// completing: the record is still marked stopped.
    #[error("Termination failed: {0}")]
    TerminationFailed(String),

    /// Operation timed out.
    ///
    /// This error occurs when:
    /// - A one-off command exceeds its wall-clock timeout
    /// - A dependency install exceeds its timeout
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Error reading or writing panel state on disk.
    ///
    /// This error occurs when:
    /// - The registry file cannot be written
    /// - A server working directory cannot be created or removed
    /// - An app file cannot be written
    #[error("I/O error: {0}")]
    Io(String),

    /// Unauthorized access error.
    ///
    /// This error occurs when:
    /// - An API request is missing the configured bearer token
    /// - The provided token does not match
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other error not covered by the above categories.
    ///
    /// This is a catch-all error for cases not explicitly handled elsewhere.
    #[error("Other error: {0}")]
    Other(String),
}

/// Result type for server-panel operations.
///
/// This is a convenience type alias for `std::result::Result` with the `Error` type
/// from this module. Use this throughout the library and in client code to handle
/// errors in a consistent way.
pub type Result<T> = std::result::Result<T, Error>;
