use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of Actix Web workers for the control API.
pub const DEFAULT_WORKERS: usize = 4;

/// Configuration for the optional HTTP control API.
///
/// When present, the panel can expose its operations (list, create, start,
/// stop, status, logs, one-off commands) over HTTP. Requests are checked
/// against the configured bearer token when authentication is enabled.
///
/// # Examples
///
/// ```
/// use server_panel::config::{ApiConfig, AuthConfig, BearerAuthConfig};
///
/// let api_config = ApiConfig {
///     address: "127.0.0.1".to_string(),
///     port: 5010,
///     workers: Some(2),
///     authenticate: Some(AuthConfig {
///         bearer: Some(BearerAuthConfig {
///             token: "secret-token".to_string(),
///         }),
///     }),
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Address the API binds to.
    pub address: String,

    /// Port the API binds to.
    pub port: u16,

    /// Number of Actix Web workers; defaults to `DEFAULT_WORKERS`.
    #[serde(default)]
    pub workers: Option<usize>,

    /// Authentication settings; `None` disables authentication.
    #[serde(default)]
    pub authenticate: Option<AuthConfig>,
}

/// Authentication configuration for the control API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    /// Bearer token authentication.
    #[serde(default)]
    pub bearer: Option<BearerAuthConfig>,
}

/// Static bearer token checked against the `Authorization` header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BearerAuthConfig {
    /// The expected token value.
    pub token: String,
}

/// Main configuration for the Server Panel.
///
/// # JSON Schema
///
/// The configuration follows this JSON schema:
///
/// ```json
/// {
///   "serversRoot": "servers",
///   "registryFile": "servers.json",
///   "api": {
///     "address": "0.0.0.0",
///     "port": 5010,
///     "workers": 2,
///     "authenticate": {
///       "bearer": { "token": "secret-token" }
///     }
///   }
/// }
/// ```
///
/// Every field has a default, so `{}` is a valid configuration: servers live
/// under `servers/`, the registry persists to `servers.json`, and no API is
/// started.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Root directory under which each server gets a working directory
    /// named after it.
    #[serde(default = "default_servers_root")]
    pub servers_root: PathBuf,

    /// Path of the persisted registry file.
    #[serde(default = "default_registry_file")]
    pub registry_file: PathBuf,

    /// Optional HTTP control API.
    #[serde(default)]
    pub api: Option<ApiConfig>,
}

fn default_servers_root() -> PathBuf {
    PathBuf::from("servers")
}

fn default_registry_file() -> PathBuf {
    PathBuf::from("servers.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            servers_root: default_servers_root(),
            registry_file: default_registry_file(),
            api: None,
        }
    }
}

impl Config {
    /// Loads a configuration from a file path.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The file cannot be read
    /// * The file contents are not valid JSON
    /// * The JSON does not conform to the expected schema
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigParse(format!("Failed to read config file: {}", e)))?;

        Self::parse_from_str(&content)
    }

    /// Parses a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The string is not valid JSON
    /// * The JSON does not conform to the expected schema
    pub fn parse_from_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::ConfigParse(format!("Failed to parse JSON config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_panel_config() {
        let config_str = r#"{
            "serversRoot": "my-servers",
            "registryFile": "state/servers.json",
            "api": {
                "address": "127.0.0.1",
                "port": 5010,
                "authenticate": {
                    "bearer": { "token": "secret" }
                }
            }
        }"#;

        let config = Config::parse_from_str(config_str).unwrap();

        assert_eq!(config.servers_root, PathBuf::from("my-servers"));
        assert_eq!(config.registry_file, PathBuf::from("state/servers.json"));

        let api = config.api.expect("api block should be present");
        assert_eq!(api.address, "127.0.0.1");
        assert_eq!(api.port, 5010);
        assert_eq!(api.workers, None);
        let token = api.authenticate.unwrap().bearer.unwrap().token;
        assert_eq!(token, "secret");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse_from_str("{}").unwrap();
        assert_eq!(config.servers_root, PathBuf::from("servers"));
        assert_eq!(config.registry_file, PathBuf::from("servers.json"));
        assert!(config.api.is_none());
    }
}
