use crate::config::Config;
use crate::error::{Error, Result};

/// Validates a server name.
///
/// Names become directory names under the servers root and keys in the
/// registry file, so they must be non-empty, reasonably short, and free of
/// path separators or anything else that could escape the root.
pub fn validate_server_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::ConfigInvalid("Server name is empty".to_string()));
    }

    if name.len() > 64 {
        return Err(Error::ConfigInvalid(format!(
            "Server name '{}' is longer than 64 characters",
            name
        )));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::ConfigInvalid(format!(
            "Server name '{}' may only contain alphanumerics, '-' and '_'",
            name
        )));
    }

    Ok(())
}

/// Validates a launch command.
pub fn validate_command(name: &str, command: &str) -> Result<()> {
    if command.trim().is_empty() {
        return Err(Error::ConfigInvalid(format!(
            "Server '{}' has empty command",
            name
        )));
    }

    Ok(())
}

/// Full configuration validation.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(api) = &config.api {
        if api.address.is_empty() {
            return Err(Error::ConfigInvalid("API address is empty".to_string()));
        }
        if api.port == 0 {
            return Err(Error::ConfigInvalid("API port must be non-zero".to_string()));
        }
        if let Some(workers) = api.workers {
            if workers == 0 {
                return Err(Error::ConfigInvalid(
                    "API workers must be non-zero".to_string(),
                ));
            }
        }
    }

    Ok(())
}
