//! Configuration module for Server Panel.
//!
//! This module handles parsing, validation, and access to configuration
//! settings for the panel. It supports loading configurations from files
//! or strings in JSON format.
//!
//! # Examples
//!
//! Loading a configuration from a file:
//!
//! ```no_run
//! use server_panel::config::Config;
//!
//! let config = Config::from_file("panel.json").unwrap();
//! println!("Servers root: {}", config.servers_root.display());
//! ```
//!
//! Creating a configuration programmatically:
//! ```
//! use server_panel::config::Config;
//!
//! let config = Config {
//!     servers_root: "servers".into(),
//!     registry_file: "servers.json".into(),
//!     // api is optional, so we can use None
//!     api: None,
//! };
//! ```
mod parser;
pub mod validator;

pub use parser::{ApiConfig, AuthConfig, BearerAuthConfig, Config, DEFAULT_WORKERS};
pub use validator::{validate_command, validate_config, validate_server_name};
