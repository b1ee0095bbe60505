//! Registry module for Server Panel.
//!
//! This module is the durable system of record for servers managed by the
//! panel. It maps server names to [`ServerRecord`] entries (bind address,
//! launch command, status, process id, start time, rolling console log) and
//! persists the whole map as a single JSON file that is rewritten after every
//! mutation.
//!
//! Load failures are recovered by starting with an empty store: the registry
//! is not the system of record for anything externally critical, and the
//! child processes themselves are unaffected by registry loss.
//!
//! # Components
//!
//! * `record` - The per-server record, its status enum and rolling log
//! * `store` - The persisted name → record map and its shared handle
//!
//! # Examples
//!
//! ```no_run
//! use server_panel::registry::{Registry, ServerRecord, ServerType};
//!
//! let mut registry = Registry::load("servers.json");
//! let record = ServerRecord::new(
//!     "alpha".to_string(),
//!     "0.0.0.0".to_string(),
//!     9001,
//!     "python3 app.py".to_string(),
//!     ServerType::Flask,
//!     Some("app.py".to_string()),
//! );
//! registry.upsert(record);
//! registry.save().unwrap();
//! ```
pub mod record;
pub mod store;

pub use record::{LOG_CAPACITY, LaunchId, ServerRecord, ServerStatus, ServerType};
pub use store::{Registry, SharedRegistry};
