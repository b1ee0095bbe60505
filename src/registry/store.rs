use crate::error::{Error, Result};
use crate::registry::record::ServerRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handle to the registry.
///
/// The registry is mutated both from request-handling code (create, start,
/// stop, delete) and from every running server's monitor task (log appends,
/// terminal status). All of those writers go through this single lock; the
/// on-disk file is only ever written while it is held.
pub type SharedRegistry = Arc<Mutex<Registry>>;

/// Durable name → [`ServerRecord`] store.
///
/// The whole map is serialized to one JSON file and rewritten after every
/// mutation. There is no schema version field: a missing field on load is
/// patched in place with its default, and a file that fails to parse at all
/// resets the store to empty.
pub struct Registry {
    /// Path of the persisted registry file
    path: PathBuf,
    /// In-memory records, keyed by server name
    servers: HashMap<String, ServerRecord>,
}

impl Registry {
    /// Load the registry from `path`.
    ///
    /// A missing file yields an empty store. A file that exists but cannot
    /// be read or parsed also yields an empty store: total data loss is the
    /// accepted failure mode for corruption, and the supervised processes
    /// themselves are unaffected.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let servers = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<HashMap<String, ServerRecord>>(&content) {
                Ok(servers) => {
                    tracing::info!(num_servers = servers.len(), path = %path.display(), "Loaded registry");
                    servers
                }
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "Registry file unreadable, starting empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self { path, servers }
    }

    /// Create an empty registry that will persist to `path`.
    pub fn empty(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            servers: HashMap::new(),
        }
    }

    /// Serialize the entire store and overwrite the persisted file.
    ///
    /// Called synchronously after every mutation. Each save is a full
    /// rewrite, so a crash between two logical mutations can lose the later
    /// one but never leaves a half-written mixture of the two formats.
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.servers)
            .map_err(|e| Error::Io(format!("Failed to serialize registry: {}", e)))?;
        std::fs::write(&self.path, content)
            .map_err(|e| Error::Io(format!("Failed to write registry file: {}", e)))
    }

    /// Insert or replace a record under its name.
    pub fn upsert(&mut self, record: ServerRecord) {
        self.servers.insert(record.name.clone(), record);
    }

    /// Look up a record by name.
    pub fn get(&self, name: &str) -> Option<&ServerRecord> {
        self.servers.get(name)
    }

    /// Look up a record by name for mutation.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ServerRecord> {
        self.servers.get_mut(name)
    }

    /// Whether a record exists under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.servers.contains_key(name)
    }

    /// Remove a record by name.
    ///
    /// Removing an unknown name is reported as not-found to the caller; the
    /// store is unchanged.
    pub fn remove(&mut self, name: &str) -> Result<ServerRecord> {
        self.servers
            .remove(name)
            .ok_or_else(|| Error::ServerNotFound(name.to_string()))
    }

    /// Iterate all records in no particular order.
    pub fn list(&self) -> impl Iterator<Item = &ServerRecord> {
        self.servers.values()
    }

    /// Number of records in the store.
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Path of the persisted registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
