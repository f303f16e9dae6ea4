//! Key/value storage for the client credential.
//!
//! The credential lives under [`CREDENTIAL_KEY`] in a small string store. The
//! client reads it once when it is built; only the CLI `login`/`logout`
//! commands ever write to it.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};

use crate::api::ApiError;

/// Key the API credential is stored under
pub const CREDENTIAL_KEY: &str = "ae_api_key";

/// Errors raised by a credential store
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Stored data is malformed: {0}")]
    Malformed(String),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Io(e) => ApiError::Storage(e.to_string()),
            StorageError::Malformed(_) => ApiError::Parse("Stored data is malformed".to_string()),
        }
    }
}

/// A string key/value store, the native counterpart of browser local storage.
pub trait CredentialStore: Send + Sync + fmt::Debug {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
}

/// Store kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding a single credential under [`CREDENTIAL_KEY`]
    pub fn with_credential(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(CREDENTIAL_KEY, token);
        store
    }

    pub fn set(&self, key: &str, value: impl Into<String>) {
        if let Ok(mut guard) = self.values.lock() {
            guard.insert(key.to_string(), value.into());
        }
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut guard) = self.values.lock() {
            guard.remove(key);
        }
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .values
            .lock()
            .ok()
            .and_then(|guard| guard.get(key).cloned()))
    }
}

/// Store persisted as a flat JSON object of strings.
///
/// A missing file reads as an empty store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/article-eater/storage.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("article-eater")
            .join("storage.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `value` under `key`, creating the file if needed
    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), Value::String(value.to_string()));
        self.save(&entries)
    }

    /// Remove `key`; a missing key is not an error
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }

    fn load(&self) -> Result<Map<String, Value>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StorageError::Malformed("expected a JSON object".to_string())),
            Err(e) => Err(StorageError::Malformed(e.to_string())),
        }
    }

    fn save(&self, entries: &Map<String, Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Malformed(e.to_string()))?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.load()?.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(StorageError::Malformed(format!(
                "value for '{}' is not a string",
                key
            ))),
        }
    }
}
