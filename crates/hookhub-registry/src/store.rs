//! JSON-backed persistence for the binding tables.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::debug;

use hookhub_core::error::{AppError, ErrorKind};
use hookhub_core::result::AppResult;

/// Stores a serializable table as pretty-printed JSON at a fixed path.
///
/// A missing file loads as the default (empty) table. A file that exists
/// but cannot be parsed is a fatal configuration error; no recovery is
/// attempted.
#[derive(Debug, Clone)]
pub struct JsonStore {
    /// Location of the persisted table.
    path: PathBuf,
}

impl JsonStore {
    /// Creates a store over the given path. Nothing is read until
    /// [`JsonStore::load`] is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the store's path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and deserializes the persisted table.
    pub async fn load<T>(&self) -> AppResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let raw = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Store file absent, starting empty");
                return Ok(T::default());
            }
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Persistence,
                    format!("Failed to read store file: {}", self.path.display()),
                    e,
                ));
            }
        };

        serde_json::from_slice(&raw).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Malformed store file: {}", self.path.display()),
                e,
            )
        })
    }

    /// Serializes the table and overwrites the persisted file.
    pub async fn save<T>(&self, table: &T) -> AppResult<()>
    where
        T: Serialize,
    {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Persistence,
                        format!("Failed to create store directory: {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let json = serde_json::to_vec_pretty(table)?;

        fs::write(&self.path, json).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Persistence,
                format!("Failed to write store file: {}", self.path.display()),
                e,
            )
        })
    }
}
