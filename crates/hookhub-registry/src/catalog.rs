//! Callback catalog — the host's named function namespace.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use hookhub_core::error::AppError;
use hookhub_core::result::AppResult;

use crate::callback::HookCallback;

/// Named callbacks exposed by the host process.
///
/// Bindings refer to callbacks by name only, and those names resolve
/// here at dispatch time. A name that resolves to nothing is not an
/// error for the catalog; dispatch skips the binding.
#[derive(Debug)]
pub struct CallbackCatalog {
    /// Callback name → implementation.
    callbacks: RwLock<HashMap<String, Arc<dyn HookCallback>>>,
}

impl CallbackCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self {
            callbacks: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a callback under a unique name.
    pub async fn register(&self, name: &str, callback: Arc<dyn HookCallback>) -> AppResult<()> {
        let mut callbacks = self.callbacks.write().await;

        if callbacks.contains_key(name) {
            return Err(AppError::conflict(format!(
                "Callback '{name}' is already registered"
            )));
        }

        callbacks.insert(name.to_string(), callback);
        info!(function = %name, "Callback registered");

        Ok(())
    }

    /// Removes a callback by name.
    pub async fn unregister(&self, name: &str) -> AppResult<Arc<dyn HookCallback>> {
        let mut callbacks = self.callbacks.write().await;

        let callback = callbacks
            .remove(name)
            .ok_or_else(|| AppError::not_found(format!("Callback '{name}' not found")))?;

        info!(function = %name, "Callback unregistered");

        Ok(callback)
    }

    /// Resolves a name to its callback, if present.
    pub async fn resolve(&self, name: &str) -> Option<Arc<dyn HookCallback>> {
        let callbacks = self.callbacks.read().await;
        callbacks.get(name).cloned()
    }

    /// Checks whether a callback is registered under the given name.
    pub async fn contains(&self, name: &str) -> bool {
        let callbacks = self.callbacks.read().await;
        callbacks.contains_key(name)
    }

    /// All registered names, in no particular order.
    pub async fn names(&self) -> Vec<String> {
        let callbacks = self.callbacks.read().await;
        callbacks.keys().cloned().collect()
    }

    /// Returns the number of registered callbacks.
    pub async fn count(&self) -> usize {
        let callbacks = self.callbacks.read().await;
        callbacks.len()
    }
}

impl Default for CallbackCatalog {
    fn default() -> Self {
        Self::new()
    }
}
