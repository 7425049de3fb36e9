//! Hook registry configuration.

use serde::{Deserialize, Serialize};

/// Persistence settings for the hook registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Path to the persisted action/filter binding table.
    #[serde(default = "default_store_path")]
    pub store_path: String,
    /// Path to the persisted before/after interception table.
    #[serde(default = "default_intercept_store_path")]
    pub intercept_store_path: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            intercept_store_path: default_intercept_store_path(),
        }
    }
}

fn default_store_path() -> String {
    "data/hooks.json".to_string()
}

fn default_intercept_store_path() -> String {
    "data/intercepts.json".to_string()
}
