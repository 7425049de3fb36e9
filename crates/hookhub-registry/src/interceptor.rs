//! Interception registry — independent before/after chains per hook.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use hookhub_core::result::AppResult;

use crate::binding::{Binding, push_sorted};
use crate::store::JsonStore;

/// Which side of the wrapped call a binding attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptStage {
    /// Runs ahead of the wrapped call and may rewrite its arguments.
    Before,
    /// Runs after the wrapped call and rewrites its result.
    After,
}

impl InterceptStage {
    /// Returns the stage name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

/// Before and after chains for one hook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptChains {
    /// Argument-rewriting bindings, ascending by priority.
    #[serde(default)]
    pub before: Vec<Binding>,
    /// Result-rewriting bindings, ascending by priority.
    #[serde(default)]
    pub after: Vec<Binding>,
}

/// Hook name → before/after chains.
pub type InterceptTable = HashMap<String, InterceptChains>;

/// Registry of interception bindings, persisted after every mutation.
///
/// Each stage follows the same ordering rule as the simple registry:
/// ascending priority, stable for ties, re-sorted on every insertion.
#[derive(Debug)]
pub struct InterceptRegistry {
    /// The interception table.
    table: RwLock<InterceptTable>,
    /// Backing JSON store.
    store: JsonStore,
}

impl InterceptRegistry {
    /// Opens the registry, loading any persisted table.
    ///
    /// A missing store file starts the table empty; a malformed one is a
    /// fatal configuration error.
    pub async fn open(store: JsonStore) -> AppResult<Self> {
        let mut table: InterceptTable = store.load().await?;

        for chains in table.values_mut() {
            chains.before.sort_by_key(|b| b.priority);
            chains.after.sort_by_key(|b| b.priority);
        }

        Ok(Self {
            table: RwLock::new(table),
            store,
        })
    }

    /// Registers a binding on one stage of a hook and persists the table
    /// before returning.
    pub async fn register(
        &self,
        hook: &str,
        stage: InterceptStage,
        function: &str,
        priority: i32,
    ) -> AppResult<()> {
        let mut table = self.table.write().await;

        let chains = table.entry(hook.to_string()).or_default();
        let chain = match stage {
            InterceptStage::Before => &mut chains.before,
            InterceptStage::After => &mut chains.after,
        };
        push_sorted(chain, Binding::new(function, priority));
        self.store.save(&*table).await?;

        info!(
            hook = %hook,
            stage = stage.as_str(),
            function = %function,
            priority = priority,
            "Interception binding registered"
        );

        Ok(())
    }

    /// Registers an argument-rewriting binding.
    pub async fn register_before(&self, hook: &str, function: &str, priority: i32) -> AppResult<()> {
        self.register(hook, InterceptStage::Before, function, priority).await
    }

    /// Registers a result-rewriting binding.
    pub async fn register_after(&self, hook: &str, function: &str, priority: i32) -> AppResult<()> {
        self.register(hook, InterceptStage::After, function, priority).await
    }

    /// Removes every binding of `function` from both stages of `hook`,
    /// persisting the result. Returns the number of bindings removed.
    pub async fn unregister(&self, hook: &str, function: &str) -> AppResult<usize> {
        let mut table = self.table.write().await;

        let Some(chains) = table.get_mut(hook) else {
            return Ok(0);
        };

        let before_len = chains.before.len() + chains.after.len();
        chains.before.retain(|b| b.function != function);
        chains.after.retain(|b| b.function != function);
        let removed = before_len - chains.before.len() - chains.after.len();

        if chains.before.is_empty() && chains.after.is_empty() {
            table.remove(hook);
        }

        if removed > 0 {
            self.store.save(&*table).await?;
            info!(hook = %hook, function = %function, removed = removed, "Interception bindings removed");
        }

        Ok(removed)
    }

    /// Returns a snapshot of the hook's chains, each in execution order.
    pub async fn chains(&self, hook: &str) -> InterceptChains {
        let table = self.table.read().await;
        table.get(hook).cloned().unwrap_or_default()
    }

    /// All hook names with at least one binding on either stage.
    pub async fn hooks(&self) -> Vec<String> {
        let table = self.table.read().await;
        table.keys().cloned().collect()
    }

    /// Snapshot of the whole table, for audits and round-trip checks.
    pub async fn snapshot(&self) -> InterceptTable {
        let table = self.table.read().await;
        table.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> JsonStore {
        JsonStore::new(dir.path().join("intercepts.json"))
    }

    #[tokio::test]
    async fn test_stages_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let registry = InterceptRegistry::open(store_in(&dir)).await.unwrap();

        registry.register_before("render", "trim", 5).await.unwrap();
        registry.register_after("render", "stamp", 10).await.unwrap();

        let chains = registry.chains("render").await;
        assert_eq!(chains.before, vec![Binding::new("trim", 5)]);
        assert_eq!(chains.after, vec![Binding::new("stamp", 10)]);
    }

    #[tokio::test]
    async fn test_each_stage_sorts_by_priority() {
        let dir = tempfile::tempdir().unwrap();
        let registry = InterceptRegistry::open(store_in(&dir)).await.unwrap();

        registry.register_before("render", "late", 20).await.unwrap();
        registry.register_before("render", "early", 1).await.unwrap();

        let names: Vec<String> = registry
            .chains("render")
            .await
            .before
            .into_iter()
            .map(|b| b.function)
            .collect();
        assert_eq!(names, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_round_trip_preserves_both_stages() {
        let dir = tempfile::tempdir().unwrap();
        let registry = InterceptRegistry::open(store_in(&dir)).await.unwrap();

        registry.register_before("render", "trim", 5).await.unwrap();
        registry.register_after("render", "stamp", 10).await.unwrap();
        registry.register_after("render", "sign", 1).await.unwrap();

        let reloaded = InterceptRegistry::open(store_in(&dir)).await.unwrap();
        assert_eq!(reloaded.snapshot().await, registry.snapshot().await);
    }

    #[tokio::test]
    async fn test_unregister_covers_both_stages() {
        let dir = tempfile::tempdir().unwrap();
        let registry = InterceptRegistry::open(store_in(&dir)).await.unwrap();

        registry.register_before("render", "probe", 5).await.unwrap();
        registry.register_after("render", "probe", 10).await.unwrap();
        registry.register_after("render", "stamp", 10).await.unwrap();

        let removed = registry.unregister("render", "probe").await.unwrap();
        assert_eq!(removed, 2);

        let chains = registry.chains("render").await;
        assert!(chains.before.is_empty());
        assert_eq!(chains.after, vec![Binding::new("stamp", 10)]);
    }
}
