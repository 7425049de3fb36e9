//! Hook registry — the persistent, priority-ordered binding table.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::info;

use hookhub_core::result::AppResult;

use crate::binding::{Binding, push_sorted};
use crate::store::JsonStore;

/// Hook name → bindings, ascending by priority.
pub type HookTable = HashMap<String, Vec<Binding>>;

/// Registry of action/filter bindings, persisted after every mutation.
///
/// Mutations hold the write lock for the whole mutate-sort-persist
/// sequence; the store file only ever holds fully constructed tables and
/// dispatch never observes a half-sorted chain.
#[derive(Debug)]
pub struct HookRegistry {
    /// The binding table.
    table: RwLock<HookTable>,
    /// Backing JSON store.
    store: JsonStore,
}

impl HookRegistry {
    /// Opens the registry, loading any persisted table.
    ///
    /// A missing store file starts the table empty; a malformed one is a
    /// fatal configuration error.
    pub async fn open(store: JsonStore) -> AppResult<Self> {
        let mut table: HookTable = store.load().await?;

        // Stored chains are written pre-sorted, but a hand-edited file
        // may not be. The stable re-sort keeps ties in file order.
        for chain in table.values_mut() {
            chain.sort_by_key(|b| b.priority);
        }

        Ok(Self {
            table: RwLock::new(table),
            store,
        })
    }

    /// Registers a binding and persists the table before returning.
    ///
    /// The same function may be bound to the same hook more than once
    /// and fires once per binding. The name is not checked against any
    /// catalog here; an unresolvable binding is skipped at dispatch.
    pub async fn register(&self, hook: &str, function: &str, priority: i32) -> AppResult<()> {
        let mut table = self.table.write().await;

        push_sorted(
            table.entry(hook.to_string()).or_default(),
            Binding::new(function, priority),
        );
        self.store.save(&*table).await?;

        info!(
            hook = %hook,
            function = %function,
            priority = priority,
            "Hook binding registered"
        );

        Ok(())
    }

    /// Removes every binding of `function` from `hook`, persisting the
    /// result. Returns the number of bindings removed.
    pub async fn unregister(&self, hook: &str, function: &str) -> AppResult<usize> {
        let mut table = self.table.write().await;

        let Some(chain) = table.get_mut(hook) else {
            return Ok(0);
        };

        let before_len = chain.len();
        chain.retain(|b| b.function != function);
        let removed = before_len - chain.len();

        if chain.is_empty() {
            table.remove(hook);
        }

        if removed > 0 {
            self.store.save(&*table).await?;
            info!(hook = %hook, function = %function, removed = removed, "Hook bindings removed");
        }

        Ok(removed)
    }

    /// Returns a snapshot of the hook's binding chain, in execution order.
    pub async fn chain(&self, hook: &str) -> Vec<Binding> {
        let table = self.table.read().await;
        table.get(hook).cloned().unwrap_or_default()
    }

    /// Returns whether any bindings exist for the hook.
    pub async fn has_bindings(&self, hook: &str) -> bool {
        let table = self.table.read().await;
        table.get(hook).map(|c| !c.is_empty()).unwrap_or(false)
    }

    /// Returns the number of bindings for the hook.
    pub async fn binding_count(&self, hook: &str) -> usize {
        let table = self.table.read().await;
        table.get(hook).map(Vec::len).unwrap_or(0)
    }

    /// All hook names with at least one binding.
    pub async fn hooks(&self) -> Vec<String> {
        let table = self.table.read().await;
        table.keys().cloned().collect()
    }

    /// Snapshot of the whole table, for audits and round-trip checks.
    pub async fn snapshot(&self) -> HookTable {
        let table = self.table.read().await;
        table.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> JsonStore {
        JsonStore::new(dir.path().join("hooks.json"))
    }

    #[tokio::test]
    async fn test_register_keeps_chain_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let registry = HookRegistry::open(store_in(&dir)).await.unwrap();

        registry.register("h", "third", 30).await.unwrap();
        registry.register("h", "first", 1).await.unwrap();
        registry.register("h", "second", 15).await.unwrap();

        let names: Vec<String> = registry
            .chain("h")
            .await
            .into_iter()
            .map(|b| b.function)
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_equal_priorities_keep_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let registry = HookRegistry::open(store_in(&dir)).await.unwrap();

        registry.register("h", "a", 10).await.unwrap();
        registry.register("h", "b", 10).await.unwrap();
        registry.register("h", "c", 10).await.unwrap();

        let names: Vec<String> = registry
            .chain("h")
            .await
            .into_iter()
            .map(|b| b.function)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_registration_persists_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let registry = HookRegistry::open(store_in(&dir)).await.unwrap();
        registry.register("h", "audit", 10).await.unwrap();

        // A second registry over the same store sees the binding.
        let reloaded = HookRegistry::open(store_in(&dir)).await.unwrap();
        assert_eq!(reloaded.chain("h").await, vec![Binding::new("audit", 10)]);
    }

    #[tokio::test]
    async fn test_round_trip_preserves_names_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let registry = HookRegistry::open(store_in(&dir)).await.unwrap();

        registry.register("h", "late", 20).await.unwrap();
        registry.register("h", "early", 5).await.unwrap();
        registry.register("other", "audit", 10).await.unwrap();

        let reloaded = HookRegistry::open(store_in(&dir)).await.unwrap();
        assert_eq!(reloaded.snapshot().await, registry.snapshot().await);
    }

    #[tokio::test]
    async fn test_unregister_removes_all_matching_bindings() {
        let dir = tempfile::tempdir().unwrap();
        let registry = HookRegistry::open(store_in(&dir)).await.unwrap();

        registry.register("h", "audit", 5).await.unwrap();
        registry.register("h", "audit", 20).await.unwrap();
        registry.register("h", "other", 10).await.unwrap();

        let removed = registry.unregister("h", "audit").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(registry.chain("h").await, vec![Binding::new("other", 10)]);
    }

    #[tokio::test]
    async fn test_unregister_drops_empty_hooks() {
        let dir = tempfile::tempdir().unwrap();
        let registry = HookRegistry::open(store_in(&dir)).await.unwrap();

        registry.register("h", "audit", 10).await.unwrap();
        registry.unregister("h", "audit").await.unwrap();

        assert!(!registry.has_bindings("h").await);
        assert!(registry.hooks().await.is_empty());
    }

    #[tokio::test]
    async fn test_unregister_unknown_hook_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let registry = HookRegistry::open(store_in(&dir)).await.unwrap();
        assert_eq!(registry.unregister("h", "audit").await.unwrap(), 0);
    }
}
