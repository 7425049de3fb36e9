//! Hook manager — wires the catalog, registries, and dispatch front-ends.

use std::sync::Arc;

use serde_json::Value;

use hookhub_core::config::registry::RegistryConfig;
use hookhub_core::result::AppResult;

use crate::binding::Binding;
use crate::callback::HookCallback;
use crate::catalog::CallbackCatalog;
use crate::dispatcher::{HookDispatcher, Interceptor};
use crate::interceptor::{InterceptRegistry, InterceptStage};
use crate::registry::HookRegistry;
use crate::store::JsonStore;

/// Front door for hosts: one object owning the callback catalog, both
/// binding tables, and the dispatch entry points.
#[derive(Debug)]
pub struct HookManager {
    /// Callback namespace.
    catalog: Arc<CallbackCatalog>,
    /// Action/filter binding table.
    hooks: Arc<HookRegistry>,
    /// Before/after interception table.
    intercepts: Arc<InterceptRegistry>,
    /// Action/filter dispatch.
    dispatcher: HookDispatcher,
    /// Wrap dispatch.
    interceptor: Interceptor,
}

impl HookManager {
    /// Opens a manager over the configured store paths, loading any
    /// persisted tables.
    pub async fn open(config: &RegistryConfig) -> AppResult<Self> {
        let catalog = Arc::new(CallbackCatalog::new());
        let hooks = Arc::new(HookRegistry::open(JsonStore::new(&config.store_path)).await?);
        let intercepts = Arc::new(
            InterceptRegistry::open(JsonStore::new(&config.intercept_store_path)).await?,
        );

        let dispatcher = HookDispatcher::new(hooks.clone(), catalog.clone());
        let interceptor = Interceptor::new(intercepts.clone(), catalog.clone());

        Ok(Self {
            catalog,
            hooks,
            intercepts,
            dispatcher,
            interceptor,
        })
    }

    /// Registers a callback under a unique name in the catalog.
    pub async fn register_callback(
        &self,
        name: &str,
        callback: Arc<dyn HookCallback>,
    ) -> AppResult<()> {
        self.catalog.register(name, callback).await
    }

    /// Binds a callback name to a hook at the given priority.
    pub async fn register(&self, hook: &str, function: &str, priority: i32) -> AppResult<()> {
        self.hooks.register(hook, function, priority).await
    }

    /// Binds a callback name to one stage of an interception hook.
    pub async fn register_intercept(
        &self,
        hook: &str,
        stage: InterceptStage,
        function: &str,
        priority: i32,
    ) -> AppResult<()> {
        self.intercepts.register(hook, stage, function, priority).await
    }

    /// Removes a callback name from a hook's action/filter chain.
    pub async fn unregister(&self, hook: &str, function: &str) -> AppResult<usize> {
        self.hooks.unregister(hook, function).await
    }

    /// Action dispatch, see [`HookDispatcher::notify`].
    pub async fn notify(&self, hook: &str, args: &[Value]) -> AppResult<()> {
        self.dispatcher.notify(hook, args).await
    }

    /// Filter dispatch, see [`HookDispatcher::transform`].
    pub async fn transform(&self, hook: &str, value: Value, extra: &[Value]) -> AppResult<Value> {
        self.dispatcher.transform(hook, value, extra).await
    }

    /// Wrap dispatch, see [`Interceptor::wrap`].
    pub async fn wrap(
        &self,
        hook: &str,
        target: &dyn HookCallback,
        args: Vec<Value>,
    ) -> AppResult<Value> {
        self.interceptor.wrap(hook, target, args).await
    }

    /// Bindings whose function name resolves to nothing in the catalog.
    ///
    /// Dispatch silently skips these; hosts that prefer failing fast can
    /// check once wiring is complete.
    pub async fn unresolved_bindings(&self) -> Vec<(String, Binding)> {
        let mut stale = Vec::new();

        for (hook, chain) in self.hooks.snapshot().await {
            for binding in chain {
                if !self.catalog.contains(&binding.function).await {
                    stale.push((hook.clone(), binding));
                }
            }
        }

        for (hook, chains) in self.intercepts.snapshot().await {
            for binding in chains.before.into_iter().chain(chains.after) {
                if !self.catalog.contains(&binding.function).await {
                    stale.push((hook.clone(), binding));
                }
            }
        }

        stale
    }

    /// Returns the callback catalog.
    pub fn catalog(&self) -> &Arc<CallbackCatalog> {
        &self.catalog
    }

    /// Returns the action/filter registry.
    pub fn hook_registry(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    /// Returns the interception registry.
    pub fn intercept_registry(&self) -> &Arc<InterceptRegistry> {
        &self.intercepts
    }
}
