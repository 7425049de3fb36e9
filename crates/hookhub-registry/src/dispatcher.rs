//! Dispatch front-ends — notify, transform, and wrap.
//!
//! All three modes walk a snapshot of the hook's chain in priority order
//! and resolve each binding's name through the catalog at dispatch time.
//! A name that resolves to nothing is skipped and never fails the chain.
//! A callback that returns an error aborts the dispatch call; earlier
//! callbacks' side effects stand.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use hookhub_core::result::AppResult;

use crate::callback::{BeforeOutcome, HookCallback};
use crate::catalog::CallbackCatalog;
use crate::interceptor::InterceptRegistry;
use crate::registry::HookRegistry;

/// Fires action and filter chains over a [`HookRegistry`].
#[derive(Debug)]
pub struct HookDispatcher {
    /// Binding table.
    registry: Arc<HookRegistry>,
    /// Callback namespace.
    catalog: Arc<CallbackCatalog>,
}

impl HookDispatcher {
    /// Creates a dispatcher over a registry and catalog.
    pub fn new(registry: Arc<HookRegistry>, catalog: Arc<CallbackCatalog>) -> Self {
        Self { registry, catalog }
    }

    /// Action dispatch: invokes every resolvable binding in priority
    /// order, discarding return values.
    pub async fn notify(&self, hook: &str, args: &[Value]) -> AppResult<()> {
        for binding in self.registry.chain(hook).await {
            let Some(callback) = self.catalog.resolve(&binding.function).await else {
                debug!(hook = %hook, function = %binding.function, "Skipping unresolved binding");
                continue;
            };
            callback.invoke(args).await?;
        }

        Ok(())
    }

    /// Filter dispatch: threads `value` through every resolvable binding
    /// and returns the final value.
    ///
    /// Each callback receives `[value, extra...]` and its return becomes
    /// the next callback's value. An unresolved binding passes the value
    /// through untouched.
    pub async fn transform(&self, hook: &str, value: Value, extra: &[Value]) -> AppResult<Value> {
        let mut value = value;

        for binding in self.registry.chain(hook).await {
            let Some(callback) = self.catalog.resolve(&binding.function).await else {
                debug!(hook = %hook, function = %binding.function, "Skipping unresolved binding");
                continue;
            };

            let mut args = Vec::with_capacity(extra.len() + 1);
            args.push(value);
            args.extend_from_slice(extra);
            value = callback.invoke(&args).await?;
        }

        Ok(value)
    }
}

/// Wraps a target call with before/after interception chains.
#[derive(Debug)]
pub struct Interceptor {
    /// Interception table.
    registry: Arc<InterceptRegistry>,
    /// Callback namespace.
    catalog: Arc<CallbackCatalog>,
}

impl Interceptor {
    /// Creates an interceptor over a registry and catalog.
    pub fn new(registry: Arc<InterceptRegistry>, catalog: Arc<CallbackCatalog>) -> Self {
        Self { registry, catalog }
    }

    /// Wrap dispatch: rewrites the argument list through the `before`
    /// chain, invokes `target` with the final arguments, then rewrites
    /// the result through the `after` chain.
    ///
    /// A before-callback replaces the arguments only when its return is
    /// argument-list shaped (see [`BeforeOutcome`]); after-callbacks are
    /// single-value transforms of the result. With no bindings this is
    /// exactly `target.invoke(&args)`.
    pub async fn wrap(
        &self,
        hook: &str,
        target: &dyn HookCallback,
        args: Vec<Value>,
    ) -> AppResult<Value> {
        let chains = self.registry.chains(hook).await;

        let mut args = args;
        for binding in &chains.before {
            let Some(callback) = self.catalog.resolve(&binding.function).await else {
                debug!(
                    hook = %hook,
                    stage = "before",
                    function = %binding.function,
                    "Skipping unresolved binding"
                );
                continue;
            };

            match BeforeOutcome::from_return(callback.invoke(&args).await?) {
                BeforeOutcome::Replaced(next) => args = next,
                BeforeOutcome::Unchanged => {}
            }
        }

        let mut result = target.invoke(&args).await?;

        for binding in &chains.after {
            let Some(callback) = self.catalog.resolve(&binding.function).await else {
                debug!(
                    hook = %hook,
                    stage = "after",
                    function = %binding.function,
                    "Skipping unresolved binding"
                );
                continue;
            };

            result = callback.invoke(std::slice::from_ref(&result)).await?;
        }

        Ok(result)
    }
}
