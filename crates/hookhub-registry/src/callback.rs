//! The callback trait and its adapters.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use hookhub_core::result::AppResult;

/// Trait implemented by every callback a host exposes to the registry.
///
/// All dispatch modes share this signature. Action dispatch discards the
/// returned value; filter dispatch and after-interceptors treat it as
/// the replacement value; before-interceptors have it classified through
/// [`BeforeOutcome`].
#[async_trait]
pub trait HookCallback: Send + Sync + std::fmt::Debug {
    /// Invokes the callback with the given argument list.
    async fn invoke(&self, args: &[Value]) -> AppResult<Value>;
}

/// Outcome of a before-interceptor, decided by the shape of its return.
///
/// A JSON array is taken as a replacement argument list; any other
/// return leaves the arguments untouched. The enum puts that contract in
/// the open instead of burying a type check in the dispatch loop.
#[derive(Debug, Clone, PartialEq)]
pub enum BeforeOutcome {
    /// The interceptor supplied a replacement argument list.
    Replaced(Vec<Value>),
    /// The return was not argument-list shaped; arguments stay as-is.
    Unchanged,
}

impl BeforeOutcome {
    /// Classifies a before-interceptor's return value.
    pub fn from_return(value: Value) -> Self {
        match value {
            Value::Array(args) => Self::Replaced(args),
            _ => Self::Unchanged,
        }
    }
}

/// A closure-based callback for quick registration.
pub struct ClosureCallback {
    /// Callback function.
    callback: Arc<
        dyn Fn(&[Value]) -> std::pin::Pin<Box<dyn std::future::Future<Output = AppResult<Value>> + Send + '_>>
            + Send
            + Sync,
    >,
}

impl std::fmt::Debug for ClosureCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureCallback")
            .field("callback", &"<closure>")
            .finish()
    }
}

impl ClosureCallback {
    /// Creates a callback from an async closure.
    pub fn new<F, Fut>(callback: F) -> Self
    where
        F: Fn(&[Value]) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = AppResult<Value>> + Send + 'static,
    {
        Self {
            callback: Arc::new(move |args| {
                let fut = callback(args);
                Box::pin(fut)
            }),
        }
    }

    /// Creates a callback from a plain synchronous function.
    pub fn from_fn<F>(callback: F) -> Self
    where
        F: Fn(&[Value]) -> AppResult<Value> + Send + Sync + 'static,
    {
        Self::new(move |args| std::future::ready(callback(args)))
    }
}

#[async_trait]
impl HookCallback for ClosureCallback {
    async fn invoke(&self, args: &[Value]) -> AppResult<Value> {
        (self.callback)(args).await
    }
}
