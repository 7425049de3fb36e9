//! # hookhub-registry
//!
//! Persistent hook registry with priority-ordered dispatch.
//!
//! Hosts expose named callbacks through a [`catalog::CallbackCatalog`],
//! bind them to hooks by name with a priority, and fire the hooks in one
//! of three modes:
//!
//! - **notify**: fire-and-forget actions, return values discarded;
//! - **transform**: a value threaded through the chain, each callback
//!   replacing it;
//! - **wrap**: a target call bracketed by independent argument-rewriting
//!   (`before`) and result-rewriting (`after`) chains.
//!
//! Binding tables persist to pretty-printed JSON after every mutation. A
//! binding whose name resolves to no callback is skipped at dispatch
//! time; it never fails the chain.

pub mod binding;
pub mod callback;
pub mod catalog;
pub mod dispatcher;
pub mod interceptor;
pub mod manager;
pub mod registry;
pub mod store;

pub use binding::{Binding, DEFAULT_PRIORITY};
pub use callback::{BeforeOutcome, ClosureCallback, HookCallback};
pub use manager::HookManager;
