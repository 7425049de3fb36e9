//! Hook bindings — (callback name, priority) pairs.

use serde::{Deserialize, Serialize};

/// Priority assigned to bindings whose caller does not pick one.
pub const DEFAULT_PRIORITY: i32 = 10;

/// A single callback binding registered against a hook.
///
/// The `function` field names a callback in the host's catalog; the name
/// is resolved at dispatch time, not at registration. Field names fix
/// the persisted JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Catalog name of the callback.
    pub function: String,
    /// Execution priority (lower = runs first; ties keep insertion order).
    pub priority: i32,
}

impl Binding {
    /// Creates a new binding.
    pub fn new(function: impl Into<String>, priority: i32) -> Self {
        Self {
            function: function.into(),
            priority,
        }
    }
}

/// Appends a binding and restores ascending priority order.
///
/// `sort_by_key` is stable, so bindings sharing a priority keep their
/// insertion order.
pub(crate) fn push_sorted(chain: &mut Vec<Binding>, binding: Binding) {
    chain.push(binding);
    chain.sort_by_key(|b| b.priority);
}
