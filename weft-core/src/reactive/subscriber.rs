//! Subscriber identity for the stream layer.
//!
//! Every registered stream callback gets a unique ID when attached. The ID is
//! what lets a cancelled subscription find and remove its own entry without
//! holding a reference to the callback itself.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for one attached stream callback.
///
/// Uses an atomic counter so IDs are unique across threads for the lifetime
/// of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}
