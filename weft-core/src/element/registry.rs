//! Subscription Registry
//!
//! Every element built by the factory acquires resources while it is being
//! constructed: stream subscriptions made by the attribute binder and the
//! child reconciler, and event-handler properties set on the node. The
//! registry records them, in acquisition order, so one destroy call can
//! release everything when the node leaves the tree.
//!
//! # Release Discipline
//!
//! Entries are independent resources; destroy drains all of them, and an
//! individual release that panics is caught and logged so it can never
//! block the remaining releases. Destroy itself is not idempotent — it is
//! the document's take-based side-table that guarantees each registry is
//! destroyed at most once (see [`Document::teardown`]).

use std::panic::{catch_unwind, AssertUnwindSafe};

use parking_lot::Mutex;
use smallvec::SmallVec;
use tracing::warn;

use crate::dom::{Document, NodeId};
use crate::reactive::Subscription;

/// One resource acquired while constructing a node.
#[derive(Debug)]
pub enum Resource {
    /// A cancellable stream subscription.
    Subscription(Subscription),

    /// An event-handling property set on `node`; released by clearing the
    /// property rather than unsubscribing.
    Listener { node: NodeId, event: String },
}

/// Per-node bookkeeping of acquired resources.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Mutex<SmallVec<[Resource; 4]>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resource. Never fails.
    pub fn register(&self, resource: Resource) {
        self.entries.lock().push(resource);
    }

    /// Number of recorded resources.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no resources are recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Release every recorded resource.
    ///
    /// Subscriptions are cancelled; listener bindings clear their handler
    /// property on `document`. Processing is exhaustive: a panicking release
    /// is isolated and logged, and the drain continues.
    pub fn destroy(&self, document: &Document) {
        let entries = std::mem::take(&mut *self.entries.lock());
        for resource in entries {
            let label = match &resource {
                Resource::Subscription(_) => "subscription",
                Resource::Listener { .. } => "listener",
            };
            let outcome = catch_unwind(AssertUnwindSafe(|| release(resource, document)));
            if outcome.is_err() {
                warn!(label, "resource release panicked; continuing with remaining entries");
            }
        }
    }
}

fn release(resource: Resource, document: &Document) {
    match resource {
        Resource::Subscription(subscription) => subscription.unsubscribe(),
        Resource::Listener { node, event } => document.clear_handler(node, &event),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
