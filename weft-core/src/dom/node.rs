//! Node Handles
//!
//! This module defines the opaque handle type for nodes in the host tree.
//! The reconciliation engine never touches node storage directly; it only
//! passes handles back into [`Document`](super::Document) methods.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a node in the host tree.
///
/// Handles are process-unique and never reused, so a stale handle can be
/// detected instead of silently aliasing a newer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// The kind of node in the host tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// An element: has a tag, attributes, handlers, and children.
    Element,

    /// A text node: has display text and nothing else.
    Text,
}
