//! Host Tree
//!
//! The in-memory tree the reconciliation engine mutates. Nodes are opaque
//! [`NodeId`] handles into a [`Document`] arena; the document's method
//! surface (create/append/insert/replace/remove/attributes/handlers/keys)
//! is the whole host interface, so the engine runs and tests the same way
//! with or without a real rendering environment behind it.

mod document;
mod node;

pub use document::{document, Document, DomError, Event, EventHandler};
pub use node::{NodeId, NodeKind};
