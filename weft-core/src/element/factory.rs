//! Element Factory
//!
//! One construction path for every element: take a tag, an optional leading
//! attribute map, and an ordered list of child slots; wire attributes
//! through the binder and children through the reconciler; park the
//! registry of everything acquired so a parent can tear the element down
//! later.
//!
//! # Argument Disambiguation
//!
//! Call sites may omit the attribute map entirely — the first argument is
//! an attribute map only when it *is* one ([`Arg::Attrs`]); any child shape
//! in first position simply becomes the first child. An attribute map in a
//! later position is a caller contract violation and is ignored with a
//! warning.
//!
//! # Flattening
//!
//! Child lists splice inline, one level deep, before slot indices are
//! assigned: the slot index of every child equals its position in the
//! flattened list.

use tracing::{debug, warn};

use crate::dom::{document, Document, DomError, NodeId};

use super::attributes::bind_attributes;
use super::children::mount_child;
use super::registry::Registry;
use super::value::{Arg, AttrMap, Child};

/// A constructed element: an opaque node handle plus the document that owns
/// it. Cheap to clone; clones refer to the same node.
#[derive(Clone)]
pub struct Element {
    node: NodeId,
    document: Document,
}

impl Element {
    /// The element's node handle.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The document this element lives in.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Release every resource in this element's subtree.
    ///
    /// Invoked by whichever reconciler removes or replaces the element —
    /// or by the application for a root it is done with. At most once per
    /// owner; later calls find nothing left to release.
    pub fn teardown(&self) {
        self.document.teardown(self.node);
    }

    /// Serialize the element's subtree.
    pub fn html(&self) -> Result<String, DomError> {
        self.document.render_html(self.node)
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element").field("node", &self.node).finish()
    }
}

impl Document {
    /// Build one element in this document.
    ///
    /// Never panics for well-typed arguments; malformed shapes (an
    /// attribute map after the first position, a list nested beyond one
    /// level) are caller contract violations that log and render nothing.
    pub fn create_element(&self, tag: &str, args: impl IntoIterator<Item = Arg>) -> Element {
        let node = self.create_element_node(tag);
        let registry = Registry::new();

        let mut attrs: Option<AttrMap> = None;
        let mut slots: Vec<Child> = Vec::new();
        for (position, arg) in args.into_iter().enumerate() {
            match arg {
                Arg::Attrs(map) if position == 0 => attrs = Some(map),
                Arg::Attrs(_) => {
                    warn!(tag, position, "attribute map after the first argument; ignored");
                }
                // One level of flattening: a list splices into consecutive
                // slots; deeper nesting is left to the reconciler's warning.
                Arg::Child(Child::List(children)) => slots.extend(children),
                Arg::Child(child) => slots.push(child),
            }
        }

        if let Some(attrs) = attrs {
            bind_attributes(self, node, attrs, &registry);
        }
        for (index, child) in slots.into_iter().enumerate() {
            mount_child(self, node, index, child, &registry);
        }

        debug!(tag, ?node, resources = registry.len(), "element constructed");
        self.register_teardown(node, registry);

        Element {
            node,
            document: self.clone(),
        }
    }
}

/// Build one element in the process-global document.
///
/// This is the entry point the tag helpers call; see
/// [`Document::create_element`] for the explicit-document form.
pub fn create_element(tag: &str, args: impl IntoIterator<Item = Arg>) -> Element {
    document().create_element(tag, args)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
