//! Document: the in-memory host tree.
//!
//! The reconciler mutates a host-provided tree in place. `Document` is that
//! tree: a node arena behind a cheap cloneable handle, with a method surface
//! shaped like the DOM operations the engine actually needs (append, insert
//! before, replace, remove, attributes, handler properties, key tags).
//! Because the arena is plain memory, the whole reconciliation algorithm is
//! testable without a browser.
//!
//! # Ownership and Teardown
//!
//! Each element built by the factory owns exactly one
//! [`Registry`](crate::element::Registry) of acquired resources. The
//! document keeps a side-table mapping node handles to their registries —
//! the explicit replacement for stashing a teardown closure on foreign
//! objects. [`Document::teardown`] *takes* the registry out of the table
//! before destroying it, so a node's resources are released at most once no
//! matter who races to remove it; the walk is post-order, children before
//! parent.
//!
//! # Error Policy
//!
//! Queries that hand data back return `Result` with [`DomError`] for
//! unknown handles. Mutations on unknown handles log a warning and do
//! nothing: reconciliation runs inside stream callbacks and must never
//! abort an update round halfway through.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use indexmap::IndexMap;
use parking_lot::RwLock;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::warn;

use crate::element::{Key, Registry};

use super::node::{NodeId, NodeKind};

/// Errors returned by fallible document queries.
#[derive(Debug, Error)]
pub enum DomError {
    /// The handle does not name a node in this document.
    #[error("unknown node handle {0:?}")]
    NodeNotFound(NodeId),

    /// The operation requires an element but the handle names a text node.
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
}

/// A synchronous event delivered to a handler property.
#[derive(Debug, Clone)]
pub struct Event {
    /// The node the event was dispatched on.
    pub target: NodeId,

    /// Optional payload (an input's text, for example).
    pub detail: Option<String>,
}

/// An event-handling property value.
///
/// Handlers are stored on the node under their property name (`onclick`)
/// and released by clearing the property, not by unsubscribing.
pub type EventHandler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Storage for one node.
struct NodeData {
    kind: NodeKind,
    tag: Option<String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
    attributes: IndexMap<String, String>,
    handlers: HashMap<String, EventHandler>,
    key: Option<Key>,
}

impl NodeData {
    fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element,
            tag: Some(tag.to_string()),
            text: None,
            parent: None,
            children: SmallVec::new(),
            attributes: IndexMap::new(),
            handlers: HashMap::new(),
            key: None,
        }
    }

    fn text(text: &str) -> Self {
        Self {
            kind: NodeKind::Text,
            tag: None,
            text: Some(text.to_string()),
            parent: None,
            children: SmallVec::new(),
            attributes: IndexMap::new(),
            handlers: HashMap::new(),
            key: None,
        }
    }
}

struct DocumentInner {
    /// The node arena.
    nodes: RwLock<HashMap<NodeId, NodeData>>,

    /// Node handle → owning registry. Entries are *taken* on teardown.
    registries: DashMap<NodeId, Registry>,
}

/// Cloneable handle to a shared in-memory tree.
///
/// Clones share the same arena: a `Document` passed into a subscription
/// callback mutates the same tree the caller sees.
#[derive(Clone)]
pub struct Document {
    inner: Arc<DocumentInner>,
}

/// The process-global default document.
///
/// Mirrors the ambient `document` of a browser environment. Isolated trees
/// for tests are just `Document::new()`.
pub fn document() -> Document {
    static DOCUMENT: OnceLock<Document> = OnceLock::new();
    DOCUMENT.get_or_init(Document::new).clone()
}

impl Document {
    /// Create a new, empty document.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DocumentInner {
                nodes: RwLock::new(HashMap::new()),
                registries: DashMap::new(),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Node creation
    // ------------------------------------------------------------------

    /// Create a detached element node.
    pub fn create_element_node(&self, tag: &str) -> NodeId {
        let id = NodeId::new();
        self.inner.nodes.write().insert(id, NodeData::element(tag));
        id
    }

    /// Create a detached text node.
    pub fn create_text_node(&self, text: &str) -> NodeId {
        let id = NodeId::new();
        self.inner.nodes.write().insert(id, NodeData::text(text));
        id
    }

    /// Whether the handle names a node in this document.
    pub fn contains(&self, node: NodeId) -> bool {
        self.inner.nodes.read().contains_key(&node)
    }

    /// Number of nodes currently stored in the arena.
    pub fn node_count(&self) -> usize {
        self.inner.nodes.read().len()
    }

    // ------------------------------------------------------------------
    // Node queries
    // ------------------------------------------------------------------

    /// The element's tag name.
    pub fn tag(&self, node: NodeId) -> Result<String, DomError> {
        let nodes = self.inner.nodes.read();
        let data = nodes.get(&node).ok_or(DomError::NodeNotFound(node))?;
        data.tag.clone().ok_or(DomError::NotAnElement(node))
    }

    /// The text node's content, if `node` is a text node.
    pub fn text(&self, node: NodeId) -> Option<String> {
        self.inner.nodes.read().get(&node).and_then(|data| data.text.clone())
    }

    /// Replace a text node's content.
    pub fn set_text(&self, node: NodeId, text: &str) {
        let mut nodes = self.inner.nodes.write();
        match nodes.get_mut(&node) {
            Some(data) if data.kind == NodeKind::Text => data.text = Some(text.to_string()),
            Some(_) => warn!(?node, "set_text on an element node ignored"),
            None => warn!(?node, "set_text on unknown node ignored"),
        }
    }

    /// The node's current parent, if attached.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.nodes.read().get(&node).and_then(|data| data.parent)
    }

    /// The parent's children, in order.
    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        self.inner
            .nodes
            .read()
            .get(&parent)
            .map(|data| data.children.to_vec())
            .unwrap_or_default()
    }

    /// Number of children under `parent`.
    pub fn child_count(&self, parent: NodeId) -> usize {
        self.inner
            .nodes
            .read()
            .get(&parent)
            .map(|data| data.children.len())
            .unwrap_or(0)
    }

    /// The child at `index`, if occupied.
    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.inner
            .nodes
            .read()
            .get(&parent)
            .and_then(|data| data.children.get(index).copied())
    }

    // ------------------------------------------------------------------
    // Tree mutation
    // ------------------------------------------------------------------

    /// Append `child` as the last child of `parent`.
    ///
    /// Detaches `child` from its previous parent first.
    pub fn append_child(&self, parent: NodeId, child: NodeId) {
        let mut nodes = self.inner.nodes.write();
        if !nodes.contains_key(&parent) || !nodes.contains_key(&child) {
            warn!(?parent, ?child, "append_child with unknown node ignored");
            return;
        }
        detach_in(&mut nodes, child);
        nodes.get_mut(&parent).expect("parent checked above").children.push(child);
        nodes.get_mut(&child).expect("child checked above").parent = Some(parent);
    }

    /// Insert `node` before `reference` under `parent`.
    ///
    /// DOM semantics: `node` is detached from its previous position (which
    /// may be under the same parent) and inserted immediately before
    /// `reference`; with `reference` of `None`, or a reference that is not a
    /// child of `parent`, it is appended at the end.
    pub fn insert_before(&self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        let mut nodes = self.inner.nodes.write();
        if !nodes.contains_key(&parent) || !nodes.contains_key(&node) {
            warn!(?parent, ?node, "insert_before with unknown node ignored");
            return;
        }
        detach_in(&mut nodes, node);
        let data = nodes.get_mut(&parent).expect("parent checked above");
        let index = reference
            .and_then(|reference| data.children.iter().position(|&child| child == reference))
            .unwrap_or(data.children.len());
        data.children.insert(index, node);
        nodes.get_mut(&node).expect("node checked above").parent = Some(parent);
    }

    /// Swap `new` into `old`'s position under `parent`; `old` is detached.
    pub fn replace_child(&self, parent: NodeId, old: NodeId, new: NodeId) {
        let mut nodes = self.inner.nodes.write();
        if !nodes.contains_key(&parent) || !nodes.contains_key(&new) {
            warn!(?parent, ?new, "replace_child with unknown node ignored");
            return;
        }
        detach_in(&mut nodes, new);
        let data = nodes.get_mut(&parent).expect("parent checked above");
        let Some(index) = data.children.iter().position(|&child| child == old) else {
            warn!(?parent, ?old, "replace_child: old node is not a child; ignored");
            return;
        };
        data.children[index] = new;
        nodes.get_mut(&new).expect("new checked above").parent = Some(parent);
        if let Some(old_data) = nodes.get_mut(&old) {
            old_data.parent = None;
        }
    }

    /// Detach `child` from `parent`.
    pub fn remove_child(&self, parent: NodeId, child: NodeId) {
        let mut nodes = self.inner.nodes.write();
        let attached = nodes.get(&child).map(|data| data.parent == Some(parent));
        match attached {
            Some(true) => detach_in(&mut nodes, child),
            Some(false) => warn!(?parent, ?child, "remove_child: node is not a child; ignored"),
            None => warn!(?child, "remove_child with unknown node ignored"),
        }
    }

    /// Drop a detached subtree's storage from the arena.
    ///
    /// The node must already be detached (and torn down, if it owned
    /// resources); discarding an attached node is ignored with a warning.
    pub fn discard(&self, node: NodeId) {
        let mut nodes = self.inner.nodes.write();
        let attached = nodes.get(&node).map(|data| data.parent.is_some());
        match attached {
            Some(true) => warn!(?node, "discard of an attached node ignored"),
            Some(false) => discard_in(&mut nodes, node),
            None => {}
        }
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    /// Set (or overwrite) an attribute. First set fixes its position in the
    /// serialization order.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        let mut nodes = self.inner.nodes.write();
        match nodes.get_mut(&node) {
            Some(data) if data.kind == NodeKind::Element => {
                data.attributes.insert(name.to_string(), value.to_string());
            }
            Some(_) => warn!(?node, name, "set_attribute on a text node ignored"),
            None => warn!(?node, name, "set_attribute on unknown node ignored"),
        }
    }

    /// Read an attribute value.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.inner
            .nodes
            .read()
            .get(&node)
            .and_then(|data| data.attributes.get(name).cloned())
    }

    /// Remove an attribute if present.
    pub fn remove_attribute(&self, node: NodeId, name: &str) {
        let mut nodes = self.inner.nodes.write();
        if let Some(data) = nodes.get_mut(&node) {
            data.attributes.shift_remove(name);
        }
    }

    /// All attributes in serialization order.
    pub fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        self.inner
            .nodes
            .read()
            .get(&node)
            .map(|data| {
                data.attributes
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Event handler properties
    // ------------------------------------------------------------------

    /// Store a handler under its property name (`onclick`, `onkeyup`, …).
    pub fn set_handler(&self, node: NodeId, property: &str, handler: EventHandler) {
        let mut nodes = self.inner.nodes.write();
        match nodes.get_mut(&node) {
            Some(data) => {
                data.handlers.insert(property.to_string(), handler);
            }
            None => warn!(?node, property, "set_handler on unknown node ignored"),
        }
    }

    /// Clear a handler property (the release path for listener bindings).
    pub fn clear_handler(&self, node: NodeId, property: &str) {
        let mut nodes = self.inner.nodes.write();
        if let Some(data) = nodes.get_mut(&node) {
            data.handlers.remove(property);
        }
    }

    /// Whether a handler property is currently set.
    pub fn has_handler(&self, node: NodeId, property: &str) -> bool {
        self.inner
            .nodes
            .read()
            .get(&node)
            .map(|data| data.handlers.contains_key(property))
            .unwrap_or(false)
    }

    /// Deliver an event to the node's `on<event>` handler.
    ///
    /// Returns `Ok(true)` if a handler ran, `Ok(false)` if none was set.
    /// The handler runs with no document lock held, so it is free to read
    /// and mutate the tree.
    pub fn dispatch(&self, node: NodeId, event: &str) -> Result<bool, DomError> {
        self.dispatch_with(node, event, None)
    }

    /// [`Document::dispatch`] with an event payload.
    pub fn dispatch_with(
        &self,
        node: NodeId,
        event: &str,
        detail: Option<String>,
    ) -> Result<bool, DomError> {
        let property = format!("on{event}");
        let handler = {
            let nodes = self.inner.nodes.read();
            let data = nodes.get(&node).ok_or(DomError::NodeNotFound(node))?;
            data.handlers.get(&property).cloned()
        };
        match handler {
            Some(handler) => {
                handler(&Event { target: node, detail });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ------------------------------------------------------------------
    // Key tags
    // ------------------------------------------------------------------

    /// Tag a node with the key it was rendered for.
    ///
    /// A non-owning lookup field used by keyed reconciliation to reuse and
    /// move nodes by identity.
    pub fn set_key(&self, node: NodeId, key: Key) {
        let mut nodes = self.inner.nodes.write();
        match nodes.get_mut(&node) {
            Some(data) => data.key = Some(key),
            None => warn!(?node, "set_key on unknown node ignored"),
        }
    }

    /// The node's key tag, if any.
    pub fn key_of(&self, node: NodeId) -> Option<Key> {
        self.inner.nodes.read().get(&node).and_then(|data| data.key.clone())
    }

    /// Find the child of `parent` tagged with `key`.
    pub fn find_child_by_key(&self, parent: NodeId, key: &Key) -> Option<NodeId> {
        let nodes = self.inner.nodes.read();
        let parent_data = nodes.get(&parent)?;
        parent_data
            .children
            .iter()
            .copied()
            .find(|child| nodes.get(child).and_then(|data| data.key.as_ref()) == Some(key))
    }

    // ------------------------------------------------------------------
    // Teardown side-table
    // ------------------------------------------------------------------

    /// Park a node's registry for later teardown.
    pub fn register_teardown(&self, node: NodeId, registry: Registry) {
        self.inner.registries.insert(node, registry);
    }

    /// Whether a registry is still parked for this node.
    pub fn has_teardown(&self, node: NodeId) -> bool {
        self.inner.registries.contains_key(&node)
    }

    /// Release every resource owned by `node`'s subtree.
    ///
    /// Walks the subtree post-order (children before parent) and destroys
    /// each parked registry. Registries are taken out of the side-table
    /// first, so each node's resources are released at most once; calling
    /// `teardown` again on the same subtree is a no-op.
    ///
    /// Callers must tear down *before* detaching from the tree, so handler
    /// properties are cleared while the node is still formally attached.
    pub fn teardown(&self, node: NodeId) {
        let order = {
            let nodes = self.inner.nodes.read();
            let mut order = Vec::new();
            collect_post_order(&nodes, node, &mut order);
            order
        };
        for id in order {
            if let Some((_, registry)) = self.inner.registries.remove(&id) {
                registry.destroy(self);
            }
        }
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// Render a subtree as HTML-shaped text.
    ///
    /// Deterministic (attribute insertion order is preserved), so tests and
    /// demos can snapshot it.
    pub fn render_html(&self, node: NodeId) -> Result<String, DomError> {
        let nodes = self.inner.nodes.read();
        if !nodes.contains_key(&node) {
            return Err(DomError::NodeNotFound(node));
        }
        let mut out = String::new();
        write_html(&nodes, node, &mut out);
        Ok(out)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("node_count", &self.node_count())
            .finish()
    }
}

/// Remove `node` from its parent's child list, if attached.
fn detach_in(nodes: &mut HashMap<NodeId, NodeData>, node: NodeId) {
    let Some(parent) = nodes.get(&node).and_then(|data| data.parent) else {
        return;
    };
    if let Some(parent_data) = nodes.get_mut(&parent) {
        parent_data.children.retain(|child| *child != node);
    }
    if let Some(data) = nodes.get_mut(&node) {
        data.parent = None;
    }
}

/// Drop a subtree's storage, leaves first.
fn discard_in(nodes: &mut HashMap<NodeId, NodeData>, node: NodeId) {
    let children = nodes
        .get(&node)
        .map(|data| data.children.to_vec())
        .unwrap_or_default();
    for child in children {
        discard_in(nodes, child);
    }
    nodes.remove(&node);
}

/// Collect `node`'s subtree post-order: children before parent.
fn collect_post_order(nodes: &HashMap<NodeId, NodeData>, node: NodeId, out: &mut Vec<NodeId>) {
    if let Some(data) = nodes.get(&node) {
        for &child in &data.children {
            collect_post_order(nodes, child, out);
        }
        out.push(node);
    }
}

fn write_html(nodes: &HashMap<NodeId, NodeData>, node: NodeId, out: &mut String) {
    let Some(data) = nodes.get(&node) else { return };
    match data.kind {
        NodeKind::Text => {
            if let Some(text) = &data.text {
                out.push_str(&escape_text(text));
            }
        }
        NodeKind::Element => {
            let tag = data.tag.as_deref().unwrap_or("");
            out.push('<');
            out.push_str(tag);
            for (name, value) in &data.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attribute(value));
                out.push('"');
            }
            out.push('>');
            for &child in &data.children {
                write_html(nodes, child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
