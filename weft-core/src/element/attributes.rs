//! Attribute Binder
//!
//! Applies an attribute map to a node at construction time and keeps live
//! attributes in sync afterwards. Three paths, one per declared shape:
//!
//! - a handler becomes an event-handling property, recorded in the registry
//!   so teardown can clear it;
//! - a live value subscribes immediately and re-applies on every emission,
//!   with the subscription recorded in the registry;
//! - a static value is written once and never revisited (nil writes
//!   nothing at all).
//!
//! A live emission of nil *removes* the attribute — the same nil-means-
//! absent convention the child reconciler uses, rather than writing a
//! literal placeholder string.

use tracing::trace;

use crate::dom::{Document, NodeId};

use super::registry::{Registry, Resource};
use super::value::{AttrMap, AttrValue, Value};

/// Bind every attribute in `attrs` to `node`, recording acquired resources.
pub(crate) fn bind_attributes(
    document: &Document,
    node: NodeId,
    attrs: AttrMap,
    registry: &Registry,
) {
    for (name, value) in attrs {
        match value {
            AttrValue::Handler(handler) => {
                document.set_handler(node, &name, handler);
                registry.register(Resource::Listener { node, event: name });
            }
            AttrValue::Live(stream) => {
                let document = document.clone();
                let name = name.clone();
                let subscription = stream.subscribe(move |value| {
                    apply_attribute(&document, node, &name, value);
                });
                registry.register(Resource::Subscription(subscription));
            }
            AttrValue::Static(value) => {
                if let Some(text) = value.to_text() {
                    document.set_attribute(node, &name, &text);
                }
                // Nil static attributes are skipped: nothing is written.
            }
        }
    }
}

/// Apply one live emission to an attribute.
fn apply_attribute(document: &Document, node: NodeId, name: &str, value: &Value) {
    match value.to_text() {
        Some(text) => document.set_attribute(node, name, &text),
        None => {
            trace!(?node, name, "nil attribute emission; removing attribute");
            document.remove_attribute(node, name);
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::AttrValue;
    use crate::reactive::State;
    use indexmap::IndexMap;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;

    fn bind(document: &Document, node: NodeId, attrs: AttrMap) -> Registry {
        let registry = Registry::new();
        bind_attributes(document, node, attrs, &registry);
        registry
    }

    #[test]
    fn static_attribute_is_written_once() {
        let doc = Document::new();
        let node = doc.create_element_node("div");

        let mut attrs = IndexMap::new();
        attrs.insert("class".to_string(), AttrValue::from("todo"));
        attrs.insert("tabindex".to_string(), AttrValue::from(3));
        let registry = bind(&doc, node, attrs);

        assert_eq!(doc.attribute(node, "class"), Some("todo".to_string()));
        assert_eq!(doc.attribute(node, "tabindex"), Some("3".to_string()));
        // Static values acquire nothing.
        assert!(registry.is_empty());
    }

    #[test]
    fn nil_static_attribute_is_skipped() {
        let doc = Document::new();
        let node = doc.create_element_node("div");

        let mut attrs = IndexMap::new();
        attrs.insert("title".to_string(), AttrValue::Static(Value::Nil));
        bind(&doc, node, attrs);

        assert_eq!(doc.attribute(node, "title"), None);
    }

    #[test]
    fn handler_is_stored_and_registered() {
        let doc = Document::new();
        let node = doc.create_element_node("button");

        let clicks = Arc::new(AtomicI32::new(0));
        let clicks_clone = clicks.clone();

        let mut attrs = IndexMap::new();
        attrs.insert(
            "onclick".to_string(),
            AttrValue::handler(move |_| {
                clicks_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let registry = bind(&doc, node, attrs);

        assert!(doc.dispatch(node, "click").unwrap());
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);

        // Destroy clears the property; further dispatches find nothing.
        registry.destroy(&doc);
        assert!(!doc.dispatch(node, "click").unwrap());
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn live_attribute_follows_emissions() {
        let doc = Document::new();
        let node = doc.create_element_node("div");

        let color = State::new(Value::from("red"));
        let mut attrs = IndexMap::new();
        attrs.insert("style".to_string(), AttrValue::Live(color.stream()));
        let registry = bind(&doc, node, attrs);

        // Replay applied the current value immediately.
        assert_eq!(doc.attribute(node, "style"), Some("red".to_string()));

        color.set(Value::from("blue"));
        assert_eq!(doc.attribute(node, "style"), Some("blue".to_string()));
        // Still a single attribute entry.
        assert_eq!(doc.attributes(node).len(), 1);

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn nil_emission_removes_attribute() {
        let doc = Document::new();
        let node = doc.create_element_node("div");

        let title = State::new(Value::from("shown"));
        let mut attrs = IndexMap::new();
        attrs.insert("title".to_string(), AttrValue::Live(title.stream()));
        bind(&doc, node, attrs);

        assert_eq!(doc.attribute(node, "title"), Some("shown".to_string()));

        title.set(Value::Nil);
        assert_eq!(doc.attribute(node, "title"), None);

        // And it can come back.
        title.set(Value::from("again"));
        assert_eq!(doc.attribute(node, "title"), Some("again".to_string()));
    }

    #[test]
    fn destroyed_registry_stops_live_updates() {
        let doc = Document::new();
        let node = doc.create_element_node("div");

        let width = State::new(Value::from(100));
        let mut attrs = IndexMap::new();
        attrs.insert("width".to_string(), AttrValue::Live(width.stream()));
        let registry = bind(&doc, node, attrs);

        registry.destroy(&doc);

        width.set(Value::from(200));
        assert_eq!(doc.attribute(node, "width"), Some("100".to_string()));
    }
}
