//! Child Reconciler
//!
//! Keeps a parent's actual children synchronized with the declared content
//! of each child slot. A slot is a logical position fixed at construction:
//! static slots render once; live slots re-render on every emission, with
//! the interpretation chosen by the emission's shape.
//!
//! # Slot Shapes
//!
//! - **Scalar**: one value at the slot's own index. Create-or-replace on a
//!   value, remove on nil.
//! - **Sequence**: the authoritative content of a contiguous range starting
//!   at the slot's base index. Nil entries render nothing and close the gap
//!   (dense render); when an emission is shorter than the last one, the
//!   trailing nodes of the range are pruned.
//! - **Keyed**: identity-preserving list rendering. Nodes are tagged with
//!   the key they were rendered for; across emissions a key's node is
//!   reused and moved rather than recreated, and keys that disappear take
//!   their nodes (and resources) with them.
//!
//! # Lifecycle Discipline
//!
//! Whenever a node is replaced or removed, its subtree is torn down
//! *before* it leaves the tree, then its storage is retired from the arena.
//! Per-slot bookkeeping (the previous dense length) lives in an explicit
//! state record owned by the slot's subscription closure.

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::dom::{Document, NodeId};

use super::registry::{Registry, Resource};
use super::value::{Child, Emission, Key, Value};

/// Mutable bookkeeping for one live slot.
struct SlotState {
    /// Dense (non-nil) length of the previous sequence emission, and the
    /// entry count of the previous keyed emission.
    rendered_len: usize,
}

/// Wire one declared child slot to `parent` at `index`.
///
/// Static content renders immediately; live content subscribes, renders the
/// replayed current value if the stream has one, and records the
/// subscription in the element's registry.
pub(crate) fn mount_child(
    document: &Document,
    parent: NodeId,
    index: usize,
    child: Child,
    registry: &Registry,
) {
    match child {
        Child::Value(value) => {
            // Nil static children render nothing and are never revisited.
            if !value.is_nil() {
                create_or_replace(document, parent, index, &value);
            }
        }
        Child::List(_) => {
            // The factory splices lists one level deep before assigning
            // slot indices; anything deeper is a caller contract violation.
            warn!(?parent, index, "nested child list reached the reconciler; ignored");
        }
        Child::Live(stream) => {
            let document = document.clone();
            let state = Mutex::new(SlotState { rendered_len: 0 });
            let subscription = stream.subscribe(move |emission| {
                let mut state = state.lock();
                apply_emission(&document, parent, index, emission, &mut state);
            });
            registry.register(Resource::Subscription(subscription));
        }
    }
}

fn apply_emission(
    document: &Document,
    parent: NodeId,
    base: usize,
    emission: &Emission,
    state: &mut SlotState,
) {
    match emission {
        Emission::Scalar(value) => apply_scalar(document, parent, base, value),
        Emission::Sequence(values) => apply_sequence(document, parent, base, values, state),
        Emission::Keyed(entries) => apply_keyed(document, parent, base, entries, state),
    }
}

/// One value at the slot's index: nil removes, anything else replaces.
fn apply_scalar(document: &Document, parent: NodeId, index: usize, value: &Value) {
    if value.is_nil() {
        // A slot can become nil after having rendered; absence means the
        // node has to go, not that "null" gets displayed.
        if let Some(node) = document.child_at(parent, index) {
            retire(document, parent, node);
        }
    } else {
        create_or_replace(document, parent, index, value);
    }
}

/// Dense render of a sequence into the slot's range, pruning the tail.
fn apply_sequence(
    document: &Document,
    parent: NodeId,
    base: usize,
    values: &[Value],
    state: &mut SlotState,
) {
    let mut rendered = 0;
    for value in values {
        if value.is_nil() {
            // Skipped entries compress the offsets of everything after
            // them; a nil never leaves a gap.
            continue;
        }
        create_or_replace(document, parent, base + rendered, value);
        rendered += 1;
    }

    // A shorter emission leaves stale trailing nodes in the range.
    while state.rendered_len > rendered {
        if let Some(node) = document.child_at(parent, base + rendered) {
            retire(document, parent, node);
        }
        state.rendered_len -= 1;
    }
    state.rendered_len = rendered;
}

/// Identity-preserving reconciliation of a keyed emission.
///
/// Position by position against the mapping's iteration order: a matching
/// key is left alone, a known key is moved into place, an unknown key gets
/// a fresh node, and occupants whose keys are gone from the mapping are
/// torn down and removed.
fn apply_keyed(
    document: &Document,
    parent: NodeId,
    base: usize,
    entries: &IndexMap<Key, Value>,
    state: &mut SlotState,
) {
    for (offset, (key, value)) in entries.iter().enumerate() {
        let position = base + offset;
        // A nil-valued entry reserves its key but renders nothing.
        if value.is_nil() {
            continue;
        }
        let occupant = document.child_at(parent, position);

        match occupant {
            Some(node) if document.key_of(node).as_ref() == Some(key) => {
                trace!(?key, position, "keyed: occupant matches; no change");
                discard_unused(document, value, node);
            }
            None => {
                trace!(?key, position, "keyed: slot vacant; creating node");
                let node = create_node(document, value);
                document.set_key(node, key.clone());
                document.insert_before(parent, node, None);
            }
            Some(node) => {
                // The occupant has the wrong key. If its own key has no
                // future home in the mapping, it goes now.
                let evict = match document.key_of(node) {
                    Some(node_key) => !entries.contains_key(&node_key),
                    None => true,
                };
                if evict {
                    trace!(?key, position, "keyed: occupant's key is gone; removing it");
                    retire(document, parent, node);
                }

                let reference = document.child_at(parent, position);
                if let Some(existing) = document.find_child_by_key(parent, key) {
                    trace!(?key, position, "keyed: moving existing node into place");
                    document.insert_before(parent, existing, reference);
                    discard_unused(document, value, existing);
                } else {
                    trace!(?key, position, "keyed: no node for this key; creating one");
                    let node = create_node(document, value);
                    document.set_key(node, key.clone());
                    document.insert_before(parent, node, reference);
                }
            }
        }
    }

    // Shrinkage: everything left in the range past the mapping is examined,
    // and occupants whose keys are gone are removed. Removal re-examines
    // the same position, so multi-node shrinkage prunes completely.
    let mut position = base + entries.len();
    while let Some(node) = document.child_at(parent, position) {
        let stale = match document.key_of(node) {
            Some(node_key) => !entries.contains_key(&node_key),
            None => true,
        };
        if stale {
            trace!(position, "keyed: trailing node's key is gone; removing it");
            retire(document, parent, node);
        } else {
            position += 1;
        }
    }

    state.rendered_len = entries.len();
}

/// Insert a node for `value` at `index`: replace the occupant (tearing it
/// down first) or append when the index is vacant.
fn create_or_replace(document: &Document, parent: NodeId, index: usize, value: &Value) -> NodeId {
    let node = create_node(document, value);
    if let Some(current) = document.child_at(parent, index) {
        if current == node {
            // Re-emission of the element already in place.
            return node;
        }
        document.teardown(current);
        document.replace_child(parent, current, node);
        document.discard(current);
    } else {
        document.append_child(parent, node);
    }
    node
}

/// The node rendering a value: the element's own node, or a fresh text node.
fn create_node(document: &Document, value: &Value) -> NodeId {
    match value {
        Value::Node(element) => element.node(),
        other => document.create_text_node(other.to_text().unwrap_or_default().as_str()),
    }
}

/// Teardown, detach, and retire one node: resources are released while the
/// node is still attached, then the subtree's storage leaves the arena.
fn retire(document: &Document, parent: NodeId, node: NodeId) {
    document.teardown(node);
    document.remove_child(parent, node);
    document.discard(node);
}

/// Release a keyed render product that was not mounted.
///
/// When a key matches an existing node, the freshly rendered value for that
/// key is never inserted; if it is an element, its resources were acquired
/// at construction and would otherwise leak.
fn discard_unused(document: &Document, value: &Value, kept: NodeId) {
    if let Value::Node(element) = value {
        if element.node() != kept && document.parent(element.node()).is_none() {
            document.teardown(element.node());
            document.discard(element.node());
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::State;

    /// Text content of every child under `parent`, in order.
    fn child_texts(doc: &Document, parent: NodeId) -> Vec<String> {
        doc.children(parent)
            .into_iter()
            .map(|child| doc.text(child).unwrap_or_default())
            .collect()
    }

    fn mount_live(doc: &Document, parent: NodeId, index: usize, state: &State<Emission>) -> Registry {
        let registry = Registry::new();
        mount_child(doc, parent, index, Child::Live(state.stream()), &registry);
        registry
    }

    #[test]
    fn static_values_render_in_slot_order() {
        let doc = Document::new();
        let parent = doc.create_element_node("div");
        let registry = Registry::new();

        mount_child(&doc, parent, 0, Child::from("a"), &registry);
        mount_child(&doc, parent, 1, Child::from(42), &registry);
        mount_child(&doc, parent, 2, Child::Value(Value::Nil), &registry);
        mount_child(&doc, parent, 3, Child::from("b"), &registry);

        assert_eq!(child_texts(&doc, parent), vec!["a", "42", "b"]);
        // Static slots acquire nothing.
        assert!(registry.is_empty());
    }

    #[test]
    fn scalar_nil_removes_the_node() {
        let doc = Document::new();
        let parent = doc.create_element_node("div");
        let slot = State::new(Emission::scalar("hello"));
        let _registry = mount_live(&doc, parent, 0, &slot);

        assert_eq!(child_texts(&doc, parent), vec!["hello"]);

        slot.set(Emission::Scalar(Value::Nil));
        assert_eq!(doc.child_count(parent), 0);

        // Nil on an empty slot is a no-op.
        slot.set(Emission::Scalar(Value::Nil));
        assert_eq!(doc.child_count(parent), 0);

        // And the slot can render again afterwards.
        slot.set(Emission::scalar("back"));
        assert_eq!(child_texts(&doc, parent), vec!["back"]);
    }

    #[test]
    fn scalar_reemission_replaces_in_place() {
        let doc = Document::new();
        let parent = doc.create_element_node("div");
        let slot = State::new(Emission::scalar("one"));
        let _registry = mount_live(&doc, parent, 0, &slot);

        let first = doc.child_at(parent, 0).unwrap();
        slot.set(Emission::scalar("two"));
        let second = doc.child_at(parent, 0).unwrap();

        assert_ne!(first, second);
        assert_eq!(child_texts(&doc, parent), vec!["two"]);
        // The replaced text node's storage is retired.
        assert!(!doc.contains(first));
    }

    #[test]
    fn sequence_shrink_prunes_trailing_nodes() {
        let doc = Document::new();
        let parent = doc.create_element_node("ul");
        let slot = State::new(Emission::sequence([
            Value::from("a"),
            Value::from("b"),
            Value::from("c"),
        ]));
        let _registry = mount_live(&doc, parent, 0, &slot);

        assert_eq!(child_texts(&doc, parent), vec!["a", "b", "c"]);

        slot.set(Emission::sequence([Value::from("a")]));
        assert_eq!(child_texts(&doc, parent), vec!["a"]);
    }

    #[test]
    fn sequence_nil_entries_render_densely() {
        let doc = Document::new();
        let parent = doc.create_element_node("ul");
        let slot = State::new(Emission::sequence([
            Value::from("a"),
            Value::Nil,
            Value::from("b"),
        ]));
        let _registry = mount_live(&doc, parent, 0, &slot);

        // Exactly two nodes, no gap where the nil sat.
        assert_eq!(child_texts(&doc, parent), vec!["a", "b"]);
    }

    #[test]
    fn sequence_with_more_nils_prunes_stale_tail() {
        let doc = Document::new();
        let parent = doc.create_element_node("ul");
        let slot = State::new(Emission::sequence([Value::from("a"), Value::from("b")]));
        let _registry = mount_live(&doc, parent, 0, &slot);

        // Same emitted length, smaller dense length: the stale "b" must go.
        slot.set(Emission::sequence([Value::Nil, Value::from("x")]));
        assert_eq!(child_texts(&doc, parent), vec!["x"]);
    }

    #[test]
    fn sequence_grows_again_after_shrink() {
        let doc = Document::new();
        let parent = doc.create_element_node("ul");
        let slot = State::new(Emission::sequence([Value::from("a"), Value::from("b")]));
        let _registry = mount_live(&doc, parent, 0, &slot);

        slot.set(Emission::sequence([Value::from("a")]));
        slot.set(Emission::sequence([
            Value::from("x"),
            Value::from("y"),
            Value::from("z"),
        ]));

        assert_eq!(child_texts(&doc, parent), vec!["x", "y", "z"]);
    }

    #[test]
    fn keyed_reorder_moves_nodes_without_recreation() {
        let doc = Document::new();
        let parent = doc.create_element_node("ul");
        let slot = State::new(Emission::keyed([
            (Key::from(1), Value::from("A")),
            (Key::from(2), Value::from("B")),
        ]));
        let _registry = mount_live(&doc, parent, 0, &slot);

        let node_a = doc.child_at(parent, 0).unwrap();
        let node_b = doc.child_at(parent, 1).unwrap();

        slot.set(Emission::keyed([
            (Key::from(2), Value::from("B")),
            (Key::from(1), Value::from("A")),
        ]));

        // Same nodes, swapped order: identity is preserved by key.
        assert_eq!(doc.children(parent), vec![node_b, node_a]);
    }

    #[test]
    fn keyed_same_emission_changes_nothing() {
        let doc = Document::new();
        let parent = doc.create_element_node("ul");
        let slot = State::new(Emission::keyed([
            (Key::from("x"), Value::from("1")),
            (Key::from("y"), Value::from("2")),
        ]));
        let _registry = mount_live(&doc, parent, 0, &slot);

        let before = doc.children(parent);
        slot.set(Emission::keyed([
            (Key::from("x"), Value::from("1")),
            (Key::from("y"), Value::from("2")),
        ]));

        assert_eq!(doc.children(parent), before);
    }

    #[test]
    fn keyed_insertion_in_the_middle() {
        let doc = Document::new();
        let parent = doc.create_element_node("ul");
        let slot = State::new(Emission::keyed([
            (Key::from(1), Value::from("a")),
            (Key::from(3), Value::from("c")),
        ]));
        let _registry = mount_live(&doc, parent, 0, &slot);

        let node_a = doc.child_at(parent, 0).unwrap();
        let node_c = doc.child_at(parent, 1).unwrap();

        slot.set(Emission::keyed([
            (Key::from(1), Value::from("a")),
            (Key::from(2), Value::from("b")),
            (Key::from(3), Value::from("c")),
        ]));

        assert_eq!(child_texts(&doc, parent), vec!["a", "b", "c"]);
        // The old nodes kept their identity around the insertion.
        assert_eq!(doc.child_at(parent, 0), Some(node_a));
        assert_eq!(doc.child_at(parent, 2), Some(node_c));
    }

    #[test]
    fn keyed_removal_tears_down_exactly_once() {
        let doc = Document::new();
        let parent = doc.create_element_node("ul");

        let teardowns = std::sync::Arc::new(Mutex::new(0));

        // Key 5 renders an element carrying a live binding, so its teardown
        // is observable through the subscription count.
        let label = State::new(Value::from("five"));
        let item = doc.create_element(
            "li",
            [crate::element::Arg::from(label.derive(|v| v.clone()))],
        );
        {
            let teardowns = teardowns.clone();
            let registry = Registry::new();
            registry.register(Resource::Subscription(crate::reactive::Subscription::new(
                move || {
                    *teardowns.lock() += 1;
                },
            )));
            // Stack an extra sentinel registry teardown onto the item's node
            // by parking it under a child of the item.
            let sentinel = doc.create_element_node("span");
            doc.append_child(item.node(), sentinel);
            doc.register_teardown(sentinel, registry);
        }

        let slot = State::new(Emission::keyed([
            (Key::from(5), Value::from(item.clone())),
            (Key::from(6), Value::from("six")),
        ]));
        let _registry = mount_live(&doc, parent, 0, &slot);

        assert_eq!(doc.child_count(parent), 2);
        assert_eq!(label.subscriber_count(), 1);

        // Key 5 disappears: its node is removed and torn down, cascading
        // into the sentinel exactly once.
        slot.set(Emission::keyed([(Key::from(6), Value::from("six"))]));

        assert_eq!(child_texts(&doc, parent), vec!["six"]);
        assert_eq!(*teardowns.lock(), 1);
        assert_eq!(label.subscriber_count(), 0);

        // Re-emitting the same mapping does not release anything again.
        slot.set(Emission::keyed([(Key::from(6), Value::from("six"))]));
        assert_eq!(*teardowns.lock(), 1);
    }

    #[test]
    fn keyed_shrink_prunes_every_trailing_node() {
        let doc = Document::new();
        let parent = doc.create_element_node("ul");
        let slot = State::new(Emission::keyed([
            (Key::from(1), Value::from("a")),
            (Key::from(2), Value::from("b")),
            (Key::from(3), Value::from("c")),
            (Key::from(4), Value::from("d")),
        ]));
        let _registry = mount_live(&doc, parent, 0, &slot);

        slot.set(Emission::keyed([(Key::from(3), Value::from("c"))]));

        assert_eq!(child_texts(&doc, parent), vec!["c"]);
    }

    #[test]
    fn keyed_unused_render_product_is_released() {
        let doc = Document::new();
        let parent = doc.create_element_node("ul");

        let tick = State::new(Value::from("t"));
        let build_item = |doc: &Document| {
            doc.create_element("li", [crate::element::Arg::from(tick.derive(|v| v.clone()))])
        };

        let slot = State::new(Emission::keyed([(
            Key::from(1),
            Value::from(build_item(&doc)),
        )]));
        let _registry = mount_live(&doc, parent, 0, &slot);
        assert_eq!(tick.subscriber_count(), 1);

        // Same key, fresh render product: the product is never mounted and
        // its subscription must not leak.
        slot.set(Emission::keyed([(
            Key::from(1),
            Value::from(build_item(&doc)),
        )]));

        assert_eq!(doc.child_count(parent), 1);
        assert_eq!(tick.subscriber_count(), 1);
    }

    #[test]
    fn live_slot_never_emitting_renders_nothing() {
        let doc = Document::new();
        let parent = doc.create_element_node("div");
        let registry = Registry::new();

        mount_child(
            &doc,
            parent,
            0,
            Child::Live(crate::reactive::Stream::never()),
            &registry,
        );

        assert_eq!(doc.child_count(parent), 0);
        // The never-stream still produced a registered subscription handle.
        assert_eq!(registry.len(), 1);
    }
}
