//! Weft Core
//!
//! This crate provides the core runtime for the Weft reactive UI toolkit:
//! function-based element construction that binds live state streams
//! directly to a host tree, with no virtual DOM in between. It implements:
//!
//! - Push-based stream primitives (states, streams, subscriptions)
//! - An in-memory host tree behind opaque node handles
//! - The reconciliation and lifecycle engine: attribute binding, child
//!   reconciliation (scalar, sequence, and keyed emissions), and exact
//!   once-per-node resource teardown
//! - Tag helpers that make call sites read like markup
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: states, streams, and cancellable subscriptions
//! - `dom`: the document arena and its DOM-shaped operation surface
//! - `element`: the factory, attribute binder, child reconciler, and
//!   per-element resource registry
//! - `tags`: thin tag-helper wrappers and the `args!` / `attrs!` macros
//!
//! # Example
//!
//! ```rust,ignore
//! use weft_core::{args, attrs, div, button, span, AttrValue, Value, State};
//!
//! let count = State::new(0);
//!
//! let counter = count.clone();
//! let view = div(args![
//!     span(args![count.derive(|n| Value::from(*n))]),
//!     button(args![
//!         attrs! { "onclick" => AttrValue::handler(move |_| counter.update(|n| n + 1)) },
//!         "increment",
//!     ]),
//! ]);
//!
//! // Dispatching a click re-renders the span's text synchronously.
//! view.document().dispatch(view.document().children(view.node())[1], "click").unwrap();
//! ```
//!
//! # Concurrency Model
//!
//! Single-threaded and cooperative: a state change is delivered to every
//! subscriber, and the tree is fully updated, before `set` returns. The
//! types are `Send + Sync`, but there is no scheduler, no batching, and no
//! support for re-entrant emission on the same state.

pub mod dom;
pub mod element;
pub mod reactive;
pub mod tags;

// Re-export commonly used items
pub use dom::{document, Document, DomError, Event, EventHandler, NodeId, NodeKind};
pub use element::{
    create_element, each, keyed, Arg, AttrMap, AttrValue, Child, Element, Emission, Key, Registry,
    Resource, Value,
};
pub use reactive::{State, Stream, SubscriberId, Subscription};
pub use tags::*;
