//! Element Engine
//!
//! The reconciliation and lifecycle core: the element factory, the
//! attribute binder, the child reconciler, and the per-element resource
//! registry.
//!
//! # Data Flow
//!
//! [`create_element`] runs once per node construction. It hands the
//! attribute map to the binder and every flattened child slot to the
//! reconciler; both record acquired resources (stream subscriptions,
//! event-handler properties) in the element's [`Registry`]. The registry is
//! then parked in the document's side-table, so whichever reconciler later
//! removes or replaces the node can release everything with a single
//! teardown that cascades through the subtree.
//!
//! # Shapes
//!
//! Producers declare shapes explicitly with the tagged types in this
//! module: [`Value`], [`Child`], [`Emission`], [`AttrValue`], and the
//! factory argument [`Arg`]. The engine dispatches on tags; nothing is
//! probed at runtime.

mod attributes;
mod children;
mod factory;
mod helpers;
mod registry;
mod value;

pub use factory::{create_element, Element};
pub use helpers::{each, keyed};
pub use registry::{Registry, Resource};
pub use value::{Arg, AttrMap, AttrValue, Child, Emission, Key, Value};
