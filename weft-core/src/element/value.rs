//! Value Model
//!
//! Explicit tagged variants for everything an element can be given: scalar
//! values, child slots, emissions, attribute values, and factory arguments.
//! The producer states the shape up front, so the engine dispatches on an
//! enum tag instead of probing values at runtime.

use indexmap::IndexMap;

use crate::dom::EventHandler;
use crate::reactive::Stream;

use super::factory::Element;

/// A scalar child or attribute payload.
///
/// `Nil` covers both "no value" spellings of dynamic hosts; the engine
/// treats nil as *absence* (no node, no attribute), never as display text.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Node(Element),
    Nil,
}

impl Value {
    /// Whether this is the absent value.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// The display form, for text nodes and attribute values.
    ///
    /// `Nil` and `Node` have none: nil is absence, and an element renders as
    /// itself rather than as text.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Str(text) => Some(text.clone()),
            Value::Int(n) => Some(n.to_string()),
            Value::Float(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Node(_) | Value::Nil => None,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Str(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Str(text)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Element> for Value {
    fn from(element: Element) -> Self {
        Value::Node(element)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Nil)
    }
}

/// Identity of one keyed entry.
///
/// Key *identity* (not the rendered value) decides whether an existing node
/// is reused, moved, or discarded across keyed emissions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Key::Int(n.into())
    }
}

impl From<usize> for Key {
    fn from(n: usize) -> Self {
        Key::Int(n as i64)
    }
}

impl From<&str> for Key {
    fn from(text: &str) -> Self {
        Key::Str(text.to_string())
    }
}

impl From<String> for Key {
    fn from(text: String) -> Self {
        Key::Str(text)
    }
}

/// The shape of one live-child emission.
///
/// A single live slot may emit any of these over its lifetime; the
/// reconciler dispatches on the tag of each emission as it arrives.
#[derive(Clone, Debug)]
pub enum Emission {
    /// One value for the slot's own index.
    Scalar(Value),

    /// The authoritative content of the slot's contiguous range.
    Sequence(Vec<Value>),

    /// Identity-keyed content of the slot's range; iteration order is the
    /// target order. Key uniqueness is the caller's contract — building the
    /// map collapses duplicates (first position, last value).
    Keyed(IndexMap<Key, Value>),
}

impl Emission {
    /// A scalar emission.
    pub fn scalar(value: impl Into<Value>) -> Self {
        Emission::Scalar(value.into())
    }

    /// A sequence emission.
    pub fn sequence(values: impl IntoIterator<Item = Value>) -> Self {
        Emission::Sequence(values.into_iter().collect())
    }

    /// A keyed emission; pair order becomes target order.
    pub fn keyed(pairs: impl IntoIterator<Item = (Key, Value)>) -> Self {
        Emission::Keyed(pairs.into_iter().collect())
    }
}

impl From<Value> for Emission {
    fn from(value: Value) -> Self {
        Emission::Scalar(value)
    }
}

impl From<Vec<Value>> for Emission {
    fn from(values: Vec<Value>) -> Self {
        Emission::Sequence(values)
    }
}

impl From<IndexMap<Key, Value>> for Emission {
    fn from(pairs: IndexMap<Key, Value>) -> Self {
        Emission::Keyed(pairs)
    }
}

/// One declared child slot.
#[derive(Clone)]
pub enum Child {
    /// A static value, rendered once and never re-examined.
    Value(Value),

    /// A fixed-length list of static-or-live entries, spliced into
    /// consecutive slots at construction.
    List(Vec<Child>),

    /// A live slot driven by a stream of emissions.
    Live(Stream<Emission>),
}

impl std::fmt::Debug for Child {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Child::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Child::List(children) => f.debug_tuple("List").field(children).finish(),
            Child::Live(_) => f.debug_tuple("Live").finish(),
        }
    }
}

impl From<Value> for Child {
    fn from(value: Value) -> Self {
        Child::Value(value)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Value(text.into())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Value(text.into())
    }
}

impl From<i64> for Child {
    fn from(n: i64) -> Self {
        Child::Value(n.into())
    }
}

impl From<i32> for Child {
    fn from(n: i32) -> Self {
        Child::Value(n.into())
    }
}

impl From<bool> for Child {
    fn from(b: bool) -> Self {
        Child::Value(b.into())
    }
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Child::Value(element.into())
    }
}

impl From<Vec<Child>> for Child {
    fn from(children: Vec<Child>) -> Self {
        Child::List(children)
    }
}

impl From<Stream<Emission>> for Child {
    fn from(stream: Stream<Emission>) -> Self {
        Child::Live(stream)
    }
}

impl From<Stream<Value>> for Child {
    fn from(stream: Stream<Value>) -> Self {
        Child::Live(stream.map(|value| Emission::Scalar(value.clone())))
    }
}

/// An attribute's declared value.
#[derive(Clone)]
pub enum AttrValue {
    /// Set once at construction; nil is skipped entirely.
    Static(Value),

    /// An event-handling property; released by clearing the property.
    Handler(EventHandler),

    /// Re-applied on every emission; nil removes the attribute.
    Live(Stream<Value>),
}

impl AttrValue {
    /// Wrap a closure as an event handler value.
    pub fn handler(f: impl Fn(&crate::dom::Event) + Send + Sync + 'static) -> Self {
        AttrValue::Handler(std::sync::Arc::new(f))
    }
}

impl std::fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Static(value) => f.debug_tuple("Static").field(value).finish(),
            AttrValue::Handler(_) => f.debug_tuple("Handler").finish(),
            AttrValue::Live(_) => f.debug_tuple("Live").finish(),
        }
    }
}

impl From<Value> for AttrValue {
    fn from(value: Value) -> Self {
        AttrValue::Static(value)
    }
}

impl From<&str> for AttrValue {
    fn from(text: &str) -> Self {
        AttrValue::Static(text.into())
    }
}

impl From<String> for AttrValue {
    fn from(text: String) -> Self {
        AttrValue::Static(text.into())
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Static(n.into())
    }
}

impl From<i32> for AttrValue {
    fn from(n: i32) -> Self {
        AttrValue::Static(n.into())
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Static(b.into())
    }
}

impl From<EventHandler> for AttrValue {
    fn from(handler: EventHandler) -> Self {
        AttrValue::Handler(handler)
    }
}

impl From<Stream<Value>> for AttrValue {
    fn from(stream: Stream<Value>) -> Self {
        AttrValue::Live(stream)
    }
}

/// An attribute map in application order.
pub type AttrMap = IndexMap<String, AttrValue>;

/// One positional argument to the element factory.
///
/// The original call convention lets the attribute map be omitted when an
/// element only has children; the sum type is the explicit spelling of that
/// "is this an attribute map or a child?" decision.
#[derive(Debug)]
pub enum Arg {
    Attrs(AttrMap),
    Child(Child),
}

impl From<AttrMap> for Arg {
    fn from(attrs: AttrMap) -> Self {
        Arg::Attrs(attrs)
    }
}

impl From<Child> for Arg {
    fn from(child: Child) -> Self {
        Arg::Child(child)
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Child(value.into())
    }
}

impl From<&str> for Arg {
    fn from(text: &str) -> Self {
        Arg::Child(text.into())
    }
}

impl From<String> for Arg {
    fn from(text: String) -> Self {
        Arg::Child(text.into())
    }
}

impl From<i64> for Arg {
    fn from(n: i64) -> Self {
        Arg::Child(n.into())
    }
}

impl From<i32> for Arg {
    fn from(n: i32) -> Self {
        Arg::Child(n.into())
    }
}

impl From<Element> for Arg {
    fn from(element: Element) -> Self {
        Arg::Child(element.into())
    }
}

impl From<Vec<Child>> for Arg {
    fn from(children: Vec<Child>) -> Self {
        Arg::Child(Child::List(children))
    }
}

impl From<Stream<Emission>> for Arg {
    fn from(stream: Stream<Emission>) -> Self {
        Arg::Child(stream.into())
    }
}

impl From<Stream<Value>> for Arg {
    fn from(stream: Stream<Value>) -> Self {
        Arg::Child(stream.into())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
