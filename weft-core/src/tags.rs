//! Tag Helpers
//!
//! Thin wrappers over [`create_element`], one per common tag, plus the
//! [`args!`] and [`attrs!`] macros for building the ordered argument list
//! and the attribute map. Nothing here binds anything: these exist so call
//! sites read like markup.

use crate::element::{create_element, Arg, AttrMap, Element};

macro_rules! tag_helpers {
    ($( $name:ident => $tag:literal ),* $(,)?) => {
        $(
            #[doc = concat!("Build a `<", $tag, ">` element in the global document.")]
            pub fn $name(args: impl IntoIterator<Item = Arg>) -> Element {
                create_element($tag, args)
            }
        )*
    };
}

tag_helpers! {
    div => "div",
    span => "span",
    p => "p",
    h1 => "h1",
    h2 => "h2",
    ul => "ul",
    ol => "ol",
    li => "li",
    button => "button",
    label => "label",
    section => "section",
    header => "header",
    footer => "footer",
}

/// Build an `<input>` element in the global document.
///
/// Inputs carry attributes only; they have no children.
pub fn input(attributes: AttrMap) -> Element {
    create_element("input", [Arg::Attrs(attributes)])
}

/// Build the ordered argument list for an element.
///
/// Interleaves whatever it is given — literal text, numbers, elements,
/// child lists, live streams, or a leading attribute map — into the
/// positional argument order, converting each entry with
/// [`Arg::from`](crate::element::Arg). It performs no binding itself.
#[macro_export]
macro_rules! args {
    ( $( $arg:expr ),* $(,)? ) => {
        vec![ $( $crate::element::Arg::from($arg) ),* ]
    };
}

/// Build an attribute map in application order.
#[macro_export]
macro_rules! attrs {
    ( $( $name:literal => $value:expr ),* $(,)? ) => {{
        let mut attrs = $crate::element::AttrMap::new();
        $(
            attrs.insert($name.to_string(), $crate::element::AttrValue::from($value));
        )*
        attrs
    }};
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
