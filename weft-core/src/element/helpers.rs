//! List Adapters
//!
//! Bridges from a `State<Vec<T>>` to the emission shapes the reconciler
//! consumes. These contain no reconciliation logic of their own: they only
//! reshape each state change into a sequence or keyed emission.

use indexmap::IndexMap;

use crate::reactive::{State, Stream};

use super::value::{Emission, Key, Value};

/// Render a list state as sequence emissions.
///
/// Every change re-renders the whole list; positions, not identities, drive
/// the reconciliation. Use [`keyed`] when entries should keep their nodes
/// across reorders.
pub fn each<T, F>(items: &State<Vec<T>>, render: F) -> Stream<Emission>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&T, usize) -> Value + Send + Sync + 'static,
{
    items.derive(move |items| {
        Emission::Sequence(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| render(item, index))
                .collect(),
        )
    })
}

/// Render a list state as keyed emissions.
///
/// `key_fn` must produce a unique key per entry (the caller's contract);
/// list order becomes target order. Across emissions, an entry's node is
/// reused and moved by key identity instead of being recreated.
pub fn keyed<T, KF, RF>(items: &State<Vec<T>>, key_fn: KF, render: RF) -> Stream<Emission>
where
    T: Clone + Send + Sync + 'static,
    KF: Fn(&T) -> Key + Send + Sync + 'static,
    RF: Fn(&T) -> Value + Send + Sync + 'static,
{
    items.derive(move |items| {
        let mut pairs = IndexMap::new();
        for item in items {
            pairs.insert(key_fn(item), render(item));
        }
        Emission::Keyed(pairs)
    })
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
