//! State Implementation
//!
//! A State is the push side of the stream layer: a container for a current
//! value that notifies subscribers on every change.
//!
//! # How State Works
//!
//! 1. `get` returns a clone of the current value.
//!
//! 2. `set` stores the new value, then synchronously delivers it to every
//!    live subscriber before returning to the caller.
//!
//! 3. Subscribing replays the current value immediately, so late subscribers
//!    render the latest state without waiting for the next change. This is
//!    what makes a freshly constructed element show its initial content.
//!
//! # Re-entrancy
//!
//! Calling `set` on a state from inside one of that same state's subscriber
//! callbacks is unsupported: the nested delivery interleaves with the outer
//! one and the observed ordering is unspecified. This is a caller hazard,
//! not a checked error.
//!
//! # Thread Safety
//!
//! The value and the subscriber list are independently locked. Delivery
//! walks a snapshot of the subscriber list with no lock held, checking each
//! entry's liveness flag at call time, so callbacks are free to subscribe,
//! unsubscribe, or tear down UI from within a delivery round.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::stream::{Callback, Stream};
use super::subscriber::SubscriberId;
use super::subscription::Subscription;

/// One attached callback plus its liveness flag.
struct SubscriberEntry<T> {
    id: SubscriberId,
    active: Arc<AtomicBool>,
    callback: Callback<T>,
}

impl<T> Clone for SubscriberEntry<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            active: Arc::clone(&self.active),
            callback: Arc::clone(&self.callback),
        }
    }
}

/// A mutable value whose changes are pushed to subscribers.
///
/// # Example
///
/// ```rust,ignore
/// let count = State::new(0);
///
/// let subscription = count.subscribe(|n| println!("count: {n}"));
/// // Prints "count: 0" immediately (replay), then once per set.
///
/// count.set(1);
/// count.update(|n| n + 1);
///
/// subscription.unsubscribe();
/// ```
pub struct State<T> {
    /// The current value.
    value: Arc<RwLock<T>>,

    /// Subscribers in attach order.
    subscribers: Arc<RwLock<Vec<SubscriberEntry<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> State<T> {
    /// Create a new state with the given initial value.
    pub fn new(initial: T) -> Self {
        Self {
            value: Arc::new(RwLock::new(initial)),
            subscribers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Replace the value and notify every subscriber.
    ///
    /// Delivery is synchronous: all subscribers have run by the time `set`
    /// returns.
    pub fn set(&self, value: T) {
        *self.value.write() = value.clone();
        self.notify(&value);
    }

    /// Replace the value using a function of the current value.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = {
            let current = self.value.read();
            f(&current)
        };
        self.set(next);
    }

    /// Attach a callback; replays the current value before returning.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.attach(Arc::new(callback))
    }

    /// The subscribe-side view of this state.
    ///
    /// Every subscription made through the stream replays the current value,
    /// exactly like [`State::subscribe`].
    pub fn stream(&self) -> Stream<T> {
        let state = self.clone();
        Stream::from_subscribe(move |callback| state.attach(callback))
    }

    /// A stream of `f` applied to the current value and every change.
    pub fn derive<U: 'static>(&self, f: impl Fn(&T) -> U + Send + Sync + 'static) -> Stream<U> {
        self.stream().map(f)
    }

    /// Current number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    fn attach(&self, callback: Callback<T>) -> Subscription {
        // Replay first: the callback sees the current value before it is on
        // the list, so a replay can never be delivered twice.
        let current = self.get();
        callback(&current);

        let id = SubscriberId::new();
        let active = Arc::new(AtomicBool::new(true));
        self.subscribers.write().push(SubscriberEntry {
            id,
            active: active.clone(),
            callback,
        });

        let subscribers = Arc::downgrade(&self.subscribers);
        Subscription::linked(active, move || {
            if let Some(subscribers) = subscribers.upgrade() {
                subscribers.write().retain(|entry| entry.id != id);
            }
        })
    }

    /// Deliver `value` to a snapshot of the subscriber list.
    fn notify(&self, value: &T) {
        let snapshot: Vec<SubscriberEntry<T>> = self.subscribers.read().clone();
        for entry in snapshot {
            if entry.active.load(Ordering::SeqCst) {
                (entry.callback)(value);
            }
        }
    }
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<T: Clone + Send + Sync + std::fmt::Debug + 'static> std::fmt::Debug for State<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("value", &self.get())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
