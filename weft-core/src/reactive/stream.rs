//! Stream Implementation
//!
//! A Stream is a value source that emits zero or more times over its
//! lifetime. Consumers attach a callback with `subscribe` and receive every
//! subsequent emission synchronously, on the thread that produced it.
//!
//! # How Streams Work
//!
//! A stream is defined entirely by its subscribe behavior: it wraps a
//! function that, given a callback, wires that callback to some underlying
//! source and returns a [`Subscription`]. Operators like [`Stream::map`]
//! compose by wrapping the subscribe function of their source, so no
//! intermediate buffering or scheduling ever happens.
//!
//! The push side lives in [`State`](super::State), which is the only
//! first-party emitter. Custom sources can be built with
//! [`Stream::from_subscribe`].
//!
//! # Delivery Guarantees
//!
//! - Emissions are delivered synchronously and run to completion before
//!   control returns to the emitter.
//! - A cancelled subscription stops receiving values immediately, even when
//!   cancellation happens while a delivery round is in progress.
//! - There is no error channel and no completion signal; a stream that never
//!   emits simply never calls its subscribers.

use std::sync::Arc;

use parking_lot::Mutex;

use super::subscription::Subscription;

/// Shared callback type invoked once per emission.
pub type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A value source that emits zero or more times; see the module docs.
pub struct Stream<T> {
    subscribe_fn: Arc<dyn Fn(Callback<T>) -> Subscription + Send + Sync>,
}

impl<T: 'static> Stream<T> {
    /// Create a stream from a raw subscribe function.
    ///
    /// The function is called once per `subscribe` and must return a
    /// subscription that detaches that particular callback.
    pub fn from_subscribe(
        subscribe_fn: impl Fn(Callback<T>) -> Subscription + Send + Sync + 'static,
    ) -> Self {
        Self {
            subscribe_fn: Arc::new(subscribe_fn),
        }
    }

    /// A stream that never emits.
    ///
    /// A child slot bound to it stays empty until the end of time; the
    /// returned subscription has nothing to cancel.
    pub fn never() -> Self {
        Self::from_subscribe(|_callback| Subscription::noop())
    }

    /// Attach a callback for every future emission.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        (self.subscribe_fn)(Arc::new(callback))
    }

    /// Transform every emission with `f`.
    pub fn map<U: 'static>(&self, f: impl Fn(&T) -> U + Send + Sync + 'static) -> Stream<U> {
        let source = self.clone();
        let f = Arc::new(f);
        Stream::from_subscribe(move |callback: Callback<U>| {
            let f = f.clone();
            source.subscribe(move |value| callback(&f(value)))
        })
    }
}

impl<T: Clone + Send + Sync + 'static> Stream<T> {
    /// Combine several sources into a stream of their latest values.
    ///
    /// Emits a `Vec` (one slot per source, in order) the first time every
    /// source has emitted at least once, then again on every subsequent
    /// emission from any source. Sources that replay a current value on
    /// subscribe (such as [`State::stream`](super::State::stream)) therefore
    /// produce an immediate combined emission.
    pub fn combine_latest(sources: Vec<Stream<T>>) -> Stream<Vec<T>> {
        Stream::from_subscribe(move |callback: Callback<Vec<T>>| {
            let latest: Arc<Mutex<Vec<Option<T>>>> = Arc::new(Mutex::new(vec![None; sources.len()]));

            let subscriptions: Vec<Subscription> = sources
                .iter()
                .enumerate()
                .map(|(index, source)| {
                    let latest = latest.clone();
                    let callback = callback.clone();
                    source.subscribe(move |value| {
                        // Update the slot and snapshot under the lock, but
                        // deliver outside it so downstream work can subscribe
                        // or cancel freely.
                        let combined = {
                            let mut latest = latest.lock();
                            latest[index] = Some(value.clone());
                            if latest.iter().all(Option::is_some) {
                                Some(latest.iter().flatten().cloned().collect::<Vec<T>>())
                            } else {
                                None
                            }
                        };
                        if let Some(values) = combined {
                            callback(&values);
                        }
                    })
                })
                .collect();

            Subscription::from_many(subscriptions)
        })
    }
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe_fn: Arc::clone(&self.subscribe_fn),
        }
    }
}

impl<T> std::fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream").finish_non_exhaustive()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::super::state::State;
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn map_transforms_emissions() {
        let numbers = State::new(1);
        let doubled = numbers.stream().map(|n| n * 2);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let _subscription = doubled.subscribe(move |n| seen_clone.lock().push(*n));

        numbers.set(2);
        numbers.set(3);

        assert_eq!(*seen.lock(), vec![2, 4, 6]);
    }

    #[test]
    fn never_stream_does_not_emit() {
        let stream: Stream<i32> = Stream::never();
        let count = Arc::new(AtomicI32::new(0));
        let count_clone = count.clone();

        let subscription = stream.subscribe(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(count.load(Ordering::SeqCst), 0);
        subscription.unsubscribe();
    }

    #[test]
    fn unsubscribed_callback_stops_receiving() {
        let numbers = State::new(0);
        let count = Arc::new(AtomicI32::new(0));
        let count_clone = count.clone();

        let subscription = numbers.stream().subscribe(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        // Replay of the current value counts as one delivery.
        assert_eq!(count.load(Ordering::SeqCst), 1);

        numbers.set(1);
        assert_eq!(count.load(Ordering::SeqCst), 2);

        subscription.unsubscribe();
        numbers.set(2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn combine_latest_waits_for_every_source() {
        let left = State::new(1);
        let right = State::new(10);

        // Use raw mapped streams (no replay) so the combined stream starts
        // with neither side latched.
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let combined = Stream::combine_latest(vec![
            left.stream().map(|n| *n),
            right.stream().map(|n| *n),
        ]);
        let _subscription = combined.subscribe(move |values: &Vec<i32>| {
            seen_clone.lock().push(values.clone());
        });

        // Both states replayed on subscribe, so one combined emission
        // already happened.
        assert_eq!(*seen.lock(), vec![vec![1, 10]]);

        left.set(2);
        right.set(20);

        assert_eq!(*seen.lock(), vec![vec![1, 10], vec![2, 10], vec![2, 20]]);
    }
}
