//! Subscription handles.
//!
//! A `Subscription` is the cancellable half of a subscribe call. The consumer
//! that attached a callback holds the subscription; dropping deliveries is
//! done by calling [`Subscription::unsubscribe`], never by dropping the
//! handle (registries park subscriptions until teardown).
//!
//! # Cancellation Semantics
//!
//! Cancelling flips a shared liveness flag *before* running the detach
//! closure, so a delivery round that is concurrently walking a subscriber
//! snapshot will skip the cancelled callback even if it has not been removed
//! from the source's list yet. `unsubscribe` is idempotent: the detach
//! closure runs at most once, and later calls are no-ops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// A cancellable handle to one attached stream callback.
pub struct Subscription {
    /// Shared with the source's subscriber entry; `false` stops delivery.
    active: Arc<AtomicBool>,

    /// Detaches the entry from the source. Consumed on first cancel.
    detach: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Subscription {
    /// Create a subscription with its own liveness flag.
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self::linked(Arc::new(AtomicBool::new(true)), detach)
    }

    /// Create a subscription whose liveness flag is shared with the source.
    ///
    /// Sources that snapshot their subscriber list during delivery check the
    /// flag per callback, so cancellation takes effect mid-round.
    pub fn linked(active: Arc<AtomicBool>, detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            active,
            detach: Mutex::new(Some(Box::new(detach))),
        }
    }

    /// A subscription with nothing to cancel.
    ///
    /// Used by sources that never emit and never retain the callback.
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Whether this subscription has been cancelled.
    pub fn closed(&self) -> bool {
        !self.active.load(Ordering::SeqCst)
    }

    /// Cancel the subscription.
    ///
    /// Stops future deliveries immediately and detaches the callback from
    /// the source. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            if let Some(detach) = self.detach.lock().take() {
                detach();
            }
        }
    }

    /// Bundle several subscriptions into one handle that cancels them all.
    pub fn from_many(subscriptions: Vec<Subscription>) -> Self {
        Self::new(move || {
            for subscription in &subscriptions {
                subscription.unsubscribe();
            }
        })
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.closed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI32;

    #[test]
    fn unsubscribe_runs_detach_once() {
        let detach_count = Arc::new(AtomicI32::new(0));
        let detach_clone = detach_count.clone();

        let subscription = Subscription::new(move || {
            detach_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!subscription.closed());

        subscription.unsubscribe();
        assert!(subscription.closed());
        assert_eq!(detach_count.load(Ordering::SeqCst), 1);

        // Idempotent: further calls do nothing.
        subscription.unsubscribe();
        subscription.unsubscribe();
        assert_eq!(detach_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn linked_flag_is_cleared_before_detach() {
        let flag = Arc::new(AtomicBool::new(true));
        let flag_in_detach = flag.clone();
        let observed = Arc::new(AtomicBool::new(true));
        let observed_clone = observed.clone();

        let subscription = Subscription::linked(flag.clone(), move || {
            observed_clone.store(flag_in_detach.load(Ordering::SeqCst), Ordering::SeqCst);
        });

        subscription.unsubscribe();

        // The detach closure must already see the flag as false.
        assert!(!observed.load(Ordering::SeqCst));
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[test]
    fn from_many_cancels_all() {
        let count = Arc::new(AtomicI32::new(0));

        let subscriptions: Vec<Subscription> = (0..3)
            .map(|_| {
                let count = count.clone();
                Subscription::new(move || {
                    count.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        let bundle = Subscription::from_many(subscriptions);
        bundle.unsubscribe();

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn noop_subscription_is_harmless() {
        let subscription = Subscription::noop();
        assert!(!subscription.closed());
        subscription.unsubscribe();
        assert!(subscription.closed());
    }
}
