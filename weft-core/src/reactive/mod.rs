//! Reactive Streams
//!
//! This module implements the push-based stream layer that element
//! construction binds against: states, streams, and subscriptions.
//!
//! # Concepts
//!
//! ## State
//!
//! A [`State`] holds a current value and pushes every change synchronously
//! to its subscribers. Subscribing replays the current value, which is what
//! lets a freshly built element render its initial content without waiting
//! for a change.
//!
//! ## Stream
//!
//! A [`Stream`] is the subscribe-side view of any source. It is defined by
//! its subscribe behavior, so operators ([`Stream::map`],
//! [`Stream::combine_latest`]) compose without buffering or scheduling.
//!
//! ## Subscription
//!
//! A [`Subscription`] is the cancellable half of a subscribe call. Element
//! registries park subscriptions until teardown and cancel them exactly
//! once when the owning node leaves the tree.
//!
//! # Implementation Notes
//!
//! Everything here is synchronous: an emission is processed to completion
//! (all subscribers run) before control returns to the emitter. There is no
//! scheduler, no batching, and no error channel.

mod state;
mod stream;
mod subscriber;
mod subscription;

pub use state::State;
pub use stream::{Callback, Stream};
pub use subscriber::SubscriberId;
pub use subscription::Subscription;
