//! `tl-queue` — blocking hand-off between a light's worker and its waiters.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`message`]  | `Message` trait — per-value flush policy                   |
//! | [`queue`]    | `MessageQueue<T>` — multi-item blocking queue              |
//! | [`latest`]   | `LatestCell<T>`, `Stamped<T>` — single-slot latest value   |
//! | [`error`]    | `QueueError`, `QueueResult<T>`                             |
//!
//! # Which one to use
//!
//! `MessageQueue` hands each value to exactly one consumer.  Sending a value
//! whose [`Message::flushes_backlog`] is `true` (a red [`Phase`]) discards
//! everything still queued, so a consumer never picks up a stale green after
//! red was decided.
//!
//! `LatestCell` keeps only the newest value and wakes *every* waiter on each
//! publish.  Use it when many parties wait on the same event; the traffic
//! light controller publishes its state through one.
//!
//! [`Phase`]: tl_core::Phase

pub mod error;
pub mod latest;
pub mod message;
pub mod queue;


pub use error::{QueueError, QueueResult};
pub use latest::{LatestCell, Stamped};
pub use message::Message;
pub use queue::MessageQueue;
