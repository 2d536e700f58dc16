//! `MessageQueue` — blocking multi-producer, multi-consumer hand-off.
//!
//! A `VecDeque` behind a `parking_lot::Mutex`, with a `Condvar` signalled on
//! every insertion.  Producers never block beyond the lock; consumers block
//! in [`receive`][MessageQueue::receive] until a value is available.
//!
//! # Ordering
//!
//! Values are consumed oldest first.  The flush policy means a red send
//! leaves exactly one value (the red) in the queue, so under the controller's
//! one-change-per-cycle traffic at most one meaningful item is ever pending.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::Message;

/// Blocking queue with a per-value flush policy (see [`Message`]).
pub struct MessageQueue<T> {
    items:      Mutex<VecDeque<T>>,
    item_ready: Condvar,
}

impl<T> MessageQueue<T> {
    pub fn new() -> Self {
        Self {
            items:      Mutex::new(VecDeque::new()),
            item_ready: Condvar::new(),
        }
    }

    /// Block until a value is available, then remove and return it.
    ///
    /// Blocks forever if no producer ever sends again.
    pub fn receive(&self) -> T {
        let mut items = self.items.lock();
        loop {
            if let Some(value) = items.pop_front() {
                return value;
            }
            self.item_ready.wait(&mut items);
        }
    }

    /// Like [`receive`][Self::receive] but gives up after `timeout`.
    ///
    /// Returns `None` if nothing arrived in time.
    pub fn receive_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut items = self.items.lock();
        loop {
            if let Some(value) = items.pop_front() {
                return Some(value);
            }
            if self.item_ready.wait_until(&mut items, deadline).timed_out() {
                return items.pop_front();
            }
        }
    }

    /// Remove and return the next value without blocking.
    pub fn try_receive(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    /// Number of values currently queued.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl<T: Message> MessageQueue<T> {
    /// Enqueue `value` and wake one blocked consumer.
    ///
    /// If `value.flushes_backlog()` every value still queued is discarded
    /// first.  Never fails.
    pub fn send(&self, value: T) {
        let mut items = self.items.lock();
        if value.flushes_backlog() && !items.is_empty() {
            let flushed = items.len();
            items.clear();
            tracing::trace!(flushed, "flushed stale messages");
        }
        items.push_back(value);
        self.item_ready.notify_one();
    }
}

impl<T> Default for MessageQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
