//! `LatestCell` — single-slot "latest value" cell with wake-on-publish.
//!
//! # Semantics
//!
//! The cell stores one value plus a publish generation.  Every publish wakes
//! every waiter, and each re-evaluates its condition against the same state.
//! Compare [`MessageQueue`][crate::MessageQueue], which hands each value to
//! exactly one consumer.
//!
//! # Generations
//!
//! The generation starts at 0 and increments by one on each publish.  A
//! waiter that records the generation before blocking can tell whether
//! anything was published since, independent of the value itself.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::{QueueError, QueueResult};

/// A value together with the generation it was published at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stamped<T> {
    pub value:      T,
    pub generation: u64,
}

struct Slot<T> {
    value:      T,
    generation: u64,
    closed:     bool,
}

impl<T: Clone> Slot<T> {
    fn stamped(&self) -> Stamped<T> {
        Stamped { value: self.value.clone(), generation: self.generation }
    }
}

/// Single-slot cell; see the module docs.
pub struct LatestCell<T> {
    slot:    Mutex<Slot<T>>,
    changed: Condvar,
}

impl<T> LatestCell<T> {
    /// Create a cell holding `initial` at generation 0.
    pub fn new(initial: T) -> Self {
        Self {
            slot: Mutex::new(Slot { value: initial, generation: 0, closed: false }),
            changed: Condvar::new(),
        }
    }

    /// Replace the value and wake every waiter.  Returns the new generation.
    pub fn publish(&self, value: T) -> u64 {
        self.update(|v| *v = value)
    }

    /// Mutate the value in place under the lock and wake every waiter.
    /// Returns the new generation.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> u64 {
        let mut slot = self.slot.lock();
        f(&mut slot.value);
        slot.generation += 1;
        let generation = slot.generation;
        self.changed.notify_all();
        generation
    }

    /// Read the value under the lock without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.slot.lock().value)
    }

    /// Number of publishes so far.
    pub fn generation(&self) -> u64 {
        self.slot.lock().generation
    }

    /// Mark the cell closed and wake every waiter.
    ///
    /// Waiters whose condition is not yet met return
    /// [`QueueError::Closed`].  The value stays readable and further
    /// publishes are still stored.
    pub fn close(&self) {
        let mut slot = self.slot.lock();
        slot.closed = true;
        self.changed.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.slot.lock().closed
    }
}

impl<T: Clone> LatestCell<T> {
    /// Clone of the current value.
    pub fn get(&self) -> T {
        self.slot.lock().value.clone()
    }

    /// Current value and generation, read atomically.
    pub fn snapshot(&self) -> Stamped<T> {
        self.slot.lock().stamped()
    }

    /// Block until the generation exceeds `since`.
    pub fn wait_newer(&self, since: u64) -> QueueResult<Stamped<T>> {
        self.wait_until_stamped(|s| s.generation > since)
    }

    /// Block until `pred` holds for the current value.
    ///
    /// `pred` is checked immediately and then after every publish.  Returns
    /// [`QueueError::Closed`] if the cell is closed while `pred` is false.
    pub fn wait_until(&self, mut pred: impl FnMut(&T) -> bool) -> QueueResult<Stamped<T>> {
        self.wait_until_stamped(|s| pred(&s.value))
    }

    /// Bounded form of [`wait_until`][Self::wait_until].
    ///
    /// Returns `Ok(None)` if `timeout` elapses first.
    pub fn wait_until_timeout(
        &self,
        mut pred: impl FnMut(&T) -> bool,
        timeout:  Duration,
    ) -> QueueResult<Option<Stamped<T>>> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock();
        loop {
            if pred(&slot.value) {
                return Ok(Some(slot.stamped()));
            }
            if slot.closed {
                return Err(QueueError::Closed);
            }
            if self.changed.wait_until(&mut slot, deadline).timed_out() {
                return Ok(pred(&slot.value).then(|| slot.stamped()));
            }
        }
    }

    fn wait_until_stamped(
        &self,
        mut pred: impl FnMut(&Slot<T>) -> bool,
    ) -> QueueResult<Stamped<T>> {
        let mut slot = self.slot.lock();
        loop {
            if pred(&*slot) {
                return Ok(slot.stamped());
            }
            if slot.closed {
                return Err(QueueError::Closed);
            }
            self.changed.wait(&mut slot);
        }
    }
}

impl<T: Default> Default for LatestCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
