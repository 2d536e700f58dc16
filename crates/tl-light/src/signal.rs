//! Cancellation signal for the worker's timed wait.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// One-way stop flag with a condition variable, so a sleeping worker can be
/// woken immediately instead of finishing its interval.
#[derive(Default)]
pub struct StopSignal {
    stopped: Mutex<bool>,
    wake:    Condvar,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag and wake every waiter.  Idempotent.
    pub fn stop(&self) {
        let mut stopped = self.stopped.lock();
        *stopped = true;
        self.wake.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        *self.stopped.lock()
    }

    /// Block until stopped.
    pub fn wait(&self) {
        let mut stopped = self.stopped.lock();
        while !*stopped {
            self.wake.wait(&mut stopped);
        }
    }

    /// Sleep until `deadline` or until stopped, whichever comes first.
    ///
    /// Returns `true` if stopped.  Early wake-ups without a stop go back to
    /// sleep until the deadline.
    pub fn wait_until(&self, deadline: Instant) -> bool {
        let mut stopped = self.stopped.lock();
        while !*stopped {
            if self.wake.wait_until(&mut stopped, deadline).timed_out() {
                return *stopped;
            }
        }
        true
    }

    /// [`wait_until`][Self::wait_until] relative to now.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        self.wait_until(Instant::now() + timeout)
    }
}
