//! Light observer trait for logging, recording, and fan-out of phase changes.

use std::sync::Arc;

use tl_core::{LightId, Phase};
use tl_queue::MessageQueue;

use crate::PhaseChange;

/// Callbacks invoked by a light's worker thread.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Callbacks run on the worker after the
/// state lock is released; a slow observer delays the next cycle's start, so
/// keep them short.
///
/// # Example — change counter
///
/// ```rust,ignore
/// struct Counter(AtomicU64);
///
/// impl LightObserver for Counter {
///     fn on_phase_change(&self, _light: LightId, _change: &PhaseChange) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait LightObserver: Send + Sync {
    /// Called once on the worker thread before the first cycle.
    fn on_start(&self, _light: LightId) {}

    /// Called after every published phase change.
    fn on_phase_change(&self, _light: LightId, _change: &PhaseChange) {}

    /// Called once when the worker exits after a stop.
    fn on_stop(&self, _light: LightId) {}
}

/// A [`LightObserver`] that does nothing.
pub struct NoopObserver;

impl LightObserver for NoopObserver {}

/// Subscribed queues receive every phase, flushing on red.
impl LightObserver for MessageQueue<Phase> {
    fn on_phase_change(&self, _light: LightId, change: &PhaseChange) {
        self.send(change.phase);
    }
}

impl<O: LightObserver + ?Sized> LightObserver for Arc<O> {
    fn on_start(&self, light: LightId) {
        (**self).on_start(light);
    }

    fn on_phase_change(&self, light: LightId, change: &PhaseChange) {
        (**self).on_phase_change(light, change);
    }

    fn on_stop(&self, light: LightId) {
        (**self).on_stop(light);
    }
}
