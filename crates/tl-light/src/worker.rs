//! The cycling loop run on each light's worker thread.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Instant;

use tl_core::{CycleRng, CycleWindow};

use crate::light::Shared;

/// Worker body: hold each phase for a random interval, toggle, publish.
///
/// Runs until `shared.stop` is raised.  The timed wait wakes immediately on
/// stop, so shutdown never waits out the current interval.
pub(crate) fn run(shared: Arc<Shared>, window: CycleWindow, mut rng: CycleRng) {
    let _exit = ExitGuard(&shared);
    let light = shared.id;
    tracing::info!(light = light.0, %window, "worker started");
    shared.notify_start();

    loop {
        let cycle = window.sample(&mut rng);
        let start = Instant::now();
        if shared.stop.wait_until(start + cycle) {
            break;
        }

        let next = shared.current_phase().toggled();
        let change = shared.publish(next, cycle);
        tracing::debug!(
            light    = light.0,
            phase    = %change.phase,
            toggles  = change.toggles,
            cycle_ms = cycle.as_millis() as u64,
            "phase changed"
        );
    }

    tracing::info!(light = light.0, toggles = shared.state.with(|s| s.toggles), "worker stopped");
    shared.notify_stop();
}

/// Marks the light stopped and exited when the worker leaves `run`, whether
/// it returns or unwinds out of an observer.
struct ExitGuard<'a>(&'a Shared);

impl Drop for ExitGuard<'_> {
    fn drop(&mut self) {
        let shared = self.0;
        if thread::panicking() {
            shared.panicked.store(true, Ordering::SeqCst);
            tracing::error!(light = shared.id.0, "worker panicked");
        }
        shared.stop.stop();
        shared.state.close();
        shared.exited.stop();
    }
}
