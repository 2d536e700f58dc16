//! The `TrafficLight` controller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tl_core::{CycleConfig, LightId, Phase};
use tl_queue::{LatestCell, MessageQueue};

use crate::worker;
use crate::{LightError, LightObserver, LightResult, LightState, PhaseChange, StopSignal};

// ── Shared state ──────────────────────────────────────────────────────────────

/// State shared between the controller handle and its worker thread.
pub(crate) struct Shared {
    pub(crate) id: LightId,

    /// Phase and counters.  Single writer (the worker), any number of readers
    /// and waiters; all access goes through the cell's lock.
    pub(crate) state: LatestCell<LightState>,

    pub(crate) observers: RwLock<Vec<Arc<dyn LightObserver>>>,

    pub(crate) stop: StopSignal,

    /// Raised once the worker body has finished, or at `stop` if no worker
    /// was ever spawned.
    pub(crate) exited: StopSignal,

    /// Set if the worker unwound.
    pub(crate) panicked: AtomicBool,
}

impl Shared {
    pub(crate) fn current_phase(&self) -> Phase {
        self.state.with(|s| s.phase)
    }

    /// Publish `phase` under the state lock, wake every waiter, then notify
    /// observers outside the lock.
    pub(crate) fn publish(&self, phase: Phase, cycle: Duration) -> PhaseChange {
        let mut toggles = 0;
        self.state.update(|s| {
            s.phase = phase;
            s.toggles += 1;
            if phase.is_green() {
                s.greens += 1;
            }
            toggles = s.toggles;
        });

        let change = PhaseChange { phase, toggles, cycle };
        for observer in self.observers_snapshot() {
            observer.on_phase_change(self.id, &change);
        }
        change
    }

    pub(crate) fn notify_start(&self) {
        for observer in self.observers_snapshot() {
            observer.on_start(self.id);
        }
    }

    pub(crate) fn notify_stop(&self) {
        for observer in self.observers_snapshot() {
            observer.on_stop(self.id);
        }
    }

    /// Clone the registry so callbacks may register further observers.
    fn observers_snapshot(&self) -> Vec<Arc<dyn LightObserver>> {
        self.observers.read().clone()
    }
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

enum Lifecycle {
    /// Constructed; `simulate` not yet called.
    Idle,
    /// Worker spawned.  It may already have been asked to stop.
    Running(JoinHandle<()>),
    /// Worker joined, or stopped before it was ever started.
    Stopped,
}

// ── TrafficLight ──────────────────────────────────────────────────────────────

/// One traffic light: owns its phase and drives its own cycling.
///
/// The phase starts red.  After [`simulate`][Self::simulate] a background
/// worker toggles it red ↔ green, holding each phase for a duration drawn
/// from the configured [`CycleWindow`][tl_core::CycleWindow].
///
/// All methods take `&self`, so a light is typically shared as
/// `Arc<TrafficLight>` between the owning intersection and vehicle threads.
///
/// Create via [`TrafficLight::new`] or [`TrafficLightBuilder`][crate::TrafficLightBuilder].
pub struct TrafficLight {
    pub(crate) shared: Arc<Shared>,
    config:            CycleConfig,
    lifecycle:         Mutex<Lifecycle>,
}

impl TrafficLight {
    /// A red light with the default `[4000, 6000]` ms window and an
    /// entropy-seeded RNG.
    pub fn new(id: LightId) -> Self {
        Self::from_parts(id, CycleConfig::default(), Vec::new())
    }

    /// Assemble from an already validated config.
    pub(crate) fn from_parts(
        id:        LightId,
        config:    CycleConfig,
        observers: Vec<Arc<dyn LightObserver>>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                id,
                state:     LatestCell::new(LightState::default()),
                observers: RwLock::new(observers),
                stop:      StopSignal::new(),
                exited:    StopSignal::new(),
                panicked:  AtomicBool::new(false),
            }),
            config,
            lifecycle: Mutex::new(Lifecycle::Idle),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn id(&self) -> LightId {
        self.shared.id
    }

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    /// The phase shown right now.  Never blocks on the worker beyond the
    /// brief state lock.
    pub fn current_phase(&self) -> Phase {
        self.shared.current_phase()
    }

    /// Phase and counters, read atomically.
    pub fn state(&self) -> LightState {
        self.shared.state.get()
    }

    /// Number of phase changes published so far.
    pub fn toggles(&self) -> u64 {
        self.shared.state.with(|s| s.toggles)
    }

    /// `true` between a successful `simulate` and `stop`.
    pub fn is_running(&self) -> bool {
        matches!(*self.lifecycle.lock(), Lifecycle::Running(_)) && !self.shared.stop.is_stopped()
    }

    // ── Waiting ───────────────────────────────────────────────────────────

    /// Block until a green is published after this call starts waiting.
    ///
    /// Reds published in the meantime are skipped.  If the light is already
    /// green on entry the caller waits for the *next* green.
    ///
    /// Returns [`LightError::Stopped`] if the light is stopped first.
    pub fn wait_for_green(&self) -> LightResult<()> {
        let seen = self.shared.state.with(|s| s.greens);
        tracing::trace!(light = self.id().0, "waiting for green");
        self.shared
            .state
            .wait_until(|s| s.greens > seen)
            .map(|_| ())
            .map_err(|_| LightError::Stopped(self.id()))
    }

    /// Bounded form of [`wait_for_green`][Self::wait_for_green].
    ///
    /// Returns `Ok(false)` if `timeout` elapses without a green.
    pub fn wait_for_green_timeout(&self, timeout: Duration) -> LightResult<bool> {
        let seen = self.shared.state.with(|s| s.greens);
        self.shared
            .state
            .wait_until_timeout(|s| s.greens > seen, timeout)
            .map(|got| got.is_some())
            .map_err(|_| LightError::Stopped(self.id()))
    }

    // ── Subscribers ───────────────────────────────────────────────────────

    /// Register an observer.  Takes effect from the next callback.
    pub fn add_observer(&self, observer: Arc<dyn LightObserver>) {
        self.shared.observers.write().push(observer);
    }

    /// A queue that receives every phase published from now on.
    ///
    /// Red flushes whatever the subscriber has not consumed yet, so a slow
    /// consumer never sees a stale green.
    pub fn subscribe(&self) -> Arc<MessageQueue<Phase>> {
        let queue: Arc<MessageQueue<Phase>> = Arc::new(MessageQueue::new());
        self.add_observer(Arc::clone(&queue) as Arc<dyn LightObserver>);
        queue
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Start the background worker and return immediately.
    ///
    /// A light cycles at most once in its lifetime: calling this while
    /// running returns [`LightError::AlreadyRunning`], and after
    /// [`stop`][Self::stop] it returns [`LightError::Stopped`].
    pub fn simulate(&self) -> LightResult<()> {
        let id = self.id();
        let mut lifecycle = self.lifecycle.lock();
        if self.shared.stop.is_stopped() {
            return Err(LightError::Stopped(id));
        }
        match *lifecycle {
            Lifecycle::Idle       => {}
            Lifecycle::Running(_) => return Err(LightError::AlreadyRunning(id)),
            Lifecycle::Stopped    => return Err(LightError::Stopped(id)),
        }

        let shared = Arc::clone(&self.shared);
        let window = self.config.window;
        let rng = self.config.make_rng(id);
        let handle = thread::Builder::new()
            .name(format!("light-{}", id.0))
            .spawn(move || worker::run(shared, window, rng))?;

        *lifecycle = Lifecycle::Running(handle);
        Ok(())
    }

    /// Ask the worker to exit and release every blocked waiter.
    ///
    /// Returns without waiting for the worker; use [`join`][Self::join] for
    /// that.  Idempotent.
    pub fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock();
        if matches!(*lifecycle, Lifecycle::Idle) {
            *lifecycle = Lifecycle::Stopped;
            self.shared.exited.stop();
        }
        drop(lifecycle);

        self.shared.stop.stop();
        self.shared.state.close();
    }

    /// Stop the worker and wait for it to exit.
    ///
    /// Safe to call from several threads at once: one of them joins the
    /// thread, the others wait until the worker body has finished.  Every
    /// caller returns [`LightError::WorkerPanicked`] if the worker (or one of
    /// its observers) panicked.
    pub fn join(&self) -> LightResult<()> {
        self.stop();
        let previous = std::mem::replace(&mut *self.lifecycle.lock(), Lifecycle::Stopped);
        if let Lifecycle::Running(handle) = previous {
            return handle
                .join()
                .map_err(|_| LightError::WorkerPanicked(self.id()));
        }

        self.shared.exited.wait();
        if self.shared.panicked.load(Ordering::SeqCst) {
            Err(LightError::WorkerPanicked(self.id()))
        } else {
            Ok(())
        }
    }
}

impl Drop for TrafficLight {
    fn drop(&mut self) {
        if let Err(e) = self.join() {
            tracing::warn!(light = self.id().0, error = %e, "worker did not exit cleanly");
        }
    }
}
