//! Integration tests for tl-light.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tl_core::{CycleWindow, LightId, Phase};

use crate::{
    LightError, LightObserver, NoopObserver, PhaseChange, TrafficLight, TrafficLightBuilder,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const FAST_MIN_MS: u64 = 20;
const FAST_MAX_MS: u64 = 30;

fn fast_window() -> CycleWindow {
    CycleWindow::new(FAST_MIN_MS, FAST_MAX_MS).unwrap()
}

/// Observer that records every callback with the instant it fired.
#[derive(Default)]
struct Recorder {
    started: AtomicBool,
    stopped: AtomicBool,
    changes: Mutex<Vec<(Instant, PhaseChange)>>,
}

impl Recorder {
    fn phases(&self) -> Vec<Phase> {
        self.changes.lock().unwrap().iter().map(|(_, c)| c.phase).collect()
    }

    fn len(&self) -> usize {
        self.changes.lock().unwrap().len()
    }

    /// Poll until at least `n` changes were recorded.
    fn wait_for(&self, n: usize, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        while self.len() < n {
            assert!(Instant::now() < deadline, "only {} of {n} changes within {timeout:?}", self.len());
            thread::sleep(Duration::from_millis(5));
        }
    }
}

impl LightObserver for Recorder {
    fn on_start(&self, _light: LightId) {
        self.started.store(true, Ordering::SeqCst);
    }

    fn on_phase_change(&self, _light: LightId, change: &PhaseChange) {
        self.changes.lock().unwrap().push((Instant::now(), *change));
    }

    fn on_stop(&self, _light: LightId) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

fn fast_light(id: u32, recorder: &Arc<Recorder>) -> TrafficLight {
    TrafficLightBuilder::new(LightId(id))
        .window(fast_window())
        .seed(42)
        .observer(Arc::clone(recorder))
        .build()
        .unwrap()
}

fn spawn_waiter(light: &Arc<TrafficLight>) -> thread::JoinHandle<Result<(), LightError>> {
    let light = Arc::clone(light);
    thread::spawn(move || light.wait_for_green())
}

fn settle() {
    thread::sleep(Duration::from_millis(30));
}

// ── TrafficLightBuilder ───────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn new_light_is_red_and_idle() {
        let light = TrafficLight::new(LightId(0));
        assert_eq!(light.current_phase(), Phase::Red);
        assert_eq!(light.toggles(), 0);
        assert!(!light.is_running());
        assert_eq!(light.config().window, CycleWindow::DEFAULT);
    }

    #[test]
    fn invalid_window_rejected() {
        let result = TrafficLightBuilder::new(LightId(0))
            .window(CycleWindow { min_ms: 50, max_ms: 10 })
            .build();
        assert!(matches!(result, Err(LightError::Config(_))));
    }

    #[test]
    fn zero_minimum_rejected() {
        let result = TrafficLightBuilder::new(LightId(0))
            .window(CycleWindow { min_ms: 0, max_ms: 10 })
            .build();
        assert!(matches!(result, Err(LightError::Config(_))));
    }

    #[test]
    fn seed_and_window_applied() {
        let light = TrafficLightBuilder::new(LightId(2))
            .window(fast_window())
            .seed(5)
            .build()
            .unwrap();
        assert_eq!(light.id(), LightId(2));
        assert_eq!(light.config().seed, Some(5));
        assert_eq!(light.config().window, fast_window());
    }
}

// ── wait_for_green without a worker ───────────────────────────────────────────
//
// These drive the published state directly so the interleaving is exact.

#[cfg(test)]
mod wait_tests {
    use super::*;

    #[test]
    fn returns_only_after_green_following_reds() {
        let light = Arc::new(TrafficLight::new(LightId(0)));
        let waiter = spawn_waiter(&light);
        settle();

        light.shared.publish(Phase::Red, Duration::ZERO);
        settle();
        assert!(!waiter.is_finished(), "returned on first red");

        light.shared.publish(Phase::Red, Duration::ZERO);
        settle();
        assert!(!waiter.is_finished(), "returned on second red");

        light.shared.publish(Phase::Green, Duration::ZERO);
        waiter.join().unwrap().unwrap();
        assert_eq!(light.current_phase(), Phase::Green);
    }

    #[test]
    fn already_green_waits_for_next_green() {
        let light = Arc::new(TrafficLight::new(LightId(0)));
        light.shared.publish(Phase::Green, Duration::ZERO);

        let waiter = spawn_waiter(&light);
        settle();
        assert!(!waiter.is_finished(), "returned on a green published before waiting");

        light.shared.publish(Phase::Red, Duration::ZERO);
        settle();
        assert!(!waiter.is_finished());

        light.shared.publish(Phase::Green, Duration::ZERO);
        waiter.join().unwrap().unwrap();
    }

    #[test]
    fn timeout_without_green() {
        let light = TrafficLight::new(LightId(0));
        assert!(!light.wait_for_green_timeout(Duration::from_millis(20)).unwrap());
    }

    #[test]
    fn current_phase_follows_publishes() {
        let light = TrafficLight::new(LightId(0));
        let change = light.shared.publish(Phase::Green, Duration::from_millis(7));
        assert_eq!(change.toggles, 1);
        assert_eq!(change.cycle, Duration::from_millis(7));
        assert_eq!(light.current_phase(), Phase::Green);

        light.shared.publish(Phase::Red, Duration::ZERO);
        let state = light.state();
        assert_eq!(state.phase, Phase::Red);
        assert_eq!(state.toggles, 2);
        assert_eq!(state.greens, 1);
    }

    #[test]
    fn stop_releases_blocked_waiter() {
        let light = Arc::new(TrafficLight::new(LightId(4)));
        let waiter = spawn_waiter(&light);
        settle();
        light.stop();
        assert!(matches!(waiter.join().unwrap(), Err(LightError::Stopped(LightId(4)))));
    }

    #[test]
    fn wait_after_stop_fails_fast() {
        let light = TrafficLight::new(LightId(0));
        light.stop();
        assert!(matches!(light.wait_for_green(), Err(LightError::Stopped(_))));
        assert!(matches!(
            light.wait_for_green_timeout(Duration::from_secs(5)),
            Err(LightError::Stopped(_))
        ));
    }
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle_tests {
    use super::*;

    #[test]
    fn simulate_twice_fails() {
        let recorder = Arc::new(Recorder::default());
        let light = fast_light(0, &recorder);
        light.simulate().unwrap();
        assert!(light.is_running());
        assert!(matches!(light.simulate(), Err(LightError::AlreadyRunning(LightId(0)))));
        light.join().unwrap();
    }

    #[test]
    fn simulate_after_stop_fails() {
        let light = TrafficLight::new(LightId(1));
        light.stop();
        assert!(matches!(light.simulate(), Err(LightError::Stopped(LightId(1)))));

        let recorder = Arc::new(Recorder::default());
        let light = fast_light(2, &recorder);
        light.simulate().unwrap();
        light.join().unwrap();
        assert!(!light.is_running());
        assert!(matches!(light.simulate(), Err(LightError::Stopped(LightId(2)))));
    }

    #[test]
    fn stop_interrupts_long_cycle() {
        // Default window: the first toggle is at least 4 s away.
        let light = TrafficLight::new(LightId(0));
        light.simulate().unwrap();
        settle();

        let start = Instant::now();
        light.join().unwrap();
        assert!(start.elapsed() < Duration::from_secs(1), "join took {:?}", start.elapsed());
        assert_eq!(light.toggles(), 0);
    }

    #[test]
    fn join_without_simulate_is_ok() {
        let light = TrafficLight::new(LightId(0));
        light.join().unwrap();
        light.join().unwrap();
    }

    #[test]
    fn drop_stops_worker() {
        let recorder = Arc::new(Recorder::default());
        let light = fast_light(0, &recorder);
        light.simulate().unwrap();
        recorder.wait_for(1, Duration::from_secs(2));
        drop(light);
        assert!(recorder.started.load(Ordering::SeqCst));
        assert!(recorder.stopped.load(Ordering::SeqCst), "worker still running after drop");
    }

    struct PanicOnRed;

    impl LightObserver for PanicOnRed {
        fn on_phase_change(&self, _light: LightId, change: &PhaseChange) {
            if change.phase.is_red() {
                panic!("observer failure");
            }
        }
    }

    fn dead_light(id: u32) -> Arc<TrafficLight> {
        let light = TrafficLightBuilder::new(LightId(id))
            .window(CycleWindow::fixed(5).unwrap())
            .observer(PanicOnRed)
            .build()
            .unwrap();
        light.simulate().unwrap();
        // Green after 5 ms, red (and the panic) after 10 ms.
        thread::sleep(Duration::from_millis(100));
        Arc::new(light)
    }

    #[test]
    fn observer_panic_surfaces_on_join() {
        let light = dead_light(9);
        assert!(matches!(light.join(), Err(LightError::WorkerPanicked(LightId(9)))));
    }

    #[test]
    fn dead_worker_releases_waiters() {
        let light = dead_light(3);
        assert!(!light.is_running(), "worker unwound but light reports running");
        assert_eq!(light.toggles(), 2);

        let waiter = spawn_waiter(&light);
        let deadline = Instant::now() + Duration::from_secs(2);
        while !waiter.is_finished() {
            assert!(Instant::now() < deadline, "waiter blocked on a dead light");
            thread::sleep(Duration::from_millis(5));
        }
        assert!(matches!(waiter.join().unwrap(), Err(LightError::Stopped(LightId(3)))));
        assert!(matches!(light.join(), Err(LightError::WorkerPanicked(LightId(3)))));
    }

    #[test]
    fn concurrent_joins_all_wait_for_worker() {
        let recorder = Arc::new(Recorder::default());
        let light = Arc::new(fast_light(5, &recorder));
        light.simulate().unwrap();
        recorder.wait_for(1, Duration::from_secs(2));

        let joiners: Vec<_> = (0..4)
            .map(|_| {
                let light = Arc::clone(&light);
                let recorder = Arc::clone(&recorder);
                thread::spawn(move || {
                    let result = light.join();
                    (result, recorder.stopped.load(Ordering::SeqCst))
                })
            })
            .collect();

        for j in joiners {
            let (result, stopped) = j.join().unwrap();
            result.unwrap();
            assert!(stopped, "join returned before the worker finished");
        }
    }

    #[test]
    fn concurrent_joins_all_see_panic() {
        let light = dead_light(6);
        let joiners: Vec<_> = (0..3)
            .map(|_| {
                let light = Arc::clone(&light);
                thread::spawn(move || light.join())
            })
            .collect();
        for j in joiners {
            assert!(matches!(j.join().unwrap(), Err(LightError::WorkerPanicked(LightId(6)))));
        }
    }

    #[test]
    fn noop_observer_does_not_disturb_cycling() {
        let recorder = Arc::new(Recorder::default());
        let light = TrafficLightBuilder::new(LightId(0))
            .window(fast_window())
            .observer(NoopObserver)
            .observer(Arc::clone(&recorder))
            .build()
            .unwrap();
        light.simulate().unwrap();
        recorder.wait_for(2, Duration::from_secs(2));
        light.join().unwrap();
        assert_eq!(&recorder.phases()[..2], &[Phase::Green, Phase::Red]);
    }
}

// ── Cycling worker ────────────────────────────────────────────────────────────

#[cfg(test)]
mod cycle_tests {
    use super::*;

    #[test]
    fn phases_strictly_alternate_from_red() {
        let recorder = Arc::new(Recorder::default());
        let light = fast_light(0, &recorder);
        light.simulate().unwrap();
        recorder.wait_for(6, Duration::from_secs(5));
        light.join().unwrap();

        let phases = recorder.phases();
        for (i, phase) in phases.iter().enumerate() {
            let expected = if i % 2 == 0 { Phase::Green } else { Phase::Red };
            assert_eq!(*phase, expected, "change {i} in {phases:?}");
        }
        let toggles: Vec<u64> = recorder.changes.lock().unwrap().iter().map(|(_, c)| c.toggles).collect();
        assert_eq!(toggles, (1..=toggles.len() as u64).collect::<Vec<_>>());
    }

    #[test]
    fn cycles_respect_window() {
        let recorder = Arc::new(Recorder::default());
        let light = fast_light(0, &recorder);
        let started = Instant::now();
        light.simulate().unwrap();
        recorder.wait_for(8, Duration::from_secs(5));
        light.join().unwrap();

        let changes = recorder.changes.lock().unwrap();
        let min = Duration::from_millis(FAST_MIN_MS);
        // Generous ceiling: scheduler latency on a loaded machine.
        let max = Duration::from_millis(FAST_MAX_MS) + Duration::from_millis(500);

        assert!(changes[0].0 - started >= min, "first toggle too early");
        for (_, change) in changes.iter() {
            assert!(fast_window().contains(change.cycle), "drawn {:?}", change.cycle);
        }
        for pair in changes.windows(2) {
            let gap = pair[1].0 - pair[0].0;
            assert!(gap >= min, "toggled after {gap:?}");
            assert!(gap <= max, "toggle delayed to {gap:?}");
        }
    }

    #[test]
    fn subscribed_queue_receives_changes() {
        let light = TrafficLightBuilder::new(LightId(0))
            .window(fast_window())
            .build()
            .unwrap();
        let changes = light.subscribe();
        light.simulate().unwrap();

        assert_eq!(changes.receive_timeout(Duration::from_secs(2)), Some(Phase::Green));
        assert_eq!(changes.receive_timeout(Duration::from_secs(2)), Some(Phase::Red));
        light.join().unwrap();
    }

    #[test]
    fn five_waiters_all_released_by_green() {
        let light = Arc::new(
            TrafficLightBuilder::new(LightId(0))
                .window(fast_window())
                .build()
                .unwrap(),
        );
        let waiters: Vec<_> = (0..5)
            .map(|_| {
                let light = Arc::clone(&light);
                thread::spawn(move || {
                    light.wait_for_green()?;
                    Ok::<_, LightError>(light.state())
                })
            })
            .collect();
        settle();
        light.simulate().unwrap();

        for w in waiters {
            let state = w.join().unwrap().unwrap();
            assert!(state.greens >= 1, "released before any green: {state:?}");
        }
        light.join().unwrap();
    }

    #[test]
    fn seeded_lights_repeat_cycle_sequence() {
        let run = || {
            let recorder = Arc::new(Recorder::default());
            let light = fast_light(3, &recorder);
            light.simulate().unwrap();
            recorder.wait_for(4, Duration::from_secs(5));
            light.join().unwrap();
            let changes = recorder.changes.lock().unwrap();
            changes.iter().take(4).map(|(_, c)| c.cycle).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn default_window_holds_red_at_least_four_seconds() {
        let light = TrafficLight::new(LightId(0));
        light.simulate().unwrap();
        assert!(
            !light.wait_for_green_timeout(Duration::from_millis(3_900)).unwrap(),
            "toggled before the 4000 ms minimum"
        );
        assert_eq!(light.current_phase(), Phase::Red);
        assert!(
            light.wait_for_green_timeout(Duration::from_millis(2_600)).unwrap(),
            "no toggle by 6000 ms"
        );
        light.join().unwrap();
    }
}

// ── StopSignal ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod signal_tests {
    use super::*;
    use crate::StopSignal;

    #[test]
    fn times_out_when_not_stopped() {
        let signal = StopSignal::new();
        let start = Instant::now();
        assert!(!signal.wait_for(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn stop_wakes_sleeper_early() {
        let signal = Arc::new(StopSignal::new());
        let sleeper = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || {
                let start = Instant::now();
                (signal.wait_for(Duration::from_secs(10)), start.elapsed())
            })
        };
        settle();
        signal.stop();
        let (stopped, slept) = sleeper.join().unwrap();
        assert!(stopped);
        assert!(slept < Duration::from_secs(5));
    }

    #[test]
    fn already_stopped_returns_immediately() {
        let signal = StopSignal::new();
        signal.stop();
        signal.stop();
        assert!(signal.is_stopped());
        assert!(signal.wait_for(Duration::from_secs(10)));
    }
}
