//! intersection — two traffic lights and a handful of vehicles.
//!
//! Each approach of a crossing gets its own light.  Vehicle threads arrive
//! at random approaches and block in `wait_for_green` until their light
//! turns green, while a monitor drains a subscribed phase queue.
//!
//! Log verbosity follows `TL_LOG` (an `EnvFilter` directive, default `info`):
//!
//! ```text
//! TL_LOG=debug cargo run -p intersection
//! ```

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use tl_core::{CycleRng, CycleWindow, LightId, Phase};
use tl_light::{LightError, LightObserver, PhaseChange, TrafficLight, TrafficLightBuilder};
use tl_queue::MessageQueue;

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:          u64 = 42;
const VEHICLE_COUNT: u32 = 6;
const MIN_CYCLE_MS:  u64 = 1_000;
const MAX_CYCLE_MS:  u64 = 2_000;
const RUN_FOR:       Duration = Duration::from_secs(8);

const APPROACHES: [(LightId, &str); 2] = [(LightId(0), "north-south"), (LightId(1), "east-west")];

// ── Observer ──────────────────────────────────────────────────────────────────

/// Logs every phase change of one approach.
struct PhaseLogger {
    approach: &'static str,
}

impl LightObserver for PhaseLogger {
    fn on_phase_change(&self, light: LightId, change: &PhaseChange) {
        tracing::info!(
            light    = light.0,
            approach = self.approach,
            phase    = %change.phase,
            held_ms  = change.cycle.as_millis() as u64,
            "light changed"
        );
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

fn init_logging() {
    let filter = EnvFilter::try_from_env("TL_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init();
}

// ── Vehicles ──────────────────────────────────────────────────────────────────

/// A vehicle arrives after `arrival`, waits for its light, then crosses.
fn drive(vehicle: u32, light: Arc<TrafficLight>, arrival: Duration) -> Result<(), LightError> {
    thread::sleep(arrival);
    let arrived = Instant::now();
    tracing::info!(vehicle, light = light.id().0, phase = %light.current_phase(), "vehicle arrived");

    light.wait_for_green()?;
    tracing::info!(
        vehicle,
        light     = light.id().0,
        waited_ms = arrived.elapsed().as_millis() as u64,
        "vehicle crossed"
    );
    Ok(())
}

/// Drain phases from a subscription until `deadline`.
fn monitor(queue: Arc<MessageQueue<Phase>>, deadline: Instant) -> (u32, u32) {
    let (mut greens, mut reds) = (0, 0);
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        match queue.receive_timeout(remaining) {
            Some(Phase::Green) => greens += 1,
            Some(Phase::Red) => reds += 1,
            None => break,
        }
    }
    (greens, reds)
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_logging();

    let window = CycleWindow::new(MIN_CYCLE_MS, MAX_CYCLE_MS).context("cycle window")?;
    tracing::info!(%window, seed = SEED, vehicles = VEHICLE_COUNT, "starting intersection");

    let lights: Vec<Arc<TrafficLight>> = APPROACHES
        .iter()
        .map(|&(id, approach)| {
            TrafficLightBuilder::new(id)
                .window(window)
                .seed(SEED)
                .observer(PhaseLogger { approach })
                .build()
                .map(Arc::new)
        })
        .collect::<Result<_, _>>()?;

    let deadline = Instant::now() + RUN_FOR;
    let subscription = lights[0].subscribe();
    let watcher = thread::spawn(move || monitor(subscription, deadline));

    for light in &lights {
        light.simulate()?;
    }

    let mut arrivals = CycleRng::new(SEED, LightId(u32::MAX));
    let vehicles: Vec<_> = (0..VEHICLE_COUNT)
        .map(|vehicle| {
            let light = Arc::clone(&lights[vehicle as usize % lights.len()]);
            let arrival = Duration::from_millis(arrivals.gen_range(0..3_000u64));
            thread::spawn(move || drive(vehicle, light, arrival))
        })
        .collect();

    let mut crossed = 0;
    for handle in vehicles {
        match handle.join() {
            Ok(Ok(())) => crossed += 1,
            Ok(Err(e)) => tracing::warn!(error = %e, "vehicle gave up"),
            Err(_) => anyhow::bail!("vehicle thread panicked"),
        }
    }

    let (greens, reds) = watcher
        .join()
        .map_err(|_| anyhow::anyhow!("monitor thread panicked"))?;

    for light in &lights {
        light.join()?;
    }

    let summary: Vec<String> = lights
        .iter()
        .map(|l| format!("{}={}", l.id(), l.toggles()))
        .collect();
    tracing::info!(
        crossed,
        greens,
        reds,
        toggles = %summary.join(" "),
        "intersection stopped"
    );
    Ok(())
}
