//! Cycle timing model.
//!
//! # Design
//!
//! Each light holds its current phase for a randomized interval and then
//! toggles.  The interval is drawn uniformly from an inclusive window of
//! whole milliseconds:
//!
//!   cycle_ms ~ U{min_ms, …, max_ms}
//!
//! The default window is `[4000, 6000]` ms.  Working in integer milliseconds
//! keeps both bounds reachable and makes the distribution exact.

use std::fmt;
use std::time::Duration;

use crate::{CoreError, CoreResult, CycleRng, LightId};

// ── CycleWindow ───────────────────────────────────────────────────────────────

/// Inclusive range of cycle durations in milliseconds.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleWindow {
    /// Shortest cycle, inclusive.  Must be non-zero.
    pub min_ms: u64,
    /// Longest cycle, inclusive.  Must be `>= min_ms`.
    pub max_ms: u64,
}

impl CycleWindow {
    /// The default `[4000, 6000]` ms window.
    pub const DEFAULT: CycleWindow = CycleWindow { min_ms: 4_000, max_ms: 6_000 };

    /// Build a validated window.
    pub fn new(min_ms: u64, max_ms: u64) -> CoreResult<Self> {
        let window = CycleWindow { min_ms, max_ms };
        window.validate()?;
        Ok(window)
    }

    /// A window that always yields exactly `ms`.
    pub fn fixed(ms: u64) -> CoreResult<Self> {
        Self::new(ms, ms)
    }

    /// Check the `0 < min_ms <= max_ms` invariant.
    pub fn validate(&self) -> CoreResult<()> {
        if self.min_ms == 0 {
            return Err(CoreError::Config("cycle window minimum must be non-zero".into()));
        }
        if self.min_ms > self.max_ms {
            return Err(CoreError::Config(format!(
                "cycle window minimum {} ms exceeds maximum {} ms",
                self.min_ms, self.max_ms
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    #[inline]
    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    /// `true` if `d` lies inside the window, compared at millisecond
    /// resolution.
    pub fn contains(&self, d: Duration) -> bool {
        let ms = d.as_millis();
        ms >= self.min_ms as u128 && ms <= self.max_ms as u128
    }

    /// Draw one cycle duration uniformly from the window.
    #[inline]
    pub fn sample(&self, rng: &mut CycleRng) -> Duration {
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }
}

impl Default for CycleWindow {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for CycleWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}] ms", self.min_ms, self.max_ms)
    }
}

// ── CycleConfig ───────────────────────────────────────────────────────────────

/// Per-light cycling configuration.
///
/// Typically built in code by the owning collaborator; with the `serde`
/// feature it can also be loaded from a config file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CycleConfig {
    /// Window the per-cycle duration is drawn from.
    pub window: CycleWindow,

    /// Master RNG seed.  `Some` makes every light's duration sequence
    /// reproducible; `None` seeds each light from OS entropy.
    pub seed: Option<u64>,
}

impl CycleConfig {
    /// Default window with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self { window: CycleWindow::DEFAULT, seed: Some(seed) }
    }

    /// Replace the window, keeping the seed.
    pub fn with_window(mut self, window: CycleWindow) -> Self {
        self.window = window;
        self
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.window.validate()
    }

    /// Construct the RNG the worker of `light` draws durations from.
    pub fn make_rng(&self, light: LightId) -> CycleRng {
        match self.seed {
            Some(seed) => CycleRng::new(seed, light),
            None       => CycleRng::from_entropy(),
        }
    }
}
