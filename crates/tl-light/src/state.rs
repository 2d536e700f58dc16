//! Published light state and per-change event payload.

use std::time::Duration;

use tl_core::Phase;

/// Everything a light publishes, read and written under one lock.
///
/// `toggles` and `greens` only ever grow, so a waiter can compare against
/// the counts it saw when it started waiting.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct LightState {
    /// Phase currently shown.
    pub phase:   Phase,
    /// Number of phase changes published so far.
    pub toggles: u64,
    /// Number of those changes that published green.
    pub greens:  u64,
}

/// One published phase change, as seen by observers.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PhaseChange {
    /// The new phase.
    pub phase:   Phase,
    /// `LightState::toggles` after this change (1 for the first change).
    pub toggles: u64,
    /// How long the previous phase was held.
    pub cycle:   Duration,
}
