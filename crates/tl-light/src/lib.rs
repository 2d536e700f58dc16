//! `tl-light` — one traffic light as an independent, autonomously cycling
//! entity.
//!
//! # Worker loop
//!
//! ```text
//! simulate():
//!   spawn "light-<id>":
//!     loop:
//!       ① Draw    — cycle ~ U[window.min_ms, window.max_ms]
//!       ② Wait    — timed wait on the stop signal until start + cycle
//!                   (returns early on stop → exit)
//!       ③ Toggle  — red ↔ green, published under the state lock
//!       ④ Notify  — observers and subscribed queues, on the worker thread
//! ```
//!
//! Callers block in [`TrafficLight::wait_for_green`] until a green is
//! published after they started waiting, or read the phase without blocking
//! via [`TrafficLight::current_phase`].  The owner stops the worker with
//! [`TrafficLight::stop`]/[`TrafficLight::join`]; dropping the light does
//! both.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tl_core::{CycleConfig, LightId};
//! use tl_light::TrafficLightBuilder;
//!
//! let light = TrafficLightBuilder::new(LightId(0))
//!     .config(CycleConfig::seeded(42))
//!     .build()?;
//! light.simulate()?;
//! light.wait_for_green()?;
//! light.join()?;
//! ```

pub mod builder;
pub mod error;
pub mod light;
pub mod observer;
pub mod signal;
pub mod state;

mod worker;

#[cfg(test)]
mod tests;

pub use builder::TrafficLightBuilder;
pub use error::{LightError, LightResult};
pub use light::TrafficLight;
pub use observer::{LightObserver, NoopObserver};
pub use signal::StopSignal;
pub use state::{LightState, PhaseChange};
