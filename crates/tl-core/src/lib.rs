//! `tl-core` — foundational types for the `rust_tl` traffic light crates.
//!
//! This crate is a dependency of every other `tl-*` crate.  It intentionally
//! has no `tl-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`ids`]     | `LightId`                                             |
//! | [`phase`]   | `Phase` enum (`Red`, `Green`)                         |
//! | [`cycle`]   | `CycleWindow`, `CycleConfig`                          |
//! | [`rng`]     | `CycleRng` (per-light)                                |
//! | [`error`]   | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod cycle;
pub mod error;
pub mod ids;
pub mod phase;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cycle::{CycleConfig, CycleWindow};
pub use error::{CoreError, CoreResult};
pub use ids::LightId;
pub use phase::Phase;
pub use rng::CycleRng;
