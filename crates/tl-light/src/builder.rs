//! Fluent builder for constructing a [`TrafficLight`].

use std::sync::Arc;

use tl_core::{CycleConfig, CycleWindow, LightId};

use crate::{LightObserver, LightResult, TrafficLight};

/// Fluent builder for [`TrafficLight`].
///
/// # Optional inputs (have defaults)
///
/// | Method           | Default                              |
/// |------------------|--------------------------------------|
/// | `.config(c)`     | `CycleConfig::default()`             |
/// | `.window(w)`     | `[4000, 6000]` ms                    |
/// | `.seed(s)`       | entropy-seeded                       |
/// | `.observer(o)`   | none                                 |
///
/// # Example
///
/// ```rust,ignore
/// let light = TrafficLightBuilder::new(LightId(3))
///     .window(CycleWindow::new(2_000, 3_000)?)
///     .seed(42)
///     .observer(PhaseLogger)
///     .build()?;
/// ```
pub struct TrafficLightBuilder {
    id:        LightId,
    config:    CycleConfig,
    observers: Vec<Arc<dyn LightObserver>>,
}

impl TrafficLightBuilder {
    pub fn new(id: LightId) -> Self {
        Self {
            id,
            config:    CycleConfig::default(),
            observers: Vec::new(),
        }
    }

    /// Replace the whole cycling configuration.
    pub fn config(mut self, config: CycleConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the window cycle durations are drawn from.
    pub fn window(mut self, window: CycleWindow) -> Self {
        self.config.window = window;
        self
    }

    /// Make the duration sequence reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Register an observer before the worker can fire any callback.
    pub fn observer<O: LightObserver + 'static>(mut self, observer: O) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Validate the configuration and return an idle, red light.
    pub fn build(self) -> LightResult<TrafficLight> {
        self.config.validate()?;
        Ok(TrafficLight::from_parts(self.id, self.config, self.observers))
    }
}
