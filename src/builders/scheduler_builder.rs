//! Builder for [`VirtualClockScheduler`].

use std::rc::Rc;

use crate::config::VirtualClockConfig;
use crate::core::{EventLoop, SchedulerError, VirtualClockScheduler};
use crate::runtime::set_event_loop;

/// Assembles a scheduler around a real loop and optionally installs it as the
/// thread's current loop.
pub struct SchedulerBuilder<L> {
    wrapped: L,
    config: VirtualClockConfig,
    install: bool,
}

impl<L> SchedulerBuilder<L>
where
    L: EventLoop + 'static,
{
    /// Builder with the default configuration.
    pub fn new(wrapped: L) -> Self {
        Self {
            wrapped,
            config: VirtualClockConfig::default(),
            install: false,
        }
    }

    /// Builder configured from the environment (and `.env`).
    ///
    /// # Errors
    ///
    /// `Backend` when a variable does not parse or fails validation.
    pub fn from_env(wrapped: L) -> Result<Self, SchedulerError> {
        let config = VirtualClockConfig::from_env()
            .map_err(|e| SchedulerError::Backend(format!("config invalid: {e}")))?;
        Ok(Self::new(wrapped).with_config(config))
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn with_config(mut self, config: VirtualClockConfig) -> Self {
        self.config = config;
        self
    }

    /// Virtual time the clock starts at.
    #[must_use]
    pub fn start_time(mut self, start_time: f64) -> Self {
        self.config.start_time = start_time;
        self
    }

    /// Install the scheduler with [`set_event_loop`] when built.
    #[must_use]
    pub fn install(mut self, install: bool) -> Self {
        self.install = install;
        self
    }

    /// The configuration `build` will validate.
    pub fn config(&self) -> &VirtualClockConfig {
        &self.config
    }

    /// Validate the configuration and create the scheduler.
    ///
    /// # Errors
    ///
    /// `Backend` when the configuration is invalid.
    pub fn build(self) -> Result<Rc<VirtualClockScheduler<L>>, SchedulerError> {
        let scheduler = VirtualClockScheduler::with_config(self.wrapped, self.config)?;
        if self.install {
            let current: Rc<dyn EventLoop> = scheduler.clone();
            set_event_loop(current);
        }
        Ok(scheduler)
    }
}
