//! Virtual clock configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Environment key for [`VirtualClockConfig::start_time`].
pub const ENV_START_TIME: &str = "TIMELESS_START_TIME";
/// Environment key for [`VirtualClockConfig::max_pending`].
pub const ENV_MAX_PENDING: &str = "TIMELESS_MAX_PENDING";
/// Environment key for [`VirtualClockConfig::max_callbacks_per_advance`].
pub const ENV_MAX_CALLBACKS_PER_ADVANCE: &str = "TIMELESS_MAX_CALLBACKS_PER_ADVANCE";

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualClockConfig {
    /// Virtual time the clock starts at.
    pub start_time: f64,
    /// Maximum live callbacks in the pending queue.
    pub max_pending: usize,
    /// Maximum callbacks a single `advance` may fire.
    pub max_callbacks_per_advance: usize,
}

impl Default for VirtualClockConfig {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            max_pending: 100_000,
            max_callbacks_per_advance: 1_000_000,
        }
    }
}

impl VirtualClockConfig {
    /// Set the starting virtual time.
    #[must_use]
    pub const fn with_start_time(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }

    /// Set the pending queue depth.
    #[must_use]
    pub const fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending;
        self
    }

    /// Set the per-advance callback limit.
    #[must_use]
    pub const fn with_max_callbacks_per_advance(mut self, max: usize) -> Self {
        self.max_callbacks_per_advance = max;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if !self.start_time.is_finite() || self.start_time < 0.0 {
            return Err("start_time must be a finite, non-negative number".into());
        }
        if self.max_pending == 0 {
            return Err("max_pending must be greater than 0".into());
        }
        if self.max_callbacks_per_advance == 0 {
            return Err("max_callbacks_per_advance must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from the process environment, loading `.env` first
    /// when present. Unset keys keep their defaults.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_pairs(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    /// Build configuration from a dotenv file without touching the process
    /// environment.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let iter = dotenvy::from_path_iter(path.as_ref())
            .map_err(|e| format!("cannot read {}: {e}", path.as_ref().display()))?;
        let pairs = iter
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("parse error: {e}"))?;
        Self::from_pairs(pairs)
    }

    fn from_pairs<I>(pairs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut cfg = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                ENV_START_TIME => cfg.start_time = parse_value(&key, &value)?,
                ENV_MAX_PENDING => cfg.max_pending = parse_value(&key, &value)?,
                ENV_MAX_CALLBACKS_PER_ADVANCE => {
                    cfg.max_callbacks_per_advance = parse_value(&key, &value)?;
                }
                _ => {}
            }
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| format!("`{key}` invalid: {e}"))
}
