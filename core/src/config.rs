//! Timing rules that vary between federations and legacy meets.
//!
//! Every field is optional in TOML; missing fields take the defaults used by
//! the free functions in [`crate::splits`] and [`crate::relay`].
//!
//! ```toml
//! standard_interval = 50
//! long_interval = 100
//! long_interval_distances = [800, 1500]
//! relay_legs = 4
//! uneven_distance = "append_finish"
//! ```

use serde::Deserialize;

use crate::error::TimingError;

/// What to do with a race distance that is not a multiple of its split
/// interval (e.g. 25m lengths in some legacy meets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnevenDistance {
    /// Keep every full interval and add the race distance as the last checkpoint.
    #[default]
    AppendFinish,
    /// Refuse to lay out checkpoints.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Checkpoint spacing in meters for most races.
    pub standard_interval: u32,
    /// Checkpoint spacing for distance races.
    pub long_interval: u32,
    /// Races that use `long_interval`.
    pub long_interval_distances: Vec<u32>,
    /// Legs assumed when a relay race does not say.
    pub relay_legs: u32,
    pub uneven_distance: UnevenDistance,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            standard_interval: 50,
            long_interval: 100,
            long_interval_distances: vec![800, 1500],
            relay_legs: 4,
            uneven_distance: UnevenDistance::AppendFinish,
        }
    }
}

impl TimingConfig {
    /// Parse a config from TOML text and check it.
    pub fn from_toml_str(content: &str) -> Result<Self, TimingError> {
        let config: TimingConfig =
            toml::from_str(content).map_err(|e| TimingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TimingError> {
        if self.standard_interval == 0 || self.long_interval == 0 {
            return Err(TimingError::Config(
                "split intervals must be positive".to_string(),
            ));
        }
        if self.relay_legs == 0 {
            return Err(TimingError::Config("relay_legs must be positive".to_string()));
        }
        Ok(())
    }
}
