use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use path_defence_world::Config as WorldConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_FRAME_RATE: u32 = 60;
const MAX_FRAME_RATE: u32 = 1_000;
const DEFAULT_SPAWN_INTERVAL_MS: u64 = 100;
const DEFAULT_MAX_FRAME_DELTA_MS: u64 = 250;
const DEFAULT_WAVE_BREAK_MS: u64 = 3_000;
const MAX_FRAME_DELTA_LIMIT_MS: u64 = 10_000;
const MAX_SPEED_LIMIT: f32 = 1_000.0;

/// Errors raised while loading a simulation configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read configuration {path}: {source}")]
    Io {
        /// Location of the configuration file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The configuration was not valid TOML or did not match the schema.
    #[error("could not parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value was syntactically valid but unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Timing and world tunables for a hosted simulation.
///
/// Every field has a default, so a TOML document only needs to name the
/// values it overrides:
///
/// ```toml
/// frame_rate = 30
/// wave_break_ms = 5000
///
/// [world]
/// refund_fraction = 0.5
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Frames per second driven by the frame task.
    pub frame_rate: u32,
    /// Period of the spawn task in milliseconds.
    pub spawn_interval_ms: u64,
    /// Largest wall-clock delta a single frame may simulate, in milliseconds.
    pub max_frame_delta_ms: u64,
    /// Pause between a cleared wave and the next wave start, in milliseconds.
    pub wave_break_ms: u64,
    /// Tunables forwarded to the world.
    pub world: WorldConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            spawn_interval_ms: DEFAULT_SPAWN_INTERVAL_MS,
            max_frame_delta_ms: DEFAULT_MAX_FRAME_DELTA_MS,
            wave_break_ms: DEFAULT_WAVE_BREAK_MS,
            world: WorldConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parses and validates a configuration from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration stored on disk.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Rejects values the loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_FRAME_RATE).contains(&self.frame_rate) {
            return Err(ConfigError::Invalid(format!(
                "frame_rate must lie within 1 and {MAX_FRAME_RATE}"
            )));
        }
        if self.spawn_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "spawn_interval_ms must be positive".to_owned(),
            ));
        }
        if !(1..=MAX_FRAME_DELTA_LIMIT_MS).contains(&self.max_frame_delta_ms) {
            return Err(ConfigError::Invalid(format!(
                "max_frame_delta_ms must lie within 1 and {MAX_FRAME_DELTA_LIMIT_MS}"
            )));
        }
        let world = &self.world;
        if world.columns == 0 || world.rows == 0 {
            return Err(ConfigError::Invalid("grid needs at least one cell".to_owned()));
        }
        if !(world.cell_size.is_finite() && world.cell_size > 0.0) {
            return Err(ConfigError::Invalid("cell_size must be positive".to_owned()));
        }
        if !(0.0..=1.0).contains(&world.refund_fraction) {
            return Err(ConfigError::Invalid(
                "refund_fraction must lie within 0 and 1".to_owned(),
            ));
        }
        if world.projection_steps == 0 {
            return Err(ConfigError::Invalid(
                "projection_steps must be positive".to_owned(),
            ));
        }
        if !(world.hit_threshold.is_finite() && world.hit_threshold >= 0.0) {
            return Err(ConfigError::Invalid(
                "hit_threshold must not be negative".to_owned(),
            ));
        }
        if !(world.slow_decay_per_second.is_finite() && world.slow_decay_per_second >= 0.0) {
            return Err(ConfigError::Invalid(
                "slow_decay_per_second must not be negative".to_owned(),
            ));
        }
        if !(world.max_speed > 0.0 && world.max_speed <= MAX_SPEED_LIMIT) {
            return Err(ConfigError::Invalid(format!(
                "max_speed must lie within 0 and {MAX_SPEED_LIMIT}"
            )));
        }
        Ok(())
    }

    /// Wall-clock period of the frame task.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.clamp(1, MAX_FRAME_RATE)
    }

    /// Wall-clock period of the spawn task.
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms.max(1))
    }

    /// Upper bound applied to the wall delta of a single frame.
    #[must_use]
    pub fn max_frame_delta(&self) -> Duration {
        Duration::from_millis(self.max_frame_delta_ms)
    }

    /// Pause between a cleared wave and the following one.
    #[must_use]
    pub fn wave_break(&self) -> Duration {
        Duration::from_millis(self.wave_break_ms)
    }
}
