//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level tether configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Snapshot replication settings.
    pub sync: SyncConfig,
    /// Interaction arbitration settings.
    pub arbiter: ArbiterConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Snapshot replication settings (authority side selects cadence from these;
/// observers use the same bounds for their interpolation-speed assumption).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds between snapshots for an idle (un-grabbed) object.
    pub idle_interval: f32,
    /// Seconds between snapshots for an actively interacted object.
    pub interacted_interval: f32,
    /// Speed (m/s) at which the velocity-scaled interval reaches the
    /// interacted bound. Only used when `velocity_scaled` is set.
    pub velocity_threshold: f32,
    /// Linearly interpolate the interval between the two bounds by the
    /// object's speed ratio instead of hard-switching on the interacted flag.
    pub velocity_scaled: bool,
    /// Speed below which an object counts as stationary.
    pub rest_epsilon: f32,
}

/// Interaction arbitration settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArbiterConfig {
    /// Upper bound (exclusive) on the secondary priority search. Priorities
    /// outside `[0, max_search_depth)` terminate the search.
    pub max_search_depth: u8,
}

/// Debug/development settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DebugConfig {
    /// Snap observers directly to the latest snapshot instead of
    /// interpolating toward it.
    pub disable_interpolation: bool,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            idle_interval: 0.1,
            interacted_interval: 1.0 / 60.0,
            velocity_threshold: 2.0,
            velocity_scaled: false,
            rest_epsilon: 1e-3,
        }
    }
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            max_search_depth: 5,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            disable_interpolation: false,
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Validate ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("tether.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            tracing::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            tracing::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `tether.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("tether.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Check that every setting is inside its legal range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.idle_interval <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "sync.idle_interval",
                reason: format!("must be positive, got {}", self.sync.idle_interval),
            });
        }
        if self.sync.interacted_interval <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "sync.interacted_interval",
                reason: format!("must be positive, got {}", self.sync.interacted_interval),
            });
        }
        if self.sync.interacted_interval > self.sync.idle_interval {
            return Err(ConfigError::Invalid {
                field: "sync.interacted_interval",
                reason: "interacted interval must not exceed the idle interval".to_string(),
            });
        }
        if self.sync.velocity_scaled && self.sync.velocity_threshold <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "sync.velocity_threshold",
                reason: format!("must be positive, got {}", self.sync.velocity_threshold),
            });
        }
        if self.sync.rest_epsilon < 0.0 {
            return Err(ConfigError::Invalid {
                field: "sync.rest_epsilon",
                reason: format!("must be non-negative, got {}", self.sync.rest_epsilon),
            });
        }
        if self.arbiter.max_search_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "arbiter.max_search_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
