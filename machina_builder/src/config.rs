// Data-driven builder configuration.
//
// All tunable timing and cost parameters live here in `MachinaConfig`,
// loaded from JSON at startup. The builder core never uses magic numbers
// for delays, depths, or energy costs; it reads them from `BuilderConfig`.
// Defaults reproduce the classic builder: a move every 20 ticks, a build
// every 10, heads scanning 6 cells down, and each action costing as many
// energy ticks as its delay.
//
// Missing fields fall back to their defaults (`#[serde(default)]`), so a
// config file only needs the values it overrides.
//
// See also: `builder.rs`, `movement.rs`, `build.rs` which read
// `BuilderConfig`, and `sim.rs` which owns the `MachinaConfig`.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-builder timing and cost parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Ticks to wait after a move (or before moving when nothing is
    /// queued).
    pub move_delay_ticks: u64,

    /// Ticks to wait before confirming and executing a queued build.
    pub build_delay_ticks: u64,

    /// Number of cells scanned below each head when looking for a place to
    /// drop a block. Must be at least 1.
    pub max_build_depth: u32,

    /// Energy ticks charged for one move.
    pub move_energy_cost: u32,

    /// Energy ticks charged for one placed block.
    pub build_energy_cost: u32,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            move_delay_ticks: 20,
            build_delay_ticks: 10,
            max_build_depth: 6,
            move_energy_cost: 20,
            build_energy_cost: 10,
        }
    }
}

/// Top-level configuration. Loaded from JSON, never mutated at runtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachinaConfig {
    pub builder: BuilderConfig,

    /// World dimensions in voxels (x, y, z) for the bundled `VoxelWorld`.
    pub world_size: (u32, u32, u32),

    /// Host backoff after a heartbeat yields no event. `Some(n)` retries
    /// after `n` ticks; `None` deactivates the stalled builder.
    pub stall_retry_ticks: Option<u64>,
}

impl Default for MachinaConfig {
    fn default() -> Self {
        Self {
            builder: BuilderConfig::default(),
            world_size: (64, 32, 64),
            stall_retry_ticks: Some(20),
        }
    }
}

impl MachinaConfig {
    /// Parse and validate a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.builder.max_build_depth == 0 {
            return Err(ConfigError::Invalid(
                "builder.max_build_depth must be at least 1".into(),
            ));
        }
        if self.builder.move_delay_ticks == 0 || self.builder.build_delay_ticks == 0 {
            return Err(ConfigError::Invalid(
                "builder delays must be at least 1 tick".into(),
            ));
        }
        if self.stall_retry_ticks == Some(0) {
            return Err(ConfigError::Invalid(
                "stall_retry_ticks must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }
}
