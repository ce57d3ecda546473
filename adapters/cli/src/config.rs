//! Host configuration assembled from an optional TOML file.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use hypercube_core::serde_seconds;
use hypercube_system_crowd_control::Config as CrowdControlConfig;
use hypercube_system_difficulty::DifficultyConfig;
use hypercube_system_level::Config as LevelConfig;
use hypercube_world::WorldConfig;
use serde::Deserialize;

/// Every tunable section of the headless host.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct HostConfig {
    pub(crate) world: WorldConfig,
    pub(crate) difficulty: DifficultyConfig,
    pub(crate) crowd_control: CrowdControlConfig,
    pub(crate) level: LevelConfig,
    pub(crate) simulation: SimulationConfig,
}

impl HostConfig {
    /// Reads the configuration file, falling back to defaults without one.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        if let Err(error) = config.difficulty.validate() {
            log::error!("difficulty tables are invalid: {error}");
        }
        Ok(config)
    }
}

/// Stand-in for the engine: arena layout, frame rate and the scripted pilot.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct SimulationConfig {
    /// Fixed frame step.
    #[serde(with = "serde_seconds")]
    pub(crate) frame: Duration,
    /// Attempts longer than this are abandoned.
    #[serde(with = "serde_seconds")]
    pub(crate) max_attempt_time: Duration,
    /// Spawn points scattered around the arena centre.
    pub(crate) spawn_points: usize,
    /// Closest distance of a spawn point to the arena centre.
    pub(crate) spawn_inner_radius: f32,
    /// Farthest distance of a spawn point to the arena centre.
    pub(crate) spawn_outer_radius: f32,
    /// Cooldown of the pilot's chain ability.
    #[serde(with = "serde_seconds")]
    pub(crate) chain_cooldown: Duration,
    /// How long a chain lasts.
    #[serde(with = "serde_seconds")]
    pub(crate) chain_duration: Duration,
    /// Chasers linked per chain activation.
    pub(crate) chain_targets: usize,
    /// Cooldown of the pilot's slowing ability.
    #[serde(with = "serde_seconds")]
    pub(crate) slow_cooldown: Duration,
    /// Speed multiplier applied by the slowing ability.
    pub(crate) slow_multiplier: f32,
    /// How long a slow lasts.
    #[serde(with = "serde_seconds")]
    pub(crate) slow_duration: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frame: Duration::from_micros(16_667),
            max_attempt_time: Duration::from_secs(900),
            spawn_points: 60,
            spawn_inner_radius: 1_500.0,
            spawn_outer_radius: 6_000.0,
            chain_cooldown: Duration::from_secs(8),
            chain_duration: Duration::from_secs(4),
            chain_targets: 3,
            slow_cooldown: Duration::from_secs(12),
            slow_multiplier: 0.5,
            slow_duration: Duration::from_secs(3),
        }
    }
}
