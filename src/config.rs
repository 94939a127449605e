//! Simulation configuration.
//!
//! Loaded from RON or JSON; every field has a default so partial files are
//! fine. Archetype names in the spawn table are plain strings: a typo is a
//! configuration defect reported at spawn time, not a load failure.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::constants::*;
use crate::world::Biome;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ron: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported config format `{0}` (expected .ron or .json)")]
    UnknownFormat(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    pub tick_rate: u32,
    pub world_floor_y: f32,
    pub spawn: SpawnConfig,
    pub despawn: DespawnConfig,
    pub projectile: ProjectileConfig,
    pub alert: AlertConfig,
    pub spawn_table: Vec<SpawnEntry>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            tick_rate: DEFAULT_TICK_RATE,
            world_floor_y: DEFAULT_WORLD_FLOOR_Y,
            spawn: SpawnConfig::default(),
            despawn: DespawnConfig::default(),
            projectile: ProjectileConfig::default(),
            alert: AlertConfig::default(),
            spawn_table: default_spawn_table(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub cooldown_secs: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub caps: PopulationCaps,
    pub hostile_chance_night: f32,
    pub hostile_chance_day: f32,
    pub attempts_per_player: u32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: SPAWN_COOLDOWN_SECS,
            min_radius: SPAWN_MIN_RADIUS,
            max_radius: SPAWN_MAX_RADIUS,
            caps: PopulationCaps::default(),
            hostile_chance_night: HOSTILE_CHANCE_NIGHT,
            hostile_chance_day: HOSTILE_CHANCE_DAY,
            attempts_per_player: 1,
        }
    }
}

/// Independent population caps per classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationCaps {
    pub passive: u32,
    pub neutral: u32,
    pub hostile: u32,
}

impl Default for PopulationCaps {
    fn default() -> Self {
        Self {
            passive: PASSIVE_CAP,
            neutral: NEUTRAL_CAP,
            hostile: HOSTILE_CAP,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DespawnConfig {
    pub radius: f32,
    pub timeout_secs: f32,
}

impl Default for DespawnConfig {
    fn default() -> Self {
        Self {
            radius: DESPAWN_RADIUS,
            timeout_secs: DESPAWN_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub hit_radius: f32,
    pub gravity: f32,
    pub drag: f32,
    pub default_ttl_secs: f32,
    pub max_speed: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            hit_radius: PROJECTILE_HIT_RADIUS,
            gravity: PROJECTILE_GRAVITY,
            drag: PROJECTILE_DRAG,
            default_ttl_secs: PROJECTILE_DEFAULT_TTL_SECS,
            max_speed: PROJECTILE_MAX_SPEED,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub max_hops: u32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_ALERT_HOPS,
        }
    }
}

/// One weighted row of the biome spawn table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub biome: Biome,
    pub archetype: String,
    pub weight: u32,
}

impl SpawnEntry {
    pub fn new(biome: Biome, archetype: &str, weight: u32) -> Self {
        Self {
            biome,
            archetype: archetype.to_string(),
            weight,
        }
    }
}

fn default_spawn_table() -> Vec<SpawnEntry> {
    use Biome::*;
    vec![
        SpawnEntry::new(Plains, "sheep", 12),
        SpawnEntry::new(Plains, "chicken", 10),
        SpawnEntry::new(Plains, "zombie", 95),
        SpawnEntry::new(Plains, "skeleton", 80),
        SpawnEntry::new(Forest, "sheep", 8),
        SpawnEntry::new(Forest, "wolf", 8),
        SpawnEntry::new(Forest, "zombie", 95),
        SpawnEntry::new(Forest, "skeleton", 100),
        SpawnEntry::new(Taiga, "wolf", 12),
        SpawnEntry::new(Taiga, "skeleton", 100),
        SpawnEntry::new(Ocean, "squid", 10),
        SpawnEntry::new(Ocean, "drowned", 5),
        SpawnEntry::new(River, "squid", 4),
        SpawnEntry::new(River, "drowned", 100),
        SpawnEntry::new(Cave, "bat", 10),
        SpawnEntry::new(Cave, "zombie", 100),
        SpawnEntry::new(Cave, "skeleton", 100),
        SpawnEntry::new(Nether, "blaze", 10),
    ]
}

impl SimConfig {
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.ron` or `.json` file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("ron") => Self::from_ron_str(&text),
            Some("json") => Self::from_json_str(&text),
            other => Err(ConfigError::UnknownFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let spawn = &self.spawn;
        if spawn.min_radius < 0.0 || spawn.max_radius <= spawn.min_radius {
            return Err(ConfigError::Invalid(format!(
                "spawn annulus must satisfy 0 <= min_radius < max_radius (got {} .. {})",
                spawn.min_radius, spawn.max_radius
            )));
        }
        if spawn.cooldown_secs <= 0.0 {
            return Err(ConfigError::Invalid("spawn.cooldown_secs must be > 0".into()));
        }
        for (name, chance) in [
            ("hostile_chance_night", spawn.hostile_chance_night),
            ("hostile_chance_day", spawn.hostile_chance_day),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(ConfigError::Invalid(format!(
                    "spawn.{name} must be within 0..=1"
                )));
            }
        }
        if self.despawn.radius <= 0.0 || self.despawn.timeout_secs <= 0.0 {
            return Err(ConfigError::Invalid(
                "despawn radius and timeout must be > 0".into(),
            ));
        }
        let projectile = &self.projectile;
        if projectile.hit_radius <= 0.0
            || projectile.default_ttl_secs <= 0.0
            || projectile.max_speed <= 0.0
        {
            return Err(ConfigError::Invalid(
                "projectile hit_radius, default_ttl_secs and max_speed must be > 0".into(),
            ));
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be > 0".into()));
        }
        Ok(())
    }
}
