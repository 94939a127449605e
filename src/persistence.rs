//! Versioned save format for the entity registries.
//!
//! The version is read from the raw JSON before the typed parse so a save
//! written by a newer server fails with a clear error instead of a field
//! mismatch.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::actor::ActorRecord;
use crate::error::{SimError, SimResult};
use crate::projectile::Projectile;

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub tick: u64,
    pub next_actor_id: u64,
    pub next_projectile_id: u64,
    pub actors: Vec<ActorRecord>,
    pub projectiles: Vec<Projectile>,
}

impl SaveData {
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        let raw: Value = serde_json::from_str(json)?;
        let raw_version = raw
            .get("version")
            .and_then(Value::as_u64)
            .ok_or_else(|| SimError::Persistence("missing or invalid `version` field".into()))?;
        let version = u32::try_from(raw_version).map_err(|_| {
            SimError::Persistence(format!("save version {raw_version} is out of range"))
        })?;
        if version == 0 {
            return Err(SimError::Persistence("save version 0 is not valid".into()));
        }
        if version > SAVE_VERSION {
            return Err(SimError::UnsupportedSaveVersion {
                found: version,
                supported: SAVE_VERSION,
            });
        }
        Ok(serde_json::from_value(raw)?)
    }

    pub fn save_to_path(&self, path: &Path) -> SimResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), actors = self.actors.len(), "saved entities");
        Ok(())
    }

    pub fn load_from_path(path: &Path) -> SimResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
