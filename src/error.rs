//! Error types surfaced to callers of the entity core.
//!
//! Most failure modes are recovered inside the tick (stale targets fall back
//! to idle, bad interactions return `NotHandled`, unknown spawn-table names
//! are logged and skipped). Only the cases below reach the caller.

use thiserror::Error;

use crate::config::ConfigError;
use crate::ids::{ActorId, PlayerId};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("unknown archetype `{0}`")]
    UnknownArchetype(String),

    #[error("{0} not found")]
    ActorNotFound(ActorId),

    #[error("{0} not found")]
    PlayerNotFound(PlayerId),

    #[error("persistence: {0}")]
    Persistence(String),

    #[error("save version {found} is newer than supported version {supported}")]
    UnsupportedSaveVersion { found: u32, supported: u32 },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
