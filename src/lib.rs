//! Voxel Entity Core
//!
//! Server-side simulation of non-player entities for a voxel world:
//! - Actor contract and the mob archetype roster
//! - Shared threat/aggro policy with pack alerts
//! - Projectiles with swept collision
//! - Biome-driven spawning and distance-based despawning
//! - Entity manager running the ordered tick
//! - Versioned persistence and a Bevy host plugin

pub mod actor;
pub mod aggro;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod item;
pub mod logging;
pub mod manager;
pub mod math;
pub mod persistence;
pub mod player;
pub mod plugin;
pub mod projectile;
pub mod seed;
pub mod spawn;
pub mod world;

pub use actor::{Actor, ActorEvent, Archetype, Classification, Locomotion, TargetRef};
pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use ids::{ActorId, PlayerId, ProjectileId};
pub use manager::{AttackOutcome, EntityManager, TickReport};
pub use persistence::{SaveData, SAVE_VERSION};
pub use player::{Player, PlayerAction, Players};
pub use world::{GameWorld, SandboxWorld};
