//! Stable identifiers.
//!
//! Entities are only ever referenced by id across ticks, never by index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique id of a live actor (stable for its lifetime, survives conversion)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u64);

/// Unique id of an in-flight projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectileId(pub u64);

/// Id of a connected player, assigned by the network layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

impl fmt::Display for ProjectileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "projectile#{}", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

/// Monotonic id source for actors and projectiles.
///
/// Counters are persisted with the save so a restored world never hands
/// out an id that an old target reference could still point at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next_actor: u64,
    next_projectile: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            next_actor: 1,
            next_projectile: 1,
        }
    }
}

impl IdAllocator {
    pub fn from_counters(next_actor: u64, next_projectile: u64) -> Self {
        Self {
            next_actor: next_actor.max(1),
            next_projectile: next_projectile.max(1),
        }
    }

    pub fn next_actor(&mut self) -> ActorId {
        let id = ActorId(self.next_actor);
        self.next_actor += 1;
        id
    }

    pub fn next_projectile(&mut self) -> ProjectileId {
        let id = ProjectileId(self.next_projectile);
        self.next_projectile += 1;
        id
    }

    /// Make sure future ids are strictly greater than `id`.
    pub fn observe_actor(&mut self, id: ActorId) {
        self.next_actor = self.next_actor.max(id.0 + 1);
    }

    pub fn observe_projectile(&mut self, id: ProjectileId) {
        self.next_projectile = self.next_projectile.max(id.0 + 1);
    }

    pub fn actor_counter(&self) -> u64 {
        self.next_actor
    }

    pub fn projectile_counter(&self) -> u64 {
        self.next_projectile
    }
}
