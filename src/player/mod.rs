//! Connected players as seen by the entity core.
//!
//! Actors read players (position, held item) through `Players`; only the
//! manager mutates them (melee/projectile damage, interaction results).

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::PlayerId;
use crate::item::{ItemKind, ItemStack};
use crate::math::distance;

/// Right-click style action a player performs on an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    Use,
    SneakUse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Vec3,
    pub health: f32,
    pub max_health: f32,
    pub held: Option<ItemStack>,
    pub inventory: Vec<ItemStack>,
}

impl Player {
    pub fn new(id: PlayerId, name: &str, position: Vec3) -> Self {
        Self {
            id,
            name: name.to_string(),
            position,
            health: 20.0,
            max_health: 20.0,
            held: None,
            inventory: Vec::new(),
        }
    }

    pub fn holding(mut self, stack: ItemStack) -> Self {
        self.held = Some(stack);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Whether the held stack is of `kind`
    pub fn holds(&self, kind: ItemKind) -> bool {
        self.held.is_some_and(|s| s.is(kind))
    }

    pub fn held_kind(&self) -> Option<ItemKind> {
        self.held.filter(|s| s.count > 0).map(|s| s.kind)
    }

    /// Add to the first matching inventory stack or open a new one
    pub fn give_item(&mut self, stack: ItemStack) {
        if stack.count == 0 {
            return;
        }
        match self.inventory.iter_mut().find(|s| s.kind == stack.kind) {
            Some(existing) => existing.count += stack.count,
            None => self.inventory.push(stack),
        }
    }

    /// Consume up to `count` from the held stack; tools are never consumed.
    /// Returns how many were actually removed.
    pub fn remove_held_item(&mut self, count: u32) -> u32 {
        let Some(held) = self.held.as_mut() else {
            return 0;
        };
        if held.kind.is_tool() {
            return 0;
        }
        let removed = count.min(held.count);
        held.count -= removed;
        if held.count == 0 {
            self.held = None;
        }
        removed
    }

    /// Apply damage, clamped at zero. Returns damage actually applied.
    pub fn damage(&mut self, amount: f32) -> f32 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let actual = amount.min(self.health);
        self.health -= actual;
        actual
    }

    pub fn count_of(&self, kind: ItemKind) -> u32 {
        self.inventory
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.count)
            .sum()
    }
}

/// Id-keyed collection of connected players
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Players {
    players: BTreeMap<PlayerId, Player>,
}

impl Players {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    /// Disconnect. Actors are not notified; stale targets resolve to nothing
    /// on their next validity check.
    pub fn leave(&mut self, id: PlayerId) -> Option<Player> {
        self.players.remove(&id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.players.values().map(|p| p.position)
    }

    /// Nearest living player to `pos`, with its distance
    pub fn nearest(&self, pos: Vec3) -> Option<(&Player, f32)> {
        self.players
            .values()
            .filter(|p| p.is_alive())
            .map(|p| (p, distance(p.position, pos)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Smallest distance from `pos` to any connected player
    pub fn min_distance(&self, pos: Vec3) -> Option<f32> {
        self.positions()
            .map(|p| distance(p, pos))
            .min_by(|a, b| a.total_cmp(b))
    }

    pub fn give_item(&mut self, id: PlayerId, stack: ItemStack) -> bool {
        match self.players.get_mut(&id) {
            Some(player) => {
                player.give_item(stack);
                true
            }
            None => false,
        }
    }

    pub fn remove_held_item(&mut self, id: PlayerId, count: u32) -> u32 {
        self.players
            .get_mut(&id)
            .map(|p| p.remove_held_item(count))
            .unwrap_or(0)
    }
}
