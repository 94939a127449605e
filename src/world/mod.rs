//! World collaborator contract.
//!
//! The entity core never owns terrain. Everything it needs from the world
//! (block queries, drops, sounds, particles, time of day, ground height,
//! biome) goes through `GameWorld`, which the server implements over its
//! chunk storage. `sandbox::SandboxWorld` is a complete in-memory
//! implementation for tests, benches and the headless binary.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_SUPPORT_SCAN, SUPPORT_SCAN_DEPTH};
use crate::item::ItemStack;
use crate::math::block_of;

pub mod sandbox;

pub use sandbox::{DayCycle, DayPhase, SandboxWorld, WaterRegion};

/// Block kinds the entity core distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Air,
    Grass,
    Dirt,
    Stone,
    Sand,
    Water,
    Leaves,
    Bedrock,
}

impl BlockKind {
    pub fn is_solid(&self) -> bool {
        !matches!(self, Self::Air | Self::Water)
    }

    pub fn is_liquid(&self) -> bool {
        matches!(self, Self::Water)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Plains,
    Forest,
    Taiga,
    Desert,
    Swamp,
    Ocean,
    River,
    Cave,
    Nether,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sound {
    Hurt,
    Death,
    Ambient,
    Shear,
    Eat,
    Shoot,
    Plop,
    Growl,
    Chime,
    Splash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Particle {
    Heart,
    Smoke,
    Flame,
    Crit,
    Note,
    Splash,
    Poof,
}

/// Everything the entity core consumes from the world.
///
/// Block coordinates are integer cells; `height_at` is the y of the first
/// non-solid cell above the topmost solid block of a column (the level a
/// ground mob's feet rest on).
pub trait GameWorld {
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockKind;
    fn set_block(&mut self, x: i32, y: i32, z: i32, block: BlockKind);
    fn drop_item(&mut self, stack: ItemStack, position: Vec3);
    fn play_sound(&mut self, sound: Sound, position: Vec3);
    fn spawn_particle(&mut self, particle: Particle, position: Vec3);
    fn is_daytime(&self) -> bool;
    fn height_at(&self, x: i32, z: i32) -> i32;
    fn biome_at(&self, x: i32, z: i32) -> Biome;

    /// Let a world that keeps its own clock move it forward. Hosts that
    /// drive time elsewhere keep the default.
    fn advance_time(&mut self, _dt: f32) {}

    /// Block containing a world-space point
    fn block_at_point(&self, p: Vec3) -> BlockKind {
        let (x, y, z) = block_of(p);
        self.block_at(x, y, z)
    }

    fn is_solid_at(&self, p: Vec3) -> bool {
        self.block_at_point(p).is_solid()
    }

    fn is_water_at(&self, p: Vec3) -> bool {
        self.block_at_point(p).is_liquid()
    }

    /// Top of the column, ignoring anything under an overhang
    fn surface_y(&self, p: Vec3) -> f32 {
        let (x, _, z) = block_of(p);
        self.height_at(x, z) as f32
    }

    /// Level a body at `p` rests on
    fn ground_y(&self, p: Vec3) -> f32 {
        self.support_below(p, SUPPORT_SCAN_DEPTH)
    }

    /// Top of the first solid block at or below the feet, scanning at most
    /// `depth` cells down. A point inside a solid block resolves to the
    /// first free cell above it. When nothing is found the column height is
    /// used if it lies below the point, otherwise the bottom of the scan.
    fn support_below(&self, p: Vec3, depth: i32) -> f32 {
        let (x, y, z) = block_of(p);
        if self.block_at(x, y, z).is_solid() {
            for up in 1..=MAX_SUPPORT_SCAN {
                let cy = y.saturating_add(up);
                if !self.block_at(x, cy, z).is_solid() {
                    return cy as f32;
                }
            }
            return self.height_at(x, z) as f32;
        }
        let depth = depth.clamp(1, MAX_SUPPORT_SCAN);
        for down in 1..=depth {
            let cy = y.saturating_sub(down);
            if self.block_at(x, cy, z).is_solid() {
                return cy as f32 + 1.0;
            }
        }
        let top = self.height_at(x, z);
        if top <= y {
            top as f32
        } else {
            y.saturating_sub(depth) as f32
        }
    }

    /// Whether nothing solid sits between the point and the sky
    fn sky_exposed(&self, p: Vec3) -> bool {
        let (x, y, z) = block_of(p);
        self.height_at(x, z) <= y
    }
}
