//! In-memory world: flat terrain, an optional water basin, a single biome
//! and a day/night clock. Records every side effect the entity core posts
//! so tests can assert on drops, sounds and block writes.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Biome, BlockKind, GameWorld, Particle, Sound};
use crate::item::ItemStack;

/// Phases of the sandbox day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayPhase {
    Dawn,
    Day,
    Dusk,
    Night,
}

impl DayPhase {
    /// Phase length in seconds (a 20 minute day)
    pub fn duration_secs(&self) -> f32 {
        match self {
            Self::Dawn => 60.0,
            Self::Day => 540.0,
            Self::Dusk => 60.0,
            Self::Night => 540.0,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Dawn => Self::Day,
            Self::Day => Self::Dusk,
            Self::Dusk => Self::Night,
            Self::Night => Self::Dawn,
        }
    }

    /// Undead burn and hostile spawning is gated on this
    pub fn is_daytime(&self) -> bool {
        matches!(self, Self::Dawn | Self::Day)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCycle {
    pub phase: DayPhase,
    pub phase_timer: f32,
    pub day_count: u32,
}

impl Default for DayCycle {
    fn default() -> Self {
        Self {
            phase: DayPhase::Day,
            phase_timer: 0.0,
            day_count: 0,
        }
    }
}

impl DayCycle {
    pub fn starting_at(phase: DayPhase) -> Self {
        Self {
            phase,
            ..Default::default()
        }
    }

    /// Length of a full dawn-to-dawn cycle
    pub fn cycle_secs() -> f32 {
        [DayPhase::Dawn, DayPhase::Day, DayPhase::Dusk, DayPhase::Night]
            .iter()
            .map(DayPhase::duration_secs)
            .sum()
    }

    pub fn advance(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        // whole days are counted, not stepped through
        let cycle = Self::cycle_secs();
        let whole_days = (dt / cycle).floor() as u32;
        self.day_count = self.day_count.saturating_add(whole_days);
        self.phase_timer += dt.rem_euclid(cycle);
        while self.phase_timer >= self.phase.duration_secs() {
            self.phase_timer -= self.phase.duration_secs();
            let next = self.phase.next();
            if next == DayPhase::Dawn {
                self.day_count = self.day_count.saturating_add(1);
            }
            self.phase = next;
        }
    }
}

/// Rectangular basin whose floor sits below the flat ground and is filled
/// with water up to `surface_y` (exclusive)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WaterRegion {
    pub min_x: i32,
    pub max_x: i32,
    pub min_z: i32,
    pub max_z: i32,
    pub floor_y: i32,
    pub surface_y: i32,
}

impl WaterRegion {
    pub fn contains_column(&self, x: i32, z: i32) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }
}

#[derive(Debug, Clone)]
pub struct SandboxWorld {
    pub ground_height: i32,
    pub water: Option<WaterRegion>,
    pub biome: Biome,
    pub cycle: DayCycle,
    overrides: HashMap<(i32, i32, i32), BlockKind>,
    pub drops: Vec<(ItemStack, Vec3)>,
    pub sounds: Vec<(Sound, Vec3)>,
    pub particles: Vec<(Particle, Vec3)>,
    pub block_writes: Vec<((i32, i32, i32), BlockKind)>,
}

impl SandboxWorld {
    /// Flat plains whose surface (feet level) is `ground_height`
    pub fn flat(ground_height: i32) -> Self {
        Self {
            ground_height,
            water: None,
            biome: Biome::Plains,
            cycle: DayCycle::default(),
            overrides: HashMap::new(),
            drops: Vec::new(),
            sounds: Vec::new(),
            particles: Vec::new(),
            block_writes: Vec::new(),
        }
    }

    pub fn with_biome(mut self, biome: Biome) -> Self {
        self.biome = biome;
        self
    }

    pub fn with_water(mut self, region: WaterRegion) -> Self {
        self.water = Some(region);
        self
    }

    pub fn at_night(mut self) -> Self {
        self.cycle = DayCycle::starting_at(DayPhase::Night);
        self
    }

    pub fn set_daytime(&mut self, day: bool) {
        self.cycle = DayCycle::starting_at(if day { DayPhase::Day } else { DayPhase::Night });
    }

    /// Total item count dropped for a kind
    pub fn dropped(&self, kind: crate::item::ItemKind) -> u32 {
        self.drops
            .iter()
            .filter(|(s, _)| s.kind == kind)
            .map(|(s, _)| s.count)
            .sum()
    }

    fn base_block(&self, x: i32, y: i32, z: i32) -> BlockKind {
        if let Some(water) = self.water.filter(|w| w.contains_column(x, z)) {
            return if y < water.floor_y - 1 {
                BlockKind::Stone
            } else if y == water.floor_y - 1 {
                BlockKind::Sand
            } else if y < water.surface_y {
                BlockKind::Water
            } else {
                BlockKind::Air
            };
        }
        if y < self.ground_height - 1 {
            BlockKind::Stone
        } else if y == self.ground_height - 1 {
            BlockKind::Grass
        } else {
            BlockKind::Air
        }
    }
}

impl GameWorld for SandboxWorld {
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockKind {
        self.overrides
            .get(&(x, y, z))
            .copied()
            .unwrap_or_else(|| self.base_block(x, y, z))
    }

    fn set_block(&mut self, x: i32, y: i32, z: i32, block: BlockKind) {
        self.overrides.insert((x, y, z), block);
        self.block_writes.push(((x, y, z), block));
    }

    fn drop_item(&mut self, stack: ItemStack, position: Vec3) {
        self.drops.push((stack, position));
    }

    fn play_sound(&mut self, sound: Sound, position: Vec3) {
        self.sounds.push((sound, position));
    }

    fn spawn_particle(&mut self, particle: Particle, position: Vec3) {
        self.particles.push((particle, position));
    }

    fn is_daytime(&self) -> bool {
        self.cycle.phase.is_daytime()
    }

    fn advance_time(&mut self, dt: f32) {
        self.cycle.advance(dt);
    }

    fn height_at(&self, x: i32, z: i32) -> i32 {
        let base = match self.water.filter(|w| w.contains_column(x, z)) {
            Some(water) => water.floor_y,
            None => self.ground_height,
        };
        // dug cells lower the natural surface; overrides are finite so the
        // walk always reaches untouched ground
        let dug = i32::try_from(self.overrides.len()).unwrap_or(i32::MAX);
        let lowest = base.saturating_sub(dug.saturating_add(1));
        let mut natural = base;
        while natural > lowest && !self.block_at(x, natural - 1, z).is_solid() {
            natural -= 1;
        }
        self.overrides
            .iter()
            .filter(|((ox, _, oz), block)| *ox == x && *oz == z && block.is_solid())
            .map(|((_, oy, _), _)| oy + 1)
            .fold(natural, i32::max)
    }

    fn biome_at(&self, _x: i32, _z: i32) -> Biome {
        self.biome
    }
}
