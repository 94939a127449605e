//! Spawn and despawn policy.
//!
//! Organic spawning samples an annulus around each connected player and
//! asks the biome table for a fitting archetype, respecting independent
//! caps per classification. Despawning removes far-away eligible actors
//! once their out-of-range time has accumulated past the timeout.

use bevy::math::Vec3;
use rand::Rng;

use crate::actor::{Archetype, Classification, DespawnState, Habitat};
use crate::config::{DespawnConfig, SpawnConfig, SpawnEntry};
use crate::math::distance;
use crate::player::Players;
use crate::seed::SimRng;
use crate::world::{Biome, GameWorld};

/// Weighted biome table with archetype names resolved
#[derive(Debug, Clone, Default)]
pub struct SpawnTable {
    entries: Vec<(Biome, Archetype, u32)>,
}

impl SpawnTable {
    /// Resolve configured names. Unknown names and zero weights are
    /// reported and dropped; they never stop the rest of the table.
    pub fn from_entries(entries: &[SpawnEntry]) -> Self {
        let mut resolved = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.weight == 0 {
                continue;
            }
            match entry.archetype.parse::<Archetype>() {
                Ok(archetype) => resolved.push((entry.biome, archetype, entry.weight)),
                Err(err) => {
                    tracing::warn!(biome = ?entry.biome, %err, "skipping spawn table entry");
                }
            }
        }
        Self { entries: resolved }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Weighted pick among the biome's archetypes of one classification
    pub fn pick(
        &self,
        biome: Biome,
        classification: Classification,
        rng: &mut SimRng,
    ) -> Option<Archetype> {
        let candidates: Vec<(Archetype, u32)> = self
            .entries
            .iter()
            .filter(|(b, a, _)| *b == biome && a.profile().classification == classification)
            .map(|(_, a, w)| (*a, *w))
            .collect();
        let total: u32 = candidates.iter().map(|(_, w)| w).sum();
        if total == 0 {
            return None;
        }
        let roll = rng.gen_range(0..total);
        let mut accumulated = 0;
        for (archetype, weight) in candidates {
            accumulated += weight;
            if roll < accumulated {
                return Some(archetype);
            }
        }
        None
    }
}

/// Live actor counts per classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulationCounts {
    pub passive: u32,
    pub neutral: u32,
    pub hostile: u32,
}

impl PopulationCounts {
    pub fn from_classes(classes: impl IntoIterator<Item = Classification>) -> Self {
        let mut counts = Self::default();
        for class in classes {
            counts.add(class);
        }
        counts
    }

    pub fn get(&self, class: Classification) -> u32 {
        match class {
            Classification::Passive => self.passive,
            Classification::Neutral => self.neutral,
            Classification::Hostile => self.hostile,
        }
    }

    pub fn add(&mut self, class: Classification) {
        match class {
            Classification::Passive => self.passive += 1,
            Classification::Neutral => self.neutral += 1,
            Classification::Hostile => self.hostile += 1,
        }
    }
}

/// Uniform-area point in the horizontal ring around `center`
pub fn sample_annulus(center: Vec3, min_radius: f32, max_radius: f32, rng: &mut SimRng) -> Vec3 {
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let (lo, hi) = (min_radius * min_radius, max_radius * max_radius);
    let radius = if hi > lo {
        rng.gen_range(lo..hi).sqrt()
    } else {
        min_radius
    };
    Vec3::new(
        center.x + radius * angle.cos(),
        center.y,
        center.z + radius * angle.sin(),
    )
}

/// Move a sampled point to where the habitat would actually stand
pub fn settle(world: &dyn GameWorld, point: Vec3, habitat: Habitat) -> Vec3 {
    let ground = world.surface_y(point);
    let y = match habitat {
        Habitat::Ground => ground,
        Habitat::Water => ground + 0.5,
        Habitat::Air => ground + 3.0,
    };
    Vec3::new(point.x, y, point.z)
}

/// Whether an actor of the habitat fits at `pos`
pub fn location_ok(world: &dyn GameWorld, pos: Vec3, habitat: Habitat) -> bool {
    let head = pos + Vec3::Y;
    match habitat {
        Habitat::Ground => {
            !world.is_solid_at(pos)
                && !world.is_solid_at(head)
                && !world.is_water_at(pos)
                && world.is_solid_at(pos - Vec3::new(0.0, 0.5, 0.0))
        }
        Habitat::Water => world.is_water_at(pos),
        Habitat::Air => {
            !world.is_solid_at(pos) && !world.is_solid_at(head) && !world.is_water_at(pos)
        }
    }
}

/// One pass of organic spawning
pub struct SpawnPolicy<'a> {
    pub config: &'a SpawnConfig,
    pub table: &'a SpawnTable,
}

impl SpawnPolicy<'_> {
    /// Plan spawns for every connected player and every classification
    /// still under its cap. Returns archetypes with their positions.
    pub fn run(
        &self,
        world: &dyn GameWorld,
        players: &Players,
        current: PopulationCounts,
        rng: &mut SimRng,
    ) -> Vec<(Archetype, Vec3)> {
        let mut counts = current;
        let mut planned = Vec::new();
        let caps = self.config.caps;
        let night = !world.is_daytime();

        for player in players.iter() {
            for class in Classification::all() {
                let cap = match class {
                    Classification::Passive => caps.passive,
                    Classification::Neutral => caps.neutral,
                    Classification::Hostile => caps.hostile,
                };
                for _ in 0..self.config.attempts_per_player {
                    if counts.get(class) >= cap {
                        break;
                    }
                    if class == Classification::Hostile {
                        let chance = if night {
                            self.config.hostile_chance_night
                        } else {
                            self.config.hostile_chance_day
                        };
                        if rng.gen::<f32>() >= chance {
                            continue;
                        }
                    }
                    let sample = sample_annulus(
                        player.position,
                        self.config.min_radius,
                        self.config.max_radius,
                        rng,
                    );
                    let biome = world.biome_at(sample.x.floor() as i32, sample.z.floor() as i32);
                    let Some(archetype) = self.table.pick(biome, class, rng) else {
                        continue;
                    };
                    let pos = settle(world, sample, archetype.habitat());
                    let crowding = players
                        .positions()
                        .any(|p| distance(p, pos) < self.config.min_radius);
                    if crowding || !location_ok(world, pos, archetype.habitat()) {
                        continue;
                    }
                    counts.add(class);
                    planned.push((archetype, pos));
                }
            }
        }
        planned
    }
}

/// Accumulate out-of-range time. The timer only runs while every player
/// is beyond the radius (or none are connected) and is never reset by a
/// player coming back. Returns whether the timeout has been reached.
pub fn update_despawn_timer(
    state: &mut DespawnState,
    position: Vec3,
    players: &Players,
    config: &DespawnConfig,
    dt: f32,
) -> bool {
    if !state.eligible {
        return false;
    }
    let out_of_range = match players.min_distance(position) {
        Some(nearest) => nearest > config.radius,
        None => true,
    };
    if out_of_range && dt.is_finite() && dt > 0.0 {
        state.out_of_range_secs += dt;
    }
    state.out_of_range_secs >= config.timeout_secs
}
