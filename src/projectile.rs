//! Projectile subsystem.
//!
//! Projectiles are plain ballistic records owned by the manager, not by
//! whoever fired them. Each step integrates drag and gravity, tests the
//! swept segment against terrain (for kinds that care) and every living
//! player and actor except the shooter, then ages the record out.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::actor::{Actor, DamageSource, TargetRef};
use crate::config::ProjectileConfig;
use crate::ids::{ActorId, ProjectileId};
use crate::math::{clamp_speed, is_finite, sanitize, segment_point_distance};
use crate::player::Players;
use crate::world::{GameWorld, Particle, Sound};

/// Height of a body's hit center above its feet
const BODY_CENTER: f32 = 0.9;
/// Terrain sampling step along a swept segment (blocks)
const TERRAIN_STEP: f32 = 0.25;
/// Most terrain samples taken for one segment
const MAX_TERRAIN_SAMPLES: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    Arrow,
    Trident,
    Fireball,
}

impl ProjectileKind {
    /// Fraction of configured gravity this kind feels
    pub fn gravity_scale(&self) -> f32 {
        match self {
            Self::Arrow => 1.0,
            Self::Trident => 0.8,
            Self::Fireball => 0.0,
        }
    }

    /// Whether solid blocks stop this kind
    pub fn blocked_by_terrain(&self) -> bool {
        match self {
            Self::Arrow | Self::Trident => true,
            Self::Fireball => false,
        }
    }

    pub fn ttl_secs(&self, default_ttl: f32) -> f32 {
        match self {
            Self::Arrow | Self::Trident => default_ttl,
            Self::Fireball => default_ttl * 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: ProjectileId,
    pub kind: ProjectileKind,
    pub position: Vec3,
    pub velocity: Vec3,
    pub damage: f32,
    pub shooter: Option<TargetRef>,
    pub age_secs: f32,
    pub ttl_secs: f32,
}

impl Projectile {
    /// Build a projectile, clamping bad input: non-finite vectors are
    /// zeroed, speed is capped at `config.max_speed` and an origin inside a
    /// solid block is lifted onto it.
    #[allow(clippy::too_many_arguments)]
    pub fn launch(
        id: ProjectileId,
        kind: ProjectileKind,
        origin: Vec3,
        velocity: Vec3,
        damage: f32,
        shooter: Option<TargetRef>,
        world: &dyn GameWorld,
        config: &ProjectileConfig,
    ) -> Self {
        let mut position = sanitize(origin, Vec3::ZERO);
        if world.is_solid_at(position) {
            position.y = world.surface_y(position) + 0.1;
        }
        let damage = if damage.is_finite() { damage.max(0.0) } else { 0.0 };
        Self {
            id,
            kind,
            position,
            velocity: clamp_speed(velocity, config.max_speed),
            damage,
            shooter,
            age_secs: 0.0,
            ttl_secs: kind.ttl_secs(config.default_ttl_secs),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.age_secs >= self.ttl_secs
    }
}

/// A projectile striking a victim
#[derive(Debug, Clone, PartialEq)]
pub struct Impact {
    pub projectile: ProjectileId,
    pub kind: ProjectileKind,
    pub victim: TargetRef,
    pub shooter: Option<TargetRef>,
    pub damage: f32,
}

#[derive(Debug, Default)]
pub struct ProjectileReport {
    pub removed: Vec<ProjectileId>,
    pub impacts: Vec<Impact>,
    pub blocked: usize,
    pub expired: usize,
}

/// Earliest point along the segment where a solid block is entered
fn terrain_hit(world: &dyn GameWorld, from: Vec3, to: Vec3) -> Option<f32> {
    let length = from.distance(to);
    let steps = ((length / TERRAIN_STEP).ceil() as usize).clamp(1, MAX_TERRAIN_SAMPLES);
    (1..=steps)
        .map(|i| i as f32 / steps as f32)
        .find(|t| world.is_solid_at(from.lerp(to, *t)))
}

/// Nearest-along-path victim within the hit radius, excluding the shooter
fn first_victim(
    projectile: &Projectile,
    from: Vec3,
    to: Vec3,
    hit_radius: f32,
    actors: &BTreeMap<ActorId, Box<dyn Actor>>,
    players: &Players,
) -> Option<(TargetRef, f32)> {
    let player_hits = players
        .iter()
        .filter(|p| p.is_alive())
        .map(|p| (TargetRef::Player(p.id), p.position));
    let actor_hits = actors
        .values()
        .filter(|a| !a.core().dead)
        .map(|a| (TargetRef::Actor(a.id()), a.core().position));

    player_hits
        .chain(actor_hits)
        .filter(|(victim, _)| Some(*victim) != projectile.shooter)
        .filter_map(|(victim, feet)| {
            let center = feet + Vec3::new(0.0, BODY_CENTER, 0.0);
            let (dist, t) = segment_point_distance(from, to, center);
            (dist <= hit_radius).then_some((victim, t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Advance every projectile one step and resolve collisions
pub fn step_projectiles(
    projectiles: &mut BTreeMap<ProjectileId, Projectile>,
    actors: &mut BTreeMap<ActorId, Box<dyn Actor>>,
    players: &mut Players,
    world: &mut dyn GameWorld,
    config: &ProjectileConfig,
    dt: f32,
) -> ProjectileReport {
    let mut report = ProjectileReport::default();
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

    for projectile in projectiles.values_mut() {
        let from = projectile.position;
        let mut velocity = projectile.velocity * (1.0 - config.drag * dt).max(0.0);
        velocity.y -= config.gravity * projectile.kind.gravity_scale() * dt;
        let to = sanitize(from + velocity * dt, from);

        let block_t = if projectile.kind.blocked_by_terrain() {
            terrain_hit(&*world, from, to)
        } else {
            None
        };
        let victim = first_victim(projectile, from, to, config.hit_radius, actors, players)
            .filter(|(_, t)| block_t.map_or(true, |bt| *t < bt));

        projectile.velocity = if is_finite(velocity) { velocity } else { Vec3::ZERO };

        if let Some((victim, t)) = victim {
            projectile.position = from.lerp(to, t);
            let applied = match victim {
                TargetRef::Player(id) => players
                    .get_mut(id)
                    .map(|p| p.damage(projectile.damage))
                    .unwrap_or(0.0),
                TargetRef::Actor(id) => actors
                    .get_mut(&id)
                    .map(|a| {
                        a.take_damage(
                            projectile.damage,
                            DamageSource::Projectile {
                                shooter: projectile.shooter,
                            },
                        )
                    })
                    .unwrap_or(0.0),
            };
            world.play_sound(Sound::Hurt, projectile.position);
            if projectile.kind == ProjectileKind::Fireball {
                world.spawn_particle(Particle::Flame, projectile.position);
            }
            tracing::debug!(
                projectile = %projectile.id,
                ?victim,
                damage = applied,
                "projectile hit"
            );
            report.impacts.push(Impact {
                projectile: projectile.id,
                kind: projectile.kind,
                victim,
                shooter: projectile.shooter,
                damage: applied,
            });
            report.removed.push(projectile.id);
            continue;
        }

        if let Some(t) = block_t {
            projectile.position = from.lerp(to, t);
            world.spawn_particle(Particle::Crit, projectile.position);
            report.blocked += 1;
            report.removed.push(projectile.id);
            continue;
        }

        projectile.position = to;
        projectile.age_secs += dt;
        if projectile.is_expired() {
            report.expired += 1;
            report.removed.push(projectile.id);
        }
    }

    for id in &report.removed {
        projectiles.remove(id);
    }
    report
}
