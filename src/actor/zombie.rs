//! Zombie and its drowned variant.
//!
//! Both hunt players, call nearby kin when they find one, and swing in
//! melee. Zombies burn in daylight and turn into drowned after staying
//! under water; drowned holding a trident throw it instead of closing in.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use super::common;
use super::motion::{aim, integrate, sunlight_burn};
use super::{
    Actor, ActorCore, ActorEvent, ActorRecord, Archetype, ArchetypeState, DamageSource, Hazard,
    Locomotion, TickContext,
};
use crate::constants::{PROJECTILE_GRAVITY, SUNLIGHT_DAMAGE_PER_SEC};
use crate::item::{ItemKind, ItemStack};
use crate::math::distance;
use crate::projectile::ProjectileKind;
use crate::world::{Particle, Sound};

const PUNCH_DAMAGE: f32 = 3.0;
const SWORD_BONUS: f32 = 2.0;
const CONVERT_AFTER_SECS: f32 = 15.0;
const THROW_MIN_RANGE: f32 = 4.0;
const THROW_MAX_RANGE: f32 = 12.0;
const THROW_COOLDOWN_SECS: f32 = 3.0;
const THROW_SPEED: f32 = 20.0;
const TRIDENT_DAMAGE: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ZombieState {
    pub held: Option<ItemStack>,
    pub attack_cooldown_secs: f32,
    pub throw_cooldown_secs: f32,
    pub submerged_secs: f32,
}

#[derive(Debug)]
pub struct Zombie {
    core: ActorCore,
    state: ZombieState,
}

impl Zombie {
    pub fn new(core: ActorCore) -> Self {
        Self {
            core,
            state: ZombieState::default(),
        }
    }

    pub fn restore(core: ActorCore, state: ZombieState) -> Self {
        Self { core, state }
    }

    pub fn submerged_secs(&self) -> f32 {
        self.state.submerged_secs
    }

    fn melee_damage(&self) -> f32 {
        match self.state.held {
            Some(stack) if stack.is(ItemKind::IronSword) => PUNCH_DAMAGE + SWORD_BONUS,
            _ => PUNCH_DAMAGE,
        }
    }

    fn has_trident(&self) -> bool {
        self.state.held.is_some_and(|s| s.is(ItemKind::Trident))
    }

    fn try_throw(&mut self, target_pos: Vec3, ctx: &mut TickContext<'_>) -> Option<ActorEvent> {
        if self.core.archetype != Archetype::Drowned
            || !self.has_trident()
            || self.state.throw_cooldown_secs > 0.0
        {
            return None;
        }
        let dist = distance(self.core.position, target_pos);
        if !(THROW_MIN_RANGE..=THROW_MAX_RANGE).contains(&dist) {
            return None;
        }
        self.state.throw_cooldown_secs = THROW_COOLDOWN_SECS;
        let origin = self.core.position + Vec3::new(0.0, 1.5, 0.0);
        let gravity = PROJECTILE_GRAVITY * ProjectileKind::Trident.gravity_scale();
        let velocity = aim(origin, target_pos + Vec3::new(0.0, 0.9, 0.0), THROW_SPEED, gravity);
        ctx.world.play_sound(Sound::Shoot, origin);
        Some(ActorEvent::LaunchProjectile {
            kind: ProjectileKind::Trident,
            origin,
            velocity,
            damage: TRIDENT_DAMAGE,
        })
    }
}

impl Actor for Zombie {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn advance(&mut self, ctx: &mut TickContext<'_>) -> Option<ActorEvent> {
        if common::skip_tick(&self.core, ctx) {
            return None;
        }
        let profile = self.core.archetype.profile();
        let dt = ctx.dt;
        common::grow(&mut self.core, dt);
        common::tick_timer(&mut self.state.attack_cooldown_secs, dt);
        common::tick_timer(&mut self.state.throw_cooldown_secs, dt);

        if self.core.archetype.burns_in_daylight() && sunlight_burn(&self.core, &*ctx.world) {
            ctx.world.spawn_particle(Particle::Flame, self.core.position + Vec3::Y);
            self.take_damage(
                SUNLIGHT_DAMAGE_PER_SEC * dt,
                DamageSource::Environment(Hazard::Sunlight),
            );
            if self.core.dead {
                return None;
            }
        }

        if self.core.archetype == Archetype::Zombie {
            let head = self.core.position + Vec3::new(0.0, 1.6, 0.0);
            if ctx.world.is_water_at(head) {
                self.state.submerged_secs += dt;
                if self.state.submerged_secs >= CONVERT_AFTER_SECS {
                    self.state.submerged_secs = 0.0;
                    return Some(ActorEvent::Convert {
                        into: Archetype::Drowned,
                    });
                }
            } else {
                self.state.submerged_secs = 0.0;
            }
        }

        profile.aggro.expire(&mut self.core, ctx);
        let mut event = None;
        if profile.aggro.try_acquire(&mut self.core, ctx) {
            event = self.core.target().map(|target| ActorEvent::AlertAllies { target });
        }

        match self.core.locomotion {
            Locomotion::Follow { .. } => {
                if let Some(target_pos) =
                    common::chase(&mut self.core, ctx, profile.speed, 1.0, profile.habitat)
                {
                    if event.is_none() {
                        event = self.try_throw(target_pos, ctx);
                    }
                    if event.is_none() {
                        let damage = self.melee_damage();
                        event = common::melee(
                            &self.core,
                            ctx,
                            &mut self.state.attack_cooldown_secs,
                            damage,
                        );
                    }
                }
            }
            Locomotion::Flee { .. } | Locomotion::Special { .. } => self.core.go_idle(),
            Locomotion::Idle | Locomotion::Wander { .. } => {
                common::wander(&mut self.core, ctx, profile.speed * 0.5, profile.habitat)
            }
        }

        integrate(&mut self.core, ctx, profile.habitat);
        event
    }

    fn serialize(&self) -> ActorRecord {
        ActorRecord {
            core: self.core.clone(),
            state: ArchetypeState::Zombie(self.state),
        }
    }

    fn drops(&self) -> Vec<ItemStack> {
        if self.core.baby {
            return Vec::new();
        }
        let mut drops: Vec<ItemStack> = self
            .core
            .archetype
            .profile()
            .base_drops
            .iter()
            .map(|(kind, count)| ItemStack::new(*kind, *count))
            .collect();
        drops.extend(self.state.held);
        drops
    }

    fn equip(&mut self, stack: ItemStack) -> bool {
        if stack.count == 0 {
            return false;
        }
        self.state.held = Some(ItemStack::one(stack.kind));
        true
    }

    fn held_item(&self) -> Option<ItemStack> {
        self.state.held
    }
}
