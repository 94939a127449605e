//! Ranged attackers: skeletons kite and shoot arrows, blazes hover, wind
//! up and lob fireballs.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use super::common;
use super::motion::{aim, integrate, steer_away, steer_toward, stop, sunlight_burn};
use super::{
    Actor, ActorCore, ActorEvent, ActorRecord, Archetype, ArchetypeState, DamageSource, Hazard,
    Locomotion, SpecialAction, TargetRef, TickContext,
};
use crate::constants::{PROJECTILE_GRAVITY, SUNLIGHT_DAMAGE_PER_SEC};
use crate::item::{ItemKind, ItemStack};
use crate::math::distance;
use crate::projectile::ProjectileKind;
use crate::world::{Particle, Sound};

/// Per-archetype shooting parameters
#[derive(Debug, Clone, Copy)]
struct Volley {
    kind: ProjectileKind,
    speed: f32,
    damage: f32,
    cooldown_secs: f32,
    min_range: f32,
    max_range: f32,
    charge_secs: f32,
}

const SKELETON_VOLLEY: Volley = Volley {
    kind: ProjectileKind::Arrow,
    speed: 24.0,
    damage: 3.0,
    cooldown_secs: 2.0,
    min_range: 4.0,
    max_range: 10.0,
    charge_secs: 0.0,
};

const BLAZE_VOLLEY: Volley = Volley {
    kind: ProjectileKind::Fireball,
    speed: 14.0,
    damage: 5.0,
    cooldown_secs: 3.0,
    min_range: 3.0,
    max_range: 16.0,
    charge_secs: 1.0,
};

const HOVER_HEIGHT: f32 = 3.0;
const BARE_HANDED_DAMAGE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RangedState {
    pub held: Option<ItemStack>,
    pub shot_cooldown_secs: f32,
    pub attack_cooldown_secs: f32,
    /// Who the wind-up is aimed at while locomotion is `Special::Charge`
    pub charge_target: Option<TargetRef>,
}

#[derive(Debug)]
pub struct RangedAttacker {
    core: ActorCore,
    state: RangedState,
}

impl RangedAttacker {
    pub fn new(core: ActorCore) -> Self {
        let held = match core.archetype {
            Archetype::Skeleton => Some(ItemStack::one(ItemKind::Bow)),
            _ => None,
        };
        Self {
            core,
            state: RangedState {
                held,
                ..Default::default()
            },
        }
    }

    pub fn restore(core: ActorCore, state: RangedState) -> Self {
        Self { core, state }
    }

    fn volley(&self) -> Volley {
        match self.core.archetype {
            Archetype::Blaze => BLAZE_VOLLEY,
            _ => SKELETON_VOLLEY,
        }
    }

    /// Skeletons need a bow; blazes shoot bare-handed
    fn can_shoot(&self) -> bool {
        match self.core.archetype {
            Archetype::Skeleton => self.state.held.is_some_and(|s| s.is(ItemKind::Bow)),
            _ => true,
        }
    }

    fn shoot(&mut self, target_pos: Vec3, ctx: &mut TickContext<'_>) -> ActorEvent {
        let volley = self.volley();
        self.state.shot_cooldown_secs = volley.cooldown_secs;
        let origin = self.core.position + Vec3::new(0.0, 1.5, 0.0);
        let gravity = PROJECTILE_GRAVITY * volley.kind.gravity_scale();
        let velocity = aim(origin, target_pos + Vec3::new(0.0, 0.9, 0.0), volley.speed, gravity);
        ctx.world.play_sound(Sound::Shoot, origin);
        ActorEvent::LaunchProjectile {
            kind: volley.kind,
            origin,
            velocity,
            damage: volley.damage,
        }
    }

    fn hover(&mut self, ctx: &TickContext<'_>) {
        let want = ctx.world.ground_y(self.core.position) + HOVER_HEIGHT;
        self.core.velocity.y = (want - self.core.position.y).clamp(-1.5, 1.5);
    }

    fn engage(
        &mut self,
        target: TargetRef,
        target_pos: Vec3,
        ctx: &mut TickContext<'_>,
    ) -> Option<ActorEvent> {
        let profile = self.core.archetype.profile();
        let volley = self.volley();
        let dist = distance(self.core.position, target_pos);

        if dist < volley.min_range {
            steer_away(&mut self.core, target_pos, profile.speed);
        } else if dist > volley.max_range {
            steer_toward(&mut self.core, target_pos, profile.speed);
        } else {
            stop(&mut self.core);
        }

        if !self.can_shoot() {
            steer_toward(&mut self.core, target_pos, profile.speed);
            return common::melee(
                &self.core,
                ctx,
                &mut self.state.attack_cooldown_secs,
                BARE_HANDED_DAMAGE,
            );
        }
        if self.state.shot_cooldown_secs > 0.0 || dist > volley.max_range + 6.0 {
            return None;
        }
        if volley.charge_secs > 0.0 {
            stop(&mut self.core);
            self.state.charge_target = Some(target);
            self.core.locomotion = Locomotion::Special {
                action: SpecialAction::Charge,
                remaining_secs: volley.charge_secs,
            };
            ctx.world.spawn_particle(Particle::Flame, self.core.position + Vec3::Y);
            return None;
        }
        Some(self.shoot(target_pos, ctx))
    }
}

impl Actor for RangedAttacker {
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
        common::tick_timer(&mut self.state.shot_cooldown_secs, dt);
        common::tick_timer(&mut self.state.attack_cooldown_secs, dt);

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

        profile.aggro.expire(&mut self.core, ctx);
        profile.aggro.try_acquire(&mut self.core, ctx);

        let mut event = None;
        match self.core.locomotion {
            Locomotion::Special {
                action: SpecialAction::Charge,
                remaining_secs,
            } => {
                stop(&mut self.core);
                let remaining = remaining_secs - dt;
                if remaining > 0.0 {
                    self.core.locomotion = Locomotion::Special {
                        action: SpecialAction::Charge,
                        remaining_secs: remaining,
                    };
                } else {
                    let target = self.state.charge_target.take();
                    match target.and_then(|t| ctx.resolve(t).map(|pos| (t, pos))) {
                        Some((target, pos)) => {
                            event = Some(self.shoot(pos, ctx));
                            self.core.locomotion = Locomotion::Follow { target };
                        }
                        None => self.core.go_idle(),
                    }
                }
            }
            Locomotion::Special { .. } | Locomotion::Flee { .. } => self.core.go_idle(),
            Locomotion::Follow { target } => {
                if let Some(pos) = ctx.resolve(target) {
                    event = self.engage(target, pos, ctx);
                }
            }
            Locomotion::Idle | Locomotion::Wander { .. } => {
                common::wander(&mut self.core, ctx, profile.speed * 0.5, profile.habitat)
            }
        }

        if self.core.archetype == Archetype::Blaze {
            self.hover(ctx);
        }
        integrate(&mut self.core, ctx, profile.habitat);
        event
    }

    fn serialize(&self) -> ActorRecord {
        ActorRecord {
            core: self.core.clone(),
            state: ArchetypeState::Ranged(self.state),
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
        if stack.count == 0 || self.core.archetype == Archetype::Blaze {
            return false;
        }
        self.state.held = Some(ItemStack::one(stack.kind));
        true
    }

    fn held_item(&self) -> Option<ItemStack> {
        self.state.held
    }
}
