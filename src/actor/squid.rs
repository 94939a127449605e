//! Squid: aimless swimming, suffocates on land.

use serde::{Deserialize, Serialize};

use super::common;
use super::motion::{in_water, integrate, stop};
use super::{
    Actor, ActorCore, ActorEvent, ActorRecord, ArchetypeState, DamageSource, Hazard, Locomotion,
    TickContext,
};
use crate::constants::SUFFOCATION_DAMAGE_PER_SEC;
use crate::world::{Particle, Sound};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SquidState {
    pub out_of_water_secs: f32,
}

#[derive(Debug)]
pub struct Squid {
    core: ActorCore,
    state: SquidState,
}

impl Squid {
    pub fn new(core: ActorCore) -> Self {
        Self {
            core,
            state: SquidState::default(),
        }
    }

    pub fn restore(core: ActorCore, state: SquidState) -> Self {
        Self { core, state }
    }
}

impl Actor for Squid {
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
        common::grow(&mut self.core, ctx.dt);
        profile.aggro.expire(&mut self.core, ctx);

        if !in_water(&self.core, &*ctx.world) {
            self.state.out_of_water_secs += ctx.dt;
            stop(&mut self.core);
            self.core.go_idle();
            self.take_damage(
                SUFFOCATION_DAMAGE_PER_SEC * ctx.dt,
                DamageSource::Environment(Hazard::Suffocation),
            );
            integrate(&mut self.core, ctx, profile.habitat);
            return None;
        }
        self.state.out_of_water_secs = 0.0;

        match self.core.locomotion {
            Locomotion::Flee { threat, .. } => {
                // ink cloud on the first stroke away
                if ctx.resolve(threat).is_some() && self.core.velocity.length_squared() < 0.01 {
                    ctx.world.spawn_particle(Particle::Splash, self.core.position);
                    ctx.world.play_sound(Sound::Splash, self.core.position);
                }
                common::flee(&mut self.core, ctx, profile.speed);
            }
            Locomotion::Special { .. } | Locomotion::Follow { .. } => self.core.go_idle(),
            _ => common::wander(&mut self.core, ctx, profile.speed, profile.habitat),
        }

        integrate(&mut self.core, ctx, profile.habitat);
        None
    }

    fn serialize(&self) -> ActorRecord {
        ActorRecord {
            core: self.core.clone(),
            state: ArchetypeState::Squid(self.state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorView, Archetype};
    use crate::ids::ActorId;
    use crate::player::Players;
    use crate::seed::SimSeed;
    use crate::world::{SandboxWorld, WaterRegion};
    use bevy::math::Vec3;

    fn lake() -> SandboxWorld {
        SandboxWorld::flat(64).with_water(WaterRegion {
            min_x: -30,
            max_x: 30,
            min_z: -30,
            max_z: 30,
            floor_y: 56,
            surface_y: 64,
        })
    }

    fn step(squid: &mut Squid, world: &mut SandboxWorld, ticks: usize) {
        let players = Players::new();
        let view = ActorView::default();
        let mut rng = SimSeed::new(9).rng("squid");
        for _ in 0..ticks {
            let mut ctx = TickContext {
                world: &mut *world,
                players: &players,
                actors: &view,
                dt: 0.05,
                rng: &mut rng,
                floor_y: -64.0,
            };
            squid.advance(&mut ctx);
        }
    }

    #[test]
    fn test_squid_stays_healthy_in_water() {
        let mut world = lake();
        let mut squid = Squid::new(ActorCore::new(
            ActorId(1),
            Archetype::Squid,
            Vec3::new(0.5, 60.0, 0.5),
        ));
        step(&mut squid, &mut world, 100);
        assert_eq!(squid.core().health, squid.core().max_health);
    }

    #[test]
    fn test_squid_suffocates_on_land() {
        let mut world = lake();
        let mut squid = Squid::new(ActorCore::new(
            ActorId(1),
            Archetype::Squid,
            Vec3::new(40.5, 64.0, 40.5),
        ));
        step(&mut squid, &mut world, 40);
        assert!(squid.core().health < squid.core().max_health);
        assert!(squid.state.out_of_water_secs > 1.9);
    }
}
