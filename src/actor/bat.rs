//! Bat: flits between random points a few blocks above the terrain.

use bevy::math::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::common;
use super::motion::{integrate, steer_away};
use super::{Actor, ActorCore, ActorEvent, ActorRecord, ArchetypeState, Locomotion, TickContext};

const MIN_ALTITUDE: f32 = 2.0;
const RETARGET_MIN_SECS: f32 = 0.5;
const RETARGET_MAX_SECS: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BatState {
    pub retarget_secs: f32,
}

#[derive(Debug)]
pub struct Bat {
    core: ActorCore,
    state: BatState,
}

impl Bat {
    pub fn new(core: ActorCore) -> Self {
        Self {
            core,
            state: BatState::default(),
        }
    }

    pub fn restore(core: ActorCore, state: BatState) -> Self {
        Self { core, state }
    }

    /// Push back up when sagging toward the ground
    fn hold_altitude(&mut self, ctx: &TickContext<'_>) {
        let ground = ctx.world.ground_y(self.core.position);
        if self.core.position.y < ground + MIN_ALTITUDE {
            self.core.velocity.y = self.core.velocity.y.max(1.0);
        }
    }
}

impl Actor for Bat {
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
        common::tick_timer(&mut self.state.retarget_secs, ctx.dt);

        match self.core.locomotion {
            Locomotion::Flee { threat, .. } => {
                if let Some(pos) = ctx.resolve(threat) {
                    steer_away(&mut self.core, pos, profile.speed);
                    self.core.velocity.y = 0.0;
                }
            }
            Locomotion::Follow { .. } | Locomotion::Special { .. } => self.core.go_idle(),
            Locomotion::Idle | Locomotion::Wander { .. } => {
                if self.state.retarget_secs <= 0.0 {
                    let destination =
                        common::pick_destination(&self.core, ctx, 6.0, profile.habitat);
                    self.core.locomotion = Locomotion::Wander { destination };
                    self.state.retarget_secs =
                        ctx.rng.gen_range(RETARGET_MIN_SECS..RETARGET_MAX_SECS);
                }
                if let Locomotion::Wander { destination } = self.core.locomotion {
                    common::move_to(&mut self.core, destination, profile.speed, profile.habitat);
                    if self.core.position.distance(destination) < 0.5 {
                        self.core.velocity = Vec3::ZERO;
                        self.core.go_idle();
                    }
                }
            }
        }

        self.hold_altitude(ctx);
        integrate(&mut self.core, ctx, profile.habitat);
        None
    }

    fn serialize(&self) -> ActorRecord {
        ActorRecord {
            core: self.core.clone(),
            state: ArchetypeState::Bat(self.state),
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
    use crate::world::SandboxWorld;

    #[test]
    fn test_bat_stays_airborne() {
        let mut world = SandboxWorld::flat(64);
        let mut bat = Bat::new(ActorCore::new(
            ActorId(1),
            Archetype::Bat,
            Vec3::new(0.5, 68.0, 0.5),
        ));
        let players = Players::new();
        let view = ActorView::default();
        let mut rng = SimSeed::new(11).rng("bat");
        for _ in 0..200 {
            let mut ctx = TickContext {
                world: &mut world,
                players: &players,
                actors: &view,
                dt: 0.05,
                rng: &mut rng,
                floor_y: -64.0,
            };
            bat.advance(&mut ctx);
        }
        assert!(bat.core().position.y >= 64.0);
        assert!(bat.core().position.y < 80.0);
        assert!(bat.drops().is_empty());
    }
}
