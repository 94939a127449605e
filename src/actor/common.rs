//! Behaviour building blocks reused across archetypes: wandering, food
//! temptation, fleeing, melee reach, breeding and growth.

use bevy::math::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::motion::{steer_away, steer_toward, steer_toward_3d, stop};
use super::{ActorCore, ActorEvent, Habitat, Locomotion, TargetRef, TickContext};
use crate::constants::*;
use crate::item::ItemKind;
use crate::math::{distance, horizontal_distance};

/// Nothing to do for dead actors or empty steps
pub fn skip_tick(core: &ActorCore, ctx: &TickContext<'_>) -> bool {
    core.dead || ctx.dt <= 0.0 || !ctx.dt.is_finite()
}

/// Random destination within `radius` of the actor, placed for its habitat
pub fn pick_destination(
    core: &ActorCore,
    ctx: &mut TickContext<'_>,
    radius: f32,
    habitat: Habitat,
) -> Vec3 {
    let angle = ctx.rng.gen_range(0.0..std::f32::consts::TAU);
    let dist = ctx.rng.gen_range(1.0..radius.max(1.5));
    let mut dest = Vec3::new(
        core.position.x + dist * angle.cos(),
        core.position.y,
        core.position.z + dist * angle.sin(),
    );
    let ground = ctx.world.ground_y(dest);
    dest.y = match habitat {
        Habitat::Ground => ground,
        Habitat::Water => core.position.y + ctx.rng.gen_range(-1.5..1.5),
        Habitat::Air => ground + ctx.rng.gen_range(2.0..6.0),
    };
    dest
}

/// Idle actors occasionally pick a destination; wandering actors walk to
/// it and go idle on arrival.
pub fn wander(core: &mut ActorCore, ctx: &mut TickContext<'_>, speed: f32, habitat: Habitat) {
    match core.locomotion {
        Locomotion::Idle => {
            stop(core);
            if ctx.rng.gen::<f32>() < WANDER_CHANCE_PER_SEC * ctx.dt {
                let destination = pick_destination(core, ctx, WANDER_RADIUS, habitat);
                core.locomotion = Locomotion::Wander { destination };
            }
        }
        Locomotion::Wander { destination } => {
            let arrived = match habitat {
                Habitat::Ground => horizontal_distance(core.position, destination) < 0.5,
                Habitat::Water | Habitat::Air => distance(core.position, destination) < 0.5,
            };
            if arrived {
                stop(core);
                if habitat != Habitat::Ground {
                    core.velocity = Vec3::ZERO;
                }
                core.go_idle();
            } else {
                move_to(core, destination, speed, habitat);
            }
        }
        _ => {}
    }
}

pub fn move_to(core: &mut ActorCore, destination: Vec3, speed: f32, habitat: Habitat) {
    match habitat {
        Habitat::Ground => steer_toward(core, destination, speed),
        Habitat::Water | Habitat::Air => steer_toward_3d(core, destination, speed),
    }
}

/// Run from the current threat, if any
pub fn flee(core: &mut ActorCore, ctx: &TickContext<'_>, speed: f32) {
    if let Locomotion::Flee { threat, .. } = core.locomotion {
        if let Some(pos) = ctx.resolve(threat) {
            steer_away(core, pos, speed * FLEE_SPEED_FACTOR);
        }
    }
}

/// Follow the current target until within `stop_distance`
pub fn chase(
    core: &mut ActorCore,
    ctx: &TickContext<'_>,
    speed: f32,
    stop_distance: f32,
    habitat: Habitat,
) -> Option<Vec3> {
    let target = match core.locomotion {
        Locomotion::Follow { target } => target,
        _ => return None,
    };
    let pos = ctx.resolve(target)?;
    if distance(core.position, pos) > stop_distance {
        move_to(core, pos, speed, habitat);
    } else {
        stop(core);
    }
    Some(pos)
}

/// Passive mobs trail a nearby player holding their food. Returns whether
/// the actor is being tempted this tick.
pub fn tempt(core: &mut ActorCore, ctx: &TickContext<'_>, food: ItemKind, speed: f32) -> bool {
    if let Locomotion::Follow {
        target: TargetRef::Player(id),
    } = core.locomotion
    {
        let still_tempting = ctx
            .players
            .get(id)
            .filter(|p| p.is_alive() && p.holds(food))
            .is_some_and(|p| distance(p.position, core.position) <= TEMPT_RANGE);
        if !still_tempting {
            stop(core);
            core.go_idle();
            return false;
        }
    } else if core.locomotion.is_free() {
        let tempter = ctx
            .players
            .iter()
            .filter(|p| p.is_alive() && p.holds(food))
            .map(|p| (p.id, distance(p.position, core.position)))
            .filter(|(_, d)| *d <= TEMPT_RANGE)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        match tempter {
            Some((id, _)) => {
                core.locomotion = Locomotion::Follow {
                    target: TargetRef::Player(id),
                };
            }
            None => return false,
        }
    } else {
        return false;
    }
    chase(core, ctx, speed, 2.0, Habitat::Ground);
    true
}

/// Swing at the target when it is in reach and the swing timer is ready
pub fn melee(
    core: &ActorCore,
    ctx: &TickContext<'_>,
    cooldown: &mut f32,
    damage: f32,
) -> Option<ActorEvent> {
    let target = match core.locomotion {
        Locomotion::Follow { target } => target,
        _ => return None,
    };
    let pos = ctx.resolve(target)?;
    if *cooldown > 0.0 || distance(core.position, pos) > MELEE_RANGE {
        return None;
    }
    *cooldown = MELEE_COOLDOWN_SECS;
    Some(ActorEvent::MeleeHit { target, damage })
}

pub fn tick_timer(timer: &mut f32, dt: f32) {
    *timer = (*timer - dt).max(0.0);
}

/// Babies grow up after a fixed age
pub fn grow(core: &mut ActorCore, dt: f32) {
    core.age_secs += dt;
    if core.baby && core.age_secs >= BABY_GROW_SECS {
        core.baby = false;
    }
}

/// Love mode and breeding cooldown for breedable mobs
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Breeding {
    pub love_secs: f32,
    pub cooldown_secs: f32,
}

impl Breeding {
    pub fn in_love(&self) -> bool {
        self.love_secs > 0.0
    }

    pub fn can_feed(&self, core: &ActorCore) -> bool {
        !core.baby && !self.in_love() && self.cooldown_secs <= 0.0
    }

    pub fn feed(&mut self) {
        self.love_secs = LOVE_SECS;
    }

    pub fn finish(&mut self) {
        self.love_secs = 0.0;
        self.cooldown_secs = BREED_COOLDOWN_SECS;
    }

    pub fn tick(&mut self, dt: f32) {
        tick_timer(&mut self.love_secs, dt);
        tick_timer(&mut self.cooldown_secs, dt);
    }

    /// Walk to the nearest willing partner of the same archetype. When in
    /// range, the lower id of the pair reports the birth.
    pub fn seek_mate(
        &mut self,
        core: &mut ActorCore,
        ctx: &TickContext<'_>,
        speed: f32,
    ) -> Option<ActorEvent> {
        if !self.in_love() || core.baby {
            return None;
        }
        let partner = ctx
            .actors
            .iter()
            .filter(|a| {
                a.id != core.id
                    && a.archetype == core.archetype
                    && a.wants_mate
                    && !a.dead
                    && !a.baby
            })
            .map(|a| (a, distance(a.position, core.position)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;
        let (snapshot, dist) = partner;
        if dist <= MATE_RANGE {
            stop(core);
            if core.id < snapshot.id {
                self.finish();
                return Some(ActorEvent::Bred {
                    partner: snapshot.id,
                    position: (core.position + snapshot.position) * 0.5,
                });
            }
            return None;
        }
        if core.locomotion.is_free() {
            core.locomotion = Locomotion::Wander {
                destination: snapshot.position,
            };
        }
        if let Locomotion::Wander { .. } = core.locomotion {
            steer_toward(core, snapshot.position, speed);
        }
        None
    }
}
