//! Threat and aggro model.
//!
//! One policy value per archetype, referenced from its static profile.
//! Archetypes never decide on their own how to react to damage; they call
//! into the policy, which only ever rewrites `ActorCore::locomotion`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::actor::{ActorCore, DamageSource, Locomotion, TargetRef, TickContext};
use crate::math::distance;

/// What an actor does when something hurts it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageResponse {
    Flee,
    Retaliate,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggroPolicy {
    /// Acquisition and give-up distance
    pub radius: f32,
    /// Expected acquisitions per second while idle; zero never acquires
    pub acquire_rate: f32,
    pub flee_secs: f32,
    pub response: DamageResponse,
    /// Same-archetype neighbours within this distance share the target
    pub alert_radius: Option<f32>,
}

impl AggroPolicy {
    /// Prey: never acquires, runs from whatever hurt it
    pub const fn prey(radius: f32, flee_secs: f32) -> Self {
        Self {
            radius,
            acquire_rate: 0.0,
            flee_secs,
            response: DamageResponse::Flee,
            alert_radius: None,
        }
    }

    /// Neutral: leaves players alone until provoked
    pub const fn territorial(radius: f32, alert_radius: Option<f32>) -> Self {
        Self {
            radius,
            acquire_rate: 0.0,
            flee_secs: 0.0,
            response: DamageResponse::Retaliate,
            alert_radius,
        }
    }

    /// Hostile: periodically hunts the nearest player
    pub const fn hunter(radius: f32, acquire_rate: f32, alert_radius: Option<f32>) -> Self {
        Self {
            radius,
            acquire_rate,
            flee_secs: 0.0,
            response: DamageResponse::Retaliate,
            alert_radius,
        }
    }

    /// Low-probability scan while idle or wandering. Picks the nearest
    /// living player in range and starts following it.
    pub fn try_acquire(&self, core: &mut ActorCore, ctx: &mut TickContext<'_>) -> bool {
        if self.acquire_rate <= 0.0 || core.dead || !core.locomotion.is_free() {
            return false;
        }
        let chance = (self.acquire_rate * ctx.dt).clamp(0.0, 1.0);
        if chance <= 0.0 || ctx.rng.gen::<f32>() >= chance {
            return false;
        }
        let Some((player, dist)) = ctx.players.nearest(core.position) else {
            return false;
        };
        if dist > self.radius {
            return false;
        }
        tracing::trace!(actor = %core.id, player = %player.id, dist, "acquired target");
        core.locomotion = Locomotion::Follow {
            target: TargetRef::Player(player.id),
        };
        true
    }

    /// Escalate toward (or away from) whoever caused the damage
    pub fn on_damaged(&self, core: &mut ActorCore, source: &DamageSource) {
        let Some(attacker) = source.attacker() else {
            return;
        };
        if attacker == TargetRef::Actor(core.id) {
            return;
        }
        match self.response {
            DamageResponse::Flee => {
                core.locomotion = Locomotion::Flee {
                    threat: attacker,
                    remaining_secs: self.flee_secs,
                };
            }
            DamageResponse::Retaliate => {
                core.locomotion = Locomotion::Follow { target: attacker };
            }
            DamageResponse::Ignore => {}
        }
    }

    /// Drop targets that vanished or got out of range, and run down the
    /// flee timer. Returns whether the actor fell back to idle.
    pub fn expire(&self, core: &mut ActorCore, ctx: &TickContext<'_>) -> bool {
        match core.locomotion {
            Locomotion::Follow { target } => match ctx.resolve(target) {
                Some(pos) if distance(pos, core.position) <= self.radius => false,
                _ => {
                    core.go_idle();
                    true
                }
            },
            Locomotion::Flee {
                threat,
                remaining_secs,
            } => {
                let remaining = remaining_secs - ctx.dt.max(0.0);
                let gone = match ctx.resolve(threat) {
                    Some(pos) => distance(pos, core.position) > self.radius,
                    None => true,
                };
                if remaining <= 0.0 || gone {
                    core.go_idle();
                    true
                } else {
                    core.locomotion = Locomotion::Flee {
                        threat,
                        remaining_secs: remaining,
                    };
                    false
                }
            }
            _ => false,
        }
    }

    /// Take a target pushed by a pack member
    pub fn receive_alert(&self, core: &mut ActorCore, target: TargetRef) -> bool {
        if self.alert_radius.is_none() || core.dead {
            return false;
        }
        let next = match self.response {
            DamageResponse::Retaliate => Locomotion::Follow { target },
            DamageResponse::Flee => Locomotion::Flee {
                threat: target,
                remaining_secs: self.flee_secs,
            },
            DamageResponse::Ignore => return false,
        };
        if core.locomotion.target() == Some(target) {
            return false;
        }
        core.locomotion = next;
        true
    }

    pub fn alert_radius(&self) -> Option<f32> {
        self.alert_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorView, Archetype};
    use crate::ids::{ActorId, PlayerId};
    use crate::player::{Player, Players};
    use crate::seed::SimSeed;
    use crate::world::SandboxWorld;
    use bevy::math::Vec3;

    fn core_at(pos: Vec3) -> ActorCore {
        ActorCore::new(ActorId(1), Archetype::Zombie, pos)
    }

    fn players_at(x: f32) -> Players {
        let mut players = Players::new();
        players.join(Player::new(PlayerId(1), "p", Vec3::new(x, 64.0, 0.0)));
        players
    }

    #[test]
    fn test_acquire_nearest_in_radius() {
        let policy = AggroPolicy::hunter(16.0, 1000.0, None);
        let mut core = core_at(Vec3::new(0.0, 64.0, 0.0));
        let players = players_at(5.0);
        let view = ActorView::default();
        let mut world = SandboxWorld::flat(64);
        let mut rng = SimSeed::new(1).rng("aggro");
        let mut ctx = TickContext {
            world: &mut world,
            players: &players,
            actors: &view,
            dt: 0.05,
            rng: &mut rng,
            floor_y: -64.0,
        };
        assert!(policy.try_acquire(&mut core, &mut ctx));
        assert_eq!(core.target(), Some(TargetRef::Player(PlayerId(1))));
    }

    #[test]
    fn test_acquire_ignores_out_of_range() {
        let policy = AggroPolicy::hunter(16.0, 1000.0, None);
        let mut core = core_at(Vec3::new(0.0, 64.0, 0.0));
        let players = players_at(40.0);
        let view = ActorView::default();
        let mut world = SandboxWorld::flat(64);
        let mut rng = SimSeed::new(1).rng("aggro");
        let mut ctx = TickContext {
            world: &mut world,
            players: &players,
            actors: &view,
            dt: 0.05,
            rng: &mut rng,
            floor_y: -64.0,
        };
        assert!(!policy.try_acquire(&mut core, &mut ctx));
        assert!(core.locomotion.is_idle());
    }

    #[test]
    fn test_zero_dt_never_acquires() {
        let policy = AggroPolicy::hunter(16.0, 1000.0, None);
        let mut core = core_at(Vec3::new(0.0, 64.0, 0.0));
        let players = players_at(2.0);
        let view = ActorView::default();
        let mut world = SandboxWorld::flat(64);
        let mut rng = SimSeed::new(1).rng("aggro");
        let mut ctx = TickContext {
            world: &mut world,
            players: &players,
            actors: &view,
            dt: 0.0,
            rng: &mut rng,
            floor_y: -64.0,
        };
        assert!(!policy.try_acquire(&mut core, &mut ctx));
    }

    #[test]
    fn test_on_damaged_flee_and_retaliate() {
        let attacker = DamageSource::Player(PlayerId(9));
        let mut core = core_at(Vec3::ZERO);
        AggroPolicy::prey(10.0, 5.0).on_damaged(&mut core, &attacker);
        assert!(matches!(core.locomotion, Locomotion::Flee { remaining_secs, .. } if remaining_secs == 5.0));

        let mut core = core_at(Vec3::ZERO);
        AggroPolicy::territorial(16.0, Some(8.0)).on_damaged(&mut core, &attacker);
        assert_eq!(
            core.locomotion,
            Locomotion::Follow {
                target: TargetRef::Player(PlayerId(9))
            }
        );
    }

    #[test]
    fn test_environment_damage_never_aggros() {
        let mut core = core_at(Vec3::ZERO);
        AggroPolicy::territorial(16.0, None).on_damaged(
            &mut core,
            &DamageSource::Environment(crate::actor::Hazard::Sunlight),
        );
        assert!(core.locomotion.is_idle());
    }

    #[test]
    fn test_expire_missing_target() {
        let policy = AggroPolicy::hunter(16.0, 0.0, None);
        let mut core = core_at(Vec3::ZERO);
        core.locomotion = Locomotion::Follow {
            target: TargetRef::Player(PlayerId(77)),
        };
        let players = Players::new();
        let view = ActorView::default();
        let mut world = SandboxWorld::flat(64);
        let mut rng = SimSeed::new(1).rng("aggro");
        let ctx = TickContext {
            world: &mut world,
            players: &players,
            actors: &view,
            dt: 0.05,
            rng: &mut rng,
            floor_y: -64.0,
        };
        assert!(policy.expire(&mut core, &ctx));
        assert!(core.locomotion.is_idle());
        assert!(core.target().is_none());
    }

    #[test]
    fn test_flee_timer_runs_down() {
        let policy = AggroPolicy::prey(10.0, 1.0);
        let mut core = core_at(Vec3::new(0.0, 64.0, 0.0));
        core.locomotion = Locomotion::Flee {
            threat: TargetRef::Player(PlayerId(1)),
            remaining_secs: 1.0,
        };
        let players = players_at(3.0);
        let view = ActorView::default();
        let mut world = SandboxWorld::flat(64);
        let mut rng = SimSeed::new(1).rng("aggro");
        let ctx = TickContext {
            world: &mut world,
            players: &players,
            actors: &view,
            dt: 0.6,
            rng: &mut rng,
            floor_y: -64.0,
        };
        assert!(!policy.expire(&mut core, &ctx));
        assert!(policy.expire(&mut core, &ctx));
        assert!(core.locomotion.is_idle());
    }

    #[test]
    fn test_receive_alert_requires_pack_policy() {
        let target = TargetRef::Player(PlayerId(2));
        let mut core = core_at(Vec3::ZERO);
        assert!(!AggroPolicy::hunter(16.0, 1.0, None).receive_alert(&mut core, target));
        assert!(AggroPolicy::territorial(16.0, Some(8.0)).receive_alert(&mut core, target));
        assert_eq!(core.target(), Some(target));
        assert!(
            !AggroPolicy::territorial(16.0, Some(8.0)).receive_alert(&mut core, target),
            "same target again is not a change"
        );
    }
}
