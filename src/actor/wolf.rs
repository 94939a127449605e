//! Wolf: neutral pack hunter, tameable with bones.

use serde::{Deserialize, Serialize};

use super::common;
use super::motion::{integrate, stop};
use super::{
    Actor, ActorCore, ActorEvent, ActorRecord, ArchetypeState, Classification, DamageSource,
    Interaction, Locomotion, SpecialAction, TargetRef, TickContext,
};
use crate::ids::PlayerId;
use crate::item::ItemKind;
use crate::math::distance;
use crate::player::{Player, PlayerAction};
use crate::world::Sound;

const BONES_TO_TAME: u8 = 3;
const BITE_DAMAGE: f32 = 4.0;
const HEEL_DISTANCE: f32 = 6.0;
const CLOSE_ENOUGH: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WolfState {
    pub owner: Option<PlayerId>,
    pub bones_fed: u8,
    pub attack_cooldown_secs: f32,
}

#[derive(Debug)]
pub struct Wolf {
    core: ActorCore,
    state: WolfState,
}

impl Wolf {
    pub fn new(core: ActorCore) -> Self {
        Self {
            core,
            state: WolfState::default(),
        }
    }

    pub fn restore(core: ActorCore, state: WolfState) -> Self {
        Self { core, state }
    }

    pub fn owner(&self) -> Option<PlayerId> {
        self.state.owner
    }

    pub fn is_tamed(&self) -> bool {
        self.state.owner.is_some()
    }

    pub fn is_sitting(&self) -> bool {
        self.core.locomotion.is_special(SpecialAction::Sit)
    }

    /// Tamed wolves trail their owner; wild ones roam
    fn heel(&mut self, ctx: &mut TickContext<'_>, speed: f32) {
        let habitat = self.core.archetype.habitat();
        let owner_pos = self
            .state
            .owner
            .and_then(|id| ctx.resolve(TargetRef::Player(id)));
        let Some(pos) = owner_pos else {
            common::wander(&mut self.core, ctx, speed * 0.6, habitat);
            return;
        };
        let dist = distance(pos, self.core.position);
        let heading_back = matches!(self.core.locomotion, Locomotion::Wander { .. });
        if dist <= CLOSE_ENOUGH {
            stop(&mut self.core);
            self.core.go_idle();
        } else if dist > HEEL_DISTANCE || heading_back {
            self.core.locomotion = Locomotion::Wander { destination: pos };
            common::move_to(&mut self.core, pos, speed, habitat);
        } else {
            stop(&mut self.core);
        }
    }
}

impl Actor for Wolf {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn classify(&self) -> Classification {
        if self.is_tamed() {
            Classification::Passive
        } else {
            Classification::Neutral
        }
    }

    fn advance(&mut self, ctx: &mut TickContext<'_>) -> Option<ActorEvent> {
        if common::skip_tick(&self.core, ctx) {
            return None;
        }
        let profile = self.core.archetype.profile();
        common::grow(&mut self.core, ctx.dt);
        common::tick_timer(&mut self.state.attack_cooldown_secs, ctx.dt);
        profile.aggro.expire(&mut self.core, ctx);

        let mut event = None;
        match self.core.locomotion {
            Locomotion::Special {
                action: SpecialAction::Sit,
                ..
            } => stop(&mut self.core),
            Locomotion::Special { .. } => self.core.go_idle(),
            Locomotion::Follow { .. } => {
                common::chase(&mut self.core, ctx, profile.speed, 1.0, profile.habitat);
                event = common::melee(
                    &self.core,
                    ctx,
                    &mut self.state.attack_cooldown_secs,
                    BITE_DAMAGE,
                );
                if event.is_some() {
                    ctx.world.play_sound(Sound::Growl, self.core.position);
                }
            }
            Locomotion::Flee { .. } => common::flee(&mut self.core, ctx, profile.speed),
            Locomotion::Idle | Locomotion::Wander { .. } => self.heel(ctx, profile.speed),
        }

        integrate(&mut self.core, ctx, profile.habitat);
        event
    }

    fn serialize(&self) -> ActorRecord {
        ActorRecord {
            core: self.core.clone(),
            state: ArchetypeState::Wolf(self.state),
        }
    }

    /// Owners can hit their own wolf without turning it on them
    fn take_damage(&mut self, amount: f32, source: DamageSource) -> f32 {
        let profile = self.core.archetype.profile();
        let applied = self.core.apply_damage(amount, profile.armor);
        if applied <= 0.0 || self.core.dead {
            return applied;
        }
        let from_owner = matches!(
            (source.attacker(), self.state.owner),
            (Some(TargetRef::Player(attacker)), Some(owner)) if attacker == owner
        );
        if !from_owner {
            profile.aggro.on_damaged(&mut self.core, &source);
        }
        applied
    }

    fn interact(&mut self, player: &Player, action: PlayerAction) -> Interaction {
        if self.core.dead || action != PlayerAction::Use {
            return Interaction::NotHandled;
        }
        match self.state.owner {
            None => {
                if !player.holds(ItemKind::Bone) || self.core.target().is_some() {
                    return Interaction::NotHandled;
                }
                self.state.bones_fed = self.state.bones_fed.saturating_add(1);
                if self.state.bones_fed >= BONES_TO_TAME {
                    self.state.owner = Some(player.id);
                    self.core.despawn.eligible = false;
                    self.core.despawn.out_of_range_secs = 0.0;
                    self.core.go_idle();
                    tracing::debug!(actor = %self.core.id, owner = %player.id, "wolf tamed");
                }
                Interaction::consuming(1)
            }
            Some(owner) if owner == player.id && player.held.is_none() => {
                if self.is_sitting() {
                    self.core.go_idle();
                } else {
                    stop(&mut self.core);
                    self.core.locomotion = Locomotion::Special {
                        action: SpecialAction::Sit,
                        remaining_secs: 0.0,
                    };
                }
                Interaction::handled()
            }
            Some(_) => Interaction::NotHandled,
        }
    }

    /// Tamed wolves answer to their owner, not the pack
    fn on_alert(&mut self, target: TargetRef) -> bool {
        if self.is_tamed() || target == TargetRef::Actor(self.core.id) {
            return false;
        }
        self.core.archetype.profile().aggro.receive_alert(&mut self.core, target)
    }

    fn despawn_eligible(&self) -> bool {
        !self.is_tamed() && self.core.despawn.eligible
    }
}
