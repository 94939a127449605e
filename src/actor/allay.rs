//! Allay: carries an item for the player who handed it over, dances near
//! amethyst and can be duplicated while dancing.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use super::common;
use super::motion::integrate;
use super::{
    Actor, ActorCore, ActorEvent, ActorRecord, Archetype, ArchetypeState, Interaction, Locomotion,
    SpecialAction, TargetRef, TickContext,
};
use crate::ids::PlayerId;
use crate::item::{ItemKind, ItemStack};
use crate::math::distance;
use crate::player::{Player, PlayerAction};
use crate::world::{Particle, Sound};

const DANCE_RANGE: f32 = 4.0;
const DANCE_SECS: f32 = 5.0;
const DUPLICATE_COOLDOWN_SECS: f32 = 300.0;
const FOLLOW_DISTANCE: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AllayState {
    pub held: Option<ItemStack>,
    pub owner: Option<PlayerId>,
    pub duplicate_cooldown_secs: f32,
    /// Set by a shard interaction, emitted on the next advance
    pub pending_duplicate: bool,
}

#[derive(Debug)]
pub struct Allay {
    core: ActorCore,
    state: AllayState,
}

impl Allay {
    pub fn new(core: ActorCore) -> Self {
        Self {
            core,
            state: AllayState::default(),
        }
    }

    pub fn restore(core: ActorCore, state: AllayState) -> Self {
        Self { core, state }
    }

    pub fn owner(&self) -> Option<PlayerId> {
        self.state.owner
    }

    pub fn is_dancing(&self) -> bool {
        self.core.locomotion.is_special(SpecialAction::Dance)
    }

    fn amethyst_nearby(&self, ctx: &TickContext<'_>) -> bool {
        ctx.players.iter().any(|p| {
            p.is_alive()
                && p.holds(ItemKind::AmethystShard)
                && distance(p.position, self.core.position) <= DANCE_RANGE
        })
    }
}

impl Actor for Allay {
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
        common::tick_timer(&mut self.state.duplicate_cooldown_secs, ctx.dt);
        profile.aggro.expire(&mut self.core, ctx);

        if self.state.pending_duplicate {
            self.state.pending_duplicate = false;
            ctx.world.play_sound(Sound::Chime, self.core.position);
            ctx.world.spawn_particle(Particle::Heart, self.core.position);
            return Some(ActorEvent::SpawnSibling {
                archetype: Archetype::Allay,
                position: self.core.position + Vec3::new(0.5, 0.0, 0.5),
                baby: false,
            });
        }

        if self.amethyst_nearby(ctx) && !matches!(self.core.locomotion, Locomotion::Flee { .. }) {
            self.core.velocity = Vec3::ZERO;
            self.core.locomotion = Locomotion::Special {
                action: SpecialAction::Dance,
                remaining_secs: DANCE_SECS,
            };
            ctx.world.spawn_particle(Particle::Note, self.core.position + Vec3::Y);
        }

        match self.core.locomotion {
            Locomotion::Special {
                action,
                remaining_secs,
            } => {
                let remaining = remaining_secs - ctx.dt;
                if remaining <= 0.0 {
                    self.core.go_idle();
                } else {
                    self.core.locomotion = Locomotion::Special {
                        action,
                        remaining_secs: remaining,
                    };
                }
            }
            Locomotion::Flee { .. } => {
                common::flee(&mut self.core, ctx, profile.speed);
                self.core.velocity.y = 0.0;
            }
            Locomotion::Follow { .. } => self.core.go_idle(),
            Locomotion::Idle | Locomotion::Wander { .. } => {
                let owner_pos = self
                    .state
                    .owner
                    .and_then(|id| ctx.resolve(TargetRef::Player(id)));
                match owner_pos {
                    Some(pos) if distance(pos, self.core.position) > FOLLOW_DISTANCE => {
                        let destination = pos + Vec3::new(0.0, 1.5, 0.0);
                        self.core.locomotion = Locomotion::Wander { destination };
                        common::move_to(&mut self.core, destination, profile.speed, profile.habitat);
                    }
                    Some(_) => {
                        self.core.velocity = Vec3::ZERO;
                        self.core.go_idle();
                    }
                    None => common::wander(&mut self.core, ctx, profile.speed, profile.habitat),
                }
            }
        }

        integrate(&mut self.core, ctx, profile.habitat);
        None
    }

    fn serialize(&self) -> ActorRecord {
        ActorRecord {
            core: self.core.clone(),
            state: ArchetypeState::Allay(self.state),
        }
    }

    fn drops(&self) -> Vec<ItemStack> {
        self.state.held.into_iter().collect()
    }

    fn interact(&mut self, player: &Player, action: PlayerAction) -> Interaction {
        if self.core.dead {
            return Interaction::NotHandled;
        }
        match action {
            PlayerAction::Use => {
                if player.holds(ItemKind::AmethystShard)
                    && self.is_dancing()
                    && self.state.duplicate_cooldown_secs <= 0.0
                    && !self.state.pending_duplicate
                {
                    self.state.pending_duplicate = true;
                    self.state.duplicate_cooldown_secs = DUPLICATE_COOLDOWN_SECS;
                    return Interaction::consuming(1);
                }
                match player.held {
                    Some(stack)
                        if self.state.held.is_none()
                            && stack.count > 0
                            && !stack.kind.is_tool() =>
                    {
                        self.state.held = Some(ItemStack::one(stack.kind));
                        self.state.owner = Some(player.id);
                        Interaction::consuming(1)
                    }
                    _ => Interaction::NotHandled,
                }
            }
            PlayerAction::SneakUse => {
                if player.held.is_some() || self.state.owner != Some(player.id) {
                    return Interaction::NotHandled;
                }
                match self.state.held.take() {
                    Some(stack) => {
                        self.state.owner = None;
                        Interaction::giving(vec![stack])
                    }
                    None => Interaction::NotHandled,
                }
            }
        }
    }

    fn equip(&mut self, stack: ItemStack) -> bool {
        if stack.count == 0 || self.state.held.is_some() {
            return false;
        }
        self.state.held = Some(ItemStack::one(stack.kind));
        true
    }

    fn held_item(&self) -> Option<ItemStack> {
        self.state.held
    }
}
