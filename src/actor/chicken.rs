//! Chicken: slow fall, periodic eggs, seed breeding.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::common::{self, Breeding};
use super::motion::integrate_with;
use super::{Actor, ActorCore, ActorEvent, ActorRecord, ArchetypeState, Interaction, Locomotion, TickContext};
use crate::constants::BABY_GROW_SECS;
use crate::item::{ItemKind, ItemStack};
use crate::player::{Player, PlayerAction};
use crate::world::Sound;

const EGG_MIN_SECS: f32 = 300.0;
const EGG_MAX_SECS: f32 = 600.0;
/// Flapping caps the fall speed
const MAX_FALL_SPEED: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChickenState {
    pub egg_timer_secs: f32,
    pub breeding: Breeding,
}

impl Default for ChickenState {
    fn default() -> Self {
        Self {
            egg_timer_secs: (EGG_MIN_SECS + EGG_MAX_SECS) * 0.5,
            breeding: Breeding::default(),
        }
    }
}

#[derive(Debug)]
pub struct Chicken {
    core: ActorCore,
    state: ChickenState,
}

impl Chicken {
    pub fn new(core: ActorCore) -> Self {
        Self {
            core,
            state: ChickenState::default(),
        }
    }

    pub fn restore(core: ActorCore, state: ChickenState) -> Self {
        Self { core, state }
    }

    pub fn egg_timer(&self) -> f32 {
        self.state.egg_timer_secs
    }
}

impl Actor for Chicken {
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
        self.state.breeding.tick(ctx.dt);
        profile.aggro.expire(&mut self.core, ctx);

        let mut event = None;
        match self.core.locomotion {
            Locomotion::Flee { .. } => common::flee(&mut self.core, ctx, profile.speed),
            Locomotion::Special { .. } => self.core.go_idle(),
            _ => {
                if self.state.breeding.in_love() {
                    event = self
                        .state
                        .breeding
                        .seek_mate(&mut self.core, ctx, profile.speed);
                }
                if event.is_none()
                    && !common::tempt(&mut self.core, ctx, ItemKind::Seeds, profile.speed)
                {
                    common::wander(&mut self.core, ctx, profile.speed, profile.habitat);
                }
            }
        }

        if !self.core.baby {
            self.state.egg_timer_secs -= ctx.dt;
            if self.state.egg_timer_secs <= 0.0 && event.is_none() {
                self.state.egg_timer_secs = ctx.rng.gen_range(EGG_MIN_SECS..=EGG_MAX_SECS);
                ctx.world.play_sound(Sound::Plop, self.core.position);
                event = Some(ActorEvent::LayItem {
                    item: ItemStack::one(ItemKind::Egg),
                    position: self.core.position,
                });
            }
        }

        integrate_with(&mut self.core, ctx, profile.habitat, MAX_FALL_SPEED);
        event
    }

    fn serialize(&self) -> ActorRecord {
        ActorRecord {
            core: self.core.clone(),
            state: ArchetypeState::Chicken(self.state),
        }
    }

    fn interact(&mut self, player: &Player, action: PlayerAction) -> Interaction {
        if self.core.dead || action != PlayerAction::Use || !player.holds(ItemKind::Seeds) {
            return Interaction::NotHandled;
        }
        if self.core.baby {
            self.core.age_secs += BABY_GROW_SECS * 0.1;
            return Interaction::consuming(1);
        }
        if self.state.breeding.can_feed(&self.core) {
            self.state.breeding.feed();
            return Interaction::consuming(1);
        }
        Interaction::NotHandled
    }

    fn wants_mate(&self) -> bool {
        !self.core.dead && !self.core.baby && self.state.breeding.in_love()
    }

    fn finish_mating(&mut self) {
        self.state.breeding.finish();
    }
}
