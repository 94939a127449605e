//! Sheep: grazing, shearing and wheat breeding.

use bevy::math::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::common::{self, Breeding};
use super::motion::{integrate, stop};
use super::{
    Actor, ActorCore, ActorEvent, ActorRecord, ArchetypeState, Interaction, Locomotion,
    SpecialAction, TickContext,
};
use crate::constants::BABY_GROW_SECS;
use crate::item::{ItemKind, ItemStack};
use crate::player::{Player, PlayerAction};
use crate::world::{BlockKind, Sound};

const GRAZE_CHANCE_PER_SEC: f32 = 0.05;
const GRAZE_SECS: f32 = 2.0;
const WOOL_PER_SHEAR: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SheepState {
    pub sheared: bool,
    pub breeding: Breeding,
}

#[derive(Debug)]
pub struct Sheep {
    core: ActorCore,
    state: SheepState,
}

impl Sheep {
    pub fn new(core: ActorCore) -> Self {
        Self {
            core,
            state: SheepState::default(),
        }
    }

    pub fn restore(core: ActorCore, state: SheepState) -> Self {
        Self { core, state }
    }

    pub fn is_sheared(&self) -> bool {
        self.state.sheared
    }

    fn finish_grazing(&mut self, ctx: &mut TickContext<'_>) {
        let below = self.core.position - Vec3::new(0.0, 0.5, 0.0);
        let (x, y, z) = crate::math::block_of(below);
        if ctx.world.block_at(x, y, z) == BlockKind::Grass {
            ctx.world.set_block(x, y, z, BlockKind::Dirt);
            ctx.world.play_sound(Sound::Eat, self.core.position);
            self.state.sheared = false;
            if self.core.baby {
                self.core.age_secs += BABY_GROW_SECS * 0.1;
            }
        }
    }
}

impl Actor for Sheep {
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
            Locomotion::Special {
                action: SpecialAction::EatGrass,
                remaining_secs,
            } => {
                stop(&mut self.core);
                let remaining = remaining_secs - ctx.dt;
                if remaining <= 0.0 {
                    self.finish_grazing(ctx);
                    self.core.go_idle();
                } else {
                    self.core.locomotion = Locomotion::Special {
                        action: SpecialAction::EatGrass,
                        remaining_secs: remaining,
                    };
                }
            }
            Locomotion::Special { .. } => self.core.go_idle(),
            Locomotion::Flee { .. } => common::flee(&mut self.core, ctx, profile.speed),
            _ => {
                if self.state.breeding.in_love() {
                    event = self
                        .state
                        .breeding
                        .seek_mate(&mut self.core, ctx, profile.speed);
                }
                if event.is_none()
                    && !common::tempt(&mut self.core, ctx, ItemKind::Wheat, profile.speed)
                {
                    let on_grass = ctx
                        .world
                        .block_at_point(self.core.position - Vec3::new(0.0, 0.5, 0.0))
                        == BlockKind::Grass;
                    let hungry = if self.state.sheared { 4.0 } else { 1.0 };
                    if self.core.locomotion.is_idle()
                        && on_grass
                        && ctx.rng.gen::<f32>() < GRAZE_CHANCE_PER_SEC * hungry * ctx.dt
                    {
                        self.core.locomotion = Locomotion::Special {
                            action: SpecialAction::EatGrass,
                            remaining_secs: GRAZE_SECS,
                        };
                    } else {
                        common::wander(&mut self.core, ctx, profile.speed, profile.habitat);
                    }
                }
            }
        }

        integrate(&mut self.core, ctx, profile.habitat);
        event
    }

    fn serialize(&self) -> ActorRecord {
        ActorRecord {
            core: self.core.clone(),
            state: ArchetypeState::Sheep(self.state),
        }
    }

    fn drops(&self) -> Vec<ItemStack> {
        if self.core.baby {
            return Vec::new();
        }
        let mut drops = vec![ItemStack::one(ItemKind::Mutton)];
        if !self.state.sheared {
            drops.push(ItemStack::one(ItemKind::Wool));
        }
        drops
    }

    fn interact(&mut self, player: &Player, action: PlayerAction) -> Interaction {
        if self.core.dead || action != PlayerAction::Use {
            return Interaction::NotHandled;
        }
        if player.holds(ItemKind::Shears) {
            if self.state.sheared || self.core.baby {
                return Interaction::NotHandled;
            }
            self.state.sheared = true;
            return Interaction::giving(vec![ItemStack::new(ItemKind::Wool, WOOL_PER_SHEAR)]);
        }
        if player.holds(ItemKind::Wheat) {
            if self.core.baby {
                self.core.age_secs += BABY_GROW_SECS * 0.1;
                return Interaction::consuming(1);
            }
            if self.state.breeding.can_feed(&self.core) {
                self.state.breeding.feed();
                return Interaction::consuming(1);
            }
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
