//! Actor contract shared by every mob archetype.
//!
//! An actor advances itself, reports intents it cannot perform alone as a
//! single `ActorEvent`, and never touches the registry or other actors.
//! Archetypes compose the shared `ActorCore` (transform, vitals,
//! locomotion) with their own state and a reference to the aggro policy
//! from their profile.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{SimError, SimResult};
use crate::ids::{ActorId, PlayerId};
use crate::item::ItemStack;
use crate::player::{Player, PlayerAction, Players};
use crate::projectile::ProjectileKind;
use crate::seed::SimRng;
use crate::world::GameWorld;

pub mod allay;
pub mod archetype;
pub mod bat;
pub mod chicken;
pub mod common;
pub mod motion;
pub mod ranged;
pub mod sheep;
pub mod squid;
pub mod wolf;
pub mod zombie;

pub use archetype::{Archetype, ArchetypeProfile, Habitat};

/// Weak reference to another entity. Resolving it may fail at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetRef {
    Player(PlayerId),
    Actor(ActorId),
}

/// Environmental damage causes; never trigger aggro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hazard {
    Drowning,
    Suffocation,
    Sunlight,
    Void,
    Fall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    Player(PlayerId),
    Actor(ActorId),
    Projectile { shooter: Option<TargetRef> },
    Environment(Hazard),
}

impl DamageSource {
    /// Entity the victim should hold responsible
    pub fn attacker(&self) -> Option<TargetRef> {
        match self {
            Self::Player(id) => Some(TargetRef::Player(*id)),
            Self::Actor(id) => Some(TargetRef::Actor(*id)),
            Self::Projectile { shooter } => *shooter,
            Self::Environment(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Classification {
    Passive,
    Neutral,
    Hostile,
}

impl Classification {
    pub fn all() -> [Classification; 3] {
        [Self::Passive, Self::Neutral, Self::Hostile]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialAction {
    EatGrass,
    Sit,
    Dance,
    Charge,
}

/// Locomotion state machine.
///
/// `Follow` and `Flee` carry their target inside the variant; `Idle`,
/// `Wander` and `Special` cannot hold one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Locomotion {
    #[default]
    Idle,
    Wander {
        destination: Vec3,
    },
    Follow {
        target: TargetRef,
    },
    Flee {
        threat: TargetRef,
        remaining_secs: f32,
    },
    Special {
        action: SpecialAction,
        remaining_secs: f32,
    },
}

impl Locomotion {
    pub fn target(&self) -> Option<TargetRef> {
        match self {
            Self::Follow { target } => Some(*target),
            Self::Flee { threat, .. } => Some(*threat),
            Self::Idle | Self::Wander { .. } | Self::Special { .. } => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Idle or wandering, i.e. free to pick something new to do
    pub fn is_free(&self) -> bool {
        matches!(self, Self::Idle | Self::Wander { .. })
    }

    pub fn is_special(&self, action: SpecialAction) -> bool {
        matches!(self, Self::Special { action: a, .. } if *a == action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DespawnState {
    pub eligible: bool,
    pub out_of_range_secs: f32,
}

/// State every archetype carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorCore {
    pub id: ActorId,
    pub archetype: Archetype,
    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw: f32,
    pub health: f32,
    pub max_health: f32,
    pub dead: bool,
    pub locomotion: Locomotion,
    pub despawn: DespawnState,
    pub age_secs: f32,
    pub baby: bool,
}

impl ActorCore {
    pub fn new(id: ActorId, archetype: Archetype, position: Vec3) -> Self {
        let profile = archetype.profile();
        Self {
            id,
            archetype,
            position,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            health: profile.max_health,
            max_health: profile.max_health,
            dead: false,
            locomotion: Locomotion::Idle,
            despawn: DespawnState {
                eligible: profile.despawn_eligible,
                out_of_range_secs: 0.0,
            },
            age_secs: 0.0,
            baby: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    pub fn target(&self) -> Option<TargetRef> {
        self.locomotion.target()
    }

    /// Apply armor, clamp at zero and set `dead`. Returns damage applied.
    pub fn apply_damage(&mut self, amount: f32, armor: f32) -> f32 {
        if self.dead || !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let reduction = (armor.clamp(0.0, 20.0)) / 25.0;
        let actual = (amount * (1.0 - reduction)).min(self.health);
        self.health -= actual;
        if self.health <= 0.0 {
            self.health = 0.0;
            self.dead = true;
            self.velocity = Vec3::ZERO;
        }
        actual
    }

    pub fn go_idle(&mut self) {
        self.locomotion = Locomotion::Idle;
    }
}

/// Intent an actor cannot carry out itself; applied by the manager after
/// every actor has advanced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActorEvent {
    LaunchProjectile {
        kind: ProjectileKind,
        origin: Vec3,
        velocity: Vec3,
        damage: f32,
    },
    SpawnSibling {
        archetype: Archetype,
        position: Vec3,
        baby: bool,
    },
    Bred {
        partner: ActorId,
        position: Vec3,
    },
    Convert {
        into: Archetype,
    },
    LayItem {
        item: ItemStack,
        position: Vec3,
    },
    AlertAllies {
        target: TargetRef,
    },
    MeleeHit {
        target: TargetRef,
        damage: f32,
    },
}

impl ActorEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LaunchProjectile { .. } => "launch_projectile",
            Self::SpawnSibling { .. } => "spawn_sibling",
            Self::Bred { .. } => "bred",
            Self::Convert { .. } => "convert",
            Self::LayItem { .. } => "lay_item",
            Self::AlertAllies { .. } => "alert_allies",
            Self::MeleeHit { .. } => "melee_hit",
        }
    }
}

/// Result of a player interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Interaction {
    Handled {
        consume_held: u32,
        give: Vec<ItemStack>,
    },
    NotHandled,
}

impl Interaction {
    pub fn handled() -> Self {
        Self::Handled {
            consume_held: 0,
            give: Vec::new(),
        }
    }

    pub fn consuming(count: u32) -> Self {
        Self::Handled {
            consume_held: count,
            give: Vec::new(),
        }
    }

    pub fn giving(give: Vec<ItemStack>) -> Self {
        Self::Handled {
            consume_held: 0,
            give,
        }
    }

    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled { .. })
    }
}

/// Read-only view of one actor, taken at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub archetype: Archetype,
    pub classification: Classification,
    pub position: Vec3,
    pub dead: bool,
    pub wants_mate: bool,
    pub baby: bool,
}

/// Snapshot of every live actor, keyed by id
#[derive(Debug, Clone, Default)]
pub struct ActorView {
    actors: BTreeMap<ActorId, ActorSnapshot>,
}

impl ActorView {
    pub fn from_snapshots(snapshots: impl IntoIterator<Item = ActorSnapshot>) -> Self {
        Self {
            actors: snapshots.into_iter().map(|s| (s.id, s)).collect(),
        }
    }

    pub fn get(&self, id: ActorId) -> Option<&ActorSnapshot> {
        self.actors.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.actors.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.actors.keys().copied()
    }
}

/// Everything an actor may consult while advancing
pub struct TickContext<'a> {
    pub world: &'a mut dyn GameWorld,
    pub players: &'a Players,
    pub actors: &'a ActorView,
    pub dt: f32,
    pub rng: &'a mut SimRng,
    pub floor_y: f32,
}

impl TickContext<'_> {
    /// Position of a target if it still exists (living player / non-dead actor)
    pub fn resolve(&self, target: TargetRef) -> Option<Vec3> {
        match target {
            TargetRef::Player(id) => self
                .players
                .get(id)
                .filter(|p| p.is_alive())
                .map(|p| p.position),
            TargetRef::Actor(id) => self
                .actors
                .get(id)
                .filter(|a| !a.dead)
                .map(|a| a.position),
        }
    }
}

/// Plain record produced by `Actor::serialize`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorRecord {
    pub core: ActorCore,
    pub state: ArchetypeState,
}

/// Archetype-specific fields, one variant per archetype implementation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum ArchetypeState {
    Sheep(sheep::SheepState),
    Chicken(chicken::ChickenState),
    Squid(squid::SquidState),
    Bat(bat::BatState),
    Allay(allay::AllayState),
    Wolf(wolf::WolfState),
    Zombie(zombie::ZombieState),
    Ranged(ranged::RangedState),
}

/// The capability contract every archetype implements
pub trait Actor: Send + Sync + fmt::Debug {
    fn core(&self) -> &ActorCore;
    fn core_mut(&mut self) -> &mut ActorCore;

    /// Advance one tick. Mutates only this actor (and, exceptionally, the
    /// world); anything else is returned as an event.
    fn advance(&mut self, ctx: &mut TickContext<'_>) -> Option<ActorEvent>;

    fn serialize(&self) -> ActorRecord;

    fn id(&self) -> ActorId {
        self.core().id
    }

    fn archetype(&self) -> Archetype {
        self.core().archetype
    }

    fn classify(&self) -> Classification {
        self.archetype().profile().classification
    }

    /// Apply armor and clamp; hand off to the aggro policy. Returns the
    /// damage actually applied.
    fn take_damage(&mut self, amount: f32, source: DamageSource) -> f32 {
        let profile = self.archetype().profile();
        let core = self.core_mut();
        let applied = core.apply_damage(amount, profile.armor);
        if applied > 0.0 && !core.dead {
            profile.aggro.on_damaged(core, &source);
        }
        applied
    }

    /// Items dropped on death; only called once `dead` is observed
    fn drops(&self) -> Vec<ItemStack> {
        if self.core().baby {
            return Vec::new();
        }
        self.archetype()
            .profile()
            .base_drops
            .iter()
            .map(|(kind, count)| ItemStack::new(*kind, *count))
            .collect()
    }

    fn interact(&mut self, _player: &Player, _action: PlayerAction) -> Interaction {
        Interaction::NotHandled
    }

    /// Put an item in the actor's hand. Archetypes without hands refuse.
    fn equip(&mut self, _stack: ItemStack) -> bool {
        false
    }

    fn held_item(&self) -> Option<ItemStack> {
        None
    }

    /// Take on a target pushed by a pack member. Returns whether it changed.
    fn on_alert(&mut self, target: TargetRef) -> bool {
        let profile = self.archetype().profile();
        let core = self.core_mut();
        if target == TargetRef::Actor(core.id) {
            return false;
        }
        profile.aggro.receive_alert(core, target)
    }

    fn wants_mate(&self) -> bool {
        false
    }

    /// Called on the partner when a `Bred` event is applied
    fn finish_mating(&mut self) {}

    fn despawn_eligible(&self) -> bool {
        self.core().despawn.eligible
    }

    fn snapshot(&self) -> ActorSnapshot {
        let core = self.core();
        ActorSnapshot {
            id: core.id,
            archetype: core.archetype,
            classification: self.classify(),
            position: core.position,
            dead: core.dead,
            wants_mate: self.wants_mate(),
            baby: core.baby,
        }
    }
}

/// Build a fresh actor of an archetype
pub fn create(archetype: Archetype, id: ActorId, position: Vec3) -> Box<dyn Actor> {
    let core = ActorCore::new(id, archetype, position);
    match archetype {
        Archetype::Sheep => Box::new(sheep::Sheep::new(core)),
        Archetype::Chicken => Box::new(chicken::Chicken::new(core)),
        Archetype::Squid => Box::new(squid::Squid::new(core)),
        Archetype::Bat => Box::new(bat::Bat::new(core)),
        Archetype::Allay => Box::new(allay::Allay::new(core)),
        Archetype::Wolf => Box::new(wolf::Wolf::new(core)),
        Archetype::Zombie | Archetype::Drowned => Box::new(zombie::Zombie::new(core)),
        Archetype::Skeleton | Archetype::Blaze => Box::new(ranged::RangedAttacker::new(core)),
    }
}

/// Rebuild an actor from its record
pub fn restore(record: ActorRecord) -> SimResult<Box<dyn Actor>> {
    let ActorRecord { core, state } = record;
    let archetype = core.archetype;
    let actor: Box<dyn Actor> = match (archetype, state) {
        (Archetype::Sheep, ArchetypeState::Sheep(s)) => Box::new(sheep::Sheep::restore(core, s)),
        (Archetype::Chicken, ArchetypeState::Chicken(s)) => {
            Box::new(chicken::Chicken::restore(core, s))
        }
        (Archetype::Squid, ArchetypeState::Squid(s)) => Box::new(squid::Squid::restore(core, s)),
        (Archetype::Bat, ArchetypeState::Bat(s)) => Box::new(bat::Bat::restore(core, s)),
        (Archetype::Allay, ArchetypeState::Allay(s)) => Box::new(allay::Allay::restore(core, s)),
        (Archetype::Wolf, ArchetypeState::Wolf(s)) => Box::new(wolf::Wolf::restore(core, s)),
        (Archetype::Zombie | Archetype::Drowned, ArchetypeState::Zombie(s)) => {
            Box::new(zombie::Zombie::restore(core, s))
        }
        (Archetype::Skeleton | Archetype::Blaze, ArchetypeState::Ranged(s)) => {
            Box::new(ranged::RangedAttacker::restore(core, s))
        }
        (archetype, _) => {
            return Err(SimError::Persistence(format!(
                "record for {} carries state of another archetype",
                archetype.as_str()
            )))
        }
    };
    Ok(actor)
}
