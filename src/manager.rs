//! Entity manager: owns the actor and projectile registries and runs the
//! ordered tick.
//!
//! Per tick: snapshot, advance every live actor collecting events, dispatch
//! the queue, sweep dead and timed-out actors, step projectiles, and run
//! the spawn policy when its cooldown elapses. Registry mutation only
//! happens outside the advance loop.

use bevy::math::Vec3;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::actor::{
    self, Actor, ActorEvent, ActorView, Archetype, Classification, DamageSource, Interaction,
    TargetRef, TickContext,
};
use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::ids::{ActorId, IdAllocator, PlayerId, ProjectileId};
use crate::item::ItemStack;
use crate::math::{distance, sanitize};
use crate::persistence::{SaveData, SAVE_VERSION};
use crate::player::{PlayerAction, Players};
use crate::projectile::{step_projectiles, Projectile, ProjectileKind};
use crate::seed::{SimRng, SimSeed};
use crate::spawn::{update_despawn_timer, PopulationCounts, SpawnPolicy, SpawnTable};
use crate::world::{GameWorld, Particle, Sound};

/// An event together with the actor that produced it
#[derive(Debug, Clone, PartialEq)]
struct QueuedEvent {
    origin: ActorId,
    event: ActorEvent,
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub events_dispatched: usize,
    pub spawned: Vec<ActorId>,
    pub died: Vec<ActorId>,
    pub despawned: Vec<ActorId>,
    pub projectiles_removed: usize,
    pub projectile_hits: usize,
}

/// Result of a player hitting an actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackOutcome {
    pub died: bool,
    pub health: f32,
    pub applied: f32,
}

pub struct EntityManager {
    config: SimConfig,
    actors: BTreeMap<ActorId, Box<dyn Actor>>,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    ids: IdAllocator,
    spawn_table: SpawnTable,
    actor_rng: SimRng,
    spawn_rng: SimRng,
    /// Events raised outside a tick (player attacks, projectile hits),
    /// dispatched with the next tick's queue
    pending: VecDeque<QueuedEvent>,
    spawn_cooldown: f32,
    tick: u64,
}

impl std::fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager")
            .field("tick", &self.tick)
            .field("actors", &self.actors.len())
            .field("projectiles", &self.projectiles.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl EntityManager {
    pub fn new(config: SimConfig) -> Self {
        let seed = SimSeed::new(config.seed);
        let spawn_table = SpawnTable::from_entries(&config.spawn_table);
        tracing::info!(
            seed = config.seed,
            table_entries = spawn_table.len(),
            "entity manager created"
        );
        Self {
            spawn_cooldown: config.spawn.cooldown_secs,
            config,
            actors: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            ids: IdAllocator::default(),
            spawn_table,
            actor_rng: seed.rng("actors"),
            spawn_rng: seed.rng("spawn"),
            pending: VecDeque::new(),
            tick: 0,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    // =====================================================
    // Tick
    // =====================================================

    /// Advance everything one step
    pub fn tick(
        &mut self,
        world: &mut dyn GameWorld,
        players: &mut Players,
        dt: f32,
    ) -> TickReport {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.tick += 1;
        let span = tracing::info_span!("tick", tick = self.tick, dt);
        let _guard = span.enter();
        let mut report = TickReport {
            tick: self.tick,
            ..Default::default()
        };

        // 1. snapshot
        let view = ActorView::from_snapshots(self.actors.values().map(|a| a.snapshot()));
        let order: Vec<ActorId> = view.ids().collect();

        // 2. advance, collecting events
        let mut queue = std::mem::take(&mut self.pending);
        for id in order {
            let Some(actor) = self.actors.get_mut(&id) else {
                continue;
            };
            if actor.core().dead {
                continue;
            }
            let mut ctx = TickContext {
                world: &mut *world,
                players: &*players,
                actors: &view,
                dt,
                rng: &mut self.actor_rng,
                floor_y: self.config.world_floor_y,
            };
            if let Some(event) = actor.advance(&mut ctx) {
                queue.push_back(QueuedEvent { origin: id, event });
            }
        }

        // 3. dispatch
        while let Some(queued) = queue.pop_front() {
            report.events_dispatched += 1;
            self.dispatch(queued, world, players, &mut report);
        }

        // 4. sweep
        self.sweep(world, players, dt, &mut report);

        // 5. projectiles
        let projectile_report = step_projectiles(
            &mut self.projectiles,
            &mut self.actors,
            players,
            world,
            &self.config.projectile,
            dt,
        );
        report.projectiles_removed = projectile_report.removed.len();
        report.projectile_hits = projectile_report.impacts.len();
        for impact in &projectile_report.impacts {
            if let (TargetRef::Actor(victim), Some(shooter)) = (impact.victim, impact.shooter) {
                self.queue_retaliation_alert(victim, shooter);
            }
        }

        // 6. spawn policy
        self.spawn_cooldown -= dt;
        if self.spawn_cooldown <= 0.0 {
            self.spawn_cooldown = self.config.spawn.cooldown_secs;
            let spawned = self.run_spawn_policy(&*world, players);
            report.spawned.extend(spawned);
        }

        if !report.died.is_empty() || !report.despawned.is_empty() || !report.spawned.is_empty()
        {
            tracing::info!(
                died = report.died.len(),
                despawned = report.despawned.len(),
                spawned = report.spawned.len(),
                actors = self.actors.len(),
                "population changed"
            );
        }
        report
    }

    fn dispatch(
        &mut self,
        queued: QueuedEvent,
        world: &mut dyn GameWorld,
        players: &mut Players,
        report: &mut TickReport,
    ) {
        let QueuedEvent { origin, event } = queued;
        tracing::debug!(actor = %origin, event = event.kind(), "dispatching event");
        match event {
            ActorEvent::LaunchProjectile {
                kind,
                origin: from,
                velocity,
                damage,
            } => {
                self.launch_projectile(
                    kind,
                    from,
                    velocity,
                    damage,
                    Some(TargetRef::Actor(origin)),
                    &*world,
                );
            }
            ActorEvent::SpawnSibling {
                archetype,
                position,
                baby,
            } => {
                let id = self.spawn_with(archetype, position, baby);
                world.spawn_particle(Particle::Poof, position);
                report.spawned.push(id);
            }
            ActorEvent::Bred { partner, position } => {
                let Some(archetype) = self.actors.get(&origin).map(|a| a.archetype()) else {
                    return;
                };
                match self.actors.get_mut(&partner) {
                    Some(mate) if !mate.core().dead => mate.finish_mating(),
                    _ => {
                        tracing::debug!(actor = %origin, %partner, "mate vanished");
                        return;
                    }
                }
                let id = self.spawn_with(archetype, position, true);
                world.spawn_particle(Particle::Heart, position + Vec3::Y);
                report.spawned.push(id);
            }
            ActorEvent::Convert { into } => self.convert(origin, into, world),
            ActorEvent::LayItem { item, position } => world.drop_item(item, position),
            ActorEvent::AlertAllies { target } => self.propagate_alert(origin, target),
            ActorEvent::MeleeHit { target, damage } => {
                let alive = self.actors.get(&origin).is_some_and(|a| !a.core().dead);
                if !alive {
                    return;
                }
                match target {
                    TargetRef::Player(id) => {
                        if let Some(player) = players.get_mut(id) {
                            let applied = player.damage(damage);
                            if applied > 0.0 {
                                world.play_sound(Sound::Hurt, player.position);
                            }
                        }
                    }
                    TargetRef::Actor(id) => {
                        let applied = self
                            .actors
                            .get_mut(&id)
                            .map(|victim| victim.take_damage(damage, DamageSource::Actor(origin)))
                            .unwrap_or(0.0);
                        if applied > 0.0 {
                            self.queue_retaliation_alert(id, TargetRef::Actor(origin));
                        }
                    }
                }
            }
        }
    }

    /// Swap an actor for another archetype, keeping id, position and the
    /// health fraction
    fn convert(&mut self, id: ActorId, into: Archetype, world: &mut dyn GameWorld) {
        let Some(old) = self.actors.get(&id) else {
            return;
        };
        if old.core().dead {
            return;
        }
        let mut record = old.serialize();
        let fraction = record.core.health_fraction();
        let from = record.core.archetype;
        let profile = into.profile();
        record.core.archetype = into;
        record.core.max_health = profile.max_health;
        record.core.health = (profile.max_health * fraction).max(f32::MIN_POSITIVE);
        record.core.despawn.eligible = profile.despawn_eligible;
        record.core.go_idle();

        let converted = match actor::restore(record.clone()) {
            Ok(actor) => actor,
            Err(_) => {
                // archetype state does not carry over; start fresh
                let mut fresh = actor::create(into, id, record.core.position);
                *fresh.core_mut() = record.core;
                fresh
            }
        };
        world.spawn_particle(Particle::Smoke, converted.core().position + Vec3::Y);
        tracing::debug!(actor = %id, from = %from, into = %into, "converted");
        self.actors.insert(id, converted);
    }

    /// Breadth-first push of a target through same-archetype neighbours
    fn propagate_alert(&mut self, origin: ActorId, target: TargetRef) {
        let Some(source) = self.actors.get(&origin) else {
            return;
        };
        let archetype = source.archetype();
        let Some(radius) = archetype.profile().aggro.alert_radius() else {
            return;
        };
        let mut visited = BTreeSet::from([origin]);
        let mut frontier = vec![source.core().position];
        let mut alerted = 0usize;

        for _ in 0..self.config.alert.max_hops {
            if frontier.is_empty() {
                break;
            }
            let reached: Vec<ActorId> = self
                .actors
                .values()
                .filter(|a| {
                    a.archetype() == archetype
                        && a.core().is_alive()
                        && !visited.contains(&a.id())
                        && frontier
                            .iter()
                            .any(|p| distance(*p, a.core().position) <= radius)
                })
                .map(|a| a.id())
                .collect();
            frontier.clear();
            for id in reached {
                visited.insert(id);
                if let Some(ally) = self.actors.get_mut(&id) {
                    if ally.on_alert(target) {
                        alerted += 1;
                    }
                    frontier.push(ally.core().position);
                }
            }
        }
        if alerted > 0 {
            tracing::debug!(actor = %origin, ?target, alerted, "pack alerted");
        }
    }

    /// After an actor is hurt by someone, let its pack know
    fn queue_retaliation_alert(&mut self, victim: ActorId, attacker: TargetRef) {
        let Some(actor) = self.actors.get(&victim) else {
            return;
        };
        if actor.core().dead
            || actor.archetype().profile().aggro.alert_radius().is_none()
            || actor.core().target() != Some(attacker)
        {
            return;
        }
        self.pending.push_back(QueuedEvent {
            origin: victim,
            event: ActorEvent::AlertAllies { target: attacker },
        });
    }

    /// Remove dead actors (with drops) and timed-out far actors (without)
    fn sweep(
        &mut self,
        world: &mut dyn GameWorld,
        players: &Players,
        dt: f32,
        report: &mut TickReport,
    ) {
        let despawn = &self.config.despawn;
        let mut dead = Vec::new();
        let mut timed_out = Vec::new();
        for (id, actor) in self.actors.iter_mut() {
            if actor.core().dead {
                dead.push(*id);
                continue;
            }
            if !actor.despawn_eligible() {
                continue;
            }
            let position = actor.core().position;
            if update_despawn_timer(&mut actor.core_mut().despawn, position, players, despawn, dt)
            {
                timed_out.push(*id);
            }
        }

        for id in dead {
            let Some(actor) = self.actors.remove(&id) else {
                continue;
            };
            let position = actor.core().position;
            for stack in actor.drops() {
                if stack.count > 0 {
                    world.drop_item(stack, position);
                }
            }
            world.play_sound(Sound::Death, position);
            tracing::debug!(actor = %id, archetype = %actor.archetype(), "died");
            report.died.push(id);
        }
        for id in timed_out {
            if self.actors.remove(&id).is_some() {
                tracing::debug!(actor = %id, "despawned");
                report.despawned.push(id);
            }
        }
    }

    // =====================================================
    // Spawning
    // =====================================================

    pub fn spawn(&mut self, archetype: Archetype, position: Vec3) -> ActorId {
        self.spawn_with(archetype, position, false)
    }

    /// Spawn by archetype name; an unknown name is a hard error here
    pub fn spawn_named(&mut self, name: &str, position: Vec3) -> SimResult<ActorId> {
        let archetype: Archetype = name.parse()?;
        Ok(self.spawn(archetype, position))
    }

    fn spawn_with(&mut self, archetype: Archetype, position: Vec3, baby: bool) -> ActorId {
        let id = self.ids.next_actor();
        let position = sanitize(position, Vec3::ZERO);
        let mut actor = actor::create(archetype, id, position);
        actor.core_mut().baby = baby;
        tracing::trace!(actor = %id, %archetype, baby, "spawned");
        self.actors.insert(id, actor);
        id
    }

    /// Run organic spawning once, regardless of the cooldown
    pub fn run_spawn_policy(&mut self, world: &dyn GameWorld, players: &Players) -> Vec<ActorId> {
        let counts =
            PopulationCounts::from_classes(self.live_actors().map(|a| a.classify()));
        let policy = SpawnPolicy {
            config: &self.config.spawn,
            table: &self.spawn_table,
        };
        let planned = policy.run(world, players, counts, &mut self.spawn_rng);
        planned
            .into_iter()
            .map(|(archetype, position)| self.spawn(archetype, position))
            .collect()
    }

    /// Put an item in an actor's hand
    pub fn equip(&mut self, id: ActorId, stack: ItemStack) -> SimResult<bool> {
        let actor = self.actors.get_mut(&id).ok_or(SimError::ActorNotFound(id))?;
        Ok(actor.equip(stack))
    }

    // =====================================================
    // Projectiles
    // =====================================================

    pub fn launch_projectile(
        &mut self,
        kind: ProjectileKind,
        origin: Vec3,
        velocity: Vec3,
        damage: f32,
        shooter: Option<TargetRef>,
        world: &dyn GameWorld,
    ) -> ProjectileId {
        let id = self.ids.next_projectile();
        let projectile = Projectile::launch(
            id,
            kind,
            origin,
            velocity,
            damage,
            shooter,
            world,
            &self.config.projectile,
        );
        self.projectiles.insert(id, projectile);
        id
    }

    // =====================================================
    // Player-facing operations
    // =====================================================

    pub fn handle_player_attack(
        &mut self,
        player: PlayerId,
        actor_id: ActorId,
        damage: f32,
        players: &Players,
    ) -> SimResult<AttackOutcome> {
        if players.get(player).is_none() {
            return Err(SimError::PlayerNotFound(player));
        }
        let actor = self
            .actors
            .get_mut(&actor_id)
            .ok_or(SimError::ActorNotFound(actor_id))?;
        let applied = actor.take_damage(damage, DamageSource::Player(player));
        let outcome = AttackOutcome {
            died: actor.core().dead,
            health: actor.core().health,
            applied,
        };
        if applied > 0.0 {
            self.queue_retaliation_alert(actor_id, TargetRef::Player(player));
        }
        Ok(outcome)
    }

    /// Route a right-click to an actor and apply the resulting item moves
    pub fn handle_player_interaction(
        &mut self,
        player_id: PlayerId,
        actor_id: ActorId,
        action: PlayerAction,
        players: &mut Players,
    ) -> SimResult<Interaction> {
        let player = players
            .get(player_id)
            .ok_or(SimError::PlayerNotFound(player_id))?
            .clone();
        let actor = self
            .actors
            .get_mut(&actor_id)
            .ok_or(SimError::ActorNotFound(actor_id))?;
        if actor.core().dead {
            return Ok(Interaction::NotHandled);
        }
        let result = actor.interact(&player, action);
        if let Interaction::Handled { consume_held, give } = &result {
            if *consume_held > 0 {
                players.remove_held_item(player_id, *consume_held);
            }
            for stack in give {
                players.give_item(player_id, *stack);
            }
            tracing::debug!(player = %player_id, actor = %actor_id, ?action, "interaction handled");
        }
        Ok(result)
    }

    // =====================================================
    // Persistence
    // =====================================================

    pub fn serialize_all(&self) -> SaveData {
        SaveData {
            version: SAVE_VERSION,
            tick: self.tick,
            next_actor_id: self.ids.actor_counter(),
            next_projectile_id: self.ids.projectile_counter(),
            actors: self.actors.values().map(|a| a.serialize()).collect(),
            projectiles: self.projectiles.values().cloned().collect(),
        }
    }

    /// Replace every actor and projectile with the saved ones. Nothing is
    /// changed if any record is rejected.
    pub fn restore_all(&mut self, data: SaveData) -> SimResult<()> {
        if data.version > SAVE_VERSION {
            return Err(SimError::UnsupportedSaveVersion {
                found: data.version,
                supported: SAVE_VERSION,
            });
        }
        let mut ids = IdAllocator::from_counters(data.next_actor_id, data.next_projectile_id);
        let mut actors = BTreeMap::new();
        for record in data.actors {
            let id = record.core.id;
            if actors.contains_key(&id) {
                tracing::warn!(actor = %id, "duplicate actor record skipped");
                continue;
            }
            let restored = actor::restore(record)?;
            ids.observe_actor(id);
            actors.insert(id, restored);
        }
        let mut projectiles = BTreeMap::new();
        for projectile in data.projectiles {
            ids.observe_projectile(projectile.id);
            projectiles.insert(projectile.id, projectile);
        }
        tracing::info!(
            actors = actors.len(),
            projectiles = projectiles.len(),
            tick = data.tick,
            "restored"
        );
        self.actors = actors;
        self.projectiles = projectiles;
        self.ids = ids;
        self.tick = data.tick;
        self.pending.clear();
        Ok(())
    }

    // =====================================================
    // Accessors
    // =====================================================

    pub fn actor(&self, id: ActorId) -> Option<&dyn Actor> {
        self.actors.get(&id).map(|a| a.as_ref())
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Box<dyn Actor>> {
        self.actors.get_mut(&id)
    }

    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.actors.keys().copied().collect()
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    fn live_actors(&self) -> impl Iterator<Item = &Box<dyn Actor>> {
        self.actors.values().filter(|a| a.core().is_alive())
    }

    /// Live actors of a classification
    pub fn population(&self, classification: Classification) -> usize {
        self.live_actors()
            .filter(|a| a.classify() == classification)
            .count()
    }

    pub fn projectile(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }
}
