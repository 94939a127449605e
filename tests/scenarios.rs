//! End-to-end scenarios driven through `EntityManager::tick`
//!
//! - Despawn: far eligible actor removed with zero drops; pause semantics
//! - Chain aggression through a wolf pack
//! - Spawn cap respected for a new player
//! - Projectile terrain blocking per kind
//! - Drops include the held item
//! - Breeding, conversion, disconnect tolerance
//! - Shade under overhangs, bounded projectile steps, biome spawning

use bevy::math::Vec3;

use entity_core::actor::{Archetype, Classification, Locomotion, TargetRef};
use entity_core::config::SimConfig;
use entity_core::item::{ItemKind, ItemStack};
use entity_core::projectile::ProjectileKind;
use entity_core::world::{Biome, BlockKind, GameWorld, SandboxWorld, WaterRegion};
use entity_core::{EntityManager, Player, PlayerAction, PlayerId, Players};

const P: PlayerId = PlayerId(1);

/// Config with organic spawning switched off
fn quiet_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.spawn.caps.passive = 0;
    config.spawn.caps.neutral = 0;
    config.spawn.caps.hostile = 0;
    config
}

fn one_player(pos: Vec3) -> Players {
    let mut players = Players::new();
    players.join(Player::new(P, "steve", pos));
    players
}

// ============================================================
// Despawn
// ============================================================

#[test]
fn far_eligible_actor_despawns_without_drops() {
    let mut manager = EntityManager::new(quiet_config());
    let mut world = SandboxWorld::flat(64).at_night();
    let mut players = one_player(Vec3::new(0.5, 64.0, 0.5));
    let id = manager.spawn(Archetype::Zombie, Vec3::new(300.5, 64.0, 0.5));
    let timeout = manager.config().despawn.timeout_secs as usize;

    for _ in 0..timeout - 1 {
        let report = manager.tick(&mut world, &mut players, 1.0);
        assert!(report.despawned.is_empty());
    }
    assert!(manager.actor(id).is_some());

    let report = manager.tick(&mut world, &mut players, 1.0);
    assert_eq!(report.despawned, vec![id]);
    assert!(report.died.is_empty());
    assert!(manager.actor(id).is_none());
    assert!(world.drops.is_empty(), "despawn must not drop items");
}

#[test]
fn returning_player_pauses_despawn_timer() {
    let mut manager = EntityManager::new(quiet_config());
    let mut world = SandboxWorld::flat(64);
    let mut players = one_player(Vec3::new(0.5, 64.0, 0.5));
    let id = manager.spawn(Archetype::Bat, Vec3::new(400.5, 67.0, 0.5));

    for _ in 0..20 {
        manager.tick(&mut world, &mut players, 1.0);
    }
    let before = manager.actor(id).unwrap().core().despawn.out_of_range_secs;
    assert_eq!(before, 20.0);

    // player walks over for a while
    for _ in 0..15 {
        let bat = manager.actor(id).unwrap().core().position;
        players.get_mut(P).unwrap().position = bat + Vec3::new(5.0, 0.0, 0.0);
        manager.tick(&mut world, &mut players, 1.0);
    }
    let paused = manager.actor(id).unwrap().core().despawn.out_of_range_secs;
    assert_eq!(paused, before, "timer paused, not reset");

    players.get_mut(P).unwrap().position = Vec3::new(0.5, 64.0, 0.5);
    for _ in 0..9 {
        manager.tick(&mut world, &mut players, 1.0);
    }
    assert!(manager.actor(id).is_some());
    let report = manager.tick(&mut world, &mut players, 1.0);
    assert_eq!(report.despawned, vec![id]);
}

#[test]
fn tamed_wolf_never_despawns() {
    let mut manager = EntityManager::new(quiet_config());
    let mut world = SandboxWorld::flat(64);
    let mut players = Players::new();
    players.join(
        Player::new(P, "owner", Vec3::new(1.5, 64.0, 0.5))
            .holding(ItemStack::new(ItemKind::Bone, 3)),
    );
    let wolf = manager.spawn(Archetype::Wolf, Vec3::new(0.5, 64.0, 0.5));
    for _ in 0..3 {
        manager
            .handle_player_interaction(P, wolf, PlayerAction::Use, &mut players)
            .unwrap();
    }
    assert_eq!(manager.actor(wolf).unwrap().classify(), Classification::Passive);

    players.get_mut(P).unwrap().position = Vec3::new(1000.0, 64.0, 0.5);
    for _ in 0..40 {
        manager.tick(&mut world, &mut players, 1.0);
    }
    assert!(manager.actor(wolf).is_some());
}

// ============================================================
// Chain aggression
// ============================================================

#[test]
fn damaged_wolf_alerts_nearby_pack_member() {
    let mut manager = EntityManager::new(quiet_config());
    let mut world = SandboxWorld::flat(64);
    let mut players = one_player(Vec3::new(0.5, 64.0, 4.5));
    let a = manager.spawn(Archetype::Wolf, Vec3::new(0.5, 64.0, 0.5));
    let b = manager.spawn(Archetype::Wolf, Vec3::new(5.5, 64.0, 0.5));
    let far = manager.spawn(Archetype::Wolf, Vec3::new(40.5, 64.0, 0.5));
    let sheep = manager.spawn(Archetype::Sheep, Vec3::new(3.5, 64.0, 0.5));
    assert!(manager.actor(b).unwrap().core().locomotion.is_free());

    let outcome = manager.handle_player_attack(P, a, 1.0, &players).unwrap();
    assert!(!outcome.died);
    manager.tick(&mut world, &mut players, 0.05);

    let b_core = manager.actor(b).unwrap().core();
    assert_eq!(b_core.target(), Some(TargetRef::Player(P)));
    assert!(matches!(b_core.locomotion, Locomotion::Follow { .. }));
    assert_eq!(manager.actor(far).unwrap().core().target(), None);
    assert_eq!(manager.actor(sheep).unwrap().core().target(), None);
}

#[test]
fn alert_travels_through_pack_hops() {
    let mut manager = EntityManager::new(quiet_config());
    let mut world = SandboxWorld::flat(64);
    let mut players = one_player(Vec3::new(0.5, 64.0, 4.5));
    let a = manager.spawn(Archetype::Wolf, Vec3::new(0.5, 64.0, 0.5));
    // each wolf is 7 blocks from the previous one, 14 from the origin
    let b = manager.spawn(Archetype::Wolf, Vec3::new(7.5, 64.0, 0.5));
    let c = manager.spawn(Archetype::Wolf, Vec3::new(14.5, 64.0, 0.5));

    manager.handle_player_attack(P, a, 1.0, &players).unwrap();
    manager.tick(&mut world, &mut players, 0.05);

    assert_eq!(manager.actor(b).unwrap().core().target(), Some(TargetRef::Player(P)));
    assert_eq!(manager.actor(c).unwrap().core().target(), Some(TargetRef::Player(P)));
}

// ============================================================
// Spawn cap
// ============================================================

#[test]
fn passive_cap_blocks_spawns_for_new_player() {
    let mut config = SimConfig::default();
    config.spawn.caps.passive = 3;
    config.spawn.caps.neutral = 0;
    config.spawn.caps.hostile = 0;
    config.spawn.attempts_per_player = 10;
    let mut manager = EntityManager::new(config);
    let world = SandboxWorld::flat(64);
    for x in 0..3 {
        manager.spawn(Archetype::Sheep, Vec3::new(x as f32 + 0.5, 64.0, 0.5));
    }
    assert_eq!(manager.population(Classification::Passive), 3);

    let players = one_player(Vec3::new(100.5, 64.0, 100.5));
    let spawned = manager.run_spawn_policy(&world, &players);
    assert!(spawned.is_empty());
    assert_eq!(manager.population(Classification::Passive), 3);
}

#[test]
fn spawn_policy_fills_up_to_cap() {
    let mut config = SimConfig::default();
    config.spawn.caps.passive = 4;
    config.spawn.caps.neutral = 0;
    config.spawn.caps.hostile = 0;
    config.spawn.attempts_per_player = 50;
    let mut manager = EntityManager::new(config);
    let world = SandboxWorld::flat(64);
    let players = one_player(Vec3::new(0.5, 64.0, 0.5));
    let spawned = manager.run_spawn_policy(&world, &players);
    assert_eq!(spawned.len(), 4);
    assert_eq!(manager.population(Classification::Passive), 4);
    assert!(manager.run_spawn_policy(&world, &players).is_empty());
}

#[test]
fn nether_spawns_only_blazes() {
    let mut config = SimConfig::default();
    config.spawn.caps.passive = 5;
    config.spawn.caps.neutral = 5;
    config.spawn.caps.hostile = 2;
    config.spawn.hostile_chance_night = 1.0;
    config.spawn.attempts_per_player = 50;
    let mut manager = EntityManager::new(config);
    let world = SandboxWorld::flat(64).at_night().with_biome(Biome::Nether);
    let players = one_player(Vec3::new(0.5, 64.0, 0.5));

    let spawned = manager.run_spawn_policy(&world, &players);
    assert_eq!(spawned.len(), 2);
    for id in spawned {
        assert_eq!(manager.actor(id).unwrap().archetype(), Archetype::Blaze);
    }
}

// ============================================================
// Projectiles and terrain
// ============================================================

#[test]
fn huge_velocity_arrow_finishes_in_one_tick() {
    let mut manager = EntityManager::new(quiet_config());
    let mut world = SandboxWorld::flat(64);
    let mut players = Players::new();
    let id = manager.launch_projectile(
        ProjectileKind::Arrow,
        Vec3::new(0.5, 70.0, 0.5),
        Vec3::new(1e30, 0.0, 0.0),
        2.0,
        None,
        &world,
    );
    let speed = manager.projectile(id).unwrap().velocity.length();
    assert!(speed <= manager.config().projectile.max_speed + 1e-3);

    manager.tick(&mut world, &mut players, 0.05);
    assert_eq!(manager.tick_count(), 1);
    if let Some(p) = manager.projectile(id) {
        assert!(p.position.is_finite());
        assert!(p.position.x < 10.0);
    }
}

fn walled_world() -> SandboxWorld {
    let mut world = SandboxWorld::flat(64);
    for y in 64..72 {
        for z in -2..=2 {
            world.set_block(5, y, z, BlockKind::Stone);
        }
    }
    world
}

#[test]
fn arrow_is_blocked_by_wall() {
    let mut manager = EntityManager::new(quiet_config());
    let mut world = walled_world();
    let mut players = one_player(Vec3::new(10.5, 64.0, 0.5));
    manager.launch_projectile(
        ProjectileKind::Arrow,
        Vec3::new(0.5, 64.9, 0.5),
        Vec3::new(24.0, 0.0, 0.0),
        3.0,
        None,
        &world,
    );
    for _ in 0..20 {
        manager.tick(&mut world, &mut players, 0.05);
    }
    assert_eq!(manager.projectile_count(), 0);
    assert_eq!(players.get(P).unwrap().health, 20.0);
}

#[test]
fn trident_is_blocked_by_wall() {
    let mut manager = EntityManager::new(quiet_config());
    let mut world = walled_world();
    let mut players = one_player(Vec3::new(10.5, 64.0, 0.5));
    manager.launch_projectile(
        ProjectileKind::Trident,
        Vec3::new(0.5, 64.9, 0.5),
        Vec3::new(20.0, 0.0, 0.0),
        8.0,
        None,
        &world,
    );
    for _ in 0..20 {
        manager.tick(&mut world, &mut players, 0.05);
    }
    assert_eq!(manager.projectile_count(), 0);
    assert_eq!(players.get(P).unwrap().health, 20.0);
}

#[test]
fn fireball_passes_through_wall() {
    let mut manager = EntityManager::new(quiet_config());
    let mut world = walled_world();
    let mut players = one_player(Vec3::new(10.5, 64.0, 0.5));
    manager.launch_projectile(
        ProjectileKind::Fireball,
        Vec3::new(0.5, 64.9, 0.5),
        Vec3::new(14.0, 0.0, 0.0),
        5.0,
        None,
        &world,
    );
    let mut hits = 0;
    for _ in 0..40 {
        hits += manager.tick(&mut world, &mut players, 0.05).projectile_hits;
    }
    assert_eq!(hits, 1);
    assert_eq!(manager.projectile_count(), 0);
    assert_eq!(players.get(P).unwrap().health, 15.0);
}

#[test]
fn shooter_is_never_its_own_victim() {
    let mut manager = EntityManager::new(quiet_config());
    let mut world = SandboxWorld::flat(64);
    let mut players = one_player(Vec3::new(0.5, 64.0, 0.5));
    let id = manager.launch_projectile(
        ProjectileKind::Fireball,
        Vec3::new(0.5, 64.9, 0.5),
        Vec3::new(2.0, 0.0, 0.0),
        5.0,
        Some(TargetRef::Player(P)),
        &world,
    );
    manager.tick(&mut world, &mut players, 0.05);
    assert!(manager.projectile(id).is_some());
    assert_eq!(players.get(P).unwrap().health, 20.0);
}

#[test]
fn skeleton_arrow_hits_player_in_open_field() {
    let mut manager = EntityManager::new(quiet_config());
    let mut world = SandboxWorld::flat(64).at_night();
    let mut players = one_player(Vec3::new(8.5, 64.0, 0.5));
    let skeleton = manager.spawn(Archetype::Skeleton, Vec3::new(0.5, 64.0, 0.5));
    manager.actor_mut(skeleton).unwrap().core_mut().locomotion = Locomotion::Follow {
        target: TargetRef::Player(P),
    };
    for _ in 0..40 {
        manager.tick(&mut world, &mut players, 0.05);
    }
    assert!(players.get(P).unwrap().health < 20.0);
}

// ============================================================
// Death and drops
// ============================================================

#[test]
fn zombie_drops_held_item_with_base_loot() {
    let mut manager = EntityManager::new(quiet_config());
    let mut world = SandboxWorld::flat(64).at_night();
    let mut players = one_player(Vec3::new(3.5, 64.0, 0.5));
    let zombie = manager.spawn(Archetype::Zombie, Vec3::new(0.5, 64.0, 0.5));
    assert!(manager
        .equip(zombie, ItemStack::one(ItemKind::IronSword))
        .unwrap());

    let mut outcome = manager.handle_player_attack(P, zombie, 5.0, &players).unwrap();
    while !outcome.died {
        outcome = manager.handle_player_attack(P, zombie, 5.0, &players).unwrap();
    }
    assert_eq!(outcome.health, 0.0);

    let report = manager.tick(&mut world, &mut players, 0.05);
    assert_eq!(report.died, vec![zombie]);
    assert_eq!(world.dropped(ItemKind::RottenFlesh), 1);
    assert_eq!(world.dropped(ItemKind::IronSword), 1);
}

#[test]
fn drops_happen_once() {
    let mut manager = EntityManager::new(quiet_config());
    let mut world = SandboxWorld::flat(64);
    let mut players = one_player(Vec3::new(3.5, 64.0, 0.5));
    let sheep = manager.spawn(Archetype::Sheep, Vec3::new(0.5, 64.0, 0.5));
    manager.handle_player_attack(P, sheep, 100.0, &players).unwrap();
    assert!(manager.handle_player_attack(P, sheep, 100.0, &players).unwrap().applied == 0.0);
    for _ in 0..3 {
        manager.tick(&mut world, &mut players, 0.05);
    }
    assert_eq!(world.dropped(ItemKind::Mutton), 1);
    assert_eq!(world.dropped(ItemKind::Wool), 1);
}

// ============================================================
// Breeding, conversion, disconnects
// ============================================================

#[test]
fn fed_sheep_breed_a_baby() {
    let mut manager = EntityManager::new(quiet_config());
    let mut world = SandboxWorld::flat(64);
    let mut players = Players::new();
    players.join(
        Player::new(P, "farmer", Vec3::new(1.0, 64.0, 2.0))
            .holding(ItemStack::new(ItemKind::Wheat, 4)),
    );
    let a = manager.spawn(Archetype::Sheep, Vec3::new(0.5, 64.0, 0.5));
    let b = manager.spawn(Archetype::Sheep, Vec3::new(1.5, 64.0, 0.5));
    for id in [a, b] {
        let result = manager
            .handle_player_interaction(P, id, PlayerAction::Use, &mut players)
            .unwrap();
        assert!(result.is_handled());
    }
    assert_eq!(players.get(P).unwrap().held.unwrap().count, 2);
    // move the farmer away so tempting does not pull them apart
    players.get_mut(P).unwrap().position = Vec3::new(50.0, 64.0, 50.0);

    let report = manager.tick(&mut world, &mut players, 0.05);
    assert_eq!(report.spawned.len(), 1);
    let baby = manager.actor(report.spawned[0]).unwrap();
    assert_eq!(baby.archetype(), Archetype::Sheep);
    assert!(baby.core().baby);
    assert!(baby.drops().is_empty());
    assert!(!manager.actor(a).unwrap().wants_mate());
    assert!(!manager.actor(b).unwrap().wants_mate());
    assert!(world.particles.iter().any(|(p, _)| {
        *p == entity_core::world::Particle::Heart
    }));

    // a second tick must not breed again
    let report = manager.tick(&mut world, &mut players, 0.05);
    assert!(report.spawned.is_empty());
}

#[test]
fn submerged_zombie_converts_keeping_id() {
    let mut manager = EntityManager::new(quiet_config());
    let mut world = SandboxWorld::flat(64).at_night().with_water(WaterRegion {
        min_x: -5,
        max_x: 5,
        min_z: -5,
        max_z: 5,
        floor_y: 54,
        surface_y: 64,
    });
    let mut players = Players::new();
    let zombie = manager.spawn(Archetype::Zombie, Vec3::new(0.5, 54.0, 0.5));
    manager.actor_mut(zombie).unwrap().take_damage(
        10.0,
        entity_core::actor::DamageSource::Environment(entity_core::actor::Hazard::Drowning),
    );
    let fraction = manager.actor(zombie).unwrap().core().health_fraction();
    assert!(fraction < 1.0);

    let mut converted = false;
    for _ in 0..20 {
        manager.tick(&mut world, &mut players, 1.0);
        let actor = manager.actor_mut(zombie).unwrap();
        if actor.archetype() == Archetype::Drowned {
            converted = true;
            break;
        }
        actor.core_mut().position = Vec3::new(0.5, 54.0, 0.5);
        actor.core_mut().velocity = Vec3::ZERO;
    }
    assert!(converted);
    let drowned = manager.actor(zombie).unwrap();
    assert_eq!(drowned.id(), zombie);
    assert!((drowned.core().health_fraction() - fraction).abs() < 1e-4);
    assert!(world.is_water_at(drowned.core().position + Vec3::Y));
}

#[test]
fn disconnected_player_is_dropped_as_target() {
    let mut manager = EntityManager::new(quiet_config());
    let mut world = SandboxWorld::flat(64).at_night();
    let mut players = one_player(Vec3::new(6.5, 64.0, 0.5));
    let zombie = manager.spawn(Archetype::Zombie, Vec3::new(0.5, 64.0, 0.5));
    manager.actor_mut(zombie).unwrap().core_mut().locomotion = Locomotion::Follow {
        target: TargetRef::Player(P),
    };
    manager.tick(&mut world, &mut players, 0.05);
    assert_eq!(manager.actor(zombie).unwrap().core().target(), Some(TargetRef::Player(P)));

    players.leave(P);
    manager.tick(&mut world, &mut players, 0.05);
    assert_eq!(manager.actor(zombie).unwrap().core().target(), None);
}

fn canopy_world() -> SandboxWorld {
    let mut world = SandboxWorld::flat(64);
    for x in -3..=3 {
        for z in -3..=3 {
            world.set_block(x, 70, z, BlockKind::Leaves);
        }
    }
    world
}

#[test]
fn shaded_zombie_stays_under_canopy_and_does_not_burn() {
    let mut manager = EntityManager::new(quiet_config());
    let mut world = canopy_world();
    assert!(world.is_daytime());
    let mut players = Players::new();
    let id = manager.spawn(Archetype::Zombie, Vec3::new(0.5, 64.0, 0.5));

    for _ in 0..3 {
        manager.tick(&mut world, &mut players, 0.05);
        let core = manager.actor(id).unwrap().core();
        assert_eq!(core.position.y, 64.0);
        assert_eq!(core.health, core.max_health);
    }
}

#[test]
fn zombie_in_the_open_burns_by_day() {
    let mut manager = EntityManager::new(quiet_config());
    let mut world = canopy_world();
    let mut players = Players::new();
    let id = manager.spawn(Archetype::Zombie, Vec3::new(20.5, 64.0, 20.5));

    for _ in 0..3 {
        manager.tick(&mut world, &mut players, 0.05);
    }
    let core = manager.actor(id).unwrap().core();
    assert_eq!(core.position.y, 64.0);
    assert!(core.health < core.max_health);
}

#[test]
fn same_seed_same_world() {
    let run = || {
        let mut config = SimConfig::default();
        config.seed = 7;
        let mut manager = EntityManager::new(config);
        let mut world = SandboxWorld::flat(64).at_night();
        let mut players = one_player(Vec3::new(0.5, 64.0, 0.5));
        for _ in 0..100 {
            manager.tick(&mut world, &mut players, 0.05);
        }
        serde_json::to_string(&manager.serialize_all()).unwrap()
    };
    assert_eq!(run(), run());
}
