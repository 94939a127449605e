//! Save/load through the filesystem

use bevy::math::Vec3;
use tempfile::tempdir;

use entity_core::actor::{Archetype, TargetRef};
use entity_core::config::SimConfig;
use entity_core::item::{ItemKind, ItemStack};
use entity_core::projectile::ProjectileKind;
use entity_core::world::SandboxWorld;
use entity_core::{
    EntityManager, Player, PlayerAction, PlayerId, Players, SaveData, SimError, SAVE_VERSION,
};

fn populated() -> (EntityManager, SandboxWorld, Players) {
    let mut config = SimConfig::default();
    config.spawn.caps.passive = 0;
    config.spawn.caps.neutral = 0;
    config.spawn.caps.hostile = 0;
    let mut manager = EntityManager::new(config);
    let mut world = SandboxWorld::flat(64).at_night();
    let mut players = Players::new();
    players.join(
        Player::new(PlayerId(1), "p", Vec3::new(3.5, 64.0, 0.5))
            .holding(ItemStack::new(ItemKind::Bone, 3)),
    );

    let wolf = manager.spawn(Archetype::Wolf, Vec3::new(0.5, 64.0, 0.5));
    for _ in 0..3 {
        manager
            .handle_player_interaction(PlayerId(1), wolf, PlayerAction::Use, &mut players)
            .unwrap();
    }
    let zombie = manager.spawn(Archetype::Zombie, Vec3::new(10.5, 64.0, 0.5));
    manager.equip(zombie, ItemStack::one(ItemKind::IronSword)).unwrap();
    manager.spawn(Archetype::Chicken, Vec3::new(-4.5, 64.0, 2.5));
    manager.spawn(Archetype::Blaze, Vec3::new(0.5, 67.0, 9.5));
    manager.launch_projectile(
        ProjectileKind::Arrow,
        Vec3::new(0.5, 80.0, 0.5),
        Vec3::new(0.0, 0.0, 5.0),
        2.0,
        Some(TargetRef::Actor(zombie)),
        &world,
    );
    for _ in 0..5 {
        manager.tick(&mut world, &mut players, 0.05);
    }
    (manager, world, players)
}

#[test]
fn save_and_reload_from_disk() {
    let (manager, _, _) = populated();
    let data = manager.serialize_all();
    let dir = tempdir().unwrap();
    let path = dir.path().join("entities.json");
    data.save_to_path(&path).unwrap();

    let loaded = SaveData::load_from_path(&path).unwrap();
    assert_eq!(loaded, data);

    let mut restored = EntityManager::new(SimConfig::default());
    restored.restore_all(loaded).unwrap();
    assert_eq!(restored.actor_count(), manager.actor_count());
    assert_eq!(restored.projectile_count(), manager.projectile_count());
    assert_eq!(restored.tick_count(), manager.tick_count());
    assert_eq!(restored.serialize_all(), data);
}

#[test]
fn restored_world_keeps_state_and_ids() {
    let (mut original, mut world, mut players) = populated();
    let mut restored = EntityManager::new(original.config().clone());
    restored.restore_all(original.serialize_all()).unwrap();

    let fresh_a = original.spawn(Archetype::Sheep, Vec3::ZERO);
    let fresh_b = restored.spawn(Archetype::Sheep, Vec3::ZERO);
    assert_eq!(fresh_a, fresh_b);
    assert!(original.actor_ids()[..original.actor_count() - 1]
        .iter()
        .all(|id| *id < fresh_b));

    for id in original.actor_ids() {
        let a = original.actor(id).unwrap();
        let b = restored.actor(id).unwrap();
        assert_eq!(a.classify(), b.classify());
        assert_eq!(a.held_item(), b.held_item());
        assert_eq!(a.core(), b.core());
    }

    // the restored manager keeps ticking on the restored state
    for _ in 0..10 {
        restored.tick(&mut world, &mut players, 0.05);
    }
    assert!(restored.actor_count() >= 4);
}

#[test]
fn newer_save_version_is_rejected() {
    let (manager, _, _) = populated();
    let mut data = manager.serialize_all();
    data.version = SAVE_VERSION + 1;
    let dir = tempdir().unwrap();
    let path = dir.path().join("future.json");
    data.save_to_path(&path).unwrap();
    assert!(matches!(
        SaveData::load_from_path(&path),
        Err(SimError::UnsupportedSaveVersion { .. })
    ));
}

#[test]
fn mismatched_record_rejected_without_partial_restore() {
    let (manager, _, _) = populated();
    let mut data = manager.serialize_all();
    let before = data.actors.len();
    // a wolf record relabelled as a sheep
    data.actors[0].core.archetype = Archetype::Sheep;
    let mut target = EntityManager::new(SimConfig::default());
    target.spawn(Archetype::Bat, Vec3::new(0.5, 70.0, 0.5));
    assert!(matches!(
        target.restore_all(data),
        Err(SimError::Persistence(_))
    ));
    assert_eq!(target.actor_count(), 1);
    assert!(before > 1);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = SaveData::load_from_path(&dir.path().join("nope.json"));
    assert!(matches!(err, Err(SimError::Io(_))));
}
