//! Headless entity simulation server.
//!
//! Usage: `entity-sim [config.ron|config.json]`

use anyhow::Context;
use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use std::path::PathBuf;
use std::time::Duration;

use entity_core::actor::Archetype;
use entity_core::config::SimConfig;
use entity_core::item::{ItemKind, ItemStack};
use entity_core::logging::{self, LoggingPlugin};
use entity_core::plugin::{EntitySimPlugin, LastTickReport, SimulationResource};
use entity_core::{Player, PlayerId};

fn main() -> anyhow::Result<()> {
    logging::init_tracing_default();

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => SimConfig::load(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimConfig::default(),
    };
    let tick = Duration::from_secs_f64(1.0 / f64::from(config.tick_rate.max(1)));
    tracing::info!(seed = config.seed, tick_rate = config.tick_rate, "starting entity-sim");

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(tick)))
        .add_plugins(LoggingPlugin)
        .add_plugins(EntitySimPlugin::new(config))
        .add_systems(Startup, populate)
        .add_systems(Update, report_population)
        .run();
    Ok(())
}

/// A demo player and a handful of mobs around the origin
fn populate(sim_res: Res<SimulationResource>) {
    let Ok(mut sim) = sim_res.0.write() else {
        return;
    };
    sim.players.join(
        Player::new(PlayerId(1), "demo", Vec3::new(0.5, 64.0, 0.5))
            .holding(ItemStack::new(ItemKind::Wheat, 16)),
    );
    let seeds = [
        (Archetype::Sheep, Vec3::new(6.5, 64.0, 2.5)),
        (Archetype::Sheep, Vec3::new(8.5, 64.0, 3.5)),
        (Archetype::Chicken, Vec3::new(-5.5, 64.0, 4.5)),
        (Archetype::Wolf, Vec3::new(12.5, 64.0, -6.5)),
        (Archetype::Wolf, Vec3::new(14.5, 64.0, -5.5)),
        (Archetype::Bat, Vec3::new(-3.5, 68.0, -8.5)),
    ];
    for (archetype, position) in seeds {
        sim.manager.spawn(archetype, position);
    }
    tracing::info!("seeded {} actors", sim.manager.actor_count());
}

fn report_population(sim_res: Res<SimulationResource>, last: Res<LastTickReport>) {
    let report = &last.0;
    if report.tick == 0 || report.tick % 200 != 0 {
        return;
    }
    if let Ok(sim) = sim_res.0.read() {
        tracing::info!(
            tick = report.tick,
            actors = sim.manager.actor_count(),
            projectiles = sim.manager.projectile_count(),
            "status"
        );
    }
}
