//! Bevy host integration.
//!
//! The simulation stays a plain struct; the plugin only stores it in a
//! resource and drives `Simulation::tick` from the fixed-step schedule.

use bevy::prelude::*;
use std::sync::{Arc, RwLock};

use crate::config::SimConfig;
use crate::logging::TimingSpan;
use crate::manager::{EntityManager, TickReport};
use crate::player::Players;
use crate::world::{GameWorld, SandboxWorld};

/// Manager plus the collaborators it ticks against
pub struct Simulation {
    pub manager: EntityManager,
    pub world: Box<dyn GameWorld + Send + Sync>,
    pub players: Players,
}

impl Simulation {
    pub fn new(config: SimConfig, world: Box<dyn GameWorld + Send + Sync>) -> Self {
        Self {
            manager: EntityManager::new(config),
            world,
            players: Players::new(),
        }
    }

    /// Advance the world clock, then the entities
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let _span = TimingSpan::new("simulation_tick");
        self.world.advance_time(dt);
        self.manager.tick(self.world.as_mut(), &mut self.players, dt)
    }
}

#[derive(Resource, Clone)]
pub struct SimulationResource(pub Arc<RwLock<Simulation>>);

/// Last tick's report, for systems that react to deaths and spawns
#[derive(Resource, Default, Debug)]
pub struct LastTickReport(pub TickReport);

/// Builds the world the simulation ticks against
pub type WorldFactory = Box<dyn Fn() -> Box<dyn GameWorld + Send + Sync> + Send + Sync>;

pub struct EntitySimPlugin {
    pub config: SimConfig,
    pub world: WorldFactory,
}

impl EntitySimPlugin {
    /// Plugin over a flat sandbox world
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            world: Box::new(|| Box::new(SandboxWorld::flat(64))),
        }
    }

    /// Tick against the host's own world instead of the sandbox
    pub fn with_world(
        mut self,
        factory: impl Fn() -> Box<dyn GameWorld + Send + Sync> + Send + Sync + 'static,
    ) -> Self {
        self.world = Box::new(factory);
        self
    }
}

impl Default for EntitySimPlugin {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl Plugin for EntitySimPlugin {
    fn build(&self, app: &mut App) {
        let simulation = Simulation::new(self.config.clone(), (self.world)());
        app.insert_resource(SimulationResource(Arc::new(RwLock::new(simulation))))
            .insert_resource(Time::<Fixed>::from_hz(f64::from(self.config.tick_rate.max(1))))
            .init_resource::<LastTickReport>()
            .add_systems(FixedUpdate, simulation_tick_system);
    }
}

/// Runs inside `FixedUpdate`, where `Time` is the fixed clock
fn simulation_tick_system(
    time: Res<Time>,
    sim_res: Res<SimulationResource>,
    mut last: ResMut<LastTickReport>,
) {
    if let Ok(mut sim) = sim_res.0.write() {
        last.0 = sim.tick(time.delta_secs());
    }
}
