//! Steering and physics integration shared by every archetype.

use bevy::math::Vec3;

use super::{ActorCore, Habitat, TickContext};
use crate::constants::{ACTOR_GRAVITY, SUPPORT_SCAN_DEPTH, TERMINAL_FALL_SPEED, VOID_DAMAGE};
use crate::math::{block_of, direction, horizontal_direction, is_finite, sanitize, yaw_of};
use crate::world::GameWorld;

/// Set horizontal velocity toward `target`, keeping vertical velocity
pub fn steer_toward(core: &mut ActorCore, target: Vec3, speed: f32) {
    let dir = horizontal_direction(core.position, target);
    core.velocity.x = dir.x * speed;
    core.velocity.z = dir.z * speed;
    if dir != Vec3::ZERO {
        core.yaw = yaw_of(dir);
    }
}

/// Full 3D steering for swimmers and fliers
pub fn steer_toward_3d(core: &mut ActorCore, target: Vec3, speed: f32) {
    let dir = direction(core.position, target);
    core.velocity = dir * speed;
    if dir.x != 0.0 || dir.z != 0.0 {
        core.yaw = yaw_of(dir);
    }
}

pub fn steer_away(core: &mut ActorCore, threat: Vec3, speed: f32) {
    let away = core.position * 2.0 - threat;
    steer_toward(core, away, speed);
}

/// Kill horizontal motion
pub fn stop(core: &mut ActorCore) {
    core.velocity.x = 0.0;
    core.velocity.z = 0.0;
}

/// Launch velocity that reaches `to` from `from` at `speed`, lifted to
/// compensate for `gravity` over the flight time.
pub fn aim(from: Vec3, to: Vec3, speed: f32, gravity: f32) -> Vec3 {
    let dir = direction(from, to);
    if dir == Vec3::ZERO || speed <= 0.0 {
        return Vec3::ZERO;
    }
    let flight = from.distance(to) / speed;
    let mut velocity = dir * speed;
    velocity.y += 0.5 * gravity * flight;
    sanitize(velocity, Vec3::ZERO)
}

/// Daylight reaches this position and it is not shielded by water
pub fn sunlight_burn(core: &ActorCore, world: &dyn GameWorld) -> bool {
    let head = core.position + Vec3::Y;
    world.is_daytime() && !world.is_water_at(core.position) && world.sky_exposed(head)
}

pub fn in_water(core: &ActorCore, world: &dyn GameWorld) -> bool {
    world.is_water_at(core.position + Vec3::new(0.0, 0.2, 0.0))
}

/// Integrate one tick of motion for the habitat with default terminal speed
pub fn integrate(core: &mut ActorCore, ctx: &mut TickContext<'_>, habitat: Habitat) {
    integrate_with(core, ctx, habitat, TERMINAL_FALL_SPEED);
}

/// Integrate one tick of motion.
///
/// Ground actors (and water actors out of water) fall onto the first solid
/// block under their feet, so overhangs never lift them. Solid blocks at
/// head height stop horizontal motion, one-block steps are climbed, nothing
/// ends up below the world floor and non-finite values never survive.
pub fn integrate_with(
    core: &mut ActorCore,
    ctx: &mut TickContext<'_>,
    habitat: Habitat,
    terminal_fall: f32,
) {
    let dt = ctx.dt;
    if core.dead || dt <= 0.0 || !dt.is_finite() {
        return;
    }
    let start = sanitize(core.position, Vec3::new(0.0, ctx.floor_y, 0.0));
    let mut velocity = sanitize(core.velocity, Vec3::ZERO);

    let submerged = ctx.world.is_water_at(start + Vec3::new(0.0, 0.2, 0.0));
    let falls = match habitat {
        Habitat::Ground => !submerged,
        Habitat::Water => !submerged,
        Habitat::Air => false,
    };
    if falls {
        velocity.y = (velocity.y - ACTOR_GRAVITY * dt).max(-terminal_fall);
    } else if habitat == Habitat::Ground && submerged {
        // float up slowly
        velocity.y = velocity.y.max(-1.0) + 2.0 * dt;
    }

    let mut next = sanitize(start + velocity * dt, start);

    // a wall is anything solid at head height in the next cell, or a step
    // with no headroom above it
    let (nx, fy, nz) = block_of(Vec3::new(next.x, start.y, next.z));
    let solid = |dy: i32| ctx.world.block_at(nx, fy.saturating_add(dy), nz).is_solid();
    if solid(1) || (solid(0) && solid(2)) {
        next.x = start.x;
        next.z = start.z;
        velocity.x = 0.0;
        velocity.z = 0.0;
    }

    if habitat == Habitat::Water
        && submerged
        && next.y > start.y
        && !ctx.world.is_water_at(next + Vec3::new(0.0, 0.2, 0.0))
    {
        next.y = start.y;
        velocity.y = 0.0;
    }

    let top = start.y.max(next.y);
    let depth = ((top - next.y).ceil() as i32).saturating_add(SUPPORT_SCAN_DEPTH);
    let ground = ctx
        .world
        .support_below(Vec3::new(next.x, top, next.z), depth);
    if next.y < ground {
        next.y = ground;
        if velocity.y < 0.0 {
            velocity.y = 0.0;
        }
    }

    if next.y < ctx.floor_y {
        next.y = ctx.floor_y;
        velocity.y = 0.0;
        core.apply_damage(VOID_DAMAGE, 0.0);
    }

    core.position = sanitize(next, start);
    core.velocity = if is_finite(velocity) {
        velocity
    } else {
        Vec3::ZERO
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorView, Archetype};
    use crate::ids::ActorId;
    use crate::player::Players;
    use crate::seed::SimSeed;
    use crate::world::{BlockKind, SandboxWorld};

    fn run(core: &mut ActorCore, world: &mut SandboxWorld, habitat: Habitat, dt: f32) {
        let players = Players::new();
        let view = ActorView::default();
        let mut rng = SimSeed::new(0).rng("motion");
        let mut ctx = TickContext {
            world,
            players: &players,
            actors: &view,
            dt,
            rng: &mut rng,
            floor_y: -64.0,
        };
        integrate(core, &mut ctx, habitat);
    }

    #[test]
    fn test_ground_actor_falls_and_lands() {
        let mut world = SandboxWorld::flat(64);
        let mut core = ActorCore::new(ActorId(1), Archetype::Sheep, Vec3::new(0.5, 70.0, 0.5));
        for _ in 0..40 {
            run(&mut core, &mut world, Habitat::Ground, 0.05);
        }
        assert_eq!(core.position.y, 64.0);
        assert_eq!(core.velocity.y, 0.0);
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut world = SandboxWorld::flat(64);
        let mut core = ActorCore::new(ActorId(1), Archetype::Sheep, Vec3::new(0.5, 70.0, 0.5));
        core.velocity = Vec3::new(1.0, 0.0, 1.0);
        let before = core.clone();
        run(&mut core, &mut world, Habitat::Ground, 0.0);
        assert_eq!(core, before);
    }

    #[test]
    fn test_wall_blocks_horizontal_motion() {
        let mut world = SandboxWorld::flat(64);
        world.set_block(1, 64, 0, BlockKind::Stone);
        world.set_block(1, 65, 0, BlockKind::Stone);
        let mut core = ActorCore::new(ActorId(1), Archetype::Sheep, Vec3::new(0.9, 64.0, 0.5));
        core.velocity = Vec3::new(10.0, 0.0, 0.0);
        run(&mut core, &mut world, Habitat::Ground, 0.05);
        assert_eq!(core.position.x, 0.9);
    }

    #[test]
    fn test_actor_under_canopy_keeps_its_floor() {
        let mut world = SandboxWorld::flat(64);
        for x in -3..=3 {
            for z in -3..=3 {
                world.set_block(x, 70, z, BlockKind::Leaves);
            }
        }
        let mut core = ActorCore::new(ActorId(1), Archetype::Sheep, Vec3::new(0.5, 64.0, 0.5));
        core.velocity = Vec3::new(2.0, 0.0, 0.0);
        for _ in 0..10 {
            run(&mut core, &mut world, Habitat::Ground, 0.05);
            assert_eq!(core.position.y, 64.0);
        }
        assert!(core.position.x > 1.0, "roof must not stop walking");
    }

    #[test]
    fn test_climbs_single_step() {
        let mut world = SandboxWorld::flat(64);
        world.set_block(1, 64, 0, BlockKind::Stone);
        let mut core = ActorCore::new(ActorId(1), Archetype::Sheep, Vec3::new(0.9, 64.0, 0.5));
        core.velocity = Vec3::new(4.0, 0.0, 0.0);
        run(&mut core, &mut world, Habitat::Ground, 0.05);
        assert!(core.position.x > 1.0);
        assert_eq!(core.position.y, 65.0);
    }

    #[test]
    fn test_falls_into_dug_hole() {
        let mut world = SandboxWorld::flat(64);
        world.set_block(0, 63, 0, BlockKind::Air);
        world.set_block(0, 62, 0, BlockKind::Air);
        let mut core = ActorCore::new(ActorId(1), Archetype::Sheep, Vec3::new(0.5, 64.0, 0.5));
        for _ in 0..20 {
            run(&mut core, &mut world, Habitat::Ground, 0.05);
        }
        assert_eq!(core.position.y, 62.0);
    }

    #[test]
    fn test_non_finite_velocity_sanitized() {
        let mut world = SandboxWorld::flat(64);
        let mut core = ActorCore::new(ActorId(1), Archetype::Bat, Vec3::new(0.5, 70.0, 0.5));
        core.velocity = Vec3::new(f32::NAN, f32::INFINITY, 0.0);
        run(&mut core, &mut world, Habitat::Air, 0.05);
        assert!(is_finite(core.position));
        assert!(is_finite(core.velocity));
    }

    #[test]
    fn test_void_clamps_and_damages() {
        let mut world = SandboxWorld::flat(-200);
        let mut core = ActorCore::new(ActorId(1), Archetype::Zombie, Vec3::new(0.5, -63.0, 0.5));
        core.velocity = Vec3::new(0.0, -50.0, 0.0);
        run(&mut core, &mut world, Habitat::Ground, 0.05);
        assert_eq!(core.position.y, -64.0);
        assert!(core.health < core.max_health);
    }

    #[test]
    fn test_aim_compensates_gravity() {
        let flat = aim(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 20.0, 0.0);
        assert!((flat.x - 20.0).abs() < 1e-4);
        let lobbed = aim(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 20.0, 20.0);
        assert!(lobbed.y > 0.0);
        assert_eq!(aim(Vec3::ONE, Vec3::ONE, 20.0, 20.0), Vec3::ZERO);
    }

    #[test]
    fn test_sunlight_burn_needs_sky_and_day() {
        let mut world = SandboxWorld::flat(64);
        let core = ActorCore::new(ActorId(1), Archetype::Zombie, Vec3::new(0.5, 64.0, 0.5));
        assert!(sunlight_burn(&core, &world));
        world.set_block(0, 70, 0, BlockKind::Leaves);
        assert!(!sunlight_burn(&core, &world));
        world.set_daytime(false);
        assert!(!sunlight_burn(&core, &world));
    }
}
