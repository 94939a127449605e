//! Centralized simulation constants.
//!
//! Manager-level defaults live here so config defaults and the archetype
//! tables agree. Per-archetype tuning (speeds, radii, drops) stays in the
//! archetype profile table as the single source of truth.

// =====================================================
// Tick
// =====================================================

/// Default simulation rate in ticks per second
pub const DEFAULT_TICK_RATE: u32 = 20;

/// Default world seed
pub const DEFAULT_SEED: u64 = 42;

/// Lowest legal y coordinate; actors below it take void damage and are clamped
pub const DEFAULT_WORLD_FLOOR_Y: f32 = -64.0;

// =====================================================
// Spawn / despawn
// =====================================================

/// Seconds between two runs of the organic spawn policy
pub const SPAWN_COOLDOWN_SECS: f32 = 1.0;

/// Inner radius of the spawn annulus around each player
pub const SPAWN_MIN_RADIUS: f32 = 24.0;

/// Outer radius of the spawn annulus around each player
pub const SPAWN_MAX_RADIUS: f32 = 64.0;

/// Population caps per classification
pub const PASSIVE_CAP: u32 = 10;
pub const NEUTRAL_CAP: u32 = 5;
pub const HOSTILE_CAP: u32 = 20;

/// Probability a hostile spawn attempt proceeds at night
pub const HOSTILE_CHANCE_NIGHT: f32 = 0.8;

/// Probability a hostile spawn attempt proceeds during the day
pub const HOSTILE_CHANCE_DAY: f32 = 0.0;

/// Distance beyond which a despawn-eligible actor accrues out-of-range time
pub const DESPAWN_RADIUS: f32 = 128.0;

/// Accrued out-of-range seconds after which an eligible actor is removed
pub const DESPAWN_TIMEOUT_SECS: f32 = 30.0;

// =====================================================
// Projectiles
// =====================================================

/// Distance at which a projectile counts as hitting a victim
pub const PROJECTILE_HIT_RADIUS: f32 = 0.6;

/// Downward acceleration applied to gravity-affected projectiles (blocks/s^2)
pub const PROJECTILE_GRAVITY: f32 = 20.0;

/// Fraction of velocity lost per second of flight
pub const PROJECTILE_DRAG: f32 = 0.01;

/// Fallback time-to-live for projectiles
pub const PROJECTILE_DEFAULT_TTL_SECS: f32 = 10.0;

/// Launch speeds above this are scaled down (blocks/s)
pub const PROJECTILE_MAX_SPEED: f32 = 100.0;

// =====================================================
// Actors
// =====================================================

/// Downward acceleration for ground actors (blocks/s^2)
pub const ACTOR_GRAVITY: f32 = 32.0;

/// Age after which babies become adults
pub const BABY_GROW_SECS: f32 = 1200.0;

/// Maximum breadth-first hops an alert travels through a pack
pub const DEFAULT_ALERT_HOPS: u32 = 3;

/// Distance at which two breeding partners mate
pub const MATE_RANGE: f32 = 1.5;

/// Seconds an actor stays in love mode after being fed
pub const LOVE_SECS: f32 = 30.0;

/// Cooldown before an actor can breed again
pub const BREED_COOLDOWN_SECS: f32 = 300.0;

/// Range at which passive actors notice a player holding their food
pub const TEMPT_RANGE: f32 = 10.0;

/// Reach of a melee attack
pub const MELEE_RANGE: f32 = 1.8;

/// Fastest an actor may fall (blocks/s)
pub const TERMINAL_FALL_SPEED: f32 = 60.0;

/// Cells scanned below the feet when looking for a supporting block
pub const SUPPORT_SCAN_DEPTH: i32 = 4;

/// Upper bound on the cells scanned for support in one step
pub const MAX_SUPPORT_SCAN: i32 = 64;

/// Damage per second from burning in daylight
pub const SUNLIGHT_DAMAGE_PER_SEC: f32 = 1.0;

/// Damage per second for water mobs stranded on land
pub const SUFFOCATION_DAMAGE_PER_SEC: f32 = 1.0;

/// Damage taken each tick an actor sits below the world floor
pub const VOID_DAMAGE: f32 = 4.0;

/// Chance per second an idle actor starts wandering
pub const WANDER_CHANCE_PER_SEC: f32 = 0.2;

/// Maximum distance of a wander destination
pub const WANDER_RADIUS: f32 = 8.0;

/// Speed multiplier while fleeing
pub const FLEE_SPEED_FACTOR: f32 = 1.5;

/// Seconds between two melee swings
pub const MELEE_COOLDOWN_SECS: f32 = 1.0;
