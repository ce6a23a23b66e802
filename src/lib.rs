//! Tank Duel - a two-tank artillery duel on destructible terrain
//!
//! Core modules:
//! - `sim`: Simulation (terrain, ballistics, collisions, turn/match state)
//! - `settings`: Runner configuration loaded from JSON

pub mod settings;
pub mod sim;

pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta fed into the accumulator
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Logical world dimensions (one terrain column per unit of width)
    pub const WORLD_WIDTH: usize = 640;
    pub const WORLD_HEIGHT: f32 = 384.0;

    /// Launch speed (power) range
    pub const DEFAULT_LAUNCH_SPEED: f32 = 160.0;
    pub const MIN_LAUNCH_SPEED: f32 = 90.0;
    pub const MAX_LAUNCH_SPEED: f32 = 260.0;
    /// Power change per second while the key is held
    pub const POWER_ADJUST_RATE: f32 = 110.0;

    /// Turret swing in degrees per second
    pub const TURRET_ROT_SPEED: f32 = 120.0;
    /// Turret angle is clamped to [0, MAX_TURRET_SWING]
    pub const MAX_TURRET_SWING: f32 = 90.0;
    pub const DEFAULT_TURRET_ANGLE: f32 = 45.0;

    pub const TANK_HP: i32 = 100;
    pub const RELOAD_TIME: f32 = 0.45;
    /// Projectile gravity (units/s²)
    pub const GRAVITY: f32 = 120.0;
    /// Tank settling gravity (units/s²)
    pub const TANK_GRAVITY: f32 = 260.0;

    /// Tank collision footprint
    pub const TANK_WIDTH: f32 = 9.0;
    pub const TANK_HEIGHT: f32 = 5.0;
    /// Start columns (left edge of the footprint)
    pub const TANK1_START_X: f32 = 56.0;
    pub const TANK2_START_X: f32 = WORLD_WIDTH as f32 - 72.0;

    /// Drawn hull/turret extents, used to grow the tank hitbox
    pub const TANK_SCALE: f32 = 0.28;
    pub const HULL_DRAW_WIDTH: f32 = 72.0 * TANK_SCALE;
    pub const TURRET_DRAW_HEIGHT: f32 = 24.0 * TANK_SCALE;
    /// Turret pivot sits this far above the top of the footprint
    pub const TURRET_PIVOT_OFFSET_Y: f32 = -1.4;
    pub const MUZZLE_LENGTH: f32 = 32.0 * TANK_SCALE;

    /// Seconds to wait after a shot before the turn is handed over
    pub const TURN_SETTLE_TIME: f32 = 3.0;
    /// Seconds between a tank's death and the reset/menu transition
    pub const MATCH_RESET_DELAY: f32 = 3.0;

    pub const EXPLOSION_DURATION: f32 = 0.45;
    pub const TANK_EXPLOSION_DURATION: f32 = 1.2;
    pub const NAPALM_BURN_DURATION: f32 = 1.2;
}

/// Velocity for a launch heading (radians, counter-clockwise from +X with
/// screen Y pointing down) and speed
#[inline]
pub fn heading_to_velocity(heading: f32, speed: f32) -> Vec2 {
    Vec2::new(heading.cos() * speed, -heading.sin() * speed)
}

/// Speed and screen-space heading (`atan2(vy, vx)`) of a velocity
#[inline]
pub fn velocity_heading(vel: Vec2) -> (f32, f32) {
    (vel.length(), vel.y.atan2(vel.x))
}
