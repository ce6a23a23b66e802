//! Bot opponent
//!
//! Deciding and animating are split: `plan_shot` is a pure function of the
//! shot geometry and a random source, and `BotController::update` servos the
//! turret and power toward the plan at human-like rates before firing.

use rand::Rng;

use super::projectile::ProjectileKind;
use super::state::Tank;
use crate::consts::{GRAVITY, MAX_LAUNCH_SPEED, MAX_TURRET_SWING, MIN_LAUNCH_SPEED, WORLD_WIDTH};

/// Seconds spent "thinking" before adjusting aim
const THINK_TIME_MIN: f32 = 1.0;
const THINK_TIME_MAX: f32 = 3.0;

const POWER_NOISE: f32 = 15.0;
const ANGLE_NOISE_DEG: f32 = 3.0;
/// Bot angles stay this far inside the turret swing
const ANGLE_MARGIN_DEG: f32 = 5.0;

/// Servo rates (per second) and the deadbands inside which no adjustment is made
const AIM_RATE_DEG: f32 = 60.0;
const POWER_RATE: f32 = 80.0;
const AIM_DEADBAND_DEG: f32 = 0.5;
const POWER_DEADBAND: f32 = 1.0;

/// Fire once both are this close to the plan
const AIM_TOLERANCE_DEG: f32 = 1.0;
const POWER_TOLERANCE: f32 = 3.0;

/// Geometry between the bot's tank and its target, center to center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Situation {
    pub dx: f32,
    /// Positive when the target sits lower on screen
    pub dy: f32,
    pub target_health: f32,
}

impl Situation {
    pub fn between(bot: &Tank, target: &Tank) -> Self {
        let d = target.center() - bot.center();
        Self {
            dx: d.x,
            dy: d.y,
            target_health: target.health_ratio(),
        }
    }
}

/// Where the bot wants its controls to end up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotPlan {
    pub angle_deg: f32,
    pub power: f32,
    pub ammo: ProjectileKind,
}

/// Power proportional to horizontal distance across the world
pub fn distance_power(dx: f32) -> f32 {
    MIN_LAUNCH_SPEED + (dx.abs() / WORLD_WIDTH as f32) * (MAX_LAUNCH_SPEED - MIN_LAUNCH_SPEED)
}

/// Flat-ground elevation `0.5 * asin(g * |dx| / v^2)` in degrees, nudged
/// down 10% for a higher target and up 10% for a lower one
pub fn ballistic_angle(dx: f32, dy: f32, speed: f32) -> f32 {
    let speed_sq = speed * speed;
    if speed_sq <= 0.0 {
        return 45.0;
    }
    let attitude = if dy < 0.0 { 0.9 } else { 1.1 };
    let sin = (GRAVITY * dx.abs() / speed_sq * attitude).clamp(-1.0, 1.0);
    (sin.asin() * 0.5).to_degrees()
}

/// Health-weighted ammunition pick; `roll` is uniform in [0, 1)
pub fn choose_ammo(target_health: f32, roll: f32) -> ProjectileKind {
    if target_health > 0.7 {
        if roll > 0.6 {
            ProjectileKind::Cluster
        } else {
            ProjectileKind::Mortar
        }
    } else if target_health > 0.3 {
        if roll > 0.7 {
            ProjectileKind::Napalm
        } else if roll > 0.4 {
            ProjectileKind::Cluster
        } else {
            ProjectileKind::Mortar
        }
    } else if roll > 0.5 {
        ProjectileKind::Napalm
    } else {
        ProjectileKind::Cluster
    }
}

/// Noisy plan for the given geometry. Draws power noise, then angle noise,
/// then the ammo roll.
pub fn plan_shot(situation: &Situation, rng: &mut impl Rng) -> ShotPlan {
    let power = (distance_power(situation.dx) + rng.random_range(-POWER_NOISE..POWER_NOISE))
        .clamp(MIN_LAUNCH_SPEED, MAX_LAUNCH_SPEED);
    let angle = ballistic_angle(situation.dx, situation.dy, power)
        + rng.random_range(-ANGLE_NOISE_DEG..ANGLE_NOISE_DEG);
    let ammo = choose_ammo(situation.target_health, rng.random::<f32>());
    ShotPlan {
        angle_deg: angle.clamp(ANGLE_MARGIN_DEG, MAX_TURRET_SWING - ANGLE_MARGIN_DEG),
        power,
        ammo,
    }
}

/// Step `current` toward `target` by at most `rate * dt`, leaving it alone
/// inside the deadband
pub fn servo(current: f32, target: f32, rate: f32, deadband: f32, dt: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= deadband {
        return current;
    }
    current + (rate * dt).min(diff.abs()).copysign(diff)
}

#[derive(Debug, Clone, Default)]
pub struct BotController {
    think_timer: f32,
    think_duration: f32,
    plan: Option<ShotPlan>,
    ready: bool,
}

impl BotController {
    /// Reset for a fresh turn with a new thinking time
    pub fn begin_turn(&mut self, rng: &mut impl Rng) {
        *self = Self {
            think_duration: rng.random_range(THINK_TIME_MIN..THINK_TIME_MAX),
            ..Self::default()
        };
    }

    pub fn plan(&self) -> Option<ShotPlan> {
        self.plan
    }

    pub fn is_thinking(&self) -> bool {
        !self.ready
    }

    /// Think, then steer the tank's controls toward the plan. Returns true
    /// when the tank is lined up and the bot wants to fire.
    pub fn update(&mut self, tank: &mut Tank, situation: &Situation, dt: f32, rng: &mut impl Rng) -> bool {
        if !self.ready {
            self.think_timer += dt;
            self.plan = Some(plan_shot(situation, rng));
            if self.think_timer < self.think_duration {
                return false;
            }
            self.ready = true;
        }
        let Some(plan) = self.plan else {
            return false;
        };

        tank.turret_angle_deg = servo(tank.turret_angle_deg, plan.angle_deg, AIM_RATE_DEG, AIM_DEADBAND_DEG, dt)
            .clamp(0.0, MAX_TURRET_SWING);
        tank.launch_speed = servo(tank.launch_speed, plan.power, POWER_RATE, POWER_DEADBAND, dt)
            .clamp(MIN_LAUNCH_SPEED, MAX_LAUNCH_SPEED);
        tank.selected = plan.ammo;

        (plan.angle_deg - tank.turret_angle_deg).abs() < AIM_TOLERANCE_DEG
            && (plan.power - tank.launch_speed).abs() < POWER_TOLERANCE
    }
}
