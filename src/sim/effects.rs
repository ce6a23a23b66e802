//! Short-lived visual effects: explosions and napalm patches
//!
//! Both age every tick. Explosions also act as the "something is still
//! happening" signal that keeps a turn open.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::GameState;
use crate::consts::{NAPALM_BURN_DURATION, TANK_EXPLOSION_DURATION};

/// Growth speed-up so patches reach full size before the burn ends
const NAPALM_GROWTH_BOOST: f32 = 1.4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    /// Seconds remaining
    pub timer: f32,
    pub duration: f32,
    pub max_radius: f32,
    /// Large death blast of a tank
    pub tank_explosion: bool,
}

impl Explosion {
    pub fn new(pos: Vec2, duration: f32, max_radius: f32) -> Self {
        Self {
            pos,
            timer: duration,
            duration,
            max_radius,
            tank_explosion: false,
        }
    }

    pub fn tank_death(pos: Vec2, max_radius: f32) -> Self {
        Self {
            tank_explosion: true,
            ..Self::new(pos, TANK_EXPLOSION_DURATION, max_radius)
        }
    }

    /// Remaining fraction of the lifetime, 1 when fresh
    pub fn timer_ratio(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (self.timer / self.duration).clamp(0.0, 1.0)
    }

    pub fn finished(&self) -> bool {
        self.timer <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NapalmPatch {
    pub pos: Vec2,
    /// Target radius
    pub radius: f32,
    pub current_radius: f32,
    /// Seconds of burn remaining
    pub timer: f32,
}

impl NapalmPatch {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            radius,
            current_radius: 0.0,
            timer: NAPALM_BURN_DURATION,
        }
    }

    pub fn timer_ratio(&self) -> f32 {
        (self.timer / NAPALM_BURN_DURATION).clamp(0.0, 1.0)
    }
}

pub fn update_explosions(explosions: &mut Vec<Explosion>, dt: f32) {
    for e in explosions.iter_mut() {
        e.timer -= dt;
    }
    explosions.retain(|e| !e.finished());
}

/// Grow every patch toward its target radius and burn down its timer
pub fn update_napalm(patches: &mut Vec<NapalmPatch>, dt: f32) {
    for patch in patches.iter_mut() {
        patch.timer -= dt;
        let growth = patch.radius / NAPALM_BURN_DURATION * dt * NAPALM_GROWTH_BOOST;
        patch.current_radius = (patch.current_radius + growth).min(patch.radius);
    }
    patches.retain(|p| p.timer > 0.0);
}

/// No live projectiles and no running explosions
pub fn all_effects_settled(state: &GameState) -> bool {
    state.projectiles.iter().all(|p| !p.alive) && state.explosions.iter().all(Explosion::finished)
}
