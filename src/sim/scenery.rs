//! Destructible scenery (towers)
//!
//! Towers are placed by rejection sampling at match start, rest on the
//! terrain, soak up hits and scar the ground beneath them.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::effects::Explosion;
use super::rect::Rect;
use super::terrain::Terrain;
use crate::consts::{TANK1_START_X, TANK2_START_X, TANK_WIDTH, WORLD_WIDTH};

/// Towers requested per match
pub const TOWER_COUNT: usize = 3;
pub const TOWER_MAX_HEALTH: f32 = 120.0;

const PLACEMENT_ATTEMPTS: usize = 20;
const MIN_TOWER_SPACING: f32 = 110.0;
/// Towers keep this far from either tank's start center
const TANK_CLEAR_ZONE: f32 = 110.0;
/// Candidate centers stay this far from the world edges
const PLACEMENT_MARGIN: f32 = 80.0;
const EDGE_PADDING: f32 = 4.0;

const TOWER_WIDTH_MIN: f32 = 20.0;
const TOWER_WIDTH_MAX: f32 = 28.0;
const TOWER_HEIGHT_MIN: f32 = 78.0;
const TOWER_HEIGHT_MAX: f32 = 108.0;

/// Erosion carved under a destroyed tower
const COLLAPSE_RADIUS: f32 = 26.0;
const COLLAPSE_DEPTH: f32 = 14.0;
const COLLAPSE_FLASH_DURATION: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneryObject {
    pub rect: Rect,
    pub health: f32,
    pub max_health: f32,
    pub alive: bool,
}

impl SceneryObject {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            health: TOWER_MAX_HEALTH,
            max_health: TOWER_MAX_HEALTH,
            alive: true,
        }
    }

    /// A tower of the given size centered near `center_x`, kept inside the
    /// world and resting on the lower of the ground samples under its edges
    pub fn resting_on(terrain: &Terrain, center_x: f32, width: f32, height: f32) -> Self {
        let half = width * 0.5;
        let center = center_x.clamp(half + EDGE_PADDING, WORLD_WIDTH as f32 - half - EDGE_PADDING);
        let left = center - half;
        let support = terrain.height_at(left).min(terrain.height_at(left + width));
        Self::new(Rect::new(left, support - height, width, height))
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

fn tank_start_centers() -> [f32; 2] {
    [
        TANK1_START_X + TANK_WIDTH * 0.5,
        TANK2_START_X + TANK_WIDTH * 0.5,
    ]
}

fn valid_center(candidate: f32, chosen: &[f32]) -> bool {
    tank_start_centers()
        .iter()
        .all(|c| (candidate - c).abs() >= TANK_CLEAR_ZONE)
        && chosen
            .iter()
            .all(|c| (candidate - c).abs() >= MIN_TOWER_SPACING)
}

/// Place up to `count` towers. Each gets a bounded number of attempts;
/// the ones that never find room are skipped.
pub fn place_towers(terrain: &Terrain, rng: &mut impl Rng, count: usize) -> Vec<SceneryObject> {
    let mut centers: Vec<f32> = Vec::with_capacity(count);
    for _ in 0..count {
        for _ in 0..PLACEMENT_ATTEMPTS {
            let candidate = rng.random_range(PLACEMENT_MARGIN..WORLD_WIDTH as f32 - PLACEMENT_MARGIN);
            if valid_center(candidate, &centers) {
                centers.push(candidate);
                break;
            }
        }
    }

    if centers.len() < count {
        log::warn!("Placed {} of {} towers", centers.len(), count);
    }

    centers
        .into_iter()
        .map(|center| {
            let width = rng.random_range(TOWER_WIDTH_MIN..TOWER_WIDTH_MAX);
            let height = rng.random_range(TOWER_HEIGHT_MIN..TOWER_HEIGHT_MAX);
            SceneryObject::resting_on(terrain, center, width, height)
        })
        .collect()
}

/// Apply a hit to a tower. The ground under the impact is scarred whether or
/// not the tower survives. Returns true if this hit destroyed it.
pub fn damage_scenery(
    object: &mut SceneryObject,
    amount: f32,
    impact: Vec2,
    terrain: &mut Terrain,
    explosions: &mut Vec<Explosion>,
) -> bool {
    if !object.alive {
        return false;
    }
    object.health -= amount;
    let scar_radius = (object.rect.size.x * 0.25).max(10.0);
    let scar_depth = (amount * 0.15).max(2.0);
    terrain.erode_layers(impact.x, scar_radius, scar_depth);

    if object.health <= 0.0 {
        destroy_scenery(object, impact, terrain, explosions);
        true
    } else {
        false
    }
}

/// Knock a tower down: erode beneath it and flash at the impact point
pub fn destroy_scenery(
    object: &mut SceneryObject,
    impact: Vec2,
    terrain: &mut Terrain,
    explosions: &mut Vec<Explosion>,
) {
    if !object.alive {
        return;
    }
    object.alive = false;
    terrain.erode_layers(object.rect.center_x(), COLLAPSE_RADIUS, COLLAPSE_DEPTH);
    explosions.push(Explosion::new(
        impact,
        COLLAPSE_FLASH_DURATION,
        COLLAPSE_RADIUS + 6.0,
    ));
    log::debug!("Tower at x={:.0} destroyed", object.rect.center_x());
}
