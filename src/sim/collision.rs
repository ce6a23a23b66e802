//! Projectile hit detection
//!
//! Circles against rectangles and the terrain heightfield. Resolution of a
//! hit (damage, craters, explosions) happens in `ballistics`; this module
//! only decides what, if anything, a projectile struck this tick.

use glam::Vec2;

use super::projectile::Projectile;
use super::rect::Rect;
use super::scenery::SceneryObject;
use super::state::{PlayerId, Tank};
use super::terrain::Terrain;
use crate::consts::{HULL_DRAW_WIDTH, TURRET_DRAW_HEIGHT};

/// Horizontal growth of the tank hitbox beyond its footprint
pub const HITBOX_EXTRA_WIDTH: f32 = HULL_DRAW_WIDTH * 0.45;
/// Upward growth of the tank hitbox to cover the turret
pub const HITBOX_EXTRA_TOP: f32 = TURRET_DRAW_HEIGHT * 0.85;

/// What a projectile struck, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impact {
    OutOfBounds,
    /// Index into the scenery list
    Scenery(usize),
    Terrain,
    Tank(PlayerId),
}

/// Closest-point circle/rectangle overlap. A center inside the rectangle is
/// a hit.
#[inline]
pub fn circle_intersects_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = rect.clamp_point(center);
    center.distance_squared(closest) <= radius * radius
}

/// Hitbox used for projectile hits: wider than the footprint and extended
/// upward over the hull and turret silhouette
pub fn tank_hitbox(tank: &Tank) -> Rect {
    tank.rect.grown(HITBOX_EXTRA_WIDTH, HITBOX_EXTRA_TOP)
}

/// Whether the projectile's lower edge has reached the surface at its column
#[inline]
pub fn touches_terrain(projectile: &Projectile, terrain: &Terrain) -> bool {
    terrain.height_at(projectile.pos.x) <= projectile.pos.y + projectile.radius
}

/// First thing the projectile hits this tick: out of bounds, then living
/// scenery, then terrain, then a tank other than its owner. Tanks are only
/// considered while `tanks_targetable` is set.
pub fn classify(
    projectile: &Projectile,
    scenery: &[SceneryObject],
    terrain: &Terrain,
    tanks: &[Tank],
    tanks_targetable: bool,
) -> Option<Impact> {
    if projectile.out_of_bounds() {
        return Some(Impact::OutOfBounds);
    }

    if let Some(idx) = scenery
        .iter()
        .position(|s| s.alive && circle_intersects_rect(projectile.pos, projectile.radius, &s.rect))
    {
        return Some(Impact::Scenery(idx));
    }

    if touches_terrain(projectile, terrain) {
        return Some(Impact::Terrain);
    }

    if !tanks_targetable {
        return None;
    }
    tanks
        .iter()
        .filter(|t| t.id != projectile.owner)
        .find(|t| circle_intersects_rect(projectile.pos, projectile.radius, &tank_hitbox(t)))
        .map(|t| Impact::Tank(t.id))
}
