//! Projectile kinds and their per-kind parameters
//!
//! Pure data lives in a table (`KindParams`); the behaviour that is not
//! plain data (mid-flight splitting, leaving a burn patch) is carried by the
//! `Capability` tag so the update loop dispatches on it in one place.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{PlayerId, Tank};
use super::terrain::Terrain;
use crate::consts::*;
use crate::{heading_to_velocity, velocity_heading};

/// Ammunition kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Primary explosive shell
    #[default]
    Mortar,
    /// Splits into shards after a fixed flight time
    Cluster,
    /// Child of a cluster split; cannot split again
    ClusterShard,
    /// Incendiary; leaves a burning patch wherever it lands
    Napalm,
}

impl ProjectileKind {
    /// Next selectable ammunition (shards are never selectable)
    pub fn next_selectable(self) -> Self {
        match self {
            ProjectileKind::Mortar => ProjectileKind::Cluster,
            ProjectileKind::Cluster => ProjectileKind::Napalm,
            ProjectileKind::Napalm | ProjectileKind::ClusterShard => ProjectileKind::Mortar,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProjectileKind::Mortar => "Mortar",
            ProjectileKind::Cluster | ProjectileKind::ClusterShard => "Cluster",
            ProjectileKind::Napalm => "Napalm",
        }
    }

    pub fn params(self) -> &'static KindParams {
        match self {
            ProjectileKind::Mortar => &MORTAR,
            ProjectileKind::Cluster => &CLUSTER,
            ProjectileKind::ClusterShard => &CLUSTER_SHARD,
            ProjectileKind::Napalm => &NAPALM,
        }
    }
}

/// How an impact reshapes the ground
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroundEffect {
    /// Direct-impact crater (sqrt falloff, substrate pushed down)
    Crater { radius: f32, depth: f32 },
    /// Layered erosion (surface scarred, substrate lowered less)
    Erode { radius: f32, depth: f32 },
}

impl GroundEffect {
    pub fn radius(&self) -> f32 {
        match *self {
            GroundEffect::Crater { radius, .. } | GroundEffect::Erode { radius, .. } => radius,
        }
    }

    pub fn apply(&self, terrain: &mut Terrain, center_x: f32) {
        match *self {
            GroundEffect::Crater { radius, depth } => terrain.carve_crater(center_x, radius, depth),
            GroundEffect::Erode { radius, depth } => terrain.erode_layers(center_x, radius, depth),
        }
    }
}

/// Timed mid-flight split
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitSpec {
    /// Flight time before splitting (seconds)
    pub after: f32,
    pub child: ProjectileKind,
    pub children: usize,
    /// Angular step between children (radians)
    pub spread: f32,
    /// Child speed is parent speed times a factor in this range
    pub speed_jitter: (f32, f32),
}

/// Behaviour that is not plain data
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Capability {
    Plain,
    Splits(SplitSpec),
    /// Every terminal impact leaves a napalm patch as wide as its crater
    Ignites,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindParams {
    pub damage: i32,
    pub radius: f32,
    pub speed_scale: f32,
    /// Multiplier on damage dealt to scenery
    pub scenery_damage_scale: f32,
    pub on_terrain: GroundEffect,
    pub on_tank: GroundEffect,
    /// Extra ground effect at the impact column when hitting scenery
    pub on_scenery: Option<GroundEffect>,
    pub capability: Capability,
}

impl KindParams {
    pub fn ignites(&self) -> bool {
        matches!(self.capability, Capability::Ignites)
    }
}

pub const CLUSTER_SPLIT: SplitSpec = SplitSpec {
    after: 0.45,
    child: ProjectileKind::ClusterShard,
    children: 3,
    spread: 0.22,
    speed_jitter: (0.88, 1.02),
};

const MORTAR: KindParams = KindParams {
    damage: 24,
    radius: 3.2,
    speed_scale: 1.0,
    scenery_damage_scale: 1.0,
    on_terrain: GroundEffect::Crater { radius: 24.0, depth: 14.0 },
    on_tank: GroundEffect::Crater { radius: 22.0, depth: 12.0 },
    on_scenery: None,
    capability: Capability::Plain,
};

const CLUSTER: KindParams = KindParams {
    damage: 16,
    radius: 3.0,
    speed_scale: 0.95,
    scenery_damage_scale: 1.0,
    on_terrain: GroundEffect::Erode { radius: 18.0, depth: 8.0 },
    on_tank: GroundEffect::Erode { radius: 16.0, depth: 8.0 },
    on_scenery: None,
    capability: Capability::Splits(CLUSTER_SPLIT),
};

const CLUSTER_SHARD: KindParams = KindParams {
    damage: 12,
    radius: 2.2,
    speed_scale: 0.9,
    scenery_damage_scale: 1.0,
    on_terrain: GroundEffect::Erode { radius: 12.0, depth: 6.0 },
    on_tank: GroundEffect::Erode { radius: 16.0, depth: 8.0 },
    on_scenery: None,
    capability: Capability::Plain,
};

const NAPALM: KindParams = KindParams {
    damage: 18,
    radius: 3.8,
    speed_scale: 1.3,
    scenery_damage_scale: 0.7,
    on_terrain: GroundEffect::Crater { radius: 34.0, depth: 12.0 },
    on_tank: GroundEffect::Crater { radius: 32.0, depth: 11.0 },
    on_scenery: Some(GroundEffect::Crater { radius: 32.0, depth: 11.0 }),
    capability: Capability::Ignites,
};

/// A projectile in flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub kind: ProjectileKind,
    pub damage: i32,
    pub owner: PlayerId,
    pub alive: bool,
    /// Seconds since launch
    pub age: f32,
    /// Set once the projectile has split, and on anything that may never split
    pub spawned_children: bool,
}

impl Projectile {
    /// A projectile of `kind` at `pos` moving with `vel`
    pub fn new(kind: ProjectileKind, owner: PlayerId, pos: Vec2, vel: Vec2) -> Self {
        let params = kind.params();
        Self {
            pos,
            vel,
            radius: params.radius,
            kind,
            damage: params.damage,
            owner,
            alive: true,
            age: 0.0,
            spawned_children: !matches!(params.capability, Capability::Splits(_)),
        }
    }

    /// Launch the tank's selected ammunition from its muzzle
    pub fn launch_from(tank: &Tank) -> Self {
        let params = tank.selected.params();
        let speed = tank.launch_speed * params.speed_scale;
        let heading = tank.world_angle_deg().to_radians();
        let muzzle = tank.turret_pivot() + heading_to_velocity(heading, MUZZLE_LENGTH);
        Self::new(
            tank.selected,
            tank.id,
            muzzle,
            heading_to_velocity(heading, speed),
        )
    }

    /// Split parameters if this projectile is due to split now
    pub fn pending_split(&self) -> Option<SplitSpec> {
        match self.kind.params().capability {
            Capability::Splits(spec) if !self.spawned_children && self.age >= spec.after => {
                Some(spec)
            }
            _ => None,
        }
    }

    /// Fan of children around the current heading. The parent is marked dead.
    /// A parent with no usable velocity dies without children.
    pub fn split(&mut self, spec: &SplitSpec, rng: &mut impl Rng) -> Vec<Projectile> {
        self.alive = false;
        self.spawned_children = true;

        let (speed, heading) = velocity_heading(self.vel);
        if !speed.is_finite() || speed <= f32::EPSILON || spec.children == 0 {
            return Vec::new();
        }

        let mid = (spec.children as f32 - 1.0) * 0.5;
        (0..spec.children)
            .map(|i| {
                let angle = heading + spec.spread * (i as f32 - mid);
                let child_speed = speed * rng.random_range(spec.speed_jitter.0..spec.speed_jitter.1);
                let vel = Vec2::new(angle.cos(), angle.sin()) * child_speed;
                Projectile::new(spec.child, self.owner, self.pos, vel)
            })
            .collect()
    }

    /// Explicit Euler step under gravity
    pub fn integrate(&mut self, dt: f32) {
        self.vel.y += GRAVITY * dt;
        self.pos += self.vel * dt;
    }

    /// Fully off the left/right edge or below the bottom of the world
    pub fn out_of_bounds(&self) -> bool {
        self.pos.x + self.radius < 0.0
            || self.pos.x - self.radius > WORLD_WIDTH as f32
            || self.pos.y - self.radius > WORLD_HEIGHT
    }
}
