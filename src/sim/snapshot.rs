//! Read-only render snapshot
//!
//! Everything a renderer or HUD needs, copied out of the `GameState` so the
//! draw side never touches simulation internals. Never modifies the state.

use glam::Vec2;
use serde::Serialize;

use super::effects::{Explosion, NapalmPatch};
use super::projectile::{Projectile, ProjectileKind};
use super::rect::Rect;
use super::scenery::SceneryObject;
use super::state::{GameEvent, GameMode, GamePhase, GameState, PlayerId, Tank, TurnPhase};

#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub tick: u64,
    pub phase: GamePhase,
    pub mode: GameMode,
    pub current_player: PlayerId,
    pub turn_phase: TurnPhase,
    pub winner: Option<PlayerId>,
    pub surface: Vec<i32>,
    pub substrate: Vec<i32>,
    pub tanks: Vec<TankView>,
    pub projectiles: Vec<ProjectileView>,
    pub explosions: Vec<ExplosionView>,
    pub scenery: Vec<SceneryView>,
    pub napalm: Vec<NapalmView>,
    pub events: Vec<GameEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TankView {
    pub id: PlayerId,
    pub rect: Rect,
    pub turret_angle_deg: f32,
    pub facing_right: bool,
    pub launch_speed: f32,
    pub hp: i32,
    pub selected: ProjectileKind,
    pub ammo_name: &'static str,
    pub exploding: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileView {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: ProjectileKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplosionView {
    pub pos: Vec2,
    pub timer_ratio: f32,
    pub max_radius: f32,
    pub tank_explosion: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneryView {
    pub rect: Rect,
    pub health_ratio: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct NapalmView {
    pub pos: Vec2,
    pub current_radius: f32,
    pub timer_ratio: f32,
}

impl GameState {
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            tick: self.time_ticks,
            phase: self.phase,
            mode: self.mode,
            current_player: self.turn.current,
            turn_phase: self.turn.phase(),
            winner: self.winner,
            surface: self.terrain.surface().to_vec(),
            substrate: self.terrain.substrate().to_vec(),
            tanks: self.tanks.iter().map(tank_view).collect(),
            projectiles: self
                .projectiles
                .iter()
                .filter(|p| p.alive)
                .map(projectile_view)
                .collect(),
            explosions: self.explosions.iter().map(explosion_view).collect(),
            scenery: self
                .scenery
                .iter()
                .filter(|s| s.alive)
                .map(scenery_view)
                .collect(),
            napalm: self.napalm.iter().map(napalm_view).collect(),
            events: self.events.clone(),
        }
    }
}

fn tank_view(tank: &Tank) -> TankView {
    TankView {
        id: tank.id,
        rect: tank.rect,
        turret_angle_deg: tank.turret_angle_deg,
        facing_right: tank.facing_right,
        launch_speed: tank.launch_speed,
        hp: tank.hp,
        selected: tank.selected,
        ammo_name: tank.selected.display_name(),
        exploding: tank.exploding,
    }
}

fn projectile_view(p: &Projectile) -> ProjectileView {
    ProjectileView {
        pos: p.pos,
        radius: p.radius,
        kind: p.kind,
    }
}

fn explosion_view(e: &Explosion) -> ExplosionView {
    ExplosionView {
        pos: e.pos,
        timer_ratio: e.timer_ratio(),
        max_radius: e.max_radius,
        tank_explosion: e.tank_explosion,
    }
}

fn scenery_view(s: &SceneryObject) -> SceneryView {
    SceneryView {
        rect: s.rect,
        health_ratio: s.health_ratio(),
    }
}

fn napalm_view(n: &NapalmPatch) -> NapalmView {
    NapalmView {
        pos: n.pos,
        current_radius: n.current_radius,
        timer_ratio: n.timer_ratio(),
    }
}
