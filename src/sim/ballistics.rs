//! Per-tick projectile update
//!
//! Each live projectile either splits (a timed transformation, not a hit) or
//! integrates and is tested against the world in priority order. Terminal
//! impacts are resolved right here, including a tank death, so the match
//! result is never a tick stale.

use std::mem;

use super::collision::{self, Impact};
use super::effects::{Explosion, NapalmPatch};
use super::projectile::{GroundEffect, Projectile};
use super::scenery;
use super::state::{GameEvent, GamePhase, GameState, PlayerId};
use crate::consts::EXPLOSION_DURATION;

const SPLIT_FLASH_DURATION: f32 = 0.25;
const SPLIT_FLASH_RADIUS: f32 = 14.0;
const TERRAIN_BLAST_RADIUS: f32 = 24.0;
const TANK_BLAST_RADIUS: f32 = 26.0;
const SCENERY_BLAST_RADIUS: f32 = 20.0;
const SCENERY_BLAST_DURATION: f32 = EXPLOSION_DURATION * 0.8;
const TANK_DEATH_BLAST_RADIUS: f32 = 48.0;
const TANK_DEATH_ERODE_RADIUS: f32 = 36.0;
const TANK_DEATH_ERODE_DEPTH: f32 = 18.0;

/// Advance every projectile by `dt` and resolve whatever it hits
pub fn update_projectiles(state: &mut GameState, dt: f32) {
    let mut projectiles = mem::take(&mut state.projectiles);
    let mut spawned = Vec::new();

    for proj in projectiles.iter_mut().filter(|p| p.alive) {
        proj.age += dt;

        if let Some(spec) = proj.pending_split() {
            let children = proj.split(&spec, &mut state.rng);
            state
                .explosions
                .push(Explosion::new(proj.pos, SPLIT_FLASH_DURATION, SPLIT_FLASH_RADIUS));
            state.events.push(GameEvent::ProjectileSplit {
                pos: proj.pos,
                children: children.len(),
            });
            log::debug!("Cluster split into {} at ({:.0}, {:.0})", children.len(), proj.pos.x, proj.pos.y);
            spawned.extend(children);
            continue;
        }

        proj.integrate(dt);

        let tanks_targetable = state.phase == GamePhase::Playing;
        let Some(impact) =
            collision::classify(proj, &state.scenery, &state.terrain, &state.tanks, tanks_targetable)
        else {
            continue;
        };

        proj.alive = false;
        match impact {
            Impact::OutOfBounds => {}
            Impact::Scenery(idx) => hit_scenery(state, proj, idx),
            Impact::Terrain => hit_terrain(state, proj),
            Impact::Tank(target) => hit_tank(state, proj, target),
        }
    }

    projectiles.retain(|p| p.alive);
    projectiles.extend(spawned);
    state.projectiles = projectiles;
}

fn ignite(state: &mut GameState, proj: &Projectile, effect: &GroundEffect) {
    if proj.kind.params().ignites() {
        state.napalm.push(NapalmPatch::new(proj.pos, effect.radius()));
    }
}

fn hit_scenery(state: &mut GameState, proj: &Projectile, idx: usize) {
    let params = proj.kind.params();
    let amount = proj.damage as f32 * params.scenery_damage_scale;
    let Some(object) = state.scenery.get_mut(idx) else {
        return;
    };
    let destroyed = scenery::damage_scenery(
        object,
        amount,
        proj.pos,
        &mut state.terrain,
        &mut state.explosions,
    );
    state
        .explosions
        .push(Explosion::new(proj.pos, SCENERY_BLAST_DURATION, SCENERY_BLAST_RADIUS));
    if let Some(effect) = params.on_scenery {
        effect.apply(&mut state.terrain, proj.pos.x);
        ignite(state, proj, &effect);
    }
    state.events.push(GameEvent::SceneryHit {
        pos: proj.pos,
        destroyed,
    });
    log::debug!("{} hit tower {} for {:.1}", proj.kind.display_name(), idx, amount);
}

fn hit_terrain(state: &mut GameState, proj: &Projectile) {
    let effect = proj.kind.params().on_terrain;
    effect.apply(&mut state.terrain, proj.pos.x);
    ignite(state, proj, &effect);
    state
        .explosions
        .push(Explosion::new(proj.pos, EXPLOSION_DURATION, TERRAIN_BLAST_RADIUS));
    state.events.push(GameEvent::TerrainHit {
        pos: proj.pos,
        kind: proj.kind,
    });
    log::debug!("{} hit terrain at x={:.1}", proj.kind.display_name(), proj.pos.x);
}

fn hit_tank(state: &mut GameState, proj: &Projectile, target: PlayerId) {
    let tank = state.tank_mut(target);
    let killed = tank.take_damage(proj.damage);
    let hp = tank.hp;

    state
        .explosions
        .push(Explosion::new(proj.pos, EXPLOSION_DURATION, TANK_BLAST_RADIUS));
    let effect = proj.kind.params().on_tank;
    effect.apply(&mut state.terrain, proj.pos.x);
    ignite(state, proj, &effect);
    state.events.push(GameEvent::TankHit {
        target,
        damage: proj.damage,
        hp,
    });
    log::debug!("Player {} hit for {}, {} hp left", target.number(), proj.damage, hp);

    if killed {
        destroy_tank(state, target);
    }
}

/// Death sequence: tank blast, large erosion under the tank, match over
fn destroy_tank(state: &mut GameState, loser: PlayerId) {
    let tank = state.tank_mut(loser);
    tank.begin_exploding();
    let center = tank.center();
    state
        .explosions
        .push(Explosion::tank_death(center, TANK_DEATH_BLAST_RADIUS));
    state
        .terrain
        .erode_layers(center.x, TANK_DEATH_ERODE_RADIUS, TANK_DEATH_ERODE_DEPTH);
    state.end_match(loser);
}
