//! Fixed timestep simulation tick
//!
//! Drives the menu, the turn/match state machine, both tanks' controls and
//! every time-based effect.

use super::ai::Situation;
use super::ballistics;
use super::effects;
use super::state::{GameEvent, GameMode, GamePhase, GameState, PlayerId, Tank};
use crate::consts::*;

/// Key state for one tank during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlInput {
    pub aim_up: bool,
    pub aim_down: bool,
    pub power_up: bool,
    pub power_down: bool,
    /// Edge-triggered: a held key fires once
    pub fire: bool,
    /// Edge-triggered: a held key cycles once
    pub cycle_ammo: bool,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Indexed by `PlayerId::index`
    pub players: [ControlInput; 2],
    /// Mode picked on the menu
    pub start_match: Option<GameMode>,
}

impl TickInput {
    /// Input where only `player` presses anything
    pub fn for_player(player: PlayerId, controls: ControlInput) -> Self {
        let mut input = Self::default();
        input.players[player.index()] = controls;
        input
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();
    state.time_ticks += 1;

    match state.phase {
        GamePhase::Menu => {
            if let Some(mode) = input.start_match {
                state.start_match(mode);
            }
        }
        GamePhase::Playing => {
            update_controls(state, input, dt);
            ballistics::update_projectiles(state, dt);
            if state.phase == GamePhase::Playing {
                advance_turn(state, dt);
            }
        }
        GamePhase::MatchOver => {
            // Shells still in the air freeze until the field resets
            state.reset_timer -= dt;
            if state.reset_timer <= 0.0 {
                finish_match(state);
            }
        }
    }

    effects::update_explosions(&mut state.explosions, dt);
    effects::update_napalm(&mut state.napalm, dt);
    for tank in &mut state.tanks {
        tank.settle(&state.terrain, dt);
        tank.tick_timers(dt);
    }
}

/// Human keys or bot decisions for each tank. Only the tank whose turn it
/// is may act; edge latches track held keys for both.
fn update_controls(state: &mut GameState, input: &TickInput, dt: f32) {
    for player in PlayerId::ALL {
        let i = player.index();
        let active = state.turn.accepts_input(player);

        let wants_fire = if let Some(bot) = state.bots[i].as_mut() {
            if !active {
                continue;
            }
            let situation = Situation::between(&state.tanks[i], &state.tanks[player.other().index()]);
            bot.update(&mut state.tanks[i], &situation, dt, &mut state.rng)
        } else {
            drive_tank(&mut state.tanks[i], &input.players[i], active, dt)
        };

        if wants_fire {
            state.try_fire(player);
        }
    }
}

/// Apply one tank's keys. Returns true on a fresh fire press.
fn drive_tank(tank: &mut Tank, controls: &ControlInput, active: bool, dt: f32) -> bool {
    let fire_pressed = controls.fire && !tank.fire_held;
    let cycle_pressed = controls.cycle_ammo && !tank.ammo_switch_held;
    tank.fire_held = controls.fire;
    tank.ammo_switch_held = controls.cycle_ammo;

    if !active {
        return false;
    }

    if controls.aim_up {
        tank.adjust_aim(TURRET_ROT_SPEED * dt);
    }
    if controls.aim_down {
        tank.adjust_aim(-TURRET_ROT_SPEED * dt);
    }
    if controls.power_up {
        tank.adjust_power(POWER_ADJUST_RATE * dt);
    }
    if controls.power_down {
        tank.adjust_power(-POWER_ADJUST_RATE * dt);
    }
    if cycle_pressed {
        tank.selected = tank.selected.next_selectable();
    }
    fire_pressed
}

/// After a shot, hand the turn over when the settle timer runs out or
/// everything the shot caused has finished, whichever comes first
fn advance_turn(state: &mut GameState, dt: f32) {
    if !state.turn.waiting_for_end {
        return;
    }
    state.turn.settle_timer -= dt;
    if state.turn.settle_timer > 0.0 && !effects::all_effects_settled(state) {
        return;
    }

    state.turn.pass();
    let current = state.turn.current;
    if let Some(bot) = state.bots[current.index()].as_mut() {
        bot.begin_turn(&mut state.rng);
    }
    state.events.push(GameEvent::TurnChanged { current });
    log::info!("Player {}'s turn", current.number());
}

fn finish_match(state: &mut GameState) {
    if state.auto_rematch {
        state.reset_match();
    } else {
        state.phase = GamePhase::Menu;
        state.events.push(GameEvent::ReturnedToMenu);
        log::info!("Returning to menu");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects::Explosion;
    use crate::sim::projectile::{Projectile, ProjectileKind};
    use crate::sim::terrain::Terrain;
    use glam::Vec2;

    fn flat_match(mode: GameMode) -> GameState {
        let mut state = GameState::new(7);
        state.start_match(mode);
        state.terrain = Terrain::flat(300, 330);
        state.scenery.clear();
        for tank in &mut state.tanks {
            tank.place_on(&state.terrain);
        }
        state
    }

    fn fire(player: PlayerId) -> TickInput {
        TickInput::for_player(
            player,
            ControlInput {
                fire: true,
                ..Default::default()
            },
        )
    }

    fn count_events(state: &GameState, pred: impl Fn(&GameEvent) -> bool) -> usize {
        state.events.iter().filter(|e| pred(e)).count()
    }

    #[test]
    fn test_menu_waits_for_mode() {
        let mut state = GameState::new(1);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Menu);

        let input = TickInput {
            start_match: Some(GameMode::OnePlayer),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.mode, GameMode::OnePlayer);
        assert!(state.events.contains(&GameEvent::MatchStarted {
            mode: GameMode::OnePlayer
        }));
    }

    #[test]
    fn test_mortar_shot_craters_impact_column() {
        let mut state = flat_match(GameMode::TwoPlayer);
        tick(&mut state, &fire(PlayerId::One), SIM_DT);
        assert_eq!(state.projectiles.len(), 1);

        let mut impact = None;
        for _ in 0..1000 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            impact = state.events.iter().find_map(|e| match e {
                GameEvent::TerrainHit { pos, .. } => Some(*pos),
                _ => None,
            });
            if impact.is_some() {
                break;
            }
        }
        let impact = impact.expect("shell landed");
        assert!(state.projectiles.is_empty());
        assert_eq!(state.terrain.surface()[impact.x.round() as usize], 314);
    }

    #[test]
    fn test_cluster_shot_splits_into_three_shards() {
        let mut state = flat_match(GameMode::TwoPlayer);
        state.tanks[0].selected = ProjectileKind::Cluster;
        tick(&mut state, &fire(PlayerId::One), SIM_DT);

        let mut split = false;
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            if count_events(&state, |e| matches!(e, GameEvent::ProjectileSplit { .. })) > 0 {
                split = true;
                break;
            }
        }
        assert!(split);
        assert_eq!(state.projectiles.len(), 3);
        assert!(
            state
                .projectiles
                .iter()
                .all(|p| p.kind == ProjectileKind::ClusterShard && p.owner == PlayerId::One)
        );
    }

    #[test]
    fn test_direct_hit_to_zero_ends_match() {
        let mut state = flat_match(GameMode::TwoPlayer);
        state.tanks[1].hp = ProjectileKind::Mortar.params().damage;
        let target = &state.tanks[1];
        let above = Vec2::new(target.rect.center_x(), target.rect.top() - 6.0);
        state
            .projectiles
            .push(Projectile::new(ProjectileKind::Mortar, PlayerId::One, above, Vec2::ZERO));

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.is_match_over());
        assert_eq!(state.winner, Some(PlayerId::One));
        assert_eq!(state.tanks[1].hp, 0);
        assert!(state.tanks[1].exploding);
        assert!(state.events.contains(&GameEvent::MatchOver {
            winner: PlayerId::One
        }));
    }

    #[test]
    fn test_shells_freeze_once_match_is_over() {
        let mut state = flat_match(GameMode::TwoPlayer);
        state.tanks[1].hp = ProjectileKind::Mortar.params().damage;
        let target = &state.tanks[1];
        let above = Vec2::new(target.rect.center_x(), target.rect.top() - 6.0);
        let stray = Projectile::new(
            ProjectileKind::Mortar,
            PlayerId::One,
            Vec2::new(150.0, 50.0),
            Vec2::new(20.0, 0.0),
        );
        state.projectiles.push(stray);
        state
            .projectiles
            .push(Projectile::new(ProjectileKind::Mortar, PlayerId::One, above, Vec2::ZERO));

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.is_match_over());
        assert_eq!(state.projectiles.len(), 1);
        let frozen = state.projectiles[0].pos;

        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(state.is_match_over());
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].pos, frozen);
    }

    #[test]
    fn test_napalm_patch_grows_then_expires() {
        let mut state = flat_match(GameMode::TwoPlayer);
        state.tanks[0].selected = ProjectileKind::Napalm;
        tick(&mut state, &fire(PlayerId::One), SIM_DT);

        for _ in 0..1000 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            if !state.napalm.is_empty() {
                break;
            }
        }
        assert_eq!(state.napalm.len(), 1);
        let patch = state.napalm[0];
        // Created at zero, then aged once at the end of the impact tick
        let one_tick = patch.radius / NAPALM_BURN_DURATION * SIM_DT * 1.4;
        assert!((patch.current_radius - one_tick).abs() < 1e-5);

        let mut last = patch.current_radius;
        let mut ticks = 0;
        while !state.napalm.is_empty() {
            assert!(state.napalm[0].current_radius >= last);
            last = state.napalm[0].current_radius;
            tick(&mut state, &TickInput::default(), SIM_DT);
            ticks += 1;
            assert!(ticks < 200, "patch never expired");
        }
        assert_eq!(last, patch.radius);
    }

    #[test]
    fn test_one_turn_change_per_shot() {
        let mut state = flat_match(GameMode::TwoPlayer);
        // Fire held down (and mashing aim) the whole time
        let input = TickInput::for_player(
            PlayerId::One,
            ControlInput {
                fire: true,
                aim_up: true,
                ..Default::default()
            },
        );
        let mut shots = 0;
        let mut changes = 0;
        for _ in 0..(4.5 / SIM_DT) as usize {
            tick(&mut state, &input, SIM_DT);
            shots += count_events(&state, |e| matches!(e, GameEvent::ShotFired { .. }));
            changes += count_events(&state, |e| matches!(e, GameEvent::TurnChanged { .. }));
        }
        assert_eq!(shots, 1);
        assert_eq!(changes, 1);
        assert_eq!(state.turn.current, PlayerId::Two);
    }

    #[test]
    fn test_turn_passes_early_when_settled() {
        let mut state = flat_match(GameMode::TwoPlayer);
        tick(&mut state, &fire(PlayerId::One), SIM_DT);
        let mut ticks = 1;
        while state.turn.current == PlayerId::One {
            tick(&mut state, &TickInput::default(), SIM_DT);
            ticks += 1;
            assert!(ticks < 1000);
        }
        assert!((ticks as f32) * SIM_DT < TURN_SETTLE_TIME);
        assert!(effects::all_effects_settled(&state));
    }

    #[test]
    fn test_settle_timer_bounds_wait() {
        let mut state = flat_match(GameMode::TwoPlayer);
        tick(&mut state, &fire(PlayerId::One), SIM_DT);
        state.explosions.push(Explosion::new(Vec2::new(320.0, 100.0), 100.0, 4.0));

        let mut ticks = 1;
        while state.turn.current == PlayerId::One {
            tick(&mut state, &TickInput::default(), SIM_DT);
            ticks += 1;
            assert!(ticks < 1000);
        }
        let expected = (TURN_SETTLE_TIME / SIM_DT) as i32;
        assert!((ticks - expected).abs() <= 2, "turn changed after {ticks} ticks");
        assert!(!state.turn.waiting_for_end);
        assert!(!state.turn.shot_fired);
    }

    #[test]
    fn test_ammo_cycle_is_edge_triggered() {
        let mut state = flat_match(GameMode::TwoPlayer);
        let hold = TickInput::for_player(
            PlayerId::One,
            ControlInput {
                cycle_ammo: true,
                ..Default::default()
            },
        );
        for _ in 0..10 {
            tick(&mut state, &hold, SIM_DT);
        }
        assert_eq!(state.tanks[0].selected, ProjectileKind::Cluster);
        tick(&mut state, &TickInput::default(), SIM_DT);
        tick(&mut state, &hold, SIM_DT);
        assert_eq!(state.tanks[0].selected, ProjectileKind::Napalm);
    }

    #[test]
    fn test_only_current_player_controls() {
        let mut state = flat_match(GameMode::TwoPlayer);
        let input = TickInput::for_player(
            PlayerId::Two,
            ControlInput {
                aim_up: true,
                power_up: true,
                fire: true,
                cycle_ammo: true,
                ..Default::default()
            },
        );
        for _ in 0..30 {
            tick(&mut state, &input, SIM_DT);
        }
        let tank = &state.tanks[1];
        assert_eq!(tank.turret_angle_deg, DEFAULT_TURRET_ANGLE);
        assert_eq!(tank.launch_speed, DEFAULT_LAUNCH_SPEED);
        assert_eq!(tank.selected, ProjectileKind::Mortar);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_aim_and_power_are_level_triggered() {
        let mut state = flat_match(GameMode::TwoPlayer);
        let input = TickInput::for_player(
            PlayerId::One,
            ControlInput {
                aim_up: true,
                power_down: true,
                ..Default::default()
            },
        );
        for _ in 0..20 {
            tick(&mut state, &input, SIM_DT);
        }
        let held = 20.0 * SIM_DT;
        let tank = &state.tanks[0];
        assert!((tank.turret_angle_deg - (DEFAULT_TURRET_ANGLE + TURRET_ROT_SPEED * held)).abs() < 0.01);
        assert!((tank.launch_speed - (DEFAULT_LAUNCH_SPEED - POWER_ADJUST_RATE * held)).abs() < 0.01);
    }

    #[test]
    fn test_match_over_returns_to_menu() {
        let mut state = flat_match(GameMode::TwoPlayer);
        state.end_match(PlayerId::Two);
        let mut returned = false;
        for _ in 0..((MATCH_RESET_DELAY / SIM_DT) as usize + 5) {
            tick(&mut state, &TickInput::default(), SIM_DT);
            if state.events.contains(&GameEvent::ReturnedToMenu) {
                returned = true;
                break;
            }
        }
        assert!(returned);
        assert_eq!(state.phase, GamePhase::Menu);
    }

    #[test]
    fn test_auto_rematch_resets_field() {
        let mut state = flat_match(GameMode::OnePlayer);
        state.auto_rematch = true;
        state.tanks[1].hp = 0;
        state.end_match(PlayerId::Two);
        for _ in 0..((MATCH_RESET_DELAY / SIM_DT) as usize + 5) {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.matches_started, 2);
        assert_eq!(state.tanks[1].hp, TANK_HP);
        assert_eq!(state.winner, None);
        assert_eq!(state.turn.current, PlayerId::One);
    }

    #[test]
    fn test_bot_takes_its_turn() {
        let mut state = flat_match(GameMode::OnePlayer);
        tick(&mut state, &fire(PlayerId::One), SIM_DT);
        let mut bot_fired = false;
        for _ in 0..(12.0 / SIM_DT) as usize {
            tick(&mut state, &TickInput::default(), SIM_DT);
            if state.events.iter().any(|e| {
                matches!(
                    e,
                    GameEvent::ShotFired {
                        player: PlayerId::Two,
                        ..
                    }
                )
            }) {
                bot_fired = true;
                break;
            }
        }
        assert!(bot_fired);
    }

    #[test]
    fn test_determinism() {
        let run = || {
            let mut state = GameState::new(12345);
            state.auto_rematch = true;
            state.start_match(GameMode::Demo);
            for _ in 0..6000 {
                tick(&mut state, &TickInput::default(), SIM_DT);
            }
            state
        };
        let a = run();
        let b = run();
        assert_eq!(a.terrain.surface(), b.terrain.surface());
        assert_eq!(a.terrain.substrate(), b.terrain.substrate());
        assert_eq!(a.tanks[0].hp, b.tanks[0].hp);
        assert_eq!(a.tanks[1].hp, b.tanks[1].hp);
        assert_eq!(a.tanks[0].rect, b.tanks[0].rect);
        assert_eq!(a.projectiles, b.projectiles);
        assert_eq!(a.turn, b.turn);
        assert_eq!(a.matches_started, b.matches_started);
    }
}
