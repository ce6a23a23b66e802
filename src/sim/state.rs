//! Game state and core simulation types
//!
//! One `GameState` owns everything the simulation touches: both tanks, the
//! terrain, every ephemeral collection and the seeded RNG.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ai::BotController;
use super::effects::{Explosion, NapalmPatch};
use super::projectile::{Projectile, ProjectileKind};
use super::rect::Rect;
use super::scenery::{self, SceneryObject};
use super::terrain::Terrain;
use crate::consts::*;

/// One of the two tanks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    /// 1-based player number for display
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn other(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }
}

/// Who controls the tanks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Tank 2 is driven by the bot
    OnePlayer,
    #[default]
    TwoPlayer,
    /// Both tanks are driven by bots
    Demo,
}

impl GameMode {
    pub fn is_bot(self, player: PlayerId) -> bool {
        match self {
            GameMode::OnePlayer => player == PlayerId::Two,
            GameMode::TwoPlayer => false,
            GameMode::Demo => true,
        }
    }
}

/// Top-level screen/match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a mode to be picked
    Menu,
    /// Match in progress
    Playing,
    /// A tank died; counting down to reset
    MatchOver,
}

/// Phase of the current player's turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    Aiming,
    /// Shot is in the air; waiting for effects to settle
    ShotSettling,
}

/// Turn-order bookkeeping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Turn {
    pub current: PlayerId,
    pub waiting_for_end: bool,
    /// Seconds left before the turn is handed over regardless of effects
    pub settle_timer: f32,
    pub shot_fired: bool,
}

impl Default for Turn {
    fn default() -> Self {
        Self {
            current: PlayerId::One,
            waiting_for_end: false,
            settle_timer: 0.0,
            shot_fired: false,
        }
    }
}

impl Turn {
    pub fn phase(&self) -> TurnPhase {
        if self.waiting_for_end {
            TurnPhase::ShotSettling
        } else {
            TurnPhase::Aiming
        }
    }

    /// Whether `player` may aim and fire right now
    pub fn accepts_input(&self, player: PlayerId) -> bool {
        self.current == player && !self.waiting_for_end
    }

    fn begin_settling(&mut self) {
        self.shot_fired = true;
        self.waiting_for_end = true;
        self.settle_timer = TURN_SETTLE_TIME;
    }

    /// Hand the turn to the other player
    pub fn pass(&mut self) {
        self.current = self.current.other();
        self.waiting_for_end = false;
        self.shot_fired = false;
        self.settle_timer = 0.0;
    }
}

/// A player's tank
#[derive(Debug, Clone)]
pub struct Tank {
    pub id: PlayerId,
    /// Collision footprint
    pub rect: Rect,
    /// Turret elevation in degrees, relative to the facing direction
    pub turret_angle_deg: f32,
    pub reload_timer: f32,
    /// Launch power
    pub launch_speed: f32,
    pub vertical_velocity: f32,
    pub selected: ProjectileKind,
    pub hp: i32,
    pub facing_right: bool,
    pub exploding: bool,
    pub explosion_timer: f32,
    /// Edge-trigger latches for the held keys
    pub(crate) ammo_switch_held: bool,
    pub(crate) fire_held: bool,
}

impl Tank {
    pub fn new(id: PlayerId) -> Self {
        let start_x = match id {
            PlayerId::One => TANK1_START_X,
            PlayerId::Two => TANK2_START_X,
        };
        Self {
            id,
            rect: Rect::new(start_x, 0.0, TANK_WIDTH, TANK_HEIGHT),
            turret_angle_deg: DEFAULT_TURRET_ANGLE,
            reload_timer: 0.0,
            launch_speed: DEFAULT_LAUNCH_SPEED,
            vertical_velocity: 0.0,
            selected: ProjectileKind::Mortar,
            hp: TANK_HP,
            facing_right: id == PlayerId::One,
            exploding: false,
            explosion_timer: 0.0,
            ammo_switch_held: false,
            fire_held: false,
        }
    }

    /// Restore the match-start loadout at the start column, resting on the ground
    pub fn reset(&mut self, terrain: &Terrain) {
        *self = Tank::new(self.id);
        self.place_on(terrain);
    }

    /// Drop the tank straight onto the surface under its center
    pub fn place_on(&mut self, terrain: &Terrain) {
        let ground = terrain.height_at(self.rect.center_x());
        self.rect.pos.y = ground - self.rect.size.y;
        self.vertical_velocity = 0.0;
    }

    /// Launch angle in world degrees (mirrored when facing left)
    pub fn world_angle_deg(&self) -> f32 {
        if self.facing_right {
            self.turret_angle_deg
        } else {
            180.0 - self.turret_angle_deg
        }
    }

    pub fn turret_pivot(&self) -> Vec2 {
        Vec2::new(self.rect.center_x(), self.rect.top() + TURRET_PIVOT_OFFSET_Y)
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn health_ratio(&self) -> f32 {
        (self.hp as f32 / TANK_HP as f32).clamp(0.0, 1.0)
    }

    pub fn reload_ready(&self) -> bool {
        self.reload_timer <= 0.0
    }

    pub fn adjust_aim(&mut self, delta_deg: f32) {
        self.turret_angle_deg = (self.turret_angle_deg + delta_deg).clamp(0.0, MAX_TURRET_SWING);
    }

    pub fn adjust_power(&mut self, delta: f32) {
        self.launch_speed = (self.launch_speed + delta).clamp(MIN_LAUNCH_SPEED, MAX_LAUNCH_SPEED);
    }

    /// Apply damage; HP floors at zero. Returns true if this hit killed the tank.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let was_alive = self.is_alive();
        self.hp = (self.hp - amount).max(0);
        was_alive && !self.is_alive()
    }

    /// Start the death explosion sequence
    pub fn begin_exploding(&mut self) {
        self.exploding = true;
        self.explosion_timer = TANK_EXPLOSION_DURATION;
    }

    /// Reload and death-sequence countdowns
    pub fn tick_timers(&mut self, dt: f32) {
        if self.reload_timer > 0.0 {
            self.reload_timer = (self.reload_timer - dt).max(0.0);
        }
        if self.exploding {
            self.explosion_timer -= dt;
            if self.explosion_timer <= 0.0 {
                self.exploding = false;
                self.explosion_timer = 0.0;
            }
        }
    }

    /// Fall toward the ground under the footprint, snapping when close or
    /// embedded, and never below the bottom of the world
    pub fn settle(&mut self, terrain: &Terrain, dt: f32) {
        let left = terrain.height_at(self.rect.left() + self.rect.size.x * 0.25);
        let right = terrain.height_at(self.rect.left() + self.rect.size.x * 0.75);
        let support = left.min(right);
        let height = self.rect.size.y;
        let gap = support - self.rect.bottom();

        if gap > 0.5 {
            self.vertical_velocity += TANK_GRAVITY * dt;
            self.rect.pos.y += self.vertical_velocity * dt;
            if self.rect.bottom() >= support {
                self.rect.pos.y = support - height;
                self.vertical_velocity = 0.0;
            }
        } else if gap < -0.5 {
            self.rect.pos.y = support - height - 0.5;
            self.vertical_velocity = 0.0;
        } else {
            self.rect.pos.y = support - height;
            self.vertical_velocity = 0.0;
        }

        let floor = WORLD_HEIGHT - 2.0;
        if self.rect.bottom() > floor {
            self.rect.pos.y = floor - height;
            self.vertical_velocity = 0.0;
        }
    }
}

/// Things that happened during the last tick, for the render/audio side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    MatchStarted { mode: GameMode },
    ShotFired { player: PlayerId, kind: ProjectileKind },
    ProjectileSplit { pos: Vec2, children: usize },
    SceneryHit { pos: Vec2, destroyed: bool },
    TerrainHit { pos: Vec2, kind: ProjectileKind },
    TankHit { target: PlayerId, damage: i32, hp: i32 },
    TankDestroyed { player: PlayerId },
    TurnChanged { current: PlayerId },
    MatchOver { winner: PlayerId },
    ReturnedToMenu,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub mode: GameMode,
    /// Indexed by `PlayerId::index`
    pub tanks: [Tank; 2],
    pub projectiles: Vec<Projectile>,
    pub explosions: Vec<Explosion>,
    pub napalm: Vec<NapalmPatch>,
    pub scenery: Vec<SceneryObject>,
    pub terrain: Terrain,
    pub turn: Turn,
    pub winner: Option<PlayerId>,
    /// Seconds until reset once the match is over
    pub reset_timer: f32,
    /// Bot controllers, one slot per tank
    pub bots: [Option<BotController>; 2],
    /// Go straight into a new match instead of back to the menu
    pub auto_rematch: bool,
    /// Events from the last tick
    pub events: Vec<GameEvent>,
    pub time_ticks: u64,
    pub matches_started: u32,
}

impl GameState {
    /// Fresh state on the menu screen with a generated battlefield
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let terrain = Terrain::generate(&mut rng);
        let scenery = scenery::place_towers(&terrain, &mut rng, scenery::TOWER_COUNT);
        let mut tanks = [Tank::new(PlayerId::One), Tank::new(PlayerId::Two)];
        for tank in &mut tanks {
            tank.place_on(&terrain);
        }
        Self {
            seed,
            rng,
            phase: GamePhase::Menu,
            mode: GameMode::default(),
            tanks,
            projectiles: Vec::new(),
            explosions: Vec::new(),
            napalm: Vec::new(),
            scenery,
            terrain,
            turn: Turn::default(),
            winner: None,
            reset_timer: 0.0,
            bots: [None, None],
            auto_rematch: false,
            events: Vec::new(),
            time_ticks: 0,
            matches_started: 0,
        }
    }

    /// Pick a mode and start a match
    pub fn start_match(&mut self, mode: GameMode) {
        self.mode = mode;
        self.reset_match();
    }

    /// Regenerate the battlefield and restore both tanks
    pub fn reset_match(&mut self) {
        self.terrain = Terrain::generate(&mut self.rng);
        self.scenery = scenery::place_towers(&self.terrain, &mut self.rng, scenery::TOWER_COUNT);
        self.projectiles.clear();
        self.explosions.clear();
        self.napalm.clear();
        for tank in &mut self.tanks {
            tank.reset(&self.terrain);
        }
        self.turn = Turn::default();
        self.winner = None;
        self.reset_timer = 0.0;
        for player in PlayerId::ALL {
            self.bots[player.index()] = self.mode.is_bot(player).then(BotController::default);
        }
        if let Some(bot) = self.bots[self.turn.current.index()].as_mut() {
            bot.begin_turn(&mut self.rng);
        }
        self.phase = GamePhase::Playing;
        self.matches_started += 1;
        self.events.push(GameEvent::MatchStarted { mode: self.mode });
        log::info!(
            "Match {} started ({:?}, {} towers)",
            self.matches_started,
            self.mode,
            self.scenery.len()
        );
    }

    pub fn tank(&self, player: PlayerId) -> &Tank {
        &self.tanks[player.index()]
    }

    pub fn tank_mut(&mut self, player: PlayerId) -> &mut Tank {
        &mut self.tanks[player.index()]
    }

    pub fn is_match_over(&self) -> bool {
        self.phase == GamePhase::MatchOver
    }

    /// Fire `player`'s selected ammunition if the turn, reload and
    /// one-shot-per-turn rules allow it
    pub fn try_fire(&mut self, player: PlayerId) -> bool {
        if self.phase != GamePhase::Playing || !self.turn.accepts_input(player) || self.turn.shot_fired
        {
            return false;
        }
        let tank = &mut self.tanks[player.index()];
        if !tank.reload_ready() || !tank.is_alive() {
            return false;
        }
        let projectile = Projectile::launch_from(tank);
        tank.reload_timer = RELOAD_TIME;
        log::debug!(
            "Player {} fires {} at {:.1} deg, power {:.1}",
            player.number(),
            projectile.kind.display_name(),
            tank.turret_angle_deg,
            tank.launch_speed
        );
        self.projectiles.push(projectile);
        self.turn.begin_settling();
        self.events.push(GameEvent::ShotFired {
            player,
            kind: projectile.kind,
        });
        true
    }

    /// Record the death of `loser` and end the match
    pub(crate) fn end_match(&mut self, loser: PlayerId) {
        let winner = loser.other();
        self.phase = GamePhase::MatchOver;
        self.winner = Some(winner);
        self.reset_timer = MATCH_RESET_DELAY;
        self.events.push(GameEvent::TankDestroyed { player: loser });
        self.events.push(GameEvent::MatchOver { winner });
        log::info!("Player {} destroyed, player {} wins", loser.number(), winner.number());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_starts_on_menu() {
        let state = GameState::new(1);
        assert_eq!(state.phase, GamePhase::Menu);
        assert!(state.tanks[0].facing_right);
        assert!(!state.tanks[1].facing_right);
        assert_eq!(state.tanks[0].id, PlayerId::One);
        assert_eq!(state.tanks[1].id, PlayerId::Two);
    }

    #[test]
    fn test_start_match_sets_bots_by_mode() {
        let mut state = GameState::new(2);
        state.start_match(GameMode::OnePlayer);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.bots[0].is_none());
        assert!(state.bots[1].is_some());

        state.start_match(GameMode::TwoPlayer);
        assert!(state.bots.iter().all(Option::is_none));

        state.start_match(GameMode::Demo);
        assert!(state.bots.iter().all(Option::is_some));
        assert_eq!(state.matches_started, 3);
    }

    #[test]
    fn test_reset_restores_tanks_on_ground() {
        let mut state = GameState::new(3);
        state.start_match(GameMode::TwoPlayer);
        state.tanks[1].hp = 0;
        state.tanks[1].turret_angle_deg = 10.0;
        state.tanks[1].selected = ProjectileKind::Napalm;
        state.tanks[1].rect.pos.x = 300.0;
        state.reset_match();

        let tank = &state.tanks[1];
        assert_eq!(tank.hp, TANK_HP);
        assert_eq!(tank.turret_angle_deg, DEFAULT_TURRET_ANGLE);
        assert_eq!(tank.selected, ProjectileKind::Mortar);
        assert_eq!(tank.rect.left(), TANK2_START_X);
        let ground = state.terrain.height_at(tank.rect.center_x());
        assert!((tank.rect.bottom() - ground).abs() < 1e-3);
        assert!(!tank.facing_right);
    }

    #[test]
    fn test_world_angle_mirrors_when_facing_left() {
        let mut tank = Tank::new(PlayerId::Two);
        tank.turret_angle_deg = 30.0;
        assert_eq!(tank.world_angle_deg(), 150.0);
        tank.facing_right = true;
        assert_eq!(tank.world_angle_deg(), 30.0);
    }

    #[test]
    fn test_controls_clamp() {
        let mut tank = Tank::new(PlayerId::One);
        tank.adjust_aim(500.0);
        assert_eq!(tank.turret_angle_deg, MAX_TURRET_SWING);
        tank.adjust_aim(-500.0);
        assert_eq!(tank.turret_angle_deg, 0.0);
        tank.adjust_power(1000.0);
        assert_eq!(tank.launch_speed, MAX_LAUNCH_SPEED);
        tank.adjust_power(-1000.0);
        assert_eq!(tank.launch_speed, MIN_LAUNCH_SPEED);
    }

    #[test]
    fn test_damage_floors_at_zero_and_reports_death_once() {
        let mut tank = Tank::new(PlayerId::One);
        assert!(!tank.take_damage(60));
        assert!(tank.take_damage(60));
        assert_eq!(tank.hp, 0);
        assert!(!tank.take_damage(10));
    }

    #[test]
    fn test_settle_falls_into_crater() {
        let mut terrain = Terrain::flat(300, 330);
        let mut tank = Tank::new(PlayerId::One);
        tank.place_on(&terrain);
        let before = tank.rect.bottom();
        terrain.carve_crater(tank.rect.center_x(), 24.0, 14.0);
        for _ in 0..240 {
            tank.settle(&terrain, SIM_DT);
        }
        let support = terrain
            .height_at(tank.rect.left() + TANK_WIDTH * 0.25)
            .min(terrain.height_at(tank.rect.left() + TANK_WIDTH * 0.75));
        assert!(tank.rect.bottom() > before + 5.0);
        assert!((tank.rect.bottom() - support).abs() < 1e-3);
        assert_eq!(tank.vertical_velocity, 0.0);
    }

    #[test]
    fn test_exploding_clears_after_timer() {
        let mut tank = Tank::new(PlayerId::Two);
        tank.begin_exploding();
        tank.tick_timers(TANK_EXPLOSION_DURATION * 0.5);
        assert!(tank.exploding);
        tank.tick_timers(TANK_EXPLOSION_DURATION);
        assert!(!tank.exploding);
    }

    #[test]
    fn test_turn_pass() {
        let mut turn = Turn::default();
        turn.begin_settling();
        assert_eq!(turn.phase(), TurnPhase::ShotSettling);
        assert!(!turn.accepts_input(PlayerId::One));
        turn.pass();
        assert_eq!(turn.current, PlayerId::Two);
        assert_eq!(turn.phase(), TurnPhase::Aiming);
        assert!(!turn.shot_fired);
    }
}
