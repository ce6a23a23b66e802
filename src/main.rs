//! Tank Duel headless runner
//!
//! Plays matches without a window: loads settings, seeds the simulation and
//! feeds simulated frames through the fixed-timestep accumulator until the
//! requested rounds are done.

use std::fs;
use std::path::Path;

use tank_duel::Settings;
use tank_duel::consts::*;
use tank_duel::sim::{GameEvent, GameMode, GamePhase, GameState, PlayerId, TickInput, tick};

/// Simulated display refresh
const FRAME_DT: f32 = 1.0 / 60.0;

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Winner(PlayerId),
    TimedOut,
}

#[derive(Debug, Clone, Copy)]
struct MatchResult {
    outcome: Outcome,
    seconds: f32,
    shots: u32,
}

/// Runner holding the simulation and per-match bookkeeping
struct Game {
    state: GameState,
    accumulator: f32,
    input: TickInput,
    mode: GameMode,
    rounds: u32,
    max_match_seconds: f32,
    match_seconds: f32,
    shots: u32,
    results: Vec<MatchResult>,
}

impl Game {
    fn new(seed: u64, settings: &Settings) -> Self {
        let mut input = TickInput::default();
        input.start_match = Some(settings.mode);
        Self {
            state: GameState::new(seed),
            accumulator: 0.0,
            input,
            mode: settings.mode,
            rounds: settings.rounds,
            max_match_seconds: settings.max_match_seconds,
            match_seconds: 0.0,
            shots: 0,
            results: Vec::new(),
        }
    }

    fn finished(&self) -> bool {
        self.results.len() >= self.rounds as usize
    }

    /// Run simulation ticks for one frame
    fn update(&mut self, frame_dt: f32) {
        let dt = frame_dt.min(MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS && !self.finished() {
            tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Mode selection is a one-shot input
            self.input.start_match = None;
            self.observe();
        }
    }

    fn observe(&mut self) {
        if self.state.phase == GamePhase::Playing {
            self.match_seconds += SIM_DT;
        }

        for event in &self.state.events {
            match event {
                GameEvent::MatchStarted { .. } => {
                    self.match_seconds = 0.0;
                    self.shots = 0;
                }
                GameEvent::ShotFired { .. } => self.shots += 1,
                GameEvent::TurnChanged { current } => {
                    log::debug!("Turn: player {}", current.number());
                }
                GameEvent::MatchOver { winner } => {
                    self.results.push(MatchResult {
                        outcome: Outcome::Winner(*winner),
                        seconds: self.match_seconds,
                        shots: self.shots,
                    });
                }
                GameEvent::ReturnedToMenu if !self.finished() => {
                    self.input.start_match = Some(self.mode);
                }
                _ => {}
            }
        }

        if self.state.phase == GamePhase::Playing && self.match_seconds >= self.max_match_seconds {
            log::warn!("Match abandoned after {:.0}s", self.match_seconds);
            self.results.push(MatchResult {
                outcome: Outcome::TimedOut,
                seconds: self.match_seconds,
                shots: self.shots,
            });
            if !self.finished() {
                // Restarted outside a tick, so no MatchStarted reaches observe
                self.state.start_match(self.mode);
                self.match_seconds = 0.0;
                self.shots = 0;
            }
        }
    }
}

fn main() {
    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(Path::new(&path)),
        None => Settings::default(),
    };
    let seed = settings.seed.unwrap_or_else(rand::random);
    log::info!("Tank Duel (headless) starting with seed {}", seed);
    if settings.mode != GameMode::Demo {
        log::warn!("{:?} needs human input; matches will run until the time cap", settings.mode);
    }

    let mut game = Game::new(seed, &settings);
    while !game.finished() {
        game.update(FRAME_DT);
    }

    println!("Seed {} | {:?} | {} round(s)", seed, settings.mode, settings.rounds);
    for (i, result) in game.results.iter().enumerate() {
        let outcome = match result.outcome {
            Outcome::Winner(player) => format!("player {} wins", player.number()),
            Outcome::TimedOut => "time cap reached".to_string(),
        };
        println!(
            "Round {}: {} after {:.1}s, {} shots",
            i + 1,
            outcome,
            result.seconds,
            result.shots
        );
    }

    if let Some(path) = &settings.snapshot_path {
        match serde_json::to_string_pretty(&game.state.snapshot()) {
            Ok(json) => match fs::write(path, json) {
                Ok(()) => log::info!("Snapshot written to {}", path.display()),
                Err(e) => log::error!("Could not write snapshot to {}: {}", path.display(), e),
            },
            Err(e) => log::error!("Could not serialize snapshot: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(settings: &Settings, seed: u64) -> (Game, usize) {
        let mut game = Game::new(seed, settings);
        let mut frames = 0;
        while !game.finished() {
            game.update(FRAME_DT);
            frames += 1;
            assert!(frames < 100_000, "runner never finished");
        }
        (game, frames)
    }

    #[test]
    fn test_every_round_gets_its_own_time_cap() {
        let settings = Settings {
            mode: GameMode::TwoPlayer,
            rounds: 3,
            max_match_seconds: 2.0,
            ..Settings::default()
        };
        let (game, frames) = run(&settings, 11);

        assert_eq!(game.results.len(), 3);
        for result in &game.results {
            assert!(matches!(result.outcome, Outcome::TimedOut));
            assert!(result.seconds >= 2.0);
            assert!(result.seconds < 2.0 + 3.0 * SIM_DT, "{}", result.seconds);
            assert_eq!(result.shots, 0);
        }
        // Three capped matches take at least six simulated seconds
        assert!(frames as f32 * FRAME_DT >= 6.0);
    }

    #[test]
    fn test_demo_round_ends_with_winner_or_cap() {
        let settings = Settings {
            mode: GameMode::Demo,
            rounds: 2,
            max_match_seconds: 120.0,
            ..Settings::default()
        };
        let (game, _) = run(&settings, 4);

        assert_eq!(game.results.len(), 2);
        for result in &game.results {
            assert!(result.seconds <= 120.0 + 3.0 * SIM_DT);
            if matches!(result.outcome, Outcome::Winner(_)) {
                assert!(result.shots >= 1);
            }
        }
    }

    #[test]
    fn test_start_input_is_one_shot() {
        let settings = Settings {
            mode: GameMode::TwoPlayer,
            ..Settings::default()
        };
        let mut game = Game::new(1, &settings);
        game.update(FRAME_DT);
        assert_eq!(game.state.phase, GamePhase::Playing);
        assert!(game.input.start_match.is_none());
    }
}
