//! Runner settings
//!
//! Read from an optional JSON file. Anything missing falls back to its
//! default; a missing or unreadable file falls back to `Settings::default()`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sim::GameMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Who drives the tanks
    pub mode: GameMode,
    /// Fixed seed; drawn at random when absent
    pub seed: Option<u64>,
    /// Matches to play before exiting
    pub rounds: u32,
    /// Simulated seconds before a match is abandoned
    pub max_match_seconds: f32,
    /// Where to write the final render snapshot, if anywhere
    pub snapshot_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: GameMode::Demo,
            seed: None,
            rounds: 1,
            max_match_seconds: 300.0,
            snapshot_path: None,
        }
    }
}

impl Settings {
    /// Parse settings JSON; `None` if it is not valid
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) => Some(settings.sanitized()),
            Err(e) => {
                log::warn!("Invalid settings: {}", e);
                None
            }
        }
    }

    /// Load settings from a file, or defaults if it can't be read or parsed
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => {
                if let Some(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
            }
            Err(e) => log::warn!("Could not read {}: {}", path.display(), e),
        }
        log::info!("Using default settings");
        Self::default()
    }

    /// Clamp values that would stall the runner
    fn sanitized(mut self) -> Self {
        if self.rounds == 0 {
            log::warn!("rounds must be at least 1");
            self.rounds = 1;
        }
        if !self.max_match_seconds.is_finite() || self.max_match_seconds <= 0.0 {
            log::warn!("max_match_seconds must be positive, using default");
            self.max_match_seconds = Self::default().max_match_seconds;
        }
        self
    }
}
