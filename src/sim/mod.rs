//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (the one owned by `GameState`)
//! - Stable iteration order (tanks by player, everything else by spawn order)
//! - No rendering or platform dependencies

pub mod ai;
pub mod ballistics;
pub mod collision;
pub mod effects;
pub mod projectile;
pub mod rect;
pub mod scenery;
pub mod snapshot;
pub mod state;
pub mod terrain;
pub mod tick;

pub use ai::{BotController, ShotPlan, Situation};
pub use collision::{Impact, circle_intersects_rect, tank_hitbox};
pub use effects::{Explosion, NapalmPatch, all_effects_settled};
pub use projectile::{Projectile, ProjectileKind};
pub use rect::Rect;
pub use scenery::SceneryObject;
pub use snapshot::RenderSnapshot;
pub use state::{GameEvent, GameMode, GamePhase, GameState, PlayerId, Tank, Turn, TurnPhase};
pub use terrain::{Layer, Terrain};
pub use tick::{ControlInput, TickInput, tick};
