//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod rect;
pub mod state;
pub mod tick;

pub use collision::car_hits_obstacle;
pub use rect::{Rect, Road};
pub use state::{Body, Car, GameEvent, GamePhase, GameState, Obstacle, RngState, SpriteId};
pub use tick::{TickInput, tick};
