//! Lawless Lanes - a three-lane traffic dodger
//!
//! Core modules:
//! - `sim`: Deterministic simulation (road geometry, spawning, collisions, game state)
//! - `renderer`: WebGPU rendering pipeline
//! - `persistence`: Best-effort string storage (files on native, localStorage on web)
//! - `highscores`: The single persisted best score
//! - `settings`: User preferences (volumes, HUD)
//! - `audio`: Procedural Web Audio (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use highscores::HighScore;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Virtual screen size; the renderer letterboxes this into the canvas
    pub const VIRTUAL_WIDTH: f32 = 800.0;
    pub const VIRTUAL_HEIGHT: f32 = 600.0;

    /// The road occupies the center of the screen, split into equal lanes
    pub const ROAD_WIDTH_FRACTION: f32 = 0.6;
    pub const LANE_COUNT: u32 = 3;

    /// Player car horizontal speed (units/s)
    pub const CAR_MOVE_SPEED: f32 = 800.0;
    pub const CAR_SCALE: f32 = 0.4;
    /// Gap between the car's bottom edge and the bottom of the screen
    pub const CAR_BOTTOM_MARGIN: f32 = 20.0;

    /// Obstacle defaults
    pub const OBSTACLE_SCALE: f32 = 0.4;
    pub const OBSTACLE_START_SPEED: f32 = 250.0;
    /// Obstacles enter above the visible screen
    pub const OBSTACLE_SPAWN_Y: f32 = -100.0;

    /// Delay before the very first spawn of a session
    pub const FIRST_SPAWN_DELAY: f32 = 1.5;
    /// Spawn interval starts here and shrinks with score
    pub const SPAWN_INTERVAL_START: f32 = 1.2;
    /// Hard floor on the spawn interval
    pub const SPAWN_INTERVAL_MIN: f32 = 0.7;
    /// Interval shrink per second of score
    pub const SPAWN_INTERVAL_DECAY: f32 = 0.015;
    /// Spawn-timer drain multiplier gain per second of score
    pub const SPAWN_RATE_GAIN: f32 = 0.02;
    /// Cap on the spawn-timer drain multiplier
    pub const SPAWN_RATE_CAP: f32 = 2.0;

    /// All live obstacles speed up every BOOST_PERIOD whole seconds of score
    pub const BOOST_PERIOD: i32 = 4;
    /// Boost amount per whole second of score (units/s)
    pub const BOOST_GAIN: f32 = 0.6;

    /// Fraction of the draw bounds the hitbox keeps, centered
    pub const HITBOX_KEEP_W: f32 = 0.5;
    pub const HITBOX_KEEP_H: f32 = 0.4;
}

/// Fit the virtual screen into a canvas, preserving aspect ratio.
/// Returns (scale, offset) of the letterboxed rectangle in canvas pixels.
#[inline]
pub fn viewport_fit(canvas_w: f32, canvas_h: f32) -> (f32, Vec2) {
    let scale = (canvas_w / consts::VIRTUAL_WIDTH).min(canvas_h / consts::VIRTUAL_HEIGHT);
    let offset = Vec2::new(
        (canvas_w - consts::VIRTUAL_WIDTH * scale) * 0.5,
        (canvas_h - consts::VIRTUAL_HEIGHT * scale) * 0.5,
    );
    (scale, offset)
}
