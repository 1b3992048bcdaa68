//! Game state and core simulation types
//!
//! Everything the tick mutates lives here. Same seed plus same inputs must
//! replay the same run, so all gameplay state is plain serializable data.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rect::{Rect, Road};
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title card, waiting for the player to start
    Title,
    /// Active gameplay
    Playing,
    /// Run ended on a collision
    GameOver,
}

/// Built-in sprite handles. Entities carry the id; the renderer decides what
/// an id looks like, the sim only reads the intrinsic size for layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpriteId {
    /// The player's car
    Roadster,
    /// Oncoming traffic
    Cruiser,
}

impl SpriteId {
    /// Intrinsic pixel size of the art this id names
    pub fn size(self) -> Vec2 {
        match self {
            SpriteId::Roadster => Vec2::new(240.0, 460.0),
            SpriteId::Cruiser => Vec2::new(250.0, 500.0),
        }
    }
}

/// Shared geometry of everything on the road: a sprite drawn at some scale,
/// with a hitbox smaller than the art so near misses feel fair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Body {
    pub bounds: Rect,
    pub sprite: SpriteId,
    pub scale: f32,
}

impl Body {
    /// Place a body at (x, y). Draw size is the sprite's intrinsic size
    /// times `scale`, fixed for the body's lifetime.
    pub fn new(sprite: SpriteId, scale: f32, x: f32, y: f32) -> Self {
        let size = sprite.size() * scale;
        Self {
            bounds: Rect::new(x, y, size.x, size.y),
            sprite,
            scale,
        }
    }

    /// Full drawn rectangle
    #[inline]
    pub fn draw_bounds(&self) -> Rect {
        self.bounds
    }

    /// Collision rectangle: same center as the draw bounds, keeping
    /// `HITBOX_KEEP_W` of the width and `HITBOX_KEEP_H` of the height.
    #[inline]
    pub fn hitbox(&self) -> Rect {
        self.bounds.shrink_centered(HITBOX_KEEP_W, HITBOX_KEEP_H)
    }
}

/// The player's car. Moves only horizontally; its vertical position is fixed
/// at spawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    pub body: Body,
}

impl Car {
    /// Spawn centered on the screen, bottom edge `CAR_BOTTOM_MARGIN` above
    /// the bottom of the screen.
    pub fn spawn(screen_w: f32, screen_h: f32) -> Self {
        let size = SpriteId::Roadster.size() * CAR_SCALE;
        let x = screen_w / 2.0 - size.x / 2.0;
        let y = screen_h - size.y - CAR_BOTTOM_MARGIN;
        Self {
            body: Body::new(SpriteId::Roadster, CAR_SCALE, x, y),
        }
    }

    pub fn steer_left(&mut self, dt: f32) {
        self.body.bounds.x -= CAR_MOVE_SPEED * dt;
    }

    pub fn steer_right(&mut self, dt: f32) {
        self.body.bounds.x += CAR_MOVE_SPEED * dt;
    }

    /// Keep the whole car inside the road band
    pub fn clamp_to(&mut self, road: &Road) {
        let max_x = road.right_edge() - self.body.bounds.w;
        self.body.bounds.x = self.body.bounds.x.clamp(road.start_x, max_x);
    }
}

/// One oncoming car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub body: Body,
    /// Downward speed in units/s; only ever increases
    pub vertical_speed: f32,
    /// Lane this obstacle spawned in
    pub lane: u32,
}

impl Obstacle {
    /// Spawn lane-centered just above the visible screen
    pub fn spawn(road: &Road, lane: u32) -> Self {
        let size = SpriteId::Cruiser.size() * OBSTACLE_SCALE;
        let x = road.spawn_x(lane, size.x);
        Self {
            body: Body::new(SpriteId::Cruiser, OBSTACLE_SCALE, x, OBSTACLE_SPAWN_Y),
            vertical_speed: OBSTACLE_START_SPEED,
            lane,
        }
    }

    /// Scroll down by `vertical_speed * dt`
    pub fn advance(&mut self, dt: f32) {
        self.body.bounds.y += self.vertical_speed * dt;
    }
}

/// RNG as plain data: each draw derives a fresh Pcg32 from the seed and a
/// stream counter, so the state stays Clone/serializable and runs replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Uniform draw in `0..n`, advancing the stream
    pub fn roll(&mut self, n: u32) -> u32 {
        let mixed = self
            .seed
            .wrapping_add(self.stream.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        self.stream += 1;
        let mut rng = Pcg32::seed_from_u64(mixed);
        rng.random_range(0..n)
    }
}

/// One-shot notifications out of the tick. Presentation only: the host
/// drains them for audio and persistence; the sim never reads them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    ObstacleSpawned { lane: u32 },
    Crashed { final_score: i32 },
    NewHighScore { score: i32 },
    RunRestarted,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// RNG state (lane draws)
    pub rng: RngState,
    /// Current phase
    pub phase: GamePhase,
    /// Road layout, fixed for the session
    pub road: Road,
    /// Player car
    pub car: Car,
    /// Live obstacles in spawn order (stable iteration)
    pub obstacles: Vec<Obstacle>,
    /// Seconds survived this run (fractional)
    pub score: f32,
    /// Whole-second snapshot taken at the crash
    pub final_score: i32,
    /// Best score ever; loaded once at startup
    pub high_score: i32,
    /// Last whole-second score a speed boost fired at (-1 = none this run)
    pub last_boost_score: i32,
    /// Seconds until the next obstacle spawn
    pub spawn_timer: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// One-shot events since the host last drained them
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh session on the title screen. `high_score` is whatever
    /// persistence had (0 on a first run).
    pub fn new(seed: u64, high_score: i32) -> Self {
        Self {
            seed,
            rng: RngState::new(seed),
            phase: GamePhase::Title,
            road: Road::new(VIRTUAL_WIDTH),
            car: Car::spawn(VIRTUAL_WIDTH, VIRTUAL_HEIGHT),
            obstacles: Vec::new(),
            score: 0.0,
            final_score: 0,
            high_score,
            last_boost_score: -1,
            spawn_timer: FIRST_SPAWN_DELAY,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Back to a clean run: obstacles gone, car recentered, score and boost
    /// tracking zeroed. The spawn timer deliberately carries over from the
    /// previous run.
    pub fn reset_run(&mut self) {
        self.obstacles.clear();
        self.car = Car::spawn(VIRTUAL_WIDTH, VIRTUAL_HEIGHT);
        self.score = 0.0;
        self.final_score = 0;
        self.last_boost_score = -1;
    }
}
