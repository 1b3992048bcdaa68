//! Fixed timestep simulation tick
//!
//! Core game loop that advances the simulation deterministically. The tick
//! is the only mutator of `GameState`; rendering and the host only read.

use super::collision::car_hits_obstacle;
use super::state::{GameEvent, GamePhase, GameState, Obstacle};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Steer left, held (A / left arrow / touch on the left half)
    pub steer_left: bool,
    /// Steer right, held (D / right arrow / touch on the right half)
    pub steer_right: bool,
    /// Start from the title screen, one-shot (space / click)
    pub start: bool,
    /// Restart after a crash, one-shot (R)
    pub restart: bool,
}

/// Spawn-clock drain multiplier at a given score. Grows linearly, capped so
/// late-run traffic arrives at most twice as fast.
#[inline]
pub fn spawn_rate_multiplier(score: f32) -> f32 {
    (1.0 + score * SPAWN_RATE_GAIN).min(SPAWN_RATE_CAP)
}

/// Delay armed after each spawn. Shrinks linearly with score down to a hard
/// floor; the floor is what keeps late runs survivable.
#[inline]
pub fn spawn_interval(score: f32) -> f32 {
    (SPAWN_INTERVAL_START - score * SPAWN_INTERVAL_DECAY).max(SPAWN_INTERVAL_MIN)
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    match state.phase {
        GamePhase::Title => {
            if input.start {
                state.phase = GamePhase::Playing;
                state.events.push(GameEvent::RunStarted);
            }
        }
        GamePhase::Playing => playing_tick(state, input, dt),
        GamePhase::GameOver => {
            if input.restart {
                state.reset_run();
                state.phase = GamePhase::Playing;
                state.events.push(GameEvent::RunRestarted);
            }
        }
    }
}

/// One step of active play. The order is part of the game's feel: steering
/// resolves before anything moves, and despawning and the speed boost still
/// run on the tick that ends the run.
fn playing_tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;

    // Input phase: steering is applied here, not in the physics below.
    // Holding both directions cancels out; the clamp pins the car to the road.
    if input.steer_left {
        state.car.steer_left(dt);
    }
    if input.steer_right {
        state.car.steer_right(dt);
    }
    let road = state.road;
    state.car.clamp_to(&road);

    // Survival time is the score
    state.score += dt;

    // The spawn clock drains faster as the run goes on
    state.spawn_timer -= dt * spawn_rate_multiplier(state.score);
    if state.spawn_timer <= 0.0 {
        let lane = state.rng.roll(LANE_COUNT);
        state.obstacles.push(Obstacle::spawn(&road, lane));
        state.events.push(GameEvent::ObstacleSpawned { lane });
        state.spawn_timer = spawn_interval(state.score);
    }

    // Advance traffic and look for the crash. The loop keeps going after a
    // hit: the transition is idempotent and the remaining obstacles still get
    // their motion for this tick.
    for i in 0..state.obstacles.len() {
        state.obstacles[i].advance(dt);
        if car_hits_obstacle(&state.car, &state.obstacles[i]) {
            state.final_score = state.score as i32;
            if state.final_score > state.high_score {
                state.high_score = state.final_score;
                state.events.push(GameEvent::NewHighScore {
                    score: state.final_score,
                });
            }
            if state.phase != GamePhase::GameOver {
                state.events.push(GameEvent::Crashed {
                    final_score: state.final_score,
                });
            }
            state.phase = GamePhase::GameOver;
        }
    }

    // Drop obstacles that have fully left the bottom of the screen
    state.obstacles.retain(|o| o.body.bounds.y <= VIRTUAL_HEIGHT);

    // Every BOOST_PERIOD whole seconds all live traffic speeds up. The guard
    // fires once per distinct whole-second value no matter how many ticks
    // land inside that second.
    let whole = state.score as i32;
    if whole % BOOST_PERIOD == 0 && whole != state.last_boost_score {
        state.last_boost_score = whole;
        let boost = whole as f32 * BOOST_GAIN;
        for obstacle in &mut state.obstacles {
            obstacle.vertical_speed += boost;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Car;
    use proptest::prelude::*;

    /// Fresh state taken through the title screen into active play. The
    /// start tick only flips the phase; no play time has passed yet.
    fn playing_state(seed: u64, high_score: i32) -> GameState {
        let mut state = GameState::new(seed, high_score);
        let start = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &start, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time_ticks, 0);
        state
    }

    /// Obstacle parked far above the screen: alive for minutes, can't reach
    /// the car, can't despawn
    fn distant_obstacle(state: &GameState) -> Obstacle {
        let mut o = Obstacle::spawn(&state.road, 1);
        o.body.bounds.y = -4000.0;
        o
    }

    /// Obstacle dead-center on the car, guaranteed hit next tick
    fn overlapping_obstacle(state: &GameState) -> Obstacle {
        let car_center = state.car.body.bounds.center();
        let mut o = Obstacle::spawn(&state.road, 1);
        o.body.bounds.x = car_center.x - o.body.bounds.w / 2.0;
        o.body.bounds.y = car_center.y - o.body.bounds.h / 2.0;
        o
    }

    #[test]
    fn test_title_is_static_until_start() {
        let mut state = GameState::new(7, 0);
        assert_eq!(state.phase, GamePhase::Title);

        let input = TickInput::default();
        for _ in 0..100 {
            tick(&mut state, &input, SIM_DT);
        }
        assert_eq!(state.phase, GamePhase::Title);
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.score, 0.0);
        assert!(state.obstacles.is_empty());

        let start = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &start, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.events.contains(&GameEvent::RunStarted));
    }

    #[test]
    fn test_title_ignores_steer_and_restart() {
        let mut state = GameState::new(7, 0);
        let x0 = state.car.body.bounds.x;
        let input = TickInput {
            steer_left: true,
            restart: true,
            ..Default::default()
        };
        for _ in 0..50 {
            tick(&mut state, &input, SIM_DT);
        }
        assert_eq!(state.phase, GamePhase::Title);
        assert_eq!(state.car.body.bounds.x, x0);
    }

    #[test]
    fn test_score_counts_survival_time() {
        let mut state = playing_state(1, 0);
        state.spawn_timer = 1e9; // keep the road clear
        let input = TickInput::default();
        for _ in 0..600 {
            tick(&mut state, &input, SIM_DT);
        }
        assert!((state.score - 600.0 * SIM_DT).abs() < 1e-3);
        assert_eq!(state.time_ticks, 600);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_first_spawn_waits_for_initial_delay() {
        let mut state = playing_state(42, 0);
        let input = TickInput::default();

        // The 1.5 s session delay holds for ~178 ticks (the drain multiplier
        // creeps above 1.0 as score accrues)
        for _ in 0..150 {
            tick(&mut state, &input, SIM_DT);
        }
        assert!(state.obstacles.is_empty());

        for _ in 0..35 {
            tick(&mut state, &input, SIM_DT);
        }
        assert_eq!(state.obstacles.len(), 1);
    }

    #[test]
    fn test_spawned_obstacle_geometry() {
        let mut state = playing_state(42, 0);
        let input = TickInput::default();
        while state.obstacles.is_empty() {
            tick(&mut state, &input, SIM_DT);
        }

        let o = &state.obstacles[0];
        assert!(o.lane < LANE_COUNT);
        assert_eq!(o.vertical_speed, OBSTACLE_START_SPEED);
        // One advance already happened on the spawn tick
        assert!(
            (o.body.bounds.y - (OBSTACLE_SPAWN_Y + OBSTACLE_START_SPEED * SIM_DT)).abs() < 1e-3
        );
        // Lane-centered: start_x + lane*lane_width + (lane_width - w) / 2
        let road = state.road;
        let expected_x = road.start_x
            + o.lane as f32 * road.lane_width
            + (road.lane_width - o.body.bounds.w) / 2.0;
        assert_eq!(o.body.bounds.x, expected_x);
        assert!(
            state
                .events
                .contains(&GameEvent::ObstacleSpawned { lane: o.lane })
        );
    }

    #[test]
    fn test_spawn_timer_rearms_at_floor_late_in_a_run() {
        let mut state = playing_state(3, 0);
        state.score = 100.0;
        state.spawn_timer = 0.01;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.spawn_timer, SPAWN_INTERVAL_MIN);
    }

    #[test]
    fn test_obstacle_advance_is_monotonic() {
        let mut state = playing_state(5, 0);
        state.spawn_timer = 1e9;
        state.obstacles.push(distant_obstacle(&state));

        let input = TickInput::default();
        for _ in 0..300 {
            let before = state.obstacles[0].body.bounds.y;
            let expected = before + state.obstacles[0].vertical_speed * SIM_DT;
            tick(&mut state, &input, SIM_DT);
            let after = state.obstacles[0].body.bounds.y;
            assert!(after > before);
            assert_eq!(after, expected);
        }
    }

    #[test]
    fn test_offscreen_obstacles_despawn() {
        let mut state = playing_state(5, 0);
        state.spawn_timer = 1e9;
        let mut o = distant_obstacle(&state);
        o.body.bounds.y = 500.0;
        o.body.bounds.x = state.road.start_x;
        state.obstacles.push(o);
        // Car on the far side so the pass-by can't clip it
        state.car.body.bounds.x = state.road.right_edge() - state.car.body.bounds.w;

        let input = TickInput::default();
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.obstacles.len(), 1);

        // ~48 ticks to fall the remaining 100 units, plus slack
        for _ in 0..80 {
            tick(&mut state, &input, SIM_DT);
        }
        assert!(state.obstacles.is_empty());
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_boost_fires_once_crossing_each_threshold() {
        let mut state = playing_state(9, 0);
        state.spawn_timer = 1e9;
        state.obstacles.push(distant_obstacle(&state));
        assert_eq!(state.last_boost_score, -1);

        // The whole-second-zero guard fires on the first play tick, with a
        // zero-sized boost
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.last_boost_score, 0);
        assert_eq!(state.obstacles[0].vertical_speed, OBSTACLE_START_SPEED);

        state.score = 3.9;
        let input = TickInput::default();
        for _ in 0..30 {
            tick(&mut state, &input, SIM_DT);
        }
        assert!(state.score > 4.0 && state.score < 5.0);
        assert_eq!(state.last_boost_score, 4);
        let after_first = state.obstacles[0].vertical_speed;
        assert!((after_first - (OBSTACLE_START_SPEED + 4.0 * BOOST_GAIN)).abs() < 1e-3);

        // Sitting inside second 4 must not re-fire
        for _ in 0..30 {
            tick(&mut state, &input, SIM_DT);
        }
        assert_eq!(state.last_boost_score, 4);
        assert_eq!(state.obstacles[0].vertical_speed, after_first);

        // The next threshold boosts again, by the larger amount
        state.score = 7.95;
        for _ in 0..30 {
            tick(&mut state, &input, SIM_DT);
        }
        assert_eq!(state.last_boost_score, 8);
        assert!(
            (state.obstacles[0].vertical_speed
                - (OBSTACLE_START_SPEED + 4.0 * BOOST_GAIN + 8.0 * BOOST_GAIN))
                .abs()
                < 1e-3
        );
    }

    #[test]
    fn test_crash_snapshots_score_and_records_high_score() {
        let mut state = playing_state(11, 5);
        state.score = 12.7;
        let o = overlapping_obstacle(&state);
        state.obstacles.push(o);

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.final_score, 12);
        assert_eq!(state.high_score, 12);
        assert!(state.events.contains(&GameEvent::Crashed { final_score: 12 }));
        assert_eq!(
            state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::NewHighScore { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_crash_below_high_score_leaves_it_alone() {
        let mut state = playing_state(11, 100);
        state.score = 5.5;
        let o = overlapping_obstacle(&state);
        state.obstacles.push(o);

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.final_score, 5);
        assert_eq!(state.high_score, 100);
        assert!(
            !state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::NewHighScore { .. }))
        );
    }

    #[test]
    fn test_two_overlapping_obstacles_crash_once() {
        let mut state = playing_state(13, 0);
        state.score = 9.2;
        for _ in 0..2 {
            let o = overlapping_obstacle(&state);
            state.obstacles.push(o);
        }

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(
            state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::Crashed { .. }))
                .count(),
            1
        );
        assert_eq!(
            state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::NewHighScore { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_game_over_ignores_steer_and_start() {
        let mut state = playing_state(17, 0);
        state.phase = GamePhase::GameOver;
        let x0 = state.car.body.bounds.x;
        let input = TickInput {
            steer_right: true,
            start: true,
            ..Default::default()
        };
        for _ in 0..50 {
            tick(&mut state, &input, SIM_DT);
        }
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.car.body.bounds.x, x0);
    }

    #[test]
    fn test_restart_resets_the_run() {
        let mut state = playing_state(19, 0);
        state.score = 21.4;
        state.last_boost_score = 20;
        state.final_score = 21;
        state.car.body.bounds.x = state.road.start_x;
        state.obstacles.push(distant_obstacle(&state));
        state.phase = GamePhase::GameOver;
        state.spawn_timer = 0.123;

        let input = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);

        // The restart tick only resets; play resumes on the next tick
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.events.contains(&GameEvent::RunRestarted));
        assert_eq!(state.score, 0.0);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.final_score, 0);
        assert_eq!(state.last_boost_score, -1);
        let spawn_x = Car::spawn(VIRTUAL_WIDTH, VIRTUAL_HEIGHT).body.bounds.x;
        assert_eq!(state.car.body.bounds.x, spawn_x);
        // Deliberately carried over from the previous run
        assert_eq!(state.spawn_timer, 0.123);
    }

    #[test]
    fn test_restart_keeps_the_spawn_timer_running() {
        let mut state = playing_state(19, 0);
        state.phase = GamePhase::GameOver;
        state.spawn_timer = 0.4321;

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, SIM_DT);
        assert_eq!(state.spawn_timer, 0.4321);

        // The next play tick drains from the carried value, no re-arm
        tick(&mut state, &TickInput::default(), SIM_DT);
        let expected = 0.4321 - SIM_DT * spawn_rate_multiplier(state.score);
        assert!((state.spawn_timer - expected).abs() < 1e-6);
    }

    #[test]
    fn test_car_clamps_exactly_at_road_edges() {
        let mut state = playing_state(23, 0);
        state.spawn_timer = 1e9;
        let road = state.road;

        let left = TickInput {
            steer_left: true,
            ..Default::default()
        };
        // More than enough ticks to cross the whole road
        for _ in 0..240 {
            tick(&mut state, &left, SIM_DT);
        }
        assert_eq!(state.car.body.bounds.x, road.start_x);

        // One more held tick must not push past the edge
        tick(&mut state, &left, SIM_DT);
        assert_eq!(state.car.body.bounds.x, road.start_x);

        let right = TickInput {
            steer_right: true,
            ..Default::default()
        };
        for _ in 0..240 {
            tick(&mut state, &right, SIM_DT);
        }
        assert_eq!(
            state.car.body.bounds.x,
            road.right_edge() - state.car.body.bounds.w
        );
    }

    #[test]
    fn test_both_directions_held_cancel_out() {
        let mut state = playing_state(29, 0);
        state.spawn_timer = 1e9;
        let x0 = state.car.body.bounds.x;
        let input = TickInput {
            steer_left: true,
            steer_right: true,
            ..Default::default()
        };
        for _ in 0..60 {
            tick(&mut state, &input, SIM_DT);
        }
        assert!((state.car.body.bounds.x - x0).abs() < 1e-2);
    }

    #[test]
    fn test_determinism() {
        // Two states with the same seed and inputs must stay identical
        let mut state1 = GameState::new(99999, 0);
        let mut state2 = GameState::new(99999, 0);

        let start = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state1, &start, SIM_DT);
        tick(&mut state2, &start, SIM_DT);

        for i in 0..1000u32 {
            let input = TickInput {
                steer_left: i % 7 < 3,
                steer_right: i % 11 < 4,
                ..Default::default()
            };
            tick(&mut state1, &input, SIM_DT);
            tick(&mut state2, &input, SIM_DT);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.spawn_timer, state2.spawn_timer);
        assert_eq!(state1.rng.stream, state2.rng.stream);
        assert_eq!(state1.phase, state2.phase);
        assert_eq!(state1.obstacles.len(), state2.obstacles.len());
        for (a, b) in state1.obstacles.iter().zip(state2.obstacles.iter()) {
            assert_eq!(a.lane, b.lane);
            assert_eq!(a.body.bounds.y, b.body.bounds.y);
            assert_eq!(a.vertical_speed, b.vertical_speed);
        }
        assert_eq!(state1.car.body.bounds.x, state2.car.body.bounds.x);
        assert_eq!(state1.events.len(), state2.events.len());
    }

    proptest! {
        /// The spawn interval never drops below its floor, at any score
        #[test]
        fn test_spawn_interval_floor(score in 0.0f32..100000.0) {
            prop_assert!(spawn_interval(score) >= SPAWN_INTERVAL_MIN);
        }

        /// Difficulty only ramps up: later scores never spawn slower or
        /// drain the spawn clock slower than earlier ones
        #[test]
        fn test_difficulty_is_monotonic(a in 0.0f32..10000.0, b in 0.0f32..10000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(spawn_interval(hi) <= spawn_interval(lo));
            prop_assert!(spawn_rate_multiplier(hi) >= spawn_rate_multiplier(lo));
            prop_assert!(spawn_rate_multiplier(hi) <= SPAWN_RATE_CAP);
        }
    }
}
