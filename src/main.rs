//! Lawless Lanes entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

    use lawless_lanes::audio::{AudioManager, SoundEffect};
    use lawless_lanes::consts::*;
    use lawless_lanes::renderer::SdfRenderState;
    use lawless_lanes::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
    use lawless_lanes::{HighScore, Settings};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<SdfRenderState>,
        audio: AudioManager,
        settings: Settings,
        high_score: HighScore,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        // Held steering sources, merged into the input each frame
        keys_left: bool,
        keys_right: bool,
        pointer_left: bool,
        pointer_right: bool,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        // Whether the run that just ended set a new best
        run_was_best: bool,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let high_score = HighScore::load();
            let mut audio = AudioManager::new();
            audio.set_music_volume(settings.music_volume);
            audio.set_sfx_volume(settings.sfx_volume);
            Self {
                state: GameState::new(seed, high_score.best),
                render_state: None,
                audio,
                settings,
                high_score,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                keys_left: false,
                keys_right: false,
                pointer_left: false,
                pointer_right: false,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                run_was_best: false,
            }
        }

        /// Browsers gate audio behind the first user gesture; call this from
        /// every input handler.
        fn ensure_audio(&mut self) {
            if !self.audio.music_started() {
                self.audio.resume();
                self.audio.start_music();
            }
        }

        fn toggle_music(&mut self) {
            let audible = self.settings.toggle_music();
            self.settings.save();
            self.audio.set_music_volume(self.settings.music_volume);
            log::info!("Music {}", if audible { "on" } else { "off" });
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            self.input.steer_left = self.keys_left || self.pointer_left;
            self.input.steer_right = self.keys_right || self.pointer_right;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.start = false;
                self.input.restart = false;
            }

            self.drain_events();

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            // Calculate FPS from oldest to newest frame
            let oldest_idx = self.frame_index;
            let oldest_time = self.frame_times[oldest_idx];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// React to whatever the sim reported this frame: sounds and the
        /// persisted best score both hang off these.
        fn drain_events(&mut self) {
            let events: Vec<GameEvent> = self.state.events.drain(..).collect();
            for event in events {
                match event {
                    GameEvent::RunStarted => {
                        self.run_was_best = false;
                        self.audio.play(SoundEffect::EngineRev);
                    }
                    GameEvent::RunRestarted => {
                        self.run_was_best = false;
                        self.audio.play(SoundEffect::Restart);
                    }
                    GameEvent::ObstacleSpawned { lane } => {
                        log::debug!("Obstacle spawned in lane {lane}");
                    }
                    GameEvent::Crashed { final_score } => {
                        self.audio.play(SoundEffect::Crash);
                        log::info!("Crashed at {final_score}");
                    }
                    GameEvent::NewHighScore { score } => {
                        self.run_was_best = true;
                        self.audio.play(SoundEffect::HighScore);
                        if self.high_score.record(score) {
                            log::info!("New best: {score}");
                        }
                    }
                }
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.state, time) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let window = web_sys::window().unwrap();
            let document = window.document().unwrap();

            // Score is whole seconds survived
            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&(self.state.score as i32).to_string()));
            }

            // Update best
            if let Some(el) = document.query_selector("#hud-best .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.state.high_score.to_string()));
            }

            // Update FPS
            if let Some(el) = document.get_element_by_id("hud-fps") {
                if self.settings.show_fps {
                    let _ = el.set_attribute("class", "hud-item");
                    if let Some(val) = document.query_selector("#hud-fps .hud-value").ok().flatten()
                    {
                        val.set_text_content(Some(&self.fps.to_string()));
                    }
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }

            // Show/hide title card
            if let Some(el) = document.get_element_by_id("title-card") {
                if self.state.phase == GamePhase::Title {
                    let _ = el.set_attribute("class", "");
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }

            // Show/hide game over
            if let Some(el) = document.get_element_by_id("game-over") {
                if self.state.phase == GamePhase::GameOver {
                    let _ = el.set_attribute("class", "");
                    // Update final stats
                    if let Some(score_el) = document.get_element_by_id("final-score") {
                        score_el.set_text_content(Some(&self.state.final_score.to_string()));
                    }
                    if let Some(best_el) = document.get_element_by_id("final-best") {
                        best_el.set_text_content(Some(&self.state.high_score.to_string()));
                    }
                    if let Some(badge) = document.get_element_by_id("new-best") {
                        let _ =
                            badge.set_attribute("class", if self.run_was_best { "" } else { "hidden" });
                    }
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Lawless Lanes starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = SdfRenderState::new(surface, &adapter, width, height).await;
        game.borrow_mut().render_state = Some(render_state);

        // Set up input handlers
        setup_input_handlers(&canvas, game.clone());

        // Mute when the tab loses focus
        setup_focus_handlers(game.clone());

        // Show HUD
        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Lawless Lanes running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Keyboard down: steering is held, start/restart are one-shots
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                g.ensure_audio();
                match event.key().as_str() {
                    "a" | "A" | "ArrowLeft" => g.keys_left = true,
                    "d" | "D" | "ArrowRight" => g.keys_right = true,
                    " " | "Enter" => g.input.start = true,
                    "r" | "R" => g.input.restart = true,
                    "m" | "M" => {
                        if !event.repeat() {
                            g.toggle_music();
                        }
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard up
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "a" | "A" | "ArrowLeft" => g.keys_left = false,
                    "d" | "D" | "ArrowRight" => g.keys_right = false,
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down: starts from the title, restarts after a crash, and
        // steers by screen half while driving
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.ensure_audio();
                match g.state.phase {
                    GamePhase::Title => g.input.start = true,
                    GamePhase::GameOver => g.input.restart = true,
                    GamePhase::Playing => {
                        let half = canvas_clone.client_width() as f32 / 2.0;
                        if (event.offset_x() as f32) < half {
                            g.pointer_left = true;
                        } else {
                            g.pointer_right = true;
                        }
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up anywhere releases pointer steering
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.pointer_left = false;
                g.pointer_right = false;
            });
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start: tap starts/restarts; a held touch steers by half
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.ensure_audio();
                match g.state.phase {
                    GamePhase::Title => g.input.start = true,
                    GamePhase::GameOver => g.input.restart = true,
                    GamePhase::Playing => {}
                }
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let half = canvas_clone.client_width() as f32 / 2.0;
                    g.pointer_left = x < half;
                    g.pointer_right = x >= half;
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move: sliding a finger across the middle flips direction
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let half = canvas_clone.client_width() as f32 / 2.0;
                    g.pointer_left = x < half;
                    g.pointer_right = x >= half;
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end/cancel: release, or keep steering from a remaining touch
        for event_name in ["touchend", "touchcancel"] {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let half = canvas_clone.client_width() as f32 / 2.0;
                    g.pointer_left = x < half;
                    g.pointer_right = x >= half;
                } else {
                    g.pointer_left = false;
                    g.pointer_right = false;
                }
            });
            let _ = canvas
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_focus_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Window blur: drop held inputs, and mute if the settings say so
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.keys_left = false;
                g.keys_right = false;
                g.pointer_left = false;
                g.pointer_right = false;
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window focus: unmute
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().audio.set_muted(false);
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Lawless Lanes (native) starting...");
    log::info!("The playable build is the web one - serve it with `trunk serve`");

    println!("\nDriving a headless demo run...");
    demo_run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted session against the real sim: dodge until the inevitable crash,
/// then persist the score the same way the web build does.
#[cfg(not(target_arch = "wasm32"))]
fn demo_run() {
    use lawless_lanes::HighScore;
    use lawless_lanes::consts::SIM_DT;
    use lawless_lanes::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

    let mut high_score = HighScore::load();
    let mut state = GameState::new(0xC0FFEE, high_score.best);

    let start = TickInput {
        start: true,
        ..Default::default()
    };
    tick(&mut state, &start, SIM_DT);

    let mut input = TickInput::default();
    let max_ticks = 120 * 120; // cap the demo at two minutes
    for _ in 0..max_ticks {
        if state.phase == GamePhase::GameOver {
            break;
        }

        // Steer away from the nearest obstacle still above the car
        input.steer_left = false;
        input.steer_right = false;
        let car_center = state.car.body.bounds.center().x;
        let threat = state
            .obstacles
            .iter()
            .filter(|o| o.body.bounds.bottom() < state.car.body.bounds.y)
            .max_by(|a, b| a.body.bounds.y.total_cmp(&b.body.bounds.y));
        if let Some(threat) = threat {
            let threat_center = threat.body.bounds.center().x;
            if (threat_center - car_center).abs() < state.road.lane_width {
                if threat_center >= car_center {
                    input.steer_left = true;
                } else {
                    input.steer_right = true;
                }
            }
        }

        tick(&mut state, &input, SIM_DT);
        for event in state.events.drain(..) {
            if let GameEvent::NewHighScore { score } = event {
                high_score.record(score);
            }
        }
    }

    println!(
        "Survived {:.1}s over {} ticks (best: {})",
        state.score, state.time_ticks, state.high_score
    );
}
