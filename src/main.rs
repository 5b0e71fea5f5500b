//! Pose Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use pose_runner::highscores::{HighScores, format_date};
    use pose_runner::providers::{PooledAssets, SharedPoseCell};
    use pose_runner::sim::{GameState, Keypoint, PoseFrame, TickInput, snapshot, tick};
    use pose_runner::tuning::Tuning;

    // JS bindings for the canvas renderer and host-provided tuning. The page
    // defines window.drawFrame (and optionally window.gameTuning).
    #[wasm_bindgen(inline_js = "
        export function draw_frame(json) {
            if (window.drawFrame) {
                window.drawFrame(json);
            }
        }

        export function host_tuning_json() {
            return window.gameTuning ? JSON.stringify(window.gameTuning) : '';
        }
    ")]
    extern "C" {
        fn draw_frame(json: &str);
        fn host_tuning_json() -> String;
    }

    thread_local! {
        /// Live game instance, reachable from the JS-facing exports below
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        assets: PooledAssets,
        pose: SharedPoseCell,
        input: TickInput,
        highscores: HighScores,
        /// Rank the run on screen achieved, for the game-over panel
        last_rank: Option<usize>,
        was_over: bool,
    }

    impl Game {
        fn new(seed: u64, view_w: f32, view_h: f32, tuning: Tuning) -> Self {
            // The simulation clock is the rAF timestamp, which starts near
            // zero at page load
            Self {
                state: GameState::new(seed, view_w, view_h, 0.0, tuning),
                assets: PooledAssets::new(seed),
                pose: SharedPoseCell::new(),
                input: TickInput::default(),
                highscores: HighScores::load(),
                last_rank: None,
                was_over: false,
            }
        }

        /// Run one simulation tick and clear one-shot inputs
        fn update(&mut self, now_ms: f64) {
            let input = self.input.clone();
            tick(
                &mut self.state,
                &input,
                now_ms,
                &mut self.assets,
                &self.pose,
            );
            self.input = TickInput::default();

            // Record the run the frame it ends
            if self.state.over && !self.was_over {
                self.last_rank = self
                    .highscores
                    .add_time(self.state.final_secs, js_sys::Date::now());
                if self.last_rank.is_some() {
                    self.highscores.save();
                }
            }
            self.was_over = self.state.over;
        }

        /// Serialize the frame for the page renderer
        fn frame_json(&self, now_ms: f64) -> Option<String> {
            match serde_json::to_string(&snapshot(&self.state, now_ms)) {
                Ok(json) => Some(json),
                Err(e) => {
                    log::error!("Snapshot serialization failed: {e}");
                    None
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let window = web_sys::window().unwrap();
            let document = window.document().unwrap();

            // Update lives
            if let Some(el) = document.query_selector("#hud-lives .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.state.lives.to_string()));
            }

            // Update survival time
            if let Some(el) = document.query_selector("#hud-time .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{}s", self.state.elapsed_secs)));
            }

            // Show/hide game over
            if let Some(el) = document.get_element_by_id("game-over") {
                if self.state.over {
                    let _ = el.set_attribute("class", "");
                    if let Some(time_el) = document.get_element_by_id("final-time") {
                        time_el.set_text_content(Some(&format!("{}s", self.state.final_secs)));
                    }
                    if let Some(best_el) = document.get_element_by_id("best-time") {
                        if let Some(entry) = self.highscores.entries.first() {
                            best_el.set_text_content(Some(&format!(
                                "{}s ({})",
                                entry.secs,
                                format_date(entry.timestamp)
                            )));
                        }
                    }
                    if let Some(rank_el) = document.get_element_by_id("final-rank") {
                        let line = match self.last_rank {
                            Some(1) => "New best time!".to_string(),
                            Some(rank) => format!("#{rank} on the board"),
                            None => String::new(),
                        };
                        rank_el.set_text_content(Some(&line));
                    }
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }
    }

    /// Receive one pose estimation frame from the page. `json` is a COCO
    /// keypoint array in capture-pixel coordinates; an empty array means no
    /// person was detected. A malformed frame is dropped and the previous
    /// one stays current.
    #[wasm_bindgen]
    pub fn submit_pose(json: &str, capture_w: f32, capture_h: f32) {
        let keypoints: Vec<Keypoint> = match serde_json::from_str(json) {
            Ok(kps) => kps,
            Err(e) => {
                log::warn!("Ignoring malformed pose frame: {e}");
                return;
            }
        };
        GAME.with(|slot| {
            if let Some(game) = slot.borrow().as_ref() {
                let g = game.borrow();
                if keypoints.is_empty() {
                    g.pose.set(None);
                } else {
                    g.pose.set(Some(PoseFrame {
                        keypoints,
                        capture_w,
                        capture_h,
                    }));
                }
            }
        });
    }

    /// Register a sprite theme holding `sprite_count` images. Themes rotate
    /// in registration order after every pose challenge.
    #[wasm_bindgen]
    pub fn register_theme(sprite_count: u32) {
        GAME.with(|slot| {
            if let Some(game) = slot.borrow().as_ref() {
                game.borrow_mut().assets.register_theme(sprite_count);
            }
        });
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Pose Runner starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        // The page owns the canvas; the simulation only needs its size
        let (view_w, view_h) = document
            .get_element_by_id("game")
            .map(|el| (el.client_width() as f32, el.client_height() as f32))
            .filter(|&(w, h)| w > 0.0 && h > 0.0)
            .unwrap_or((1200.0, 900.0));

        let tuning = {
            let json = host_tuning_json();
            if json.is_empty() {
                Tuning::default()
            } else {
                Tuning::from_json(&json)
            }
        };

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, view_w, view_h, tuning)));
        GAME.with(|slot| *slot.borrow_mut() = Some(game.clone()));

        log::info!(
            "Game initialized with seed {} at {}x{}",
            seed,
            view_w,
            view_h
        );

        setup_input_handlers(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Pose Runner running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut g = game.borrow_mut();
            match event.key().as_str() {
                "ArrowLeft" => g.input.move_left = true,
                "ArrowRight" => g.input.move_right = true,
                " " => g.input.restart = true,
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
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
        // The borrow is released before the page draws, so the page may call
        // back into submit_pose from its draw handler
        let json = {
            let mut g = game.borrow_mut();
            g.update(time);
            g.update_hud();
            g.frame_json(time)
        };
        if let Some(json) = json {
            draw_frame(&json);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Pose Runner (native) starting...");

    headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted headless run: sixty simulated seconds at 60 fps, lane switches
/// on a fixed cadence, no webcam. Every challenge fails without a pose
/// source, so the run ends by attrition well inside the window.
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo() {
    use pose_runner::providers::{NullAssets, NullPoseSource};
    use pose_runner::sim::{GameState, TickInput, tick};
    use pose_runner::tuning::Tuning;

    let mut state = GameState::new(42, 1200.0, 900.0, 0.0, Tuning::default());
    let mut assets = NullAssets;
    let mut frame = 0u64;

    while !state.over && frame < 60 * 60 {
        let now_ms = frame as f64 * (1000.0 / 60.0);
        let input = TickInput {
            move_left: frame % 240 == 0,
            move_right: frame % 240 == 120,
            ..TickInput::default()
        };
        tick(&mut state, &input, now_ms, &mut assets, &NullPoseSource);
        frame += 1;
    }

    assert!(state.over, "headless run should end without a pose source");
    println!(
        "✓ Headless demo complete: survived {}s over {} frames",
        state.final_secs, frame
    );
}
