//! Facenoid entry point
//!
//! Handles platform wiring: config fetch, canvas and DOM event setup, and
//! the requestAnimationFrame loop that drives the simulation.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{CustomEvent, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use facenoid::audio::SoundBank;
    use facenoid::config::GameConfig;
    use facenoid::consts::*;
    use facenoid::input::{self, PaddleFeed};
    use facenoid::renderer::CanvasPainter;
    use facenoid::scores::ScoreBoard;
    use facenoid::sim::{
        GamePhase, GameState, Resolution, SideEffect, TickInput, apply_resolution, resolve, tick,
        tick_pre,
    };
    use facenoid::worker::{ResolveRequest, ResolveResponse, WorkerLink, absorb_response};

    /// Game instance holding sim state plus all platform handles
    struct Game {
        state: GameState,
        painter: CanvasPainter,
        audio: SoundBank,
        feed: PaddleFeed,
        input: TickInput,
        last_time: f64,
        // Physics offload; None resolves on the main thread
        worker: Option<web_sys::Worker>,
        link: WorkerLink,
        /// Frame time accrued while a worker request is outstanding
        dt_pending: f32,
        scores: ScoreBoard,
        // Track phase edges for score recording
        last_phase: GamePhase,
        /// Set on page teardown; the frame loop stops re-arming
        stopped: bool,
    }

    impl Game {
        fn new(
            config: GameConfig,
            painter: CanvasPainter,
            audio: SoundBank,
            worker: Option<web_sys::Worker>,
        ) -> Self {
            let feed = PaddleFeed::new(config.face_detect.clone());
            Self {
                state: GameState::new(config),
                painter,
                audio,
                feed,
                input: TickInput::default(),
                last_time: 0.0,
                worker,
                link: WorkerLink::new(),
                dt_pending: 0.0,
                scores: ScoreBoard::load(),
                last_phase: GamePhase::Idle,
                stopped: false,
            }
        }

        /// Advance the sim by one frame's worth of time
        fn update(&mut self, dt: f32) {
            let dt = dt.min(MAX_FRAME_MS);
            let input = std::mem::take(&mut self.input);

            if self.worker.is_some() {
                self.step_offloaded(&input, dt);
            } else {
                let effects = tick(&mut self.state, &input, dt);
                self.dispatch(&effects);
            }

            let phase = self.state.phase;
            if phase != self.last_phase {
                if phase == GamePhase::GameOver {
                    self.record_score();
                }
                self.last_phase = phase;
            }
        }

        /// Ship the collision pass to the worker; everything else stays local
        fn step_offloaded(&mut self, input: &TickInput, dt: f32) {
            if !tick_pre(&mut self.state, input, dt) {
                self.dt_pending = 0.0;
                return;
            }
            self.dt_pending = (self.dt_pending + dt).min(MAX_FRAME_MS);
            if self.link.busy() || self.dt_pending <= 0.0 {
                return;
            }
            let Some(seq) = self.link.begin() else { return };
            let request = ResolveRequest {
                seq,
                dt: self.dt_pending,
                model: self.state.model.clone(),
                config: self.state.config.clone(),
            };
            self.dt_pending = 0.0;
            self.post(request);
        }

        fn post(&mut self, request: ResolveRequest) {
            let json = match serde_json::to_string(&request) {
                Ok(json) => json,
                Err(e) => {
                    log::warn!("Dropping physics request: {e}");
                    self.link.cancel();
                    return;
                }
            };
            let posted = self
                .worker
                .as_ref()
                .map(|w| w.post_message(&JsValue::from_str(&json)));
            if !matches!(posted, Some(Ok(()))) {
                log::warn!("Worker post failed - resolving on the main thread from now on");
                self.worker = None;
                self.link.cancel();
                let Resolution { outcome, effects } =
                    resolve(&mut self.state.model, request.dt, &self.state.config);
                let effects = apply_resolution(&mut self.state, outcome, effects);
                self.dispatch(&effects);
            }
        }

        /// Interpret side effects; state changes already landed in the tick
        fn dispatch(&self, effects: &[SideEffect]) {
            for effect in effects {
                if let SideEffect::Sound(cue) = effect {
                    self.audio.play(*cue);
                }
            }
        }

        fn record_score(&mut self) {
            let player = &self.state.player;
            if let Some(rank) = self
                .scores
                .add_score(player.score, player.level, js_sys::Date::now())
            {
                self.scores.save();
                log::info!("Score {} enters the table at rank {}", player.score, rank);
            }
        }

        /// Mirror score/lives/level and phase overlays into the DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.get_element_by_id("hud-score") {
                el.set_text_content(Some(&self.state.player.score.to_string()));
            }
            if let Some(el) = document.get_element_by_id("hud-lives") {
                el.set_text_content(Some(&self.state.player.lives.to_string()));
            }
            if let Some(el) = document.get_element_by_id("hud-level") {
                el.set_text_content(Some(&(self.state.player.level + 1).to_string()));
            }

            set_visible(&document, "start-overlay", self.state.phase == GamePhase::Idle);
            set_visible(&document, "pause-overlay", self.state.phase == GamePhase::Paused);

            let over = self.state.phase == GamePhase::GameOver;
            set_visible(&document, "game-over", over);
            if over {
                if let Some(el) = document.get_element_by_id("final-score") {
                    el.set_text_content(Some(&self.state.player.score.to_string()));
                }
                if let (Some(el), Some(best)) = (
                    document.get_element_by_id("best-score"),
                    self.scores.top_score(),
                ) {
                    el.set_text_content(Some(&best.to_string()));
                }
            }
        }

        /// Fresh round with the same config; drops anything still in flight
        fn restart(&mut self) {
            self.state.restart();
            self.input = TickInput::default();
            self.feed.reset();
            self.link.cancel();
            self.dt_pending = 0.0;
            self.last_phase = self.state.phase;
            log::info!("Game restarted");
        }

        /// Tear down: detach from the frame loop and kill the worker
        fn stop(&mut self) {
            self.stopped = true;
            if let Some(worker) = self.worker.take() {
                worker.terminate();
            }
            self.link.cancel();
            log::info!("Stopped");
        }
    }

    fn set_visible(document: &web_sys::Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Facenoid starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("playfield")
            .expect("no playfield canvas")
            .dyn_into()
            .expect("not a canvas");
        canvas.set_width(PLAYFIELD_W as u32);
        canvas.set_height(PLAYFIELD_H as u32);

        // Without a valid config the game never starts
        let config = match GameConfig::fetch(CONFIG_URL).await {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Config unavailable, not starting: {e}");
                set_visible(&document, "config-error", true);
                return;
            }
        };

        let Some(painter) = CanvasPainter::new(&canvas) else {
            log::error!("Renderer unavailable, not starting");
            return;
        };
        let audio = SoundBank::new(&config.sounds);

        // The worker shim loads this same wasm module and answers each posted
        // request JSON with the resolve_step() result
        let worker = if config.game.use_worker {
            match web_sys::Worker::new("worker.js") {
                Ok(w) => Some(w),
                Err(e) => {
                    log::warn!("Worker unavailable ({e:?}) - resolving on the main thread");
                    None
                }
            }
        } else {
            None
        };

        let game = Rc::new(RefCell::new(Game::new(
            config,
            painter,
            audio,
            worker.clone(),
        )));
        if let Some(w) = &worker {
            setup_worker(game.clone(), w);
        }

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        setup_input_handlers(&canvas, game.clone());
        setup_restart_button(game.clone());
        setup_auto_pause(game.clone());
        setup_teardown(game.clone());

        request_animation_frame(game);

        log::info!("Facenoid running!");
    }

    fn setup_worker(game: Rc<RefCell<Game>>, worker: &web_sys::Worker) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MessageEvent| {
            let Some(json) = event.data().as_string() else {
                return;
            };
            let response: ResolveResponse = match serde_json::from_str(&json) {
                Ok(response) => response,
                Err(e) => {
                    // Free the slot so physics does not stall behind a bad reply
                    log::warn!("Malformed worker response ({e}) - resetting the link");
                    game.borrow_mut().link.cancel();
                    return;
                }
            };
            let mut g = game.borrow_mut();
            if !g.link.accept(response.seq) {
                log::info!("Discarding stale worker response {}", response.seq);
                return;
            }
            let effects = absorb_response(&mut g.state, response);
            g.dispatch(&effects);
        });
        worker.set_onmessage(Some(closure.as_ref().unchecked_ref()));
        closure.forget();
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse steers by absolute position over the canvas
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let ratio = input::pointer_ratio(
                    event.offset_x() as f32,
                    canvas_clone.client_width() as f32,
                );
                g.input.target_ratio = Some(ratio);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click starts a round from the idle screen
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().state.start();
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Face tracker events dispatched by the page, detail = normalized x
        {
            let game = game.clone();
            let window = web_sys::window().expect("no window");
            let closure = Closure::<dyn FnMut(_)>::new(move |event: CustomEvent| {
                let Some(face_x) = event.detail().as_f64() else {
                    return;
                };
                let mut g = game.borrow_mut();
                if let Some(ratio) = g.feed.offer(face_x as f32) {
                    g.input.target_ratio = Some(ratio);
                }
            });
            let _ = window
                .add_event_listener_with_callback("facemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard: arrows nudge the target, Escape toggles pause
        {
            let game = game.clone();
            let window = web_sys::window().expect("no window");
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" => {
                        let current = match g.input.target_ratio {
                            Some(ratio) => ratio,
                            None => g.state.model.paddle.target_ratio(&g.state.config),
                        };
                        g.input.target_ratio = Some(input::nudge(current, -KEY_STEP));
                    }
                    "ArrowRight" => {
                        let current = match g.input.target_ratio {
                            Some(ratio) => ratio,
                            None => g.state.model.paddle.target_ratio(&g.state.config),
                        };
                        g.input.target_ratio = Some(input::nudge(current, KEY_STEP));
                    }
                    " " | "Enter" => g.state.start(),
                    "Escape" => g.input.pause = true,
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().restart();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Tab switch or minimize
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.state.phase == GamePhase::Running {
                        g.input.pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Click outside the window
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Running {
                    g.input.pause = true;
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_teardown(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().stop();
        });
        let _ =
            window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            if g.stopped {
                return;
            }

            // First frame has no previous timestamp; draw only
            let dt = if g.last_time > 0.0 {
                (time - g.last_time) as f32
            } else {
                0.0
            };
            g.last_time = time;

            g.feed.begin_frame();
            g.update(dt);
            g.painter.draw(&g.state);
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

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use facenoid::config::GameConfig;
    use facenoid::sim::{Cue, GamePhase, GameState, SideEffect, TickInput, tick};

    env_logger::init();
    log::info!("Facenoid (native) starting...");
    log::info!("The playable build targets wasm32 - serve the web version to play");

    // Headless demo: default tuning, paddle parked mid-lane, 60 Hz frames
    let mut state = GameState::new(GameConfig::default());
    state.start();
    let input = TickInput {
        target_ratio: Some(0.5),
        pause: false,
    };

    let mut brick_hits = 0usize;
    for _ in 0..600 {
        for effect in tick(&mut state, &input, 1000.0 / 60.0) {
            if matches!(effect, SideEffect::Sound(Cue::Brick)) {
                brick_hits += 1;
            }
        }
        if state.phase == GamePhase::GameOver {
            break;
        }
    }
    println!(
        "10s demo: {} brick hits, score {}, lives {}, phase {:?}",
        brick_hits, state.player.score, state.player.lives, state.phase
    );
}
