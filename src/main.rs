//! Sleigh Run entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlInputElement};

    use sleigh_run::consts::*;
    use sleigh_run::platform::KeyState;
    use sleigh_run::renderer::scene::{Align, DrawOptions, Frame};
    use sleigh_run::renderer::{RenderState, draw_with};
    use sleigh_run::session::{Overlay, Phase};
    use sleigh_run::sim::{GameEvent, LevelStatus};
    use sleigh_run::{HighScores, Session, SetupError, Settings};

    /// Game instance holding all state
    struct Game {
        session: Session,
        render_state: Option<RenderState>,
        /// 2D canvas stacked over the WebGPU one for glyphs and banners
        text: Option<CanvasRenderingContext2d>,
        keys: KeyState,
        accumulator: f32,
        last_time: f64,
        autopilot: bool,
        /// Level shown on the end-of-run Hall of Fame
        board_level: u32,
        /// Cleared on teardown; the frame loop stops re-arming itself
        running: bool,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            Self {
                session: Session::new(Settings::load(), HighScores::load(), seed),
                render_state: None,
                text: None,
                keys: KeyState::new(),
                accumulator: 0.0,
                last_time: 0.0,
                autopilot: false,
                board_level: 1,
                running: true,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            if self.keys.take_confirm() {
                self.session.confirm();
            }

            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.keys.tick_input(self.autopilot);
                for event in self.session.tick(&input) {
                    log::debug!("{:?}", event);
                    if let GameEvent::Crashed { cause, .. } = event {
                        log::info!("Crashed: {:?}", cause);
                    }
                }
                self.accumulator -= SIM_DT;
                substeps += 1;
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let Some(sim) = self.session.sim.as_ref() else {
                return;
            };
            let settings = &self.session.settings;
            let opts = DrawOptions {
                snow: settings.effective_snow(),
                trail: settings.effective_trail(),
            };
            let frame = draw_with(sim, settings.strings(), &opts);

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&frame.vertices) {
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
            if let Some(ref ctx) = self.text {
                draw_labels(ctx, &frame);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            let set = |selector: &str, value: String| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    el.set_text_content(Some(&value));
                }
            };
            let show = |id: &str, visible: bool| {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            };

            if let Some(hud) = self.session.hud() {
                set("#hud-level .hud-value", hud.level.to_string());
                set("#hud-lives .hud-value", hud.lives.to_string());
                set("#hud-time .hud-value", format!("{}s", hud.elapsed_secs));
                set(
                    "#hud-gifts .hud-value",
                    format!("{}/{}", hud.collected, hud.total),
                );
                let best = self.session.scores.best_time(hud.level);
                set(
                    "#hud-best .hud-value",
                    best.map_or_else(|| "-".to_string(), |t| format!("{}s", t)),
                );
            }

            let phase = self.session.phase;
            show("name-entry", phase == Phase::NameEntry);
            show("hud", phase != Phase::NameEntry);
            show("level-won", phase == Phase::LevelWon);
            show("game-over", phase == Phase::GameOver);
            show("victory", phase == Phase::Victory);
            show("elf-caught", self.session.overlay == Some(Overlay::ElfCaught));
            show(
                "final-intro",
                self.session.overlay == Some(Overlay::FinalLevelIntro),
            );

            if matches!(phase, Phase::GameOver | Phase::Victory) {
                set("#final-time", format!("{}s", self.session.player.total_seconds));
                set("#board-level", self.board_level.to_string());
                set("#hall-of-fame", self.hall_of_fame());
            }
        }

        /// One line per entry for the selected level
        fn hall_of_fame(&self) -> String {
            let scores = &self.session.scores;
            if scores.is_empty() {
                return "No times yet".to_string();
            }
            scores
                .for_level(self.board_level)
                .iter()
                .enumerate()
                .map(|(i, s)| format!("{:>2}. {:<12} {:>4}s  {}", i + 1, s.name, s.time, s.date))
                .collect::<Vec<_>>()
                .join("\n")
        }

        /// Stop the loop and cancel anything the level still has pending
        fn teardown(&mut self) {
            self.running = false;
            if let Some(sim) = self.session.sim.as_mut() {
                sim.teardown();
            }
        }
    }

    fn draw_labels(ctx: &CanvasRenderingContext2d, frame: &Frame) {
        ctx.clear_rect(0.0, 0.0, FIELD_WIDTH as f64, FIELD_HEIGHT as f64);
        for label in &frame.labels {
            let [r, g, b, a] = label.color;
            ctx.set_font(&format!("{}px \"Press Start 2P\", monospace", label.size));
            ctx.set_fill_style_str(&format!(
                "rgba({},{},{},{})",
                (r * 255.0) as u8,
                (g * 255.0) as u8,
                (b * 255.0) as u8,
                a
            ));
            ctx.set_text_align(match label.align {
                Align::Left => "left",
                Align::Center => "center",
            });
            let _ = ctx.fill_text(&label.text, label.pos.x as f64, label.pos.y as f64);
        }
    }

    pub async fn run() -> Result<(), SetupError> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Sleigh Run starting...");

        let window = web_sys::window().ok_or(SetupError::MissingWindow)?;
        let document = window.document().ok_or(SetupError::MissingDocument)?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| SetupError::MissingCanvas("canvas".into()))?
            .dyn_into()
            .map_err(|_| SetupError::NotACanvas("canvas".into()))?;

        // Fixed backing resolution; CSS scales it
        let (width, height) = (FIELD_WIDTH as u32, FIELD_HEIGHT as u32);
        canvas.set_width(width);
        canvas.set_height(height);

        let text = text_layer(&document, width, height);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| SetupError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| SetupError::Adapter(e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height).await?;
        {
            let mut g = game.borrow_mut();
            g.render_state = Some(render_state);
            g.text = text;
        }

        setup_input_handlers(game.clone())?;
        setup_name_entry(&document, game.clone());
        setup_language_buttons(&document, game.clone());
        setup_auto_pause(game.clone());
        setup_teardown(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Sleigh Run running!");
        Ok(())
    }

    fn text_layer(
        document: &Document,
        width: u32,
        height: u32,
    ) -> Option<CanvasRenderingContext2d> {
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("text-layer")?
            .dyn_into()
            .ok()?;
        canvas.set_width(width);
        canvas.set_height(height);
        let ctx = canvas.get_context("2d").ok()??.dyn_into().ok();
        if ctx.is_none() {
            log::warn!("No 2D context for text layer; labels disabled");
        }
        ctx
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) -> Result<(), SetupError> {
        let window = web_sys::window().ok_or(SetupError::MissingWindow)?;

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                // Typing a name must not steer or pause
                if g.session.phase == Phase::NameEntry {
                    if key == "Enter" {
                        event.prevent_default();
                        g.session.submit(&typed_name());
                    }
                    return;
                }
                if matches!(g.session.phase, Phase::GameOver | Phase::Victory) {
                    if let Ok(level) = key.parse::<u32>() {
                        if (1..=FINAL_LEVEL).contains(&level) {
                            g.board_level = level;
                            return;
                        }
                    }
                }
                if key == "i" || key == "I" {
                    g.autopilot = !g.autopilot;
                    log::info!("Autopilot: {}", g.autopilot);
                    return;
                }
                if g.keys.key_down(&key) {
                    event.prevent_default();
                }
            });
            window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())
                .map_err(|_| SetupError::Input("keydown"))?;
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut().keys.key_up(&event.key());
            });
            window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())
                .map_err(|_| SetupError::Input("keyup"))?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_name_entry(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(btn) = document.get_element_by_id("start-btn") else {
            log::warn!("No start button; name entry unavailable");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            game.borrow_mut().session.submit(&typed_name());
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Current contents of the name field
    fn typed_name() -> String {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("name-input"))
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    /// Buttons carrying a `data-lang` code switch the message language
    fn setup_language_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        for id in ["lang-en", "lang-it"] {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let Some(code) = btn.get_attribute("data-lang") else {
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                if game.borrow_mut().session.set_language(&code) {
                    log::info!("Language: {}", code);
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Drop held keys and pause a running level
    fn auto_pause(game: &RefCell<Game>, reason: &str) {
        let mut g = game.borrow_mut();
        g.keys.clear();
        if let Some(sim) = g.session.sim.as_mut() {
            if sim.status == LevelStatus::Playing && !sim.paused {
                sim.paused = true;
                log::info!("Auto-paused ({})", reason);
            }
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    auto_pause(&game, "tab hidden");
                }
            });
            let _ = document
                .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                auto_pause(&game, "window blur");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_teardown(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().teardown();
            log::info!("Torn down");
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            if !g.running {
                return;
            }

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Sleigh Run failed to start: {}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;
    use sleigh_run::consts::FINAL_LEVEL;
    use sleigh_run::session::{Phase, Session};
    use sleigh_run::sim::{GameEvent, TickInput};
    use sleigh_run::{HighScores, Settings, Tuning};

    /// Run the game without a window, steered by the autopilot
    #[derive(Parser, Debug)]
    #[command(name = "sleigh-run", about = "Headless Sleigh Run simulation")]
    pub struct Cli {
        /// Level to start on (1-4)
        #[arg(long, default_value_t = 1)]
        level: u32,

        /// Starting lives
        #[arg(long, default_value_t = 3)]
        lives: u32,

        /// Stop after this many ticks (60 per second)
        #[arg(long, default_value_t = 60 * 120)]
        ticks: u64,

        /// RNG seed (defaults to a random one)
        #[arg(long)]
        seed: Option<u64>,

        /// Keep the bonus-life elf away
        #[arg(long)]
        no_elf: bool,

        /// Keep playing the following levels after a win
        #[arg(long)]
        campaign: bool,

        /// JSON file overriding balance values
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// Log a HUD line every this many ticks (0 disables)
        #[arg(long, default_value_t = 60)]
        report_every: u64,

        /// Player name recorded with any win
        #[arg(long, default_value = "AUTOPILOT")]
        name: String,
    }

    pub fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
        let tuning = match &cli.tuning {
            Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
            None => Tuning::default(),
        };
        let settings = Settings {
            spawn_pursuer: !cli.no_elf,
            starting_lives: cli.lives,
            ..Settings::default()
        };
        let seed = cli.seed.unwrap_or_else(rand::random);
        log::info!("Seed {}", seed);

        let mut session = Session::new(settings, HighScores::new(), seed).with_tuning(tuning);
        if session.begin(&cli.name, cli.level.clamp(1, FINAL_LEVEL)).is_none() {
            return Err("player name must not be blank".into());
        }

        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for t in 1..=cli.ticks {
            for event in session.tick(&input) {
                match event {
                    GameEvent::GiftCollected { .. } => log::debug!("{:?}", event),
                    _ => log::info!("tick {}: {:?}", t, event),
                }
            }
            // Nobody reads the overlays here
            session.dismiss_overlay();

            if cli.report_every > 0 && t % cli.report_every == 0 {
                if let Some(hud) = session.hud() {
                    log::info!(
                        "level {} lives {} time {}s gifts {}/{}",
                        hud.level,
                        hud.lives,
                        hud.elapsed_secs,
                        hud.collected,
                        hud.total
                    );
                }
            }

            match session.phase {
                Phase::LevelWon if cli.campaign => {
                    session.next_level();
                }
                Phase::Playing => {}
                _ => break,
            }
        }

        log::info!(
            "Finished: {:?}, level {}, lives {}, total {}s",
            session.phase,
            session.player.current_level,
            session.player.lives,
            session.player.total_seconds
        );
        for level in 1..=FINAL_LEVEL {
            for score in session.scores.for_level(level) {
                println!("level {}\t{}\t{}s", level, score.name, score.time);
            }
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use clap::Parser;

    env_logger::init();
    log::info!("Sleigh Run (native, headless) starting...");
    headless::run(headless::Cli::parse())
}
