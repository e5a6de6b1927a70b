//! Galaxy Dash entry point
//!
//! Wires browser input, the DOM HUD and audio cues to the simulation core.
//! Native builds run a short headless demo session instead.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{KeyboardEvent, MouseEvent, TouchEvent};

    use galaxy_dash::audio::AudioPlayer;
    use galaxy_dash::persistence::{LocalStore, SavedProgress};
    use galaxy_dash::sim::{
        FrameAdmission, GameEvent, GameState, IntentGate, Mode, TickInput, tick,
    };

    /// Browser session: the sim core plus input/HUD/audio glue around it
    struct Game {
        state: GameState,
        store: LocalStore,
        input: TickInput,
        admission: FrameAdmission,
        gate: IntentGate,
        audio: AudioPlayer,
    }

    impl Game {
        fn new() -> Self {
            let store = LocalStore;
            let saved = SavedProgress::load(&store);
            let (width, height) = viewport();
            let seed = js_sys::Date::now() as u64;
            log::info!("Starting session: {width}x{height}, seed {seed}");
            Self {
                state: GameState::new(width, height, seed, saved),
                store,
                input: TickInput::default(),
                admission: FrameAdmission::new(),
                gate: IntentGate::new(),
                audio: AudioPlayer::new(),
            }
        }

        fn frame(&mut self, now_ms: f64) {
            if let Some(dt) = self.admission.admit(now_ms) {
                let input = std::mem::take(&mut self.input);
                tick(&mut self.state, &input, dt, now_ms, &mut self.store);
            }
            self.update_hud();
            self.drain_events();
        }

        /// Primary action: flap (or default-select) while active, restart
        /// from an end screen
        fn primary_action(&mut self) {
            match self.state.mode {
                Mode::GameOver | Mode::Victory => self.input.restart = true,
                _ => self.input.flap = true,
            }
            self.audio.resume();
        }

        fn drain_events(&mut self) {
            for event in self.state.take_events() {
                match event {
                    GameEvent::Sound(cue) => self.audio.play(cue),
                    GameEvent::ShareComposed(text) => open_share(&text),
                    GameEvent::ShakeStarted | GameEvent::CraftUnlocked(_) => {}
                }
            }
        }

        /// Mirror HUD values into the DOM text elements
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud = self.state.hud();
            let fields = [
                ("score", hud.score.to_string()),
                ("highScore", hud.high_score.to_string()),
                ("level", hud.level.to_string()),
                ("lives", hud.lives.to_string()),
            ];
            for (id, value) in fields {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(&value));
                }
            }
        }
    }

    fn viewport() -> (f32, f32) {
        let window = web_sys::window().expect("no window");
        let width = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(1280.0);
        let height = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(720.0);
        (width as f32, height as f32)
    }

    /// Hand the composed result string to the external share mechanism
    fn open_share(text: &str) {
        let encoded = String::from(js_sys::encode_uri_component(text));
        let url = format!("https://twitter.com/intent/tweet?text={encoded}");
        if let Some(window) = web_sys::window() {
            let _ = window.open_with_url_and_target(&url, "_blank");
        }
    }

    fn attach_input(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        // Keyboard: space = primary action, digits pick a craft, S shares
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let now = js_sys::Date::now();
                match event.code().as_str() {
                    "Space" => {
                        event.prevent_default();
                        if g.gate.accept(now) {
                            g.primary_action();
                        }
                    }
                    "Digit1" if g.gate.accept(now) => g.input.select = Some(0),
                    "Digit2" if g.gate.accept(now) => g.input.select = Some(1),
                    "Digit3" if g.gate.accept(now) => g.input.select = Some(2),
                    "Digit4" if g.gate.accept(now) => g.input.select = Some(3),
                    "KeyS" if g.gate.accept(now) => g.input.share = true,
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.gate.accept(js_sys::Date::now()) {
                    g.primary_action();
                }
            });
            let _ = window
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                if g.gate.accept(js_sys::Date::now()) {
                    g.primary_action();
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        let game = Rc::new(RefCell::new(Game::new()));
        attach_input(game.clone());
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use galaxy_dash::consts::FRAME_MS;
    use galaxy_dash::persistence::{MemoryStore, SavedProgress};
    use galaxy_dash::sim::{GameState, Mode, TickInput, tick};

    env_logger::init();
    log::info!("Galaxy Dash (native) - running a headless demo session");

    let mut store = MemoryStore::new();
    let saved = SavedProgress::load(&store);
    let mut state = GameState::new(1280.0, 720.0, 7, saved);

    let select = TickInput {
        select: Some(0),
        ..Default::default()
    };
    tick(&mut state, &select, 1.0, 0.0, &mut store);

    // Scripted run: flap on a fixed cadence until the session ends
    for frame in 0..1800u64 {
        let input = TickInput {
            flap: frame % 40 == 0,
            ..Default::default()
        };
        let now_ms = (frame + 1) as f64 * FRAME_MS;
        tick(&mut state, &input, 1.0, now_ms, &mut store);
        if state.mode != Mode::Playing {
            break;
        }
    }

    let view = state.frame_view();
    println!(
        "mode {:?} | score {} | high score {} | level {} | lives {} | obstacles {} | particles {}",
        view.mode,
        view.hud.score,
        view.hud.high_score,
        view.hud.level,
        view.hud.lives,
        view.obstacles.len(),
        view.particles.len(),
    );
}
