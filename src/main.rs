//! Gridfire entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use glam::Vec2;
    use gridfire::render::{BackendKind, Renderer, create_renderer};
    use gridfire::sim::{FrameInput, Game, Tutorial};

    /// Longest frame we are willing to simulate in one step
    const MAX_FRAME_DT: f32 = 0.1;
    /// Assumed dt for the very first frame, before a baseline exists
    const FALLBACK_DT: f32 = 1.0 / 60.0;

    /// Application state: the simulation, the boxed backend, and the raw
    /// input being accumulated between frames
    struct App {
        game: Game,
        renderer: Option<Box<dyn Renderer>>,
        input: FrameInput,
        last_time: f64,
        /// Device pixel ratio, applied to CSS pixel event coordinates
        dpr: f32,
        /// Last known pointer position in surface pixels; re-projected to
        /// world space every frame since the camera moves
        pointer: Option<Vec2>,
        /// First touch contact drives movement: (identifier, origin, current)
        move_touch: Option<(i32, Vec2, Vec2)>,
        /// Second touch contact aims and shoots: (identifier, current)
        aim_touch: Option<(i32, Vec2)>,
    }

    impl App {
        fn new(seed: u64) -> Self {
            Self {
                game: Game::new(seed, Tutorial::load()),
                renderer: None,
                input: FrameInput::default(),
                last_time: 0.0,
                dpr: 1.0,
                pointer: None,
                move_touch: None,
                aim_touch: None,
            }
        }

        /// Advance one frame and draw it
        fn frame(&mut self, dt: f32) {
            let Some(renderer) = self.renderer.as_mut() else {
                return;
            };

            // Touch contacts feed the per-frame input
            self.input.touch_drag = self
                .move_touch
                .map(|(_, origin, current)| current - origin)
                .filter(|drag| drag.length() > 1.0);

            // Re-project the latest pointer or aim contact into world space
            // against the current camera
            let aim_px = self.aim_touch.map(|(_, p)| p).or(self.pointer);
            self.input.aim = aim_px.map(|p| renderer.screen_to_world(p));

            self.game.update(&self.input, dt, renderer.camera_mut());

            match self.game.render(renderer.as_mut()) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    let (w, h) = renderer.camera().viewport();
                    renderer.set_viewport(w as u32, h as u32);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.game.score.to_string()));
            }

            if let Some(el) = document.query_selector("#hud-health .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{:.0}", self.game.player.health)));
            }

            if let Some(el) = document
                .query_selector("#hud-accuracy .hud-value")
                .ok()
                .flatten()
            {
                el.set_text_content(Some(&format!(
                    "{:.0}%",
                    self.game.player.accuracy() * 100.0
                )));
            }

            // Death and pause overlays
            if let Some(el) = document.get_element_by_id("game-over") {
                let class = if self.game.player.is_dead() {
                    ""
                } else {
                    "hidden"
                };
                let _ = el.set_attribute("class", class);
            }
            if let Some(el) = document.get_element_by_id("pause-overlay") {
                let class = if self.game.paused { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }
        }
    }

    /// Read the render backend from the `renderer` query parameter; the
    /// batch backend is the default
    fn backend_from_query() -> BackendKind {
        let search = web_sys::window()
            .map(|w| w.location())
            .and_then(|l| l.search().ok())
            .unwrap_or_default();
        search
            .trim_start_matches('?')
            .split('&')
            .find_map(|pair| pair.strip_prefix("renderer="))
            .and_then(BackendKind::from_flag)
            .unwrap_or_default()
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Gridfire starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Match the surface to the physical pixel size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(seed)));
        app.borrow_mut().dpr = dpr as f32;

        log::info!("Game initialized with seed: {}", seed);

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

        let backend = backend_from_query();
        let renderer = create_renderer(backend, surface, &adapter, width, height).await;
        app.borrow_mut().renderer = Some(renderer);

        setup_input_handlers(&canvas, app.clone());
        setup_resize(&canvas, app.clone());
        setup_auto_pause(app.clone());

        request_animation_frame(app);

        log::info!("Gridfire running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();

        // Keyboard: held movement keys plus pause/restart
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut a = app.borrow_mut();
                match event.key().as_str() {
                    "w" | "W" | "ArrowUp" => a.input.up = true,
                    "s" | "S" | "ArrowDown" => a.input.down = true,
                    "a" | "A" | "ArrowLeft" => a.input.left = true,
                    "d" | "D" | "ArrowRight" => a.input.right = true,
                    "p" | "P" | "Escape" => a.game.paused = !a.game.paused,
                    "r" | "R" => {
                        let seed = js_sys::Date::now() as u64;
                        a.game.restart(seed);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut a = app.borrow_mut();
                match event.key().as_str() {
                    "w" | "W" | "ArrowUp" => a.input.up = false,
                    "s" | "S" | "ArrowDown" => a.input.down = false,
                    "a" | "A" | "ArrowLeft" => a.input.left = false,
                    "d" | "D" | "ArrowRight" => a.input.right = false,
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse: position aims, button shoots
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let dpr = a.dpr;
                a.pointer = Some(Vec2::new(
                    event.offset_x() as f32 * dpr,
                    event.offset_y() as f32 * dpr,
                ));
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().input.shooting = true;
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().input.shooting = false;
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch: the first contact drags to move, a second contact aims and
        // fires while held
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                let changed = event.changed_touches();
                for i in 0..changed.length() {
                    let Some(touch) = changed.get(i) else { continue };
                    let p = touch_pos(&canvas_clone, &touch, a.dpr);
                    if a.move_touch.is_none() {
                        a.move_touch = Some((touch.identifier(), p, p));
                    } else if a.aim_touch.is_none() {
                        a.aim_touch = Some((touch.identifier(), p));
                        a.input.shooting = true;
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                let a = &mut *a;
                let changed = event.changed_touches();
                for i in 0..changed.length() {
                    let Some(touch) = changed.get(i) else { continue };
                    let p = touch_pos(&canvas_clone, &touch, a.dpr);
                    match (&mut a.move_touch, &mut a.aim_touch) {
                        (Some((id, _, current)), _) if *id == touch.identifier() => {
                            *current = p;
                        }
                        (_, Some((id, current))) if *id == touch.identifier() => {
                            *current = p;
                        }
                        _ => {}
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for event_name in ["touchend", "touchcancel"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                let changed = event.changed_touches();
                for i in 0..changed.length() {
                    let Some(touch) = changed.get(i) else { continue };
                    let id = touch.identifier();
                    if a.move_touch.is_some_and(|(mid, _, _)| mid == id) {
                        a.move_touch = None;
                    }
                    if a.aim_touch.is_some_and(|(aid, _)| aid == id) {
                        a.aim_touch = None;
                        a.input.shooting = false;
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Touch position in surface pixels, relative to the canvas
    fn touch_pos(canvas: &HtmlCanvasElement, touch: &web_sys::Touch, dpr: f32) -> Vec2 {
        let rect = canvas.get_bounding_client_rect();
        Vec2::new(
            (touch.client_x() as f32 - rect.left() as f32) * dpr,
            (touch.client_y() as f32 - rect.top() as f32) * dpr,
        )
    }

    fn setup_resize(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dpr = window.device_pixel_ratio();
            let width = (canvas.client_width() as f64 * dpr) as u32;
            let height = (canvas.client_height() as f64 * dpr) as u32;
            canvas.set_width(width);
            canvas.set_height(height);

            let mut a = app.borrow_mut();
            a.dpr = dpr as f32;
            if let Some(renderer) = a.renderer.as_mut() {
                renderer.set_viewport(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Tab hidden: pause a live run
        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut a = app.borrow_mut();
                    if !a.game.player.is_dead() && !a.game.paused {
                        a.game.paused = true;
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

        // Window blur: same treatment
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut a = app.borrow_mut();
                if !a.game.player.is_dead() && !a.game.paused {
                    a.game.paused = true;
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Regaining focus resets the frame timer so the hidden interval is
        // not simulated as one giant dt
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                app.borrow_mut().last_time = 0.0;
            });
            let window = web_sys::window().unwrap();
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();

            let dt = if a.last_time > 0.0 {
                (((time - a.last_time) / 1000.0) as f32).min(MAX_FRAME_DT)
            } else {
                FALLBACK_DT
            };
            a.last_time = time;

            a.frame(dt);
            a.update_hud();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless demo: runs the deterministic simulation without a surface so the
/// core loop can be exercised from a terminal
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::Vec2;
    use gridfire::render::Camera;
    use gridfire::sim::{FrameInput, Game, Stage, Tutorial};

    env_logger::init();
    log::info!("Gridfire (native) starting headless demo...");

    let mut game = Game::new(0xF17E, Tutorial::new(Stage::Finished));
    let mut camera = Camera::new(1280, 720);

    let input = FrameInput {
        right: true,
        shooting: true,
        aim: Some(Vec2::new(900.0, 0.0)),
        ..Default::default()
    };

    // Ten simulated seconds at 60 Hz
    for _ in 0..600 {
        game.update(&input, 1.0 / 60.0, &mut camera);
    }

    log::info!(
        "Demo finished: score {}, health {:.0}, {} enemies on field, accuracy {:.0}%",
        game.score,
        game.player.health,
        game.enemies.len(),
        game.player.accuracy() * 100.0
    );
}
