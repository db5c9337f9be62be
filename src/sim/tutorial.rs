//! Tutorial state machine and its fading popup
//!
//! Three stages, advancing only on the matching player action. The reached
//! stage is persisted so returning players skip the hints they have seen.

/// Popup fade speed in alpha units per second
const FADE_RATE: f32 = 2.0;

/// Tutorial progression; monotonic, `Finished` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    LearningMovement,
    LearningShooting,
    Finished,
}

impl Stage {
    pub fn index(self) -> u32 {
        match self {
            Stage::LearningMovement => 0,
            Stage::LearningShooting => 1,
            Stage::Finished => 2,
        }
    }

    pub fn from_index(index: u32) -> Self {
        match index {
            0 => Stage::LearningMovement,
            1 => Stage::LearningShooting,
            _ => Stage::Finished,
        }
    }

    /// Hint text shown while in this stage; empty once finished
    pub fn message(self) -> &'static str {
        match self {
            Stage::LearningMovement => "WASD OR DRAG\nTO MOVE",
            Stage::LearningShooting => "CLICK OR TAP\nTO SHOOT",
            Stage::Finished => "",
        }
    }
}

/// Explicit popup fade states; transitions are driven by `update`, no
/// callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeState {
    FadingIn,
    Visible,
    FadingOut,
    Hidden,
}

/// An on-screen hint that fades between messages
#[derive(Debug, Clone)]
pub struct Popup {
    pub alpha: f32,
    state: FadeState,
    message: String,
    /// Message to swap in once the current one has faded out
    pending: Option<String>,
}

impl Popup {
    pub fn new(message: &str) -> Self {
        if message.is_empty() {
            Self {
                alpha: 0.0,
                state: FadeState::Hidden,
                message: String::new(),
                pending: None,
            }
        } else {
            Self {
                alpha: 0.0,
                state: FadeState::FadingIn,
                message: message.to_string(),
                pending: None,
            }
        }
    }

    /// Fade out the current message, then show `message` (or stay hidden if
    /// it is empty)
    pub fn show(&mut self, message: &str) {
        match self.state {
            FadeState::Hidden => {
                if message.is_empty() {
                    return;
                }
                self.message = message.to_string();
                self.state = FadeState::FadingIn;
            }
            _ => {
                self.pending = Some(message.to_string());
                self.state = FadeState::FadingOut;
            }
        }
    }

    pub fn update(&mut self, dt: f32) {
        match self.state {
            FadeState::FadingIn => {
                self.alpha += FADE_RATE * dt;
                if self.alpha >= 1.0 {
                    self.alpha = 1.0;
                    self.state = FadeState::Visible;
                }
            }
            FadeState::FadingOut => {
                self.alpha -= FADE_RATE * dt;
                if self.alpha <= 0.0 {
                    self.alpha = 0.0;
                    match self.pending.take() {
                        Some(next) if !next.is_empty() => {
                            self.message = next;
                            self.state = FadeState::FadingIn;
                        }
                        _ => {
                            self.message.clear();
                            self.state = FadeState::Hidden;
                        }
                    }
                }
            }
            FadeState::Visible | FadeState::Hidden => {}
        }
    }

    pub fn state(&self) -> FadeState {
        self.state
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The tutorial: current stage plus its popup
#[derive(Debug, Clone)]
pub struct Tutorial {
    stage: Stage,
    pub popup: Popup,
}

impl Tutorial {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            popup: Popup::new(stage.message()),
        }
    }

    /// Resume from the persisted stage; a fresh session starts at
    /// `LearningMovement`
    pub fn load() -> Self {
        let stage = load_stage().unwrap_or(Stage::LearningMovement);
        Self::new(stage)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Enemy spawning only begins once the tutorial is done
    pub fn finished(&self) -> bool {
        self.stage == Stage::Finished
    }

    /// First movement input advances out of `LearningMovement`
    pub fn on_moved(&mut self) {
        if self.stage == Stage::LearningMovement {
            self.advance(Stage::LearningShooting);
        }
    }

    /// First shoot input advances out of `LearningShooting`
    pub fn on_shot(&mut self) {
        if self.stage == Stage::LearningShooting {
            self.advance(Stage::Finished);
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.popup.update(dt);
    }

    fn advance(&mut self, next: Stage) {
        self.stage = next;
        self.popup.show(next.message());
        save_stage(next);
        log::info!("Tutorial advanced to {:?}", next);
    }
}

/// LocalStorage key for the persisted stage index
#[allow(dead_code)]
const STORAGE_KEY: &str = "gridfire_tutorial_stage";

#[cfg(target_arch = "wasm32")]
fn load_stage() -> Option<Stage> {
    let storage = web_sys::window()?.local_storage().ok()??;
    let value = storage.get_item(STORAGE_KEY).ok()??;
    value.parse::<u32>().ok().map(Stage::from_index)
}

#[cfg(target_arch = "wasm32")]
fn save_stage(stage: Stage) {
    if let Some(storage) = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
    {
        let _ = storage.set_item(STORAGE_KEY, &stage.index().to_string());
    }
}

/// Native stubs
#[cfg(not(target_arch = "wasm32"))]
fn load_stage() -> Option<Stage> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
fn save_stage(_stage: Stage) {}
