//! Game simulation
//!
//! Pure, deterministic, and renderer-agnostic: no wall clock, no surface
//! handles, no DOM. The platform layer feeds `FrameInput` and a `dt` into
//! [`Game::update`] and dispatches draw calls through the `Renderer` trait.

pub mod entities;
pub mod game;
pub mod trail;
pub mod tutorial;

pub use entities::{Bullet, Enemy, Particle, Player};
pub use game::{FrameInput, Game};
pub use trail::{Trail, TrailSample};
pub use tutorial::{FadeState, Popup, Stage, Tutorial};
