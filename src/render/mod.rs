//! Rendering contract and its two WebGPU backends
//!
//! The orchestrator draws through the `Renderer` trait only. Camera easing,
//! viewport scaling, the hex background, and message drawing are provided
//! trait methods over a shared [`Camera`], so both backends inherit identical
//! behavior; each backend supplies the primitive `fill_circle` plus surface
//! plumbing.

pub mod batch;
pub mod camera;
pub mod font;
pub mod hex;
pub mod immediate;

pub use batch::BatchRenderer;
pub use camera::Camera;
pub use immediate::ImmediateRenderer;

use glam::Vec2;

use crate::color::Color;

/// Scene palette
pub mod palette {
    use crate::color::Color;

    pub const BACKGROUND: [f64; 3] = [0.02, 0.02, 0.05];
    pub const GRID: Color = Color::new(0.16, 0.18, 0.28, 1.0);
    pub const PLAYER: Color = Color::rgb(0.25, 0.85, 0.95);
    pub const ENEMY: Color = Color::rgb(0.95, 0.35, 0.25);
    pub const BULLET: Color = Color::rgb(1.0, 0.95, 0.6);
    pub const TEXT: Color = Color::rgb(0.92, 0.95, 1.0);
}

/// Grid dot radius in world units
const GRID_DOT_RADIUS: f32 = 3.0;
/// Message dot pitch and radius in world units
const MESSAGE_DOT_SPACING: f32 = 6.0;
const MESSAGE_DOT_RADIUS: f32 = 2.4;

/// The render backend contract consumed by the game orchestrator.
///
/// Backends implement the primitives; everything camera-derived is shared.
pub trait Renderer {
    fn camera(&self) -> &Camera;
    fn camera_mut(&mut self) -> &mut Camera;

    /// Resize the drawing surface and recompute viewport scaling
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Begin a frame: drop all accumulated draw state
    fn clear(&mut self);

    /// Queue one filled circle in world coordinates
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    /// Flush the frame to the display surface
    fn present(&mut self) -> Result<(), wgpu::SurfaceError>;

    /// Point the camera at a world position (chase easing, not a jump)
    fn set_target(&mut self, target: Vec2) {
        self.camera_mut().set_target(target);
    }

    /// Advance the camera toward its target
    fn update(&mut self, dt: f32) {
        self.camera_mut().update(dt);
    }

    fn screen_to_world(&self, p: Vec2) -> Vec2 {
        self.camera().screen_to_world(p)
    }

    fn world_to_camera(&self, p: Vec2) -> Vec2 {
        self.camera().world_to_camera(p)
    }

    /// Draw the infinite hex-grid background clipped to the visible bounds
    fn background(&mut self) {
        let (min, max) = self.camera().visible_world_bounds();
        for cell in hex::cells_in_bounds(min, max) {
            self.fill_circle(cell, GRID_DOT_RADIUS, palette::GRID);
        }
    }

    /// Draw a multiline message centered on the screen, one paragraph per
    /// newline
    fn fill_message(&mut self, text: &str, color: Color) {
        if text.is_empty() {
            return;
        }
        let (block_w, block_h) = font::block_size(text);
        let origin = self.camera().pos()
            - Vec2::new(block_w, block_h) * MESSAGE_DOT_SPACING / 2.0;
        for (x, y) in font::layout_dots(text) {
            let pos = origin + Vec2::new(x, y) * MESSAGE_DOT_SPACING;
            self.fill_circle(pos, MESSAGE_DOT_RADIUS, color);
        }
    }
}

/// Which backend to construct; decided once at startup, never per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// One draw call per filled shape
    Immediate,
    /// GPU-instanced circles, one draw call per frame
    #[default]
    Batch,
}

impl BackendKind {
    /// Parse a startup flag value (e.g. the `renderer` query parameter)
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "immediate" => Some(BackendKind::Immediate),
            "batch" => Some(BackendKind::Batch),
            _ => None,
        }
    }
}

/// Construct the selected backend over an already-negotiated surface
pub async fn create_renderer(
    kind: BackendKind,
    surface: wgpu::Surface<'static>,
    adapter: &wgpu::Adapter,
    width: u32,
    height: u32,
) -> Box<dyn Renderer> {
    match kind {
        BackendKind::Immediate => {
            log::info!("Using immediate render backend");
            Box::new(ImmediateRenderer::new(surface, adapter, width, height).await)
        }
        BackendKind::Batch => {
            log::info!("Using batch render backend");
            Box::new(BatchRenderer::new(surface, adapter, width, height).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_flag_parsing() {
        assert_eq!(BackendKind::from_flag("immediate"), Some(BackendKind::Immediate));
        assert_eq!(BackendKind::from_flag("batch"), Some(BackendKind::Batch));
        assert_eq!(BackendKind::from_flag("sdf"), None);
        assert_eq!(BackendKind::default(), BackendKind::Batch);
    }
}
