//! Camera easing and viewport scaling, shared by both render backends
//!
//! World coordinates are y-down to match screen space; the NDC flip happens
//! once, at upload time, in each backend.

use glam::Vec2;

use crate::consts::{REF_HEIGHT, REF_WIDTH};

/// Chase camera with viewport scaling against a fixed reference resolution
#[derive(Debug, Clone)]
pub struct Camera {
    pos: Vec2,
    /// Chase velocity, snapshotted by `set_target` and integrated by
    /// `update`. Deliberately NOT re-derived from the live position error:
    /// when the target is set every frame this behaves like exponential
    /// easing, and that observed behavior is kept as-is.
    vel: Vec2,
    width: f32,
    height: f32,
    scale: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            width: 1.0,
            height: 1.0,
            scale: 1.0,
        };
        camera.set_viewport(width, height);
        camera
    }

    /// Recompute the aspect-preserving uniform scale for a new viewport
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width as f32;
        self.height = height as f32;
        self.scale = (self.width / REF_WIDTH).min(self.height / REF_HEIGHT);
    }

    /// Set a new chase velocity toward `target`
    pub fn set_target(&mut self, target: Vec2) {
        self.vel = target - self.pos;
    }

    /// Advance toward the target along the snapshotted velocity
    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn viewport(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// World point relative to the camera center
    #[inline]
    pub fn world_to_camera(&self, p: Vec2) -> Vec2 {
        p - self.pos
    }

    /// Screen pixel to world point
    #[inline]
    pub fn screen_to_world(&self, p: Vec2) -> Vec2 {
        let center = Vec2::new(self.width / 2.0, self.height / 2.0);
        (p - center) / self.scale + self.pos
    }

    /// World-space rectangle currently visible, as (min, max) corners
    pub fn visible_world_bounds(&self) -> (Vec2, Vec2) {
        let half = Vec2::new(self.width, self.height) / (2.0 * self.scale);
        (self.pos - half, self.pos + half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_scale_is_min_axis_ratio() {
        let cam = Camera::new(REF_WIDTH as u32, REF_HEIGHT as u32);
        assert!((cam.scale() - 1.0).abs() < 1e-6);

        // Half-width window: width is the limiting axis
        let cam = Camera::new(REF_WIDTH as u32 / 2, REF_HEIGHT as u32);
        assert!((cam.scale() - 0.5).abs() < 1e-6);

        // Double height does not raise the scale past the width ratio
        let cam = Camera::new(REF_WIDTH as u32, REF_HEIGHT as u32 * 2);
        assert!((cam.scale() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn target_velocity_is_a_snapshot() {
        let mut cam = Camera::new(1280, 720);
        cam.set_target(Vec2::new(10.0, 0.0));

        // Integrating the full second covers the whole distance...
        cam.update(1.0);
        assert!((cam.pos().x - 10.0).abs() < 1e-5);

        // ...and the velocity is NOT re-derived: further updates overshoot
        cam.update(1.0);
        assert!((cam.pos().x - 20.0).abs() < 1e-5);

        // Only a new set_target recomputes it
        cam.set_target(Vec2::new(20.0, 0.0));
        cam.update(1.0);
        assert!((cam.pos().x - 20.0).abs() < 1e-5);
    }

    #[test]
    fn per_frame_targeting_eases_toward_target() {
        let mut cam = Camera::new(1280, 720);
        let target = Vec2::new(100.0, -40.0);
        let mut last_dist = cam.pos().distance(target);
        for _ in 0..60 {
            cam.set_target(target);
            cam.update(1.0 / 60.0);
            let dist = cam.pos().distance(target);
            assert!(dist <= last_dist);
            last_dist = dist;
        }
        // Converges but never overshoots
        assert!(last_dist < 40.0);
    }

    #[test]
    fn screen_world_round_trip() {
        let mut cam = Camera::new(1920, 1080);
        cam.set_target(Vec2::new(300.0, 200.0));
        cam.update(1.0);

        // Screen center maps to the camera position
        let center = cam.screen_to_world(Vec2::new(960.0, 540.0));
        assert!(center.distance(cam.pos()) < 1e-3);

        // world_to_camera of that point is the origin
        assert!(cam.world_to_camera(center).length() < 1e-3);
    }

    #[test]
    fn visible_bounds_contain_camera() {
        let mut cam = Camera::new(800, 600);
        cam.set_target(Vec2::new(-500.0, 123.0));
        cam.update(1.0);
        let (min, max) = cam.visible_world_bounds();
        assert!(min.x < cam.pos().x && cam.pos().x < max.x);
        assert!(min.y < cam.pos().y && cam.pos().y < max.y);
    }

    #[test]
    fn zero_viewport_is_ignored() {
        let mut cam = Camera::new(1280, 720);
        let scale = cam.scale();
        cam.set_viewport(0, 720);
        assert_eq!(cam.scale(), scale);
    }
}
