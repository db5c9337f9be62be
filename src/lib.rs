//! Gridfire - a top-down arcade shooter on an endless hex grid
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, spawning, tutorial)
//! - `render`: The `Renderer` contract and its two WebGPU backends
//! - `color`: RGBA color value type

pub mod color;
pub mod render;
pub mod sim;

pub use color::Color;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Reference resolution used for viewport scaling
    pub const REF_WIDTH: f32 = 1280.0;
    pub const REF_HEIGHT: f32 = 720.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 20.0;
    pub const PLAYER_SPEED: f32 = 280.0;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;

    /// Enemy defaults
    pub const ENEMY_RADIUS: f32 = 18.0;
    pub const ENEMY_SPEED: f32 = 140.0;
    /// Spawn-in animation: radius growth per second, from 0 to full size
    pub const ENEMY_GROW_RATE: f32 = 40.0;
    /// Enemies farther than this from the player despawn
    pub const ENEMY_DESPAWN_DISTANCE: f32 = 2000.0;
    /// Radial distance from the player at which enemies appear
    pub const ENEMY_SPAWN_DISTANCE: f32 = 900.0;
    pub const ENEMY_DAMAGE: f32 = 20.0;

    /// Combat rewards
    pub const KILL_SCORE: u64 = 100;
    pub const KILL_HEAL: f32 = 10.0;

    /// Bullet defaults
    pub const BULLET_RADIUS: f32 = 6.0;
    pub const BULLET_SPEED: f32 = 700.0;
    pub const BULLET_LIFETIME: f32 = 1.2;
    /// Seconds between shots while the fire button is held
    pub const SHOOT_COOLDOWN: f32 = 0.15;

    /// Spawn scheduler: initial interval, shrunk by the growth factor per
    /// spawn. The acceleration is unbounded by design.
    pub const SPAWN_INTERVAL_START: f32 = 3.0;
    pub const SPAWN_GROWTH: f32 = 1.05;

    /// Trail sampling and decay
    pub const TRAIL_SAMPLE_INTERVAL: f32 = 0.02;
    pub const TRAIL_DECAY_RATE: f32 = 2.5;

    /// Particle bursts on kills/impacts
    pub const BURST_PARTICLES: usize = 12;
    pub const PARTICLE_LIFETIME: f32 = 0.6;
    pub const PARTICLE_RADIUS: f32 = 4.0;
    pub const PARTICLE_SPEED: f32 = 220.0;

    /// Time divisor applied while the player is dead (near-freeze, so the
    /// death-screen camera easing still completes)
    pub const DEATH_TIME_DIVISOR: f32 = 20.0;

    /// Hex background grid pitch (world units between cell columns)
    pub const HEX_PITCH: f32 = 120.0;
}

/// Convert polar (magnitude, angle) to a cartesian vector
#[inline]
pub fn polar(magnitude: f32, angle: f32) -> Vec2 {
    Vec2::new(magnitude * angle.cos(), magnitude * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn polar_axes() {
        let right = polar(5.0, 0.0);
        assert!((right.x - 5.0).abs() < 1e-5);
        assert!(right.y.abs() < 1e-5);

        let up = polar(3.0, std::f32::consts::FRAC_PI_2);
        assert!(up.x.abs() < 1e-5);
        assert!((up.y - 3.0).abs() < 1e-5);
    }

    #[test]
    fn normalize_zero_vector_is_zero() {
        // Pinned policy: normalizing the zero vector yields the zero vector,
        // never NaN components.
        let v = Vec2::ZERO.normalize_or_zero();
        assert_eq!(v, Vec2::ZERO);
    }

    proptest! {
        #[test]
        fn normalize_nonzero_has_unit_length(
            x in -1000.0f32..1000.0,
            y in -1000.0f32..1000.0,
        ) {
            let v = Vec2::new(x, y);
            prop_assume!(v.length() > 1e-3);
            let n = v.normalize_or_zero();
            prop_assert!((n.length() - 1.0).abs() < 1e-4);
        }

        #[test]
        fn polar_magnitude_round_trip(
            m in 0.0f32..1000.0,
            a in -std::f32::consts::PI..std::f32::consts::PI,
        ) {
            let v = polar(m, a);
            prop_assert!((v.length() - m).abs() < m.max(1.0) * 1e-4);
        }
    }
}
