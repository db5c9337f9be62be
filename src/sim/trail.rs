//! Decaying position history attached to a moving entity
//!
//! Samples are appended at a fixed minimum interval (independent of frame
//! rate) and fade out at a constant rate. Insertion order is chronological
//! and decay is uniform, so expired samples can only ever be at the front.

use std::collections::VecDeque;

use glam::Vec2;

use crate::consts::{TRAIL_DECAY_RATE, TRAIL_SAMPLE_INTERVAL};

/// One point of trail history
#[derive(Debug, Clone, Copy)]
pub struct TrailSample {
    pub pos: Vec2,
    /// Fade factor in [0,1]; drives render alpha and radius
    pub intensity: f32,
}

/// A fading history of an entity's recent positions, oldest first
#[derive(Debug, Clone)]
pub struct Trail {
    samples: VecDeque<TrailSample>,
    /// Seconds since the last accepted sample
    since_sample: f32,
    disabled: bool,
}

impl Default for Trail {
    fn default() -> Self {
        Self::new()
    }
}

impl Trail {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::new(),
            since_sample: TRAIL_SAMPLE_INTERVAL,
            disabled: false,
        }
    }

    /// Record the entity's current position. Rate-limited: the sample is
    /// dropped if the minimum interval has not elapsed, or if the trail has
    /// been disabled.
    pub fn record(&mut self, pos: Vec2) {
        if self.disabled || self.since_sample < TRAIL_SAMPLE_INTERVAL {
            return;
        }
        self.since_sample = 0.0;
        self.samples.push_back(TrailSample {
            pos,
            intensity: 1.0,
        });
    }

    /// Decay all samples and evict the ones that have fully faded
    pub fn update(&mut self, dt: f32) {
        self.since_sample += dt;
        for sample in &mut self.samples {
            sample.intensity -= TRAIL_DECAY_RATE * dt;
        }
        while self.samples.front().is_some_and(|s| s.intensity <= 0.0) {
            self.samples.pop_front();
        }
    }

    /// Freeze the trail: no further samples are accepted. Existing samples
    /// keep decaying.
    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Samples oldest first
    pub fn samples(&self) -> impl Iterator<Item = &TrailSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_then_rate_limits() {
        let mut trail = Trail::new();
        trail.record(Vec2::ZERO);
        assert_eq!(trail.len(), 1);

        // Immediately again: inside the sample interval, dropped
        trail.record(Vec2::new(1.0, 0.0));
        assert_eq!(trail.len(), 1);

        // After the interval elapses the next sample is accepted
        trail.update(TRAIL_SAMPLE_INTERVAL);
        trail.record(Vec2::new(2.0, 0.0));
        assert_eq!(trail.len(), 2);
    }

    #[test]
    fn decay_evicts_from_front() {
        let mut trail = Trail::new();
        trail.record(Vec2::ZERO);

        // dt large enough that rate * dt >= 1 kills the sample outright
        trail.update(1.0 / TRAIL_DECAY_RATE);
        assert!(trail.is_empty());
    }

    #[test]
    fn no_nonpositive_intensity_survives_update() {
        let mut trail = Trail::new();
        for i in 0..5 {
            trail.record(Vec2::new(i as f32, 0.0));
            trail.update(TRAIL_SAMPLE_INTERVAL);
        }
        trail.update(0.35);
        assert!(trail.samples().all(|s| s.intensity > 0.0));
    }

    #[test]
    fn disabled_trail_rejects_samples_but_keeps_decaying() {
        let mut trail = Trail::new();
        trail.record(Vec2::ZERO);
        trail.disable();

        trail.update(TRAIL_SAMPLE_INTERVAL);
        trail.record(Vec2::new(1.0, 0.0));
        assert_eq!(trail.len(), 1);

        trail.update(1.0);
        assert!(trail.is_empty());
    }
}
