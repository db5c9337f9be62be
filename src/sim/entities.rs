//! Moving entities: player, enemies, bullets, particles
//!
//! Each entity owns its position/velocity/lifetime state and knows how to
//! update and render itself. Cross-entity interaction (collision, damage,
//! scoring) happens only in the game orchestrator.

use glam::Vec2;

use super::trail::Trail;
use crate::color::Color;
use crate::consts::*;
use crate::render::{Renderer, palette};

/// A short-lived visual particle
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub lifetime: f32,
    pub max_lifetime: f32,
    pub radius: f32,
    pub color: Color,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32, color: Color) -> Self {
        Self {
            pos,
            vel,
            lifetime: PARTICLE_LIFETIME,
            max_lifetime: PARTICLE_LIFETIME,
            radius,
            color,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.lifetime -= dt;
    }

    pub fn alive(&self) -> bool {
        self.lifetime > 0.0
    }

    pub fn render(&self, r: &mut dyn Renderer, grayness: f32) {
        let alpha = (self.lifetime / self.max_lifetime).clamp(0.0, 1.0);
        let color = self.color.with_alpha(alpha).desaturate(grayness);
        r.fill_circle(self.pos, self.radius, color);
    }
}

/// A player shot; lifetime is fixed at spawn and forced to zero on a hit
#[derive(Debug, Clone)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub lifetime: f32,
}

impl Bullet {
    pub fn new(pos: Vec2, dir: Vec2) -> Self {
        Self {
            pos,
            vel: dir * BULLET_SPEED,
            lifetime: BULLET_LIFETIME,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.lifetime -= dt;
    }

    pub fn alive(&self) -> bool {
        self.lifetime > 0.0
    }

    pub fn render(&self, r: &mut dyn Renderer, grayness: f32) {
        r.fill_circle(self.pos, BULLET_RADIUS, palette::BULLET.desaturate(grayness));
    }
}

/// A pursuing enemy with a spawn-in growth animation and an owned trail
#[derive(Debug, Clone)]
pub struct Enemy {
    pub pos: Vec2,
    /// Current radius; ramps from 0 to `ENEMY_RADIUS` after spawn
    pub radius: f32,
    pub trail: Trail,
    pub dead: bool,
}

impl Enemy {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            radius: 0.0,
            trail: Trail::new(),
            dead: false,
        }
    }

    /// Grow in, seek the player, advance the trail
    pub fn update(&mut self, dt: f32, player_pos: Vec2) {
        if self.radius < ENEMY_RADIUS {
            self.radius = (self.radius + ENEMY_GROW_RATE * dt).min(ENEMY_RADIUS);
        }

        let dir = (player_pos - self.pos).normalize_or_zero();
        self.pos += dir * ENEMY_SPEED * dt;

        self.trail.record(self.pos);
        self.trail.update(dt);
    }

    /// An enemy despawns once it strays too far from the player
    pub fn out_of_range(&self, player_pos: Vec2) -> bool {
        self.pos.distance(player_pos) > ENEMY_DESPAWN_DISTANCE
    }

    pub fn render(&self, r: &mut dyn Renderer, grayness: f32) {
        r.fill_circle(self.pos, self.radius, palette::ENEMY.desaturate(grayness));
    }

    pub fn render_trail(&self, r: &mut dyn Renderer, grayness: f32) {
        render_trail(&self.trail, self.radius, palette::ENEMY, r, grayness);
    }
}

/// The player avatar
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    /// Clamped to [0, PLAYER_MAX_HEALTH]; 0 means dead
    pub health: f32,
    /// World-space aim target
    pub aim: Vec2,
    pub shooting: bool,
    /// Countdown until the next shot is allowed
    shot_timer: f32,
    pub shots_fired: u32,
    pub shots_hit: u32,
    pub trail: Trail,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            pos: Vec2::ZERO,
            health: PLAYER_MAX_HEALTH,
            aim: Vec2::ZERO,
            shooting: false,
            shot_timer: 0.0,
            shots_fired: 0,
            shots_hit: 0,
            trail: Trail::new(),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Heal, clamped to max health
    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(PLAYER_MAX_HEALTH);
    }

    /// Take damage, floored at zero
    pub fn damage(&mut self, amount: f32) {
        self.health = (self.health - amount).max(0.0);
    }

    /// Hit fraction over the whole run; 0 before the first shot
    pub fn accuracy(&self) -> f32 {
        if self.shots_fired == 0 {
            0.0
        } else {
            self.shots_hit as f32 / self.shots_fired as f32
        }
    }

    /// Move by the given velocity and advance the trail
    pub fn advance(&mut self, vel: Vec2, dt: f32) {
        self.pos += vel * dt;
        self.trail.record(self.pos);
        self.trail.update(dt);
    }

    /// Cooldown-gated shot toward the aim target. Returns the spawned bullet
    /// when one fires this tick.
    pub fn try_shoot(&mut self, dt: f32) -> Option<Bullet> {
        self.shot_timer -= dt;
        if !self.shooting || self.shot_timer > 0.0 {
            return None;
        }
        let dir = (self.aim - self.pos).normalize_or_zero();
        if dir == Vec2::ZERO {
            // Aiming at our own center; no direction to shoot in
            return None;
        }
        self.shot_timer = SHOOT_COOLDOWN;
        self.shots_fired += 1;
        Some(Bullet::new(self.pos, dir))
    }

    pub fn render(&self, r: &mut dyn Renderer, grayness: f32) {
        r.fill_circle(self.pos, PLAYER_RADIUS, palette::PLAYER.desaturate(grayness));
    }

    pub fn render_trail(&self, r: &mut dyn Renderer, grayness: f32) {
        render_trail(&self.trail, PLAYER_RADIUS, palette::PLAYER, r, grayness);
    }
}

/// Draw a trail as fading, shrinking circles, oldest first so newer samples
/// paint on top
fn render_trail(trail: &Trail, radius: f32, color: Color, r: &mut dyn Renderer, grayness: f32) {
    for sample in trail.samples() {
        let color = color
            .with_alpha(sample.intensity * 0.5)
            .desaturate(grayness);
        r.fill_circle(sample.pos, radius * sample.intensity, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_dies_at_lifetime_end() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::new(10.0, 0.0), 4.0, palette::PLAYER);
        assert!(p.alive());
        p.update(PARTICLE_LIFETIME + 0.01);
        assert!(!p.alive());
        assert!(p.pos.x > 0.0);
    }

    #[test]
    fn enemy_radius_grows_then_clamps() {
        let mut e = Enemy::new(Vec2::new(500.0, 0.0));
        assert_eq!(e.radius, 0.0);
        e.update(ENEMY_RADIUS / ENEMY_GROW_RATE / 2.0, Vec2::ZERO);
        assert!(e.radius > 0.0 && e.radius < ENEMY_RADIUS);
        e.update(10.0, Vec2::ZERO);
        assert_eq!(e.radius, ENEMY_RADIUS);
    }

    #[test]
    fn enemy_seeks_player() {
        let mut e = Enemy::new(Vec2::new(100.0, 0.0));
        let before = e.pos.distance(Vec2::ZERO);
        e.update(0.1, Vec2::ZERO);
        assert!(e.pos.distance(Vec2::ZERO) < before);
    }

    #[test]
    fn health_clamps_both_ways() {
        let mut p = Player::new();
        p.heal(50.0);
        assert_eq!(p.health, PLAYER_MAX_HEALTH);
        p.damage(PLAYER_MAX_HEALTH * 2.0);
        assert_eq!(p.health, 0.0);
        assert!(p.is_dead());
    }

    #[test]
    fn shooting_respects_cooldown() {
        let mut p = Player::new();
        p.aim = Vec2::new(100.0, 0.0);
        p.shooting = true;

        let first = p.try_shoot(0.016);
        assert!(first.is_some());
        // Bullet flies toward the aim target
        assert!(first.unwrap().vel.x > 0.0);

        // Cooldown not yet elapsed
        assert!(p.try_shoot(0.016).is_none());

        // After the cooldown another shot fires
        assert!(p.try_shoot(SHOOT_COOLDOWN).is_some());
        assert_eq!(p.shots_fired, 2);
    }

    #[test]
    fn degenerate_aim_does_not_shoot() {
        let mut p = Player::new();
        p.aim = p.pos;
        p.shooting = true;
        assert!(p.try_shoot(1.0).is_none());
        assert_eq!(p.shots_fired, 0);
    }
}
