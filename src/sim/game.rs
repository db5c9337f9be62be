//! Game orchestrator
//!
//! Owns every entity collection and runs the fixed per-frame pipeline:
//! input → movement → collision → pruning → spawn scheduling. This is the
//! only place allowed to read or mutate two entities at once. Rendering is a
//! separate pass dispatched back-to-front through the `Renderer` contract.
//!
//! The simulation is deterministic: a fixed seed plus a fixed sequence of
//! `dt` values and inputs reproduces the same run.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entities::{Bullet, Enemy, Particle, Player};
use super::tutorial::Tutorial;
use crate::color::Color;
use crate::consts::*;
use crate::polar;
use crate::render::{Camera, Renderer, palette};

/// Semantic per-frame input, produced by the platform boundary
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Held direction keys
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Active touch-drag movement vector, if a movement contact is down
    pub touch_drag: Option<Vec2>,
    /// World-space aim target, when the pointer moved this frame
    pub aim: Option<Vec2>,
    /// Fire button / aim contact held
    pub shooting: bool,
}

/// The whole game: entities, score, spawn scheduling, tutorial
pub struct Game {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub particles: Vec<Particle>,
    pub tutorial: Tutorial,
    pub score: u64,
    /// Countdown until the next enemy spawn
    spawn_cooldown: f32,
    /// Current spawn interval; divided by the growth factor after each
    /// spawn, with no floor
    spawn_interval: f32,
    pub paused: bool,
    /// Low-health desaturation factor in [0,1], applied to every color at
    /// render dispatch
    grayness: f32,
    rng: Pcg32,
}

impl Game {
    pub fn new(seed: u64, tutorial: Tutorial) -> Self {
        Self {
            player: Player::new(),
            enemies: Vec::new(),
            bullets: Vec::new(),
            particles: Vec::new(),
            tutorial,
            score: 0,
            spawn_cooldown: SPAWN_INTERVAL_START,
            spawn_interval: SPAWN_INTERVAL_START,
            paused: false,
            grayness: 0.0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Start a fresh run; the tutorial stage survives restarts
    pub fn restart(&mut self, seed: u64) {
        let stage = self.tutorial.stage();
        *self = Game::new(seed, Tutorial::new(stage));
        log::info!("Game restarted with seed {seed}");
    }

    pub fn grayness(&self) -> f32 {
        self.grayness
    }

    pub fn spawn_interval(&self) -> f32 {
        self.spawn_interval
    }

    /// Advance one frame. Order is fixed; see the module docs.
    pub fn update(&mut self, input: &FrameInput, dt: f32, camera: &mut Camera) {
        // (1) Paused: only the desaturation visual advances
        if self.paused {
            self.grayness = 1.0 - self.player.health / PLAYER_MAX_HEALTH;
            return;
        }

        // (2) Desaturation tracks missing health
        self.grayness = 1.0 - self.player.health / PLAYER_MAX_HEALTH;

        // (3) Death near-freezes time; camera easing still completes
        let dt = if self.player.is_dead() {
            dt / DEATH_TIME_DIVISOR
        } else {
            dt
        };

        // (4) Camera chases the player
        camera.set_target(self.player.pos);
        camera.update(dt);

        // (5) Movement intent from held keys plus any touch drag
        let mut dir = Vec2::ZERO;
        if input.up {
            dir.y -= 1.0;
        }
        if input.down {
            dir.y += 1.0;
        }
        if input.left {
            dir.x -= 1.0;
        }
        if input.right {
            dir.x += 1.0;
        }
        if let Some(drag) = input.touch_drag {
            dir += drag;
        }
        let vel = dir.normalize_or_zero() * PLAYER_SPEED;

        // (6) Advance the player; any movement counts for the tutorial
        self.player.advance(vel, dt);
        if vel != Vec2::ZERO {
            self.tutorial.on_moved();
        }

        // (7) Shooting
        if let Some(aim) = input.aim {
            self.player.aim = aim;
        }
        self.player.shooting = input.shooting;
        if let Some(bullet) = self.player.try_shoot(dt) {
            self.bullets.push(bullet);
        }
        if input.shooting {
            self.tutorial.on_shot();
        }

        // (8) Popup fade
        self.tutorial.update(dt);

        // (9) Collisions
        self.resolve_collisions();

        // (10) Advance and prune
        for bullet in &mut self.bullets {
            bullet.update(dt);
        }
        self.bullets.retain(Bullet::alive);

        for particle in &mut self.particles {
            particle.update(dt);
        }
        self.particles.retain(Particle::alive);

        let player_pos = self.player.pos;
        for enemy in &mut self.enemies {
            if !enemy.dead {
                enemy.update(dt, player_pos);
            }
        }
        self.enemies
            .retain(|e| !e.dead && !e.out_of_range(player_pos));

        // (11) Spawn scheduling
        self.run_spawner(dt);
    }

    /// All-pairs collision pass. Bullet hits are resolved before player
    /// overlaps, so an enemy killed by a bullet never damages the player in
    /// the same frame.
    fn resolve_collisions(&mut self) {
        let mut bursts: Vec<(Vec2, Color)> = Vec::new();

        // Enemy x bullet
        for enemy in self.enemies.iter_mut().filter(|e| !e.dead) {
            for bullet in self.bullets.iter_mut().filter(|b| b.alive()) {
                if enemy.pos.distance(bullet.pos) <= enemy.radius + BULLET_RADIUS {
                    enemy.dead = true;
                    // Removed at the pruning step, never mid-scan
                    bullet.lifetime = 0.0;
                    self.score += KILL_SCORE;
                    self.player.heal(KILL_HEAL);
                    self.player.shots_hit += 1;
                    bursts.push((enemy.pos, palette::ENEMY));
                    break;
                }
            }
        }

        // Enemy x player
        let mut player_died = false;
        let player_pos = self.player.pos;
        for enemy in self.enemies.iter_mut().filter(|e| !e.dead) {
            if self.player.is_dead() {
                break;
            }
            if enemy.pos.distance(player_pos) <= enemy.radius + PLAYER_RADIUS {
                self.player.damage(ENEMY_DAMAGE);
                enemy.dead = true;
                bursts.push((player_pos, palette::PLAYER));
                if self.player.is_dead() {
                    player_died = true;
                }
            }
        }

        if player_died {
            // Time-stopped cue: freeze every trail
            self.player.trail.disable();
            for enemy in &mut self.enemies {
                enemy.trail.disable();
            }
            log::info!("Player down at score {}", self.score);
        }

        for (pos, color) in bursts {
            self.spawn_burst(pos, color);
        }
    }

    /// Countdown-driven spawn scheduler, gated on the tutorial. Each spawn
    /// shrinks the interval geometrically.
    fn run_spawner(&mut self, dt: f32) {
        if !self.tutorial.finished() {
            return;
        }
        self.spawn_cooldown -= dt;
        if self.spawn_cooldown <= 0.0 {
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let pos = self.player.pos + polar(ENEMY_SPAWN_DISTANCE, angle);
            self.enemies.push(Enemy::new(pos));
            self.spawn_cooldown = self.spawn_interval;
            self.spawn_interval /= SPAWN_GROWTH;
        }
    }

    fn spawn_burst(&mut self, pos: Vec2, color: Color) {
        for _ in 0..BURST_PARTICLES {
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed = self.rng.random_range(0.4..1.0) * PARTICLE_SPEED;
            self.particles
                .push(Particle::new(pos, polar(speed, angle), PARTICLE_RADIUS, color));
        }
    }

    /// Dispatch the frame back-to-front and flush
    pub fn render(&self, r: &mut dyn Renderer) -> Result<(), wgpu::SurfaceError> {
        r.clear();
        r.background();

        let g = self.grayness;
        for enemy in &self.enemies {
            enemy.render_trail(r, g);
        }
        self.player.render_trail(r, g);
        for enemy in &self.enemies {
            enemy.render(r, g);
        }
        for bullet in &self.bullets {
            bullet.render(r, g);
        }
        self.player.render(r, g);
        for particle in &self.particles {
            particle.render(r, g);
        }

        let popup = &self.tutorial.popup;
        if popup.alpha > 0.0 {
            r.fill_message(popup.message(), palette::TEXT.with_alpha(popup.alpha));
        }

        r.present()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tutorial::Stage;

    fn finished_game(seed: u64) -> Game {
        Game::new(seed, Tutorial::new(Stage::Finished))
    }

    fn grown_enemy(pos: Vec2) -> Enemy {
        let mut e = Enemy::new(pos);
        e.radius = ENEMY_RADIUS;
        e
    }

    #[test]
    fn zero_distance_collision_always_hits() {
        let mut game = finished_game(1);
        let mut camera = Camera::new(1280, 720);

        let pos = Vec2::new(300.0, 0.0);
        game.enemies.push(grown_enemy(pos));
        let mut bullet = Bullet::new(pos, Vec2::X);
        bullet.pos = pos;
        game.bullets.push(bullet);

        game.update(&FrameInput::default(), 0.016, &mut camera);

        assert_eq!(game.score, KILL_SCORE);
        assert_eq!(game.player.shots_hit, 1);
        // Dead enemy and spent bullet are pruned within the same update
        assert!(game.enemies.iter().all(|e| !e.dead));
        assert!(game.enemies.is_empty());
        assert!(game.bullets.is_empty());
        // The kill left a particle burst behind
        assert_eq!(game.particles.len(), BURST_PARTICLES);
    }

    #[test]
    fn kill_heal_clamps_at_max() {
        let mut game = finished_game(2);
        let mut camera = Camera::new(1280, 720);

        game.player.health = 95.0;
        let pos = Vec2::new(300.0, 0.0);
        game.enemies.push(grown_enemy(pos));
        let mut bullet = Bullet::new(pos, Vec2::X);
        bullet.pos = pos;
        game.bullets.push(bullet);

        game.update(&FrameInput::default(), 0.016, &mut camera);
        assert_eq!(game.player.health, PLAYER_MAX_HEALTH);
    }

    #[test]
    fn lethal_collision_sequence_floors_health_and_freezes_trails() {
        let mut game = finished_game(3);
        let mut camera = Camera::new(1280, 720);
        let input = FrameInput::default();

        // Five consecutive overlapping collisions, one per frame
        for frame in 0..5 {
            game.enemies.push(grown_enemy(game.player.pos));
            game.update(&input, 0.016, &mut camera);
            let expected = PLAYER_MAX_HEALTH - ENEMY_DAMAGE * (frame + 1) as f32;
            assert_eq!(game.player.health, expected.max(0.0));
        }

        assert_eq!(game.player.health, 0.0);
        assert!(game.player.is_dead());
        assert!(game.player.trail.is_disabled());

        // A sixth overlap cannot reduce health below zero
        game.enemies.push(grown_enemy(game.player.pos));
        game.update(&input, 0.016, &mut camera);
        assert_eq!(game.player.health, 0.0);
    }

    #[test]
    fn bullet_kill_shields_player_from_same_frame_overlap() {
        let mut game = finished_game(4);
        let mut camera = Camera::new(1280, 720);

        // Enemy on top of the player AND on top of a bullet: the bullet
        // branch runs first, so the player takes no damage
        game.enemies.push(grown_enemy(game.player.pos));
        let mut bullet = Bullet::new(game.player.pos, Vec2::X);
        bullet.pos = game.player.pos;
        game.bullets.push(bullet);

        game.update(&FrameInput::default(), 0.016, &mut camera);
        assert_eq!(game.player.health, PLAYER_MAX_HEALTH);
        assert_eq!(game.score, KILL_SCORE);
    }

    #[test]
    fn spawn_interval_shrinks_geometrically() {
        let mut game = finished_game(5);

        for n in 1..=12 {
            // Force the countdown to elapse exactly once
            let wait = game.spawn_cooldown + 1e-4;
            game.run_spawner(wait);
            let expected = SPAWN_INTERVAL_START / SPAWN_GROWTH.powi(n);
            assert!(
                (game.spawn_interval() - expected).abs() < 1e-3,
                "interval after {n} spawns"
            );
            assert!(game.spawn_interval() > 0.0);
        }
        assert_eq!(game.enemies.len(), 12);
    }

    #[test]
    fn spawning_gated_until_tutorial_finishes() {
        let mut game = Game::new(6, Tutorial::new(Stage::LearningMovement));
        let mut camera = Camera::new(1280, 720);

        // Plenty of time, but the tutorial is not done: nothing spawns
        for _ in 0..10 {
            game.update(&FrameInput::default(), SPAWN_INTERVAL_START, &mut camera);
        }
        assert!(game.enemies.is_empty());

        // Move, then shoot: tutorial completes and spawning begins
        let moving = FrameInput {
            right: true,
            ..Default::default()
        };
        game.update(&moving, 0.016, &mut camera);
        assert_eq!(game.tutorial.stage(), Stage::LearningShooting);

        let shooting = FrameInput {
            aim: Some(game.player.pos + Vec2::X * 100.0),
            shooting: true,
            ..Default::default()
        };
        game.update(&shooting, 0.016, &mut camera);
        assert_eq!(game.tutorial.stage(), Stage::Finished);

        game.update(&FrameInput::default(), SPAWN_INTERVAL_START, &mut camera);
        assert!(!game.enemies.is_empty());
    }

    #[test]
    fn paused_game_does_not_advance() {
        let mut game = finished_game(7);
        let mut camera = Camera::new(1280, 720);
        game.player.health = 40.0;
        game.paused = true;

        let moving = FrameInput {
            right: true,
            shooting: true,
            aim: Some(Vec2::X * 100.0),
            ..Default::default()
        };
        game.update(&moving, 1.0, &mut camera);

        assert_eq!(game.player.pos, Vec2::ZERO);
        assert!(game.bullets.is_empty());
        assert!(game.enemies.is_empty());
        // The desaturation visual still tracks health while paused
        assert!((game.grayness() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn death_near_freezes_simulation_but_not_camera() {
        let mut game = finished_game(8);
        let mut camera = Camera::new(1280, 720);
        game.player.health = 0.0;
        game.enemies.push(grown_enemy(Vec2::new(500.0, 0.0)));

        let before = game.enemies[0].pos;
        game.update(&FrameInput::default(), 0.5, &mut camera);
        let moved = before.distance(game.enemies[0].pos);

        // Enemy advanced by the divided dt, a tiny step
        let expected = ENEMY_SPEED * 0.5 / DEATH_TIME_DIVISOR;
        assert!((moved - expected).abs() < 1.0);
    }

    #[test]
    fn restart_keeps_tutorial_stage() {
        let mut game = finished_game(9);
        game.score = 1234;
        game.player.health = 10.0;

        game.restart(10);
        assert_eq!(game.score, 0);
        assert_eq!(game.player.health, PLAYER_MAX_HEALTH);
        assert_eq!(game.tutorial.stage(), Stage::Finished);
    }

    #[test]
    fn fixed_seed_and_inputs_are_deterministic() {
        let run = |seed: u64| {
            let mut game = finished_game(seed);
            let mut camera = Camera::new(1280, 720);
            let input = FrameInput {
                right: true,
                up: true,
                shooting: true,
                aim: Some(Vec2::new(400.0, 0.0)),
                ..Default::default()
            };
            for _ in 0..600 {
                game.update(&input, 1.0 / 60.0, &mut camera);
            }
            (
                game.player.pos,
                game.score,
                game.enemies.iter().map(|e| e.pos).collect::<Vec<_>>(),
            )
        };

        assert_eq!(run(42), run(42));
    }

    // Minimal recording backend: exercises the provided trait methods
    // (background, fill_message) without a GPU device.
    struct RecordingRenderer {
        camera: Camera,
        circles: Vec<(Vec2, f32, Color)>,
        messages: Vec<String>,
        presented: bool,
    }

    impl RecordingRenderer {
        fn new() -> Self {
            Self {
                camera: Camera::new(1280, 720),
                circles: Vec::new(),
                messages: Vec::new(),
                presented: false,
            }
        }
    }

    impl Renderer for RecordingRenderer {
        fn camera(&self) -> &Camera {
            &self.camera
        }
        fn camera_mut(&mut self) -> &mut Camera {
            &mut self.camera
        }
        fn set_viewport(&mut self, width: u32, height: u32) {
            self.camera.set_viewport(width, height);
        }
        fn clear(&mut self) {
            self.circles.clear();
        }
        fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
            self.circles.push((center, radius, color));
        }
        fn fill_message(&mut self, text: &str, _color: Color) {
            self.messages.push(text.to_string());
        }
        fn present(&mut self) -> Result<(), wgpu::SurfaceError> {
            self.presented = true;
            Ok(())
        }
    }

    #[test]
    fn render_is_backend_agnostic_and_flushes() {
        let mut game = Game::new(11, Tutorial::new(Stage::LearningMovement));
        let mut renderer = RecordingRenderer::new();
        let mut camera = Camera::new(1280, 720);

        // Let the popup fade in so the hint is dispatched
        game.update(&FrameInput::default(), 0.5, &mut camera);

        game.render(&mut renderer).unwrap();
        assert!(renderer.presented);
        // Background grid plus the player at minimum
        assert!(renderer.circles.len() > 10);
        assert_eq!(renderer.messages, vec![Stage::LearningMovement.message()]);
    }
}
