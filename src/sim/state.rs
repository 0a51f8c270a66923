//! Field state and core simulation types
//!
//! One `FieldState` per mounted background. Nothing here is global.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::noise::{NoiseSource, SimplexNoise};
use super::particle::{Particle, SpawnMode};
use super::shockwave::Shockwave;
use crate::consts::MOUSE_OFFSCREEN;
use crate::tuning::FieldTuning;

/// Viewport and scrollable world extent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    /// Viewport width (also the world width)
    pub width: f32,
    /// Viewport height
    pub height: f32,
    /// Full document height
    pub world_height: f32,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32, world_height: f32) -> Self {
        Self {
            width,
            height,
            // A document is never shorter than its viewport
            world_height: world_height.max(height),
        }
    }

    /// Largest scroll offset the page allows
    pub fn scroll_limit(&self) -> f32 {
        (self.world_height - self.height).max(0.0)
    }

    /// Whether a world position lies inside the bounds grown by `buffer`
    pub fn contains(&self, pos: Vec2, buffer: f32) -> bool {
        pos.x >= -buffer
            && pos.x <= self.width + buffer
            && pos.y >= -buffer
            && pos.y <= self.world_height + buffer
    }
}

/// Complete simulation state for one background instance
pub struct FieldState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: FieldTuning,
    pub world: WorldBounds,
    /// Particle pool, never longer than `tuning.capacity`
    pub particles: Vec<Particle>,
    /// Live shockwaves, oldest first
    pub shockwaves: Vec<Shockwave>,
    /// Last pointer position in screen space
    pub mouse: Vec2,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// How particles enter the pool
    pub spawn_mode: SpawnMode,
    /// Fill the pool at once after every reset
    pub prefill: bool,
    rng: Pcg32,
    noise: Box<dyn NoiseSource>,
}

impl FieldState {
    /// Create a state with seeded simplex noise
    pub fn new(seed: u64, world: WorldBounds, tuning: FieldTuning) -> Self {
        // Noise seeds are 32-bit; fold the high half in
        let noise_seed = (seed ^ (seed >> 32)) as u32;
        Self::with_noise(seed, world, tuning, Box::new(SimplexNoise::new(noise_seed)))
    }

    /// Create a state over a caller-supplied noise field
    pub fn with_noise(
        seed: u64,
        world: WorldBounds,
        tuning: FieldTuning,
        noise: Box<dyn NoiseSource>,
    ) -> Self {
        Self {
            seed,
            particles: Vec::with_capacity(tuning.capacity),
            tuning,
            world,
            shockwaves: Vec::new(),
            mouse: Vec2::splat(MOUSE_OFFSCREEN),
            time_ticks: 0,
            spawn_mode: SpawnMode::Edges,
            prefill: false,
            rng: Pcg32::seed_from_u64(seed),
            noise,
        }
    }

    pub fn noise(&self) -> &dyn NoiseSource {
        self.noise.as_ref()
    }

    /// Adopt new viewport/document dimensions. Clears the pool.
    pub fn resize(&mut self, world: WorldBounds) {
        log::debug!(
            "Field resize {}x{} (world height {})",
            world.width,
            world.height,
            world.world_height
        );
        self.world = world;
        self.particles.clear();
        if self.prefill {
            self.fill(SpawnMode::Scatter);
        }
    }

    /// Record a pointer move (screen space)
    pub fn pointer_moved(&mut self, screen: Vec2) {
        self.mouse = screen;
    }

    /// Start a shockwave at a screen position
    pub fn pointer_pressed(&mut self, screen: Vec2, scroll_y: f32) {
        if !self.tuning.shockwaves_enabled {
            return;
        }
        log::debug!("Shockwave at ({}, {}) scroll {}", screen.x, screen.y, scroll_y);
        self.shockwaves
            .push(Shockwave::new(screen, scroll_y, self.tuning.shockwave_strength));
    }

    /// Spawn up to one batch while under capacity. Returns how many were added.
    pub fn spawn_batch(&mut self) -> usize {
        let room = self.tuning.capacity.saturating_sub(self.particles.len());
        let count = room.min(self.tuning.spawn_batch);
        for _ in 0..count {
            let particle = Particle::spawn(&mut self.rng, self.spawn_mode, self.world, &self.tuning);
            self.particles.push(particle);
        }
        count
    }

    /// Spawn until the pool is full
    pub fn fill(&mut self, mode: SpawnMode) {
        while self.particles.len() < self.tuning.capacity {
            let particle = Particle::spawn(&mut self.rng, mode, self.world, &self.tuning);
            self.particles.push(particle);
        }
    }
}
