//! Particle record and per-tick integrator
//!
//! A particle never dies: when it drifts past the world edge plus the wrap
//! buffer it reappears on the opposite edge with its velocity intact.

use glam::Vec2;
use rand::Rng;

use super::noise::{NoiseSource, flow_force};
use super::shockwave::Shockwave;
use super::state::WorldBounds;
use crate::consts::GROUP_COUNT;
use crate::tuning::FieldTuning;

/// Where a freshly created particle is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpawnMode {
    /// Just outside a random world edge
    #[default]
    Edges,
    /// Anywhere inside the world
    Scatter,
}

/// A flow-field particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// World position
    pub pos: Vec2,
    pub vel: Vec2,
    /// Color group / noise layer (0..GROUP_COUNT)
    pub group: u8,
    /// Multiplier on the base max speed
    pub speed_mod: f32,
    pub radius: f32,
    /// Ticks since spawn (drives the hue shift)
    pub life: u32,
}

/// Everything a particle reads during one tick
pub struct StepContext<'a> {
    pub noise: &'a dyn NoiseSource,
    pub shockwaves: &'a [Shockwave],
    /// Mouse position already converted to world space
    pub mouse_world: Vec2,
    pub time_ticks: u64,
    pub world: WorldBounds,
    pub tuning: &'a FieldTuning,
}

impl Particle {
    /// Create a particle with random group, speed and size
    pub fn spawn<R: Rng>(
        rng: &mut R,
        mode: SpawnMode,
        world: WorldBounds,
        tuning: &FieldTuning,
    ) -> Self {
        let buffer = tuning.wrap_buffer;
        let pos = match mode {
            SpawnMode::Scatter => Vec2::new(
                rng.random::<f32>() * world.width,
                rng.random::<f32>() * world.world_height,
            ),
            SpawnMode::Edges => match rng.random_range(0..4u8) {
                0 => Vec2::new(rng.random::<f32>() * world.width, -buffer),
                1 => Vec2::new(
                    world.width + buffer,
                    rng.random::<f32>() * world.world_height,
                ),
                2 => Vec2::new(
                    rng.random::<f32>() * world.width,
                    world.world_height + buffer,
                ),
                _ => Vec2::new(-buffer, rng.random::<f32>() * world.world_height),
            },
        };

        Self {
            pos,
            vel: Vec2::ZERO,
            group: rng.random_range(0..GROUP_COUNT),
            speed_mod: tuning.speed_mod_min + rng.random::<f32>() * tuning.speed_mod_range,
            radius: tuning.radius_min + rng.random::<f32>() * tuning.radius_range,
            life: 0,
        }
    }

    /// Advance one tick: age, flow, clamp, hover, shockwaves, move, wrap
    pub fn step(&mut self, ctx: &StepContext<'_>) {
        self.life = self.life.saturating_add(1);

        self.vel += flow_force(ctx.noise, self.pos, self.group, ctx.time_ticks, ctx.tuning);
        self.clamp_speed(ctx.tuning);

        self.vel += hover_force(self.pos, ctx.mouse_world, ctx.tuning);
        if ctx.tuning.shockwaves_enabled {
            for wave in ctx.shockwaves {
                self.vel += wave.force_on(self.pos, ctx.tuning.shockwave_band);
            }
        }

        self.pos += self.vel;
        self.wrap(ctx.world, ctx.tuning.wrap_buffer);
    }

    /// Rescale velocity to the particle's max speed, keeping its direction
    pub fn clamp_speed(&mut self, tuning: &FieldTuning) {
        self.vel = self.vel.clamp_length_max(tuning.max_speed(self.speed_mod));
    }

    /// Toroidal wrap at world bounds plus buffer
    pub fn wrap(&mut self, world: WorldBounds, buffer: f32) {
        if self.pos.x < -buffer {
            self.pos.x = world.width + buffer;
        }
        if self.pos.x > world.width + buffer {
            self.pos.x = -buffer;
        }
        if self.pos.y < -buffer {
            self.pos.y = world.world_height + buffer;
        }
        if self.pos.y > world.world_height + buffer {
            self.pos.y = -buffer;
        }
    }
}

/// Push away from the mouse, linear in proximity. Zero at zero distance.
pub fn hover_force(pos: Vec2, mouse_world: Vec2, tuning: &FieldTuning) -> Vec2 {
    if !tuning.hover_enabled {
        return Vec2::ZERO;
    }
    let offset = pos - mouse_world;
    let dist = offset.length();
    if dist >= tuning.hover_radius {
        return Vec2::ZERO;
    }
    let proximity = (tuning.hover_radius - dist) / tuning.hover_radius;
    offset.normalize_or_zero() * proximity * tuning.hover_force
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::noise::ConstantNoise;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn world() -> WorldBounds {
        WorldBounds::new(800.0, 600.0, 2400.0)
    }

    fn particle_at(x: f32, y: f32) -> Particle {
        Particle {
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            group: 0,
            speed_mod: 1.0,
            radius: 1.5,
            life: 0,
        }
    }

    #[test]
    fn test_hover_pushes_away_proportionally() {
        let tuning = FieldTuning::default();
        let mouse = Vec2::new(100.0, 100.0);
        let force = hover_force(Vec2::new(150.0, 100.0), mouse, &tuning);

        let expected = (150.0 - 50.0) / 150.0 * tuning.hover_force;
        assert!((force.length() - expected).abs() < 1e-5);
        assert!(force.x > 0.0);
        assert!(force.y.abs() < 1e-6);
    }

    #[test]
    fn test_hover_ignores_far_and_coincident_pointer() {
        let tuning = FieldTuning::default();
        let p = Vec2::new(400.0, 400.0);
        assert_eq!(hover_force(p, Vec2::new(400.0, 600.0), &tuning), Vec2::ZERO);
        assert_eq!(hover_force(p, p, &tuning), Vec2::ZERO);

        let disabled = FieldTuning {
            hover_enabled: false,
            ..Default::default()
        };
        assert_eq!(hover_force(p, Vec2::new(410.0, 400.0), &disabled), Vec2::ZERO);
    }

    #[test]
    fn test_clamp_preserves_direction() {
        let tuning = FieldTuning::default();
        let mut p = particle_at(0.0, 0.0);
        p.speed_mod = 0.9;
        p.vel = Vec2::new(3.0, 4.0);
        p.clamp_speed(&tuning);

        let max = tuning.base_speed * 0.9;
        assert!((p.vel.length() - max).abs() < 1e-5);
        assert!((p.vel.x / p.vel.y - 0.75).abs() < 1e-5);

        // Already slow enough: untouched
        p.vel = Vec2::new(0.01, 0.02);
        p.clamp_speed(&tuning);
        assert_eq!(p.vel, Vec2::new(0.01, 0.02));
    }

    #[test]
    fn test_wrap_moves_to_opposite_edge() {
        let w = world();
        let mut p = particle_at(-51.0, 2451.0);
        p.wrap(w, 50.0);
        assert_eq!(p.pos, Vec2::new(850.0, -50.0));

        let mut p = particle_at(851.0, -60.0);
        p.wrap(w, 50.0);
        assert_eq!(p.pos, Vec2::new(-50.0, 2450.0));

        // Inside the buffer: no wrap
        let mut p = particle_at(-49.0, 2449.0);
        p.wrap(w, 50.0);
        assert_eq!(p.pos, Vec2::new(-49.0, 2449.0));
    }

    #[test]
    fn test_edge_spawn_lands_on_an_edge() {
        let tuning = FieldTuning::default();
        let w = world();
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..200 {
            let p = Particle::spawn(&mut rng, SpawnMode::Edges, w, &tuning);
            let on_edge = p.pos.x == -50.0
                || p.pos.x == w.width + 50.0
                || p.pos.y == -50.0
                || p.pos.y == w.world_height + 50.0;
            assert!(on_edge, "not on an edge: {:?}", p.pos);
            assert!(p.group < GROUP_COUNT);
            assert!((0.8..=1.2).contains(&p.speed_mod));
            assert!((1.0..=2.5).contains(&p.radius));
            assert_eq!(p.vel, Vec2::ZERO);
            assert_eq!(p.life, 0);
        }
    }

    #[test]
    fn test_scatter_spawn_inside_world() {
        let tuning = FieldTuning::default();
        let w = world();
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..200 {
            let p = Particle::spawn(&mut rng, SpawnMode::Scatter, w, &tuning);
            assert!(p.pos.x >= 0.0 && p.pos.x <= w.width);
            assert!(p.pos.y >= 0.0 && p.pos.y <= w.world_height);
        }
    }

    #[test]
    fn test_step_with_flow_only_moves_by_flow_force() {
        let tuning = FieldTuning::default();
        let ctx = StepContext {
            noise: &ConstantNoise(0.0),
            shockwaves: &[],
            mouse_world: Vec2::splat(-1000.0),
            time_ticks: 0,
            world: world(),
            tuning: &tuning,
        };
        let mut p = particle_at(100.0, 100.0);
        p.step(&ctx);

        // noise 0 -> angle 0 -> +x
        assert!((p.pos.x - (100.0 + tuning.flow_force)).abs() < 1e-5);
        assert!((p.pos.y - 100.0).abs() < 1e-5);
        assert_eq!(p.life, 1);
    }
}
