//! Flow field
//!
//! A seeded 3D noise field sampled at (x, y, time) turns every world position
//! into a heading. Each color group reads its own z-layer of the field, so the
//! four groups stream in visibly different directions.

use glam::Vec2;
use noise::{NoiseFn, OpenSimplex};

use crate::tuning::FieldTuning;

/// Deterministic scalar field, (x, y, z) -> roughly [-1, 1]
pub trait NoiseSource {
    fn sample(&self, x: f64, y: f64, z: f64) -> f64;
}

/// Seeded OpenSimplex noise
#[derive(Clone)]
pub struct SimplexNoise {
    noise: OpenSimplex,
}

impl SimplexNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            noise: OpenSimplex::new(seed),
        }
    }
}

impl NoiseSource for SimplexNoise {
    fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        self.noise.get([x, y, z])
    }
}

/// Field with the same value everywhere
#[derive(Debug, Clone, Copy)]
pub struct ConstantNoise(pub f64);

impl NoiseSource for ConstantNoise {
    fn sample(&self, _x: f64, _y: f64, _z: f64) -> f64 {
        self.0
    }
}

/// Heading (radians) of the flow at a world position for a color group
pub fn flow_angle(
    noise: &dyn NoiseSource,
    pos: Vec2,
    group: u8,
    time_ticks: u64,
    tuning: &FieldTuning,
) -> f32 {
    let scale = tuning.noise_scale as f64;
    let z = time_ticks as f64 * tuning.noise_time_scale as f64
        + group as f64 * tuning.group_offset as f64;
    let value = noise.sample(pos.x as f64 * scale, pos.y as f64 * scale, z);
    (value * std::f64::consts::TAU) as f32
}

/// Flow acceleration for one tick
pub fn flow_force(
    noise: &dyn NoiseSource,
    pos: Vec2,
    group: u8,
    time_ticks: u64,
    tuning: &FieldTuning,
) -> Vec2 {
    Vec2::from_angle(flow_angle(noise, pos, group, time_ticks, tuning)) * tuning.flow_force
}
