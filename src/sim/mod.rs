//! Deterministic simulation module
//!
//! All particle behavior lives here. This module must be pure and deterministic:
//! - One tick per fixed timestep
//! - Seeded RNG and seeded noise only
//! - Stable iteration order (pool order)
//! - No rendering or platform dependencies

pub mod noise;
pub mod particle;
pub mod shockwave;
pub mod state;
pub mod tick;

pub use noise::{ConstantNoise, NoiseSource, SimplexNoise, flow_angle, flow_force};
pub use particle::{Particle, SpawnMode, StepContext, hover_force};
pub use shockwave::{Shockwave, update_shockwaves};
pub use state::{FieldState, WorldBounds};
pub use tick::{PointerPress, TickInput, tick};
