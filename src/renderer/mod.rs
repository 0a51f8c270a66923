//! WebGPU rendering module
//!
//! Particles are drawn as instanced circles over a fading trail texture.

pub mod frame;
pub mod instance;
pub mod palette;
pub mod pipeline;

pub use frame::build_instances;
pub use instance::ParticleInstance;
pub use palette::{COLOR_GROUPS, Hsl, hsl_to_rgb, particle_color};
pub use pipeline::FieldRenderState;
