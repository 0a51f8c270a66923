//! Per-frame instance building
//!
//! Every particle is simulated; only the ones near the viewport are drawn.

use super::instance::ParticleInstance;
use super::palette::particle_color;
use crate::sim::FieldState;
use crate::world_to_screen_y;

/// Fill `out` with the particles visible at `scroll_y`
pub fn build_instances(state: &FieldState, scroll_y: f32, out: &mut Vec<ParticleInstance>) {
    out.clear();
    let margin = state.tuning.cull_margin;
    let height = state.world.height;

    for particle in &state.particles {
        let screen_y = world_to_screen_y(particle.pos.y, scroll_y);
        if screen_y < -margin || screen_y > height + margin {
            continue;
        }
        out.push(ParticleInstance::new(
            particle.pos.x,
            screen_y,
            particle.radius,
            particle_color(particle.group, particle.life, &state.tuning),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{ConstantNoise, Particle, WorldBounds};
    use crate::tuning::FieldTuning;
    use glam::Vec2;

    fn state_with(ys: &[f32]) -> FieldState {
        let mut state = FieldState::with_noise(
            1,
            WorldBounds::new(800.0, 600.0, 3000.0),
            FieldTuning::default(),
            Box::new(ConstantNoise(0.0)),
        );
        for &y in ys {
            state.particles.push(Particle {
                pos: Vec2::new(10.0, y),
                vel: Vec2::ZERO,
                group: 0,
                speed_mod: 1.0,
                radius: 2.0,
                life: 0,
            });
        }
        state
    }

    #[test]
    fn test_culls_outside_viewport_margin() {
        let state = state_with(&[900.0, 949.0, 951.0, 1200.0, 1650.0, 1651.0, 2500.0]);
        let mut out = Vec::new();
        build_instances(&state, 1000.0, &mut out);

        let ys: Vec<f32> = out.iter().map(|i| i.center[1]).collect();
        assert_eq!(ys, vec![-49.0, 200.0, 650.0]);
    }

    #[test]
    fn test_reuses_buffer_and_carries_style() {
        let state = state_with(&[100.0]);
        let mut out = vec![ParticleInstance::new(0.0, 0.0, 9.0, [1.0; 4]); 3];
        build_instances(&state, 0.0, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].center, [10.0, 100.0]);
        assert_eq!(out[0].radius, 2.0);
        assert_eq!(out[0].color[3], state.tuning.particle_alpha);
    }
}
