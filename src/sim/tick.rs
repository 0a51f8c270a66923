//! Fixed timestep simulation tick
//!
//! One tick: apply queued input, age shockwaves, spawn, step every particle,
//! advance time.

use glam::Vec2;

use super::particle::StepContext;
use super::shockwave::update_shockwaves;
use super::state::FieldState;
use crate::screen_to_world;

/// A pointer press waiting to become a shockwave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPress {
    /// Screen position
    pub pos: Vec2,
    /// Scroll offset at the moment of the press
    pub scroll_y: f32,
}

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Current page scroll offset
    pub scroll_y: f32,
    /// Latest pointer position (screen space), if it moved
    pub pointer: Option<Vec2>,
    /// Presses since the previous tick (one-shot)
    pub presses: Vec<PointerPress>,
}

/// Advance the field by one tick
pub fn tick(state: &mut FieldState, input: &TickInput) {
    if let Some(pointer) = input.pointer {
        state.pointer_moved(pointer);
    }
    for press in &input.presses {
        state.pointer_pressed(press.pos, press.scroll_y);
    }

    update_shockwaves(&mut state.shockwaves, &state.tuning);
    state.spawn_batch();

    let mouse_world = screen_to_world(state.mouse, input.scroll_y);
    // Lift the pool out so the step context can borrow the rest of the state
    let mut particles = std::mem::take(&mut state.particles);
    let ctx = StepContext {
        noise: state.noise(),
        shockwaves: &state.shockwaves,
        mouse_world,
        time_ticks: state.time_ticks,
        world: state.world,
        tuning: &state.tuning,
    };
    for particle in particles.iter_mut() {
        particle.step(&ctx);
    }
    state.particles = particles;

    state.time_ticks += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::noise::ConstantNoise;
    use crate::sim::particle::Particle;
    use crate::sim::state::WorldBounds;
    use crate::tuning::FieldTuning;
    use proptest::prelude::*;

    fn quiet_state(tuning: FieldTuning) -> FieldState {
        let mut state = FieldState::with_noise(
            7,
            WorldBounds::new(1000.0, 800.0, 3000.0),
            tuning,
            Box::new(ConstantNoise(0.0)),
        );
        // Nothing spawns on its own in these scenarios
        state.tuning.spawn_batch = 0;
        state
    }

    fn still_particle(x: f32, y: f32) -> Particle {
        Particle {
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            group: 2,
            speed_mod: 1.0,
            radius: 2.0,
            life: 0,
        }
    }

    #[test]
    fn test_flow_only_displacement() {
        let mut state = quiet_state(FieldTuning::default());
        state.particles.push(still_particle(100.0, 100.0));
        tick(&mut state, &TickInput::default());

        let p = &state.particles[0];
        assert!((p.pos.x - 100.05).abs() < 1e-4);
        assert!((p.pos.y - 100.0).abs() < 1e-5);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_hover_uses_world_space_mouse() {
        let tuning = FieldTuning::default();
        let mut state = quiet_state(tuning.clone());
        // Particle 50 units right of a pointer at screen (400, 100) scrolled by 500
        state.particles.push(still_particle(450.0, 600.0));
        let input = TickInput {
            scroll_y: 500.0,
            pointer: Some(Vec2::new(400.0, 100.0)),
            ..Default::default()
        };
        tick(&mut state, &input);

        let p = &state.particles[0];
        let hover = (150.0 - 50.0) / 150.0 * tuning.hover_force;
        assert!((p.vel.x - (tuning.flow_force + hover)).abs() < 1e-5);
        assert!(p.vel.y.abs() < 1e-5);
    }

    #[test]
    fn test_shockwave_reaches_particle_only_once_ring_arrives() {
        let tuning = FieldTuning {
            shockwave_decay: 0.999,
            shockwave_min_strength: 0.01,
            hover_enabled: false,
            ..Default::default()
        };
        let mut state = quiet_state(tuning);
        state.particles.push(still_particle(900.0, 100.0));
        let press = TickInput {
            presses: vec![PointerPress {
                pos: Vec2::new(100.0, 100.0),
                scroll_y: 0.0,
            }],
            ..Default::default()
        };
        tick(&mut state, &press);
        assert_eq!(state.shockwaves.len(), 1);
        // Flow alone so far
        assert!((state.particles[0].vel.x - 0.05).abs() < 1e-5);

        let mut pushed_at = None;
        for _ in 0..200 {
            // Pin the particle so the distance stays 800
            state.particles[0].pos = Vec2::new(900.0, 100.0);
            state.particles[0].vel = Vec2::ZERO;
            tick(&mut state, &TickInput::default());
            if state.particles[0].vel.x > 0.06 {
                pushed_at = Some(state.shockwaves[0].radius);
                break;
            }
        }
        let radius = pushed_at.expect("ring never reached the particle");
        assert!(radius > 750.0 && radius < 850.0, "pushed at radius {radius}");
    }

    #[test]
    fn test_pool_grows_by_batch() {
        let mut state = FieldState::new(
            3,
            WorldBounds::new(500.0, 500.0, 1500.0),
            FieldTuning {
                capacity: 23,
                ..Default::default()
            },
        );
        let mut sizes = Vec::new();
        for _ in 0..6 {
            tick(&mut state, &TickInput::default());
            sizes.push(state.particles.len());
        }
        assert_eq!(sizes, vec![5, 10, 15, 20, 23, 23]);
    }

    #[test]
    fn test_presses_are_ignored_when_disabled() {
        let tuning = FieldTuning {
            shockwaves_enabled: false,
            ..Default::default()
        };
        let mut state = quiet_state(tuning);
        let input = TickInput {
            presses: vec![PointerPress {
                pos: Vec2::ZERO,
                scroll_y: 0.0,
            }],
            ..Default::default()
        };
        tick(&mut state, &input);
        assert!(state.shockwaves.is_empty());
    }

    #[test]
    fn test_determinism() {
        // Two states with the same seed and input stay identical
        let world = WorldBounds::new(1280.0, 720.0, 2160.0);
        let mut a = FieldState::new(99999, world, FieldTuning::default());
        let mut b = FieldState::new(99999, world, FieldTuning::default());

        let inputs = [
            TickInput {
                pointer: Some(Vec2::new(300.0, 200.0)),
                ..Default::default()
            },
            TickInput {
                scroll_y: 120.0,
                presses: vec![PointerPress {
                    pos: Vec2::new(640.0, 360.0),
                    scroll_y: 120.0,
                }],
                ..Default::default()
            },
            TickInput::default(),
        ];
        for _ in 0..40 {
            for input in &inputs {
                tick(&mut a, input);
                tick(&mut b, input);
            }
        }

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.particles, b.particles);
        assert_eq!(a.shockwaves, b.shockwaves);
    }

    proptest! {
        #[test]
        fn prop_positions_stay_in_wrapped_bounds(
            seed in any::<u64>(),
            width in 50.0f32..2500.0,
            height in 50.0f32..1500.0,
            extra in 0.0f32..4000.0,
            ticks in 1usize..150,
            press_x in 0.0f32..2500.0,
        ) {
            let world = WorldBounds::new(width, height, height + extra);
            let mut state = FieldState::new(seed, world, FieldTuning::default());
            let buffer = state.tuning.wrap_buffer;
            for t in 0..ticks {
                let input = TickInput {
                    scroll_y: (t as f32 * 7.0) % (world.scroll_limit() + 1.0),
                    pointer: Some(Vec2::new(press_x, (t as f32 * 13.0) % height)),
                    presses: if t % 25 == 0 {
                        vec![PointerPress { pos: Vec2::new(press_x, height / 2.0), scroll_y: 0.0 }]
                    } else {
                        Vec::new()
                    },
                };
                tick(&mut state, &input);
                for p in &state.particles {
                    prop_assert!(world.contains(p.pos, buffer), "escaped: {:?}", p.pos);
                }
                prop_assert!(state.particles.len() <= state.tuning.capacity);
            }
        }

        #[test]
        fn prop_clamp_never_exceeds_max_speed(
            vx in -50.0f32..50.0,
            vy in -50.0f32..50.0,
            speed_mod in 0.8f32..1.2,
        ) {
            let tuning = FieldTuning::default();
            let mut p = still_particle(0.0, 0.0);
            p.speed_mod = speed_mod;
            p.vel = Vec2::new(vx, vy);
            p.clamp_speed(&tuning);
            prop_assert!(p.vel.length() <= tuning.max_speed(speed_mod) * (1.0 + 1e-5));
        }

        #[test]
        fn prop_pool_growth_bounded_by_batch(
            capacity in 1usize..60,
            batch in 0usize..9,
            ticks in 1usize..30,
        ) {
            let tuning = FieldTuning { capacity, spawn_batch: batch, ..Default::default() };
            let mut state = FieldState::new(1, WorldBounds::new(300.0, 300.0, 900.0), tuning);
            for _ in 0..ticks {
                let before = state.particles.len();
                tick(&mut state, &TickInput::default());
                let after = state.particles.len();
                prop_assert!(after <= capacity);
                prop_assert!(after - before <= batch);
                if before < capacity {
                    prop_assert_eq!(after, (before + batch).min(capacity));
                }
            }
        }

        #[test]
        fn prop_shockwave_strength_follows_decay(
            strength in 1.0f32..50.0,
            decay in 0.5f32..0.999,
            ticks in 1i32..40,
        ) {
            let tuning = FieldTuning {
                shockwave_strength: strength,
                shockwave_decay: decay,
                shockwave_min_strength: 0.0,
                shockwave_max_radius: 1e6,
                ..Default::default()
            };
            let mut state = quiet_state(tuning);
            state.pointer_pressed(Vec2::ZERO, 0.0);
            let mut last = strength;
            for _ in 0..ticks {
                tick(&mut state, &TickInput::default());
                let now = state.shockwaves[0].strength;
                prop_assert!(now < last);
                last = now;
            }
            let expected = strength * decay.powi(ticks);
            prop_assert!((last - expected).abs() <= expected * 1e-3 + 1e-6);
        }
    }
}
