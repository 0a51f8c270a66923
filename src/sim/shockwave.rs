//! Click shockwaves
//!
//! A shockwave is an expanding ring anchored in world space. Particles inside
//! a band around the ring get pushed radially outward.

use glam::Vec2;

use crate::screen_to_world;
use crate::tuning::FieldTuning;

/// An expanding ring emitted by a pointer press
#[derive(Debug, Clone, PartialEq)]
pub struct Shockwave {
    /// Press position in screen space
    pub origin: Vec2,
    /// Scroll offset when the press happened
    pub scroll_y: f32,
    pub radius: f32,
    pub strength: f32,
}

impl Shockwave {
    pub fn new(origin: Vec2, scroll_y: f32, strength: f32) -> Self {
        Self {
            origin,
            scroll_y,
            radius: 0.0,
            strength,
        }
    }

    /// Ring center in world space
    #[inline]
    pub fn center(&self) -> Vec2 {
        screen_to_world(self.origin, self.scroll_y)
    }

    /// Grow and weaken by one tick
    pub fn advance(&mut self, speed: f32, decay: f32) {
        self.radius += speed;
        self.strength *= decay;
    }

    pub fn is_spent(&self, max_radius: f32, min_strength: f32) -> bool {
        self.radius > max_radius || self.strength < min_strength
    }

    /// Radial push on a particle at `pos`, strongest on the ring itself
    pub fn force_on(&self, pos: Vec2, band: f32) -> Vec2 {
        let offset = pos - self.center();
        let dist = offset.length();
        let from_ring = (dist - self.radius).abs();
        if from_ring >= band {
            return Vec2::ZERO;
        }
        let falloff = 1.0 - from_ring / band;
        offset.normalize_or_zero() * falloff * self.strength
    }
}

/// Age every wave by one tick and drop the spent ones
pub fn update_shockwaves(waves: &mut Vec<Shockwave>, tuning: &FieldTuning) {
    for wave in waves.iter_mut() {
        wave.advance(tuning.shockwave_speed, tuning.shockwave_decay);
    }
    waves.retain(|w| !w.is_spent(tuning.shockwave_max_radius, tuning.shockwave_min_strength));
}
