//! Data-driven simulation and visual constants
//!
//! Every number the field uses lives in [`FieldTuning`]. Defaults reproduce the
//! look of the original background; a JSON override can replace any subset.

use serde::{Deserialize, Serialize};

use crate::error::TuningError;

/// Simulation and rendering constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldTuning {
    // === Pool ===
    /// Maximum number of live particles
    pub capacity: usize,
    /// Particles spawned per tick while below capacity
    pub spawn_batch: usize,

    // === Flow field ===
    /// World units to noise units
    pub noise_scale: f32,
    /// Noise z advance per tick
    pub noise_time_scale: f32,
    /// Noise z separation between color groups
    pub group_offset: f32,
    /// Flow acceleration added to velocity each tick
    pub flow_force: f32,

    // === Particles ===
    /// Base max speed (scaled per particle)
    pub base_speed: f32,
    /// Per-particle speed multiplier lower bound
    pub speed_mod_min: f32,
    /// Width of the speed multiplier range
    pub speed_mod_range: f32,
    /// Smallest particle radius
    pub radius_min: f32,
    /// Width of the radius range
    pub radius_range: f32,
    /// Distance past the world edge before a particle wraps
    pub wrap_buffer: f32,

    // === Hover ===
    pub hover_enabled: bool,
    pub hover_radius: f32,
    pub hover_force: f32,

    // === Shockwaves ===
    pub shockwaves_enabled: bool,
    /// Ring growth per tick
    pub shockwave_speed: f32,
    pub shockwave_max_radius: f32,
    /// Strength at creation
    pub shockwave_strength: f32,
    /// Multiplicative strength decay per tick
    pub shockwave_decay: f32,
    /// Waves weaker than this are removed
    pub shockwave_min_strength: f32,
    /// Half-width of the ring band that pushes particles
    pub shockwave_band: f32,

    // === Rendering ===
    /// Off-screen margin before a particle is culled from drawing
    pub cull_margin: f32,
    /// Alpha of the black fade drawn over the trail each frame
    pub fade_alpha: f32,
    /// Particle fill alpha
    pub particle_alpha: f32,
    /// Hue rotation in degrees per tick of particle age
    pub hue_shift_per_tick: f32,
}

impl Default for FieldTuning {
    fn default() -> Self {
        Self {
            capacity: 1000,
            spawn_batch: 5,

            noise_scale: 0.0005,
            noise_time_scale: 0.0001,
            group_offset: 100.0,
            flow_force: 0.05,

            base_speed: 0.3,
            speed_mod_min: 0.8,
            speed_mod_range: 0.4,
            radius_min: 1.0,
            radius_range: 1.5,
            wrap_buffer: 50.0,

            hover_enabled: true,
            hover_radius: 150.0,
            hover_force: 0.5,

            shockwaves_enabled: true,
            shockwave_speed: 5.0,
            shockwave_max_radius: 800.0,
            shockwave_strength: 15.0,
            shockwave_decay: 0.92,
            shockwave_min_strength: 0.1,
            shockwave_band: 50.0,

            cull_margin: 50.0,
            fade_alpha: 0.2,
            particle_alpha: 0.6,
            hue_shift_per_tick: 0.1,
        }
    }
}

impl FieldTuning {
    /// Check every field against its allowed range
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.capacity == 0 {
            return Err(TuningError::EmptyPool);
        }
        if self.spawn_batch == 0 {
            return Err(TuningError::NotPositive {
                field: "spawn_batch",
                value: 0.0,
            });
        }

        let finite = [
            ("noise_scale", self.noise_scale),
            ("noise_time_scale", self.noise_time_scale),
            ("group_offset", self.group_offset),
            ("flow_force", self.flow_force),
            ("hover_force", self.hover_force),
            ("shockwave_strength", self.shockwave_strength),
            ("hue_shift_per_tick", self.hue_shift_per_tick),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(TuningError::NotFinite { field, value });
            }
        }

        // Spawn range widths
        let non_negative = [
            ("speed_mod_range", self.speed_mod_range),
            ("radius_range", self.radius_range),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() {
                return Err(TuningError::NotFinite { field, value });
            }
            if value < 0.0 {
                return Err(TuningError::Negative { field, value });
            }
        }

        let positive = [
            ("base_speed", self.base_speed),
            ("speed_mod_min", self.speed_mod_min),
            ("radius_min", self.radius_min),
            ("wrap_buffer", self.wrap_buffer),
            ("hover_radius", self.hover_radius),
            ("shockwave_speed", self.shockwave_speed),
            ("shockwave_max_radius", self.shockwave_max_radius),
            ("shockwave_min_strength", self.shockwave_min_strength),
            ("shockwave_band", self.shockwave_band),
            ("cull_margin", self.cull_margin),
        ];
        for (field, value) in positive {
            if !value.is_finite() {
                return Err(TuningError::NotFinite { field, value });
            }
            if value <= 0.0 {
                return Err(TuningError::NotPositive { field, value });
            }
        }

        let unit = [
            ("shockwave_decay", self.shockwave_decay),
            ("fade_alpha", self.fade_alpha),
            ("particle_alpha", self.particle_alpha),
        ];
        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::OutOfRange {
                    field,
                    value,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }
        if self.shockwave_decay == 0.0 {
            return Err(TuningError::NotPositive {
                field: "shockwave_decay",
                value: 0.0,
            });
        }

        Ok(())
    }

    /// Largest speed a particle with the given multiplier may reach
    #[inline]
    pub fn max_speed(&self, speed_mod: f32) -> f32 {
        self.base_speed * speed_mod
    }
}
