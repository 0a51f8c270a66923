//! Particle colors
//!
//! Each group has a base HSL color; a particle's hue drifts with its age.

use crate::tuning::FieldTuning;

/// Hue in degrees, saturation and lightness in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

/// Blue, green, yellow, pink
pub const COLOR_GROUPS: [Hsl; 4] = [
    Hsl { h: 210.0, s: 70.0, l: 50.0 },
    Hsl { h: 150.0, s: 60.0, l: 50.0 },
    Hsl { h: 45.0, s: 80.0, l: 50.0 },
    Hsl { h: 340.0, s: 70.0, l: 50.0 },
];

/// HSL (degrees, percent, percent) to RGB in 0..=1
pub fn hsl_to_rgb(hsl: Hsl) -> [f32; 3] {
    let h = hsl.h.rem_euclid(360.0) / 60.0;
    let s = (hsl.s / 100.0).clamp(0.0, 1.0);
    let l = (hsl.l / 100.0).clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [r + m, g + m, b + m]
}

/// Hue of a particle after `life` ticks
pub fn shifted_hue(group: u8, life: u32, tuning: &FieldTuning) -> f32 {
    let base = COLOR_GROUPS[group as usize % COLOR_GROUPS.len()].h;
    let shift = (life as f32 * tuning.hue_shift_per_tick) % 360.0;
    (base + shift) % 360.0
}

/// RGBA fill for a particle
pub fn particle_color(group: u8, life: u32, tuning: &FieldTuning) -> [f32; 4] {
    let base = COLOR_GROUPS[group as usize % COLOR_GROUPS.len()];
    let [r, g, b] = hsl_to_rgb(Hsl {
        h: shifted_hue(group, life, tuning),
        ..base
    });
    [r, g, b, tuning.particle_alpha]
}
