//! Antigravity Field - a full-page flow-field particle background
//!
//! Core modules:
//! - `sim`: Deterministic particle simulation (flow field, hover, shockwaves)
//! - `renderer`: WebGPU trail/particle pipeline and per-frame instance building
//! - `platform`: Browser mount, input listeners and the animation loop
//! - `scroll`: Smooth page scrolling driven from the frame loop
//! - `tuning`: Data-driven simulation and visual constants
//! - `settings`: Persisted user preferences

pub mod error;
pub mod platform;
pub mod renderer;
pub mod scroll;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{MountError, TuningError};
pub use settings::{QualityPreset, Settings};
pub use tuning::FieldTuning;

use glam::Vec2;

/// Loop configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Largest frame delta fed into the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Where the mouse "is" before the first pointer event
    pub const MOUSE_OFFSCREEN: f32 = -1000.0;

    /// Number of color groups (and flow-field layers)
    pub const GROUP_COUNT: u8 = 4;

    /// Id of the canvas element the web build mounts on. The host page styles
    /// it `position: fixed` at the top-left, covering the full viewport.
    pub const CANVAS_ID: &str = "background";
}

/// Convert screen coordinates to world coordinates for a given scroll offset
#[inline]
pub fn screen_to_world(screen: Vec2, scroll_y: f32) -> Vec2 {
    Vec2::new(screen.x, screen.y + scroll_y)
}

/// Convert a world Y coordinate to screen space for a given scroll offset
#[inline]
pub fn world_to_screen_y(world_y: f32, scroll_y: f32) -> f32 {
    world_y - scroll_y
}
