//! Error types
//!
//! Nothing here is fatal to the page: a failed mount leaves the background
//! inactive and a bad tuning record falls back to defaults.

use thiserror::Error;

/// Reasons the background could not attach to a canvas
#[derive(Debug, Error)]
pub enum MountError {
    #[error("no browser window or document available")]
    NoWindow,
    #[error("no element with id `{0}`")]
    CanvasMissing(String),
    #[error("element `{0}` is not a canvas")]
    NotACanvas(String),
    #[error("failed to create drawing surface: {0}")]
    Surface(String),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(String),
    #[error("failed to create GPU device: {0}")]
    Device(String),
    #[error("failed to register `{0}` listener")]
    Listener(&'static str),
}

/// A tuning field outside its allowed range
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuningError {
    #[error("`{field}` must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },
    #[error("`{field}` must be > 0, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("`{field}` must be >= 0, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("`{field}` must be in {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("capacity must be at least 1")]
    EmptyPool,
}
