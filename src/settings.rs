//! User preferences
//!
//! Loaded from LocalStorage. Preferences resolve into an effective
//! [`FieldTuning`] via [`Settings::tuning`].

use serde::{Deserialize, Serialize};

use crate::tuning::FieldTuning;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Particle pool capacity for this preset
    pub fn capacity(&self) -> usize {
        match self {
            QualityPreset::Low => 300,
            QualityPreset::Medium => 1000,
            QualityPreset::High => 2000,
        }
    }
}

/// Background preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Particle count preset
    pub quality: QualityPreset,

    // === Interaction ===
    /// Particles flee the pointer
    pub hover: bool,
    /// Clicks emit shockwave rings
    pub shockwaves: bool,

    // === Page ===
    /// Take over wheel scrolling and ease it
    pub smooth_scroll: bool,
    /// Fill the whole pool at once instead of trickling in from the edges
    pub prefill: bool,

    // === Accessibility ===
    /// Reduced motion (no shockwaves, native scrolling)
    pub reduced_motion: bool,

    /// Full constant override; capacity still follows `quality`
    pub tuning: Option<FieldTuning>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            hover: true,
            shockwaves: true,
            smooth_scroll: true,
            prefill: false,
            reduced_motion: false,
            tuning: None,
        }
    }
}

impl Settings {
    /// Effective shockwaves (respects reduced_motion)
    pub fn effective_shockwaves(&self) -> bool {
        self.shockwaves && !self.reduced_motion
    }

    /// Effective smooth scrolling (respects reduced_motion)
    pub fn effective_smooth_scroll(&self) -> bool {
        self.smooth_scroll && !self.reduced_motion
    }

    /// Resolve into the tuning the simulation runs with.
    ///
    /// An override that fails validation is ignored.
    pub fn tuning(&self) -> FieldTuning {
        let mut tuning = match &self.tuning {
            Some(custom) => match custom.validate() {
                Ok(()) => custom.clone(),
                Err(e) => {
                    log::warn!("Ignoring invalid tuning override: {e}");
                    FieldTuning::default()
                }
            },
            None => FieldTuning::default(),
        };
        tuning.capacity = self.quality.capacity();
        tuning.hover_enabled &= self.hover;
        tuning.shockwaves_enabled &= self.effective_shockwaves();
        tuning
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "antigravity_field_settings";

    /// Parse settings JSON, falling back to defaults
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Unreadable settings ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native builds have no storage
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
