//! Interpreter Configuration
//!
//! Presets and the on-disk calibration profile.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// On/off thresholds and dwell times for a debounced hysteresis gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hysteresis {
    pub p_on: f32,
    pub p_off: f32,
    pub t_on_ms: u64,
    pub t_off_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickDragTuning {
    pub click_max_ms: u64,
    pub click_move_tol_px: i32,
    pub drag_hold_ms: u64,
    pub double_click_ms: u64,
}

/// Thresholds for the fast-latch click arming, distinct from the committed
/// (dwell-confirmed) index hysteresis used elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickLatchTuning {
    pub fast_down: f32,
    pub fast_up: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingSafety {
    pub min_conf: f32,
    pub lost_timeout_ms: u64,
    /// Confidence floor for "actively gesturing" checks (scroll activity, adaptation),
    /// stricter than `min_conf` which only governs base tracking validity.
    pub conf_recog: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementSafety {
    pub deadzone_px: i32,
    pub max_step_frac: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OneEuroParams {
    pub min_cutoff_hz: f32,
    pub beta: f32,
    pub d_cutoff_hz: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoverTuning {
    pub enabled: bool,
    pub min_conf: f32,
    pub edge_margin: f32,
    pub deadzone_px: i32,
    pub sensitivity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollTuning {
    pub enabled: bool,
    pub arm_ms: u64,
}

/// Tuning for the displacement-based scroll mapper. `gamma`, `px_for_unit` and
/// `max_ticks_per_s` are kept for config compatibility but unused by the v1
/// mapper, which is purely linear above its deadzone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollPhysics {
    pub deadzone_px: f32,
    pub px_for_unit: f32,
    pub gamma: f32,
    pub max_ticks_per_s: f32,
    pub half_life_ms: u64,
    pub reengage_ms: u64,
    pub invert_y: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptationBounds {
    pub p_on_range: (f32, f32),
    pub p_off_range: (f32, f32),
    pub max_shift_per_min: f32,
    pub max_hand_speed_norm: f32,
}

/// A complete, immutable tuning profile for the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub index_hysteresis: Hysteresis,
    pub middle_hysteresis: Hysteresis,
    pub click_latch: ClickLatchTuning,
    pub click_drag: ClickDragTuning,
    pub tracking: TrackingSafety,
    pub move_safety: MovementSafety,
    pub position_filter: OneEuroParams,
    pub pinch_ema_alpha: f32,
    pub hover: HoverTuning,
    pub scroll: ScrollTuning,
    pub scroll_physics: ScrollPhysics,
    pub adaptation: AdaptationBounds,
    pub sensitivity: f32,
}

impl Preset {
    /// The shipped default tuning: balanced responsiveness and stability.
    pub fn default_preset() -> Self {
        Preset {
            index_hysteresis: Hysteresis { p_on: 0.78, p_off: 0.62, t_on_ms: 80, t_off_ms: 80 },
            middle_hysteresis: Hysteresis { p_on: 0.68, p_off: 0.55, t_on_ms: 60, t_off_ms: 80 },
            click_latch: ClickLatchTuning { fast_down: 0.67, fast_up: 0.56 },
            click_drag: ClickDragTuning {
                click_max_ms: 170,
                click_move_tol_px: 6,
                drag_hold_ms: 220,
                double_click_ms: 420,
            },
            tracking: TrackingSafety { min_conf: 0.55, lost_timeout_ms: 120, conf_recog: 0.60 },
            move_safety: MovementSafety { deadzone_px: 1, max_step_frac: 0.20 },
            position_filter: OneEuroParams { min_cutoff_hz: 2.0, beta: 0.06, d_cutoff_hz: 1.0 },
            pinch_ema_alpha: 0.35,
            hover: HoverTuning {
                enabled: true,
                min_conf: 0.75,
                edge_margin: 0.06,
                deadzone_px: 4,
                sensitivity: 2.2,
            },
            scroll: ScrollTuning { enabled: true, arm_ms: 140 },
            scroll_physics: ScrollPhysics {
                deadzone_px: 14.0,
                px_for_unit: 140.0,
                gamma: 1.35,
                max_ticks_per_s: 320.0,
                half_life_ms: 320,
                reengage_ms: 420,
                invert_y: false,
            },
            adaptation: AdaptationBounds {
                p_on_range: (0.70, 0.90),
                p_off_range: (0.50, 0.75),
                max_shift_per_min: 0.01,
                max_hand_speed_norm: 0.015,
            },
            sensitivity: 2.5,
        }
    }

    /// Tighter deadzone, slower cutoff and slower adaptation, for fine pointer work.
    pub fn precision() -> Self {
        let mut p = Self::default_preset();
        p.move_safety.deadzone_px = 2;
        p.position_filter.min_cutoff_hz = 1.2;
        p.position_filter.beta = 0.03;
        p.hover.sensitivity = 1.4;
        p.hover.deadzone_px = 6;
        p.sensitivity = 1.6;
        p.adaptation.max_shift_per_min = 0.005;
        p
    }

    /// Looser tracking and confidence floors, faster adaptation, for casual use.
    pub fn chill() -> Self {
        let mut p = Self::default_preset();
        p.tracking.min_conf = 0.45;
        p.hover.min_conf = 0.62;
        p.index_hysteresis.t_on_ms = 60;
        p.index_hysteresis.t_off_ms = 60;
        p.adaptation.max_shift_per_min = 0.02;
        p
    }

    /// Parse a preset from JSON text, e.g. a file saved by a calibration tool.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(ConfigError::Parse)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Parse)
    }
}

/// Named preset selector, mirrors the presets shipped as constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    #[default]
    Default,
    Precision,
    Chill,
}

impl PresetName {
    pub fn resolve(self) -> Preset {
        match self {
            PresetName::Default => Preset::default_preset(),
            PresetName::Precision => Preset::precision(),
            PresetName::Chill => Preset::chill(),
        }
    }
}

/// User-specific threshold overrides derived from a calibration session.
/// Any field left `None` leaves the preset's built-in default in effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CalibrationProfile {
    pub fast_down: Option<f32>,
    pub fast_up: Option<f32>,
    pub mid_down: Option<f32>,
    pub mid_up: Option<f32>,
    pub grip_on: Option<f32>,
    pub grip_off: Option<f32>,
    pub conf_recog: Option<f32>,
    pub invert_y: Option<bool>,
}

impl CalibrationProfile {
    fn file_path() -> Option<PathBuf> {
        crate::utils::get_app_data_dir().map(|p| p.join("profile.json"))
    }

    /// Load the profile from the platform config directory.
    ///
    /// A missing file is `Ok(None)`, not an error; only a present-but-malformed
    /// file or an unresolvable config directory produces `Err`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let path = Self::file_path().ok_or(ConfigError::NoConfigDir)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(ConfigError::Io)?;
        let profile: CalibrationProfile = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        Ok(Some(profile))
    }

    /// Load the profile, logging and falling back to "no overrides" on any error.
    /// This is the entry point meant for runtime wiring: a malformed or absent
    /// profile must never block interpreter startup.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(Some(profile)) => profile,
            Ok(None) => Self::default(),
            Err(err) => {
                log::warn!("calibration profile unavailable, using built-in defaults: {err}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::file_path().ok_or(ConfigError::NoConfigDir)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Parse)?;
        std::fs::write(&path, content).map_err(ConfigError::Io)
    }

    /// Apply this profile's overrides onto a preset, returning the merged preset.
    ///
    /// `fast_down`/`fast_up` tune the fast-latch click arming; `grip_on`/`grip_off`
    /// tune the committed index hysteresis; `mid_down`/`mid_up` tune the middle
    /// hysteresis.
    pub fn apply(&self, mut preset: Preset) -> Preset {
        if let Some(v) = self.fast_down {
            preset.click_latch.fast_down = v;
        }
        if let Some(v) = self.fast_up {
            preset.click_latch.fast_up = v;
        }
        if let Some(v) = self.grip_on {
            preset.index_hysteresis.p_on = v;
        }
        if let Some(v) = self.grip_off {
            preset.index_hysteresis.p_off = v;
        }
        if let Some(v) = self.mid_down {
            preset.middle_hysteresis.p_on = v;
        }
        if let Some(v) = self.mid_up {
            preset.middle_hysteresis.p_off = v;
        }
        if let Some(v) = self.conf_recog {
            preset.tracking.conf_recog = v;
        }
        if let Some(v) = self.invert_y {
            preset.scroll_physics.invert_y = v;
        }
        preset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_preset_round_trips_through_json() {
        let preset = Preset::default_preset();
        let json = preset.to_json_pretty().unwrap();
        let parsed = Preset::from_json(&json).unwrap();
        assert_eq!(preset, parsed);
    }

    #[test]
    fn named_presets_resolve_to_distinct_tunings() {
        assert_ne!(PresetName::Precision.resolve().sensitivity, PresetName::Chill.resolve().sensitivity);
        assert_eq!(PresetName::Default.resolve(), Preset::default_preset());
    }

    #[test]
    fn profile_apply_only_overrides_present_fields() {
        let base = Preset::default_preset();
        let profile = CalibrationProfile { fast_down: Some(0.80), ..Default::default() };
        let merged = profile.apply(base);
        assert_eq!(merged.click_latch.fast_down, 0.80);
        assert_eq!(merged.click_latch.fast_up, base.click_latch.fast_up);
        assert_eq!(merged.index_hysteresis.p_on, base.index_hysteresis.p_on);
    }
}
