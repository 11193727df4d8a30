//! Calibration Wizard
//!
//! Walks a user through a handful of posture-collection steps and derives
//! per-user pinch thresholds from sample percentiles. The camera-preview and
//! on-screen instruction parts of a real wizard are not implemented here;
//! this is the deterministic percentile math a UI would drive.

use crate::config::CalibrationProfile;

/// One fixed-duration data-collection step of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationStep {
    Relaxed,
    GripPosture,
    IndexPinchSeries,
    MiddlePinchSeries,
    ScrollProbe,
}

impl CalibrationStep {
    pub fn duration_ms(self) -> u64 {
        match self {
            CalibrationStep::Relaxed => 2_500,
            CalibrationStep::GripPosture => 2_500,
            CalibrationStep::IndexPinchSeries => 5_000,
            CalibrationStep::MiddlePinchSeries => 5_000,
            CalibrationStep::ScrollProbe => 5_000,
        }
    }

    pub fn all() -> [CalibrationStep; 5] {
        [
            CalibrationStep::Relaxed,
            CalibrationStep::GripPosture,
            CalibrationStep::IndexPinchSeries,
            CalibrationStep::MiddlePinchSeries,
            CalibrationStep::ScrollProbe,
        ]
    }
}

fn percentile(samples: &mut [f32], pct: f32) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = (pct / 100.0) * (samples.len() - 1) as f32;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        samples[lower]
    } else {
        let frac = rank - lower as f32;
        samples[lower] * (1.0 - frac) + samples[upper] * frac
    }
}

/// Minimum hand-position drift, in normalized units, before a scroll-probe
/// sample is counted as directional rather than noise.
const SCROLL_SIGN_DEADBAND: f32 = 0.01;

/// Accumulates samples per step and derives a `CalibrationProfile` on finalize.
#[derive(Debug, Default)]
pub struct Calibrator {
    relaxed_index: Vec<f32>,
    relaxed_middle: Vec<f32>,
    relaxed_conf: Vec<f32>,
    grip_index: Vec<f32>,
    index_series: Vec<f32>,
    middle_series: Vec<f32>,
    scroll_sign: Vec<i8>,
    last_step: Option<CalibrationStep>,
    scroll_anchor_y: Option<f32>,
}

impl Calibrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample observed during `step`. `pos_y` is the hand's
    /// normalized vertical position, used only during `ScrollProbe` to derive
    /// the sign of hand motion relative to where the step started.
    pub fn record(&mut self, step: CalibrationStep, index: f32, middle: f32, confidence: f32, pos_y: f32) {
        if self.last_step != Some(step) {
            self.last_step = Some(step);
            self.scroll_anchor_y = None;
        }

        match step {
            CalibrationStep::Relaxed => {
                self.relaxed_index.push(index);
                self.relaxed_middle.push(middle);
                self.relaxed_conf.push(confidence);
            }
            CalibrationStep::GripPosture => self.grip_index.push(index),
            CalibrationStep::IndexPinchSeries => self.index_series.push(index),
            CalibrationStep::MiddlePinchSeries => self.middle_series.push(middle),
            CalibrationStep::ScrollProbe => {
                let anchor = *self.scroll_anchor_y.get_or_insert(pos_y);
                let dy = pos_y - anchor;
                if dy.abs() > SCROLL_SIGN_DEADBAND {
                    self.scroll_sign.push(if dy < 0.0 { 1 } else { -1 });
                }
            }
        }
    }

    /// Derive calibrated thresholds from the collected samples.
    ///
    /// `fast_down`/`mid_down` come from the 65th/70th percentile of the active
    /// series; `fast_up`/`mid_up` from the 85th/90th percentile of their own
    /// relaxed-step baseline, each clamped at least `MIN_GAP` below its
    /// paired down threshold so a release can never require more pinch than
    /// an arm. `invert_y` is the majority sign of the scroll-probe samples:
    /// negative (hand moved down but the recorded dy came out positive, or
    /// vice versa) means the mapped scroll direction should be flipped.
    pub fn finalize(mut self) -> CalibrationProfile {
        const MIN_GAP: f32 = 0.05;

        let fast_down = percentile(&mut self.index_series, 65.0);
        let mut fast_up = percentile(&mut self.relaxed_index, 85.0);
        fast_up = fast_up.min(fast_down - MIN_GAP);

        let mid_down = percentile(&mut self.middle_series, 70.0);
        let mut mid_up = percentile(&mut self.relaxed_middle, 90.0);
        mid_up = mid_up.min(mid_down - MIN_GAP);

        let grip_on = percentile(&mut self.grip_index, 40.0);
        let mut grip_off = percentile(&mut self.relaxed_index, 90.0);
        grip_off = grip_off.min(grip_on - MIN_GAP);

        let conf_recog = percentile(&mut self.relaxed_conf, 20.0).max(0.35);

        let invert_y = self.scroll_sign.iter().map(|&s| s as i32).sum::<i32>() < 0;

        CalibrationProfile {
            fast_down: Some(fast_down),
            fast_up: Some(fast_up),
            mid_down: Some(mid_down),
            mid_up: Some(mid_up),
            grip_on: Some(grip_on),
            grip_off: Some(grip_off),
            conf_recog: Some(conf_recog),
            invert_y: Some(invert_y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_produces_a_gap_between_down_and_up_thresholds() {
        let mut cal = Calibrator::new();
        for _ in 0..20 {
            cal.record(CalibrationStep::Relaxed, 0.10, 0.10, 0.9, 0.5);
        }
        for _ in 0..20 {
            cal.record(CalibrationStep::IndexPinchSeries, 0.85, 0.0, 0.9, 0.5);
        }
        let profile = cal.finalize();
        assert!(profile.fast_down.unwrap() > profile.fast_up.unwrap());
    }

    #[test]
    fn percentile_handles_empty_input() {
        let mut empty: Vec<f32> = vec![];
        assert_eq!(percentile(&mut empty, 50.0), 0.0);
    }

    #[test]
    fn mid_up_derives_from_its_own_relaxed_middle_baseline_not_index() {
        let mut cal = Calibrator::new();
        for _ in 0..20 {
            cal.record(CalibrationStep::Relaxed, 0.30, 0.05, 0.9, 0.5);
        }
        for _ in 0..20 {
            cal.record(CalibrationStep::MiddlePinchSeries, 0.0, 0.80, 0.9, 0.5);
        }
        let profile = cal.finalize();
        assert!(profile.mid_up.unwrap() < 0.20);
    }

    #[test]
    fn scroll_probe_downward_drift_sets_invert_y() {
        let mut cal = Calibrator::new();
        cal.record(CalibrationStep::ScrollProbe, 0.0, 0.80, 0.9, 0.50);
        for _ in 0..10 {
            cal.record(CalibrationStep::ScrollProbe, 0.0, 0.80, 0.9, 0.60);
        }
        let profile = cal.finalize();
        assert_eq!(profile.invert_y, Some(true));
    }

    #[test]
    fn scroll_probe_upward_drift_does_not_set_invert_y() {
        let mut cal = Calibrator::new();
        cal.record(CalibrationStep::ScrollProbe, 0.0, 0.80, 0.9, 0.50);
        for _ in 0..10 {
            cal.record(CalibrationStep::ScrollProbe, 0.0, 0.80, 0.9, 0.40);
        }
        let profile = cal.finalize();
        assert_eq!(profile.invert_y, Some(false));
    }
}
