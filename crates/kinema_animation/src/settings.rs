//! Import configuration.

use serde::{Deserialize, Serialize};

use crate::tracks::InterpolationMode;

/// Frame rate motion files are authored at: frame `i` plays at `i / 30` s.
pub const DEFAULT_SAMPLE_RATE: f32 = 30.0;

/// Settings controlling how parsed motion is turned into tracks.
///
/// ```rust,ignore
/// let settings = ImportSettings {
///     position_scale: 0.01, // centimetre captures onto a metre rig
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Frames per second of the source capture.
    pub sample_rate: f32,
    /// Uniform scale applied to every position delta.
    pub position_scale: f32,
    /// How tracks are sampled between keyframes.
    pub interpolation: InterpolationMode,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            position_scale: 1.0,
            interpolation: InterpolationMode::Linear,
        }
    }
}

impl ImportSettings {
    /// Sample rate to use, falling back to the default for non-positive or
    /// non-finite values.
    #[must_use]
    pub fn effective_sample_rate(&self) -> f32 {
        if self.sample_rate.is_finite() && self.sample_rate > 0.0 {
            self.sample_rate
        } else {
            log::warn!(
                "Invalid sample rate {}, using {DEFAULT_SAMPLE_RATE}",
                self.sample_rate
            );
            DEFAULT_SAMPLE_RATE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let settings: ImportSettings = serde_json::from_str(r#"{ "position_scale": 0.01 }"#).unwrap();
        assert_eq!(settings.sample_rate, DEFAULT_SAMPLE_RATE);
        assert_eq!(settings.interpolation, InterpolationMode::Linear);
        assert!((settings.position_scale - 0.01).abs() < 1e-7);
    }

    #[test]
    fn invalid_sample_rate_falls_back() {
        let settings = ImportSettings {
            sample_rate: 0.0,
            ..Default::default()
        };
        assert_eq!(settings.effective_sample_rate(), DEFAULT_SAMPLE_RATE);
    }
}
