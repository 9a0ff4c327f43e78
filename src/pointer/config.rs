//! Per-hand pointer configuration

use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::joints::RootAnchor;
use super::range::RangeMapper;
use super::selection::{DEFAULT_RELEASE_DEPTH, DEFAULT_SELECT_DEPTH};

/// Tuning for one hand's pointer pipeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Fingertip penetration that starts a selection (meters)
    pub select_depth: f32,
    /// Penetration the fingertip must retract past to release (meters)
    pub release_depth: f32,
    pub range: RangeMapper,
    /// Process variance Q of the pointer filter
    pub process_variance: f32,
    /// Measurement variance R until the first distance-driven update
    pub measurement_variance: f32,
    /// R = distance³ · gain. Far pointers jitter more, so they smooth more.
    pub distance_variance_gain: f32,
    /// Flip the twist sign (e.g. for the left hand)
    pub twist_reverse: bool,
    pub root_anchor: RootAnchor,
    /// Fixed rotation applied after the tracked hand rotation. Rig specific;
    /// re-derive it for each tracking source.
    pub rotation_calibration: UnitQuaternion<f32>,
    /// Query the scene for ray hits each frame
    pub hit_test: bool,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            select_depth: DEFAULT_SELECT_DEPTH,
            release_depth: DEFAULT_RELEASE_DEPTH,
            range: RangeMapper::default(),
            process_variance: 0.001,
            measurement_variance: 0.06,
            distance_variance_gain: 270.0,
            twist_reverse: false,
            root_anchor: RootAnchor::WeightedKnuckles,
            rotation_calibration: UnitQuaternion::identity(),
            hit_test: true,
        }
    }
}

impl PointerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.release_depth < self.select_depth) {
            return Err(ConfigError::InvertedHysteresis {
                select_depth: self.select_depth,
                release_depth: self.release_depth,
            });
        }
        if !(self.process_variance > 0.0) {
            return Err(ConfigError::NonPositive("process_variance"));
        }
        if !(self.measurement_variance >= 0.0) {
            return Err(ConfigError::NonPositive("measurement_variance"));
        }
        if !(self.distance_variance_gain >= 0.0) {
            return Err(ConfigError::NonPositive("distance_variance_gain"));
        }
        self.range.validate()
    }
}
