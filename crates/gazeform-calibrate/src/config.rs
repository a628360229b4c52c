//! Calibration configuration
//!
//! Several formulations of the same derivation exist in the field. Each is
//! a named strategy here; the defaults are the canonical ones.

use serde::{Deserialize, Serialize};

use crate::GazeMode;

/// Eyelid openness formulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpennessBlend {
    /// `1 - clamp01(closed + closed * lid_tightener)`
    #[default]
    ClosedTightenerProduct,
    /// `1 - clamp01(closed + cheek_raiser * lid_tightener)`
    CheekTightenerProduct,
    /// `1 - clamp01(closed + closed * 2t / 2^(2t))`
    DampedTightener,
}

/// Mouth-closed formulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouthClosedBlend {
    /// Lips toward, copied directly
    #[default]
    LipsToward,
    /// `min(lips_toward, jaw_drop)`
    LipsTowardCappedByJaw,
}

/// Calibration configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Eyelid openness strategy
    pub openness: OpennessBlend,
    /// Mouth closed strategy
    pub mouth_closed: MouthClosedBlend,
    /// Gaze conversion strategy
    pub gaze: GazeMode,
}

impl CalibrationConfig {
    /// Linear gaze, as shipped by later driver builds
    pub fn linear_gaze() -> Self {
        CalibrationConfig {
            gaze: GazeMode::Linear,
            ..Default::default()
        }
    }
}
