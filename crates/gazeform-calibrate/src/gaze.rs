//! Gaze calibration - eye orientation quaternion to (pitch, yaw)
//!
//! The tracked rotation range of the device is narrower than the real eye's.
//! The tail curve leaves small angles nearly untouched and pushes the
//! extremes outward:
//!
//! ```text
//! mod = |angle| + gain * (|angle| / limit)^exponent      (degrees)
//! ```
//!
//! Pitch uses (4, 30°, 30), yaw uses (6, 27°, 18). Pitch is curved on both
//! sides; yaw is curved only when negative and passes through otherwise.

use std::f32::consts::FRAC_2_PI;

use gazeform_core::{GazeAngles, Quaternion};
use serde::{Deserialize, Serialize};

/// How orientation is turned into gaze angles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GazeMode {
    /// Euler decomposition followed by the per-axis tail curve
    #[default]
    TailCurve,
    /// Quaternion y/x components scaled by 2/π
    Linear,
}

/// Power-law tail curve for one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailCurve {
    pub gain: f64,
    pub limit_deg: f64,
    pub exponent: f64,
}

impl TailCurve {
    pub const PITCH: TailCurve = TailCurve {
        gain: 4.0,
        limit_deg: 30.0,
        exponent: 30.0,
    };

    pub const YAW: TailCurve = TailCurve {
        gain: 6.0,
        limit_deg: 27.0,
        exponent: 18.0,
    };

    /// Curved magnitude in degrees for an angle of any sign
    #[inline]
    pub fn apply(&self, angle_deg: f64) -> f64 {
        let magnitude = angle_deg.abs();
        magnitude + self.gain * (magnitude / self.limit_deg).powf(self.exponent)
    }
}

/// Raw (pitch, yaw) in degrees, or `None` for a degenerate quaternion
pub fn euler_degrees(orientation: &Quaternion) -> Option<(f64, f64)> {
    let q = orientation.normalized()?;
    let (x, y, z, w) = (q.x as f64, q.y as f64, q.z as f64, q.w as f64);

    let yaw = (2.0 * (y * z + w * x)).atan2(w * w - x * x - y * y + z * z);
    let pitch = (-2.0 * (x * z - w * y)).clamp(-1.0, 1.0).asin();

    Some((pitch.to_degrees(), yaw.to_degrees()))
}

/// Tail-curved gaze. Pitch is inverted (looking down in the source frame
/// reads as positive). Negative yaw is curved, positive yaw is left as is.
pub fn tail_curved_gaze(orientation: &Quaternion) -> GazeAngles {
    let Some((pitch_deg, yaw_deg)) = euler_degrees(orientation) else {
        return GazeAngles::FORWARD;
    };

    let pitch = signed(-pitch_deg, TailCurve::PITCH.apply(pitch_deg));
    let yaw = if yaw_deg < 0.0 {
        -TailCurve::YAW.apply(yaw_deg)
    } else {
        signed(yaw_deg, yaw_deg)
    };

    GazeAngles::new(pitch.to_radians() as f32, yaw.to_radians() as f32)
}

/// Linear gaze straight from the normalized quaternion components
pub fn linear_gaze(orientation: &Quaternion) -> GazeAngles {
    match orientation.normalized() {
        Some(q) => GazeAngles::new(q.y * FRAC_2_PI, q.x * FRAC_2_PI),
        None => GazeAngles::FORWARD,
    }
}

/// Gaze for one eye under the selected mode. Never NaN or infinite.
pub fn gaze_from_quaternion(orientation: &Quaternion, mode: GazeMode) -> GazeAngles {
    match mode {
        GazeMode::TailCurve => tail_curved_gaze(orientation),
        GazeMode::Linear => linear_gaze(orientation),
    }
}

/// `magnitude` carrying the sign of `sign_of`; zero stays positive zero
#[inline]
fn signed(sign_of: f64, magnitude: f64) -> f64 {
    if sign_of < 0.0 {
        -magnitude
    } else if sign_of > 0.0 {
        magnitude
    } else {
        0.0
    }
}
