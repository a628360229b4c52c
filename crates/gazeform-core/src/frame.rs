//! Frame types - what comes in from the driver and what goes out to the host
//!
//! A `RawFrame` is built fresh by the source on every poll and is never
//! retained past one cycle. A `UnifiedFrame` is the engine's output slot,
//! overwritten as a whole each cycle that has data.

use crate::{
    ChannelId, ExpressionId, FrameTime, GazeformError, GazeformResult, Generation,
    FACE_CHANNEL_COUNT, MIN_FACE_CHANNELS,
};

/// Pupil diameter reported for both eyes. The device has no pupil sensor.
pub const PUPIL_DIAMETER_MM: f32 = 5.0;

/// Lower bound of the dilation normalization range
pub const MIN_DILATION: f32 = 0.0;

/// Upper bound of the dilation normalization range
pub const MAX_DILATION: f32 = 10.0;

/// Eye side, left = 0 / right = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Eye {
    Left = 0,
    Right = 1,
}

impl Eye {
    pub const BOTH: [Eye; 2] = [Eye::Left, Eye::Right];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Orientation slot of this eye in the channel registry
    pub fn orientation_channel(self) -> ChannelId {
        match self {
            Eye::Left => ChannelId::EYE_LEFT,
            Eye::Right => ChannelId::EYE_RIGHT,
        }
    }
}

/// Orientation quaternion (x, y, z, w). Not guaranteed normalized on input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    /// Magnitude below which a quaternion is treated as "no rotation"
    pub const DEGENERATE_EPSILON: f32 = 1e-6;

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub const fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }

    /// Rotation of `angle` radians about a unit axis
    pub fn from_axis_angle(axis: [f32; 3], angle: f32) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        Self {
            x: axis[0] * s,
            y: axis[1] * s,
            z: axis[2] * s,
            w: c,
        }
    }

    #[inline]
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// Unit-length copy, or `None` for a degenerate (near-zero or
    /// non-finite) quaternion
    pub fn normalized(&self) -> Option<Quaternion> {
        let len = self.magnitude();
        if !len.is_finite() || len < Self::DEGENERATE_EPSILON {
            return None;
        }
        Some(Quaternion {
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
            w: self.w / len,
        })
    }
}

/// Raw telemetry frame as produced by the driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawFrame {
    face: [f32; FACE_CHANNEL_COUNT],
    /// Per-eye orientation, indexed by `Eye`
    pub eyes: [Quaternion; 2],
    /// Vendor region confidences (lower face, upper face). Advisory only.
    pub confidences: [f32; 2],
    /// Vendor clock stamp
    pub timestamp: FrameTime,
}

impl Default for RawFrame {
    fn default() -> Self {
        Self::neutral()
    }
}

impl RawFrame {
    /// All channels at rest, both eyes looking forward
    pub fn neutral() -> Self {
        Self {
            face: [0.0; FACE_CHANNEL_COUNT],
            eyes: [Quaternion::identity(); 2],
            confidences: [1.0; 2],
            timestamp: FrameTime::ZERO,
        }
    }

    /// Build from the driver's weight vector. Drivers may stop before the
    /// tongue block; the missing tail reads as zero.
    pub fn from_weights(weights: &[f32]) -> GazeformResult<Self> {
        if weights.len() < MIN_FACE_CHANNELS || weights.len() > FACE_CHANNEL_COUNT {
            return Err(GazeformError::ChannelCountOutOfRange {
                actual: weights.len(),
                min: MIN_FACE_CHANNELS,
                max: FACE_CHANNEL_COUNT,
            });
        }

        let mut frame = Self::neutral();
        frame.face[..weights.len()].copy_from_slice(weights);
        Ok(frame)
    }

    pub fn with_weight(mut self, id: ChannelId, value: f32) -> Self {
        self.face[id.index()] = value;
        self
    }

    pub fn with_eye(mut self, eye: Eye, orientation: Quaternion) -> Self {
        self.eyes[eye.index()] = orientation;
        self
    }

    /// Set the lower and upper face confidences as reported
    pub fn with_confidences(mut self, lower_face: f32, upper_face: f32) -> Self {
        self.confidences = [lower_face, upper_face];
        self
    }

    pub fn with_timestamp(mut self, timestamp: FrameTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Scalar channel value. Unchecked index access; mapping tables and the
    /// engine read through [`crate::ChannelRegistry::lookup`] instead.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a scalar face channel.
    #[inline]
    pub fn weight(&self, id: ChannelId) -> f32 {
        self.face[id.index()]
    }

    #[inline]
    pub fn set_weight(&mut self, id: ChannelId, value: f32) {
        self.face[id.index()] = value;
    }

    #[inline]
    pub fn orientation(&self, eye: Eye) -> Quaternion {
        self.eyes[eye.index()]
    }

    /// All face channels in registry order
    pub fn face_weights(&self) -> &[f32] {
        &self.face
    }
}

/// Which capability sets the source currently provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub eye: bool,
    pub expression: bool,
}

impl Capabilities {
    pub const NONE: Capabilities = Capabilities {
        eye: false,
        expression: false,
    };

    pub const ALL: Capabilities = Capabilities {
        eye: true,
        expression: true,
    };

    pub fn new(eye: bool, expression: bool) -> Self {
        Self { eye, expression }
    }

    pub fn any(&self) -> bool {
        self.eye || self.expression
    }

    /// Flags present in both
    pub fn intersect(&self, other: Capabilities) -> Capabilities {
        Capabilities {
            eye: self.eye && other.eye,
            expression: self.expression && other.expression,
        }
    }
}

/// Gaze direction in radians (0, 0 = forward)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GazeAngles {
    /// Vertical angle
    pub pitch: f32,
    /// Horizontal angle
    pub yaw: f32,
}

impl GazeAngles {
    pub const FORWARD: GazeAngles = GazeAngles {
        pitch: 0.0,
        yaw: 0.0,
    };

    pub fn new(pitch: f32, yaw: f32) -> Self {
        Self { pitch, yaw }
    }

    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite() && self.yaw.is_finite()
    }
}

/// Per-eye unified output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeState {
    pub gaze: GazeAngles,
    /// 0.0 = closed, 1.0 = fully open
    pub openness: f32,
    pub pupil_diameter_mm: f32,
}

impl Default for EyeState {
    fn default() -> Self {
        Self {
            gaze: GazeAngles::FORWARD,
            openness: 1.0,
            pupil_diameter_mm: PUPIL_DIAMETER_MM,
        }
    }
}

/// The canonical, device-independent frame handed to the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnifiedFrame {
    expressions: [f32; ExpressionId::COUNT],
    /// Per-eye state, indexed by `Eye`
    pub eyes: [EyeState; 2],
    pub min_dilation: f32,
    pub max_dilation: f32,
    /// Cycles that have written this frame
    pub generation: Generation,
    /// Stamp of the raw frame last written
    pub timestamp: FrameTime,
}

impl Default for UnifiedFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl UnifiedFrame {
    /// Neutral frame: no expression, eyes open and forward
    pub fn new() -> Self {
        Self {
            expressions: [0.0; ExpressionId::COUNT],
            eyes: [EyeState::default(); 2],
            min_dilation: MIN_DILATION,
            max_dilation: MAX_DILATION,
            generation: Generation::ZERO,
            timestamp: FrameTime::ZERO,
        }
    }

    #[inline]
    pub fn weight(&self, id: ExpressionId) -> f32 {
        self.expressions[id.index()]
    }

    /// Write one expression weight, clamped to [0, 1]. Non-finite values
    /// are written as 0.
    #[inline]
    pub fn set_weight(&mut self, id: ExpressionId, value: f32) {
        self.expressions[id.index()] = clamp_unit(value);
    }

    pub fn weights(&self) -> &[f32] {
        &self.expressions
    }

    #[inline]
    pub fn eye(&self, eye: Eye) -> &EyeState {
        &self.eyes[eye.index()]
    }

    #[inline]
    pub fn eye_mut(&mut self, eye: Eye) -> &mut EyeState {
        &mut self.eyes[eye.index()]
    }
}

/// Clamp to [0, 1]; NaN becomes 0
#[inline]
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidences_builder() {
        assert_eq!(RawFrame::neutral().confidences, [1.0, 1.0]);

        let frame = RawFrame::neutral().with_confidences(0.25, 0.75);
        assert_eq!(frame.confidences, [0.25, 0.75]);
        assert_eq!(frame.weight(ChannelId::JAW_DROP), 0.0);
    }

    #[test]
    fn test_from_weights_pads_tongue_block() {
        let weights = vec![0.5; MIN_FACE_CHANNELS];
        let frame = RawFrame::from_weights(&weights).unwrap();

        assert_eq!(frame.weight(ChannelId::UPPER_LIP_RAISER_R), 0.5);
        assert_eq!(frame.weight(ChannelId::TONGUE_OUT), 0.0);
    }

    #[test]
    fn test_from_weights_rejects_bad_length() {
        let err = RawFrame::from_weights(&[0.0; 10]).unwrap_err();
        assert_eq!(
            err,
            GazeformError::ChannelCountOutOfRange {
                actual: 10,
                min: MIN_FACE_CHANNELS,
                max: FACE_CHANNEL_COUNT,
            }
        );
        assert!(RawFrame::from_weights(&[0.0; 71]).is_err());
    }

    #[test]
    #[should_panic]
    fn test_weight_out_of_range_panics() {
        RawFrame::neutral().weight(ChannelId::EYE_LEFT);
    }

    #[test]
    fn test_quaternion_normalize() {
        let q = Quaternion::new(0.0, 0.0, 0.0, 2.0).normalized().unwrap();
        assert!((q.w - 1.0).abs() < 1e-6);

        assert!(Quaternion::new(0.0, 0.0, 0.0, 0.0).normalized().is_none());
        assert!(Quaternion::new(f32::NAN, 0.0, 0.0, 1.0).normalized().is_none());
    }

    #[test]
    fn test_unified_frame_defaults() {
        let frame = UnifiedFrame::new();

        assert!(frame.weights().iter().all(|w| *w == 0.0));
        for eye in Eye::BOTH {
            assert_eq!(frame.eye(eye).openness, 1.0);
            assert_eq!(frame.eye(eye).pupil_diameter_mm, PUPIL_DIAMETER_MM);
            assert_eq!(frame.eye(eye).gaze, GazeAngles::FORWARD);
        }
        assert_eq!((frame.min_dilation, frame.max_dilation), (0.0, 10.0));
    }

    #[test]
    fn test_set_weight_clamps() {
        let mut frame = UnifiedFrame::new();

        frame.set_weight(ExpressionId::JawOpen, 1.7);
        assert_eq!(frame.weight(ExpressionId::JawOpen), 1.0);

        frame.set_weight(ExpressionId::JawOpen, -0.2);
        assert_eq!(frame.weight(ExpressionId::JawOpen), 0.0);

        frame.set_weight(ExpressionId::JawOpen, f32::NAN);
        assert_eq!(frame.weight(ExpressionId::JawOpen), 0.0);
    }

    #[test]
    fn test_capabilities_intersect() {
        let eye_only = Capabilities::new(true, false);
        assert_eq!(eye_only.intersect(Capabilities::ALL), eye_only);
        assert!(!Capabilities::NONE.any());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_clamp_unit_stays_in_range(value in proptest::num::f32::ANY) {
                let clamped = clamp_unit(value);
                prop_assert!((0.0..=1.0).contains(&clamped));
            }

            #[test]
            fn prop_normalized_is_unit_length(
                x in -10.0f32..10.0,
                y in -10.0f32..10.0,
                z in -10.0f32..10.0,
                w in 0.1f32..10.0,
            ) {
                let q = Quaternion::new(x, y, z, w).normalized().unwrap();
                prop_assert!((q.magnitude() - 1.0).abs() < 1e-4);
            }
        }
    }
}
