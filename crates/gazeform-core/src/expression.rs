//! Canonical expression identifiers
//!
//! The unified, device-independent output vocabulary. Several canonical
//! slots may draw from the same raw channel, and some slots have no source
//! on a given device and simply stay at zero.

/// One output slot in the unified expression vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ExpressionId {
    // Eyelid shape
    EyeSquintRight,
    EyeSquintLeft,
    EyeWideRight,
    EyeWideLeft,

    // Brows
    BrowPinchRight,
    BrowPinchLeft,
    BrowLowererRight,
    BrowLowererLeft,
    BrowInnerUpRight,
    BrowInnerUpLeft,
    BrowOuterUpRight,
    BrowOuterUpLeft,

    // Nose
    NasalDilationRight,
    NasalDilationLeft,
    NasalConstrictRight,
    NasalConstrictLeft,

    // Cheeks
    CheekSquintRight,
    CheekSquintLeft,
    CheekPuffRight,
    CheekPuffLeft,
    CheekSuckRight,
    CheekSuckLeft,

    // Jaw
    JawOpen,
    JawRight,
    JawLeft,
    JawForward,
    JawBackward,
    JawClench,
    JawMandibleRaise,
    MouthClosed,

    // Lip push/pull
    LipSuckUpperRight,
    LipSuckUpperLeft,
    LipSuckLowerRight,
    LipSuckLowerLeft,
    LipSuckCornerRight,
    LipSuckCornerLeft,
    LipFunnelUpperRight,
    LipFunnelUpperLeft,
    LipFunnelLowerRight,
    LipFunnelLowerLeft,
    LipPuckerUpperRight,
    LipPuckerUpperLeft,
    LipPuckerLowerRight,
    LipPuckerLowerLeft,

    // Upper lip raiser
    MouthUpperUpRight,
    MouthUpperUpLeft,
    MouthUpperDeepenRight,
    MouthUpperDeepenLeft,
    NoseSneerRight,
    NoseSneerLeft,

    // Lower lip depressor
    MouthLowerDownRight,
    MouthLowerDownLeft,

    // Mouth direction
    MouthUpperRight,
    MouthUpperLeft,
    MouthLowerRight,
    MouthLowerLeft,

    // Smile
    MouthCornerPullRight,
    MouthCornerPullLeft,
    MouthCornerSlantRight,
    MouthCornerSlantLeft,

    // Sad
    MouthFrownRight,
    MouthFrownLeft,
    MouthStretchRight,
    MouthStretchLeft,
    MouthDimpleRight,
    MouthDimpleLeft,

    // Press/tighten
    MouthRaiserUpper,
    MouthRaiserLower,
    MouthPressRight,
    MouthPressLeft,
    MouthTightenerRight,
    MouthTightenerLeft,

    // Tongue
    TongueOut,
}

impl ExpressionId {
    /// Number of canonical slots
    pub const COUNT: usize = 73;

    /// All expressions in slot order
    pub fn all() -> &'static [ExpressionId] {
        &ALL_EXPRESSIONS
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<ExpressionId> {
        ALL_EXPRESSIONS.get(index).copied()
    }

    /// Slots driven by the eye capability rather than the expression one
    pub fn is_upper_face(self) -> bool {
        matches!(
            self,
            ExpressionId::EyeSquintRight
                | ExpressionId::EyeSquintLeft
                | ExpressionId::EyeWideRight
                | ExpressionId::EyeWideLeft
                | ExpressionId::BrowPinchRight
                | ExpressionId::BrowPinchLeft
                | ExpressionId::BrowLowererRight
                | ExpressionId::BrowLowererLeft
                | ExpressionId::BrowInnerUpRight
                | ExpressionId::BrowInnerUpLeft
                | ExpressionId::BrowOuterUpRight
                | ExpressionId::BrowOuterUpLeft
        )
    }
}

const ALL_EXPRESSIONS: [ExpressionId; ExpressionId::COUNT] = [
    ExpressionId::EyeSquintRight,
    ExpressionId::EyeSquintLeft,
    ExpressionId::EyeWideRight,
    ExpressionId::EyeWideLeft,
    ExpressionId::BrowPinchRight,
    ExpressionId::BrowPinchLeft,
    ExpressionId::BrowLowererRight,
    ExpressionId::BrowLowererLeft,
    ExpressionId::BrowInnerUpRight,
    ExpressionId::BrowInnerUpLeft,
    ExpressionId::BrowOuterUpRight,
    ExpressionId::BrowOuterUpLeft,
    ExpressionId::NasalDilationRight,
    ExpressionId::NasalDilationLeft,
    ExpressionId::NasalConstrictRight,
    ExpressionId::NasalConstrictLeft,
    ExpressionId::CheekSquintRight,
    ExpressionId::CheekSquintLeft,
    ExpressionId::CheekPuffRight,
    ExpressionId::CheekPuffLeft,
    ExpressionId::CheekSuckRight,
    ExpressionId::CheekSuckLeft,
    ExpressionId::JawOpen,
    ExpressionId::JawRight,
    ExpressionId::JawLeft,
    ExpressionId::JawForward,
    ExpressionId::JawBackward,
    ExpressionId::JawClench,
    ExpressionId::JawMandibleRaise,
    ExpressionId::MouthClosed,
    ExpressionId::LipSuckUpperRight,
    ExpressionId::LipSuckUpperLeft,
    ExpressionId::LipSuckLowerRight,
    ExpressionId::LipSuckLowerLeft,
    ExpressionId::LipSuckCornerRight,
    ExpressionId::LipSuckCornerLeft,
    ExpressionId::LipFunnelUpperRight,
    ExpressionId::LipFunnelUpperLeft,
    ExpressionId::LipFunnelLowerRight,
    ExpressionId::LipFunnelLowerLeft,
    ExpressionId::LipPuckerUpperRight,
    ExpressionId::LipPuckerUpperLeft,
    ExpressionId::LipPuckerLowerRight,
    ExpressionId::LipPuckerLowerLeft,
    ExpressionId::MouthUpperUpRight,
    ExpressionId::MouthUpperUpLeft,
    ExpressionId::MouthUpperDeepenRight,
    ExpressionId::MouthUpperDeepenLeft,
    ExpressionId::NoseSneerRight,
    ExpressionId::NoseSneerLeft,
    ExpressionId::MouthLowerDownRight,
    ExpressionId::MouthLowerDownLeft,
    ExpressionId::MouthUpperRight,
    ExpressionId::MouthUpperLeft,
    ExpressionId::MouthLowerRight,
    ExpressionId::MouthLowerLeft,
    ExpressionId::MouthCornerPullRight,
    ExpressionId::MouthCornerPullLeft,
    ExpressionId::MouthCornerSlantRight,
    ExpressionId::MouthCornerSlantLeft,
    ExpressionId::MouthFrownRight,
    ExpressionId::MouthFrownLeft,
    ExpressionId::MouthStretchRight,
    ExpressionId::MouthStretchLeft,
    ExpressionId::MouthDimpleRight,
    ExpressionId::MouthDimpleLeft,
    ExpressionId::MouthRaiserUpper,
    ExpressionId::MouthRaiserLower,
    ExpressionId::MouthPressRight,
    ExpressionId::MouthPressLeft,
    ExpressionId::MouthTightenerRight,
    ExpressionId::MouthTightenerLeft,
    ExpressionId::TongueOut,
];
