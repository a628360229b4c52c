//! Raw channel identifiers and the channel registry
//!
//! Raw channels are addressed by a contiguous, zero-based index that is
//! stable for the life of the process. Indices `0..FACE_CHANNEL_COUNT` are
//! scalar blend-shape activations in the vendor's order; the two slots after
//! them name the per-eye orientation quaternions.

use std::fmt;

use crate::{GazeformError, GazeformResult, RawFrame};

/// Number of scalar face channels declared by the registry
pub const FACE_CHANNEL_COUNT: usize = 70;

/// Face channel count of drivers that stop before the tongue block
pub const MIN_FACE_CHANNELS: usize = 63;

/// Total declared channels (face scalars + two eye orientations)
pub const CHANNEL_COUNT: usize = FACE_CHANNEL_COUNT + 2;

/// Raw channel identity - index into the channel registry
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelId(pub u16);

macro_rules! face_channels {
    ($($name:ident = $index:literal => $label:literal,)*) => {
        impl ChannelId {
            $(pub const $name: ChannelId = ChannelId($index);)*
        }

        const FACE_CHANNEL_NAMES: [&str; FACE_CHANNEL_COUNT] = [$($label,)*];
    };
}

face_channels! {
    BROW_LOWERER_L = 0 => "Brow_Lowerer_L",
    BROW_LOWERER_R = 1 => "Brow_Lowerer_R",
    CHEEK_PUFF_L = 2 => "Cheek_Puff_L",
    CHEEK_PUFF_R = 3 => "Cheek_Puff_R",
    CHEEK_RAISER_L = 4 => "Cheek_Raiser_L",
    CHEEK_RAISER_R = 5 => "Cheek_Raiser_R",
    CHEEK_SUCK_L = 6 => "Cheek_Suck_L",
    CHEEK_SUCK_R = 7 => "Cheek_Suck_R",
    CHIN_RAISER_B = 8 => "Chin_Raiser_B",
    CHIN_RAISER_T = 9 => "Chin_Raiser_T",
    DIMPLER_L = 10 => "Dimpler_L",
    DIMPLER_R = 11 => "Dimpler_R",
    EYES_CLOSED_L = 12 => "Eyes_Closed_L",
    EYES_CLOSED_R = 13 => "Eyes_Closed_R",
    EYES_LOOK_DOWN_L = 14 => "Eyes_Look_Down_L",
    EYES_LOOK_DOWN_R = 15 => "Eyes_Look_Down_R",
    EYES_LOOK_LEFT_L = 16 => "Eyes_Look_Left_L",
    EYES_LOOK_LEFT_R = 17 => "Eyes_Look_Left_R",
    EYES_LOOK_RIGHT_L = 18 => "Eyes_Look_Right_L",
    EYES_LOOK_RIGHT_R = 19 => "Eyes_Look_Right_R",
    EYES_LOOK_UP_L = 20 => "Eyes_Look_Up_L",
    EYES_LOOK_UP_R = 21 => "Eyes_Look_Up_R",
    INNER_BROW_RAISER_L = 22 => "Inner_Brow_Raiser_L",
    INNER_BROW_RAISER_R = 23 => "Inner_Brow_Raiser_R",
    JAW_DROP = 24 => "Jaw_Drop",
    JAW_SIDEWAYS_LEFT = 25 => "Jaw_Sideways_Left",
    JAW_SIDEWAYS_RIGHT = 26 => "Jaw_Sideways_Right",
    JAW_THRUST = 27 => "Jaw_Thrust",
    LID_TIGHTENER_L = 28 => "Lid_Tightener_L",
    LID_TIGHTENER_R = 29 => "Lid_Tightener_R",
    LIP_CORNER_DEPRESSOR_L = 30 => "Lip_Corner_Depressor_L",
    LIP_CORNER_DEPRESSOR_R = 31 => "Lip_Corner_Depressor_R",
    LIP_CORNER_PULLER_L = 32 => "Lip_Corner_Puller_L",
    LIP_CORNER_PULLER_R = 33 => "Lip_Corner_Puller_R",
    LIP_FUNNELER_LB = 34 => "Lip_Funneler_LB",
    LIP_FUNNELER_LT = 35 => "Lip_Funneler_LT",
    LIP_FUNNELER_RB = 36 => "Lip_Funneler_RB",
    LIP_FUNNELER_RT = 37 => "Lip_Funneler_RT",
    LIP_PRESSOR_L = 38 => "Lip_Pressor_L",
    LIP_PRESSOR_R = 39 => "Lip_Pressor_R",
    LIP_PUCKER_L = 40 => "Lip_Pucker_L",
    LIP_PUCKER_R = 41 => "Lip_Pucker_R",
    LIP_STRETCHER_L = 42 => "Lip_Stretcher_L",
    LIP_STRETCHER_R = 43 => "Lip_Stretcher_R",
    LIP_SUCK_LB = 44 => "Lip_Suck_LB",
    LIP_SUCK_LT = 45 => "Lip_Suck_LT",
    LIP_SUCK_RB = 46 => "Lip_Suck_RB",
    LIP_SUCK_RT = 47 => "Lip_Suck_RT",
    LIP_TIGHTENER_L = 48 => "Lip_Tightener_L",
    LIP_TIGHTENER_R = 49 => "Lip_Tightener_R",
    LIPS_TOWARD = 50 => "Lips_Toward",
    LOWER_LIP_DEPRESSOR_L = 51 => "Lower_Lip_Depressor_L",
    LOWER_LIP_DEPRESSOR_R = 52 => "Lower_Lip_Depressor_R",
    MOUTH_LEFT = 53 => "Mouth_Left",
    MOUTH_RIGHT = 54 => "Mouth_Right",
    NOSE_WRINKLER_L = 55 => "Nose_Wrinkler_L",
    NOSE_WRINKLER_R = 56 => "Nose_Wrinkler_R",
    OUTER_BROW_RAISER_L = 57 => "Outer_Brow_Raiser_L",
    OUTER_BROW_RAISER_R = 58 => "Outer_Brow_Raiser_R",
    UPPER_LID_RAISER_L = 59 => "Upper_Lid_Raiser_L",
    UPPER_LID_RAISER_R = 60 => "Upper_Lid_Raiser_R",
    UPPER_LIP_RAISER_L = 61 => "Upper_Lip_Raiser_L",
    UPPER_LIP_RAISER_R = 62 => "Upper_Lip_Raiser_R",
    TONGUE_TIP_INTERDENTAL = 63 => "Tongue_Tip_Interdental",
    TONGUE_TIP_ALVEOLAR = 64 => "Tongue_Tip_Alveolar",
    TONGUE_FRONT_DORSAL_PALATE = 65 => "Tongue_Front_Dorsal_Palate",
    TONGUE_MID_DORSAL_PALATE = 66 => "Tongue_Mid_Dorsal_Palate",
    TONGUE_BACK_DORSAL_VELAR = 67 => "Tongue_Back_Dorsal_Velar",
    TONGUE_OUT = 68 => "Tongue_Out",
    TONGUE_RETREAT = 69 => "Tongue_Retreat",
}

impl ChannelId {
    /// Left eye orientation slot
    pub const EYE_LEFT: ChannelId = ChannelId(FACE_CHANNEL_COUNT as u16);
    /// Right eye orientation slot
    pub const EYE_RIGHT: ChannelId = ChannelId(FACE_CHANNEL_COUNT as u16 + 1);

    #[inline]
    pub fn new(index: u16) -> Self {
        ChannelId(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// True for the scalar face channels, false for orientation slots and
    /// anything past the declared range
    #[inline]
    pub fn is_scalar(self) -> bool {
        self.index() < FACE_CHANNEL_COUNT
    }

    /// Vendor name, if the index is declared
    pub fn name(self) -> Option<&'static str> {
        match self {
            ChannelId::EYE_LEFT => Some("Eye_Orientation_L"),
            ChannelId::EYE_RIGHT => Some("Eye_Orientation_R"),
            id => FACE_CHANNEL_NAMES.get(id.index()).copied(),
        }
    }
}

impl fmt::Debug for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Channel({}:{})", self.0, name),
            None => write!(f, "Channel({}:undeclared)", self.0),
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("undeclared"))
    }
}

/// Channel registry - the contract between the raw source and the mapping
/// tables. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRegistry {
    face_channels: usize,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl ChannelRegistry {
    /// The 70 vendor face channels plus both eye orientation slots
    pub const fn standard() -> Self {
        ChannelRegistry {
            face_channels: FACE_CHANNEL_COUNT,
        }
    }

    /// Total number of declared channels
    pub fn len(&self) -> usize {
        self.face_channels + 2
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of scalar face channels
    pub fn face_len(&self) -> usize {
        self.face_channels
    }

    pub fn contains(&self, id: ChannelId) -> bool {
        id.index() < self.len()
    }

    /// Is this a declared scalar channel (not an orientation slot)?
    pub fn is_scalar(&self, id: ChannelId) -> bool {
        id.index() < self.face_channels
    }

    pub fn name(&self, id: ChannelId) -> Option<&'static str> {
        if self.contains(id) {
            id.name()
        } else {
            None
        }
    }

    /// Resolve a raw index into a declared channel
    pub fn resolve(&self, index: usize) -> GazeformResult<ChannelId> {
        if index < self.len() {
            Ok(ChannelId(index as u16))
        } else {
            Err(GazeformError::UnknownChannel(index))
        }
    }

    /// Check that `id` is a declared scalar channel
    pub fn validate_scalar(&self, id: ChannelId) -> GazeformResult<ChannelId> {
        if !self.contains(id) {
            return Err(GazeformError::UnknownChannel(id.index()));
        }
        if !self.is_scalar(id) {
            return Err(GazeformError::NotAScalarChannel(id));
        }
        Ok(id)
    }

    /// Read one scalar channel from a frame.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a declared scalar channel. Tables validate
    /// every reference at construction, so reaching this is a build defect.
    #[inline]
    pub fn lookup(&self, frame: &RawFrame, id: ChannelId) -> f32 {
        assert!(
            self.is_scalar(id),
            "channel {:?} outside the declared scalar range 0..{}",
            id,
            self.face_channels
        );
        frame.weight(id)
    }

    /// Iterate over every declared channel in index order
    pub fn iter(&self) -> impl Iterator<Item = ChannelId> {
        (0..self.len() as u16).map(ChannelId)
    }
}
