//! Standard mapping for the vendor's 70-channel face expression set

use gazeform_core::{ChannelId as C, ChannelRegistry, ExpressionId as E, GazeformResult};

use crate::{CalibrationConfig, CalibrationTables, MappingEntry, MouthClosedBlend, Transform};

/// Upper-face slots, written while eye tracking is active
pub fn standard_eye_entries() -> Vec<MappingEntry> {
    vec![
        MappingEntry::direct(E::EyeWideLeft, C::UPPER_LID_RAISER_L),
        MappingEntry::direct(E::EyeWideRight, C::UPPER_LID_RAISER_R),
        MappingEntry::direct(E::EyeSquintLeft, C::LID_TIGHTENER_L),
        MappingEntry::direct(E::EyeSquintRight, C::LID_TIGHTENER_R),
        MappingEntry::direct(E::BrowInnerUpLeft, C::INNER_BROW_RAISER_L),
        MappingEntry::direct(E::BrowInnerUpRight, C::INNER_BROW_RAISER_R),
        MappingEntry::direct(E::BrowOuterUpLeft, C::OUTER_BROW_RAISER_L),
        MappingEntry::direct(E::BrowOuterUpRight, C::OUTER_BROW_RAISER_R),
        MappingEntry::direct(E::BrowPinchLeft, C::BROW_LOWERER_L),
        MappingEntry::direct(E::BrowLowererLeft, C::BROW_LOWERER_L),
        MappingEntry::direct(E::BrowPinchRight, C::BROW_LOWERER_R),
        MappingEntry::direct(E::BrowLowererRight, C::BROW_LOWERER_R),
    ]
}

/// Lower-face slots, written while expression tracking is active.
/// Direct copies come first, then the cross-talk corrections.
pub fn standard_face_entries(mouth_closed: MouthClosedBlend) -> Vec<MappingEntry> {
    let mut entries = vec![
        // Jaw
        MappingEntry::direct(E::JawOpen, C::JAW_DROP),
        MappingEntry::direct(E::JawLeft, C::JAW_SIDEWAYS_LEFT),
        MappingEntry::direct(E::JawRight, C::JAW_SIDEWAYS_RIGHT),
        MappingEntry::direct(E::JawForward, C::JAW_THRUST),
        // Mouth direction
        MappingEntry::direct(E::MouthUpperLeft, C::MOUTH_LEFT),
        MappingEntry::direct(E::MouthLowerLeft, C::MOUTH_LEFT),
        MappingEntry::direct(E::MouthUpperRight, C::MOUTH_RIGHT),
        MappingEntry::direct(E::MouthLowerRight, C::MOUTH_RIGHT),
        // Smile / sad
        MappingEntry::direct(E::MouthCornerPullLeft, C::LIP_CORNER_PULLER_L),
        MappingEntry::direct(E::MouthCornerSlantLeft, C::LIP_CORNER_PULLER_L),
        MappingEntry::direct(E::MouthCornerPullRight, C::LIP_CORNER_PULLER_R),
        MappingEntry::direct(E::MouthCornerSlantRight, C::LIP_CORNER_PULLER_R),
        MappingEntry::direct(E::MouthFrownLeft, C::LIP_CORNER_DEPRESSOR_L),
        MappingEntry::direct(E::MouthFrownRight, C::LIP_CORNER_DEPRESSOR_R),
        MappingEntry::direct(E::MouthLowerDownLeft, C::LOWER_LIP_DEPRESSOR_L),
        MappingEntry::direct(E::MouthLowerDownRight, C::LOWER_LIP_DEPRESSOR_R),
        MappingEntry::direct(E::MouthRaiserUpper, C::CHIN_RAISER_T),
        MappingEntry::direct(E::MouthRaiserLower, C::CHIN_RAISER_B),
        MappingEntry::direct(E::MouthDimpleLeft, C::DIMPLER_L),
        MappingEntry::direct(E::MouthDimpleRight, C::DIMPLER_R),
        MappingEntry::direct(E::MouthTightenerLeft, C::LIP_TIGHTENER_L),
        MappingEntry::direct(E::MouthTightenerRight, C::LIP_TIGHTENER_R),
        MappingEntry::direct(E::MouthPressLeft, C::LIP_PRESSOR_L),
        MappingEntry::direct(E::MouthPressRight, C::LIP_PRESSOR_R),
        MappingEntry::direct(E::MouthStretchLeft, C::LIP_STRETCHER_L),
        MappingEntry::direct(E::MouthStretchRight, C::LIP_STRETCHER_R),
        // Lip push/pull
        MappingEntry::direct(E::LipPuckerUpperRight, C::LIP_PUCKER_R),
        MappingEntry::direct(E::LipPuckerLowerRight, C::LIP_PUCKER_R),
        MappingEntry::direct(E::LipPuckerUpperLeft, C::LIP_PUCKER_L),
        MappingEntry::direct(E::LipPuckerLowerLeft, C::LIP_PUCKER_L),
        MappingEntry::direct(E::LipFunnelUpperLeft, C::LIP_FUNNELER_LT),
        MappingEntry::direct(E::LipFunnelUpperRight, C::LIP_FUNNELER_RT),
        MappingEntry::direct(E::LipFunnelLowerLeft, C::LIP_FUNNELER_LB),
        MappingEntry::direct(E::LipFunnelLowerRight, C::LIP_FUNNELER_RB),
        MappingEntry::direct(E::LipSuckLowerLeft, C::LIP_SUCK_LB),
        MappingEntry::direct(E::LipSuckLowerRight, C::LIP_SUCK_RB),
        // Cheeks / nose
        MappingEntry::direct(E::CheekPuffLeft, C::CHEEK_PUFF_L),
        MappingEntry::direct(E::CheekPuffRight, C::CHEEK_PUFF_R),
        MappingEntry::direct(E::CheekSuckLeft, C::CHEEK_SUCK_L),
        MappingEntry::direct(E::CheekSuckRight, C::CHEEK_SUCK_R),
        MappingEntry::direct(E::CheekSquintLeft, C::CHEEK_RAISER_L),
        MappingEntry::direct(E::CheekSquintRight, C::CHEEK_RAISER_R),
        MappingEntry::direct(E::NoseSneerLeft, C::NOSE_WRINKLER_L),
        MappingEntry::direct(E::NoseSneerRight, C::NOSE_WRINKLER_R),
        // Tongue
        MappingEntry::direct(E::TongueOut, C::TONGUE_OUT),
    ];

    entries.push(match mouth_closed {
        MouthClosedBlend::LipsToward => MappingEntry::direct(E::MouthClosed, C::LIPS_TOWARD),
        MouthClosedBlend::LipsTowardCappedByJaw => MappingEntry::derived(
            E::MouthClosed,
            Transform::JawCapped,
            &[C::LIPS_TOWARD, C::JAW_DROP],
        ),
    });

    // Upper lip up and deepen share the corrected value
    for (up, deepen, raiser, wrinkler) in [
        (E::MouthUpperUpLeft, E::MouthUpperDeepenLeft, C::UPPER_LIP_RAISER_L, C::NOSE_WRINKLER_L),
        (E::MouthUpperUpRight, E::MouthUpperDeepenRight, C::UPPER_LIP_RAISER_R, C::NOSE_WRINKLER_R),
    ] {
        entries.push(MappingEntry::derived(up, Transform::CrossTalkFloor, &[raiser, wrinkler]));
        entries.push(MappingEntry::derived(deepen, Transform::CrossTalkFloor, &[raiser, wrinkler]));
    }

    entries.push(MappingEntry::derived(
        E::LipSuckUpperLeft,
        Transform::SoftenedSuck,
        &[C::UPPER_LIP_RAISER_L, C::LIP_SUCK_LT],
    ));
    entries.push(MappingEntry::derived(
        E::LipSuckUpperRight,
        Transform::SoftenedSuck,
        &[C::UPPER_LIP_RAISER_R, C::LIP_SUCK_RT],
    ));

    entries
}

impl CalibrationTables {
    /// Standard tables over the standard registry
    pub fn standard(config: &CalibrationConfig) -> GazeformResult<Self> {
        CalibrationTables::new(
            ChannelRegistry::standard(),
            standard_eye_entries(),
            standard_face_entries(config.mouth_closed),
        )
    }

    /// Mouth-closed formulation baked into the tables, `None` when no table
    /// writes the slot or the entry matches neither formulation
    pub fn mouth_closed(&self) -> Option<MouthClosedBlend> {
        let entry = self
            .eye()
            .get(E::MouthClosed)
            .or_else(|| self.face().get(E::MouthClosed))?;
        match entry.transform {
            Transform::Identity => Some(MouthClosedBlend::LipsToward),
            Transform::JawCapped => Some(MouthClosedBlend::LipsTowardCappedByJaw),
            _ => None,
        }
    }
}
