//! Composite derivations - signal combinations a 1:1 copy cannot express
//!
//! Every function here is pure and total over `f32`. Inputs are raw channel
//! values; outputs are written through `UnifiedFrame::set_weight`, which
//! clamps to [0, 1].

use gazeform_core::clamp_unit;

/// Exponent of the lip-suck softening curve. Chosen by eye, not fitted.
pub const LIP_SUCK_SOFTENING_EXPONENT: f64 = 1.0 / 6.0;

/// Raw values that are not finite read as zero
#[inline]
pub fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Eyelid openness from closure and lid tightening:
/// `1 - clamp01(closed + closed * tightener)`.
///
/// Tightening only deepens a closure that is already happening, so a
/// squint with open eyes does not read as a blink.
#[inline]
pub fn eyelid_openness(closed: f32, tightener: f32) -> f32 {
    1.0 - clamp_unit(closed + closed * tightener)
}

/// Openness with the cheek raiser gating the tightener:
/// `1 - clamp01(closed + cheek_raiser * tightener)`
#[inline]
pub fn eyelid_openness_cheek_gated(closed: f32, cheek_raiser: f32, tightener: f32) -> f32 {
    1.0 - clamp_unit(closed + cheek_raiser * tightener)
}

/// Damping applied to the tightener: `2x / 2^(2x)`
#[inline]
pub fn tightener_damping(x: f32) -> f32 {
    2.0 * x / 2f32.powf(2.0 * x)
}

/// Openness with a damped tightener contribution:
/// `1 - clamp01(closed + closed * damping(tightener))`
#[inline]
pub fn eyelid_openness_damped(closed: f32, tightener: f32) -> f32 {
    1.0 - clamp_unit(closed + closed * tightener_damping(tightener))
}

/// Upper lip raise with nose-wrinkle cross-talk removed:
/// `max(0, upper_lip_raiser - nose_wrinkler)`
#[inline]
pub fn lip_raise_correction(upper_lip_raiser: f32, nose_wrinkler: f32) -> f32 {
    (upper_lip_raiser - nose_wrinkler).max(0.0)
}

/// Upper lip suck biased down as the lip raise grows:
/// `min(1 - upper_lip_raiser^(1/6), lip_suck)`
#[inline]
pub fn lip_suck_correction(upper_lip_raiser: f32, lip_suck: f32) -> f32 {
    let softened = (upper_lip_raiser.max(0.0) as f64).powf(LIP_SUCK_SOFTENING_EXPONENT);
    (1.0 - softened as f32).min(lip_suck)
}

/// Mouth closed capped by the jaw drop: `min(lips_toward, jaw_drop)`
#[inline]
pub fn mouth_closed_capped(lips_toward: f32, jaw_drop: f32) -> f32 {
    lips_toward.min(jaw_drop)
}
