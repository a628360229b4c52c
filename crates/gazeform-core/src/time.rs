//! Time primitives for gazeform
//!
//! Two counters are carried on frames:
//! - FrameTime: the vendor clock stamp of a raw frame (advisory only)
//! - Generation: the engine's count of completed calibration cycles

use std::fmt;
use std::time::Duration;

/// Vendor clock stamp of a raw frame, in nanoseconds of the runtime clock.
/// Never used for ordering inside the engine.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameTime(pub i64);

impl FrameTime {
    pub const ZERO: FrameTime = FrameTime(0);

    #[inline]
    pub fn from_nanos(nanos: i64) -> Self {
        FrameTime(nanos)
    }

    #[inline]
    pub fn from_millis(millis: i64) -> Self {
        FrameTime(millis.saturating_mul(1_000_000))
    }

    #[inline]
    pub fn as_nanos(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0 / 1_000_000
    }

    /// Elapsed time since an earlier stamp, zero if `earlier` is not earlier
    #[inline]
    pub fn since(self, earlier: FrameTime) -> Duration {
        let diff = self.0.saturating_sub(earlier.0);
        if diff > 0 {
            Duration::from_nanos(diff as u64)
        } else {
            Duration::ZERO
        }
    }
}

impl fmt::Debug for FrameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t({:.3}ms)", self.0 as f64 / 1_000_000.0)
    }
}

/// Count of calibration cycles that wrote a unified frame
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl Generation {
    pub const ZERO: Generation = Generation(0);

    #[inline]
    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }

    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}
