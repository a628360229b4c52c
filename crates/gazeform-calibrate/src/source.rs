//! Raw frame source - the driver side of the engine
//!
//! The native runtime is opaque. All the engine needs from it is a session
//! bracket, a non-blocking poll, and the current capability flags.

use std::fmt;

use gazeform_core::{Capabilities, RawFrame};

/// Driver boundary
pub trait FrameSource {
    /// Bring the native session up and report what came up with it
    fn initialize(&mut self) -> InitStatus;

    /// Poll for the latest frame. `None` means no new data this cycle.
    fn acquire(&mut self) -> Option<RawFrame>;

    /// Capability flags as of now. Drivers that fix them at session start
    /// return the same value every time.
    fn capabilities(&self) -> Capabilities;

    /// Release the native session
    fn teardown(&mut self);
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn initialize(&mut self) -> InitStatus {
        (**self).initialize()
    }

    fn acquire(&mut self) -> Option<RawFrame> {
        (**self).acquire()
    }

    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }

    fn teardown(&mut self) {
        (**self).teardown()
    }
}

/// Outcome of bringing up the native runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    /// Both trackers available
    Ready,
    /// Runtime up, eye tracking not supported
    EyeUnsupported,
    /// Runtime up, face tracking not supported
    FaceUnsupported,
    InstanceCreateFailed,
    SystemIdFailed,
    ViewConfigurationFailed,
    GraphicsRequirementsFailed,
    SessionCreateFailed,
    SpaceCreateFailed,
    SessionBeginFailed,
    /// Runtime up, face tracker could not be created
    FaceTrackerFailed,
    /// Runtime up, eye tracker could not be created
    EyeTrackerFailed,
    /// Any code the runtime does not document
    Undefined(i32),
}

impl InitStatus {
    /// Decode the native runtime's init result code
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => InitStatus::Ready,
            -1 => InitStatus::EyeUnsupported,
            -2 => InitStatus::FaceUnsupported,
            2 => InitStatus::InstanceCreateFailed,
            3 => InitStatus::SystemIdFailed,
            4 => InitStatus::ViewConfigurationFailed,
            5 => InitStatus::GraphicsRequirementsFailed,
            6 => InitStatus::SessionCreateFailed,
            7 => InitStatus::SpaceCreateFailed,
            8 => InitStatus::SessionBeginFailed,
            9 => InitStatus::FaceTrackerFailed,
            10 => InitStatus::EyeTrackerFailed,
            other => InitStatus::Undefined(other),
        }
    }

    /// Capability flags this status leaves available
    pub fn capabilities(&self) -> Capabilities {
        match self {
            InitStatus::Ready => Capabilities::ALL,
            InitStatus::EyeUnsupported | InitStatus::EyeTrackerFailed => {
                Capabilities::new(false, true)
            }
            InitStatus::FaceUnsupported | InitStatus::FaceTrackerFailed => {
                Capabilities::new(true, false)
            }
            _ => Capabilities::NONE,
        }
    }

    /// Did the runtime come up at all (possibly with one tracker missing)?
    pub fn is_partial_or_ready(&self) -> bool {
        self.capabilities().any()
    }

    /// A fault that the user must act on, as opposed to missing hardware
    pub fn is_error(&self) -> bool {
        !matches!(
            self,
            InitStatus::Ready | InitStatus::EyeUnsupported | InitStatus::FaceUnsupported
        )
    }

    /// Hint to show alongside the diagnostic, where one exists
    pub fn remedy(&self) -> Option<&'static str> {
        match self {
            InitStatus::InstanceCreateFailed => Some(
                "make sure the vendor application is running and the previous session was torn down",
            ),
            InitStatus::SessionCreateFailed => {
                Some("make sure the vendor runtime is the active OpenXR runtime")
            }
            InitStatus::Undefined(_) => Some("restart the module"),
            _ => None,
        }
    }
}

impl fmt::Display for InitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitStatus::Ready => f.write_str("runtime init success"),
            InitStatus::EyeUnsupported => f.write_str("eye tracking not supported"),
            InitStatus::FaceUnsupported => f.write_str("face tracking not supported"),
            InitStatus::InstanceCreateFailed => f.write_str("failed to create instance"),
            InitStatus::SystemIdFailed => f.write_str("failed to get system id"),
            InitStatus::ViewConfigurationFailed => {
                f.write_str("failed to get view configuration type")
            }
            InitStatus::GraphicsRequirementsFailed => {
                f.write_str("failed to get graphics requirements")
            }
            InitStatus::SessionCreateFailed => f.write_str("failed to create session"),
            InitStatus::SpaceCreateFailed => f.write_str("failed to create reference space"),
            InitStatus::SessionBeginFailed => f.write_str("failed to begin session"),
            InitStatus::FaceTrackerFailed => f.write_str("failed to create face tracker"),
            InitStatus::EyeTrackerFailed => f.write_str("failed to create eye tracker"),
            InitStatus::Undefined(code) => write!(f, "undefined runtime error (code {})", code),
        }
    }
}
