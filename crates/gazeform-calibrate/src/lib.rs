//! gazeform Calibrate - Expression normalization and gaze calibration
//!
//! Turns a vendor tracking frame into the unified expression/gaze frame:
//! - Declarative mapping tables, validated once at construction
//! - Composite derivations (eyelid openness, lip cross-talk corrections)
//! - Quaternion to (pitch, yaw) gaze with tail-curve calibration
//! - The per-cycle engine between a `FrameSource` and a `FrameSink`

pub mod config;
pub mod derive;
pub mod engine;
pub mod gaze;
pub mod mapping;
pub mod sink;
pub mod source;
pub mod tables;

pub use config::*;
pub use engine::*;
pub use gaze::{gaze_from_quaternion, GazeMode, TailCurve};
pub use mapping::*;
pub use sink::*;
pub use source::*;
pub use tables::{standard_eye_entries, standard_face_entries};
