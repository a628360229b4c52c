//! gazeform Runtime - Tracking module host glue
//!
//! Wraps a `FrameSource` and a `FrameSink` around the calibration engine:
//! 1. Initialize the native source and decode its status
//! 2. Open an engine session with the capabilities that came up
//! 3. Poll: one calibration cycle per update, then pause for one tick
//! 4. Tear the session down
//!
//! Also carries the JSON module configuration and the logger bootstrap.

pub mod config;
pub mod error;
pub mod logging;
pub mod module;

pub use config::*;
pub use error::*;
pub use logging::init_logging;
pub use module::*;
