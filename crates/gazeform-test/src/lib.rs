//! gazeform Test Harness - Engine validation
//!
//! This crate provides:
//! - Scripted frame sources and recording sinks
//! - Randomized raw frame fuzzing with invariant checks
//! - End-to-end scenarios through a full tracking module

pub mod fuzzer;
pub mod scenarios;
pub mod scripted;

pub use fuzzer::*;
pub use scenarios::*;
pub use scripted::*;
