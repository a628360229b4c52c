//! gazeform Core - Fundamental types for tracking calibration
//!
//! This crate defines the vocabulary shared by every other gazeform crate:
//! - Raw channel identifiers and the channel registry
//! - Canonical expression identifiers
//! - Raw and unified frame value types
//! - Frame timestamps and generation counters
//! - The configuration-defect error taxonomy

pub mod channel;
pub mod error;
pub mod expression;
pub mod frame;
pub mod time;

pub use channel::*;
pub use error::*;
pub use expression::*;
pub use frame::*;
pub use time::*;
