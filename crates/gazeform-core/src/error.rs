//! Error types for gazeform
//!
//! Only configuration defects are errors. A missing frame is a skipped
//! cycle, and numerical degeneracy is repaired where it occurs.

use thiserror::Error;

use crate::{ChannelId, ExpressionId};

/// Core gazeform errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GazeformError {
    #[error("Unknown channel: index {0} is not declared in the registry")]
    UnknownChannel(usize),

    #[error("Channel {0:?} is an orientation slot, not a scalar channel")]
    NotAScalarChannel(ChannelId),

    #[error("Expression {0:?} is mapped more than once")]
    DuplicateExpression(ExpressionId),

    #[error("Expression {expression:?} expects {expected} input channel(s), got {actual}")]
    ArityMismatch {
        expression: ExpressionId,
        expected: &'static str,
        actual: usize,
    },

    #[error("Expression {0:?} is built with a different strategy than the configuration selects")]
    StrategyMismatch(ExpressionId),

    #[error("Raw frame carries {actual} face channels, expected {min}..={max}")]
    ChannelCountOutOfRange {
        actual: usize,
        min: usize,
        max: usize,
    },
}

/// Result type for gazeform operations
pub type GazeformResult<T> = Result<T, GazeformError>;
