//! Frame sink - where committed frames go
//!
//! The host reads the unified frame from other threads. A reader must see
//! either the whole previous frame or the whole next one, so publication
//! replaces the frame under a write lock in one assignment.

use std::sync::Arc;

use gazeform_core::{Generation, UnifiedFrame};
use parking_lot::RwLock;

/// Host boundary
pub trait FrameSink {
    /// Called once per committed cycle with the complete frame
    fn publish(&mut self, frame: &UnifiedFrame);
}

impl<K: FrameSink + ?Sized> FrameSink for &mut K {
    fn publish(&mut self, frame: &UnifiedFrame) {
        (**self).publish(frame)
    }
}

/// Sink that drops every frame
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn publish(&mut self, _frame: &UnifiedFrame) {}
}

/// Shared, lock-protected frame slot
#[derive(Debug, Clone, Default)]
pub struct SharedFrame {
    inner: Arc<RwLock<UnifiedFrame>>,
}

impl SharedFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the latest published frame
    pub fn snapshot(&self) -> UnifiedFrame {
        *self.inner.read()
    }

    /// Generation of the latest published frame
    pub fn generation(&self) -> Generation {
        self.inner.read().generation
    }

    /// Run `f` against the current frame without copying it
    pub fn with<R>(&self, f: impl FnOnce(&UnifiedFrame) -> R) -> R {
        f(&self.inner.read())
    }
}

impl FrameSink for SharedFrame {
    fn publish(&mut self, frame: &UnifiedFrame) {
        *self.inner.write() = *frame;
    }
}
