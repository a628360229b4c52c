//! Scripted collaborators - a frame source that plays back a fixed script
//! and a sink that records everything published to it

use std::collections::VecDeque;

use gazeform_calibrate::{FrameSink, FrameSource, InitStatus};
use gazeform_core::{Capabilities, RawFrame, UnifiedFrame};

/// One poll's worth of script
#[derive(Clone, Debug)]
pub enum ScriptStep {
    /// `acquire` returns this frame
    Frame(RawFrame),
    /// `acquire` returns nothing
    Gap,
    /// Capabilities change, then `acquire` returns this frame
    Revise(Capabilities, RawFrame),
}

/// Frame source driven by a script. An exhausted script reads as gaps.
#[derive(Clone, Debug)]
pub struct ScriptedSource {
    init_code: i32,
    steps: VecDeque<ScriptStep>,
    capabilities: Capabilities,
    pub polls: usize,
    pub initializations: usize,
    pub teardowns: usize,
}

impl ScriptedSource {
    /// Source that initializes with native code `0` (both trackers)
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self::with_init_code(0, steps)
    }

    pub fn with_init_code(init_code: i32, steps: Vec<ScriptStep>) -> Self {
        ScriptedSource {
            init_code,
            steps: steps.into(),
            capabilities: Capabilities::NONE,
            polls: 0,
            initializations: 0,
            teardowns: 0,
        }
    }

    /// Every frame in order, no gaps
    pub fn from_frames(frames: impl IntoIterator<Item = RawFrame>) -> Self {
        Self::new(frames.into_iter().map(ScriptStep::Frame).collect())
    }

    /// Append more steps
    pub fn push(&mut self, step: ScriptStep) {
        self.steps.push_back(step);
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl FrameSource for ScriptedSource {
    fn initialize(&mut self) -> InitStatus {
        self.initializations += 1;
        let status = InitStatus::from_code(self.init_code);
        self.capabilities = status.capabilities();
        status
    }

    fn acquire(&mut self) -> Option<RawFrame> {
        self.polls += 1;
        match self.steps.pop_front()? {
            ScriptStep::Frame(frame) => Some(frame),
            ScriptStep::Gap => None,
            ScriptStep::Revise(capabilities, frame) => {
                self.capabilities = capabilities;
                Some(frame)
            }
        }
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn teardown(&mut self) {
        self.teardowns += 1;
        self.capabilities = Capabilities::NONE;
    }
}

/// Sink that keeps every published frame
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    frames: Vec<UnifiedFrame>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[UnifiedFrame] {
        &self.frames
    }

    pub fn last(&self) -> Option<&UnifiedFrame> {
        self.frames.last()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSink for RecordingSink {
    fn publish(&mut self, frame: &UnifiedFrame) {
        self.frames.push(*frame);
    }
}
