//! Calibration engine - one raw frame in, one unified frame out
//!
//! Each cycle follows a fixed order:
//! 1. Acquire a raw frame (skip the cycle if there is none)
//! 2. Resolve the capabilities active for this cycle
//! 3. Eye set: openness, gaze, pupil placeholders, upper-face table
//! 4. Expression set: lower-face table with its corrections
//! 5. Commit the staged frame and publish it
//!
//! All writes go to a staged copy, so the committed frame only ever changes
//! as a whole.

use std::sync::Arc;

use gazeform_core::{
    Capabilities, ChannelId, ExpressionId, Eye, GazeformError, GazeformResult, Generation,
    RawFrame, UnifiedFrame, MAX_DILATION, MIN_DILATION, PUPIL_DIAMETER_MM,
};
use tracing::{debug, info, trace};

use crate::derive::{
    eyelid_openness, eyelid_openness_cheek_gated, eyelid_openness_damped, finite_or_zero,
};
use crate::gaze::gaze_from_quaternion;
use crate::{CalibrationConfig, CalibrationTables, FrameSink, FrameSource, OpennessBlend};

/// Engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No frame acquired yet in this session
    Idle,
    /// Steady-state polling
    Running,
}

/// What a single cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No session; nothing was read or written
    NotStarted,
    /// No frame this cycle; the previous unified frame stands
    Skipped,
    /// A new frame was committed
    Updated(Generation),
}

impl CycleOutcome {
    pub fn is_update(&self) -> bool {
        matches!(self, CycleOutcome::Updated(_))
    }
}

/// Engine counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub cycles: u64,
    pub updated: u64,
    pub skipped: u64,
    pub not_ready: u64,
}

/// The calibration engine
pub struct CalibrationEngine {
    tables: Arc<CalibrationTables>,
    config: CalibrationConfig,
    state: EngineState,
    /// Capabilities granted at session start, `None` outside a session
    session: Option<Capabilities>,
    frame: UnifiedFrame,
    stats: EngineStats,
}

impl CalibrationEngine {
    /// Fails when `tables` bake in a mouth-closed formulation other than the
    /// one `config` selects
    pub fn new(tables: Arc<CalibrationTables>, config: CalibrationConfig) -> GazeformResult<Self> {
        if let Some(built) = tables.mouth_closed() {
            if built != config.mouth_closed {
                return Err(GazeformError::StrategyMismatch(ExpressionId::MouthClosed));
            }
        }
        Ok(CalibrationEngine {
            tables,
            config,
            state: EngineState::Idle,
            session: None,
            frame: UnifiedFrame::new(),
            stats: EngineStats::default(),
        })
    }

    /// Open the operating window with the capabilities the source came up with
    pub fn start_session(&mut self, capabilities: Capabilities) {
        info!(
            eye = capabilities.eye,
            expression = capabilities.expression,
            "calibration session started"
        );
        self.session = Some(capabilities);
        self.state = EngineState::Idle;
    }

    /// Close the operating window. The last frame is kept.
    pub fn end_session(&mut self) {
        if self.session.take().is_some() {
            info!(generation = self.frame.generation.value(), "calibration session ended");
        }
        self.state = EngineState::Idle;
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn in_session(&self) -> bool {
        self.session.is_some()
    }

    /// Last committed frame
    pub fn frame(&self) -> &UnifiedFrame {
        &self.frame
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    pub fn tables(&self) -> &CalibrationTables {
        &self.tables
    }

    /// Run one cycle against `source`, publishing to `sink` on update
    pub fn cycle<S, K>(&mut self, source: &mut S, sink: &mut K) -> CycleOutcome
    where
        S: FrameSource + ?Sized,
        K: FrameSink + ?Sized,
    {
        self.stats.cycles += 1;

        let Some(granted) = self.session else {
            self.stats.not_ready += 1;
            return CycleOutcome::NotStarted;
        };

        let Some(raw) = source.acquire() else {
            self.stats.skipped += 1;
            debug!(state = ?self.state, "no raw frame this cycle");
            return CycleOutcome::Skipped;
        };

        let active = source.capabilities().intersect(granted);
        let staged = self.calibrate(&raw, active);
        self.frame = staged;
        sink.publish(&self.frame);

        if self.state == EngineState::Idle {
            info!("first raw frame acquired, engine running");
            self.state = EngineState::Running;
        }
        self.stats.updated += 1;
        trace!(generation = self.frame.generation.value(), "frame committed");

        CycleOutcome::Updated(self.frame.generation)
    }

    /// Compute the next frame from the current one. Slots outside the
    /// active capability sets keep their previous values.
    fn calibrate(&self, raw: &RawFrame, active: Capabilities) -> UnifiedFrame {
        let mut next = self.frame;

        if active.eye {
            for eye in Eye::BOTH {
                let state = next.eye_mut(eye);
                state.openness = self.openness(raw, eye);
                state.gaze = gaze_from_quaternion(&raw.orientation(eye), self.config.gaze);
                state.pupil_diameter_mm = PUPIL_DIAMETER_MM;
            }
            next.min_dilation = MIN_DILATION;
            next.max_dilation = MAX_DILATION;
            self.tables.eye().apply(raw, &mut next);
        }

        if active.expression {
            self.tables.face().apply(raw, &mut next);
        }

        next.generation = next.generation.next();
        next.timestamp = raw.timestamp;
        next
    }

    fn openness(&self, raw: &RawFrame, eye: Eye) -> f32 {
        let registry = self.tables.registry();
        let (closed, tightener, cheek) = eyelid_channels(eye);
        let closed = finite_or_zero(registry.lookup(raw, closed));
        let tightener = finite_or_zero(registry.lookup(raw, tightener));

        match self.config.openness {
            OpennessBlend::ClosedTightenerProduct => eyelid_openness(closed, tightener),
            OpennessBlend::CheekTightenerProduct => {
                let cheek = finite_or_zero(registry.lookup(raw, cheek));
                eyelid_openness_cheek_gated(closed, cheek, tightener)
            }
            OpennessBlend::DampedTightener => eyelid_openness_damped(closed, tightener),
        }
    }
}

/// (eyes closed, lid tightener, cheek raiser) for one side
fn eyelid_channels(eye: Eye) -> (ChannelId, ChannelId, ChannelId) {
    match eye {
        Eye::Left => (
            ChannelId::EYES_CLOSED_L,
            ChannelId::LID_TIGHTENER_L,
            ChannelId::CHEEK_RAISER_L,
        ),
        Eye::Right => (
            ChannelId::EYES_CLOSED_R,
            ChannelId::LID_TIGHTENER_R,
            ChannelId::CHEEK_RAISER_R,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GazeMode, InitStatus, MouthClosedBlend, NullSink, SharedFrame};
    use gazeform_core::{ExpressionId, FrameTime, GazeAngles, Quaternion};
    use std::collections::VecDeque;

    /// Plays back a fixed queue; `None` entries are empty polls
    struct QueueSource {
        frames: VecDeque<Option<RawFrame>>,
        capabilities: Capabilities,
        polls: usize,
    }

    impl QueueSource {
        fn new(frames: Vec<Option<RawFrame>>) -> Self {
            QueueSource {
                frames: frames.into(),
                capabilities: Capabilities::ALL,
                polls: 0,
            }
        }
    }

    impl FrameSource for QueueSource {
        fn initialize(&mut self) -> InitStatus {
            InitStatus::Ready
        }

        fn acquire(&mut self) -> Option<RawFrame> {
            self.polls += 1;
            self.frames.pop_front().flatten()
        }

        fn capabilities(&self) -> Capabilities {
            self.capabilities
        }

        fn teardown(&mut self) {}
    }

    fn engine(config: CalibrationConfig) -> CalibrationEngine {
        let tables = CalibrationTables::standard(&config).unwrap();
        CalibrationEngine::new(Arc::new(tables), config).unwrap()
    }

    fn bits(frame: &UnifiedFrame) -> Vec<u32> {
        let mut out: Vec<u32> = frame.weights().iter().map(|w| w.to_bits()).collect();
        for eye in frame.eyes.iter() {
            out.extend([
                eye.gaze.pitch.to_bits(),
                eye.gaze.yaw.to_bits(),
                eye.openness.to_bits(),
                eye.pupil_diameter_mm.to_bits(),
            ]);
        }
        out.extend([frame.min_dilation.to_bits(), frame.max_dilation.to_bits()]);
        out
    }

    #[test]
    fn test_neutral_frame_end_to_end() {
        let mut engine = engine(CalibrationConfig::default());
        let mut source = QueueSource::new(vec![Some(RawFrame::neutral())]);
        let mut sink = SharedFrame::new();

        engine.start_session(Capabilities::ALL);
        let outcome = engine.cycle(&mut source, &mut sink);
        assert_eq!(outcome, CycleOutcome::Updated(Generation(1)));

        let frame = sink.snapshot();
        assert!(frame.weights().iter().all(|w| *w == 0.0));
        for eye in Eye::BOTH {
            let state = frame.eye(eye);
            assert_eq!(state.gaze, GazeAngles::FORWARD);
            assert_eq!(state.openness, 1.0);
            assert_eq!(state.pupil_diameter_mm, 5.0);
        }
        assert_eq!(frame.min_dilation, 0.0);
        assert_eq!(frame.max_dilation, 10.0);
    }

    #[test]
    fn test_skip_leaves_frame_bit_identical() {
        let mut engine = engine(CalibrationConfig::default());
        let raw = RawFrame::neutral()
            .with_weight(ChannelId::JAW_DROP, 0.3)
            .with_weight(ChannelId::EYES_CLOSED_L, 0.4)
            .with_eye(Eye::Right, Quaternion::from_axis_angle([1.0, 0.0, 0.0], 0.3));
        let mut source = QueueSource::new(vec![Some(raw), None]);
        let mut sink = SharedFrame::new();

        engine.start_session(Capabilities::ALL);
        engine.cycle(&mut source, &mut sink);
        let before = bits(engine.frame());
        let published = sink.snapshot();

        assert_eq!(engine.cycle(&mut source, &mut sink), CycleOutcome::Skipped);
        assert_eq!(bits(engine.frame()), before);
        assert_eq!(engine.frame().generation, Generation(1));
        assert_eq!(sink.snapshot(), published);
        assert_eq!(engine.state(), EngineState::Running);
    }

    #[test]
    fn test_no_reads_or_writes_before_session() {
        let mut engine = engine(CalibrationConfig::default());
        let mut source =
            QueueSource::new(vec![Some(RawFrame::neutral().with_weight(ChannelId::JAW_DROP, 1.0))]);
        let mut sink = SharedFrame::new();

        assert_eq!(engine.cycle(&mut source, &mut sink), CycleOutcome::NotStarted);
        assert_eq!(source.polls, 0);
        assert_eq!(sink.generation(), Generation::ZERO);
        assert_eq!(*engine.frame(), UnifiedFrame::new());
        assert_eq!(engine.stats().not_ready, 1);
    }

    #[test]
    fn test_stays_idle_until_first_frame() {
        let mut engine = engine(CalibrationConfig::default());
        let mut source = QueueSource::new(vec![None, None, Some(RawFrame::neutral())]);

        engine.start_session(Capabilities::ALL);
        engine.cycle(&mut source, &mut NullSink);
        engine.cycle(&mut source, &mut NullSink);
        assert_eq!(engine.state(), EngineState::Idle);

        engine.cycle(&mut source, &mut NullSink);
        assert_eq!(engine.state(), EngineState::Running);

        let stats = engine.stats();
        assert_eq!(stats.cycles, 3);
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.updated, 1);
    }

    #[test]
    fn test_end_session_keeps_frame() {
        let mut engine = engine(CalibrationConfig::default());
        let raw = RawFrame::neutral().with_weight(ChannelId::JAW_DROP, 0.6);
        let mut source = QueueSource::new(vec![Some(raw), Some(RawFrame::neutral())]);

        engine.start_session(Capabilities::ALL);
        engine.cycle(&mut source, &mut NullSink);
        engine.end_session();

        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.cycle(&mut source, &mut NullSink), CycleOutcome::NotStarted);
        assert_eq!(engine.frame().weight(ExpressionId::JawOpen), 0.6);
    }

    #[test]
    fn test_eye_only_session_leaves_face_slots() {
        let mut engine = engine(CalibrationConfig::default());
        let raw = RawFrame::neutral()
            .with_weight(ChannelId::JAW_DROP, 0.9)
            .with_weight(ChannelId::UPPER_LID_RAISER_L, 0.7)
            .with_weight(ChannelId::EYES_CLOSED_R, 0.5);
        let mut source = QueueSource::new(vec![Some(raw)]);

        engine.start_session(Capabilities::new(true, false));
        engine.cycle(&mut source, &mut NullSink);

        let frame = engine.frame();
        assert_eq!(frame.weight(ExpressionId::JawOpen), 0.0);
        assert_eq!(frame.weight(ExpressionId::EyeWideLeft), 0.7);
        assert!((frame.eye(Eye::Right).openness - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_face_only_session_leaves_eye_state() {
        let mut engine = engine(CalibrationConfig::default());
        let raw = RawFrame::neutral()
            .with_weight(ChannelId::JAW_DROP, 0.9)
            .with_weight(ChannelId::EYES_CLOSED_L, 1.0)
            .with_weight(ChannelId::UPPER_LID_RAISER_L, 0.7)
            .with_eye(Eye::Left, Quaternion::from_axis_angle([0.0, 1.0, 0.0], 0.4));
        let mut source = QueueSource::new(vec![Some(raw)]);

        engine.start_session(Capabilities::new(false, true));
        engine.cycle(&mut source, &mut NullSink);

        let frame = engine.frame();
        assert_eq!(frame.weight(ExpressionId::JawOpen), 0.9);
        assert_eq!(frame.weight(ExpressionId::EyeWideLeft), 0.0);
        assert_eq!(frame.eye(Eye::Left).openness, 1.0);
        assert_eq!(frame.eye(Eye::Left).gaze, GazeAngles::FORWARD);
    }

    #[test]
    fn test_capabilities_revised_per_cycle() {
        let mut engine = engine(CalibrationConfig::default());
        let first = RawFrame::neutral().with_weight(ChannelId::JAW_DROP, 0.2);
        let second = RawFrame::neutral().with_weight(ChannelId::JAW_DROP, 0.8);
        let mut source = QueueSource::new(vec![Some(first), Some(second)]);

        engine.start_session(Capabilities::ALL);
        engine.cycle(&mut source, &mut NullSink);

        source.capabilities = Capabilities::new(true, false);
        engine.cycle(&mut source, &mut NullSink);

        assert_eq!(engine.frame().weight(ExpressionId::JawOpen), 0.2);
        assert_eq!(engine.frame().generation, Generation(2));
    }

    #[test]
    fn test_source_cannot_widen_session() {
        let mut engine = engine(CalibrationConfig::default());
        let raw = RawFrame::neutral().with_weight(ChannelId::JAW_DROP, 0.5);
        let mut source = QueueSource::new(vec![Some(raw)]);

        engine.start_session(Capabilities::new(true, false));
        engine.cycle(&mut source, &mut NullSink);

        assert_eq!(engine.frame().weight(ExpressionId::JawOpen), 0.0);
    }

    #[test]
    fn test_each_eye_uses_its_own_orientation() {
        let mut engine = engine(CalibrationConfig::default());
        let raw = RawFrame::neutral()
            .with_eye(Eye::Right, Quaternion::from_axis_angle([1.0, 0.0, 0.0], 0.2));
        let mut source = QueueSource::new(vec![Some(raw)]);

        engine.start_session(Capabilities::ALL);
        engine.cycle(&mut source, &mut NullSink);

        assert_eq!(engine.frame().eye(Eye::Left).gaze, GazeAngles::FORWARD);
        assert!(engine.frame().eye(Eye::Right).gaze.yaw > 0.0);
    }

    #[test]
    fn test_generation_and_timestamp() {
        let mut engine = engine(CalibrationConfig::default());
        let mut source = QueueSource::new(vec![
            Some(RawFrame::neutral().with_timestamp(FrameTime::from_millis(5))),
            None,
            Some(RawFrame::neutral().with_timestamp(FrameTime::from_millis(25))),
        ]);

        engine.start_session(Capabilities::ALL);
        let outcomes: Vec<_> = (0..3)
            .map(|_| engine.cycle(&mut source, &mut NullSink))
            .collect();

        assert_eq!(
            outcomes,
            vec![
                CycleOutcome::Updated(Generation(1)),
                CycleOutcome::Skipped,
                CycleOutcome::Updated(Generation(2)),
            ]
        );
        assert_eq!(engine.frame().timestamp, FrameTime::from_millis(25));
    }

    #[test]
    fn test_non_finite_inputs_do_not_leak() {
        let mut engine = engine(CalibrationConfig::default());
        let raw = RawFrame::neutral()
            .with_weight(ChannelId::JAW_DROP, f32::NAN)
            .with_weight(ChannelId::EYES_CLOSED_L, f32::INFINITY)
            .with_weight(ChannelId::UPPER_LIP_RAISER_L, f32::NAN)
            .with_eye(Eye::Left, Quaternion::new(f32::NAN, 0.0, 0.0, 1.0));
        let mut source = QueueSource::new(vec![Some(raw)]);

        engine.start_session(Capabilities::ALL);
        engine.cycle(&mut source, &mut NullSink);

        let frame = engine.frame();
        assert!(frame.weights().iter().all(|w| w.is_finite()));
        assert_eq!(frame.weight(ExpressionId::JawOpen), 0.0);
        assert_eq!(frame.eye(Eye::Left).openness, 1.0);
        assert_eq!(frame.eye(Eye::Left).gaze, GazeAngles::FORWARD);
    }

    #[test]
    fn test_engine_rejects_tables_built_for_other_mouth_closed() {
        let capped = CalibrationConfig {
            mouth_closed: MouthClosedBlend::LipsTowardCappedByJaw,
            ..Default::default()
        };
        let tables = Arc::new(CalibrationTables::standard(&capped).unwrap());

        let result = CalibrationEngine::new(tables.clone(), CalibrationConfig::default());
        assert_eq!(
            result.err(),
            Some(GazeformError::StrategyMismatch(ExpressionId::MouthClosed))
        );

        let engine = CalibrationEngine::new(tables, capped).unwrap();
        assert_eq!(engine.config().mouth_closed, MouthClosedBlend::LipsTowardCappedByJaw);
    }

    #[test]
    fn test_confidences_do_not_change_output() {
        let raw = RawFrame::neutral()
            .with_weight(ChannelId::JAW_DROP, 0.6)
            .with_weight(ChannelId::EYES_CLOSED_R, 0.3);
        let mut confident = engine(CalibrationConfig::default());
        let mut doubtful = engine(CalibrationConfig::default());
        let mut a = QueueSource::new(vec![Some(raw)]);
        let mut b = QueueSource::new(vec![Some(raw.with_confidences(0.0, 0.1))]);

        confident.start_session(Capabilities::ALL);
        doubtful.start_session(Capabilities::ALL);
        confident.cycle(&mut a, &mut NullSink);
        doubtful.cycle(&mut b, &mut NullSink);

        assert_eq!(bits(confident.frame()), bits(doubtful.frame()));
    }

    #[test]
    fn test_openness_strategies() {
        let raw = RawFrame::neutral()
            .with_weight(ChannelId::EYES_CLOSED_L, 0.4)
            .with_weight(ChannelId::LID_TIGHTENER_L, 1.0)
            .with_weight(ChannelId::CHEEK_RAISER_L, 0.3);

        // Full tightener: damping halves it (2 / 2^2), so each strategy lands apart
        let expected = [
            (OpennessBlend::ClosedTightenerProduct, 1.0 - (0.4 + 0.4 * 1.0)),
            (OpennessBlend::CheekTightenerProduct, 1.0 - (0.4 + 0.3 * 1.0)),
            (OpennessBlend::DampedTightener, 1.0 - (0.4 + 0.4 * 0.5)),
        ];
        for (openness, value) in expected {
            let mut engine = engine(CalibrationConfig {
                openness,
                ..Default::default()
            });
            let mut source = QueueSource::new(vec![Some(raw)]);
            engine.start_session(Capabilities::ALL);
            engine.cycle(&mut source, &mut NullSink);

            let got = engine.frame().eye(Eye::Left).openness;
            assert!((got - value).abs() < 1e-6, "{:?}: {} != {}", openness, got, value);
        }
    }

    #[test]
    fn test_linear_gaze_mode() {
        let q = Quaternion::new(0.1, 0.2, 0.0, 1.0);
        let mut engine = engine(CalibrationConfig {
            gaze: GazeMode::Linear,
            ..Default::default()
        });
        let mut source = QueueSource::new(vec![Some(RawFrame::neutral().with_eye(Eye::Left, q))]);

        engine.start_session(Capabilities::ALL);
        engine.cycle(&mut source, &mut NullSink);

        let n = q.normalized().unwrap();
        let gaze = engine.frame().eye(Eye::Left).gaze;
        assert!((gaze.pitch - n.y * std::f32::consts::FRAC_2_PI).abs() < 1e-6);
        assert!((gaze.yaw - n.x * std::f32::consts::FRAC_2_PI).abs() < 1e-6);
    }
}
