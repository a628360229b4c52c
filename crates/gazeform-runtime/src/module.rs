//! Tracking module - session lifecycle and polling loop around the engine

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use gazeform_calibrate::{
    CalibrationEngine, CalibrationTables, CycleOutcome, FrameSink, FrameSource, InitStatus,
};
use gazeform_core::Capabilities;
use tracing::{error, info, warn};

use crate::{ModuleConfig, RuntimeResult};

#[derive(Clone, Debug, Default)]
pub struct RuntimeStats {
    pub ticks: u64,
    pub updates: u64,
    pub skips: u64,
    pub last_tick_duration: Duration,
}

/// A frame source and sink driven by one calibration engine
pub struct TrackingModule<S, K> {
    config: ModuleConfig,
    source: S,
    sink: K,
    engine: CalibrationEngine,
    /// Init result of the current session, `None` before `initialize`
    status: Option<InitStatus>,
    stats: RuntimeStats,
}

impl<S: FrameSource, K: FrameSink> TrackingModule<S, K> {
    /// Create a module with the standard tables for `config.calibration`
    pub fn new(config: ModuleConfig, source: S, sink: K) -> RuntimeResult<Self> {
        let tables = CalibrationTables::standard(&config.calibration)?;
        Self::with_tables(config, Arc::new(tables), source, sink)
    }

    /// Create a module over prebuilt tables, shareable between modules.
    /// The tables must agree with `config.calibration`.
    pub fn with_tables(
        config: ModuleConfig,
        tables: Arc<CalibrationTables>,
        source: S,
        sink: K,
    ) -> RuntimeResult<Self> {
        let engine = CalibrationEngine::new(tables, config.calibration)?;
        Ok(TrackingModule {
            config,
            source,
            sink,
            engine,
            status: None,
            stats: RuntimeStats::default(),
        })
    }

    /// Bring the source up and open an engine session with whatever came up.
    /// Returns the capabilities the host should advertise.
    pub fn initialize(&mut self) -> Capabilities {
        let status = self.source.initialize();
        report_status(&self.config.name, &status);

        let capabilities = status.capabilities();
        self.status = Some(status);
        if capabilities.any() {
            self.engine.start_session(capabilities);
        }
        capabilities
    }

    /// One calibration cycle, no pause. For hosts that own the schedule.
    pub fn update_once(&mut self) -> CycleOutcome {
        let start = Instant::now();
        self.stats.ticks += 1;

        let outcome = self.engine.cycle(&mut self.source, &mut self.sink);
        match outcome {
            CycleOutcome::Updated(_) => self.stats.updates += 1,
            CycleOutcome::Skipped => self.stats.skips += 1,
            CycleOutcome::NotStarted => {}
        }

        self.stats.last_tick_duration = start.elapsed();
        outcome
    }

    /// One calibration cycle followed by the configured tick pause
    pub fn update(&mut self) -> CycleOutcome {
        let outcome = self.update_once();
        thread::sleep(self.config.tick_interval);
        outcome
    }

    /// Keep updating until `stop` returns true. Checked before each update.
    pub fn run_until(&mut self, mut stop: impl FnMut(&Self) -> bool) {
        while !stop(self) {
            self.update();
        }
    }

    /// End the engine session and release the source. Safe to call twice.
    pub fn teardown(&mut self) {
        if self.status.take().is_none() {
            return;
        }
        self.engine.end_session();
        self.source.teardown();
        info!(module = %self.config.name, "tracking module torn down");
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    pub fn engine(&self) -> &CalibrationEngine {
        &self.engine
    }

    pub fn status(&self) -> Option<InitStatus> {
        self.status
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Tear down and hand back the source and sink
    pub fn into_parts(mut self) -> (S, K) {
        self.teardown();
        (self.source, self.sink)
    }
}

fn report_status(module: &str, status: &InitStatus) {
    let capabilities = status.capabilities();
    match status {
        InitStatus::Ready => info!(module, "{}", status),
        InitStatus::EyeUnsupported | InitStatus::FaceUnsupported => warn!(
            module,
            eye = capabilities.eye,
            expression = capabilities.expression,
            "{}",
            status
        ),
        _ => match status.remedy() {
            Some(remedy) => error!(
                module,
                eye = capabilities.eye,
                expression = capabilities.expression,
                "{}: {}",
                status,
                remedy
            ),
            None => error!(
                module,
                eye = capabilities.eye,
                expression = capabilities.expression,
                "{}",
                status
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuntimeError;
    use gazeform_calibrate::{MouthClosedBlend, SharedFrame};
    use gazeform_core::{ChannelId, ExpressionId, GazeformError, Generation, RawFrame};

    struct CountingSource {
        code: i32,
        frames_left: usize,
        initialized: usize,
        torn_down: usize,
    }

    impl CountingSource {
        fn new(code: i32, frames: usize) -> Self {
            CountingSource {
                code,
                frames_left: frames,
                initialized: 0,
                torn_down: 0,
            }
        }
    }

    impl FrameSource for CountingSource {
        fn initialize(&mut self) -> InitStatus {
            self.initialized += 1;
            InitStatus::from_code(self.code)
        }

        fn acquire(&mut self) -> Option<RawFrame> {
            if self.frames_left == 0 {
                return None;
            }
            self.frames_left -= 1;
            Some(RawFrame::neutral().with_weight(ChannelId::JAW_DROP, 0.5))
        }

        fn capabilities(&self) -> Capabilities {
            InitStatus::from_code(self.code).capabilities()
        }

        fn teardown(&mut self) {
            self.torn_down += 1;
        }
    }

    fn module(code: i32, frames: usize) -> TrackingModule<CountingSource, SharedFrame> {
        TrackingModule::new(
            ModuleConfig::default(),
            CountingSource::new(code, frames),
            SharedFrame::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_ready_module_updates() {
        let mut module = module(0, 1);
        assert_eq!(module.initialize(), Capabilities::ALL);

        assert_eq!(module.update_once(), CycleOutcome::Updated(Generation(1)));
        assert_eq!(module.update_once(), CycleOutcome::Skipped);

        let frame = module.sink().snapshot();
        assert_eq!(frame.weight(ExpressionId::JawOpen), 0.5);
        assert_eq!(module.stats().ticks, 2);
        assert_eq!(module.stats().updates, 1);
        assert_eq!(module.stats().skips, 1);
    }

    #[test]
    fn test_tables_must_match_calibration_config() {
        let capped = gazeform_calibrate::CalibrationConfig {
            mouth_closed: MouthClosedBlend::LipsTowardCappedByJaw,
            ..Default::default()
        };
        let tables = Arc::new(CalibrationTables::standard(&capped).unwrap());

        let result = TrackingModule::with_tables(
            ModuleConfig::default(),
            tables.clone(),
            CountingSource::new(0, 1),
            SharedFrame::new(),
        );
        assert!(matches!(
            result,
            Err(RuntimeError::Calibration(GazeformError::StrategyMismatch(
                ExpressionId::MouthClosed
            )))
        ));

        let config = ModuleConfig {
            calibration: capped,
            ..Default::default()
        };
        let module =
            TrackingModule::with_tables(config, tables, CountingSource::new(0, 1), SharedFrame::new())
                .unwrap();
        assert_eq!(
            module.engine().config().mouth_closed,
            MouthClosedBlend::LipsTowardCappedByJaw
        );
    }

    #[test]
    fn test_update_before_initialize_writes_nothing() {
        let mut module = module(0, 1);
        assert_eq!(module.update_once(), CycleOutcome::NotStarted);
        assert_eq!(module.sink().generation(), Generation::ZERO);
        assert_eq!(module.source().frames_left, 1);
    }

    #[test]
    fn test_failed_init_never_starts_engine() {
        let mut module = module(6, 3);
        assert_eq!(module.initialize(), Capabilities::NONE);
        assert_eq!(module.status(), Some(InitStatus::SessionCreateFailed));
        assert_eq!(module.update_once(), CycleOutcome::NotStarted);
        assert!(!module.engine().in_session());
    }

    #[test]
    fn test_partial_init_limits_capabilities() {
        let mut module = module(-1, 1);
        assert_eq!(module.initialize(), Capabilities::new(false, true));
        module.update_once();

        let frame = module.sink().snapshot();
        assert_eq!(frame.weight(ExpressionId::JawOpen), 0.5);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut module = module(0, 0);
        module.initialize();
        module.teardown();
        module.teardown();

        assert_eq!(module.source().torn_down, 1);
        assert_eq!(module.status(), None);
        assert_eq!(module.update_once(), CycleOutcome::NotStarted);
    }

    #[test]
    fn test_teardown_without_initialize() {
        let mut module = module(0, 0);
        module.teardown();
        assert_eq!(module.source().torn_down, 0);
    }

    #[test]
    fn test_reinitialize_after_teardown() {
        let mut module = module(0, 2);
        module.initialize();
        module.update_once();
        module.teardown();

        module.initialize();
        assert_eq!(module.update_once(), CycleOutcome::Updated(Generation(2)));
        assert_eq!(module.source().initialized, 2);
    }

    #[test]
    fn test_run_until_sleeps_per_tick() {
        let mut config = ModuleConfig::default();
        config.tick_interval = Duration::from_millis(1);
        let mut module =
            TrackingModule::new(config, CountingSource::new(0, 5), SharedFrame::new()).unwrap();
        module.initialize();

        let start = Instant::now();
        module.run_until(|m| m.stats().ticks >= 3);

        assert_eq!(module.stats().ticks, 3);
        assert!(start.elapsed() >= Duration::from_millis(3));
    }

    #[test]
    fn test_into_parts_tears_down() {
        let mut module = module(0, 0);
        module.initialize();
        let (source, _sink) = module.into_parts();
        assert_eq!(source.torn_down, 1);
    }
}
