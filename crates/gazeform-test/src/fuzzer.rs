//! Frame Fuzzer - randomized raw frames against the calibration engine
//!
//! Checks, for every cycle:
//! - Expression weights finite and within [0, 1]
//! - Gaze finite, openness within [0, 1], pupil placeholders intact
//! - Generation advances by exactly one per update
//! - A skipped cycle leaves the frame bit-identical

use std::sync::Arc;

use gazeform_calibrate::{
    CalibrationConfig, CalibrationEngine, CalibrationTables, CycleOutcome, FrameSource,
};
use gazeform_core::{
    Capabilities, Eye, FrameTime, Quaternion, RawFrame, UnifiedFrame, FACE_CHANNEL_COUNT,
    MAX_DILATION, MIN_DILATION, PUPIL_DIAMETER_MM,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{RecordingSink, ScriptStep, ScriptedSource};

/// Fuzzer configuration
#[derive(Clone, Debug)]
pub struct FuzzerConfig {
    /// Cycles to run
    pub frame_count: usize,
    /// Probability that a poll returns nothing
    pub gap_prob: f64,
    /// Probability that a channel falls outside [0, 1]
    pub out_of_range_prob: f64,
    /// Probability that a channel is NaN or infinite
    pub non_finite_prob: f64,
    /// Probability that an eye quaternion is degenerate
    pub degenerate_eye_prob: f64,
    /// Probability that the source revises its capabilities
    pub capability_flip_prob: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        FuzzerConfig {
            frame_count: 1000,
            gap_prob: 0.1,
            out_of_range_prob: 0.02,
            non_finite_prob: 0.0,
            degenerate_eye_prob: 0.01,
            capability_flip_prob: 0.0,
            seed: 42,
        }
    }
}

impl FuzzerConfig {
    /// Light fuzzing for quick tests
    pub fn light() -> Self {
        FuzzerConfig {
            frame_count: 100,
            ..Default::default()
        }
    }

    /// Heavy fuzzing for thorough testing
    pub fn heavy() -> Self {
        FuzzerConfig {
            frame_count: 10_000,
            gap_prob: 0.3,
            out_of_range_prob: 0.1,
            non_finite_prob: 0.01,
            degenerate_eye_prob: 0.05,
            capability_flip_prob: 0.05,
            seed: 42,
        }
    }

    /// A driver that misbehaves on every axis
    pub fn adversarial() -> Self {
        FuzzerConfig {
            frame_count: 5000,
            gap_prob: 0.5,
            out_of_range_prob: 0.3,
            non_finite_prob: 0.1,
            degenerate_eye_prob: 0.3,
            capability_flip_prob: 0.2,
            seed: 42,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Outcome of one fuzzing run
#[derive(Clone, Debug, Default)]
pub struct FuzzResult {
    pub cycles: usize,
    pub updates: usize,
    pub skips: usize,
    pub violations: Vec<String>,
}

impl FuzzResult {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Random frame generator and invariant checker
pub struct FrameFuzzer {
    config: FuzzerConfig,
    rng: StdRng,
    clock: i64,
}

impl FrameFuzzer {
    pub fn new(config: FuzzerConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        FrameFuzzer {
            config,
            rng,
            clock: 0,
        }
    }

    /// Next random raw frame
    pub fn next_frame(&mut self) -> RawFrame {
        let weights: Vec<f32> = (0..FACE_CHANNEL_COUNT).map(|_| self.weight()).collect();
        self.clock += 11_111_111;

        let mut frame = match RawFrame::from_weights(&weights) {
            Ok(frame) => frame,
            Err(_) => RawFrame::neutral(),
        };
        for eye in Eye::BOTH {
            let orientation = self.orientation();
            frame = frame.with_eye(eye, orientation);
        }
        // Confidences are advisory; any value must leave the output unaffected
        let (lower, upper) = (self.rng.gen::<f32>(), self.rng.gen::<f32>());
        frame
            .with_confidences(lower, upper)
            .with_timestamp(FrameTime::from_nanos(self.clock))
    }

    /// A whole script of `frame_count` steps
    pub fn script(&mut self) -> Vec<ScriptStep> {
        (0..self.config.frame_count).map(|_| self.step()).collect()
    }

    /// Run a full engine session over a fresh script
    pub fn run(&mut self, calibration: CalibrationConfig) -> FuzzResult {
        let mut result = FuzzResult::default();
        let tables = match CalibrationTables::standard(&calibration) {
            Ok(tables) => tables,
            Err(e) => {
                result.violations.push(format!("standard tables rejected: {}", e));
                return result;
            }
        };

        let mut engine = match CalibrationEngine::new(Arc::new(tables), calibration) {
            Ok(engine) => engine,
            Err(e) => {
                result.violations.push(format!("engine rejected tables: {}", e));
                return result;
            }
        };
        let mut source = ScriptedSource::new(self.script());
        let mut sink = RecordingSink::new();

        engine.start_session(source.initialize().capabilities());

        for cycle in 0..self.config.frame_count {
            let before = *engine.frame();
            let outcome = engine.cycle(&mut source, &mut sink);
            result.cycles += 1;

            match outcome {
                CycleOutcome::Updated(generation) => {
                    result.updates += 1;
                    if generation != before.generation.next() {
                        result.violations.push(format!(
                            "cycle {}: generation jumped from {:?} to {:?}",
                            cycle, before.generation, generation
                        ));
                    }
                    check_frame(cycle, engine.frame(), &mut result.violations);
                }
                CycleOutcome::Skipped => {
                    result.skips += 1;
                    if !same_bits(&before, engine.frame()) {
                        result
                            .violations
                            .push(format!("cycle {}: skipped cycle changed the frame", cycle));
                    }
                }
                CycleOutcome::NotStarted => {
                    result
                        .violations
                        .push(format!("cycle {}: engine reported no session", cycle));
                }
            }
        }

        if sink.len() != result.updates {
            result.violations.push(format!(
                "{} updates but {} frames published",
                result.updates,
                sink.len()
            ));
        }

        result
    }

    fn step(&mut self) -> ScriptStep {
        if self.rng.gen_bool(self.config.gap_prob) {
            return ScriptStep::Gap;
        }
        let frame = self.next_frame();
        if self.rng.gen_bool(self.config.capability_flip_prob) {
            let capabilities = Capabilities::new(self.rng.gen(), self.rng.gen());
            ScriptStep::Revise(capabilities, frame)
        } else {
            ScriptStep::Frame(frame)
        }
    }

    fn weight(&mut self) -> f32 {
        if self.rng.gen_bool(self.config.non_finite_prob) {
            return match self.rng.gen_range(0..3) {
                0 => f32::NAN,
                1 => f32::INFINITY,
                _ => f32::NEG_INFINITY,
            };
        }
        if self.rng.gen_bool(self.config.out_of_range_prob) {
            return self.rng.gen_range(-2.0f32..3.0);
        }
        self.rng.gen_range(0.0f32..=1.0)
    }

    fn orientation(&mut self) -> Quaternion {
        if self.rng.gen_bool(self.config.degenerate_eye_prob) {
            return match self.rng.gen_range(0..3) {
                0 => Quaternion::new(0.0, 0.0, 0.0, 0.0),
                1 => Quaternion::new(1e-9, 0.0, 0.0, 1e-9),
                _ => Quaternion::new(f32::NAN, 0.0, 0.0, 1.0),
            };
        }
        let axis = [
            self.rng.gen_range(-1.0f32..1.0),
            self.rng.gen_range(-1.0f32..1.0),
            self.rng.gen_range(-1.0f32..1.0),
        ];
        let angle = self.rng.gen_range(-0.8f32..0.8);
        Quaternion::from_axis_angle(axis, angle)
    }
}

/// Bitwise equality over every output value
pub fn same_bits(a: &UnifiedFrame, b: &UnifiedFrame) -> bool {
    let weights = a
        .weights()
        .iter()
        .zip(b.weights())
        .all(|(x, y)| x.to_bits() == y.to_bits());
    let eyes = a.eyes.iter().zip(b.eyes.iter()).all(|(x, y)| {
        x.gaze.pitch.to_bits() == y.gaze.pitch.to_bits()
            && x.gaze.yaw.to_bits() == y.gaze.yaw.to_bits()
            && x.openness.to_bits() == y.openness.to_bits()
            && x.pupil_diameter_mm.to_bits() == y.pupil_diameter_mm.to_bits()
    });
    weights
        && eyes
        && a.min_dilation.to_bits() == b.min_dilation.to_bits()
        && a.max_dilation.to_bits() == b.max_dilation.to_bits()
        && a.generation == b.generation
        && a.timestamp == b.timestamp
}

/// Range checks on a committed frame
pub fn check_frame(cycle: usize, frame: &UnifiedFrame, violations: &mut Vec<String>) {
    for (slot, weight) in frame.weights().iter().enumerate() {
        if !(0.0..=1.0).contains(weight) {
            violations.push(format!("cycle {}: slot {} = {}", cycle, slot, weight));
        }
    }
    for eye in Eye::BOTH {
        let state = frame.eye(eye);
        if !state.gaze.is_finite() {
            violations.push(format!("cycle {}: {:?} gaze {:?}", cycle, eye, state.gaze));
        }
        if !(0.0..=1.0).contains(&state.openness) {
            violations.push(format!(
                "cycle {}: {:?} openness {}",
                cycle, eye, state.openness
            ));
        }
        if state.pupil_diameter_mm != PUPIL_DIAMETER_MM {
            violations.push(format!(
                "cycle {}: {:?} pupil {}",
                cycle, eye, state.pupil_diameter_mm
            ));
        }
    }
    if frame.min_dilation != MIN_DILATION || frame.max_dilation != MAX_DILATION {
        violations.push(format!(
            "cycle {}: dilation range {}..{}",
            cycle, frame.min_dilation, frame.max_dilation
        ));
    }
}
