//! End-to-end scenarios through a full tracking module
//!
//! Each scenario drives `TrackingModule` over a scripted source and a
//! recording sink and reports every observed violation rather than
//! stopping at the first.

use gazeform_calibrate::{CycleOutcome, InitStatus};
use gazeform_core::{
    Capabilities, ChannelId, Eye, ExpressionId, GazeAngles, Quaternion, RawFrame,
    PUPIL_DIAMETER_MM,
};
use gazeform_runtime::{ModuleConfig, RuntimeResult, TrackingModule};

use crate::{same_bits, RecordingSink, ScriptStep, ScriptedSource};

/// Module type every scenario runs
pub type ScenarioModule = TrackingModule<ScriptedSource, RecordingSink>;

/// Result of one scenario
#[derive(Clone, Debug)]
pub struct ScenarioResult {
    pub name: &'static str,
    pub outcomes: Vec<CycleOutcome>,
    pub violations: Vec<String>,
}

impl ScenarioResult {
    fn new(name: &'static str) -> Self {
        ScenarioResult {
            name,
            outcomes: Vec::new(),
            violations: Vec::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    fn check(&mut self, ok: bool, what: impl Into<String>) {
        if !ok {
            self.violations.push(what.into());
        }
    }

    /// Default module over `source`; a build failure is recorded as a violation
    fn module(&mut self, source: ScriptedSource) -> Option<ScenarioModule> {
        match scenario_module(source) {
            Ok(module) => Some(module),
            Err(e) => {
                self.violations.push(format!("module failed to build: {}", e));
                None
            }
        }
    }
}

/// Build a module over `source` with the default configuration
pub fn scenario_module(source: ScriptedSource) -> RuntimeResult<ScenarioModule> {
    scenario_module_with(ModuleConfig::default(), source)
}

pub fn scenario_module_with(
    config: ModuleConfig,
    source: ScriptedSource,
) -> RuntimeResult<ScenarioModule> {
    TrackingModule::new(config, source, RecordingSink::new())
}

/// All channels at rest and identity eyes give the neutral unified frame
pub fn neutral_frame() -> ScenarioResult {
    let mut result = ScenarioResult::new("neutral_frame");
    let source = ScriptedSource::from_frames([RawFrame::neutral()]);
    let Some(mut module) = result.module(source) else {
        return result;
    };
    module.initialize();
    result.outcomes.push(module.update_once());

    let Some(frame) = module.sink().last().copied() else {
        result.check(false, "nothing published");
        return result;
    };
    result.check(
        frame.weights().iter().all(|w| *w == 0.0),
        "expression weights not all zero",
    );
    for eye in Eye::BOTH {
        let state = frame.eye(eye);
        result.check(
            state.gaze == GazeAngles::FORWARD,
            format!("{:?} gaze {:?}", eye, state.gaze),
        );
        result.check(
            state.openness == 1.0,
            format!("{:?} openness {}", eye, state.openness),
        );
        result.check(
            state.pupil_diameter_mm == PUPIL_DIAMETER_MM,
            format!("{:?} pupil {}", eye, state.pupil_diameter_mm),
        );
    }
    result
}

/// A gap after an update leaves the frame bit-identical
pub fn skip_on_unavailable() -> ScenarioResult {
    let mut result = ScenarioResult::new("skip_on_unavailable");
    let active = RawFrame::neutral()
        .with_weight(ChannelId::JAW_DROP, 0.35)
        .with_weight(ChannelId::EYES_CLOSED_R, 0.6)
        .with_weight(ChannelId::LIP_SUCK_LT, 0.4)
        .with_eye(Eye::Left, Quaternion::from_axis_angle([0.0, 1.0, 0.0], 0.25));
    let Some(mut module) = result.module(ScriptedSource::new(vec![
        ScriptStep::Frame(active),
        ScriptStep::Gap,
        ScriptStep::Gap,
    ])) else {
        return result;
    };
    module.initialize();

    result.outcomes.push(module.update_once());
    let committed = *module.engine().frame();
    for _ in 0..2 {
        result.outcomes.push(module.update_once());
        result.check(
            same_bits(&committed, module.engine().frame()),
            "frame changed on a skipped cycle",
        );
    }
    result.check(module.sink().len() == 1, "skipped cycle published a frame");
    result
}

/// Calls before initialization read nothing and write nothing
pub fn calibrate_before_initialize() -> ScenarioResult {
    let mut result = ScenarioResult::new("calibrate_before_initialize");
    let source = ScriptedSource::from_frames([RawFrame::neutral()]);
    let Some(mut module) = result.module(source) else {
        return result;
    };

    let outcome = module.update_once();
    result.outcomes.push(outcome);
    result.check(module.source().polls == 0, "source polled before initialize");
    result.check(module.sink().is_empty(), "frame published before initialize");
    result.check(outcome == CycleOutcome::NotStarted, "cycle ran before initialize");
    result
}

/// A source that only comes up with one tracker writes only that half
pub fn partial_capabilities(init_code: i32) -> ScenarioResult {
    let mut result = ScenarioResult::new("partial_capabilities");
    let raw = RawFrame::neutral()
        .with_weight(ChannelId::JAW_DROP, 0.8)
        .with_weight(ChannelId::UPPER_LID_RAISER_L, 0.6)
        .with_weight(ChannelId::EYES_CLOSED_L, 0.5);
    let source = ScriptedSource::with_init_code(init_code, vec![ScriptStep::Frame(raw)]);
    let Some(mut module) = result.module(source) else {
        return result;
    };

    let capabilities = module.initialize();
    result.check(
        capabilities == InitStatus::from_code(init_code).capabilities(),
        "advertised capabilities differ from the init status",
    );
    result.outcomes.push(module.update_once());

    let frame = *module.engine().frame();
    let face_written = frame.weight(ExpressionId::JawOpen) == 0.8;
    let eye_written = frame.weight(ExpressionId::EyeWideLeft) == 0.6
        && (frame.eye(Eye::Left).openness - 0.5).abs() < 1e-6;
    result.check(
        face_written == capabilities.expression,
        format!("face slots written = {}", face_written),
    );
    result.check(
        eye_written == capabilities.eye,
        format!("eye slots written = {}", eye_written),
    );
    result
}

/// Capabilities revised mid-session gate the next cycle only
pub fn capability_revision() -> ScenarioResult {
    let mut result = ScenarioResult::new("capability_revision");
    let first = RawFrame::neutral().with_weight(ChannelId::JAW_DROP, 0.2);
    let second = RawFrame::neutral()
        .with_weight(ChannelId::JAW_DROP, 0.9)
        .with_weight(ChannelId::INNER_BROW_RAISER_R, 0.3);
    let third = RawFrame::neutral().with_weight(ChannelId::JAW_DROP, 0.7);
    let Some(mut module) = result.module(ScriptedSource::new(vec![
        ScriptStep::Frame(first),
        ScriptStep::Revise(Capabilities::new(true, false), second),
        ScriptStep::Revise(Capabilities::ALL, third),
    ])) else {
        return result;
    };
    module.initialize();

    for _ in 0..3 {
        result.outcomes.push(module.update_once());
    }

    let frames = module.sink().frames();
    result.check(frames.len() == 3, format!("{} frames published", frames.len()));
    if frames.len() == 3 {
        result.check(
            frames[1].weight(ExpressionId::JawOpen) == 0.2,
            "face slot written while expression tracking was off",
        );
        result.check(
            frames[1].weight(ExpressionId::BrowInnerUpRight) == 0.3,
            "eye slot not written while eye tracking was on",
        );
        result.check(
            frames[2].weight(ExpressionId::JawOpen) == 0.7,
            "face slot not written after expression tracking returned",
        );
    }
    result
}

/// Every scenario, with both single-tracker init codes
pub fn all_scenarios() -> Vec<ScenarioResult> {
    vec![
        neutral_frame(),
        skip_on_unavailable(),
        calibrate_before_initialize(),
        partial_capabilities(-1),
        partial_capabilities(-2),
        capability_revision(),
    ]
}
