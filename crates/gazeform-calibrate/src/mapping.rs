//! Mapping tables - canonical expression slot from raw channel(s)
//!
//! A table is validated once when it is built: every referenced channel must
//! be a declared scalar channel, every transform must get the number of
//! inputs it needs, and no canonical slot may be targeted twice. Applying a
//! validated table never allocates and never fails.

use std::collections::HashSet;

use gazeform_core::{
    ChannelId, ChannelRegistry, ExpressionId, GazeformError, GazeformResult, RawFrame,
    UnifiedFrame,
};

use crate::derive::{finite_or_zero, lip_raise_correction, lip_suck_correction, mouth_closed_capped};

/// Most inputs a single entry may read
pub const MAX_INPUTS: usize = 2;

/// Pure transform over the selected raw values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Copy one channel
    Identity,
    /// `max(0, a - b)`: lip raise minus nose-wrinkle cross-talk
    CrossTalkFloor,
    /// `min(1 - a^(1/6), b)`: lip suck softened by lip raise
    SoftenedSuck,
    /// `min(a, b)`: mouth closed capped by the jaw drop
    JawCapped,
}

impl Transform {
    fn accepts(&self, inputs: usize) -> bool {
        match self {
            Transform::Identity => inputs == 1,
            Transform::CrossTalkFloor | Transform::SoftenedSuck | Transform::JawCapped => {
                inputs == 2
            }
        }
    }

    fn arity(&self) -> &'static str {
        match self {
            Transform::Identity => "exactly 1",
            Transform::CrossTalkFloor | Transform::SoftenedSuck | Transform::JawCapped => {
                "exactly 2"
            }
        }
    }

    /// Apply to inputs already checked against the arity
    #[inline]
    pub fn apply(&self, inputs: &[f32]) -> f32 {
        match self {
            Transform::Identity => inputs[0],
            Transform::CrossTalkFloor => lip_raise_correction(inputs[0], inputs[1]),
            Transform::SoftenedSuck => lip_suck_correction(inputs[0], inputs[1]),
            Transform::JawCapped => mouth_closed_capped(inputs[0], inputs[1]),
        }
    }
}

/// One row of a mapping table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub target: ExpressionId,
    pub inputs: Vec<ChannelId>,
    pub transform: Transform,
}

impl MappingEntry {
    /// 1:1 copy of a raw channel
    pub fn direct(target: ExpressionId, channel: ChannelId) -> Self {
        MappingEntry {
            target,
            inputs: vec![channel],
            transform: Transform::Identity,
        }
    }

    /// Many-to-one derived slot
    pub fn derived(target: ExpressionId, transform: Transform, inputs: &[ChannelId]) -> Self {
        MappingEntry {
            target,
            inputs: inputs.to_vec(),
            transform,
        }
    }

    fn validate(&self, registry: &ChannelRegistry) -> GazeformResult<()> {
        if !self.transform.accepts(self.inputs.len()) {
            return Err(GazeformError::ArityMismatch {
                expression: self.target,
                expected: self.transform.arity(),
                actual: self.inputs.len(),
            });
        }
        for id in &self.inputs {
            registry.validate_scalar(*id)?;
        }
        Ok(())
    }

    #[inline]
    fn evaluate(&self, registry: &ChannelRegistry, frame: &RawFrame) -> f32 {
        let mut values = [0.0f32; MAX_INPUTS];
        for (slot, id) in values.iter_mut().zip(&self.inputs) {
            *slot = finite_or_zero(registry.lookup(frame, *id));
        }
        self.transform.apply(&values[..self.inputs.len()])
    }
}

/// Validated, immutable mapping table
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    registry: ChannelRegistry,
    entries: Vec<MappingEntry>,
}

impl MappingTable {
    /// Build and validate a table on its own
    pub fn new(registry: &ChannelRegistry, entries: Vec<MappingEntry>) -> GazeformResult<Self> {
        let mut seen = HashSet::new();
        Self::with_seen(registry, entries, &mut seen)
    }

    /// Build while sharing the duplicate check with sibling tables
    fn with_seen(
        registry: &ChannelRegistry,
        entries: Vec<MappingEntry>,
        seen: &mut HashSet<ExpressionId>,
    ) -> GazeformResult<Self> {
        for entry in &entries {
            entry.validate(registry)?;
            if !seen.insert(entry.target) {
                return Err(GazeformError::DuplicateExpression(entry.target));
            }
        }
        Ok(MappingTable {
            registry: *registry,
            entries,
        })
    }

    /// Write every entry's value into its canonical slot
    pub fn apply(&self, frame: &RawFrame, out: &mut UnifiedFrame) {
        for entry in &self.entries {
            out.set_weight(entry.target, entry.evaluate(&self.registry, frame));
        }
    }

    pub fn get(&self, target: ExpressionId) -> Option<&MappingEntry> {
        self.entries.iter().find(|e| e.target == target)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.iter()
    }
}

/// The eye-capability and expression-capability tables, validated together
/// so a canonical slot appears in at most one of them
#[derive(Debug, Clone)]
pub struct CalibrationTables {
    registry: ChannelRegistry,
    eye: MappingTable,
    face: MappingTable,
}

impl CalibrationTables {
    pub fn new(
        registry: ChannelRegistry,
        eye_entries: Vec<MappingEntry>,
        face_entries: Vec<MappingEntry>,
    ) -> GazeformResult<Self> {
        let mut seen = HashSet::new();
        let eye = MappingTable::with_seen(&registry, eye_entries, &mut seen)?;
        let face = MappingTable::with_seen(&registry, face_entries, &mut seen)?;
        Ok(CalibrationTables {
            registry,
            eye,
            face,
        })
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Slots written when eye tracking is active
    pub fn eye(&self) -> &MappingTable {
        &self.eye
    }

    /// Slots written when expression tracking is active
    pub fn face(&self) -> &MappingTable {
        &self.face
    }

    /// Every slot some table writes
    pub fn mapped(&self) -> impl Iterator<Item = ExpressionId> + '_ {
        self.eye.iter().chain(self.face.iter()).map(|e| e.target)
    }
}
