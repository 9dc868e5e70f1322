//! Skill definitions and the oracle trait for looking them up.
//!
//! Skill data is immutable once a battle begins. The engine reads it through
//! the [`SkillOracle`] seam so tests can stub a handful of skills without
//! building a full catalog; [`SkillBook`] is the map-backed implementation
//! populated by the data-loading collaborator.

use std::collections::HashMap;

use crate::state::Attribute;

/// Identifies a skill in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillId(pub u32);

impl core::fmt::Display for SkillId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "skill#{}", self.0)
    }
}

/// Behavioral category of a skill's effect.
///
/// The category doubles as the executor key in the plugin registry: adding a
/// new kind of effect means registering an executor under a new category,
/// not editing the resolution pipeline. `Custom` is the escape hatch for
/// externally registered executors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectCategory {
    /// Immediate HP loss on the target.
    Damage,
    /// Prevents the target from acting while the status holds.
    Control,
    /// Shifts a caster or target attribute while the status holds.
    Buff,
    /// Healing and regeneration.
    Other,
    /// Externally registered effect kind.
    Custom(u16),
}

impl core::fmt::Display for EffectCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EffectCategory::Damage => f.write_str("damage"),
            EffectCategory::Control => f.write_str("control"),
            EffectCategory::Buff => f.write_str("buff"),
            EffectCategory::Other => f.write_str("other"),
            EffectCategory::Custom(id) => write!(f, "custom#{id}"),
        }
    }
}

/// Numeric parameters of a skill at one level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillParams {
    /// Primary magnitude. Interpretation is per-category: percent of attack
    /// for damage, attribute delta for buffs, flat heal for other.
    pub magnitude: i32,
    /// Rounds an attached status persists.
    pub duration: u32,
    /// Success chance in whole percent (1-100). 100 means unconditional.
    pub chance: u32,
    /// Resource cost deducted when the cast is attempted.
    pub cost: u32,
    /// Recurring per-round magnitude for attached statuses. Positive values
    /// damage, negative values heal.
    pub per_round: i32,
}

/// Immutable skill template with a per-level parameter table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillDefinition {
    pub id: SkillId,
    pub name: String,
    pub category: EffectCategory,
    /// Attribute a buff shifts. Ignored by other categories.
    pub attribute: Option<Attribute>,
    /// Parameters indexed by level; entry 0 is level 1.
    pub levels: Vec<SkillParams>,
}

impl SkillDefinition {
    /// Parameters at a 1-based level, or `None` when the level has no entry
    /// in the table.
    pub fn params_for(&self, level: u16) -> Option<&SkillParams> {
        if level == 0 {
            return None;
        }
        self.levels.get(usize::from(level) - 1)
    }

    pub fn max_level(&self) -> u16 {
        self.levels.len() as u16
    }
}

/// Read-only access to skill definitions.
pub trait SkillOracle {
    fn skill(&self, id: SkillId) -> Option<&SkillDefinition>;
}

/// Map-backed skill catalog. Populated once, then shared read-only across
/// every battle in a batch.
#[derive(Clone, Debug, Default)]
pub struct SkillBook {
    skills: HashMap<SkillId, SkillDefinition>,
}

impl SkillBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a definition, replacing any previous one under the same id.
    pub fn insert(&mut self, definition: SkillDefinition) {
        self.skills.insert(definition.id, definition);
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl SkillOracle for SkillBook {
    fn skill(&self, id: SkillId) -> Option<&SkillDefinition> {
        self.skills.get(&id)
    }
}
