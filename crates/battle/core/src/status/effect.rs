//! Status effect instances and the bounded per-combatant list.

use arrayvec::ArrayVec;

use crate::config::EngineConfig;
use crate::skill::{EffectCategory, SkillId};
use crate::state::Attribute;

/// Unique (per battle) identifier for one attached status instance.
///
/// Allocated sequentially by the battle state so two stacks of the same
/// skill remain distinguishable in the event log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusInstanceId(pub u32);

/// How a new status interacts with an existing one from the same skill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackingPolicy {
    /// Remove the existing instance (reverting its shift), then attach.
    Replace,
    /// Fold into the existing instance: magnitudes sum, duration extends
    /// to the larger of the two.
    Additive,
    /// Coexist as independent instances.
    #[default]
    Independent,
    /// Keep the existing instance untouched; drop the new one.
    Ignore,
}

/// Attribute delta held open while a status is active and reverted when it
/// expires or is cleansed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeShift {
    pub attribute: Attribute,
    pub delta: i32,
}

/// One active status on a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub instance: StatusInstanceId,
    pub category: EffectCategory,
    /// Skill that attached this instance; stacking keys on it.
    pub source_skill: SkillId,
    pub magnitude: i32,
    /// Rounds left including the current one. Reaching 0 after a tick
    /// removes the instance.
    pub remaining_rounds: u32,
    pub stacking: StackingPolicy,
    /// Recurring per-round magnitude applied during the end-of-round tick.
    /// Positive damages, negative heals, zero is inert.
    pub per_round: i32,
    /// Attribute shift applied on attach and reverted on removal.
    pub shift: Option<AttributeShift>,
}

/// Bounded, insertion-ordered list of active statuses.
///
/// Insertion order is the tick order, which keeps replay deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffect, { EngineConfig::MAX_STATUS_EFFECTS }>,
}

impl StatusEffects {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.effects.is_full()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    /// Whether any active status has the given category.
    pub fn has_category(&self, category: EffectCategory) -> bool {
        self.effects.iter().any(|e| e.category == category)
    }

    pub fn find_by_source(&self, source: SkillId) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.source_skill == source)
    }

    pub(crate) fn push(&mut self, effect: StatusEffect) {
        self.effects.push(effect);
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> StatusEffect {
        self.effects.remove(index)
    }

    pub(crate) fn position_by_source(&self, source: SkillId) -> Option<usize> {
        self.effects.iter().position(|e| e.source_skill == source)
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [StatusEffect] {
        &mut self.effects
    }

    /// Writes the status fingerprint used by resolution-cache keys.
    ///
    /// The fingerprint is the multiset of `(source skill, remaining rounds)`
    /// pairs, sorted so two lists that differ only in attachment order hash
    /// identically. Instance ids are deliberately excluded.
    pub fn fingerprint_into(&self, out: &mut Vec<u8>) {
        let mut pairs: ArrayVec<(u32, u32), { EngineConfig::MAX_STATUS_EFFECTS }> = self
            .effects
            .iter()
            .map(|e| (e.source_skill.0, e.remaining_rounds))
            .collect();
        pairs.sort_unstable();

        out.extend_from_slice(&(pairs.len() as u32).to_le_bytes());
        for (skill, rounds) in pairs {
            out.extend_from_slice(&skill.to_le_bytes());
            out.extend_from_slice(&rounds.to_le_bytes());
        }
    }
}
