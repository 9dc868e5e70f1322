//! Append-only battle event log.
//!
//! The log is the engine's observable record: every state change the
//! simulation makes is mirrored by an event, in the order it happened.
//! Because the engine is deterministic, two runs with identical inputs
//! produce byte-identical logs, which is what replay tests assert on.

use crate::skill::{EffectCategory, SkillId};
use crate::state::HeroId;
use crate::status::StatusInstanceId;

/// Why a skill chain stopped before finishing its casts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterruptReason {
    /// An active control status forbids acting.
    Control,
    /// The caster died mid-chain.
    CasterDead,
}

/// One entry in the battle record.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEvent {
    RoundStarted {
        round: u32,
    },
    SkillCast {
        caster: HeroId,
        skill: SkillId,
        level: u16,
        target: Option<HeroId>,
    },
    /// No executor is registered for the skill's category. The cast is
    /// dropped; the battle continues.
    CastFailed {
        caster: HeroId,
        skill: SkillId,
        category: EffectCategory,
    },
    /// The chance roll failed; no state changed.
    Resisted {
        caster: HeroId,
        skill: SkillId,
        target: HeroId,
    },
    DamageDealt {
        caster: HeroId,
        skill: SkillId,
        target: HeroId,
        amount: u32,
    },
    /// The combatant's HP reached 0. Logged exactly once, by whichever
    /// mutation dealt the killing blow.
    HeroDefeated {
        hero: HeroId,
    },
    Healed {
        caster: HeroId,
        skill: SkillId,
        target: HeroId,
        amount: u32,
    },
    StatusApplied {
        target: HeroId,
        instance: StatusInstanceId,
        source_skill: SkillId,
        category: EffectCategory,
    },
    /// An additive re-application folded into an existing instance.
    StatusMerged {
        target: HeroId,
        source_skill: SkillId,
    },
    /// The new instance was dropped (ignore policy, or the list is full).
    StatusRejected {
        target: HeroId,
        source_skill: SkillId,
    },
    /// End-of-round recurring effect. Negative `hp_delta` is damage,
    /// positive is healing.
    StatusTicked {
        target: HeroId,
        instance: StatusInstanceId,
        hp_delta: i32,
    },
    StatusExpired {
        target: HeroId,
        instance: StatusInstanceId,
        source_skill: SkillId,
    },
    StatusCleansed {
        target: HeroId,
        removed: u32,
    },
    ChainInterrupted {
        caster: HeroId,
        reason: InterruptReason,
        /// Casts skipped, counting the one that was interrupted.
        skipped: u32,
    },
    /// The provider's chain failed validation; the turn is forfeited with
    /// no state mutated.
    ChainRejected {
        caster: HeroId,
    },
}

/// Ordered record of everything that happened in one battle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventLog {
    events: Vec<CombatEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CombatEvent> {
        self.events.iter()
    }

    /// Number of events matching a predicate. Test convenience.
    pub fn count_where(&self, mut predicate: impl FnMut(&CombatEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_preserves_order() {
        let mut log = EventLog::new();
        log.push(CombatEvent::RoundStarted { round: 1 });
        log.push(CombatEvent::SkillCast {
            caster: HeroId(1),
            skill: SkillId(7),
            level: 1,
            target: Some(HeroId(2)),
        });
        assert_eq!(log.len(), 2);
        assert!(matches!(log.events()[0], CombatEvent::RoundStarted { round: 1 }));
        assert_eq!(
            log.count_where(|e| matches!(e, CombatEvent::SkillCast { .. })),
            1
        );
    }
}
