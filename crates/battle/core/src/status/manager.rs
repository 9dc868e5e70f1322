//! Single writer for combatant status lists.
//!
//! Every status mutation funnels through [`StatusManager`]: attaching with
//! stacking resolution, the end-of-round tick, and explicit cleansing.
//! Attribute shifts are applied here on attach and reverted here on removal,
//! so a hero's working attributes always equal definition values plus the
//! shifts of currently active statuses.

use crate::log::{CombatEvent, EventLog};
use crate::state::HeroState;
use crate::status::{StackingPolicy, StatusEffect};

#[derive(Clone, Copy, Debug, Default)]
pub struct StatusManager;

impl StatusManager {
    pub fn new() -> Self {
        Self
    }

    /// Attaches a status instance, resolving the stacking policy against any
    /// existing instance from the same source skill.
    pub fn attach(&self, hero: &mut HeroState, effect: StatusEffect, log: &mut EventLog) {
        let existing = hero.statuses.position_by_source(effect.source_skill);

        match (effect.stacking, existing) {
            (StackingPolicy::Independent, _) | (_, None) => {
                self.push_new(hero, effect, log);
            }
            (StackingPolicy::Replace, Some(index)) => {
                let removed = hero.statuses.remove_at(index);
                if let Some(shift) = removed.shift {
                    hero.attributes.shift(shift.attribute, -shift.delta);
                }
                self.push_new(hero, effect, log);
            }
            (StackingPolicy::Additive, Some(index)) => {
                if let Some(shift) = effect.shift {
                    hero.attributes.shift(shift.attribute, shift.delta);
                }
                let merged = &mut hero.statuses.as_mut_slice()[index];
                merged.magnitude = merged.magnitude.saturating_add(effect.magnitude);
                merged.per_round = merged.per_round.saturating_add(effect.per_round);
                merged.remaining_rounds = merged.remaining_rounds.max(effect.remaining_rounds);
                // Same source skill, so both shifts touch the same attribute.
                merged.shift = match (merged.shift, effect.shift) {
                    (Some(old), Some(new)) => Some(crate::status::AttributeShift {
                        attribute: old.attribute,
                        delta: old.delta + new.delta,
                    }),
                    (old, new) => old.or(new),
                };
                log.push(CombatEvent::StatusMerged {
                    target: hero.id,
                    source_skill: effect.source_skill,
                });
            }
            (StackingPolicy::Ignore, Some(_)) => {
                log.push(CombatEvent::StatusRejected {
                    target: hero.id,
                    source_skill: effect.source_skill,
                });
            }
        }
    }

    fn push_new(&self, hero: &mut HeroState, effect: StatusEffect, log: &mut EventLog) {
        if hero.statuses.is_full() {
            log.push(CombatEvent::StatusRejected {
                target: hero.id,
                source_skill: effect.source_skill,
            });
            return;
        }
        if let Some(shift) = effect.shift {
            hero.attributes.shift(shift.attribute, shift.delta);
        }
        log.push(CombatEvent::StatusApplied {
            target: hero.id,
            instance: effect.instance,
            source_skill: effect.source_skill,
            category: effect.category,
        });
        hero.statuses.push(effect);
    }

    /// End-of-round tick: applies recurring magnitudes, decrements
    /// durations, and removes expired instances, all in insertion order.
    /// Each expiry reverts its attribute shift and is logged exactly once.
    pub fn tick(&self, hero: &mut HeroState, log: &mut EventLog) {
        // Recurring effects first, so an effect on its last round still
        // ticks before it expires.
        let recurring: Vec<_> = hero
            .statuses
            .iter()
            .filter(|e| e.per_round != 0)
            .map(|e| (e.instance, e.per_round))
            .collect();
        for (instance, per_round) in recurring {
            let hp_delta = if per_round > 0 {
                -(hero.apply_damage(per_round as u32) as i32)
            } else {
                hero.heal(per_round.unsigned_abs()) as i32
            };
            log.push(CombatEvent::StatusTicked {
                target: hero.id,
                instance,
                hp_delta,
            });
            if hp_delta < 0 && !hero.is_alive() {
                log.push(CombatEvent::HeroDefeated { hero: hero.id });
            }
        }

        for effect in hero.statuses.as_mut_slice() {
            effect.remaining_rounds = effect.remaining_rounds.saturating_sub(1);
        }

        let mut index = 0;
        while index < hero.statuses.len() {
            if hero.statuses.as_mut_slice()[index].remaining_rounds == 0 {
                let removed = hero.statuses.remove_at(index);
                if let Some(shift) = removed.shift {
                    hero.attributes.shift(shift.attribute, -shift.delta);
                }
                log.push(CombatEvent::StatusExpired {
                    target: hero.id,
                    instance: removed.instance,
                    source_skill: removed.source_skill,
                });
            } else {
                index += 1;
            }
        }
    }

    /// Removes every active status and reverts their shifts.
    pub fn cleanse(&self, hero: &mut HeroState, log: &mut EventLog) {
        let mut removed = 0u32;
        while !hero.statuses.is_empty() {
            let effect = hero.statuses.remove_at(0);
            if let Some(shift) = effect.shift {
                hero.attributes.shift(shift.attribute, -shift.delta);
            }
            removed += 1;
        }
        if removed > 0 {
            log.push(CombatEvent::StatusCleansed {
                target: hero.id,
                removed,
            });
        }
    }

    /// Whether an active control status forbids this combatant from acting.
    pub fn control_locked(&self, hero: &HeroState) -> bool {
        hero.statuses()
            .has_category(crate::skill::EffectCategory::Control)
    }
}
