//! Validated multi-cast turns.
//!
//! A combatant's turn is a chain of casts. Validation is all-or-nothing:
//! [`SkillChain::build`] rejects the whole chain before anything mutates,
//! so a provider bug never leaves a half-spent turn behind. Execution is
//! best-effort: costs are deducted eagerly per cast, and death or control
//! stops the remainder with a logged interruption rather than an error.

use crate::log::{CombatEvent, EventLog, InterruptReason};
use crate::plugin::RegistryError;
use crate::resolve::{ResolveError, SkillProcessor};
use crate::skill::{SkillId, SkillOracle};
use crate::state::{BattleState, HeroId, HeroState};
use crate::status::StatusManager;

/// How a cast picks its target at execution time.
///
/// Selection is re-evaluated per cast, so a chain keeps working when its
/// first target dies mid-turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetSelector {
    /// The caster itself.
    SelfCast,
    /// First living enemy in definition order.
    Enemy,
}

/// One requested cast inside a chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainCast {
    pub skill: SkillId,
    pub level: u16,
    pub target: TargetSelector,
}

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum ChainError {
    #[error("chain is empty")]
    Empty,
    #[error("chain has {len} casts, the maximum is {max}")]
    TooLong { len: usize, max: usize },
    #[error("caster does not know {0}")]
    UnknownSkill(SkillId),
    #[error("{skill} has no level {level}")]
    InvalidSkillLevel { skill: SkillId, level: u16 },
    #[error("chain costs {required} resource, only {available} available")]
    CostExceedsResource { required: u32, available: u32 },
}

#[derive(Clone, Copy, Debug)]
struct PlannedCast {
    cast: ChainCast,
    cost: u32,
}

/// A chain that passed validation against a specific caster.
#[derive(Debug)]
pub struct SkillChain {
    casts: Vec<PlannedCast>,
}

impl SkillChain {
    /// Validates a whole chain against the caster's skills and resource.
    ///
    /// All-or-nothing: any failure rejects the chain with no state change.
    pub fn build(
        caster: &HeroState,
        casts: &[ChainCast],
        skills: &dyn SkillOracle,
        max_casts: usize,
    ) -> Result<Self, ChainError> {
        if casts.is_empty() {
            return Err(ChainError::Empty);
        }
        if casts.len() > max_casts {
            return Err(ChainError::TooLong {
                len: casts.len(),
                max: max_casts,
            });
        }

        let mut planned = Vec::with_capacity(casts.len());
        let mut required = 0u32;
        for cast in casts {
            if !caster.skills.contains(&cast.skill) {
                return Err(ChainError::UnknownSkill(cast.skill));
            }
            let definition = skills
                .skill(cast.skill)
                .ok_or(ChainError::UnknownSkill(cast.skill))?;
            let params = definition
                .params_for(cast.level)
                .ok_or(ChainError::InvalidSkillLevel {
                    skill: cast.skill,
                    level: cast.level,
                })?;
            required += params.cost;
            planned.push(PlannedCast {
                cast: *cast,
                cost: params.cost,
            });
        }

        let available = caster.resource.current;
        if required > available {
            return Err(ChainError::CostExceedsResource {
                required,
                available,
            });
        }

        Ok(Self { casts: planned })
    }

    pub fn len(&self) -> usize {
        self.casts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.casts.is_empty()
    }

    /// Runs the chain. Costs are deducted eagerly per cast, before the hit
    /// roll. Death or control interrupts the remainder; a missing executor
    /// drops only that cast. Skill-data errors abort the battle.
    pub fn execute(
        &self,
        state: &mut BattleState,
        processor: &SkillProcessor<'_>,
        caster: HeroId,
    ) -> Result<(), ResolveError> {
        let manager = StatusManager::new();

        for (index, planned) in self.casts.iter().enumerate() {
            let remaining = (self.casts.len() - index) as u32;
            let caster_state = state.hero(caster).ok_or(ResolveError::UnknownHero(caster))?;

            if !caster_state.is_alive() {
                interrupt(&mut state.log, caster, InterruptReason::CasterDead, remaining);
                break;
            }
            if manager.control_locked(caster_state) {
                interrupt(&mut state.log, caster, InterruptReason::Control, remaining);
                break;
            }
            let side = caster_state.side;

            let caster_state = state
                .hero_mut(caster)
                .ok_or(ResolveError::UnknownHero(caster))?;
            if !caster_state.resource.spend(planned.cost) {
                // Validation covered the up-front balance; an effect cannot
                // drain the caster mid-chain, so this is unreachable in
                // practice. Stop quietly rather than overdraw.
                break;
            }

            let target = match planned.cast.target {
                TargetSelector::SelfCast => None,
                TargetSelector::Enemy => match state.first_living_enemy(side) {
                    Some(enemy) => Some(enemy.id),
                    // No living enemy left; the simulator will observe the
                    // termination condition after this turn.
                    None => break,
                },
            };

            match processor.resolve(state, caster, target, planned.cast.skill, planned.cast.level)
            {
                Ok(_) => {}
                Err(ResolveError::Registry(RegistryError::UnknownEffectCategory(category))) => {
                    state.log.push(CombatEvent::CastFailed {
                        caster,
                        skill: planned.cast.skill,
                        category,
                    });
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

fn interrupt(log: &mut EventLog, caster: HeroId, reason: InterruptReason, skipped: u32) {
    log.push(CombatEvent::ChainInterrupted {
        caster,
        reason,
        skipped,
    });
}
