//! Skill resolution: plan, roll, apply.
//!
//! [`SkillProcessor`] is the only path through which a cast changes state.
//! Resolution splits into a deterministic half and a random half:
//!
//! 1. **Plan** — look up the skill, snapshot caster and target, and either
//!    fetch the [`EffectPlan`] from the shared cache or ask the registered
//!    executor to compute it. The cache key digests every input the
//!    executor can observe, so a cached plan is indistinguishable from a
//!    fresh one.
//! 2. **Roll and apply** — draw a d100 from the seed-addressed RNG (never
//!    cached) against the plan's chance, then apply the plan's ops. Status
//!    attachment goes through the status manager, which stays the single
//!    writer of status lists.

use sha2::{Digest, Sha256};

use crate::cache::ResolutionKey;
use crate::env::BattleEnv;
use crate::log::CombatEvent;
use crate::plugin::{CombatantSnapshot, EffectOp, EffectPlan, PlanContext, Recipient, RegistryError};
use crate::rng::compute_seed;
use crate::skill::SkillId;
use crate::state::{BattleState, HeroId, HeroState};
use crate::status::{StatusEffect, StatusManager};

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unknown skill {0}")]
    UnknownSkill(SkillId),
    #[error("{skill} has no level {level}")]
    InvalidSkillLevel { skill: SkillId, level: u16 },
    #[error("unknown combatant {0}")]
    UnknownHero(HeroId),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// What a single cast did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CastOutcome {
    /// Whether the chance roll succeeded and the plan's ops were applied.
    pub hit: bool,
}

/// Stateless resolver borrowing the shared environment.
pub struct SkillProcessor<'a> {
    env: BattleEnv<'a>,
    manager: StatusManager,
}

impl<'a> SkillProcessor<'a> {
    pub fn new(env: BattleEnv<'a>) -> Self {
        Self {
            env,
            manager: StatusManager::new(),
        }
    }

    /// Deterministic half of resolution: the plan for casting `skill` at
    /// `level` in the current state. Read-only; action providers use this
    /// to rank skills without touching the battle.
    pub fn plan(
        &self,
        state: &BattleState,
        caster: HeroId,
        target: Option<HeroId>,
        skill: SkillId,
        level: u16,
    ) -> Result<EffectPlan, ResolveError> {
        let caster_state = state.hero(caster).ok_or(ResolveError::UnknownHero(caster))?;
        let target_state = match target {
            Some(id) => Some(state.hero(id).ok_or(ResolveError::UnknownHero(id))?),
            None => None,
        };
        self.plan_inner(caster_state, target_state, skill, level)
    }

    fn plan_inner(
        &self,
        caster: &HeroState,
        target: Option<&HeroState>,
        skill_id: SkillId,
        level: u16,
    ) -> Result<EffectPlan, ResolveError> {
        let skill = self
            .env
            .skills
            .skill(skill_id)
            .ok_or(ResolveError::UnknownSkill(skill_id))?;
        let params = skill
            .params_for(level)
            .ok_or(ResolveError::InvalidSkillLevel {
                skill: skill_id,
                level,
            })?;
        // Fail on a missing executor before consulting the cache, so an
        // unregistered category never produces a stale hit.
        let executor = self.env.registry.get(skill.category)?;

        let key = resolution_key(caster, target, skill_id, level);
        if let Some(plan) = self.env.cache.get(&key) {
            return Ok(plan);
        }

        let ctx = PlanContext {
            config: self.env.config,
            skill,
            level,
            params,
            caster: snapshot(caster),
            target: target.map(snapshot),
        };
        let plan = executor.plan(&ctx);
        self.env.cache.insert(key, plan.clone());
        Ok(plan)
    }

    /// Resolves one cast against the battle state.
    ///
    /// `target: None` is a self-cast. The resource cost is the chain's
    /// concern and is already deducted by the time this runs.
    pub fn resolve(
        &self,
        state: &mut BattleState,
        caster: HeroId,
        target: Option<HeroId>,
        skill: SkillId,
        level: u16,
    ) -> Result<CastOutcome, ResolveError> {
        let plan = self.plan(state, caster, target, skill, level)?;

        state.log.push(CombatEvent::SkillCast {
            caster,
            skill,
            level,
            target,
        });

        let nonce = state.next_nonce();
        let seed = compute_seed(state.seed(), nonce, caster.0, 0);
        let roll = self.env.rng.roll_d100(seed);
        if roll > plan.chance {
            state.log.push(CombatEvent::Resisted {
                caster,
                skill,
                target: target.unwrap_or(caster),
            });
            return Ok(CastOutcome { hit: false });
        }

        for op in &plan.ops {
            self.apply_op(state, caster, target, skill, op)?;
        }
        Ok(CastOutcome { hit: true })
    }

    fn apply_op(
        &self,
        state: &mut BattleState,
        caster: HeroId,
        target: Option<HeroId>,
        skill: SkillId,
        op: &EffectOp,
    ) -> Result<(), ResolveError> {
        let recipient = |r: Recipient| match r {
            Recipient::Caster => caster,
            Recipient::Target => target.unwrap_or(caster),
        };

        match op {
            EffectOp::Damage {
                recipient: r,
                amount,
            } => {
                let id = recipient(*r);
                let hero = state.hero_mut(id).ok_or(ResolveError::UnknownHero(id))?;
                let dealt = hero.apply_damage(*amount);
                let defeated = dealt > 0 && !hero.is_alive();
                state.log.push(CombatEvent::DamageDealt {
                    caster,
                    skill,
                    target: id,
                    amount: dealt,
                });
                if defeated {
                    state.log.push(CombatEvent::HeroDefeated { hero: id });
                }
            }
            EffectOp::Heal {
                recipient: r,
                amount,
            } => {
                let id = recipient(*r);
                let hero = state.hero_mut(id).ok_or(ResolveError::UnknownHero(id))?;
                let healed = hero.heal(*amount);
                state.log.push(CombatEvent::Healed {
                    caster,
                    skill,
                    target: id,
                    amount: healed,
                });
            }
            EffectOp::AttachStatus(blueprint) => {
                let id = recipient(blueprint.recipient);
                let instance = state.alloc_instance();
                let effect = StatusEffect {
                    instance,
                    category: blueprint.category,
                    source_skill: skill,
                    magnitude: blueprint.magnitude,
                    remaining_rounds: blueprint.duration,
                    stacking: blueprint.stacking,
                    per_round: blueprint.per_round,
                    shift: blueprint.shift,
                };
                let hero = state
                    .heroes
                    .iter_mut()
                    .find(|h| h.id == id)
                    .ok_or(ResolveError::UnknownHero(id))?;
                self.manager.attach(hero, effect, &mut state.log);
            }
        }
        Ok(())
    }
}

fn snapshot(hero: &HeroState) -> CombatantSnapshot {
    CombatantSnapshot {
        level: hero.level,
        attributes: hero.attributes,
    }
}

/// Digests everything a plan computation can observe.
fn resolution_key(
    caster: &HeroState,
    target: Option<&HeroState>,
    skill: SkillId,
    level: u16,
) -> ResolutionKey {
    let mut buf = Vec::with_capacity(160);
    buf.extend_from_slice(&skill.0.to_le_bytes());
    buf.extend_from_slice(&level.to_le_bytes());

    buf.extend_from_slice(&caster.level.to_le_bytes());
    caster.attributes.fingerprint_into(&mut buf);
    caster.statuses().fingerprint_into(&mut buf);

    match target {
        Some(target) => {
            buf.push(1);
            buf.extend_from_slice(&target.level.to_le_bytes());
            target.attributes.fingerprint_into(&mut buf);
            target.statuses().fingerprint_into(&mut buf);
        }
        None => buf.push(0),
    }

    ResolutionKey(Sha256::digest(&buf).into())
}
