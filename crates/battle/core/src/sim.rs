//! The round loop.
//!
//! [`Simulator`] drives one battle from hero definitions to a
//! [`BattleResult`]: snapshot the turn order, run each living combatant's
//! chain, tick statuses, check termination, repeat. Everything random flows
//! through the environment's seed-addressed RNG, so a battle is a pure
//! function of `(definitions, skills, registry, config, seed, provider)`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::chain::{ChainCast, SkillChain};
use crate::config::EngineConfig;
use crate::env::BattleEnv;
use crate::log::{CombatEvent, EventLog};
use crate::resolve::{ResolveError, SkillProcessor};
use crate::state::{BattlePhase, BattleState, HeroDefinition, HeroId, HeroState, SideId};
use crate::status::StatusManager;

/// How a finished battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleOutcome {
    /// Exactly one side has a living combatant.
    Victory { side: SideId },
    /// Round cap reached, or every side was eliminated simultaneously.
    Draw,
    /// Cancellation was observed at a round boundary.
    Aborted,
}

/// Final product of one simulation.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleResult {
    pub outcome: BattleOutcome,
    pub rounds: u32,
    pub heroes: Vec<HeroState>,
    pub log: EventLog,
}

/// Supplies each combatant's turn.
///
/// Implementations must be deterministic: the same state and actor always
/// yield the same casts. An empty list passes the turn.
pub trait ActionProvider: Send + Sync {
    fn plan_turn(&self, state: &BattleState, actor: HeroId) -> Vec<ChainCast>;
}

/// Cooperative cancellation flag shared between a battle and its owner.
///
/// Checked once per round, at the top; a cancelled battle finishes as
/// [`BattleOutcome::Aborted`] with the state it had at that boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum BattleError {
    #[error("a battle needs at least two sides, got {0}")]
    NotEnoughSides(usize),
    #[error("{got} combatants exceed the limit of {max}")]
    TooManyCombatants { got: usize, max: usize },
    #[error("duplicate combatant id {0}")]
    DuplicateHero(HeroId),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// One-battle driver over a shared environment.
pub struct Simulator<'a> {
    env: BattleEnv<'a>,
    manager: StatusManager,
}

impl<'a> Simulator<'a> {
    pub fn new(env: BattleEnv<'a>) -> Self {
        Self {
            env,
            manager: StatusManager::new(),
        }
    }

    /// Runs one battle to completion.
    pub fn run(
        &self,
        definitions: &[HeroDefinition],
        seed: u64,
        provider: &dyn ActionProvider,
        cancel: Option<&CancelToken>,
    ) -> Result<BattleResult, BattleError> {
        let mut state = self.init(definitions, seed)?;
        let processor = SkillProcessor::new(self.env);

        let outcome = loop {
            state.phase = BattlePhase::RoundLoop;

            if let Some(token) = cancel
                && token.is_cancelled()
            {
                break BattleOutcome::Aborted;
            }
            if let Some(outcome) = termination(&state) {
                break outcome;
            }
            if state.round >= self.env.config.max_rounds {
                break BattleOutcome::Draw;
            }

            state.round += 1;
            state.phase = BattlePhase::Resolving;
            state.log.push(CombatEvent::RoundStarted { round: state.round });

            // Turn order is frozen at the top of the round: speed descending,
            // definition order breaking ties. Mid-round speed changes apply
            // from the next round.
            let order = turn_order(&state.heroes);

            for actor in order {
                let Some(actor_state) = state.hero(actor) else {
                    continue;
                };
                if !actor_state.is_alive() {
                    continue;
                }

                let casts = provider.plan_turn(&state, actor);
                if casts.is_empty() {
                    continue;
                }
                let chain = match SkillChain::build(
                    actor_state,
                    &casts,
                    self.env.skills,
                    EngineConfig::MAX_CHAIN_CASTS,
                ) {
                    Ok(chain) => chain,
                    // An invalid chain is rejected whole; the actor forfeits
                    // this turn, and the forfeit is on the record.
                    Err(_) => {
                        state.log.push(CombatEvent::ChainRejected { caster: actor });
                        continue;
                    }
                };
                chain.execute(&mut state, &processor, actor)?;
            }

            // End-of-round status tick, definition order.
            for index in 0..state.heroes.len() {
                if !state.heroes[index].is_alive() {
                    continue;
                }
                self.manager.tick(&mut state.heroes[index], &mut state.log);
            }
        };

        Ok(finish(&mut state, outcome))
    }

    fn init(&self, definitions: &[HeroDefinition], seed: u64) -> Result<BattleState, BattleError> {
        if definitions.len() > EngineConfig::MAX_COMBATANTS {
            return Err(BattleError::TooManyCombatants {
                got: definitions.len(),
                max: EngineConfig::MAX_COMBATANTS,
            });
        }
        let mut sides: Vec<SideId> = Vec::new();
        for (index, definition) in definitions.iter().enumerate() {
            if definitions[..index].iter().any(|d| d.id == definition.id) {
                return Err(BattleError::DuplicateHero(definition.id));
            }
            if !sides.contains(&definition.side) {
                sides.push(definition.side);
            }
        }
        if sides.len() < 2 {
            return Err(BattleError::NotEnoughSides(sides.len()));
        }
        Ok(BattleState::new(definitions, seed))
    }
}

/// Living combatants ordered for one round: speed descending, definition
/// index ascending on ties.
fn turn_order(heroes: &[HeroState]) -> Vec<HeroId> {
    let mut order: Vec<(usize, i32, HeroId)> = heroes
        .iter()
        .enumerate()
        .filter(|(_, h)| h.is_alive())
        .map(|(index, h)| (index, h.attributes.speed, h.id))
        .collect();
    order.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    order.into_iter().map(|(_, _, id)| id).collect()
}

/// Drains the terminal state into a result, walking the phase through
/// `Ending` to `Done`.
fn finish(state: &mut BattleState, outcome: BattleOutcome) -> BattleResult {
    state.phase = BattlePhase::Ending;
    let result = BattleResult {
        outcome,
        rounds: state.round,
        heroes: std::mem::take(&mut state.heroes),
        log: std::mem::take(&mut state.log),
    };
    state.phase = BattlePhase::Done;
    result
}

fn termination(state: &BattleState) -> Option<BattleOutcome> {
    let sides = state.living_sides();
    match sides.len() {
        0 => Some(BattleOutcome::Draw),
        1 if state.round > 0 => Some(BattleOutcome::Victory { side: sides[0] }),
        // Round 0 with one living side cannot happen past init validation.
        _ => None,
    }
}
