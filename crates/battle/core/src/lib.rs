//! Deterministic turn-based battle engine.
//!
//! The engine resolves skill-based battles as a pure function of its
//! inputs: hero definitions, a skill catalog, an executor registry, a
//! configuration, and a seed. Identical inputs produce identical results,
//! down to event-log order, which makes every battle replayable.
//!
//! # Architecture
//!
//! - [`state`] — hero definitions, per-battle state, battle bookkeeping.
//! - [`skill`] — skill data and the oracle seam for looking it up.
//! - [`plugin`] — the executor trait, built-in executors, and the registry
//!   keyed by effect category.
//! - [`resolve`] — the skill processor: plan, roll, apply.
//! - [`cache`] — shared, sharded cache of deterministic effect plans.
//! - [`status`] — status instances and the manager that owns their
//!   lifecycle.
//! - [`chain`] — validated multi-cast turns.
//! - [`sim`] — the round loop producing a [`sim::BattleResult`].
//! - [`rng`] — seed-addressed randomness; the one place dice exist.
//!
//! The crate performs no I/O and carries no logging. Concurrency enters
//! only through the plan cache, which many simulations may share.

pub mod cache;
pub mod chain;
pub mod config;
pub mod env;
pub mod log;
pub mod plugin;
pub mod resolve;
pub mod rng;
pub mod sim;
pub mod skill;
pub mod state;
pub mod status;

pub use cache::{CacheStats, ResolutionCache, ResolutionKey};
pub use chain::{ChainCast, ChainError, SkillChain, TargetSelector};
pub use config::EngineConfig;
pub use env::BattleEnv;
pub use log::{CombatEvent, EventLog, InterruptReason};
pub use plugin::{
    EffectExecutor, EffectOp, EffectPlan, PlanContext, PluginRegistry, Recipient, RegistryError,
    StatusBlueprint,
};
pub use resolve::{CastOutcome, ResolveError, SkillProcessor};
pub use rng::{BattleRng, FixedRng, PcgRng, compute_seed};
pub use sim::{
    ActionProvider, BattleError, BattleOutcome, BattleResult, CancelToken, Simulator,
};
pub use skill::{
    EffectCategory, SkillBook, SkillDefinition, SkillId, SkillOracle, SkillParams,
};
pub use state::{
    Attribute, AttributeSet, BattlePhase, BattleState, HeroDefinition, HeroId, HeroState,
    ResourceMeter, SideId,
};
pub use status::{
    AttributeShift, StackingPolicy, StatusEffect, StatusEffects, StatusInstanceId, StatusManager,
};
