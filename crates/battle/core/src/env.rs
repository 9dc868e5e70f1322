//! Read-only environment threaded through a simulation.
//!
//! Bundles the shared collaborators every battle borrows: configuration,
//! skill catalog, executor registry, plan cache, and the random source.
//! Everything here is immutable for the duration of a battle, which is why
//! a whole batch of battles can share one environment across threads.

use crate::cache::ResolutionCache;
use crate::config::EngineConfig;
use crate::plugin::PluginRegistry;
use crate::rng::BattleRng;
use crate::skill::SkillOracle;

#[derive(Clone, Copy)]
pub struct BattleEnv<'a> {
    pub config: &'a EngineConfig,
    pub skills: &'a (dyn SkillOracle + Sync),
    pub registry: &'a PluginRegistry,
    pub cache: &'a ResolutionCache,
    pub rng: &'a dyn BattleRng,
}

impl<'a> BattleEnv<'a> {
    pub fn new(
        config: &'a EngineConfig,
        skills: &'a (dyn SkillOracle + Sync),
        registry: &'a PluginRegistry,
        cache: &'a ResolutionCache,
        rng: &'a dyn BattleRng,
    ) -> Self {
        Self {
            config,
            skills,
            registry,
            cache,
            rng,
        }
    }
}
