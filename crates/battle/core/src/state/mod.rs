//! Battle state: combatants plus the bookkeeping one simulation needs.

mod hero;

pub use hero::{
    Attribute, AttributeSet, HeroDefinition, HeroId, HeroState, ResourceMeter, SideId,
};

use crate::log::EventLog;
use crate::status::StatusInstanceId;

/// Coarse lifecycle of one battle. Progression is strictly forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattlePhase {
    /// Hero states built, nothing simulated yet.
    Init,
    /// Between rounds.
    RoundLoop,
    /// Inside a round, executing turns and ticks.
    Resolving,
    /// Termination condition met, result being assembled.
    Ending,
    /// Result produced.
    Done,
}

/// The complete mutable state of one battle.
///
/// `heroes` keeps definition order; that order is the deterministic
/// tie-break wherever the engine iterates combatants. The seed, cast nonce,
/// and status-instance counter are private so every consumer draws from the
/// same monotonic sequences.
#[derive(Debug)]
pub struct BattleState {
    pub heroes: Vec<HeroState>,
    pub round: u32,
    pub phase: BattlePhase,
    pub log: EventLog,
    seed: u64,
    nonce: u64,
    next_instance: u32,
}

impl BattleState {
    pub fn new(definitions: &[HeroDefinition], seed: u64) -> Self {
        Self {
            heroes: definitions.iter().map(HeroState::from_definition).collect(),
            round: 0,
            phase: BattlePhase::Init,
            log: EventLog::new(),
            seed,
            nonce: 0,
            next_instance: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Next cast nonce. Increments once per skill resolution so every
    /// chance roll draws from a fresh seed.
    pub fn next_nonce(&mut self) -> u64 {
        let nonce = self.nonce;
        self.nonce += 1;
        nonce
    }

    /// Allocates a battle-unique status instance id.
    pub fn alloc_instance(&mut self) -> StatusInstanceId {
        let id = StatusInstanceId(self.next_instance);
        self.next_instance += 1;
        id
    }

    pub fn hero(&self, id: HeroId) -> Option<&HeroState> {
        self.heroes.iter().find(|h| h.id == id)
    }

    pub fn hero_mut(&mut self, id: HeroId) -> Option<&mut HeroState> {
        self.heroes.iter_mut().find(|h| h.id == id)
    }

    /// First living enemy of `side`, in definition order.
    pub fn first_living_enemy(&self, side: SideId) -> Option<&HeroState> {
        self.heroes
            .iter()
            .find(|h| h.side != side && h.is_alive())
    }

    pub fn side_alive(&self, side: SideId) -> bool {
        self.heroes.iter().any(|h| h.side == side && h.is_alive())
    }

    /// Sides with at least one living member, in definition order without
    /// duplicates.
    pub fn living_sides(&self) -> Vec<SideId> {
        let mut sides = Vec::new();
        for hero in &self.heroes {
            if hero.is_alive() && !sides.contains(&hero.side) {
                sides.push(hero.side);
            }
        }
        sides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definitions() -> Vec<HeroDefinition> {
        [(1, 0), (2, 0), (3, 1)]
            .into_iter()
            .map(|(id, side)| HeroDefinition {
                id: HeroId(id),
                name: format!("hero-{id}"),
                side: SideId(side),
                level: 1,
                max_hp: 50,
                max_resource: 10,
                attributes: AttributeSet::default(),
                skills: vec![],
            })
            .collect()
    }

    #[test]
    fn nonce_and_instance_sequences_are_monotonic() {
        let mut state = BattleState::new(&definitions(), 7);
        assert_eq!(state.next_nonce(), 0);
        assert_eq!(state.next_nonce(), 1);
        assert_eq!(state.alloc_instance(), StatusInstanceId(0));
        assert_eq!(state.alloc_instance(), StatusInstanceId(1));
    }

    #[test]
    fn side_queries_track_deaths() {
        let mut state = BattleState::new(&definitions(), 7);
        assert_eq!(state.living_sides(), vec![SideId(0), SideId(1)]);
        assert_eq!(
            state.first_living_enemy(SideId(1)).map(|h| h.id),
            Some(HeroId(1))
        );

        if let Some(hero) = state.hero_mut(HeroId(1)) {
            hero.apply_damage(50);
        }
        assert_eq!(
            state.first_living_enemy(SideId(1)).map(|h| h.id),
            Some(HeroId(2))
        );
        assert!(state.side_alive(SideId(0)));

        if let Some(hero) = state.hero_mut(HeroId(2)) {
            hero.apply_damage(50);
        }
        assert_eq!(state.living_sides(), vec![SideId(1)]);
        assert!(!state.side_alive(SideId(0)));
    }
}
