//! Deterministic action providers.

use std::collections::HashMap;
use std::sync::Arc;

use battle_core::{
    ActionProvider, BattleState, ChainCast, EffectCategory, HeroId, SkillBook, SkillOracle,
    TargetSelector,
};

enum Script {
    /// One cast list per round; rounds past the end pass.
    PerRound(Vec<Vec<ChainCast>>),
    /// The same cast list every round.
    EveryRound(Vec<ChainCast>),
}

/// Fixed per-hero scripts, for replayable scenarios and tests.
///
/// Heroes without a script pass every turn.
#[derive(Default)]
pub struct ScriptedProvider {
    scripts: HashMap<HeroId, Script>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives `hero` an explicit cast list per round.
    pub fn with_rounds(mut self, hero: HeroId, rounds: Vec<Vec<ChainCast>>) -> Self {
        self.scripts.insert(hero, Script::PerRound(rounds));
        self
    }

    /// Makes `hero` repeat the same casts every round.
    pub fn with_repeating(mut self, hero: HeroId, casts: Vec<ChainCast>) -> Self {
        self.scripts.insert(hero, Script::EveryRound(casts));
        self
    }
}

impl ActionProvider for ScriptedProvider {
    fn plan_turn(&self, state: &BattleState, actor: HeroId) -> Vec<ChainCast> {
        match self.scripts.get(&actor) {
            Some(Script::PerRound(rounds)) => rounds
                .get(state.round.saturating_sub(1) as usize)
                .cloned()
                .unwrap_or_default(),
            Some(Script::EveryRound(casts)) => casts.clone(),
            None => Vec::new(),
        }
    }
}

/// Single-cast greedy AI.
///
/// Picks the affordable known skill with the highest magnitude at its best
/// affordable level, breaking ties by lower skill id. Damage and control
/// skills target the enemy, everything else self-casts. Purely a function
/// of the visible state, so replays stay deterministic.
pub struct GreedyProvider {
    skills: Arc<SkillBook>,
}

impl GreedyProvider {
    pub fn new(skills: Arc<SkillBook>) -> Self {
        Self { skills }
    }
}

impl ActionProvider for GreedyProvider {
    fn plan_turn(&self, state: &BattleState, actor: HeroId) -> Vec<ChainCast> {
        let Some(hero) = state.hero(actor) else {
            return Vec::new();
        };
        let budget = hero.resource.current;

        let mut best: Option<(i32, u32, ChainCast)> = None;
        for &skill_id in &hero.skills {
            let Some(definition) = self.skills.skill(skill_id) else {
                continue;
            };
            // Highest level this hero can pay for.
            let candidate = (1..=definition.max_level())
                .rev()
                .find_map(|level| {
                    definition
                        .params_for(level)
                        .filter(|params| params.cost <= budget)
                        .map(|params| (level, params))
                });
            let Some((level, params)) = candidate else {
                continue;
            };

            let target = match definition.category {
                EffectCategory::Buff | EffectCategory::Other => TargetSelector::SelfCast,
                _ => TargetSelector::Enemy,
            };
            let cast = ChainCast {
                skill: skill_id,
                level,
                target,
            };
            let better = match &best {
                None => true,
                Some((magnitude, id, _)) => {
                    params.magnitude > *magnitude
                        || (params.magnitude == *magnitude && skill_id.0 < *id)
                }
            };
            if better {
                best = Some((params.magnitude, skill_id.0, cast));
            }
        }

        best.map(|(_, _, cast)| vec![cast]).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{
        AttributeSet, HeroDefinition, SideId, SkillDefinition, SkillId, SkillParams,
    };

    fn book() -> SkillBook {
        let mut book = SkillBook::new();
        for (id, magnitude, cost) in [(1u32, 20, 2), (2, 50, 8), (3, 50, 8)] {
            book.insert(SkillDefinition {
                id: SkillId(id),
                name: format!("skill-{id}"),
                category: EffectCategory::Damage,
                attribute: None,
                levels: vec![SkillParams {
                    magnitude,
                    chance: 100,
                    cost,
                    ..Default::default()
                }],
            });
        }
        book
    }

    fn state(resource: u32) -> BattleState {
        let definitions: Vec<_> = [(1, 0), (2, 1)]
            .into_iter()
            .map(|(id, side)| HeroDefinition {
                id: HeroId(id),
                name: format!("hero-{id}"),
                side: SideId(side),
                level: 1,
                max_hp: 100,
                max_resource: resource,
                attributes: AttributeSet::default(),
                skills: vec![SkillId(1), SkillId(2), SkillId(3)],
            })
            .collect();
        BattleState::new(&definitions, 0)
    }

    #[test]
    fn greedy_prefers_magnitude_then_lower_id() {
        let provider = GreedyProvider::new(Arc::new(book()));
        let casts = provider.plan_turn(&state(20), HeroId(1));
        assert_eq!(casts.len(), 1);
        // Skills 2 and 3 tie on magnitude 50; the lower id wins.
        assert_eq!(casts[0].skill, SkillId(2));
    }

    #[test]
    fn greedy_falls_back_to_what_it_can_afford() {
        let provider = GreedyProvider::new(Arc::new(book()));
        let casts = provider.plan_turn(&state(3), HeroId(1));
        assert_eq!(casts[0].skill, SkillId(1));
    }

    #[test]
    fn greedy_passes_when_broke() {
        let provider = GreedyProvider::new(Arc::new(book()));
        assert!(provider.plan_turn(&state(1), HeroId(1)).is_empty());
    }

    #[test]
    fn scripted_round_indexing() {
        let cast = ChainCast {
            skill: SkillId(1),
            level: 1,
            target: TargetSelector::Enemy,
        };
        let provider =
            ScriptedProvider::new().with_rounds(HeroId(1), vec![vec![], vec![cast]]);

        let mut state = state(10);
        state.round = 1;
        assert!(provider.plan_turn(&state, HeroId(1)).is_empty());
        state.round = 2;
        assert_eq!(provider.plan_turn(&state, HeroId(1)), vec![cast]);
        state.round = 3;
        assert!(provider.plan_turn(&state, HeroId(1)).is_empty());
        // Unscripted heroes pass.
        assert!(provider.plan_turn(&state, HeroId(2)).is_empty());
    }
}
