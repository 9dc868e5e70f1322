//! Built-in damage executor.

use crate::plugin::{EffectExecutor, EffectOp, EffectPlan, PlanContext, StatusBlueprint};
use crate::status::StackingPolicy;

/// Plans direct damage: `attack × magnitude%`, reduced by the target's
/// defense, floored at the configured minimum.
///
/// The defense reduction keeps its bite proportional across levels:
///
/// ```text
/// dealt = base · scale / (defense + scale),  scale = target_level·p1 + p2
/// ```
///
/// The scale term follows the defender's level, so a fixed defense value
/// blocks a shrinking fraction of damage as its owner levels up. All
/// arithmetic is integer; plans never roll dice.
///
/// A nonzero `per_round` with a positive duration additionally attaches a
/// damage-over-time status (unaffected by defense, per-tick flat amount).
#[derive(Clone, Copy, Debug, Default)]
pub struct DamageExecutor;

impl EffectExecutor for DamageExecutor {
    fn plan(&self, ctx: &PlanContext<'_>) -> EffectPlan {
        let config = ctx.config;
        let target = ctx.effective_target();

        let attack = i64::from(ctx.caster.attributes.attack.max(0));
        let base = attack * i64::from(ctx.params.magnitude.max(0)) / 100;

        let defense = i64::from(target.attributes.defense.max(0));
        let scale = i64::from(target.level) * i64::from(config.defense_scale_per_level)
            + i64::from(config.defense_scale_base);
        let reduced = base * scale / (defense + scale);
        let amount = reduced.max(i64::from(config.minimum_damage)) as u32;

        let mut ops = vec![EffectOp::Damage {
            recipient: ctx.primary_recipient(),
            amount,
        }];

        if ctx.params.per_round > 0 && ctx.params.duration > 0 {
            ops.push(EffectOp::AttachStatus(StatusBlueprint {
                recipient: ctx.primary_recipient(),
                category: ctx.skill.category,
                magnitude: ctx.params.per_round,
                duration: ctx.params.duration,
                stacking: StackingPolicy::Replace,
                per_round: ctx.params.per_round,
                shift: None,
            }));
        }

        EffectPlan {
            chance: ctx.params.chance,
            ops,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::skill::{EffectCategory, SkillDefinition, SkillId, SkillParams};
    use crate::state::AttributeSet;

    fn plan_with(
        attack: i32,
        magnitude: i32,
        defense: i32,
        caster_level: u16,
        target_level: u16,
    ) -> EffectPlan {
        let config = EngineConfig::new();
        let skill = SkillDefinition {
            id: SkillId(1),
            name: "Strike".into(),
            category: EffectCategory::Damage,
            attribute: None,
            levels: vec![SkillParams {
                magnitude,
                chance: 100,
                ..Default::default()
            }],
        };
        let ctx = PlanContext {
            config: &config,
            skill: &skill,
            level: 1,
            params: &skill.levels[0],
            caster: crate::plugin::CombatantSnapshot {
                level: caster_level,
                attributes: AttributeSet {
                    attack,
                    ..Default::default()
                },
            },
            target: Some(crate::plugin::CombatantSnapshot {
                level: target_level,
                attributes: AttributeSet {
                    defense,
                    ..Default::default()
                },
            }),
        };
        DamageExecutor.plan(&ctx)
    }

    #[test]
    fn zero_defense_takes_full_percent_of_attack() {
        let plan = plan_with(100, 20, 0, 10, 10);
        assert_eq!(plan.damage_magnitude(), 20);
    }

    #[test]
    fn defense_reduces_but_never_below_minimum() {
        let full = plan_with(100, 100, 0, 10, 10).damage_magnitude();
        let reduced = plan_with(100, 100, 500, 10, 10).damage_magnitude();
        assert!(reduced < full);
        assert!(reduced >= EngineConfig::DEFAULT_MINIMUM_DAMAGE);

        // Overwhelming defense still leaves the floor.
        let floored = plan_with(10, 10, 1_000_000, 1, 1).damage_magnitude();
        assert_eq!(floored, EngineConfig::DEFAULT_MINIMUM_DAMAGE);
    }

    #[test]
    fn higher_target_level_weakens_the_same_defense() {
        let low = plan_with(100, 100, 300, 10, 1).damage_magnitude();
        let high = plan_with(100, 100, 300, 10, 50).damage_magnitude();
        assert!(high > low);
    }

    #[test]
    fn reduction_is_keyed_on_the_target_level_not_the_caster() {
        let low_caster = plan_with(100, 100, 300, 1, 1).damage_magnitude();
        let high_caster = plan_with(100, 100, 300, 50, 1).damage_magnitude();
        assert_eq!(low_caster, high_caster);
        assert_eq!(low_caster, 67); // 100 · 615 / (300 + 615)
    }

    #[test]
    fn plans_are_pure() {
        assert_eq!(plan_with(80, 50, 120, 7, 7), plan_with(80, 50, 120, 7, 7));
    }
}
