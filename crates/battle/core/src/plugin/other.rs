//! Built-in healing/regeneration executor.

use crate::plugin::{
    EffectExecutor, EffectOp, EffectPlan, PlanContext, StatusBlueprint,
};
use crate::status::StackingPolicy;

/// Plans a flat heal, optionally followed by a regeneration status.
///
/// `magnitude` heals immediately. A negative `per_round` with a positive
/// duration attaches a status whose end-of-round tick restores HP (the
/// status manager treats negative recurring magnitudes as healing).
#[derive(Clone, Copy, Debug, Default)]
pub struct OtherExecutor;

impl EffectExecutor for OtherExecutor {
    fn plan(&self, ctx: &PlanContext<'_>) -> EffectPlan {
        let mut ops = Vec::new();

        if ctx.params.magnitude > 0 {
            ops.push(EffectOp::Heal {
                recipient: ctx.primary_recipient(),
                amount: ctx.params.magnitude as u32,
            });
        }

        if ctx.params.per_round < 0 && ctx.params.duration > 0 {
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
    use crate::plugin::{CombatantSnapshot, Recipient};
    use crate::skill::{EffectCategory, SkillDefinition, SkillId, SkillParams};
    use crate::state::AttributeSet;

    fn plan(magnitude: i32, per_round: i32, duration: u32) -> EffectPlan {
        let config = EngineConfig::new();
        let skill = SkillDefinition {
            id: SkillId(9),
            name: "Mend".into(),
            category: EffectCategory::Other,
            attribute: None,
            levels: vec![SkillParams {
                magnitude,
                per_round,
                duration,
                chance: 100,
                ..Default::default()
            }],
        };
        OtherExecutor.plan(&PlanContext {
            config: &config,
            skill: &skill,
            level: 1,
            params: &skill.levels[0],
            caster: CombatantSnapshot {
                level: 5,
                attributes: AttributeSet::default(),
            },
            target: None,
        })
    }

    #[test]
    fn flat_heal_only() {
        let plan = plan(25, 0, 0);
        assert_eq!(
            plan.ops,
            vec![EffectOp::Heal {
                recipient: Recipient::Caster,
                amount: 25,
            }]
        );
    }

    #[test]
    fn regeneration_attaches_a_healing_status() {
        let plan = plan(10, -5, 3);
        assert_eq!(plan.ops.len(), 2);
        match &plan.ops[1] {
            EffectOp::AttachStatus(blueprint) => {
                assert_eq!(blueprint.per_round, -5);
                assert_eq!(blueprint.duration, 3);
            }
            other => panic!("unexpected op: {other:?}"),
        }
    }
}
