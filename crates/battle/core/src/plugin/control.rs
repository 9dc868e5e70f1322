//! Built-in control executor.

use crate::plugin::{
    EffectExecutor, EffectOp, EffectPlan, PlanContext, StatusBlueprint,
};
use crate::status::StackingPolicy;

/// Plans a control status (stun, freeze, root) on the target.
///
/// The per-level chance becomes the plan's hit chance, so a resisted roll
/// leaves the target untouched and shows up as a `Resisted` log entry. A
/// landed control refreshes rather than stacks: re-applying resets the
/// duration instead of queueing a second lockout.
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlExecutor;

impl EffectExecutor for ControlExecutor {
    fn plan(&self, ctx: &PlanContext<'_>) -> EffectPlan {
        EffectPlan {
            chance: ctx.params.chance,
            ops: vec![EffectOp::AttachStatus(StatusBlueprint {
                recipient: ctx.primary_recipient(),
                category: ctx.skill.category,
                magnitude: ctx.params.magnitude,
                duration: ctx.params.duration,
                stacking: StackingPolicy::Replace,
                per_round: 0,
                shift: None,
            })],
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

    #[test]
    fn plan_carries_chance_and_duration() {
        let config = EngineConfig::new();
        let skill = SkillDefinition {
            id: SkillId(3),
            name: "Stun".into(),
            category: EffectCategory::Control,
            attribute: None,
            levels: vec![SkillParams {
                duration: 2,
                chance: 60,
                ..Default::default()
            }],
        };
        let snapshot = CombatantSnapshot {
            level: 5,
            attributes: AttributeSet::default(),
        };
        let plan = ControlExecutor.plan(&PlanContext {
            config: &config,
            skill: &skill,
            level: 1,
            params: &skill.levels[0],
            caster: snapshot,
            target: Some(snapshot),
        });

        assert_eq!(plan.chance, 60);
        match &plan.ops[..] {
            [EffectOp::AttachStatus(blueprint)] => {
                assert_eq!(blueprint.recipient, Recipient::Target);
                assert_eq!(blueprint.category, EffectCategory::Control);
                assert_eq!(blueprint.duration, 2);
                assert_eq!(blueprint.stacking, StackingPolicy::Replace);
            }
            other => panic!("unexpected ops: {other:?}"),
        }
    }
}
