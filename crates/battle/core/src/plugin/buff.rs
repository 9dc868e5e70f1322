//! Built-in buff/debuff executor.

use crate::plugin::{
    EffectExecutor, EffectOp, EffectPlan, PlanContext, StatusBlueprint,
};
use crate::status::{AttributeShift, StackingPolicy};

/// Plans an attribute-shifting status.
///
/// The shift is held open while the status is active and reverted by the
/// status manager on expiry or cleanse. A negative magnitude makes this a
/// debuff; the mechanics are identical. Replacement stacking means a
/// re-application swaps in the new shift rather than compounding it.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuffExecutor;

impl EffectExecutor for BuffExecutor {
    fn plan(&self, ctx: &PlanContext<'_>) -> EffectPlan {
        let shift = ctx.skill.attribute.map(|attribute| AttributeShift {
            attribute,
            delta: ctx.params.magnitude,
        });

        EffectPlan {
            chance: ctx.params.chance,
            ops: vec![EffectOp::AttachStatus(StatusBlueprint {
                recipient: ctx.primary_recipient(),
                category: ctx.skill.category,
                magnitude: ctx.params.magnitude,
                duration: ctx.params.duration,
                stacking: StackingPolicy::Replace,
                per_round: 0,
                shift,
            })],
        }
    }
}
