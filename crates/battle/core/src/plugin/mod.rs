//! Effect executor seam and the registry that dispatches on category.
//!
//! Adding a new kind of skill effect means implementing [`EffectExecutor`]
//! and registering it under an [`EffectCategory`]; nothing in the resolution
//! pipeline changes. Executors are planners, not appliers: `plan` is a pure
//! function of its inputs and returns an [`EffectPlan`] describing the state
//! mutations to make. The skill processor rolls the hit chance and applies
//! the ops; keeping randomness and mutation out of executors is what makes
//! plans safe to cache.

mod buff;
mod control;
mod damage;
mod other;

pub use buff::BuffExecutor;
pub use control::ControlExecutor;
pub use damage::DamageExecutor;
pub use other::OtherExecutor;

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::skill::{EffectCategory, SkillDefinition, SkillParams};
use crate::state::AttributeSet;
use crate::status::{AttributeShift, StackingPolicy};

/// Who an effect op lands on, relative to the cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Recipient {
    Caster,
    /// The cast's target; falls back to the caster for self-casts.
    Target,
}

/// Everything the status manager needs to mint a status instance.
///
/// Blueprints carry no instance id: ids are allocated at apply time so a
/// cached plan replayed twice still produces distinct instances.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusBlueprint {
    pub recipient: Recipient,
    pub category: EffectCategory,
    pub magnitude: i32,
    pub duration: u32,
    pub stacking: StackingPolicy,
    pub per_round: i32,
    pub shift: Option<AttributeShift>,
}

/// One planned state mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectOp {
    Damage { recipient: Recipient, amount: u32 },
    Heal { recipient: Recipient, amount: u32 },
    AttachStatus(StatusBlueprint),
}

/// Deterministic resolution output: the hit chance and the ops to apply on
/// a successful roll. This is the value stored in the resolution cache.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectPlan {
    /// Success chance in whole percent. The processor rolls a d100 per
    /// invocation; the roll itself is never part of the plan.
    pub chance: u32,
    pub ops: Vec<EffectOp>,
}

impl EffectPlan {
    /// Largest damage amount among the plan's ops. Used by greedy action
    /// providers to rank skills; zero for non-damaging plans.
    pub fn damage_magnitude(&self) -> u32 {
        self.ops
            .iter()
            .filter_map(|op| match op {
                EffectOp::Damage { amount, .. } => Some(*amount),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }
}

/// Read-only view of one combatant at plan time. Also the exact data that
/// feeds the resolution-key fingerprint, so anything a planner can observe
/// is captured by the cache key.
#[derive(Clone, Copy, Debug)]
pub struct CombatantSnapshot {
    pub level: u16,
    pub attributes: AttributeSet,
}

/// Inputs to one plan computation.
pub struct PlanContext<'a> {
    pub config: &'a EngineConfig,
    pub skill: &'a SkillDefinition,
    pub level: u16,
    pub params: &'a SkillParams,
    pub caster: CombatantSnapshot,
    pub target: Option<CombatantSnapshot>,
}

impl PlanContext<'_> {
    /// Target snapshot, falling back to the caster for self-casts.
    pub fn effective_target(&self) -> CombatantSnapshot {
        self.target.unwrap_or(self.caster)
    }

    /// Recipient the primary effect lands on.
    pub fn primary_recipient(&self) -> Recipient {
        if self.target.is_some() {
            Recipient::Target
        } else {
            Recipient::Caster
        }
    }
}

/// A planner for one effect category.
///
/// Implementations must be pure: the same context always yields the same
/// plan. Anything random belongs in the processor's chance roll.
pub trait EffectExecutor: Send + Sync {
    fn plan(&self, ctx: &PlanContext<'_>) -> EffectPlan;
}

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no executor registered for effect category {0}")]
    UnknownEffectCategory(EffectCategory),
}

/// Category-keyed executor table.
///
/// Registration replaces any previous executor for the category, so callers
/// can override a built-in by registering after [`with_builtins`].
///
/// [`with_builtins`]: PluginRegistry::with_builtins
#[derive(Clone, Default)]
pub struct PluginRegistry {
    executors: HashMap<EffectCategory, Arc<dyn EffectExecutor>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the four built-in executors.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(EffectCategory::Damage, Arc::new(DamageExecutor));
        registry.register(EffectCategory::Control, Arc::new(ControlExecutor));
        registry.register(EffectCategory::Buff, Arc::new(BuffExecutor));
        registry.register(EffectCategory::Other, Arc::new(OtherExecutor));
        registry
    }

    /// Registers an executor for a category. Last registration wins.
    pub fn register(&mut self, category: EffectCategory, executor: Arc<dyn EffectExecutor>) {
        self.executors.insert(category, executor);
    }

    pub fn get(&self, category: EffectCategory) -> Result<&dyn EffectExecutor, RegistryError> {
        self.executors
            .get(&category)
            .map(Arc::as_ref)
            .ok_or(RegistryError::UnknownEffectCategory(category))
    }

    pub fn is_registered(&self, category: EffectCategory) -> bool {
        self.executors.contains_key(&category)
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

impl core::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut categories: Vec<_> = self.executors.keys().collect();
        categories.sort_by_key(|c| format!("{c}"));
        f.debug_struct("PluginRegistry")
            .field("categories", &categories)
            .finish()
    }
}
