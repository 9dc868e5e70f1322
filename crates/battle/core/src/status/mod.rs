//! Status effects and the manager that owns their lifecycle.

mod effect;
mod manager;

pub use effect::{AttributeShift, StackingPolicy, StatusEffect, StatusEffects, StatusInstanceId};
pub use manager::StatusManager;
