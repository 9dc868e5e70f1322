/// Engine configuration constants and tunable parameters.
///
/// Constructed explicitly and carried inside [`crate::env::BattleEnv`] so
/// tests can build isolated configurations; there is no ambient global state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Hard cap on simulated rounds. Reaching it ends the battle as a draw;
    /// an infinite-combat condition is a designed outcome, not a fault.
    pub max_rounds: u32,

    /// Total capacity of the shared resolution cache (entries, not bytes).
    pub cache_capacity: usize,

    /// Per-level scaling term in the defense reduction denominator.
    pub defense_scale_per_level: u32,

    /// Flat term in the defense reduction denominator.
    pub defense_scale_base: u32,

    /// Floor applied to every damage plan after defense reduction.
    pub minimum_damage: u32,
}

impl EngineConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum combatants per battle across all sides.
    pub const MAX_COMBATANTS: usize = 16;
    /// Maximum active status effects per combatant.
    pub const MAX_STATUS_EFFECTS: usize = 16;
    /// Maximum casts in a single skill chain.
    pub const MAX_CHAIN_CASTS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_ROUNDS: u32 = 50;
    pub const DEFAULT_CACHE_CAPACITY: usize = 4096;
    pub const DEFAULT_DEFENSE_SCALE_PER_LEVEL: u32 = 15;
    pub const DEFAULT_DEFENSE_SCALE_BASE: u32 = 600;
    pub const DEFAULT_MINIMUM_DAMAGE: u32 = 1;

    pub fn new() -> Self {
        Self {
            max_rounds: Self::DEFAULT_MAX_ROUNDS,
            cache_capacity: Self::DEFAULT_CACHE_CAPACITY,
            defense_scale_per_level: Self::DEFAULT_DEFENSE_SCALE_PER_LEVEL,
            defense_scale_base: Self::DEFAULT_DEFENSE_SCALE_BASE,
            minimum_damage: Self::DEFAULT_MINIMUM_DAMAGE,
        }
    }

    pub fn with_max_rounds(max_rounds: u32) -> Self {
        Self {
            max_rounds,
            ..Self::new()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
