//! Combatant identity, attributes, and per-battle state.
//!
//! [`HeroDefinition`] is the immutable input supplied by the data-loading
//! collaborator; [`HeroState`] is the working copy constructed once per
//! battle and destroyed when it ends. HP and resources are mutated by the
//! skill processor; the status list is owned exclusively by the status
//! manager.

use crate::skill::SkillId;
use crate::status::StatusEffects;

/// Identifies a combatant within one battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeroId(pub u32);

impl core::fmt::Display for HeroId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "hero#{}", self.0)
    }
}

/// Identifies a side (team). A battle ends when every combatant on a side
/// has been reduced to 0 HP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SideId(pub u8);

/// Named numeric attributes carried by every combatant.
///
/// The enum fixes the iteration order used for cache-key fingerprinting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Attribute {
    Attack,
    Defense,
    Speed,
    CritChance,
    CritDamage,
}

impl Attribute {
    /// All attributes in fingerprint order.
    pub const ALL: [Attribute; 5] = [
        Attribute::Attack,
        Attribute::Defense,
        Attribute::Speed,
        Attribute::CritChance,
        Attribute::CritDamage,
    ];
}

/// Attribute values for one combatant.
///
/// Kept as plain signed integers; percentages (crit chance, crit damage)
/// are stored as whole percent values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeSet {
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub crit_chance: i32,
    pub crit_damage: i32,
}

impl AttributeSet {
    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Attack => self.attack,
            Attribute::Defense => self.defense,
            Attribute::Speed => self.speed,
            Attribute::CritChance => self.crit_chance,
            Attribute::CritDamage => self.crit_damage,
        }
    }

    /// Shifts an attribute by a signed delta (buff apply or revert).
    pub fn shift(&mut self, attribute: Attribute, delta: i32) {
        let slot = match attribute {
            Attribute::Attack => &mut self.attack,
            Attribute::Defense => &mut self.defense,
            Attribute::Speed => &mut self.speed,
            Attribute::CritChance => &mut self.crit_chance,
            Attribute::CritDamage => &mut self.crit_damage,
        };
        *slot = slot.saturating_add(delta);
    }

    /// Writes every attribute value in fixed order into `out`.
    ///
    /// Used for resolution-key fingerprinting; the order must never change
    /// without invalidating all cached entries.
    pub fn fingerprint_into(&self, out: &mut Vec<u8>) {
        for attribute in Attribute::ALL {
            out.extend_from_slice(&self.get(attribute).to_le_bytes());
        }
    }
}

/// Current/maximum pair for a spendable resource pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: u32,
    pub maximum: u32,
}

impl ResourceMeter {
    pub fn full(maximum: u32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Spends `amount`, returning false (and leaving the pool untouched)
    /// if the balance is insufficient.
    pub fn spend(&mut self, amount: u32) -> bool {
        if self.current < amount {
            return false;
        }
        self.current -= amount;
        true
    }

    pub fn restore(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.maximum);
    }
}

/// Immutable combatant template supplied by the data-loading collaborator.
///
/// The engine performs no schema validation; definitions are assumed
/// well-formed by the time they reach a simulator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeroDefinition {
    pub id: HeroId,
    pub name: String,
    pub side: SideId,
    pub level: u16,
    pub max_hp: u32,
    pub max_resource: u32,
    pub attributes: AttributeSet,
    /// Skills this hero knows, in presentation order.
    pub skills: Vec<SkillId>,
}

/// Mutable per-battle combatant state.
///
/// Constructed once per battle from a [`HeroDefinition`]. HP and resource
/// mutations flow through the skill processor; the status list is mutated
/// only by [`crate::status::StatusManager`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeroState {
    pub id: HeroId,
    pub name: String,
    pub side: SideId,
    pub level: u16,
    pub hp: u32,
    pub max_hp: u32,
    pub resource: ResourceMeter,
    pub attributes: AttributeSet,
    pub skills: Vec<SkillId>,
    pub(crate) statuses: StatusEffects,
}

impl HeroState {
    pub fn from_definition(definition: &HeroDefinition) -> Self {
        Self {
            id: definition.id,
            name: definition.name.clone(),
            side: definition.side,
            level: definition.level,
            hp: definition.max_hp,
            max_hp: definition.max_hp,
            resource: ResourceMeter::full(definition.max_resource),
            attributes: definition.attributes,
            skills: definition.skills.clone(),
            statuses: StatusEffects::empty(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Applies damage clamped at 0 HP, returning the amount actually dealt.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        dealt
    }

    /// Heals clamped at max HP, returning the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max_hp - self.hp);
        self.hp += healed;
        healed
    }

    /// Read-only view of the active status list.
    pub fn statuses(&self) -> &StatusEffects {
        &self.statuses
    }
}
