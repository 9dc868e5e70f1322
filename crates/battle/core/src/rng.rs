//! Deterministic random number generation.
//!
//! All randomness in the engine flows through a single injectable source so
//! that identical inputs replay to identical battle results. Implementations
//! are stateless and seed-addressed: given the same seed they must produce
//! the same value, which keeps resolution order irrelevant to the outcome.

/// Seed-addressed random source for chance rolls.
///
/// Implementations must be deterministic: the same seed always yields the
/// same output. Chance rolls are never cached (see the resolution cache
/// contract), so every invocation re-rolls from a fresh seed.
pub trait BattleRng: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a d100 (1-100 inclusive).
    ///
    /// Percentage-based mechanics (control chance, resist checks) compare
    /// this roll against a threshold.
    fn roll_d100(&self, seed: u64) -> u32 {
        (self.next_u32(seed) % 100) + 1
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR produces 32-bit output from 64-bit state with a single
/// multiply, xorshift, and rotate. Deterministic, small, and of good
/// statistical quality.
///
/// Reference: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    /// Advance the LCG state by one step.
    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation: xorshift high bits, then random rotate.
    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl BattleRng for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::output(Self::step(seed))
    }
}

/// Test double that forces every d100 roll to a fixed value.
///
/// Supplying `roll: 1` makes every chance check succeed; `roll: 100` makes
/// every check below certainty fail. Used for scripted replay in tests.
#[derive(Clone, Copy, Debug)]
pub struct FixedRng {
    pub roll: u32,
}

impl BattleRng for FixedRng {
    fn next_u32(&self, _seed: u64) -> u32 {
        self.roll.saturating_sub(1)
    }

    fn roll_d100(&self, _seed: u64) -> u32 {
        self.roll
    }
}

/// Compute a deterministic seed from battle state components.
///
/// Combines the per-battle seed, the cast nonce (increments once per skill
/// resolution), the acting combatant, and a stream discriminator for
/// multiple independent rolls within one resolution:
///
/// - `0`: hit/resist check
/// - `1`: secondary roll (reserved)
///
/// Mixing constants are based on SplitMix64 and FxHash multipliers.
pub fn compute_seed(battle_seed: u64, nonce: u64, actor: u32, stream: u32) -> u64 {
    let mut hash = battle_seed;

    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (stream as u64).wrapping_mul(0x85ebca6b);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_output() {
        let rng = PcgRng;
        assert_eq!(rng.next_u32(42), rng.next_u32(42));
        assert_eq!(rng.roll_d100(7), rng.roll_d100(7));
    }

    #[test]
    fn d100_stays_in_range() {
        let rng = PcgRng;
        for seed in 0..1000u64 {
            let roll = rng.roll_d100(seed);
            assert!((1..=100).contains(&roll));
        }
    }

    #[test]
    fn seed_components_all_matter() {
        let base = compute_seed(1, 2, 3, 0);
        assert_ne!(base, compute_seed(9, 2, 3, 0));
        assert_ne!(base, compute_seed(1, 9, 3, 0));
        assert_ne!(base, compute_seed(1, 2, 9, 0));
        assert_ne!(base, compute_seed(1, 2, 3, 1));
    }

    #[test]
    fn fixed_rng_forces_rolls() {
        assert_eq!(FixedRng { roll: 1 }.roll_d100(123), 1);
        assert_eq!(FixedRng { roll: 100 }.roll_d100(456), 100);
    }
}
