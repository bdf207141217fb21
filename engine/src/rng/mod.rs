//! Deterministic random number generation.
//!
//! All randomness in the simulator goes through `SeededRng` so that a game
//! replayed from the same seed produces an identical demand schedule. The
//! generator is xorshift64*, which is small, fast, and good enough for
//! sampling weekly demand quantities.

use serde::{Deserialize, Serialize};

/// Deterministic xorshift64* generator.
///
/// Same seed, same sequence. The internal state is serialized into
/// checkpoints so a restored game continues the exact stream.
///
/// # Example
/// ```
/// use beergame_simulator_core_rs::rng::SeededRng;
///
/// let mut rng = SeededRng::new(42);
/// let demand = rng.range_u32(2, 9); // [2, 9)
/// assert!(demand >= 2 && demand < 9);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Create a generator from a seed. A zero seed is remapped to 1
    /// (xorshift state must be nonzero).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Advance the state and return the next raw 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Uniform value in `[min, max)`.
    ///
    /// # Panics
    /// Panics if `min >= max`.
    pub fn range_u32(&mut self, min: u32, max: u32) -> u32 {
        assert!(min < max, "min must be less than max");
        let span = (max - min) as u64;
        min + (self.next_u64() % span) as u32
    }

    /// Current internal state, for checkpointing.
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Restore a generator from a checkpointed state.
    pub fn from_state(state: u64) -> Self {
        Self::new(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_sequence() {
        let mut a = SeededRng::new(12345);
        let mut b = SeededRng::new(12345);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_zero_seed_remapped() {
        let rng = SeededRng::new(0);
        assert_ne!(rng.state(), 0);
    }

    #[test]
    fn test_range_bounds() {
        let mut rng = SeededRng::new(7);
        for _ in 0..1000 {
            let v = rng.range_u32(2, 9);
            assert!((2..9).contains(&v));
        }
    }

    #[test]
    #[should_panic(expected = "min must be less than max")]
    fn test_range_invalid_bounds() {
        let mut rng = SeededRng::new(1);
        rng.range_u32(5, 5);
    }

    #[test]
    fn test_state_round_trip() {
        let mut rng = SeededRng::new(99);
        rng.next_u64();
        let saved = rng.state();

        let mut restored = SeededRng::from_state(saved);
        assert_eq!(restored.next_u64(), rng.next_u64());
    }
}
