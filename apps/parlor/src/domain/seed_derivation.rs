//! RNG seed derivation for deterministic shuffles.
//!
//! Each game holds one 32-byte seed. Every shuffle the game performs derives
//! its own seed from (game seed, shuffle counter), so replaying a game from
//! its stored state reproduces the same deals.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Draw a fresh game seed from the OS-backed thread RNG.
pub fn fresh_game_seed() -> [u8; 32] {
    let mut seed = [0u8; 32];
    rand::rng().fill(&mut seed);
    seed
}

/// Derive the seed for the `counter`-th shuffle of a game.
///
/// # Arguments
///
/// * `game_seed` - Base seed of the game
/// * `counter` - Monotonic shuffle counter held in the game state
///
/// # Returns
///
/// A seed unique per (game, counter) combination.
pub fn derive_shuffle_seed(game_seed: &[u8; 32], counter: u32) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_keyed(game_seed);
    hasher.update(b"shuffle");
    hasher.update(&counter.to_le_bytes());
    *hasher.finalize().as_bytes()
}

/// Per-game shuffle source, serialized alongside the game state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ShuffleSeed {
    seed: [u8; 32],
    counter: u32,
}

impl ShuffleSeed {
    pub fn new(seed: [u8; 32]) -> Self {
        Self { seed, counter: 0 }
    }

    /// RNG for the next shuffle; advances the counter.
    pub fn next_rng(&mut self) -> ChaCha20Rng {
        let derived = derive_shuffle_seed(&self.seed, self.counter);
        self.counter = self.counter.wrapping_add(1);
        ChaCha20Rng::from_seed(derived)
    }
}
