//! Session seed source for shuffles.
//!
//! Shuffles on a tabletop are parameterized by an explicit [`Seed`] so that
//! they can be replayed. When a user presses "shuffle", something still has
//! to pick that seed; `SeedSource` does so deterministically.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same session seed produces identical seed sequence
//! - **Serializable**: O(1) state capture and restore, so a resumed session
//!   keeps drawing where it left off
//!
//! ```
//! use card_tabletop::core::SeedSource;
//!
//! let mut a = SeedSource::new(42);
//! let mut b = SeedSource::new(42);
//!
//! assert_eq!(a.next_seed(), b.next_seed());
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::shuffle::Seed;

/// Deterministic source of shuffle seeds.
///
/// Uses ChaCha8 so a saved `SeedSourceState` restores the exact stream.
#[derive(Clone, Debug)]
pub struct SeedSource {
    inner: ChaCha8Rng,
    seed: u64,
}

impl SeedSource {
    /// Create a new source with the given session seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Draw the next shuffle seed.
    pub fn next_seed(&mut self) -> Seed {
        Seed::Number(self.inner.gen())
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> SeedSourceState {
        SeedSourceState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &SeedSourceState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable `SeedSource` state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSourceState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}
