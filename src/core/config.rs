//! Tabletop configuration.
//!
//! The embedding application supplies a `TabletopConfig` when it creates the
//! `Tabletops` container. The crate never reads configuration from disk.

use serde::{Deserialize, Serialize};

use crate::cards::Side;

/// Default bound on undo depth.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Configuration shared by every tabletop in a `Tabletops` container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabletopConfig {
    /// Maximum number of undo steps kept per tabletop (default: 100).
    /// The oldest step is evicted once this is exceeded.
    pub max_history: usize,

    /// Side shown by freshly dealt card instances.
    pub dealt_side: Side,

    /// Seed for the session `SeedSource`.
    /// Same seed produces the same sequence of shuffle seeds.
    pub seed: u64,
}

impl Default for TabletopConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            dealt_side: Side::Front,
            seed: 42,
        }
    }
}

impl TabletopConfig {
    /// Set the undo depth bound.
    #[must_use]
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    /// Set the side shown by freshly dealt instances.
    #[must_use]
    pub fn with_dealt_side(mut self, side: Side) -> Self {
        self.dealt_side = side;
        self
    }

    /// Set the seed source seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
