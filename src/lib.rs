//! # card-tabletop
//!
//! A virtual tabletop for arranging a deck's cards into stacks, with
//! undo/redo for every arrangement step.
//!
//! ## Design Principles
//!
//! 1. **Reversible by Construction**: Every mutation runs as a transaction
//!    against a copy of the present snapshot. The diff between the two is
//!    recorded as a forward patch plus its inverse, so undo never has to
//!    know what the mutation meant.
//!
//! 2. **Silent on Stale Ids**: Operations name stacks, instances and decks by
//!    id. An id that no longer resolves makes the call a no-op rather than an
//!    error; nothing is recorded.
//!
//! 3. **Reproducible Shuffles**: A shuffle is a pure function of its input
//!    order and seed. The seed is kept in the operation tag, so redo replays
//!    the same permutation.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: Snapshots use `im` collections, so the
//!   per-transaction copy is O(1) and a diff compares shared subtrees by
//!   pointer.
//!
//! - **Closed Operation Tags**: Each recorded step carries an [`Operation`]
//!   describing the call, used only for notification text.
//!
//! ## Modules
//!
//! - `core`: Identifiers, configuration, session seed source
//! - `cards`: Card instances and their visible side
//! - `history`: Generic patch-based undo/redo
//! - `shuffle`: Mulberry32 generator and keyed stable shuffle
//! - `stacks`: Tabletop snapshot, operation tags, snapshot mutations
//! - `tabletop`: Per-deck tabletops and the deck-keyed registry

pub mod core;
pub mod cards;
pub mod history;
pub mod shuffle;
pub mod stacks;
pub mod tabletop;

// Re-export commonly used types
pub use crate::core::{
    CardId, CardInstanceId, DeckId, StackId,
    SeedSource, SeedSourceState,
    TabletopConfig, DEFAULT_MAX_HISTORY,
};

pub use crate::cards::{CardInstance, Side};

pub use crate::history::{
    with_history, apply_patch,
    History, HistoryEntry, Patch, Change, PatchError, Patchable, Tagged,
};

pub use crate::shuffle::{seeded_shuffle, Mulberry32, Seed};

pub use crate::stacks::{
    Snapshot, Stack, Operation, Notification,
    CardSelection, StackSelection, Destination, StackEnd,
    Placement, Position, Facing, OrderMethod,
};

pub use crate::tabletop::{Tabletop, Tabletops};
