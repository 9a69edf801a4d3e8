//! Generic patch-based undo/redo.
//!
//! This module knows nothing about tabletops. Any value that can diff itself
//! into [`Patch`]es ([`Patchable`]) and carries an operation tag ([`Tagged`])
//! can be wrapped in a [`History`].
//!
//! ## Transactions
//!
//! A mutation runs against a copy of the present value. The copy is diffed
//! against the original to produce a forward patch and its inverse; only
//! then does the copy become the new present. With persistent (`im`)
//! collections the copy shares everything the mutation did not touch.
//!
//! ## Failure Semantics
//!
//! Nothing here fails loudly. A missing history, an empty undo or redo
//! stack, or a patch that no longer fits the present value all leave the
//! history unchanged and report `false`.

mod engine;
mod patch;

pub use engine::{with_history, EntryOf, History, HistoryEntry, Tagged};
pub use patch::{apply_patch, Change, Patch, PatchError, Patchable};
