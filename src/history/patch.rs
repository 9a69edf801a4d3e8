//! Structural patches.
//!
//! A patch is a list of `(path, previous value, next value)` changes. The
//! inverse of a patch swaps previous and next and replays in reverse order.
//! Applying a patch checks every change's previous value against the target
//! before writing, so a patch recorded against one state is never silently
//! replayed onto another.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use std::fmt::Debug;

/// Failure to apply a patch.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PatchError {
    /// The target's current value at `path` is not the change's previous value.
    #[error("patch conflict at {path}: target does not hold the recorded previous value")]
    Conflict { path: String },

    /// The value kind does not belong at `path`.
    #[error("value of the wrong kind for {path}")]
    ValueMismatch { path: String },

    /// `path` cannot be removed, only overwritten.
    #[error("{path} cannot be removed")]
    Required { path: String },
}

impl PatchError {
    /// Conflict at a debug-printed path.
    pub fn conflict(path: &impl Debug) -> Self {
        PatchError::Conflict { path: format!("{path:?}") }
    }

    /// Value mismatch at a debug-printed path.
    pub fn value_mismatch(path: &impl Debug) -> Self {
        PatchError::ValueMismatch { path: format!("{path:?}") }
    }

    /// Removal of a required path.
    pub fn required(path: &impl Debug) -> Self {
        PatchError::Required { path: format!("{path:?}") }
    }
}

/// One recorded assignment. `None` means the entry is absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change<P, V> {
    pub path: P,
    pub prev: Option<V>,
    pub next: Option<V>,
}

impl<P: Clone, V: Clone> Change<P, V> {
    /// Create a change.
    #[must_use]
    pub fn new(path: P, prev: Option<V>, next: Option<V>) -> Self {
        Self { path, prev, next }
    }

    /// The same change with previous and next swapped.
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            path: self.path.clone(),
            prev: self.next.clone(),
            next: self.prev.clone(),
        }
    }
}

/// An ordered list of changes.
///
/// Most tabletop mutations touch a handful of paths (two stacks, the
/// operation tag), so four changes are stored inline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch<P, V> {
    changes: SmallVec<[Change<P, V>; 4]>,
}

impl<P: Clone, V: Clone> Patch<P, V> {
    /// Create an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            changes: SmallVec::new(),
        }
    }

    /// Append a change.
    pub fn push(&mut self, change: Change<P, V>) {
        self.changes.push(change);
    }

    /// Record a change of `path` from `prev` to `next`.
    pub fn record(&mut self, path: P, prev: Option<V>, next: Option<V>) {
        self.push(Change::new(path, prev, next));
    }

    /// Number of changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Check if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Iterate changes in application order.
    pub fn iter(&self) -> impl Iterator<Item = &Change<P, V>> {
        self.changes.iter()
    }

    /// The patch undoing this one.
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            changes: self.changes.iter().rev().map(Change::inverted).collect(),
        }
    }
}

impl<P: Clone, V: Clone> Default for Patch<P, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone, V: Clone> FromIterator<Change<P, V>> for Patch<P, V> {
    fn from_iter<I: IntoIterator<Item = Change<P, V>>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

/// A value that can be diffed into patches and patched back.
///
/// Implementors choose their own path and value vocabulary. Paths should be
/// disjoint (no path nested inside another) so a patch's changes commute.
pub trait Patchable: Clone {
    /// Address of one replaceable part.
    type Path: Clone + Debug + PartialEq;

    /// Value stored at a path.
    type Value: Clone + Debug + PartialEq;

    /// Changes turning `self` into `next`.
    fn diff(&self, next: &Self) -> Patch<Self::Path, Self::Value>;

    /// Current value at `path`, `None` if absent.
    fn read(&self, path: &Self::Path) -> Option<Self::Value>;

    /// Assign (`Some`) or remove (`None`) the value at `path`.
    fn write(&mut self, path: &Self::Path, value: Option<&Self::Value>) -> Result<(), PatchError>;
}

/// Apply `patch` to a copy of `target`.
///
/// All-or-nothing: on error the caller keeps `target` as it was.
pub fn apply_patch<T: Patchable>(target: &T, patch: &Patch<T::Path, T::Value>) -> Result<T, PatchError> {
    let mut next = target.clone();
    for change in patch.iter() {
        if next.read(&change.path) != change.prev {
            return Err(PatchError::conflict(&change.path));
        }
        next.write(&change.path, change.next.as_ref())?;
    }
    Ok(next)
}
