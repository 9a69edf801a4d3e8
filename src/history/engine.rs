//! Transactional undo/redo over a patchable snapshot.

use std::collections::VecDeque;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::patch::{apply_patch, Patch, Patchable};
use crate::core::DEFAULT_MAX_HISTORY;

/// A patchable value carrying an operation tag.
///
/// The tag describes the mutation that produced the value. It is only read
/// to build notification text, never for correctness.
pub trait Tagged: Patchable {
    /// Operation tag type.
    type Operation: Clone + Debug + PartialEq;

    /// Tag of the mutation that produced this value.
    fn operation(&self) -> &Self::Operation;

    /// Replace the tag.
    fn set_operation(&mut self, operation: Self::Operation);

    /// Reserved tag for a value with no history behind it.
    fn reset_operation() -> Self::Operation;

    /// Whether `path` addresses the operation tag.
    fn is_tag_path(path: &Self::Path) -> bool;
}

/// One undo step: a forward patch and its exact inverse.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry<P, V> {
    pub forward: Patch<P, V>,
    pub inverse: Patch<P, V>,
}

impl<P: Clone, V: Clone> HistoryEntry<P, V> {
    /// Entry for `forward`, deriving the inverse.
    #[must_use]
    pub fn new(forward: Patch<P, V>) -> Self {
        let inverse = forward.inverted();
        Self { forward, inverse }
    }
}

/// History entry type for a snapshot type.
pub type EntryOf<T> = HistoryEntry<<T as Patchable>::Path, <T as Patchable>::Value>;

/// Bounded undo/redo history around a present value.
///
/// ## Semantics
///
/// - `apply()`: mutate a copy of `present`, record `{forward, inverse}` in
///   `past` (evicting the oldest beyond `max_history`), clear `future`.
///   `future` is cleared even when nothing was recorded
/// - `undo()`: replay the newest inverse, move the entry to the front of `future`
/// - `redo()`: replay the first forward, move the entry back onto `past`
///
/// Every operation is a no-op on an empty stack. Nothing here returns an
/// error; the `bool` results only report whether anything changed.
///
/// ## Example
///
/// ```
/// use card_tabletop::history::History;
/// use card_tabletop::stacks::{Operation, Snapshot};
///
/// let mut history = History::new(Snapshot::empty());
/// assert!(!history.undo());
/// assert_eq!(history.present().operation, Operation::Reset);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize, T::Path: Serialize, T::Value: Serialize",
    deserialize = "T: Deserialize<'de>, T::Path: Deserialize<'de>, T::Value: Deserialize<'de>"
))]
pub struct History<T: Tagged> {
    past: VecDeque<EntryOf<T>>,
    present: T,
    future: VecDeque<EntryOf<T>>,
    max_history: usize,
}

impl<T: Tagged> History<T> {
    /// Create a history with the default depth bound.
    #[must_use]
    pub fn new(present: T) -> Self {
        Self::with_max_history(present, DEFAULT_MAX_HISTORY)
    }

    /// Create a history keeping at most `max_history` undo steps.
    #[must_use]
    pub fn with_max_history(present: T, max_history: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present,
            future: VecDeque::new(),
            max_history,
        }
    }

    /// The current value.
    #[must_use]
    pub fn present(&self) -> &T {
        &self.present
    }

    /// Undo entries, oldest first.
    #[must_use]
    pub fn past(&self) -> &VecDeque<EntryOf<T>> {
        &self.past
    }

    /// Redo entries, next first.
    #[must_use]
    pub fn future(&self) -> &VecDeque<EntryOf<T>> {
        &self.future
    }

    /// Number of undo steps available.
    #[must_use]
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    /// Number of redo steps available.
    #[must_use]
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// Depth bound.
    #[must_use]
    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Check if `undo()` would change anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Check if `redo()` would change anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Run `mutate` as one undoable step tagged `operation`.
    ///
    /// A mutation that changes nothing besides the tag records nothing, but
    /// still clears `future` and leaves `present` untouched. `mutate` must not
    /// touch this history itself.
    ///
    /// Returns true if a step was recorded.
    pub fn apply<F>(&mut self, operation: T::Operation, mutate: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let mut draft = self.present.clone();
        draft.set_operation(operation);
        mutate(&mut draft);

        let forward = self.present.diff(&draft);
        if forward.iter().all(|change| T::is_tag_path(&change.path)) {
            debug!(operation = ?draft.operation(), "mutation changed nothing; no history entry");
            self.future.clear();
            return false;
        }
        debug!(changes = forward.len(), operation = ?draft.operation(), "recording history entry");

        self.past.push_back(HistoryEntry::new(forward));
        while self.past.len() > self.max_history {
            self.past.pop_front();
            trace!(max_history = self.max_history, "evicted oldest history entry");
        }
        self.present = draft;
        self.future.clear();
        true
    }

    /// Step back once. Returns true if `present` changed.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.past.pop_back() else {
            return false;
        };

        match apply_patch(&self.present, &entry.inverse) {
            Ok(previous) => {
                debug!(operation = ?self.present.operation(), "undo");
                self.present = previous;
                self.future.push_front(entry);
                true
            }
            Err(err) => {
                warn!(%err, "undo patch does not fit present; history left unchanged");
                self.past.push_back(entry);
                false
            }
        }
    }

    /// Step forward once. Returns true if `present` changed.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.future.pop_front() else {
            return false;
        };

        match apply_patch(&self.present, &entry.forward) {
            Ok(next) => {
                self.present = next;
                debug!(operation = ?self.present.operation(), "redo");
                self.past.push_back(entry);
                true
            }
            Err(err) => {
                warn!(%err, "redo patch does not fit present; history left unchanged");
                self.future.push_front(entry);
                false
            }
        }
    }

    /// What `present` would become after `undo()`, without undoing.
    #[must_use]
    pub fn peek_undo(&self) -> Option<T> {
        let entry = self.past.back()?;
        apply_patch(&self.present, &entry.inverse).ok()
    }

    /// What `present` would become after `redo()`, without redoing.
    #[must_use]
    pub fn peek_redo(&self) -> Option<T> {
        let entry = self.future.front()?;
        apply_patch(&self.present, &entry.forward).ok()
    }

    /// Tag of the step `undo()` would revert.
    #[must_use]
    pub fn pending_undo_operation(&self) -> Option<&T::Operation> {
        self.can_undo().then(|| self.present.operation())
    }

    /// Tag of the step `redo()` would replay.
    #[must_use]
    pub fn pending_redo_operation(&self) -> Option<T::Operation> {
        self.peek_redo().map(|next| next.operation().clone())
    }

    /// Drop all steps and mark `present` with the reserved reset tag.
    ///
    /// Used when stored patches cannot be trusted across a schema change.
    pub fn collapse(&mut self) {
        self.past.clear();
        self.future.clear();
        self.present.set_operation(T::reset_operation());
    }

    /// Drop all steps, keeping `present` and its tag.
    pub fn clear_history(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// Mutate `present` outside of history.
    ///
    /// Recorded patches cannot be reconciled with an untracked change, so if
    /// `rewrite` changes anything both `past` and `future` are cleared.
    /// Returns true if `present` changed.
    pub fn rewrite_untracked<F>(&mut self, rewrite: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let mut draft = self.present.clone();
        rewrite(&mut draft);
        if self.present.diff(&draft).is_empty() {
            return false;
        }
        self.present = draft;
        self.clear_history();
        true
    }
}

/// Run `mutate` against the history `locate` finds inside `container`.
///
/// A container without a matching history (a stale id) is a silent no-op.
/// Returns true if a step was recorded.
pub fn with_history<C, T, L, F>(container: &mut C, locate: L, operation: T::Operation, mutate: F) -> bool
where
    T: Tagged,
    L: FnOnce(&mut C) -> Option<&mut History<T>>,
    F: FnOnce(&mut T),
{
    match locate(container) {
        Some(history) => history.apply(operation, mutate),
        None => {
            debug!(?operation, "no history found for operation; skipping");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::patch::PatchError;

    /// Counter snapshot: one value plus a tag.
    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        value: i64,
        tag: &'static str,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Field {
        Value,
        Tag,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Val {
        Value(i64),
        Tag(&'static str),
    }

    impl Patchable for Counter {
        type Path = Field;
        type Value = Val;

        fn diff(&self, next: &Self) -> Patch<Field, Val> {
            let mut patch = Patch::new();
            if self.value != next.value {
                patch.record(Field::Value, Some(Val::Value(self.value)), Some(Val::Value(next.value)));
            }
            if self.tag != next.tag {
                patch.record(Field::Tag, Some(Val::Tag(self.tag)), Some(Val::Tag(next.tag)));
            }
            patch
        }

        fn read(&self, path: &Field) -> Option<Val> {
            Some(match path {
                Field::Value => Val::Value(self.value),
                Field::Tag => Val::Tag(self.tag),
            })
        }

        fn write(&mut self, path: &Field, value: Option<&Val>) -> Result<(), PatchError> {
            match (path, value) {
                (Field::Value, Some(Val::Value(v))) => self.value = *v,
                (Field::Tag, Some(Val::Tag(t))) => self.tag = *t,
                (_, None) => return Err(PatchError::required(path)),
                _ => return Err(PatchError::value_mismatch(path)),
            }
            Ok(())
        }
    }

    impl Tagged for Counter {
        type Operation = &'static str;

        fn operation(&self) -> &&'static str {
            &self.tag
        }

        fn set_operation(&mut self, operation: &'static str) {
            self.tag = operation;
        }

        fn reset_operation() -> &'static str {
            "reset"
        }

        fn is_tag_path(path: &Field) -> bool {
            matches!(path, Field::Tag)
        }
    }

    fn counter() -> History<Counter> {
        History::with_max_history(Counter { value: 0, tag: "reset" }, 3)
    }

    #[test]
    fn test_apply_records() {
        let mut history = counter();
        assert!(history.apply("add", |c| c.value += 1));

        assert_eq!(history.present().value, 1);
        assert_eq!(history.present().tag, "add");
        assert_eq!(history.past_len(), 1);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo() {
        let mut history = counter();
        history.apply("add", |c| c.value += 1);
        history.apply("double", |c| c.value *= 2);

        assert!(history.undo());
        assert_eq!(history.present(), &Counter { value: 1, tag: "add" });
        assert_eq!(history.future_len(), 1);

        assert!(history.redo());
        assert_eq!(history.present(), &Counter { value: 2, tag: "double" });
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history = counter();
        assert!(!history.undo());
        assert!(!history.redo());
        assert!(history.peek_undo().is_none());
        assert!(history.peek_redo().is_none());
        assert_eq!(history.present().value, 0);
    }

    #[test]
    fn test_unchanged_mutation_is_not_recorded() {
        let mut history = counter();
        history.apply("add", |c| c.value += 1);
        history.undo();

        assert!(!history.apply("noop", |_| {}));
        assert_eq!(history.past_len(), 0);
        assert_eq!(history.present(), &Counter { value: 0, tag: "reset" });
        // Any new mutation invalidates redo, even an empty one
        assert!(!history.can_redo());
    }

    #[test]
    fn test_new_mutation_clears_future() {
        let mut history = counter();
        history.apply("add", |c| c.value += 1);
        history.undo();
        assert!(history.can_redo());

        history.apply("sub", |c| c.value -= 1);
        assert!(!history.can_redo());
        assert!(!history.redo());
    }

    #[test]
    fn test_bounded_past() {
        let mut history = counter();
        for _ in 0..5 {
            history.apply("add", |c| c.value += 1);
        }

        assert_eq!(history.past_len(), 3);
        while history.undo() {}
        // The first two steps were evicted
        assert_eq!(history.present().value, 2);
    }

    #[test]
    fn test_zero_depth_keeps_no_steps() {
        let mut history = History::with_max_history(Counter { value: 0, tag: "reset" }, 0);
        assert!(history.apply("add", |c| c.value += 1));
        assert_eq!(history.present().value, 1);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_peek_is_pure() {
        let mut history = counter();
        history.apply("add", |c| c.value += 1);

        let peeked = history.peek_undo().unwrap();
        assert_eq!(peeked.value, 0);
        assert_eq!(history.present().value, 1);
        assert_eq!(history.past_len(), 1);

        history.undo();
        assert_eq!(history.peek_redo().unwrap().value, 1);
        assert_eq!(history.future_len(), 1);
    }

    #[test]
    fn test_pending_operations() {
        let mut history = counter();
        assert_eq!(history.pending_undo_operation(), None);

        history.apply("add", |c| c.value += 1);
        assert_eq!(history.pending_undo_operation(), Some(&"add"));

        history.undo();
        assert_eq!(history.pending_undo_operation(), None);
        assert_eq!(history.pending_redo_operation(), Some("add"));
    }

    #[test]
    fn test_collapse() {
        let mut history = counter();
        history.apply("add", |c| c.value += 1);
        history.apply("add", |c| c.value += 1);
        history.undo();

        history.collapse();

        assert_eq!(history.present(), &Counter { value: 1, tag: "reset" });
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_rewrite_untracked_clears_steps() {
        let mut history = counter();
        history.apply("add", |c| c.value += 1);

        assert!(!history.rewrite_untracked(|_| {}));
        assert!(history.can_undo());

        assert!(history.rewrite_untracked(|c| c.value = 10));
        assert_eq!(history.present().value, 10);
        assert!(!history.can_undo());
        assert_eq!(history.present().tag, "add");
    }

    #[test]
    fn test_with_history_locates() {
        let mut slots: Vec<History<Counter>> = vec![counter(), counter()];

        assert!(with_history(&mut slots, |s| s.get_mut(1), "add", |c| c.value += 5));
        assert_eq!(slots[1].present().value, 5);
        assert_eq!(slots[0].present().value, 0);

        // Stale locator: no-op
        assert!(!with_history(&mut slots, |s| s.get_mut(9), "add", |c| c.value += 5));
    }
}
