//! Tabletop snapshot: the value tracked by a tabletop's history.
//!
//! ## Layout
//!
//! - `stack_ids`: display order of stacks
//! - `stacks_by_id`: each stack's ordered instance list
//! - `card_instances_by_id`: every instance placed on the tabletop
//! - `operation`: tag of the mutation that produced this snapshot
//!
//! Collections are `im` persistent structures, so cloning a snapshot for a
//! transaction is O(1) and a mutation only copies the stacks and instances it
//! touches.
//!
//! ## Invariant
//!
//! Every card instance id appears in the list of at most one stack. Moves
//! re-establish this on every call (see `ops::move_cards`).

use im::{OrdMap, Vector};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::operation::Operation;
use super::stack::Stack;
use crate::cards::{CardInstance, Side};
use crate::core::entity::{CardId, CardInstanceId, StackId};
use crate::history::{Patch, PatchError, Patchable, Tagged};

/// Address of one replaceable part of a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapshotPath {
    StackIds,
    Stack(StackId),
    CardInstance(CardInstanceId),
    Operation,
}

/// Value stored at a `SnapshotPath`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotValue {
    StackIds(Vector<StackId>),
    Stack(Stack),
    CardInstance(CardInstance),
    Operation(Operation),
}

/// Patch over a tabletop snapshot.
pub type SnapshotPatch = Patch<SnapshotPath, SnapshotValue>;

/// The present state of one tabletop.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub stack_ids: Vector<StackId>,
    pub stacks_by_id: OrdMap<StackId, Stack>,
    pub card_instances_by_id: OrdMap<CardInstanceId, CardInstance>,
    pub operation: Operation,
}

impl Snapshot {
    /// A tabletop with no stacks.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Initial layout for a deck: every card in one stack, in deck order.
    ///
    /// Instance ids are assigned `0..cards.len()`; the stack is `StackId(0)`.
    ///
    /// ```
    /// use card_tabletop::cards::Side;
    /// use card_tabletop::core::{CardId, StackId};
    /// use card_tabletop::stacks::Snapshot;
    ///
    /// let snapshot = Snapshot::dealt(&[CardId::new(5), CardId::new(6)], Side::Back);
    /// assert_eq!(snapshot.stack_ids.len(), 1);
    /// assert_eq!(snapshot.stack_len(StackId::new(0)), 2);
    /// ```
    #[must_use]
    pub fn dealt(cards: &[CardId], side: Side) -> Self {
        let instances = cards.iter().zip(0u32..).map(|(&card_id, raw)| {
            CardInstance::new(CardInstanceId::new(raw), card_id, side)
        });
        Self::empty().with_stack(StackId::new(0), instances)
    }

    /// Builder: append a stack holding `instances`, top first.
    #[must_use]
    pub fn with_stack(mut self, id: StackId, instances: impl IntoIterator<Item = CardInstance>) -> Self {
        let mut stack = Stack::new(id);
        for instance in instances {
            stack.cards.push_back(instance.id);
            self.card_instances_by_id.insert(instance.id, instance);
        }
        self.stack_ids.push_back(id);
        self.stacks_by_id.insert(id, stack);
        self
    }

    // === Selectors ===

    /// Get a stack.
    #[must_use]
    pub fn stack(&self, id: StackId) -> Option<&Stack> {
        self.stacks_by_id.get(&id)
    }

    /// Get a stack's instance ids, top first.
    #[must_use]
    pub fn stack_cards(&self, id: StackId) -> Option<&Vector<CardInstanceId>> {
        self.stacks_by_id.get(&id).map(|stack| &stack.cards)
    }

    /// Number of instances in a stack (0 if missing).
    #[must_use]
    pub fn stack_len(&self, id: StackId) -> usize {
        self.stack(id).map_or(0, Stack::len)
    }

    /// Get a card instance.
    #[must_use]
    pub fn card_instance(&self, id: CardInstanceId) -> Option<&CardInstance> {
        self.card_instances_by_id.get(&id)
    }

    /// Stacks in display order. Ids without a stack entry are skipped.
    pub fn stacks(&self) -> impl Iterator<Item = &Stack> + '_ {
        self.stack_ids.iter().filter_map(|id| self.stacks_by_id.get(id))
    }

    /// The stack holding `instance`, if any.
    #[must_use]
    pub fn stack_of(&self, instance: CardInstanceId) -> Option<StackId> {
        self.stacks().find(|stack| stack.contains(instance)).map(|stack| stack.id)
    }

    /// Total number of card instances on the tabletop.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.card_instances_by_id.len()
    }

    /// Id for a new stack: one above the largest in use.
    ///
    /// Once `u32::MAX` is taken, falls back to the smallest free id. `None`
    /// only if every id is in use.
    #[must_use]
    pub fn next_stack_id(&self) -> Option<StackId> {
        match self.stacks_by_id.get_max() {
            None => Some(StackId::new(0)),
            Some((max, _)) => max
                .next()
                .or_else(|| first_free(self.stacks_by_id.keys().map(|id| id.raw())).map(StackId::new)),
        }
    }

    /// Id for a new card instance, allocated like [`Snapshot::next_stack_id`].
    #[must_use]
    pub fn next_instance_id(&self) -> Option<CardInstanceId> {
        match self.card_instances_by_id.get_max() {
            None => Some(CardInstanceId::new(0)),
            Some((max, _)) => max.next().or_else(|| {
                first_free(self.card_instances_by_id.keys().map(|id| id.raw())).map(CardInstanceId::new)
            }),
        }
    }

    /// Check that the layout is coherent:
    /// - every instance is listed by exactly one stack, exactly once
    /// - every listed id has an instance
    /// - `stack_ids` and `stacks_by_id` name the same stacks
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let mut seen: FxHashMap<CardInstanceId, u32> = FxHashMap::default();
        for stack in self.stacks_by_id.values() {
            for &id in &stack.cards {
                *seen.entry(id).or_default() += 1;
            }
        }

        let placements_ok = seen.len() == self.card_instances_by_id.len()
            && seen
                .iter()
                .all(|(id, &count)| count == 1 && self.card_instances_by_id.contains_key(id));

        let stacks_ok = self.stack_ids.len() == self.stacks_by_id.len()
            && self.stack_ids.iter().all(|id| self.stacks_by_id.contains_key(id));

        placements_ok && stacks_ok
    }
}

/// Smallest value missing from an ascending sequence of distinct ids.
fn first_free(ids: impl Iterator<Item = u32>) -> Option<u32> {
    let mut candidate = 0u32;
    for id in ids {
        if id != candidate {
            return Some(candidate);
        }
        candidate = candidate.checked_add(1)?;
    }
    Some(candidate)
}

/// Record changed, added and removed entries of two maps.
fn diff_maps<K, V>(
    before: &OrdMap<K, V>,
    after: &OrdMap<K, V>,
    path: impl Fn(K) -> SnapshotPath,
    value: impl Fn(V) -> SnapshotValue,
    patch: &mut SnapshotPatch,
) where
    K: Ord + Copy,
    V: Clone + PartialEq,
{
    if before.ptr_eq(after) {
        return;
    }
    for (key, old) in before.iter() {
        match after.get(key) {
            Some(new) if new == old => {}
            new => patch.record(path(*key), Some(value(old.clone())), new.cloned().map(&value)),
        }
    }
    for (key, new) in after.iter() {
        if !before.contains_key(key) {
            patch.record(path(*key), None, Some(value(new.clone())));
        }
    }
}

impl Patchable for Snapshot {
    type Path = SnapshotPath;
    type Value = SnapshotValue;

    fn diff(&self, next: &Self) -> SnapshotPatch {
        let mut patch = Patch::new();

        if self.stack_ids != next.stack_ids {
            patch.record(
                SnapshotPath::StackIds,
                Some(SnapshotValue::StackIds(self.stack_ids.clone())),
                Some(SnapshotValue::StackIds(next.stack_ids.clone())),
            );
        }
        diff_maps(
            &self.stacks_by_id,
            &next.stacks_by_id,
            SnapshotPath::Stack,
            SnapshotValue::Stack,
            &mut patch,
        );
        diff_maps(
            &self.card_instances_by_id,
            &next.card_instances_by_id,
            SnapshotPath::CardInstance,
            SnapshotValue::CardInstance,
            &mut patch,
        );
        if self.operation != next.operation {
            patch.record(
                SnapshotPath::Operation,
                Some(SnapshotValue::Operation(self.operation.clone())),
                Some(SnapshotValue::Operation(next.operation.clone())),
            );
        }

        patch
    }

    fn read(&self, path: &SnapshotPath) -> Option<SnapshotValue> {
        match path {
            SnapshotPath::StackIds => Some(SnapshotValue::StackIds(self.stack_ids.clone())),
            SnapshotPath::Stack(id) => self.stacks_by_id.get(id).cloned().map(SnapshotValue::Stack),
            SnapshotPath::CardInstance(id) => self
                .card_instances_by_id
                .get(id)
                .cloned()
                .map(SnapshotValue::CardInstance),
            SnapshotPath::Operation => Some(SnapshotValue::Operation(self.operation.clone())),
        }
    }

    fn write(&mut self, path: &SnapshotPath, value: Option<&SnapshotValue>) -> Result<(), PatchError> {
        match (path, value) {
            (SnapshotPath::StackIds, Some(SnapshotValue::StackIds(ids))) => {
                self.stack_ids = ids.clone();
            }
            (SnapshotPath::Stack(id), Some(SnapshotValue::Stack(stack))) if stack.id == *id => {
                self.stacks_by_id.insert(*id, stack.clone());
            }
            (SnapshotPath::Stack(id), None) => {
                self.stacks_by_id.remove(id);
            }
            (SnapshotPath::CardInstance(id), Some(SnapshotValue::CardInstance(instance))) if instance.id == *id => {
                self.card_instances_by_id.insert(*id, instance.clone());
            }
            (SnapshotPath::CardInstance(id), None) => {
                self.card_instances_by_id.remove(id);
            }
            (SnapshotPath::Operation, Some(SnapshotValue::Operation(operation))) => {
                self.operation = operation.clone();
            }
            (SnapshotPath::StackIds | SnapshotPath::Operation, None) => {
                return Err(PatchError::required(path));
            }
            _ => return Err(PatchError::value_mismatch(path)),
        }
        Ok(())
    }
}

impl Tagged for Snapshot {
    type Operation = Operation;

    fn operation(&self) -> &Operation {
        &self.operation
    }

    fn set_operation(&mut self, operation: Operation) {
        self.operation = operation;
    }

    fn reset_operation() -> Operation {
        Operation::Reset
    }

    fn is_tag_path(path: &SnapshotPath) -> bool {
        matches!(path, SnapshotPath::Operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::apply_patch;

    fn instance(raw: u32) -> CardInstance {
        CardInstance::new(CardInstanceId(raw), CardId(raw), Side::Front)
    }

    fn two_stacks() -> Snapshot {
        Snapshot::empty()
            .with_stack(StackId(1), [instance(1), instance(2), instance(3)])
            .with_stack(StackId(2), [])
    }

    #[test]
    fn test_dealt() {
        let snapshot = Snapshot::dealt(&[CardId(10), CardId(11), CardId(10)], Side::Back);

        assert_eq!(snapshot.stack_ids, Vector::unit(StackId(0)));
        assert_eq!(snapshot.instance_count(), 3);
        assert_eq!(
            snapshot.stack_cards(StackId(0)).unwrap(),
            &Vector::from(vec![CardInstanceId(0), CardInstanceId(1), CardInstanceId(2)])
        );
        // Same card dealt twice: two instances
        assert_eq!(snapshot.card_instance(CardInstanceId(2)).unwrap().card_id, CardId(10));
        assert_eq!(snapshot.card_instance(CardInstanceId(0)).unwrap().side, Side::Back);
        assert_eq!(snapshot.operation, Operation::Reset);
        assert!(snapshot.is_consistent());
    }

    #[test]
    fn test_dealt_empty_deck() {
        let snapshot = Snapshot::dealt(&[], Side::Front);
        assert_eq!(snapshot.stack_ids.len(), 1);
        assert_eq!(snapshot.stack_len(StackId(0)), 0);
        assert!(snapshot.is_consistent());
    }

    #[test]
    fn test_selectors() {
        let snapshot = two_stacks();

        assert_eq!(snapshot.stack_of(CardInstanceId(2)), Some(StackId(1)));
        assert_eq!(snapshot.stack_of(CardInstanceId(9)), None);
        assert_eq!(snapshot.stack_len(StackId(2)), 0);
        assert_eq!(snapshot.stack_len(StackId(9)), 0);
        assert_eq!(snapshot.next_stack_id(), Some(StackId(3)));
        assert_eq!(snapshot.next_instance_id(), Some(CardInstanceId(4)));
        assert_eq!(Snapshot::empty().next_stack_id(), Some(StackId(0)));

        let order: Vec<_> = snapshot.stacks().map(|s| s.id).collect();
        assert_eq!(order, vec![StackId(1), StackId(2)]);
    }

    #[test]
    fn test_next_ids_after_max_reuse_free_ids() {
        let snapshot = Snapshot::empty()
            .with_stack(StackId(0), [instance(0)])
            .with_stack(StackId(1), [])
            .with_stack(StackId(u32::MAX), [CardInstance::new(CardInstanceId(u32::MAX), CardId(1), Side::Front)]);

        assert_eq!(snapshot.next_stack_id(), Some(StackId(2)));
        assert_eq!(snapshot.next_instance_id(), Some(CardInstanceId(1)));
    }

    #[test]
    fn test_first_free() {
        assert_eq!(first_free([].into_iter()), Some(0));
        assert_eq!(first_free([0, 1, 2].into_iter()), Some(3));
        assert_eq!(first_free([1, 2].into_iter()), Some(0));
        assert_eq!(first_free([0, 2, u32::MAX].into_iter()), Some(1));
    }

    #[test]
    fn test_consistency_detects_duplicates() {
        let mut snapshot = two_stacks();
        assert!(snapshot.is_consistent());

        snapshot
            .stacks_by_id
            .get_mut(&StackId(2))
            .unwrap()
            .cards
            .push_back(CardInstanceId(1));
        assert!(!snapshot.is_consistent());
    }

    #[test]
    fn test_consistency_detects_orphans() {
        let mut snapshot = two_stacks();
        snapshot.card_instances_by_id.insert(CardInstanceId(50), instance(50));
        assert!(!snapshot.is_consistent());
    }

    #[test]
    fn test_diff_touches_only_changed_entries() {
        let before = two_stacks();
        let mut after = before.clone();
        after.stacks_by_id.get_mut(&StackId(1)).unwrap().cards.pop_front();
        after.stacks_by_id.get_mut(&StackId(2)).unwrap().cards.push_back(CardInstanceId(1));

        let patch = before.diff(&after);
        let paths: Vec<_> = patch.iter().map(|c| c.path).collect();
        assert_eq!(paths, vec![SnapshotPath::Stack(StackId(1)), SnapshotPath::Stack(StackId(2))]);
    }

    #[test]
    fn test_patch_roundtrip_with_added_and_removed_entries() {
        let before = two_stacks();
        let mut after = before.clone();
        after.stacks_by_id.remove(&StackId(2));
        after.stack_ids.retain(|id| *id != StackId(2));
        after.card_instances_by_id.insert(CardInstanceId(7), instance(7));
        after.operation = Operation::ResetTabletop;

        let patch = before.diff(&after);
        let forward = apply_patch(&before, &patch).unwrap();
        assert_eq!(forward, after);
        assert_eq!(apply_patch(&forward, &patch.inverted()).unwrap(), before);
    }

    #[test]
    fn test_write_rejects_mismatched_values() {
        let mut snapshot = two_stacks();

        let wrong_kind = SnapshotValue::Operation(Operation::Reset);
        assert!(matches!(
            snapshot.write(&SnapshotPath::StackIds, Some(&wrong_kind)),
            Err(PatchError::ValueMismatch { .. })
        ));

        // Stack stored under another stack's id
        let misplaced = SnapshotValue::Stack(Stack::new(StackId(5)));
        assert!(matches!(
            snapshot.write(&SnapshotPath::Stack(StackId(6)), Some(&misplaced)),
            Err(PatchError::ValueMismatch { .. })
        ));

        assert!(matches!(
            snapshot.write(&SnapshotPath::Operation, None),
            Err(PatchError::Required { .. })
        ));
    }

    #[test]
    fn test_serialization() {
        let snapshot = two_stacks();
        let json = serde_json::to_string(&snapshot).unwrap();
        let deserialized: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, deserialized);
    }
}
