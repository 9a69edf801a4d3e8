//! Snapshot mutations.
//!
//! Each function mutates a snapshot in place and is meant to run as the body
//! of one history transaction. None of them fail: stale ids resolve to
//! nothing and the call leaves the snapshot as it was.
//!
//! The functions never touch `operation`; the history engine tags the result.

use im::Vector;
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use super::operation::{CardSelection, Destination, OrderMethod, Placement, Position, StackEnd, StackSelection};
use super::snapshot::Snapshot;
use super::stack::Stack;
use crate::cards::Side;
use crate::core::entity::{CardId, CardInstanceId, StackId};
use crate::shuffle::seeded_shuffle;

/// Append or prepend a new stack to the stack order.
fn insert_stack(snapshot: &mut Snapshot, stack: Stack, at: StackEnd) {
    match at {
        StackEnd::Start => snapshot.stack_ids.push_front(stack.id),
        StackEnd::End => snapshot.stack_ids.push_back(stack.id),
    }
    snapshot.stacks_by_id.insert(stack.id, stack);
}

/// Empty a stack, returning what it held.
fn take_cards(snapshot: &mut Snapshot, id: StackId) -> Vector<CardInstanceId> {
    match snapshot.stacks_by_id.get(&id) {
        Some(stack) if !stack.is_empty() => {}
        _ => return Vector::new(),
    }
    snapshot
        .stacks_by_id
        .get_mut(&id)
        .map(|stack| std::mem::take(&mut stack.cards))
        .unwrap_or_default()
}

/// Remove `ids` from every stack, returning how many list entries were removed.
///
/// Only stacks actually holding one of `ids` are copied.
fn scrub(snapshot: &mut Snapshot, ids: &FxHashSet<CardInstanceId>) -> usize {
    let touched: Vec<StackId> = snapshot
        .stacks_by_id
        .iter()
        .filter(|(_, stack)| stack.cards.iter().any(|id| ids.contains(id)))
        .map(|(id, _)| *id)
        .collect();

    let mut removed = 0;
    for stack_id in touched {
        if let Some(stack) = snapshot.stacks_by_id.get_mut(&stack_id) {
            let before = stack.cards.len();
            stack.cards.retain(|id| !ids.contains(id));
            removed += before - stack.cards.len();
        }
    }
    removed
}

/// Force `side` on every listed instance that shows the other one.
fn set_side(snapshot: &mut Snapshot, ids: impl IntoIterator<Item = CardInstanceId>, side: Side) {
    for id in ids {
        let needs_change = snapshot
            .card_instances_by_id
            .get(&id)
            .is_some_and(|instance| instance.side != side);
        if needs_change {
            if let Some(instance) = snapshot.card_instances_by_id.get_mut(&id) {
                instance.side = side;
            }
        }
    }
}

/// Instance ids of one stack, or of all stacks in display order.
fn selected_instances(snapshot: &Snapshot, target: &CardSelection) -> Vec<CardInstanceId> {
    match target {
        CardSelection::Instance(id) => {
            if snapshot.card_instances_by_id.contains_key(id) {
                vec![*id]
            } else {
                Vec::new()
            }
        }
        CardSelection::Stack(id) => snapshot
            .stack_cards(*id)
            .map(|cards| cards.iter().copied().collect())
            .unwrap_or_default(),
        CardSelection::All => snapshot
            .stacks()
            .flat_map(|stack| stack.cards.iter().copied())
            .collect(),
    }
}

/// Move cards between stacks.
///
/// ## Steps
///
/// 1. Resolve the destination, creating and splicing in a new stack if asked
/// 2. Resolve the moving ids, emptying consumed source stacks
/// 3. Scrub the moving ids from every stack, repairing any earlier desync
/// 4. Stop if nothing moves
/// 5. Apply the placement's facing
/// 6. Insert at the destination's head (`Top`) or tail (`Bottom`),
///    keeping resolution order
///
/// Afterwards each moved instance is in exactly one stack. An unknown
/// destination stack makes the whole call a no-op.
pub fn move_cards(snapshot: &mut Snapshot, target: &CardSelection, destination: &Destination, placement: Placement) {
    let destination = match *destination {
        Destination::Stack(id) => {
            if !snapshot.stacks_by_id.contains_key(&id) {
                debug!(%id, "move destination does not exist; skipping");
                return;
            }
            id
        }
        Destination::NewStack(at) => {
            let Some(id) = snapshot.next_stack_id() else {
                warn!("no free stack id for a new stack; skipping move");
                return;
            };
            insert_stack(snapshot, Stack::new(id), at);
            id
        }
    };

    let (resolved, expected_in_stacks) = match *target {
        CardSelection::Instance(id) => (selected_instances(snapshot, target), usize::from(snapshot.card_instances_by_id.contains_key(&id))),
        CardSelection::Stack(id) => (take_cards(snapshot, id).into_iter().collect(), 0),
        CardSelection::All => {
            let sources: Vec<StackId> = snapshot.stack_ids.iter().copied().filter(|id| *id != destination).collect();
            let mut resolved = Vec::new();
            for source in sources {
                resolved.extend(take_cards(snapshot, source));
            }
            (resolved, 0)
        }
    };

    // Keep the first occurrence of each id
    let mut seen = FxHashSet::default();
    let moving: Vec<CardInstanceId> = resolved.into_iter().filter(|id| seen.insert(*id)).collect();

    let removed = scrub(snapshot, &seen);
    if removed > expected_in_stacks {
        warn!(
            removed,
            expected = expected_in_stacks,
            "moving cards were listed in more than one place; repaired"
        );
    }

    if moving.is_empty() {
        debug!("move resolved to no cards");
        return;
    }

    if let Some(side) = placement.facing.side() {
        set_side(snapshot, moving.iter().copied(), side);
    }

    if let Some(stack) = snapshot.stacks_by_id.get_mut(&destination) {
        match placement.position {
            Position::Top => {
                let mut cards: Vector<CardInstanceId> = moving.into_iter().collect();
                cards.append(std::mem::take(&mut stack.cards));
                stack.cards = cards;
            }
            Position::Bottom => stack.cards.extend(moving),
        }
    }
}

/// Set the side of one instance, one stack, or everything. Moves nothing.
pub fn change_card_state(snapshot: &mut Snapshot, target: &CardSelection, side: Side) {
    let ids = selected_instances(snapshot, target);
    set_side(snapshot, ids, side);
}

/// Shuffle or reverse one stack or all stacks.
///
/// A shuffle reseeds per stack with `seed.combine(stack_id)`, so equal-length
/// stacks shuffled together get different permutations. `face` is forced
/// before reordering.
pub fn set_stack_order(snapshot: &mut Snapshot, target: &StackSelection, method: &OrderMethod, face: Option<Side>) {
    let stack_ids: Vec<StackId> = match *target {
        StackSelection::Stack(id) => {
            if snapshot.stacks_by_id.contains_key(&id) {
                vec![id]
            } else {
                debug!(%id, "stack to reorder does not exist; skipping");
                Vec::new()
            }
        }
        StackSelection::All => snapshot.stack_ids.iter().copied().collect(),
    };

    for id in stack_ids {
        let Some(cards) = snapshot.stack_cards(id).cloned() else {
            continue;
        };

        if let Some(side) = face {
            set_side(snapshot, cards.iter().copied(), side);
        }

        let current: Vec<CardInstanceId> = cards.iter().copied().collect();
        let reordered: Vector<CardInstanceId> = match method {
            OrderMethod::Shuffle(seed) => seeded_shuffle(&current, &seed.combine(id)).into_iter().collect(),
            OrderMethod::Reverse => current.into_iter().rev().collect(),
        };

        if reordered != cards {
            if let Some(stack) = snapshot.stacks_by_id.get_mut(&id) {
                stack.cards = reordered;
            }
        }
    }
}

/// Remove a stack from the order and the stack map.
///
/// Instances still listed by the stack are not relocated; callers empty it
/// first.
pub fn delete_stack(snapshot: &mut Snapshot, id: StackId) {
    if let Some(stack) = snapshot.stacks_by_id.remove(&id) {
        if !stack.is_empty() {
            debug!(%id, cards = stack.len(), "deleting a non-empty stack");
        }
    }
    snapshot.stack_ids.retain(|stack_id| *stack_id != id);
}

/// Replace the whole layout with `layout`'s, keeping this snapshot's tag.
pub fn replace_layout(snapshot: &mut Snapshot, layout: &Snapshot) {
    snapshot.stack_ids = layout.stack_ids.clone();
    snapshot.stacks_by_id = layout.stacks_by_id.clone();
    snapshot.card_instances_by_id = layout.card_instances_by_id.clone();
}

/// Drop every instance of the given cards from stacks and the instance map.
///
/// Returns the number of instances dropped.
pub fn purge_cards(snapshot: &mut Snapshot, cards: &FxHashSet<CardId>) -> usize {
    let doomed: FxHashSet<CardInstanceId> = snapshot
        .card_instances_by_id
        .values()
        .filter(|instance| cards.contains(&instance.card_id))
        .map(|instance| instance.id)
        .collect();

    if doomed.is_empty() {
        return 0;
    }

    scrub(snapshot, &doomed);
    for id in &doomed {
        snapshot.card_instances_by_id.remove(id);
    }
    doomed.len()
}
