//! Stacks and card movement.
//!
//! A tabletop is an ordered list of stacks, each an ordered list of card
//! instance ids. [`Snapshot`] holds one such layout and knows how to diff
//! itself for the history engine; [`ops`] holds the mutations run inside
//! history transactions; [`Operation`] tags each recorded step.

pub mod operation;
pub mod ops;
pub mod snapshot;
pub mod stack;

pub use operation::{
    CardSelection, Destination, Facing, Notification, Operation, OrderMethod, Placement, Position, StackEnd,
    StackSelection,
};
pub use snapshot::{Snapshot, SnapshotPatch, SnapshotPath, SnapshotValue};
pub use stack::Stack;

/// Run `operation` against `snapshot`.
///
/// `Reset` and `ResetTabletop` carry no layout and change nothing here; a
/// tabletop reset goes through [`ops::replace_layout`].
pub fn execute(snapshot: &mut Snapshot, operation: &Operation) {
    match operation {
        Operation::MoveCard {
            target,
            destination,
            placement,
        } => ops::move_cards(snapshot, target, destination, *placement),
        Operation::ChangeCardState { target, side } => ops::change_card_state(snapshot, target, *side),
        Operation::SetStackOrder { target, method, face } => ops::set_stack_order(snapshot, target, method, *face),
        Operation::DeleteStack { stack } => ops::delete_stack(snapshot, *stack),
        Operation::Reset | Operation::ResetTabletop => {}
    }
}
