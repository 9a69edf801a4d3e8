//! One deck's tabletop: a snapshot under undo/redo.

use im::Vector;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::cards::{CardInstance, Side};
use crate::core::entity::{CardId, CardInstanceId, DeckId, StackId};
use crate::history::History;
use crate::stacks::{
    self, ops, CardSelection, Destination, Notification, Operation, OrderMethod, Placement, Snapshot, StackSelection,
};

/// A deck's tabletop.
///
/// Every mutation runs as one history transaction tagged with the
/// [`Operation`] describing the call. Mutations that resolve to nothing
/// (stale ids, empty selections) record nothing and return `false`.
///
/// ## Example
///
/// ```
/// use card_tabletop::cards::Side;
/// use card_tabletop::core::{CardId, CardInstanceId, DeckId, StackId};
/// use card_tabletop::stacks::{CardSelection, Destination, Placement, Snapshot, StackEnd};
/// use card_tabletop::tabletop::Tabletop;
///
/// let mut table = Tabletop::new(DeckId::new(1), Snapshot::dealt(&[CardId::new(7), CardId::new(8)], Side::Back));
/// table.move_card(
///     CardSelection::Instance(CardInstanceId::new(0)),
///     Destination::NewStack(StackEnd::End),
///     Placement::TOP_FACE_UP,
/// );
/// assert_eq!(table.stack_ids().len(), 2);
/// assert_eq!(table.undo_notification().unwrap().to_string(), "Undo: move card");
///
/// table.undo();
/// assert_eq!(table.stack_cards(StackId::new(0)).unwrap().len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Tabletop {
    deck_id: DeckId,
    history: History<Snapshot>,
}

impl Tabletop {
    /// Create a tabletop with the default history depth.
    #[must_use]
    pub fn new(deck_id: DeckId, snapshot: Snapshot) -> Self {
        Self {
            deck_id,
            history: History::new(snapshot),
        }
    }

    /// Create a tabletop keeping at most `max_history` undo steps.
    #[must_use]
    pub fn with_max_history(deck_id: DeckId, snapshot: Snapshot, max_history: usize) -> Self {
        Self {
            deck_id,
            history: History::with_max_history(snapshot, max_history),
        }
    }

    #[must_use]
    pub fn deck_id(&self) -> DeckId {
        self.deck_id
    }

    // === Operations ===

    /// Run a tagged operation as one undoable step.
    ///
    /// `ResetTabletop` carries no layout and records nothing here; use
    /// [`Tabletop::reset_tabletop`].
    pub fn execute(&mut self, operation: Operation) -> bool {
        let tag = operation.clone();
        self.history.apply(tag, |snapshot| stacks::execute(snapshot, &operation))
    }

    /// Move one instance, one stack's cards, or all cards.
    pub fn move_card(&mut self, target: CardSelection, destination: Destination, placement: Placement) -> bool {
        self.execute(Operation::MoveCard {
            target,
            destination,
            placement,
        })
    }

    /// Turn one instance, one stack, or all cards to `side`.
    pub fn change_card_state(&mut self, target: CardSelection, side: Side) -> bool {
        self.execute(Operation::ChangeCardState { target, side })
    }

    /// Shuffle or reverse one stack or all stacks, optionally forcing a side first.
    pub fn set_stack_order(&mut self, target: StackSelection, method: OrderMethod, face: Option<Side>) -> bool {
        self.execute(Operation::SetStackOrder { target, method, face })
    }

    /// Remove a stack. Its instances are not relocated.
    pub fn delete_stack(&mut self, stack: StackId) -> bool {
        self.execute(Operation::DeleteStack { stack })
    }

    /// Replace the layout wholesale as one undoable step.
    pub fn reset_tabletop(&mut self, layout: &Snapshot) -> bool {
        self.history
            .apply(Operation::ResetTabletop, |snapshot| ops::replace_layout(snapshot, layout))
    }

    /// Step back once, returning the notification to show.
    pub fn undo(&mut self) -> Option<Notification> {
        let notification = self.undo_notification()?;
        self.history.undo().then_some(notification)
    }

    /// Step forward once, returning the notification to show.
    pub fn redo(&mut self) -> Option<Notification> {
        self.history
            .redo()
            .then(|| Notification::Redo(self.snapshot().operation.clone()))
    }

    /// Drop all undo/redo steps and retag the present as `Reset`.
    pub fn collapse_history(&mut self) {
        debug!(deck = %self.deck_id, "collapsing history");
        self.history.collapse();
    }

    /// Drop every instance of `cards` outside of history.
    ///
    /// If anything was dropped, past and future are cleared. Returns the
    /// number of instances dropped.
    pub fn purge_cards(&mut self, cards: &FxHashSet<CardId>) -> usize {
        let mut purged = 0;
        if self.history.rewrite_untracked(|snapshot| purged = ops::purge_cards(snapshot, cards)) {
            debug!(deck = %self.deck_id, purged, "purged deleted cards; history cleared");
        }
        purged
    }

    // === Selectors ===

    /// The present snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        self.history.present()
    }

    #[must_use]
    pub fn history(&self) -> &History<Snapshot> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History<Snapshot> {
        &mut self.history
    }

    /// Stack ids in display order.
    #[must_use]
    pub fn stack_ids(&self) -> &Vector<StackId> {
        &self.snapshot().stack_ids
    }

    /// A stack's instance ids, top first.
    #[must_use]
    pub fn stack_cards(&self, stack: StackId) -> Option<&Vector<CardInstanceId>> {
        self.snapshot().stack_cards(stack)
    }

    #[must_use]
    pub fn card_instance(&self, id: CardInstanceId) -> Option<&CardInstance> {
        self.snapshot().card_instance(id)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Notification `undo()` would show, without undoing.
    #[must_use]
    pub fn undo_notification(&self) -> Option<Notification> {
        self.history
            .pending_undo_operation()
            .map(|operation| Notification::Undo(operation.clone()))
    }

    /// Notification `redo()` would show, without redoing.
    #[must_use]
    pub fn redo_notification(&self) -> Option<Notification> {
        self.history.pending_redo_operation().map(Notification::Redo)
    }
}
