//! Tabletops keyed by deck.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use super::table::Tabletop;
use crate::cards::Side;
use crate::core::entity::{CardId, DeckId, StackId};
use crate::core::{SeedSource, SeedSourceState, TabletopConfig};
use crate::history::{with_history, History};
use crate::stacks::{
    self, CardSelection, Destination, Notification, Operation, OrderMethod, Placement, Snapshot, StackSelection,
};

/// Every open tabletop, one per deck.
///
/// Operations are routed by [`DeckId`]; an id with no tabletop is a silent
/// no-op returning `false` or `None`. The registry owns the configuration
/// applied to new tabletops and the source of fresh shuffle seeds.
#[derive(Clone, Debug)]
pub struct Tabletops {
    config: TabletopConfig,
    tabletops: FxHashMap<DeckId, Tabletop>,
    seeds: SeedSource,
}

impl Tabletops {
    /// Create an empty registry.
    #[must_use]
    pub fn new(config: TabletopConfig) -> Self {
        let seeds = SeedSource::new(config.seed);
        Self {
            config,
            tabletops: FxHashMap::default(),
            seeds,
        }
    }

    #[must_use]
    pub fn config(&self) -> &TabletopConfig {
        &self.config
    }

    /// Number of open tabletops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tabletops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabletops.is_empty()
    }

    #[must_use]
    pub fn contains(&self, deck: DeckId) -> bool {
        self.tabletops.contains_key(&deck)
    }

    /// Decks with an open tabletop, ascending.
    #[must_use]
    pub fn deck_ids(&self) -> Vec<DeckId> {
        let mut ids: Vec<DeckId> = self.tabletops.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn get(&self, deck: DeckId) -> Option<&Tabletop> {
        self.tabletops.get(&deck)
    }

    pub fn get_mut(&mut self, deck: DeckId) -> Option<&mut Tabletop> {
        self.tabletops.get_mut(&deck)
    }

    /// Get a deck's tabletop, creating an empty one if missing.
    pub fn open(&mut self, deck: DeckId) -> &mut Tabletop {
        let max_history = self.config.max_history;
        self.tabletops.entry(deck).or_insert_with(|| {
            debug!(%deck, max_history, "opening tabletop");
            Tabletop::with_max_history(deck, Snapshot::empty(), max_history)
        })
    }

    /// Lay `cards` out as one stack on the deck's tabletop, in deck order.
    ///
    /// Creates the tabletop if missing. The layout replacement is itself an
    /// undoable `ResetTabletop` step.
    pub fn deal(&mut self, deck: DeckId, cards: &[CardId]) -> bool {
        let layout = Snapshot::dealt(cards, self.config.dealt_side);
        debug!(%deck, cards = cards.len(), "dealing");
        self.open(deck).reset_tabletop(&layout)
    }

    // === Routed operations ===

    /// Run a tagged operation on a deck's tabletop.
    pub fn execute(&mut self, deck: DeckId, operation: Operation) -> bool {
        let tag = operation.clone();
        with_history(
            &mut self.tabletops,
            |tabletops| tabletops.get_mut(&deck).map(Tabletop::history_mut),
            tag,
            |snapshot| stacks::execute(snapshot, &operation),
        )
    }

    pub fn move_card(
        &mut self,
        deck: DeckId,
        target: CardSelection,
        destination: Destination,
        placement: Placement,
    ) -> bool {
        self.execute(
            deck,
            Operation::MoveCard {
                target,
                destination,
                placement,
            },
        )
    }

    pub fn change_card_state(&mut self, deck: DeckId, target: CardSelection, side: Side) -> bool {
        self.execute(deck, Operation::ChangeCardState { target, side })
    }

    pub fn set_stack_order(
        &mut self,
        deck: DeckId,
        target: StackSelection,
        method: OrderMethod,
        face: Option<Side>,
    ) -> bool {
        self.execute(deck, Operation::SetStackOrder { target, method, face })
    }

    /// Shuffle with a fresh seed drawn from the registry's seed source.
    ///
    /// The seed is recorded in the operation tag, so redo replays the same
    /// permutation.
    pub fn shuffle(&mut self, deck: DeckId, target: StackSelection, face: Option<Side>) -> bool {
        if !self.contains(deck) {
            return false;
        }
        let seed = self.seeds.next_seed();
        debug!(%deck, %seed, "shuffling");
        self.set_stack_order(deck, target, OrderMethod::Shuffle(seed), face)
    }

    pub fn delete_stack(&mut self, deck: DeckId, stack: StackId) -> bool {
        self.execute(deck, Operation::DeleteStack { stack })
    }

    pub fn reset_tabletop(&mut self, deck: DeckId, layout: &Snapshot) -> bool {
        self.get_mut(deck).is_some_and(|table| table.reset_tabletop(layout))
    }

    pub fn undo(&mut self, deck: DeckId) -> Option<Notification> {
        self.get_mut(deck)?.undo()
    }

    pub fn redo(&mut self, deck: DeckId) -> Option<Notification> {
        self.get_mut(deck)?.redo()
    }

    /// Collapse one deck's history.
    pub fn collapse(&mut self, deck: DeckId) -> bool {
        match self.get_mut(deck) {
            Some(table) => {
                table.collapse_history();
                true
            }
            None => false,
        }
    }

    /// Collapse every history, e.g. after a stored-state schema change.
    pub fn collapse_all(&mut self) {
        for table in self.tabletops.values_mut() {
            table.collapse_history();
        }
    }

    // === Deletion hooks ===

    /// Drop every instance of `cards` from every tabletop.
    ///
    /// Tabletops that lost instances have their past and future cleared.
    /// Returns the number of instances dropped.
    pub fn remove_cards(&mut self, cards: &[CardId]) -> usize {
        if cards.is_empty() {
            return 0;
        }
        let doomed: FxHashSet<CardId> = cards.iter().copied().collect();
        self.tabletops
            .values_mut()
            .map(|table| table.purge_cards(&doomed))
            .sum()
    }

    /// Drop a deck's tabletop and purge its cards from the others.
    ///
    /// Returns the removed tabletop.
    pub fn remove_deck(&mut self, deck: DeckId, cards: &[CardId]) -> Option<Tabletop> {
        let removed = self.tabletops.remove(&deck);
        let purged = self.remove_cards(cards);
        debug!(%deck, removed = removed.is_some(), purged, "removed deck");
        removed
    }

    /// Position in the shuffle seed stream, for saving a session.
    #[must_use]
    pub fn seed_state(&self) -> SeedSourceState {
        self.seeds.state()
    }

    /// Continue the shuffle seed stream from a saved position.
    pub fn restore_seeds(&mut self, state: &SeedSourceState) {
        self.seeds = SeedSource::from_state(state);
    }

    /// A deck's history, if open.
    #[must_use]
    pub fn history(&self, deck: DeckId) -> Option<&History<Snapshot>> {
        self.get(deck).map(Tabletop::history)
    }
}

impl Default for Tabletops {
    fn default() -> Self {
        Self::new(TabletopConfig::default())
    }
}
