//! A stack: an ordered pile of card instances.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::entity::{CardInstanceId, StackId};

/// Ordered pile of card instances. Index 0 is the top.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stack {
    pub id: StackId,
    pub cards: Vector<CardInstanceId>,
}

impl Stack {
    /// Create an empty stack.
    #[must_use]
    pub fn new(id: StackId) -> Self {
        Self {
            id,
            cards: Vector::new(),
        }
    }

    /// Create a stack holding `cards`, top first.
    #[must_use]
    pub fn with_cards(id: StackId, cards: impl IntoIterator<Item = CardInstanceId>) -> Self {
        Self {
            id,
            cards: cards.into_iter().collect(),
        }
    }

    /// Number of instances in the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Check if the stack holds `instance`.
    #[must_use]
    pub fn contains(&self, instance: CardInstanceId) -> bool {
        self.cards.contains(&instance)
    }

    /// Top instance (index 0).
    #[must_use]
    pub fn top(&self) -> Option<CardInstanceId> {
        self.cards.front().copied()
    }

    /// Bottom instance.
    #[must_use]
    pub fn bottom(&self) -> Option<CardInstanceId> {
        self.cards.back().copied()
    }
}
