//! Identifiers for everything that lives on a tabletop.
//!
//! ## ID Kinds
//!
//! - `DeckId`: the deck a tabletop belongs to (one tabletop per deck)
//! - `CardId`: the card's own identity (template/data), owned by the deck
//! - `StackId`: an ordered pile on one tabletop
//! - `CardInstanceId`: one placement of a card on one tabletop
//!
//! A card may be placed several times on the same tabletop, so instance ids
//! and card ids are deliberately distinct types.
//!
//! ## Usage
//!
//! ```
//! use card_tabletop::core::{CardId, CardInstanceId, StackId};
//!
//! let card = CardId::new(7);
//! let instance = CardInstanceId::new(7);
//!
//! // Same raw value, different meaning
//! assert_eq!(card.raw(), instance.raw());
//! assert_eq!(format!("{}", StackId::new(2)), "Stack(2)");
//! ```

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Create a new ID.
            #[must_use]
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// Get the raw ID value.
            #[must_use]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// The ID following this one, or `None` at `u32::MAX`.
            #[must_use]
            pub const fn next(self) -> Option<Self> {
                match self.0.checked_add(1) {
                    Some(id) => Some(Self(id)),
                    None => None,
                }
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of a deck, and of the tabletop dealt from it.
    DeckId,
    "Deck"
);

id_type!(
    /// Identifier of a card's own data, shared by all its instances.
    CardId,
    "Card"
);

id_type!(
    /// Identifier of a stack on a tabletop.
    StackId,
    "Stack"
);

id_type!(
    /// Identifier of a card instance, unique per tabletop.
    CardInstanceId,
    "Instance"
);
