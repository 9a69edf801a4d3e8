//! Card instances - one placement of a card on a tabletop.
//!
//! `CardInstance` is what stacks hold. The card it shows (`card_id`) is owned
//! by the deck and may back several instances on the same tabletop; the
//! instance only adds which face is currently up.

use serde::{Deserialize, Serialize};

use crate::core::entity::{CardId, CardInstanceId};

/// Which face of a card instance is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Front,
    Back,
}

impl Side {
    /// The opposite face.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Front => f.write_str("front"),
            Side::Back => f.write_str("back"),
        }
    }
}

/// A card placed on a tabletop.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique (per tabletop) instance ID.
    pub id: CardInstanceId,

    /// The card this instance shows.
    pub card_id: CardId,

    /// Face currently shown.
    pub side: Side,
}

impl CardInstance {
    /// Create a card instance showing `side`.
    #[must_use]
    pub fn new(id: CardInstanceId, card_id: CardId, side: Side) -> Self {
        Self { id, card_id, side }
    }

    /// Builder-style side override.
    #[must_use]
    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    /// Check if the front face is shown.
    #[must_use]
    pub fn is_face_up(&self) -> bool {
        self.side == Side::Front
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_instance_new() {
        let instance = CardInstance::new(CardInstanceId(10), CardId(1), Side::Front);

        assert_eq!(instance.id, CardInstanceId(10));
        assert_eq!(instance.card_id, CardId(1));
        assert!(instance.is_face_up());
    }

    #[test]
    fn test_side_flipped() {
        assert_eq!(Side::Front.flipped(), Side::Back);
        assert_eq!(Side::Back.flipped(), Side::Front);
        assert_eq!(Side::default(), Side::Front);
    }

    #[test]
    fn test_with_side() {
        let instance = CardInstance::new(CardInstanceId(1), CardId(1), Side::Front).with_side(Side::Back);
        assert!(!instance.is_face_up());
    }

    #[test]
    fn test_card_instance_serialization() {
        let instance = CardInstance::new(CardInstanceId(10), CardId(1), Side::Back);

        let json = serde_json::to_string(&instance).unwrap();
        let deserialized: CardInstance = serde_json::from_str(&json).unwrap();

        assert_eq!(instance, deserialized);
    }
}
