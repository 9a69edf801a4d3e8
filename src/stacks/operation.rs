//! Operation tags: what the last tabletop mutation was.
//!
//! Every mutation entry point has exactly one `Operation` variant carrying
//! its arguments. The tag is stored in the snapshot so undo and redo can
//! name the step they revert ("Undo: move card"); correctness never reads it.
//!
//! Variants are closed so notification rendering is checked for
//! completeness by `match`.

use serde::{Deserialize, Serialize};

use crate::cards::Side;
use crate::core::entity::{CardInstanceId, StackId};
use crate::shuffle::Seed;

/// Which card instances an operation acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardSelection {
    /// One instance.
    Instance(CardInstanceId),
    /// Every instance in one stack.
    Stack(StackId),
    /// Every instance on the tabletop (for moves: except the destination's).
    All,
}

/// Which stacks an operation acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackSelection {
    Stack(StackId),
    All,
}

/// End of the stack order where a new stack is spliced in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackEnd {
    Start,
    End,
}

/// Where moved cards go.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Destination {
    /// An existing stack.
    Stack(StackId),
    /// A fresh stack created at one end of the stack order.
    NewStack(StackEnd),
}

/// Where moved cards land in the destination stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    /// Head of the stack list.
    Top,
    /// Tail of the stack list.
    Bottom,
}

/// Face applied to moved cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Force the front side.
    FaceUp,
    /// Force the back side.
    FaceDown,
    /// Keep each card's side.
    NoChange,
}

impl Facing {
    /// Side to force, if any.
    #[must_use]
    pub const fn side(self) -> Option<Side> {
        match self {
            Facing::FaceUp => Some(Side::Front),
            Facing::FaceDown => Some(Side::Back),
            Facing::NoChange => None,
        }
    }
}

/// Placement of moved cards: position plus facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub position: Position,
    pub facing: Facing,
}

impl Placement {
    pub const TOP_FACE_UP: Self = Self::new(Position::Top, Facing::FaceUp);
    pub const TOP_FACE_DOWN: Self = Self::new(Position::Top, Facing::FaceDown);
    pub const TOP_NO_CHANGE: Self = Self::new(Position::Top, Facing::NoChange);
    pub const BOTTOM_FACE_UP: Self = Self::new(Position::Bottom, Facing::FaceUp);
    pub const BOTTOM_FACE_DOWN: Self = Self::new(Position::Bottom, Facing::FaceDown);
    pub const BOTTOM_NO_CHANGE: Self = Self::new(Position::Bottom, Facing::NoChange);

    /// All six placements.
    pub const ALL: [Self; 6] = [
        Self::TOP_FACE_UP,
        Self::TOP_FACE_DOWN,
        Self::TOP_NO_CHANGE,
        Self::BOTTOM_FACE_UP,
        Self::BOTTOM_FACE_DOWN,
        Self::BOTTOM_NO_CHANGE,
    ];

    /// Create a placement.
    #[must_use]
    pub const fn new(position: Position, facing: Facing) -> Self {
        Self { position, facing }
    }
}

/// How `SetStackOrder` reorders a stack.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderMethod {
    /// Seeded shuffle; each stack reseeds with its own id.
    Shuffle(Seed),
    /// Reverse the stack.
    Reverse,
}

/// Tag of the mutation that produced a snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Reserved: no history behind this snapshot (fresh or collapsed).
    #[default]
    Reset,
    MoveCard {
        target: CardSelection,
        destination: Destination,
        placement: Placement,
    },
    ChangeCardState {
        target: CardSelection,
        side: Side,
    },
    SetStackOrder {
        target: StackSelection,
        method: OrderMethod,
        face: Option<Side>,
    },
    DeleteStack {
        stack: StackId,
    },
    /// Wholesale layout replacement (deal, reset).
    ResetTabletop,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Reset => f.write_str("reset"),
            Operation::MoveCard { target, .. } => match target {
                CardSelection::Instance(_) => f.write_str("move card"),
                CardSelection::Stack(_) => f.write_str("move stack"),
                CardSelection::All => f.write_str("move all cards"),
            },
            Operation::ChangeCardState { target, side } => {
                let noun = match target {
                    CardSelection::Instance(_) => "card",
                    CardSelection::Stack(_) => "stack",
                    CardSelection::All => "all cards",
                };
                let face = match side {
                    Side::Front => "up",
                    Side::Back => "down",
                };
                write!(f, "turn {noun} face {face}")
            }
            Operation::SetStackOrder { target, method, .. } => {
                let verb = match method {
                    OrderMethod::Shuffle(_) => "shuffle",
                    OrderMethod::Reverse => "reverse",
                };
                match target {
                    StackSelection::Stack(_) => write!(f, "{verb} stack"),
                    StackSelection::All => write!(f, "{verb} all stacks"),
                }
            }
            Operation::DeleteStack { .. } => f.write_str("delete stack"),
            Operation::ResetTabletop => f.write_str("reset tabletop"),
        }
    }
}

/// Notification shown after undo or redo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Undo(Operation),
    Redo(Operation),
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notification::Undo(op) => write!(f, "Undo: {op}"),
            Notification::Redo(op) => write!(f, "Redo: {op}"),
        }
    }
}
