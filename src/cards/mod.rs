//! Card instances placed on a tabletop.
//!
//! ## Key Types
//!
//! - `Side`: which face an instance shows
//! - `CardInstance`: one placement of a card, distinct from the card's identity

pub mod instance;

pub use instance::{CardInstance, Side};
