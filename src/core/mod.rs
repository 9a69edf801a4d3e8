//! Core types: identifiers, configuration, and the session seed source.
//!
//! These are shared by the history engine's tabletop snapshot and the
//! `Tabletops` container; none of them depend on stack semantics.

pub mod entity;
pub mod rng;
pub mod config;

pub use entity::{CardId, CardInstanceId, DeckId, StackId};
pub use rng::{SeedSource, SeedSourceState};
pub use config::{TabletopConfig, DEFAULT_MAX_HISTORY};
