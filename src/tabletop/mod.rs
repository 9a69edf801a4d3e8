//! Tabletops: stack layouts under undo/redo, one per deck.
//!
//! - [`Tabletop`]: one deck's snapshot wrapped in a history, with one method
//!   per operation and read-only selectors
//! - [`Tabletops`]: routes operations by deck id, deals initial layouts and
//!   purges deleted cards

mod registry;
mod table;

pub use registry::Tabletops;
pub use table::Tabletop;
