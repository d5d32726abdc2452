//! Core text types shared between the annotation engine and its host editor:
//! char-indexed ranges, change sets, transactions, and rope line helpers.

/// Char and line index aliases.
pub mod range;
/// Rope line helpers.
pub mod rope;
/// Change sets and transactions with position mapping.
pub mod transaction;

pub use range::{CharIdx, CharLen, LineIdx};
pub use rope::{LineSpan, line_span};
pub use ropey::{Rope, RopeSlice};
pub use transaction::{Bias, Change, ChangeSet, Transaction};
