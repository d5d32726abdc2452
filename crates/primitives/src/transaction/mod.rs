//! Change sets and transactions.
//!
//! A [`Transaction`] is built from a list of non-overlapping [`Change`]s against
//! a specific document and lowered to a [`ChangeSet`], which can be applied to
//! a rope and used to map positions from the old document into the new one.

mod changeset;
mod types;


pub use changeset::ChangeSet;
pub use types::{Bias, Change, Insertion, Operation};

use crate::{Rope, RopeSlice};

/// A document edit: a [`ChangeSet`] sized to the document it was built against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
	changes: ChangeSet,
}

impl Transaction {
	/// Builds a transaction from changes sorted by `start`.
	///
	/// Overlapping changes are clipped to start after the previous change, and
	/// ranges past the end of the document are clamped.
	pub fn change(doc: RopeSlice, changes: impl IntoIterator<Item = Change>) -> Self {
		let len = doc.len_chars();
		let mut cs = ChangeSet::default();
		let mut last = 0;

		for change in changes {
			let start = change.start.clamp(last, len);
			let end = change.end.clamp(start, len);
			cs.retain(start - last);
			if let Some(text) = change.replacement {
				cs.insert(text);
			}
			cs.delete(end - start);
			last = end;
		}
		cs.retain(len - last);

		debug_assert_eq!(cs.len(), len);
		Self { changes: cs }
	}

	/// Inserts `text` at `pos`.
	pub fn insert(doc: RopeSlice, pos: usize, text: impl Into<String>) -> Self {
		Self::change(doc, [Change::insert(pos, text)])
	}

	/// Deletes `[start, end)`.
	pub fn delete(doc: RopeSlice, start: usize, end: usize) -> Self {
		Self::change(doc, [Change::delete(start, end)])
	}

	/// Returns the underlying changeset.
	pub fn changes(&self) -> &ChangeSet {
		&self.changes
	}

	/// Consumes the transaction, returning its changeset.
	pub fn into_changes(self) -> ChangeSet {
		self.changes
	}

	/// Applies the transaction to `doc`.
	pub fn apply(&self, doc: &mut Rope) {
		self.changes.apply(doc);
	}
}
