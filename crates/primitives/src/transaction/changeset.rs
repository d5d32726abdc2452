use super::types::{Bias, Insertion, Operation};
use crate::Rope;
use crate::range::{CharIdx, CharLen};

/// A sequence of retain/delete/insert operations covering a whole document.
///
/// Hosts describe each edit as a `ChangeSet`, and marker anchors are mapped
/// through it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
	pub(super) changes: Vec<Operation>,
	/// Length of the source document before changes.
	pub(super) len: usize,
	/// Length of the document after applying changes.
	pub(super) len_after: usize,
}

impl ChangeSet {
	/// Source document length in chars.
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn len_after(&self) -> usize {
		self.len_after
	}

	pub fn is_empty(&self) -> bool {
		self.changes.is_empty()
	}

	/// Returns true if applying this changeset leaves the document unchanged.
	pub fn is_identity(&self) -> bool {
		self.changes.iter().all(|op| matches!(op, Operation::Retain(_)))
	}

	pub fn changes(&self) -> &[Operation] {
		&self.changes
	}

	/// Adds a retain operation. Consecutive retains are merged.
	pub(crate) fn retain(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len += n;
		self.len_after += n;

		if let Some(Operation::Retain(count)) = self.changes.last_mut() {
			*count += n;
		} else {
			self.changes.push(Operation::Retain(n));
		}
	}

	/// Adds a delete operation. Consecutive deletes are merged.
	pub(crate) fn delete(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len += n;

		if let Some(Operation::Delete(count)) = self.changes.last_mut() {
			*count += n;
		} else {
			self.changes.push(Operation::Delete(n));
		}
	}

	/// Adds an insert operation.
	///
	/// Inserts are kept ahead of an adjacent delete so that `[Insert, Delete]`
	/// is the single canonical form of a replacement.
	pub(crate) fn insert(&mut self, text: String) {
		if text.is_empty() {
			return;
		}

		let ins = Insertion::new(text);
		self.len_after += ins.char_len();

		match self.changes.as_mut_slice() {
			[.., Operation::Insert(prev)] | [.., Operation::Insert(prev), Operation::Delete(_)] => {
				prev.push(ins);
			}
			[.., last @ Operation::Delete(_)] => {
				let del = std::mem::replace(last, Operation::Insert(ins));
				self.changes.push(del);
			}
			_ => {
				self.changes.push(Operation::Insert(ins));
			}
		}
	}

	/// Applies the edit to `doc` in place.
	pub fn apply(&self, doc: &mut Rope) {
		let mut pos = 0;
		for op in &self.changes {
			match op {
				Operation::Retain(n) => {
					pos += n;
				}
				Operation::Delete(n) => {
					doc.remove(pos..pos + n);
				}
				Operation::Insert(ins) => {
					doc.insert(pos, ins.text());
					pos += ins.char_len();
				}
			}
		}
	}

	/// Maps an old-document position into the new document.
	///
	/// `bias` decides which side of an insertion at exactly `pos` the result lands on.
	///
	/// Positions inside a deleted span collapse to the start of the deletion.
	pub fn map_pos(&self, pos: CharIdx, bias: Bias) -> CharIdx {
		let mut old_pos = 0;
		let mut new_pos = 0;

		for op in &self.changes {
			if old_pos > pos {
				break;
			}

			match op {
				Operation::Retain(n) => {
					if old_pos + n > pos {
						return new_pos + (pos - old_pos);
					}
					old_pos += n;
					new_pos += n;
				}
				Operation::Delete(n) => {
					if old_pos + n > pos {
						return new_pos;
					}
					old_pos += n;
				}
				Operation::Insert(ins) => {
					if !(old_pos == pos && bias == Bias::Left) {
						new_pos += ins.char_len();
					}
				}
			}
		}

		new_pos + (pos - old_pos)
	}

	/// Returns true if every char in `[start, end)` is removed by this changeset.
	///
	/// An empty span is never considered deleted.
	pub fn is_span_deleted(&self, start: CharIdx, end: CharIdx) -> bool {
		if start >= end {
			return false;
		}

		let mut old_pos = 0;
		let mut covered = start;
		for op in &self.changes {
			match op {
				Operation::Retain(n) => {
					let op_end = old_pos + n;
					if op_end > covered && old_pos < end {
						return false;
					}
					old_pos = op_end;
				}
				Operation::Delete(n) => {
					let op_end = old_pos + n;
					if old_pos <= covered && op_end > covered {
						covered = op_end;
					}
					old_pos = op_end;
				}
				Operation::Insert(_) => {}
			}
			if covered >= end {
				return true;
			}
			if old_pos >= end {
				break;
			}
		}

		// Trailing chars not mentioned by any operation are implicitly retained.
		covered >= end
	}
}
