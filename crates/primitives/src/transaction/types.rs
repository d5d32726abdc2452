use crate::range::{CharIdx, CharLen};

/// A single text replacement: `[start, end)` becomes `replacement`.
///
/// A `None` replacement is a plain deletion. A `start == end` change with a
/// replacement is a plain insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
	/// The starting character index of the change.
	pub start: CharIdx,
	/// The ending character index of the change (exclusive).
	pub end: CharIdx,
	/// The replacement text, or [`None`] for deletion.
	pub replacement: Option<String>,
}

impl Change {
	/// Inserts `text` at `pos`.
	pub fn insert(pos: CharIdx, text: impl Into<String>) -> Self {
		Self {
			start: pos,
			end: pos,
			replacement: Some(text.into()),
		}
	}

	/// Deletes `[start, end)`.
	pub fn delete(start: CharIdx, end: CharIdx) -> Self {
		Self {
			start,
			end,
			replacement: None,
		}
	}

	/// Replaces `[start, end)` with `text`.
	pub fn replace(start: CharIdx, end: CharIdx, text: impl Into<String>) -> Self {
		Self {
			start,
			end,
			replacement: Some(text.into()),
		}
	}
}

/// Bias determines how positions at change boundaries are mapped.
///
/// When mapping a position through a change, bias determines whether the position
/// moves with insertions or stays before them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
	/// Position stays before insertions at the same location.
	Left,
	/// Position moves after insertions at the same location.
	Right,
}

/// Inserted text and its length in chars.
///
/// Private fields keep `char_len` equal to `text.chars().count()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
	text: String,
	char_len: CharLen,
}

impl Insertion {
	#[inline]
	pub fn new(text: String) -> Self {
		let char_len = text.chars().count();
		Self { text, char_len }
	}

	#[inline]
	pub fn text(&self) -> &str {
		&self.text
	}

	#[inline]
	pub fn char_len(&self) -> CharLen {
		self.char_len
	}

	pub(super) fn push(&mut self, other: Insertion) {
		self.text.push_str(&other.text);
		self.char_len += other.char_len;
	}
}

/// One step of a [`ChangeSet`](super::ChangeSet) walk over the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
	/// Keep the next `n` chars.
	Retain(CharLen),
	/// Drop the next `n` chars.
	Delete(CharLen),
	/// Insert text before the next source char.
	Insert(Insertion),
}
