//! Rope utilities for line-anchored positions.

use ropey::RopeSlice;

use crate::range::{CharIdx, LineIdx};

/// Char offsets describing one line of a document.
///
/// Offsets are ordered `break_start <= start <= text_end <= end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpan {
	/// Start of the line break that precedes this line. Equals `start` on line 0.
	pub break_start: CharIdx,
	/// First char of the line.
	pub start: CharIdx,
	/// Offset just past the last non-newline char. Markers anchor here.
	pub text_end: CharIdx,
	/// Offset just past the line's own line break. Equals `text_end` on the last line.
	pub end: CharIdx,
}

impl LineSpan {
	/// Returns the line's text, excluding its line break.
	pub fn text(&self) -> std::ops::Range<CharIdx> {
		self.start..self.text_end
	}
}

/// Computes the [`LineSpan`] for `line`, or `None` if the line does not exist.
pub fn line_span(text: RopeSlice, line: LineIdx) -> Option<LineSpan> {
	if line >= text.len_lines() {
		return None;
	}

	let start = text.line_to_char(line);
	let end = start + text.line(line).len_chars();
	let text_end = strip_line_break(text, start, end);
	let break_start = if line == 0 {
		start
	} else {
		strip_line_break(text, text.line_to_char(line - 1), start)
	};

	Some(LineSpan {
		break_start,
		start,
		text_end,
		end,
	})
}

/// Walks back from `end` over trailing `\n`/`\r`, stopping at `start`.
fn strip_line_break(text: RopeSlice, start: CharIdx, end: CharIdx) -> CharIdx {
	let mut text_end = end;
	let mut chars = text.chars_at(end);
	while text_end > start {
		match chars.prev() {
			Some('\n' | '\r') => text_end -= 1,
			_ => break,
		}
	}
	text_end
}
