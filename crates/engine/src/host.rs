//! The boundary to the host editor and the command catalog.

use std::ops::Range;

use marginalia_primitives::{Bias, CharIdx, LineIdx, LineSpan, Rope, Transaction, line_span};
use rustc_hash::FxHashMap;

use crate::document::count_words;
use crate::error::{AnnotateError, Result};
use crate::opportunity::{CommandRef, OpportunityType};
use crate::viewport::ViewportGeometry;

/// Read access to the edited document plus the ability to apply edits.
pub trait HostEditor {
	fn line_count(&self) -> usize;

	/// Text of `line` without its line ending, or `None` past the end.
	fn line_text(&self, line: LineIdx) -> Option<String>;

	/// Char offsets of `line`, used to anchor markers.
	fn line_span(&self, line: LineIdx) -> Option<LineSpan>;

	/// Line containing char offset `pos`, clamped to the last line.
	fn line_of_offset(&self, pos: CharIdx) -> LineIdx;

	fn cursor_position(&self) -> CharIdx;

	/// Selected text, empty when nothing is selected.
	fn selection_text(&self) -> String;

	/// Text of the paragraph containing the cursor.
	fn cursor_context(&self) -> String;

	/// Current scroll geometry. Fails when the view cannot be measured.
	fn viewport_geometry(&self) -> Result<ViewportGeometry>;

	/// Applies `tx`, which was built against the current document.
	fn apply(&mut self, tx: &Transaction);

	fn word_count(&self) -> usize {
		(0..self.line_count())
			.filter_map(|line| self.line_text(line))
			.map(|text| count_words(&text))
			.sum()
	}
}

/// Supplies ranked commands for an opportunity type.
pub trait CommandCatalog {
	fn commands_for(&self, kind: OpportunityType) -> Vec<CommandRef>;
}

/// Fixed in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
	commands: FxHashMap<OpportunityType, Vec<CommandRef>>,
}

impl StaticCatalog {
	pub fn empty() -> Self {
		Self::default()
	}

	/// Catalog with a few general-purpose commands per type.
	pub fn builtin() -> Self {
		Self::empty()
			.with(
				OpportunityType::Enhancement,
				[
					CommandRef::new("expand", "Expand this point"),
					CommandRef::new("clarify", "Make it clearer"),
					CommandRef::new("strengthen", "State it with confidence"),
				],
			)
			.with(
				OpportunityType::Quickfix,
				[
					CommandRef::new("fix-issues", "Fix writing issues"),
					CommandRef::new("active-voice", "Rewrite in active voice"),
				],
			)
			.with(
				OpportunityType::Transform,
				[
					CommandRef::new("show-dont-tell", "Show, don't tell"),
					CommandRef::new("rephrase", "Rephrase"),
				],
			)
			.with(
				OpportunityType::Metrics,
				[
					CommandRef::new("summarize", "Summarize document"),
					CommandRef::new("readability", "Check readability"),
				],
			)
	}

	/// Replaces the ranked commands for `kind`.
	pub fn with(mut self, kind: OpportunityType, commands: impl IntoIterator<Item = CommandRef>) -> Self {
		self.commands.insert(kind, commands.into_iter().collect());
		self
	}
}

impl CommandCatalog for StaticCatalog {
	fn commands_for(&self, kind: OpportunityType) -> Vec<CommandRef> {
		self.commands.get(&kind).cloned().unwrap_or_default()
	}
}

/// A [`HostEditor`] backed by a rope, with explicit cursor and scroll state.
#[derive(Debug, Clone, Default)]
pub struct RopeHost {
	text: Rope,
	cursor: CharIdx,
	selection: Option<Range<CharIdx>>,
	geometry: Option<ViewportGeometry>,
}

impl RopeHost {
	pub fn new(text: &str) -> Self {
		Self {
			text: Rope::from_str(text),
			..Self::default()
		}
	}

	pub fn text(&self) -> &Rope {
		&self.text
	}

	pub fn set_cursor(&mut self, pos: CharIdx) {
		self.cursor = pos.min(self.text.len_chars());
	}

	pub fn set_selection(&mut self, selection: Option<Range<CharIdx>>) {
		let len = self.text.len_chars();
		self.selection = selection.map(|r| r.start.min(len)..r.end.min(len));
	}

	/// Sets the geometry reported to the windower. `None` makes it unreadable.
	pub fn set_geometry(&mut self, geometry: Option<ViewportGeometry>) {
		self.geometry = geometry;
	}

	fn is_blank_line(&self, line: LineIdx) -> bool {
		self.text.line(line).chars().all(char::is_whitespace)
	}
}

impl HostEditor for RopeHost {
	fn line_count(&self) -> usize {
		self.text.len_lines()
	}

	fn line_text(&self, line: LineIdx) -> Option<String> {
		let span = line_span(self.text.slice(..), line)?;
		Some(self.text.slice(span.start..span.text_end).to_string())
	}

	fn line_span(&self, line: LineIdx) -> Option<LineSpan> {
		line_span(self.text.slice(..), line)
	}

	fn line_of_offset(&self, pos: CharIdx) -> LineIdx {
		self.text.char_to_line(pos.min(self.text.len_chars()))
	}

	fn cursor_position(&self) -> CharIdx {
		self.cursor
	}

	fn selection_text(&self) -> String {
		match &self.selection {
			Some(r) if r.start < r.end => self.text.slice(r.clone()).to_string(),
			_ => String::new(),
		}
	}

	fn cursor_context(&self) -> String {
		let line = self.line_of_offset(self.cursor);
		if self.is_blank_line(line) {
			return String::new();
		}

		let mut first = line;
		while first > 0 && !self.is_blank_line(first - 1) {
			first -= 1;
		}
		let mut last = line;
		while last + 1 < self.line_count() && !self.is_blank_line(last + 1) {
			last += 1;
		}

		(first..=last)
			.filter_map(|l| self.line_text(l))
			.collect::<Vec<_>>()
			.join("\n")
	}

	fn viewport_geometry(&self) -> Result<ViewportGeometry> {
		self.geometry
			.ok_or_else(|| AnnotateError::Geometry("view has not been measured".to_string()))
	}

	fn apply(&mut self, tx: &Transaction) {
		let changes = tx.changes();
		self.cursor = changes.map_pos(self.cursor, Bias::Right);
		self.selection = self.selection.take().map(|r| {
			changes.map_pos(r.start, Bias::Right)
				..changes.map_pos(r.end, Bias::Left)
		});
		tx.apply(&mut self.text);
	}
}
