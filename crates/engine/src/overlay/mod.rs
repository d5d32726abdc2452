//! Rendered markers and their anchors.
//!
//! Markers are anchored to char offsets in the document, not to line numbers.
//! Edits are recorded as they happen and mapped through before any publish, so
//! a marker follows its text until the next analysis replaces it.

use std::collections::BTreeMap;
use std::fmt;

use marginalia_primitives::{Bias, CharIdx, ChangeSet, LineIdx, LineSpan};

use crate::opportunity::{Opportunity, OpportunityType};

#[cfg(test)]
mod tests;

/// Stable handle for one published marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(u64);

impl fmt::Display for MarkerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "marker#{}", self.0)
	}
}

/// Document position a marker is attached to.
///
/// `pos` is where the marker renders (end of line text). The span offsets
/// track the line's text and the line breaks on either side of it, which decide
/// whether an edit removed the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
	pos: CharIdx,
	span: LineSpan,
}

impl Anchor {
	pub fn for_span(span: &LineSpan) -> Self {
		Self {
			pos: span.text_end,
			span: span.clone(),
		}
	}

	pub fn pos(&self) -> CharIdx {
		self.pos
	}

	/// Current offsets of the anchored line.
	pub fn span(&self) -> &LineSpan {
		&self.span
	}

	/// Returns true if `changes` delete the line: all of its text together with
	/// either the preceding or the trailing line break.
	///
	/// A document's only line has no breaks and is deleted with its text.
	pub fn is_deleted_by(&self, changes: &ChangeSet) -> bool {
		let LineSpan {
			break_start,
			start,
			text_end,
			end,
		} = self.span;
		let has_leading = break_start < start;
		let has_trailing = text_end < end;

		(has_trailing && changes.is_span_deleted(start, end))
			|| (has_leading && changes.is_span_deleted(break_start, text_end))
			|| (!has_leading && !has_trailing && changes.is_span_deleted(start, text_end))
	}

	/// Maps the anchor across `changes`, or `None` if its line was deleted.
	pub fn remap(&self, changes: &ChangeSet) -> Option<Self> {
		if self.is_deleted_by(changes) {
			return None;
		}
		// Text inserted at a boundary joins the line it is typed into.
		let break_start = changes.map_pos(self.span.break_start, Bias::Right);
		let start = changes.map_pos(self.span.start, Bias::Left).max(break_start);
		let text_end = changes.map_pos(self.span.text_end, Bias::Right).max(start);
		let end = changes.map_pos(self.span.end, Bias::Left).max(text_end);
		let pos = changes.map_pos(self.pos, Bias::Left).clamp(start, text_end);
		Some(Self {
			pos,
			span: LineSpan {
				break_start,
				start,
				text_end,
				end,
			},
		})
	}
}

/// A positioned projection of an [`Opportunity`].
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayMarker {
	pub id: MarkerId,
	/// Line the anchor currently sits on.
	pub line: LineIdx,
	pub anchor: Anchor,
	pub opportunity: Opportunity,
}

impl OverlayMarker {
	pub fn identity(&self) -> (LineIdx, OpportunityType) {
		(self.line, self.opportunity.kind)
	}
}

/// Delivered to the click sink when a marker is activated.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerClick {
	pub marker: MarkerId,
	pub line: LineIdx,
	pub opportunity: Opportunity,
}

type ClickSink = Box<dyn FnMut(&MarkerClick)>;

/// Current marker set for one document.
///
/// Updates are transactional: pending edits are mapped first, then the
/// published list replaces the set wholesale. There is at most one marker
/// per `(line, type)` at any time.
#[derive(Default)]
pub struct OverlayStateStore {
	markers: Vec<OverlayMarker>,
	by_line: BTreeMap<LineIdx, Vec<usize>>,
	pending: Vec<ChangeSet>,
	next_id: u64,
	version: u64,
	click_sink: Option<ClickSink>,
}

impl fmt::Debug for OverlayStateStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("OverlayStateStore")
			.field("markers", &self.markers)
			.field("pending", &self.pending.len())
			.field("version", &self.version)
			.field("click_sink", &self.click_sink.is_some())
			.finish()
	}
}

impl OverlayStateStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers the listener that receives marker clicks, replacing any previous one.
	pub fn set_click_sink(&mut self, sink: impl FnMut(&MarkerClick) + 'static) {
		self.click_sink = Some(Box::new(sink));
	}

	/// Records an edit applied to the document since the last publish.
	pub fn note_change(&mut self, changes: ChangeSet) {
		if !changes.is_identity() {
			self.pending.push(changes);
		}
	}

	pub fn has_pending_changes(&self) -> bool {
		!self.pending.is_empty()
	}

	/// Maps every marker through the recorded edits, in order.
	///
	/// `line_of` converts a char offset in the current document to its line.
	/// Markers whose line was deleted are dropped, and markers that collapse
	/// onto an existing `(line, type)` are dropped in favour of the earlier one.
	pub fn map_pending(&mut self, line_of: impl Fn(CharIdx) -> LineIdx) {
		if self.pending.is_empty() {
			return;
		}
		let pending = std::mem::take(&mut self.pending);
		let before = self.markers.len();

		let markers = std::mem::take(&mut self.markers);
		let mut kept: Vec<OverlayMarker> = Vec::with_capacity(markers.len());
		for mut marker in markers {
			let mut anchor = Some(marker.anchor.clone());
			for changes in &pending {
				anchor = anchor.and_then(|a| a.remap(changes));
			}
			let Some(anchor) = anchor else {
				tracing::trace!(id = %marker.id, line = marker.line, "overlay.drop");
				continue;
			};

			let line = line_of(anchor.pos);
			if kept.iter().any(|m| m.identity() == (line, marker.opportunity.kind)) {
				continue;
			}
			marker.line = line;
			marker.opportunity.line = line;
			marker.anchor = anchor;
			kept.push(marker);
		}

		self.markers = kept;
		self.reindex();
		self.version += 1;
		tracing::trace!(
			edits = pending.len(),
			before,
			after = self.markers.len(),
			"overlay.remap"
		);
	}

	/// Replaces the marker set with `placed`.
	///
	/// Pending edits are mapped first so that nothing stale survives into the
	/// new set. Duplicate identities in `placed` keep the first occurrence.
	pub fn publish(&mut self, placed: Vec<(Opportunity, Anchor)>, line_of: impl Fn(CharIdx) -> LineIdx) {
		self.map_pending(&line_of);

		self.markers.clear();
		for (opportunity, anchor) in placed {
			let line = opportunity.line;
			if self.markers.iter().any(|m| m.identity() == (line, opportunity.kind)) {
				continue;
			}
			let id = MarkerId(self.next_id);
			self.next_id += 1;
			self.markers.push(OverlayMarker {
				id,
				line,
				anchor,
				opportunity,
			});
		}

		self.reindex();
		self.version += 1;
		tracing::debug!(markers = self.markers.len(), version = self.version, "overlay.publish");
	}

	/// Removes every marker. Pending edits are discarded with them.
	pub fn clear(&mut self) {
		self.pending.clear();
		if self.markers.is_empty() {
			return;
		}
		self.markers.clear();
		self.by_line.clear();
		self.version += 1;
	}

	/// Delivers a click on `id` to the sink.
	///
	/// Returns the click event, or `None` if the marker no longer exists.
	/// Neither the marker set nor the document is touched.
	pub fn click(&mut self, id: MarkerId) -> Option<MarkerClick> {
		let marker = self.markers.iter().find(|m| m.id == id)?;
		let event = MarkerClick {
			marker: marker.id,
			line: marker.line,
			opportunity: marker.opportunity.clone(),
		};
		if let Some(sink) = self.click_sink.as_mut() {
			sink(&event);
		}
		Some(event)
	}

	/// Markers in publish order.
	pub fn markers(&self) -> &[OverlayMarker] {
		&self.markers
	}

	pub fn marker(&self, id: MarkerId) -> Option<&OverlayMarker> {
		self.markers.iter().find(|m| m.id == id)
	}

	/// Opportunities currently shown on `line`.
	pub fn opportunities_on(&self, line: LineIdx) -> impl Iterator<Item = &Opportunity> {
		self.by_line
			.get(&line)
			.into_iter()
			.flatten()
			.map(|&i| &self.markers[i].opportunity)
	}

	/// Lines that carry at least one marker, ascending.
	pub fn lines(&self) -> impl Iterator<Item = LineIdx> + '_ {
		self.by_line.keys().copied()
	}

	pub fn len(&self) -> usize {
		self.markers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.markers.is_empty()
	}

	/// Bumped on every change to the marker set.
	pub fn version(&self) -> u64 {
		self.version
	}

	fn reindex(&mut self) {
		self.by_line.clear();
		for (i, marker) in self.markers.iter().enumerate() {
			self.by_line.entry(marker.line).or_default().push(i);
		}
	}
}
