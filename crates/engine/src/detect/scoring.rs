//! Heuristic confidence scoring.
//!
//! Deterministic: identical inputs always produce the identical score.

use crate::document::{DocumentContext, DocumentType};
use crate::opportunity::OpportunityType;

pub const BASE_CONFIDENCE: f32 = 0.7;

/// Selections longer than this many chars count as a rich selection.
const RICH_SELECTION_CHARS: usize = 10;
/// Cursor paragraphs longer than this many chars count as rich context.
const RICH_CONTEXT_CHARS: usize = 20;

/// The parts of a [`DocumentContext`] that move a line's score.
///
/// Cached line results stay valid only while this is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScoreKey {
	pub document_type: DocumentType,
	pub rich_selection: bool,
	pub rich_context: bool,
}

impl ScoreKey {
	pub fn of(ctx: &DocumentContext) -> Self {
		Self {
			document_type: ctx.document_type,
			rich_selection: ctx.selection_text.trim().chars().count() > RICH_SELECTION_CHARS,
			rich_context: ctx.cursor_context.trim().chars().count() > RICH_CONTEXT_CHARS,
		}
	}
}

/// Scores an opportunity of `kind` in `ctx`, capped at 1.0.
pub fn confidence(kind: OpportunityType, ctx: &DocumentContext) -> f32 {
	let key = ScoreKey::of(ctx);
	let mut score = BASE_CONFIDENCE;

	match (key.document_type, kind) {
		(DocumentType::Academic, OpportunityType::Enhancement) => score += 0.2,
		(DocumentType::Blog, OpportunityType::Quickfix) => score += 0.3,
		_ => {}
	}
	if key.rich_selection {
		score += 0.2;
	}
	if key.rich_context {
		score += 0.1;
	}

	score.min(1.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ctx(document_type: DocumentType, selection: &str, cursor: &str) -> DocumentContext {
		DocumentContext {
			document_type,
			selection_text: selection.to_string(),
			cursor_context: cursor.to_string(),
			word_count: 0,
		}
	}

	#[test]
	fn test_base_score() {
		let c = confidence(OpportunityType::Transform, &ctx(DocumentType::General, "", ""));
		assert_eq!(c, BASE_CONFIDENCE);
	}

	#[test]
	fn test_document_type_adjustments() {
		let academic = ctx(DocumentType::Academic, "", "");
		assert!((confidence(OpportunityType::Enhancement, &academic) - 0.9).abs() < 1e-6);
		assert_eq!(confidence(OpportunityType::Quickfix, &academic), BASE_CONFIDENCE);

		let blog = ctx(DocumentType::Blog, "", "");
		assert!((confidence(OpportunityType::Quickfix, &blog) - 1.0).abs() < 1e-6);
	}

	#[test]
	fn test_context_adjustments_stack_and_cap() {
		let rich = ctx(DocumentType::Academic, "a selection of text", "a paragraph that is long enough");
		assert_eq!(confidence(OpportunityType::Enhancement, &rich), 1.0);

		let short = ctx(DocumentType::General, "short", "tiny");
		assert_eq!(confidence(OpportunityType::Enhancement, &short), BASE_CONFIDENCE);

		let sel_only = ctx(DocumentType::General, "exactly eleven", "");
		assert!((confidence(OpportunityType::Enhancement, &sel_only) - 0.9).abs() < 1e-6);
	}

	#[test]
	fn test_score_key_tracks_only_scoring_inputs() {
		let a = ctx(DocumentType::Blog, "short", "tiny");
		let b = ctx(DocumentType::Blog, "brief", "small");
		assert_eq!(ScoreKey::of(&a), ScoreKey::of(&b));

		let c = ctx(DocumentType::Blog, "a much longer selection", "tiny");
		assert_ne!(ScoreKey::of(&a), ScoreKey::of(&c));
	}

	#[test]
	fn test_deterministic() {
		let c = ctx(DocumentType::Blog, "some selected words", "the paragraph around the cursor");
		let first = confidence(OpportunityType::Quickfix, &c);
		for _ in 0..100 {
			assert_eq!(confidence(OpportunityType::Quickfix, &c), first);
		}
	}
}
