//! What to flag: per-line classification into typed opportunities.

mod issues;
mod scoring;


use std::sync::LazyLock;

pub use issues::{IssueDetector, PassiveVoice, WeakIntensifiers, default_issue_detectors};
use regex::Regex;
pub use scoring::{BASE_CONFIDENCE, ScoreKey, confidence};

use crate::document::DocumentContext;
use crate::error::{AnnotateError, Result};
use crate::opportunity::{Opportunity, OpportunityType};

/// Documents with more words than this get a `metrics` opportunity.
pub const METRICS_WORD_THRESHOLD: usize = 500;

static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*#{1,6}(?:\s|$)").expect("heading pattern is valid"));
static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(?:[-*+•]|\d+[.)])\s+\S").expect("bullet pattern is valid"));
static HEDGING: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)\b(?:i\s+think|maybe|perhaps)\b").expect("hedging pattern is valid"));
static TELLING: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)\b(?:felt|thought|believed|knew|realized)\b").expect("telling pattern is valid"));

/// Returns true for lines never considered for line opportunities.
pub fn is_skipped_line(text: &str) -> bool {
	text.trim().is_empty() || HEADING.is_match(text)
}

/// Maps `(context, line text)` to opportunities.
///
/// Pure: the same inputs always produce the same output, which is what makes
/// the per-line cache sound.
pub struct OpportunityDetector {
	issue_detectors: Vec<Box<dyn IssueDetector>>,
}

impl Default for OpportunityDetector {
	fn default() -> Self {
		Self::with_issue_detectors(default_issue_detectors())
	}
}

impl OpportunityDetector {
	pub fn with_issue_detectors(issue_detectors: Vec<Box<dyn IssueDetector>>) -> Self {
		Self { issue_detectors }
	}

	pub fn issue_detector_names(&self) -> Vec<&'static str> {
		self.issue_detectors.iter().map(|d| d.name()).collect()
	}

	/// Classifies one line. Output order is enhancement, quickfix, transform.
	///
	/// Blank lines and headings yield nothing. A failing issue detector fails
	/// the whole line so the caller can drop it without publishing a partial
	/// quickfix.
	pub fn detect_line(&self, ctx: &DocumentContext, line: usize, text: &str) -> Result<Vec<Opportunity>> {
		if is_skipped_line(text) {
			return Ok(Vec::new());
		}

		let column = text.trim_end_matches(['\n', '\r']).chars().count();
		let mut out = Vec::new();

		if BULLET.is_match(text) || HEDGING.is_match(text) {
			out.push(Opportunity::new(
				line,
				column,
				OpportunityType::Enhancement,
				confidence(OpportunityType::Enhancement, ctx),
			));
		}

		let mut issues = Vec::new();
		for detector in &self.issue_detectors {
			let found = detector.detect(line, text).map_err(|e| match e {
				AnnotateError::Detector { .. } => e,
				other => AnnotateError::Detector {
					detector: detector.name(),
					line,
					message: other.to_string(),
				},
			})?;
			issues.extend(found);
		}
		if !issues.is_empty() {
			out.push(
				Opportunity::new(line, column, OpportunityType::Quickfix, confidence(OpportunityType::Quickfix, ctx))
					.with_issues(issues),
			);
		}

		if TELLING.is_match(text) {
			out.push(Opportunity::new(
				line,
				column,
				OpportunityType::Transform,
				confidence(OpportunityType::Transform, ctx),
			));
		}

		Ok(out)
	}

	/// Document-level word-count opportunity, anchored to `anchor_line`.
	pub fn detect_metrics(&self, ctx: &DocumentContext, anchor_line: usize) -> Option<Opportunity> {
		(ctx.word_count > METRICS_WORD_THRESHOLD).then(|| {
			Opportunity::new(anchor_line, 0, OpportunityType::Metrics, confidence(OpportunityType::Metrics, ctx))
		})
	}
}
