//! Detected, line-anchored suggestions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of an [`Opportunity`].
///
/// Declaration order is detection order, which is the tie-break used when
/// two opportunities share a confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityType {
	Enhancement,
	Quickfix,
	Transform,
	Metrics,
}

impl OpportunityType {
	/// Marker glyph for renderers that have no styling of their own.
	pub fn icon(self) -> &'static str {
		match self {
			Self::Enhancement => "✨",
			Self::Quickfix => "🔧",
			Self::Transform => "🔄",
			Self::Metrics => "📊",
		}
	}

	/// Position in detector order: enhancement, quickfix, transform, metrics.
	pub fn detection_rank(self) -> u8 {
		self as u8
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Enhancement => "enhancement",
			Self::Quickfix => "quickfix",
			Self::Transform => "transform",
			Self::Metrics => "metrics",
		}
	}
}

impl fmt::Display for OpportunityType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A command the user can run against an opportunity, as ranked by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRef {
	pub id: String,
	pub label: String,
}

impl CommandRef {
	pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
		}
	}
}

/// Which family of issue detector produced an [`Issue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
	PassiveVoice,
	WeakIntensifier,
	/// Produced by a detector registered outside this crate.
	Custom(&'static str),
}

/// A concrete problem found inside a line.
///
/// Indices are char offsets into the line text, `end_index` exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
	pub kind: IssueKind,
	pub matched_text: String,
	pub start_index: usize,
	pub end_index: usize,
	pub description: String,
	pub suggested_fix: Option<String>,
}

/// How downstream command execution must treat an opportunity's issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixStrategy {
	/// No specific issues; commands operate on the whole line.
	WholeLine,
	/// Exactly one issue, which may be fixed on its own.
	Individual,
	/// Several issues that must be fixed together in one edit. Fixing them
	/// one at a time can leave the line ungrammatical.
	Combined,
}

/// A detected suggestion tied to a line.
///
/// Identity is `(line, kind)`. Opportunities are never mutated after
/// detection; a re-analysis produces fresh values.
#[derive(Debug, Clone, PartialEq)]
pub struct Opportunity {
	pub line: usize,
	/// Char column the marker attaches to; end of line for line opportunities.
	pub column: usize,
	pub kind: OpportunityType,
	/// Ranked commands from the catalog. Empty until the coordinator attaches them.
	pub commands: Vec<CommandRef>,
	/// Heuristic score in `[0, 1]`.
	pub confidence: f32,
	/// Issues backing a quickfix opportunity, in detector order.
	pub issues: Vec<Issue>,
}

impl Opportunity {
	pub fn new(line: usize, column: usize, kind: OpportunityType, confidence: f32) -> Self {
		Self {
			line,
			column,
			kind,
			commands: Vec::new(),
			confidence: confidence.clamp(0.0, 1.0),
			issues: Vec::new(),
		}
	}

	pub fn with_issues(mut self, issues: Vec<Issue>) -> Self {
		self.issues = issues;
		self
	}

	pub fn identity(&self) -> (usize, OpportunityType) {
		(self.line, self.kind)
	}

	pub fn icon(&self) -> &'static str {
		self.kind.icon()
	}

	/// Number of specific issues, or `None` when the opportunity has none.
	pub fn issue_count(&self) -> Option<usize> {
		(!self.issues.is_empty()).then_some(self.issues.len())
	}

	pub fn fix_strategy(&self) -> FixStrategy {
		match self.issues.len() {
			0 => FixStrategy::WholeLine,
			1 => FixStrategy::Individual,
			_ => FixStrategy::Combined,
		}
	}

	/// Single instruction covering every issue, for the combined-fix path.
	///
	/// Issues are listed in line order so the executor sees them as they read.
	pub fn combined_fix_instruction(&self) -> Option<String> {
		if self.fix_strategy() != FixStrategy::Combined {
			return None;
		}

		let mut issues: Vec<&Issue> = self.issues.iter().collect();
		issues.sort_by_key(|issue| issue.start_index);

		let parts: Vec<String> = issues
			.iter()
			.map(|issue| match &issue.suggested_fix {
				Some(fix) => format!("\"{}\": {}", issue.matched_text, fix),
				None => format!("\"{}\": {}", issue.matched_text, issue.description),
			})
			.collect();

		Some(format!("Fix all {} issues in one rewrite of the line: {}", issues.len(), parts.join("; ")))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn issue(text: &str, start: usize) -> Issue {
		Issue {
			kind: IssueKind::WeakIntensifier,
			matched_text: text.to_string(),
			start_index: start,
			end_index: start + text.len(),
			description: "weak intensifier".to_string(),
			suggested_fix: Some("remove it".to_string()),
		}
	}

	#[test]
	fn test_fix_strategy_by_issue_count() {
		let base = Opportunity::new(0, 0, OpportunityType::Quickfix, 0.7);
		assert_eq!(base.fix_strategy(), FixStrategy::WholeLine);
		assert_eq!(base.issue_count(), None);

		let one = base.clone().with_issues(vec![issue("very", 4)]);
		assert_eq!(one.fix_strategy(), FixStrategy::Individual);
		assert!(one.combined_fix_instruction().is_none());

		let two = base.with_issues(vec![issue("very", 10), issue("really", 2)]);
		assert_eq!(two.fix_strategy(), FixStrategy::Combined);
		assert_eq!(two.issue_count(), Some(2));
	}

	#[test]
	fn test_combined_instruction_lists_issues_in_line_order() {
		let opp = Opportunity::new(3, 0, OpportunityType::Quickfix, 0.7)
			.with_issues(vec![issue("very", 10), issue("really", 2)]);
		let text = opp.combined_fix_instruction().unwrap();
		let really = text.find("really").unwrap();
		let very = text.find("\"very\"").unwrap();
		assert!(really < very, "{text}");
		assert!(text.starts_with("Fix all 2 issues"));
	}

	#[test]
	fn test_confidence_is_clamped() {
		assert_eq!(Opportunity::new(0, 0, OpportunityType::Enhancement, 1.7).confidence, 1.0);
		assert_eq!(Opportunity::new(0, 0, OpportunityType::Enhancement, -0.2).confidence, 0.0);
	}

	#[test]
	fn test_detection_rank_order() {
		assert!(OpportunityType::Enhancement.detection_rank() < OpportunityType::Quickfix.detection_rank());
		assert!(OpportunityType::Quickfix.detection_rank() < OpportunityType::Transform.detection_rank());
		assert!(OpportunityType::Transform.detection_rank() < OpportunityType::Metrics.detection_rank());
	}
}
