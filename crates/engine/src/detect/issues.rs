//! Regex issue detectors for quickfix opportunities.
//!
//! Each detector is an independent function over line text. The detector list
//! is ordered and pluggable; adding or removing one does not touch scheduling
//! or caching.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::opportunity::{Issue, IssueKind};

/// An independent scan of one line for fixable issues.
pub trait IssueDetector: Send + Sync {
	/// Stable name, used in logs and errors.
	fn name(&self) -> &'static str;

	/// Returns every issue found in `text`, in match order.
	fn detect(&self, line: usize, text: &str) -> Result<Vec<Issue>>;
}

/// The built-in detectors in their canonical order.
pub fn default_issue_detectors() -> Vec<Box<dyn IssueDetector>> {
	vec![Box::new(PassiveVoice), Box::new(WeakIntensifiers)]
}

/// Irregular past participles, which are unambiguous after a form of "be".
const IRREGULAR_PARTICIPLES: &str = "written|taken|given|made|done|seen|known|shown|built|found|held|kept|left|told|sent|broken|chosen|spoken|driven|eaten|forgotten|hidden|stolen|begun|drawn|thrown|won|paid|sold|brought|bought|caught|taught";

/// The reported phrase is whichever capture group matched. A regular `-ed`
/// word after `was/were/is/are` only counts when an agent follows with "by".
static PASSIVE_VOICE: LazyLock<Regex> = LazyLock::new(|| {
	let irregular = IRREGULAR_PARTICIPLES;
	Regex::new(&format!(
		r"(?i)\b(?:((?:has|have|had)\s+been\s+(?:\w+ed|{irregular}))\b|((?:was|were|is|are)\s+(?:{irregular}))\b|((?:was|were|is|are)\s+\w+ed)\s+by\b)"
	))
	.expect("passive voice pattern is valid")
});

static WEAK_INTENSIFIER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)\b(?:very|really|quite|somewhat|rather)\b").expect("intensifier pattern is valid"));

/// `was/were/has been/... + past participle`, or `was/were/is/are + -ed + by`.
pub struct PassiveVoice;

impl IssueDetector for PassiveVoice {
	fn name(&self) -> &'static str {
		"passive-voice"
	}

	fn detect(&self, _line: usize, text: &str) -> Result<Vec<Issue>> {
		Ok(PASSIVE_VOICE
			.captures_iter(text)
			.filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
			.map(|m| {
				let phrase = normalize(m.as_str());
				issue(
					IssueKind::PassiveVoice,
					text,
					m,
					"passive voice",
					Some(passive_fix(&phrase).unwrap_or("use active voice").to_string()),
				)
			})
			.collect())
	}
}

/// `very, really, quite, somewhat, rather`.
pub struct WeakIntensifiers;

impl IssueDetector for WeakIntensifiers {
	fn name(&self) -> &'static str {
		"weak-intensifier"
	}

	fn detect(&self, _line: usize, text: &str) -> Result<Vec<Issue>> {
		Ok(WEAK_INTENSIFIER
			.find_iter(text)
			.map(|m| {
				let word = normalize(m.as_str());
				issue(
					IssueKind::WeakIntensifier,
					text,
					m,
					"weak intensifier",
					Some(intensifier_fix(&word).to_string()),
				)
			})
			.collect())
	}
}

fn issue(kind: IssueKind, text: &str, m: regex::Match<'_>, description: &str, suggested_fix: Option<String>) -> Issue {
	let start_index = text[..m.start()].chars().count();
	Issue {
		kind,
		matched_text: m.as_str().to_string(),
		start_index,
		end_index: start_index + m.as_str().chars().count(),
		description: description.to_string(),
		suggested_fix,
	}
}

/// Lowercases and collapses internal whitespace.
fn normalize(phrase: &str) -> String {
	phrase.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn passive_fix(phrase: &str) -> Option<&'static str> {
	Some(match phrase {
		"was written" | "were written" => "rewrite as \"<agent> wrote\"",
		"was made" | "were made" => "rewrite as \"<agent> made\"",
		"was done" | "were done" => "rewrite as \"<agent> did\"",
		"was given" | "were given" => "rewrite as \"<agent> gave\"",
		"was taken" | "were taken" => "rewrite as \"<agent> took\"",
		"was shown" | "were shown" => "rewrite as \"<agent> showed\"",
		"was found" | "were found" => "rewrite as \"<agent> found\"",
		"has been done" | "have been done" => "rewrite as \"<agent> has done\"",
		_ => return None,
	})
}

fn intensifier_fix(word: &str) -> &'static str {
	match word {
		"very" => "drop \"very\" and pick a stronger adjective",
		"really" => "remove \"really\"",
		"quite" => "remove \"quite\" or be specific",
		"somewhat" => "commit to the claim or quantify it",
		"rather" => "remove \"rather\"",
		_ => "choose a more precise word",
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_passive_voice_matches_span() {
		let text = "The report was written by John.";
		let issues = PassiveVoice.detect(0, text).unwrap();
		assert_eq!(issues.len(), 1);
		assert_eq!(issues[0].matched_text, "was written");
		assert_eq!(issues[0].start_index, 11);
		assert_eq!(issues[0].end_index, 22);
		assert_eq!(issues[0].suggested_fix.as_deref(), Some("rewrite as \"<agent> wrote\""));
	}

	#[test]
	fn test_passive_voice_generic_fallback() {
		let issues = PassiveVoice.detect(0, "The cake was baked by Ann.").unwrap();
		assert_eq!(issues.len(), 1);
		assert_eq!(issues[0].matched_text, "was baked");
		assert_eq!(issues[0].end_index, 18);
		assert_eq!(issues[0].suggested_fix.as_deref(), Some("use active voice"));
	}

	#[test]
	fn test_adjective_after_be_is_not_passive() {
		for text in ["The car is red.", "She was tired.", "They were excited about it.", "The cake was baked yesterday."] {
			assert!(PassiveVoice.detect(0, text).unwrap().is_empty(), "{text:?}");
		}
	}

	#[test]
	fn test_perfect_passive_needs_no_agent() {
		let issues = PassiveVoice.detect(0, "The bug had been fixed.").unwrap();
		assert_eq!(issues.len(), 1);
		assert_eq!(issues[0].matched_text, "had been fixed");
	}

	#[test]
	fn test_passive_voice_multiword_auxiliary() {
		let issues = PassiveVoice.detect(0, "The work has  been done.").unwrap();
		assert_eq!(issues.len(), 1);
		assert_eq!(issues[0].suggested_fix.as_deref(), Some("rewrite as \"<agent> has done\""));
	}

	#[test]
	fn test_no_passive_in_active_sentence() {
		assert!(PassiveVoice.detect(0, "John wrote the report.").unwrap().is_empty());
	}

	#[test]
	fn test_intensifiers_are_whole_words() {
		let issues = WeakIntensifiers.detect(0, "Every quiter is really, VERY tired.").unwrap();
		let words: Vec<_> = issues.iter().map(|i| i.matched_text.as_str()).collect();
		assert_eq!(words, ["really", "VERY"]);
		assert_eq!(issues[1].suggested_fix.as_deref(), Some("drop \"very\" and pick a stronger adjective"));
	}

	#[test]
	fn test_indices_are_char_offsets() {
		let issues = WeakIntensifiers.detect(0, "Café is very nice").unwrap();
		assert_eq!(issues[0].start_index, 8);
		assert_eq!(issues[0].end_index, 12);
	}
}
