//! Timing settings with per-document-type overrides.
//!
//! Resolution mirrors layered option lookup: a field set in the override for
//! the current [`DocumentType`] wins, otherwise the base value is used.

use std::time::Duration;

use rustc_hash::FxHashMap;

use crate::document::DocumentType;
use crate::error::{AnnotateError, Result};

/// Immutable timing snapshot. Replace wholesale via
/// [`TimingDecisionEngine::set_settings`](super::TimingDecisionEngine::set_settings).
#[derive(Debug, Clone, PartialEq)]
pub struct TimingSettings {
	/// Quiet period after a keystroke before analysis runs.
	pub show_delay: Duration,
	/// Suppress markers while the user types faster than `fast_typing_threshold`.
	pub hide_on_fast_typing: bool,
	/// Words per minute above which typing counts as fast.
	pub fast_typing_threshold: f32,
	/// Quiet period after the last scroll event before analysis runs.
	pub scroll_debounce: Duration,
	/// Minimum time between two analysis passes.
	pub min_analysis_interval: Duration,
	/// Sliding window for the typing-speed estimate.
	pub typing_speed_window: Duration,
	pub document_type_overrides: FxHashMap<DocumentType, TimingOverrides>,
}

/// Partial [`TimingSettings`]; `None` fields defer to the base value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingOverrides {
	pub show_delay: Option<Duration>,
	pub hide_on_fast_typing: Option<bool>,
	pub fast_typing_threshold: Option<f32>,
	pub scroll_debounce: Option<Duration>,
	pub min_analysis_interval: Option<Duration>,
	pub typing_speed_window: Option<Duration>,
}

/// Fully resolved timing values for one document type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveTiming {
	pub show_delay: Duration,
	pub hide_on_fast_typing: bool,
	pub fast_typing_threshold: f32,
	pub scroll_debounce: Duration,
	pub min_analysis_interval: Duration,
	pub typing_speed_window: Duration,
}

impl Default for TimingSettings {
	fn default() -> Self {
		let mut document_type_overrides = FxHashMap::default();
		document_type_overrides.insert(
			DocumentType::Academic,
			TimingOverrides {
				show_delay: Some(Duration::from_millis(5000)),
				fast_typing_threshold: Some(80.0),
				..Default::default()
			},
		);
		document_type_overrides.insert(
			DocumentType::Blog,
			TimingOverrides {
				show_delay: Some(Duration::from_millis(2000)),
				fast_typing_threshold: Some(50.0),
				..Default::default()
			},
		);

		Self {
			show_delay: Duration::from_millis(3000),
			hide_on_fast_typing: true,
			fast_typing_threshold: 60.0,
			scroll_debounce: Duration::from_millis(500),
			min_analysis_interval: Duration::from_millis(1000),
			typing_speed_window: Duration::from_millis(5000),
			document_type_overrides,
		}
	}
}

impl TimingSettings {
	/// Settings with no per-document-type overrides.
	pub fn without_overrides() -> Self {
		Self {
			document_type_overrides: FxHashMap::default(),
			..Self::default()
		}
	}

	/// Rejects values the tracker and timers cannot work with, in the base
	/// settings and in every override.
	pub fn validate(&self) -> Result<()> {
		check_threshold("fastTypingThreshold", self.fast_typing_threshold)?;
		check_window("typingSpeedWindow", self.typing_speed_window)?;
		for (document_type, o) in &self.document_type_overrides {
			if let Some(threshold) = o.fast_typing_threshold {
				check_threshold(&format!("{document_type}.fastTypingThreshold"), threshold)?;
			}
			if let Some(window) = o.typing_speed_window {
				check_window(&format!("{document_type}.typingSpeedWindow"), window)?;
			}
		}
		Ok(())
	}

	/// Resolves every field for `document_type`.
	pub fn effective(&self, document_type: DocumentType) -> EffectiveTiming {
		let o = self.document_type_overrides.get(&document_type);
		EffectiveTiming {
			show_delay: o.and_then(|o| o.show_delay).unwrap_or(self.show_delay),
			hide_on_fast_typing: o.and_then(|o| o.hide_on_fast_typing).unwrap_or(self.hide_on_fast_typing),
			fast_typing_threshold: o.and_then(|o| o.fast_typing_threshold).unwrap_or(self.fast_typing_threshold),
			scroll_debounce: o.and_then(|o| o.scroll_debounce).unwrap_or(self.scroll_debounce),
			min_analysis_interval: o.and_then(|o| o.min_analysis_interval).unwrap_or(self.min_analysis_interval),
			typing_speed_window: o.and_then(|o| o.typing_speed_window).unwrap_or(self.typing_speed_window),
		}
	}
}

fn check_threshold(field: &str, wpm: f32) -> Result<()> {
	if wpm.is_finite() && wpm > 0.0 {
		Ok(())
	} else {
		Err(AnnotateError::Settings(format!("{field} must be a positive number of WPM, got {wpm}")))
	}
}

fn check_window(field: &str, window: Duration) -> Result<()> {
	if window.is_zero() {
		Err(AnnotateError::Settings(format!("{field} must be non-zero")))
	} else {
		Ok(())
	}
}
