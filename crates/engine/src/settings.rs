//! User-facing settings and their translation into engine values.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::document::DocumentType;
use crate::error::Result;
use crate::filter::Intensity;
use crate::timing::TimingSettings;

/// How long to wait after typing stops before showing markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseTime {
	Fast,
	#[default]
	Normal,
	Relaxed,
}

impl ResponseTime {
	pub fn show_delay(self) -> Duration {
		Duration::from_millis(match self {
			Self::Fast => 1500,
			Self::Normal => 3000,
			Self::Relaxed => 5000,
		})
	}
}

/// Settings as the user edits them.
///
/// ```toml
/// suggestionMode = "minimal"
/// responseTime = "fast"
/// hideWhileTyping = true
/// enabledDocumentTypes = ["academic", "blog"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AnnotationSettings {
	pub suggestion_mode: Intensity,
	pub response_time: ResponseTime,
	pub hide_while_typing: bool,
	pub enabled_document_types: Vec<DocumentType>,
}

impl Default for AnnotationSettings {
	fn default() -> Self {
		Self {
			suggestion_mode: Intensity::default(),
			response_time: ResponseTime::default(),
			hide_while_typing: true,
			enabled_document_types: DocumentType::ALL.to_vec(),
		}
	}
}

impl AnnotationSettings {
	/// Parses settings from TOML. Missing keys take their defaults.
	pub fn from_toml_str(input: &str) -> Result<Self> {
		let settings: Self = toml::from_str(input)?;
		Ok(settings)
	}

	pub fn intensity(&self) -> Intensity {
		self.suggestion_mode
	}

	/// Timing snapshot for these settings.
	///
	/// The response time sets the base show delay. Built-in per-document-type
	/// overrides still apply on top of it.
	pub fn to_timing_settings(&self) -> TimingSettings {
		TimingSettings {
			show_delay: self.response_time.show_delay(),
			hide_on_fast_typing: self.hide_while_typing,
			..TimingSettings::default()
		}
	}

	/// Whether annotations run at all for `document_type`.
	pub fn is_enabled_for(&self, document_type: DocumentType) -> bool {
		!self.suggestion_mode.is_off() && self.enabled_document_types.contains(&document_type)
	}
}
