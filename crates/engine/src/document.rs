//! Document classification and per-pass analysis context.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of prose being edited. Drives timing overrides and confidence scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
	Academic,
	Blog,
	Technical,
	Creative,
	Business,
	#[default]
	#[serde(other)]
	General,
}

impl DocumentType {
	/// Every document type, in declaration order.
	pub const ALL: [DocumentType; 6] = [
		DocumentType::Academic,
		DocumentType::Blog,
		DocumentType::Technical,
		DocumentType::Creative,
		DocumentType::Business,
		DocumentType::General,
	];

	/// Parses a type name. Unknown names fall back to [`DocumentType::General`].
	pub fn parse(name: &str) -> Self {
		match name.trim().to_ascii_lowercase().as_str() {
			"academic" => Self::Academic,
			"blog" => Self::Blog,
			"technical" => Self::Technical,
			"creative" => Self::Creative,
			"business" => Self::Business,
			_ => Self::General,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Academic => "academic",
			Self::Blog => "blog",
			Self::Technical => "technical",
			Self::Creative => "creative",
			Self::Business => "business",
			Self::General => "general",
		}
	}
}

impl fmt::Display for DocumentType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Inputs shared by every line analyzed in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentContext {
	pub document_type: DocumentType,
	/// Currently selected text, empty when nothing is selected.
	pub selection_text: String,
	/// Text of the paragraph containing the cursor.
	pub cursor_context: String,
	/// Whitespace-separated word count of the whole document.
	pub word_count: usize,
}

/// Counts whitespace-separated words.
pub fn count_words(text: &str) -> usize {
	text.split_whitespace().count()
}
