//! Error types for the annotation engine.
//!
//! Nothing here is fatal to the user: the coordinator logs these and falls
//! back to showing no markers.

use std::any::Any;

use thiserror::Error;

/// Errors surfaced by fallible building blocks of the pipeline.
#[derive(Debug, Error)]
pub enum AnnotateError {
	/// Host viewport or line geometry could not be read.
	#[error("viewport geometry unavailable: {0}")]
	Geometry(String),

	/// A detector failed while analyzing a single line.
	#[error("detector `{detector}` failed on line {line}: {message}")]
	Detector {
		/// Name of the failing detector.
		detector: &'static str,
		/// Line being analyzed.
		line: usize,
		/// Failure description.
		message: String,
	},

	/// A settings value was rejected.
	#[error("invalid settings: {0}")]
	Settings(String),

	/// Settings text could not be parsed.
	#[error("failed to parse settings: {0}")]
	SettingsParse(#[from] toml::de::Error),
}

/// Result type for annotation operations.
pub type Result<T> = std::result::Result<T, AnnotateError>;

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
	payload
		.downcast_ref::<&str>()
		.map(|s| s.to_string())
		.or_else(|| payload.downcast_ref::<String>().cloned())
		.unwrap_or_else(|| "non-string panic payload".to_string())
}
