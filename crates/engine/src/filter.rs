//! Intensity thresholds and the marker cap.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::opportunity::Opportunity;

/// Most markers shown at once.
pub const MAX_INDICATORS: usize = 20;

/// User-chosen aggressiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
	Off,
	Minimal,
	#[default]
	Balanced,
	Aggressive,
}

impl Intensity {
	/// Minimum confidence shown at this level. `Off` is above every score.
	pub fn threshold(self) -> f32 {
		match self {
			Self::Off => f32::INFINITY,
			Self::Minimal => 0.8,
			Self::Balanced => 0.6,
			Self::Aggressive => 0.4,
		}
	}

	pub fn is_off(self) -> bool {
		self == Self::Off
	}
}

impl fmt::Display for Intensity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Off => "off",
			Self::Minimal => "minimal",
			Self::Balanced => "balanced",
			Self::Aggressive => "aggressive",
		})
	}
}

/// Keeps opportunities at or above the intensity threshold, highest
/// confidence first, capped at [`MAX_INDICATORS`].
///
/// Equal confidences keep detection order: line ascending, then
/// enhancement, quickfix, transform, metrics.
pub fn apply_intensity(intensity: Intensity, mut opportunities: Vec<Opportunity>) -> Vec<Opportunity> {
	let threshold = intensity.threshold();
	opportunities.retain(|o| o.confidence >= threshold);
	opportunities.sort_by_key(|o| (o.line, o.kind.detection_rank()));
	// Stable sort: ties stay in detection order.
	opportunities.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
	opportunities.truncate(MAX_INDICATORS);
	opportunities
}
