//! Analysis counters.
//!
//! [`AnalysisMetrics`] counts what each pass did. Counters are logged after every
//! pass and can be read for debug displays and tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative counters for one coordinator.
///
/// Relaxed ordering throughout: the counts are diagnostic.
#[derive(Debug, Default)]
pub struct AnalysisMetrics {
	/// Analysis passes run.
	pub passes: AtomicU64,
	/// Lines visited across all passes.
	pub lines_analyzed: AtomicU64,
	/// Lines whose cached result was reused.
	pub cache_hits: AtomicU64,
	/// Lines that had to be detected.
	pub cache_misses: AtomicU64,
	/// Calls into the line detector.
	pub detector_invocations: AtomicU64,
	/// Lines whose detection failed or panicked.
	pub detector_failures: AtomicU64,
	/// Markers published by the last pass.
	pub markers_last_pass: AtomicU64,
}

/// Point-in-time copy of [`AnalysisMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
	pub passes: u64,
	pub lines_analyzed: u64,
	pub cache_hits: u64,
	pub cache_misses: u64,
	pub detector_invocations: u64,
	pub detector_failures: u64,
	pub markers_last_pass: u64,
}

impl AnalysisMetrics {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn inc_pass(&self) {
		self.passes.fetch_add(1, Ordering::Relaxed);
	}

	pub fn inc_cache_hit(&self) {
		self.lines_analyzed.fetch_add(1, Ordering::Relaxed);
		self.cache_hits.fetch_add(1, Ordering::Relaxed);
	}

	pub fn inc_cache_miss(&self) {
		self.lines_analyzed.fetch_add(1, Ordering::Relaxed);
		self.cache_misses.fetch_add(1, Ordering::Relaxed);
	}

	pub fn inc_detector_invocation(&self) {
		self.detector_invocations.fetch_add(1, Ordering::Relaxed);
	}

	pub fn inc_detector_failure(&self) {
		self.detector_failures.fetch_add(1, Ordering::Relaxed);
	}

	pub fn record_published(&self, markers: usize) {
		self.markers_last_pass.store(markers as u64, Ordering::Relaxed);
	}

	pub fn snapshot(&self) -> MetricsSnapshot {
		MetricsSnapshot {
			passes: self.passes.load(Ordering::Relaxed),
			lines_analyzed: self.lines_analyzed.load(Ordering::Relaxed),
			cache_hits: self.cache_hits.load(Ordering::Relaxed),
			cache_misses: self.cache_misses.load(Ordering::Relaxed),
			detector_invocations: self.detector_invocations.load(Ordering::Relaxed),
			detector_failures: self.detector_failures.load(Ordering::Relaxed),
			markers_last_pass: self.markers_last_pass.load(Ordering::Relaxed),
		}
	}

	/// Emits the current counters at debug level.
	pub fn log(&self) {
		let s = self.snapshot();
		tracing::debug!(
			passes = s.passes,
			lines = s.lines_analyzed,
			cache_hits = s.cache_hits,
			cache_misses = s.cache_misses,
			detector_invocations = s.detector_invocations,
			detector_failures = s.detector_failures,
			markers = s.markers_last_pass,
			"analysis.metrics"
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_counters_accumulate() {
		let metrics = AnalysisMetrics::new();
		metrics.inc_pass();
		metrics.inc_cache_hit();
		metrics.inc_cache_miss();
		metrics.inc_cache_miss();
		metrics.inc_detector_invocation();
		metrics.inc_detector_failure();
		metrics.record_published(4);
		metrics.record_published(3);

		let s = metrics.snapshot();
		assert_eq!(s.passes, 1);
		assert_eq!(s.lines_analyzed, 3);
		assert_eq!(s.cache_hits, 1);
		assert_eq!(s.cache_misses, 2);
		assert_eq!(s.detector_invocations, 1);
		assert_eq!(s.detector_failures, 1);
		assert_eq!(s.markers_last_pass, 3);
	}
}
