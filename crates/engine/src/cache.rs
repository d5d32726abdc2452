//! Per-line analysis cache keyed by content hash.
//!
//! A hit is only valid when the stored hash equals the hash of the line's
//! current text. Entries are never revalidated for position: edits either
//! clear the cache wholesale or rely on the hash check to reject moved lines.

use std::hash::Hasher;

use rustc_hash::{FxHashMap, FxHasher};

use crate::opportunity::Opportunity;

/// Fast non-cryptographic hash of one line's text.
pub type LineHash = u64;

/// Hashes line text. A collision can only surface stale suggestions, never
/// touch the document.
pub fn line_hash(text: &str) -> LineHash {
	let mut hasher = FxHasher::default();
	hasher.write(text.as_bytes());
	hasher.write_usize(text.len());
	hasher.finish()
}

/// Cached detector output for one line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineCacheEntry {
	pub hash: LineHash,
	pub opportunities: Vec<Opportunity>,
}

/// How document edits invalidate the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheInvalidation {
	/// Clear every entry on each edit.
	#[default]
	All,
	/// Keep entries and let the hash check reject changed lines.
	EditedLines,
}

#[derive(Debug, Default)]
pub struct LineAnalysisCache {
	entries: FxHashMap<usize, LineCacheEntry>,
}

impl LineAnalysisCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Raw entry for `line`, whatever its hash.
	pub fn get(&self, line: usize) -> Option<&LineCacheEntry> {
		self.entries.get(&line)
	}

	/// Cached opportunities for `line`, only if they were computed for text
	/// hashing to `hash`.
	pub fn lookup(&self, line: usize, hash: LineHash) -> Option<&[Opportunity]> {
		self.entries
			.get(&line)
			.filter(|entry| entry.hash == hash)
			.map(|entry| entry.opportunities.as_slice())
	}

	pub fn put(&mut self, line: usize, hash: LineHash, opportunities: Vec<Opportunity>) {
		self.entries.insert(line, LineCacheEntry { hash, opportunities });
	}

	pub fn invalidate_all(&mut self) {
		if !self.entries.is_empty() {
			tracing::trace!(entries = self.entries.len(), "cache.invalidate_all");
		}
		self.entries.clear();
	}

	/// Drops the entry for `line`. Returns `true` if one existed.
	pub fn invalidate_line(&mut self, line: usize) -> bool {
		self.entries.remove(&line).is_some()
	}

	/// Drops entries for lines at or past `line_count`.
	pub fn truncate(&mut self, line_count: usize) {
		self.entries.retain(|&line, _| line < line_count);
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::opportunity::OpportunityType;

	fn opps(line: usize) -> Vec<Opportunity> {
		vec![Opportunity::new(line, 0, OpportunityType::Transform, 0.7)]
	}

	#[test]
	fn test_hash_is_stable_and_content_sensitive() {
		assert_eq!(line_hash("hello"), line_hash("hello"));
		assert_ne!(line_hash("hello"), line_hash("hellO"));
		assert_ne!(line_hash(""), line_hash(" "));
	}

	#[test]
	fn test_lookup_requires_matching_hash() {
		let mut cache = LineAnalysisCache::new();
		cache.put(3, line_hash("she felt"), opps(3));

		assert_eq!(cache.lookup(3, line_hash("she felt")), Some(opps(3).as_slice()));
		assert!(cache.lookup(3, line_hash("she feels")).is_none());
		assert!(cache.lookup(4, line_hash("she felt")).is_none());
		// The raw entry is still there for inspection.
		assert!(cache.get(3).is_some());
	}

	#[test]
	fn test_invalidation() {
		let mut cache = LineAnalysisCache::new();
		cache.put(0, 1, opps(0));
		cache.put(1, 2, opps(1));
		cache.put(9, 3, opps(9));

		assert!(cache.invalidate_line(1));
		assert!(!cache.invalidate_line(1));
		assert_eq!(cache.len(), 2);

		cache.truncate(5);
		assert!(cache.get(9).is_none());

		cache.invalidate_all();
		assert!(cache.is_empty());
	}
}
