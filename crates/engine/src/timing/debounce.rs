//! Named, cancelable, deferred callbacks.
//!
//! Time is supplied by the caller: [`DebounceScheduler::schedule`] records a
//! deadline and [`DebounceScheduler::take_due`] hands back whatever has come
//! due. Nothing here sleeps or blocks.

use std::fmt::Debug;
use std::hash::Hash;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

struct Pending<C> {
	deadline: Instant,
	seq: u64,
	callback: C,
}

/// At most one pending callback per key.
///
/// Scheduling under a key that already has a pending callback drops the old
/// one, so two callbacks under the same key can never both fire.
pub struct DebounceScheduler<K, C> {
	pending: FxHashMap<K, Pending<C>>,
	next_seq: u64,
}

impl<K, C> Default for DebounceScheduler<K, C> {
	fn default() -> Self {
		Self {
			pending: FxHashMap::default(),
			next_seq: 0,
		}
	}
}

impl<K, C> DebounceScheduler<K, C>
where
	K: Eq + Hash + Clone + Debug,
{
	pub fn new() -> Self {
		Self::default()
	}

	/// Arms `callback` under `key` to fire `delay` after `now`.
	///
	/// Returns `true` if an earlier pending callback under `key` was replaced.
	pub fn schedule(&mut self, key: K, callback: C, delay: Duration, now: Instant) -> bool {
		let seq = self.next_seq;
		self.next_seq += 1;
		let replaced = self
			.pending
			.insert(
				key.clone(),
				Pending {
					deadline: now + delay,
					seq,
					callback,
				},
			)
			.is_some();
		tracing::trace!(?key, delay_ms = delay.as_millis() as u64, replaced, "debounce.schedule");
		replaced
	}

	/// Drops the pending callback under `key`. Returns `true` if one existed.
	pub fn cancel(&mut self, key: &K) -> bool {
		let cancelled = self.pending.remove(key).is_some();
		if cancelled {
			tracing::trace!(?key, "debounce.cancel");
		}
		cancelled
	}

	pub fn has_pending(&self, key: &K) -> bool {
		self.pending.contains_key(key)
	}

	/// Drops every pending callback.
	pub fn cancel_all(&mut self) {
		if !self.pending.is_empty() {
			tracing::trace!(count = self.pending.len(), "debounce.cancel_all");
		}
		self.pending.clear();
	}

	pub fn pending_count(&self) -> usize {
		self.pending.len()
	}

	/// Earliest deadline among pending callbacks.
	///
	/// Hosts use this to arm their own wake-up timer.
	pub fn next_deadline(&self) -> Option<Instant> {
		self.pending.values().map(|p| p.deadline).min()
	}

	/// Removes and returns every callback whose deadline is at or before `now`,
	/// ordered by deadline and then by scheduling order.
	pub fn take_due(&mut self, now: Instant) -> Vec<(K, C)> {
		let due_keys: Vec<K> = self
			.pending
			.iter()
			.filter(|(_, p)| p.deadline <= now)
			.map(|(k, _)| k.clone())
			.collect();

		let mut due: Vec<(K, Pending<C>)> = due_keys
			.into_iter()
			.filter_map(|k| self.pending.remove(&k).map(|p| (k, p)))
			.collect();
		due.sort_by_key(|(_, p)| (p.deadline, p.seq));
		due.into_iter().map(|(k, p)| (k, p.callback)).collect()
	}
}

impl<K> DebounceScheduler<K, Box<dyn FnOnce()>>
where
	K: Eq + Hash + Clone + Debug,
{
	/// Invokes every due callback. Returns how many ran.
	pub fn run_due(&mut self, now: Instant) -> usize {
		let due = self.take_due(now);
		let count = due.len();
		for (_, callback) in due {
			callback();
		}
		count
	}
}
