//! Typed event channels for timing activity.
//!
//! Listeners are stored as a tagged union so each channel delivers its own
//! payload type. A panicking listener is logged and skipped; the remaining
//! listeners still receive the event.

use std::panic::{AssertUnwindSafe, catch_unwind};

use super::engine::{ScheduledAnalysis, TimingDecision};
use super::typing::TypingMetrics;
use crate::error::panic_message;

/// Channel a listener subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingEventKind {
	TimingDecision,
	TypingMetricsUpdated,
	AnalysisScheduled,
}

/// Event delivered to listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum TimingEvent {
	Decision(TimingDecision),
	TypingMetricsUpdated(TypingMetrics),
	AnalysisScheduled(ScheduledAnalysis),
}

impl TimingEvent {
	pub fn kind(&self) -> TimingEventKind {
		match self {
			Self::Decision(_) => TimingEventKind::TimingDecision,
			Self::TypingMetricsUpdated(_) => TimingEventKind::TypingMetricsUpdated,
			Self::AnalysisScheduled(_) => TimingEventKind::AnalysisScheduled,
		}
	}
}

/// A listener bound to exactly one channel.
pub enum TimingListener {
	Decision(Box<dyn FnMut(&TimingDecision)>),
	TypingMetrics(Box<dyn FnMut(&TypingMetrics)>),
	AnalysisScheduled(Box<dyn FnMut(&ScheduledAnalysis)>),
}

impl TimingListener {
	pub fn kind(&self) -> TimingEventKind {
		match self {
			Self::Decision(_) => TimingEventKind::TimingDecision,
			Self::TypingMetrics(_) => TimingEventKind::TypingMetricsUpdated,
			Self::AnalysisScheduled(_) => TimingEventKind::AnalysisScheduled,
		}
	}
}

/// Handle returned by [`TimingEvents::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Listener registry for the timing channels.
#[derive(Default)]
pub struct TimingEvents {
	listeners: Vec<(SubscriptionId, TimingListener)>,
	next_id: u64,
}

impl TimingEvents {
	pub fn subscribe(&mut self, listener: TimingListener) -> SubscriptionId {
		let id = SubscriptionId(self.next_id);
		self.next_id += 1;
		self.listeners.push((id, listener));
		id
	}

	/// Removes a listener. Returns `false` if `id` was not subscribed.
	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		let before = self.listeners.len();
		self.listeners.retain(|(sub, _)| *sub != id);
		self.listeners.len() != before
	}

	pub fn listener_count(&self, kind: TimingEventKind) -> usize {
		self.listeners.iter().filter(|(_, l)| l.kind() == kind).count()
	}

	pub fn clear(&mut self) {
		self.listeners.clear();
	}

	/// Delivers `event` to every listener on its channel, in subscription order.
	///
	/// Returns the number of listeners that completed without panicking.
	pub fn emit(&mut self, event: &TimingEvent) -> usize {
		let mut delivered = 0;
		for (id, listener) in &mut self.listeners {
			if listener.kind() != event.kind() {
				continue;
			}

			let outcome = catch_unwind(AssertUnwindSafe(|| match (&mut *listener, event) {
				(TimingListener::Decision(f), TimingEvent::Decision(d)) => f(d),
				(TimingListener::TypingMetrics(f), TimingEvent::TypingMetricsUpdated(m)) => f(m),
				(TimingListener::AnalysisScheduled(f), TimingEvent::AnalysisScheduled(s)) => f(s),
				_ => {}
			}));

			match outcome {
				Ok(()) => delivered += 1,
				Err(payload) => {
					let message = panic_message(&*payload);
					tracing::warn!(subscription = ?id, kind = ?event.kind(), %message, "timing.listener_panicked");
				}
			}
		}
		delivered
	}
}
