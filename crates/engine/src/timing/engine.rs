use std::fmt;
use std::time::{Duration, Instant};

use super::debounce::DebounceScheduler;
use super::events::{SubscriptionId, TimingEvent, TimingEventKind, TimingEvents, TimingListener};
use super::settings::{EffectiveTiming, TimingSettings};
use super::typing::{TypingMetrics, TypingSpeedTracker};
use crate::document::DocumentType;

/// What armed an analysis timer. Each trigger owns its own debounce key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisTrigger {
	/// Debounced after typing, waits `show_delay`.
	Typing,
	/// Debounced after scrolling, waits `scroll_debounce`.
	Scroll,
}

impl AnalysisTrigger {
	/// Debounce key name.
	pub fn key(self) -> &'static str {
		match self {
			Self::Typing => "main-analysis",
			Self::Scroll => "scroll-analysis",
		}
	}
}

impl fmt::Display for AnalysisTrigger {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.key())
	}
}

/// Lifecycle of the engine for the current editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingState {
	Idle,
	/// A keystroke or settled scroll is being judged.
	Evaluating,
	/// Fast typing hid the markers; waits for the next keystroke.
	Suppressed,
	/// An analysis timer is armed.
	Scheduled,
}

/// Why a [`TimingDecision`] came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecisionReason {
	/// Typing speed exceeded the fast-typing threshold.
	FastTyping { wpm: f32 },
	/// The previous analysis ran less than `min_analysis_interval` ago.
	TooSoon { remaining: Duration },
	/// Typing paused long enough to schedule analysis after `show_delay`.
	ShowAfterDelay,
	/// Scrolling settled; analyze immediately.
	ScrollSettled,
	/// Annotations are off for this document.
	Disabled,
}

impl fmt::Display for DecisionReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::FastTyping { wpm } => write!(f, "typing fast ({wpm:.0} wpm)"),
			Self::TooSoon { remaining } => {
				write!(f, "too soon since last analysis ({}ms remaining)", remaining.as_millis())
			}
			Self::ShowAfterDelay => f.write_str("show after delay"),
			Self::ScrollSettled => f.write_str("scroll settled"),
			Self::Disabled => f.write_str("annotations disabled"),
		}
	}
}

/// Result of judging one keystroke or settled scroll. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingDecision {
	pub should_show: bool,
	pub reason: DecisionReason,
	/// When set, analysis runs after this delay.
	pub next_check_delay: Option<Duration>,
}

impl TimingDecision {
	pub(crate) fn hide(reason: DecisionReason) -> Self {
		Self {
			should_show: false,
			reason,
			next_check_delay: None,
		}
	}
}

/// Payload of the `analysis-scheduled` channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledAnalysis {
	pub trigger: AnalysisTrigger,
	pub delay: Duration,
	pub due_at: Instant,
}

/// Decides whether and when to analyze, per document-editing session.
///
/// States run `Idle -> Evaluating -> {Suppressed | Scheduled} -> Idle`. The
/// engine owns the debounce timers for both triggers; [`Self::tick`] reports
/// which analysis is due and stamps the analysis time.
pub struct TimingDecisionEngine {
	settings: TimingSettings,
	document_type: DocumentType,
	effective: EffectiveTiming,
	tracker: TypingSpeedTracker,
	timers: DebounceScheduler<AnalysisTrigger, ()>,
	events: TimingEvents,
	state: TimingState,
	last_analysis: Option<Instant>,
}

impl TimingDecisionEngine {
	pub fn new(settings: TimingSettings, document_type: DocumentType) -> Self {
		let effective = settings.effective(document_type);
		Self {
			tracker: TypingSpeedTracker::new(effective.typing_speed_window, effective.fast_typing_threshold),
			settings,
			document_type,
			effective,
			timers: DebounceScheduler::new(),
			events: TimingEvents::default(),
			state: TimingState::Idle,
			last_analysis: None,
		}
	}

	/// Replaces the settings snapshot wholesale.
	pub fn set_settings(&mut self, settings: TimingSettings) {
		self.settings = settings;
		self.reresolve();
	}

	pub fn set_document_type(&mut self, document_type: DocumentType) {
		self.document_type = document_type;
		self.reresolve();
	}

	fn reresolve(&mut self) {
		self.effective = self.settings.effective(self.document_type);
		self.tracker
			.configure(self.effective.typing_speed_window, self.effective.fast_typing_threshold);
	}

	pub fn settings(&self) -> &TimingSettings {
		&self.settings
	}

	/// Settings resolved for the current document type.
	pub fn effective(&self) -> EffectiveTiming {
		self.effective
	}

	pub fn state(&self) -> TimingState {
		self.state
	}

	pub fn last_analysis(&self) -> Option<Instant> {
		self.last_analysis
	}

	pub fn typing_metrics(&self, now: Instant) -> TypingMetrics {
		self.tracker.current_metrics(now)
	}

	pub fn has_pending(&self, trigger: AnalysisTrigger) -> bool {
		self.timers.has_pending(&trigger)
	}

	/// Earliest instant at which [`Self::tick`] has work to do.
	pub fn next_deadline(&self) -> Option<Instant> {
		self.timers.next_deadline()
	}

	pub fn subscribe(&mut self, listener: TimingListener) -> SubscriptionId {
		self.events.subscribe(listener)
	}

	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		self.events.unsubscribe(id)
	}

	pub fn listener_count(&self, kind: TimingEventKind) -> usize {
		self.events.listener_count(kind)
	}

	/// Judges a keystroke at `now`.
	///
	/// Fast typing wins over every other rule: the pending typing timer is
	/// cancelled and the caller should clear the overlay.
	pub fn on_keystroke(&mut self, now: Instant) -> TimingDecision {
		self.state = TimingState::Evaluating;

		let metrics = self.tracker.on_keystroke(now);
		self.events.emit(&TimingEvent::TypingMetricsUpdated(metrics));

		let decision = if self.effective.hide_on_fast_typing && metrics.is_typing_fast {
			self.timers.cancel(&AnalysisTrigger::Typing);
			self.state = TimingState::Suppressed;
			TimingDecision::hide(DecisionReason::FastTyping {
				wpm: metrics.current_wpm,
			})
		} else if let Some(remaining) = self.interval_remaining(now) {
			// A timer armed by an earlier keystroke or scroll is left running.
			self.state = if self.timers.pending_count() > 0 {
				TimingState::Scheduled
			} else {
				TimingState::Idle
			};
			TimingDecision::hide(DecisionReason::TooSoon { remaining })
		} else {
			let delay = self.effective.show_delay;
			self.arm(AnalysisTrigger::Typing, delay, now);
			TimingDecision {
				should_show: true,
				reason: DecisionReason::ShowAfterDelay,
				next_check_delay: Some(delay),
			}
		};

		tracing::debug!(should_show = decision.should_show, reason = %decision.reason, "timing.keystroke");
		self.events.emit(&TimingEvent::Decision(decision));
		decision
	}

	/// Notes a scroll event at `now`, re-arming the scroll timer.
	///
	/// The decision is made when the timer fires in [`Self::tick`].
	pub fn on_scroll(&mut self, now: Instant) {
		let delay = self.effective.scroll_debounce;
		self.arm(AnalysisTrigger::Scroll, delay, now);
	}

	/// Fires due timers. Returns the trigger of the analysis that should run now.
	///
	/// When both timers are due in the same tick a single analysis runs, and it
	/// is reported as [`AnalysisTrigger::Typing`].
	pub fn tick(&mut self, now: Instant) -> Option<AnalysisTrigger> {
		let due = self.timers.take_due(now);
		if due.is_empty() {
			return None;
		}

		let typing_due = due.iter().any(|(t, _)| *t == AnalysisTrigger::Typing);
		let run = if typing_due {
			Some(AnalysisTrigger::Typing)
		} else {
			self.state = TimingState::Evaluating;
			let decision = match self.interval_remaining(now) {
				Some(remaining) => TimingDecision::hide(DecisionReason::TooSoon { remaining }),
				None => TimingDecision {
					should_show: true,
					reason: DecisionReason::ScrollSettled,
					next_check_delay: Some(Duration::ZERO),
				},
			};
			tracing::debug!(should_show = decision.should_show, reason = %decision.reason, "timing.scroll");
			self.events.emit(&TimingEvent::Decision(decision));
			decision.should_show.then_some(AnalysisTrigger::Scroll)
		};

		if run.is_some() {
			self.last_analysis = Some(now);
		}
		self.state = if self.timers.pending_count() > 0 {
			TimingState::Scheduled
		} else {
			TimingState::Idle
		};
		run
	}

	/// Stamps an analysis that ran outside the timers, such as a re-run after a
	/// command edited a line.
	pub fn note_analysis(&mut self, now: Instant) {
		self.last_analysis = Some(now);
	}

	/// Cancels every pending timer and returns to `Idle`.
	pub fn cancel_all(&mut self) {
		self.timers.cancel_all();
		self.state = TimingState::Idle;
	}

	/// Tears the session down: timers, typing history, and listeners.
	pub fn dispose(&mut self) {
		self.cancel_all();
		self.tracker.reset();
		self.events.clear();
		self.last_analysis = None;
	}

	fn arm(&mut self, trigger: AnalysisTrigger, delay: Duration, now: Instant) {
		self.timers.schedule(trigger, (), delay, now);
		self.state = TimingState::Scheduled;
		self.events.emit(&TimingEvent::AnalysisScheduled(ScheduledAnalysis {
			trigger,
			delay,
			due_at: now + delay,
		}));
	}

	fn interval_remaining(&self, now: Instant) -> Option<Duration> {
		let last = self.last_analysis?;
		let since = now.saturating_duration_since(last);
		(since < self.effective.min_analysis_interval).then(|| self.effective.min_analysis_interval - since)
	}
}
