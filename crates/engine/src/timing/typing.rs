//! Rolling keystroke-rate estimate.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Characters per word used by the WPM estimate.
const CHARS_PER_WORD: f32 = 5.0;

/// Snapshot of the typing-speed estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypingMetrics {
	pub current_wpm: f32,
	/// Keystrokes inside the current window.
	pub keystroke_count: u32,
	pub is_typing_fast: bool,
	/// Zero when no keystroke has been seen yet.
	pub time_since_last_keystroke: Duration,
}

/// Sliding-window typing-speed tracker.
///
/// WPM is `(keystrokes / 5) / minutes`, where minutes are measured from the
/// oldest keystroke still inside the window. A gap longer than the window
/// resets the count before the new keystroke is recorded so a stale burst
/// cannot inflate the estimate after a pause.
#[derive(Debug, Clone)]
pub struct TypingSpeedTracker {
	window: Duration,
	fast_threshold: f32,
	keystrokes: VecDeque<Instant>,
	last_keystroke: Option<Instant>,
	current_wpm: f32,
}

impl TypingSpeedTracker {
	pub fn new(window: Duration, fast_threshold: f32) -> Self {
		Self {
			window,
			fast_threshold,
			keystrokes: VecDeque::new(),
			last_keystroke: None,
			current_wpm: 0.0,
		}
	}

	/// Applies new window and threshold values without dropping history.
	pub fn configure(&mut self, window: Duration, fast_threshold: f32) {
		self.window = window;
		self.fast_threshold = fast_threshold;
	}

	/// Records a keystroke at `now` and returns the updated metrics.
	pub fn on_keystroke(&mut self, now: Instant) -> TypingMetrics {
		let gap = self.last_keystroke.map(|last| now.saturating_duration_since(last));
		if gap.is_some_and(|gap| gap > self.window) {
			self.keystrokes.clear();
		}

		while let Some(&oldest) = self.keystrokes.front() {
			if now.saturating_duration_since(oldest) > self.window {
				self.keystrokes.pop_front();
			} else {
				break;
			}
		}

		self.keystrokes.push_back(now);
		self.last_keystroke = Some(now);
		self.current_wpm = self.estimate_wpm(now);

		TypingMetrics {
			current_wpm: self.current_wpm,
			keystroke_count: self.keystrokes.len() as u32,
			is_typing_fast: self.current_wpm > self.fast_threshold,
			time_since_last_keystroke: gap.unwrap_or(Duration::ZERO),
		}
	}

	/// Reads the current estimate without recording anything.
	pub fn current_metrics(&self, now: Instant) -> TypingMetrics {
		TypingMetrics {
			current_wpm: self.current_wpm,
			keystroke_count: self.keystrokes.len() as u32,
			is_typing_fast: self.current_wpm > self.fast_threshold,
			time_since_last_keystroke: self
				.last_keystroke
				.map(|last| now.saturating_duration_since(last))
				.unwrap_or(Duration::ZERO),
		}
	}

	/// Forgets all recorded keystrokes.
	pub fn reset(&mut self) {
		self.keystrokes.clear();
		self.last_keystroke = None;
		self.current_wpm = 0.0;
	}

	fn estimate_wpm(&self, now: Instant) -> f32 {
		let Some(&oldest) = self.keystrokes.front() else {
			return 0.0;
		};
		let minutes = now.saturating_duration_since(oldest).as_secs_f32() / 60.0;
		if minutes <= 0.0 {
			return 0.0;
		}
		(self.keystrokes.len() as f32 / CHARS_PER_WORD) / minutes
	}
}
