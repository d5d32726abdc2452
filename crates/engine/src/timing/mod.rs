//! When to analyze: typing speed, debounce timers, and the decision engine.

mod debounce;
mod engine;
mod events;
mod settings;
mod typing;


pub use debounce::DebounceScheduler;
pub use engine::{
	AnalysisTrigger, DecisionReason, ScheduledAnalysis, TimingDecision, TimingDecisionEngine, TimingState,
};
pub use events::{SubscriptionId, TimingEvent, TimingEventKind, TimingEvents, TimingListener};
pub use settings::{EffectiveTiming, TimingOverrides, TimingSettings};
pub use typing::{TypingMetrics, TypingSpeedTracker};
