//! Invariants of the annotation pipeline, each backed by a test.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use proptest::prelude::*;

use crate::document::DocumentType;
use crate::filter::{Intensity, apply_intensity};
use crate::host::{RopeHost, StaticCatalog};
use crate::opportunity::{FixStrategy, Opportunity, OpportunityType};
use crate::settings::AnnotationSettings;
use crate::timing::{DebounceScheduler, DecisionReason, TimingDecisionEngine, TimingSettings};
use crate::viewport::ViewportGeometry;
use crate::{AnnotationCoordinator, OpportunityDetector};

fn ms(n: u64) -> Duration {
	Duration::from_millis(n)
}

/// Must reuse the cached result for a line whose text did not change.
///
/// - Enforced in: `AnnotationCoordinator::detect_window`
/// - Failure symptom: Every scroll re-runs every detector on every visible line.
#[cfg_attr(test, test)]
pub(crate) fn test_unchanged_line_never_redetected() {
	let mut host = RopeHost::new("Maybe this works.\nShe knew it.\n");
	host.set_geometry(Some(ViewportGeometry::new(0.0, 100.0, Some(20.0))));
	let mut c = AnnotationCoordinator::new(
		host,
		StaticCatalog::builtin(),
		AnnotationSettings::default(),
		DocumentType::General,
	);
	let t0 = Instant::now();
	c.on_keystroke(t0);
	c.tick(t0 + ms(3000));
	let first = c.metrics().snapshot().detector_invocations;

	c.on_scroll(t0 + ms(6000));
	assert!(c.tick(t0 + ms(6500)).is_some());
	assert_eq!(c.metrics().snapshot().detector_invocations, first);
}

/// Must invalidate the cache before a keystroke is judged.
///
/// - Enforced in: `AnnotationCoordinator::on_keystroke`
/// - Failure symptom: A pass scheduled by the keystroke publishes results for text that no longer exists.
#[cfg_attr(test, test)]
pub(crate) fn test_keystroke_invalidates_before_timing() {
	let mut host = RopeHost::new("Maybe this works.\n");
	host.set_geometry(Some(ViewportGeometry::new(0.0, 100.0, Some(20.0))));
	let mut c = AnnotationCoordinator::new(
		host,
		StaticCatalog::builtin(),
		AnnotationSettings::default(),
		DocumentType::General,
	);
	let t0 = Instant::now();
	c.on_keystroke(t0);
	c.tick(t0 + ms(3000));
	assert!(!c.cache().is_empty());

	// Too soon for a new pass, but the cache is already gone.
	let decision = c.on_keystroke(t0 + ms(3100));
	assert!(!decision.should_show);
	assert!(c.cache().is_empty());
}

/// Must never leave two callbacks pending under one key.
///
/// - Enforced in: `DebounceScheduler::schedule`
/// - Failure symptom: Two analysis passes fire for one pause in typing.
#[cfg_attr(test, test)]
pub(crate) fn test_debounce_replaces_pending_callback() {
	let first = Rc::new(Cell::new(0));
	let second = Rc::new(Cell::new(0));
	let mut scheduler: DebounceScheduler<&'static str, Box<dyn FnOnce()>> = DebounceScheduler::new();
	let t0 = Instant::now();

	let f = first.clone();
	scheduler.schedule("x", Box::new(move || f.set(f.get() + 1)), ms(100), t0);
	let s = second.clone();
	scheduler.schedule("x", Box::new(move || s.set(s.get() + 1)), ms(100), t0 + ms(50));
	assert_eq!(scheduler.pending_count(), 1);

	scheduler.run_due(t0 + ms(1000));
	assert_eq!((first.get(), second.get()), (0, 1));
}

/// Must suppress markers while typing fast, regardless of the analysis interval.
///
/// - Enforced in: `TimingDecisionEngine::on_keystroke`
/// - Failure symptom: Markers flicker in and out while the user is composing.
#[cfg_attr(test, test)]
pub(crate) fn test_fast_typing_always_hides() {
	let mut engine = TimingDecisionEngine::new(TimingSettings::default(), DocumentType::General);
	let t0 = Instant::now();
	// Inside the minimum interval, so the first keystroke is "too soon".
	engine.note_analysis(t0);
	assert!(!engine.on_keystroke(t0).should_show);
	for i in 1..10 {
		let decision = engine.on_keystroke(t0 + ms(40 * i));
		assert!(!decision.should_show);
		assert!(matches!(decision.reason, DecisionReason::FastTyping { .. }));
	}
}

/// Must require a combined fix for lines with several issues.
///
/// - Enforced in: `Opportunity::fix_strategy`
/// - Failure symptom: Fixing one issue at a time leaves a half-rewritten, ungrammatical line.
#[cfg_attr(test, test)]
pub(crate) fn test_multi_issue_lines_need_combined_fix() {
	let det = OpportunityDetector::default();
	let ctx = Default::default();
	let many = det
		.detect_line(&ctx, 0, "The report was written by John and it was really very long.")
		.unwrap();
	assert_eq!(many[0].fix_strategy(), FixStrategy::Combined);
	assert!(many[0].combined_fix_instruction().is_some());

	let one = det.detect_line(&ctx, 0, "It is rather late.").unwrap();
	assert_eq!(one[0].fix_strategy(), FixStrategy::Individual);
}

fn arb_opportunities() -> impl Strategy<Value = Vec<Opportunity>> {
	prop::collection::vec((0usize..40, 0usize..4, 0.0f32..=1.0), 0..60).prop_map(|raw| {
		raw.into_iter()
			.map(|(line, kind, confidence)| {
				let kind = [
					OpportunityType::Enhancement,
					OpportunityType::Quickfix,
					OpportunityType::Transform,
					OpportunityType::Metrics,
				][kind];
				Opportunity::new(line, 0, kind, confidence)
			})
			.collect()
	})
}

proptest! {
	/// Must keep every opportunity a stricter level keeps.
	///
	/// - Enforced in: `apply_intensity`
	/// - Failure symptom: Raising the intensity hides markers that were visible before.
	#[test]
	fn test_intensity_levels_nest(opps in arb_opportunities()) {
		let minimal = apply_intensity(Intensity::Minimal, opps.clone());
		let balanced = apply_intensity(Intensity::Balanced, opps.clone());
		let aggressive = apply_intensity(Intensity::Aggressive, opps);

		for o in &minimal {
			prop_assert!(balanced.contains(o));
		}
		for o in &balanced {
			prop_assert!(aggressive.contains(o));
		}
	}
}
