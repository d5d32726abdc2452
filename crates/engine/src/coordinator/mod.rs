//! Orchestration for one document.
//!
//! The coordinator owns the cache, the overlay, and the timing engine for a
//! single document. Input events update timing state; analysis only runs from
//! [`AnnotationCoordinator::tick`] or directly after a command edit.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use marginalia_primitives::Transaction;

use crate::cache::{CacheInvalidation, LineAnalysisCache, line_hash};
use crate::detect::{OpportunityDetector, ScoreKey};
use crate::document::{DocumentContext, DocumentType};
use crate::error::{Result, panic_message};
use crate::filter::apply_intensity;
use crate::host::{CommandCatalog, HostEditor};
use crate::metrics::AnalysisMetrics;
use crate::opportunity::Opportunity;
use crate::overlay::{Anchor, MarkerClick, MarkerId, OverlayStateStore};
use crate::settings::AnnotationSettings;
use crate::timing::{
	AnalysisTrigger, DecisionReason, SubscriptionId, TimingDecision, TimingDecisionEngine, TimingListener,
	TimingSettings,
};
use crate::viewport::{LineWindow, ViewportWindower};


/// Runs the annotation pipeline for one document.
pub struct AnnotationCoordinator<H, C> {
	host: H,
	catalog: C,
	settings: AnnotationSettings,
	document_type: DocumentType,
	timing: TimingDecisionEngine,
	detector: OpportunityDetector,
	cache: LineAnalysisCache,
	invalidation: CacheInvalidation,
	windower: ViewportWindower,
	overlay: OverlayStateStore,
	metrics: AnalysisMetrics,
	score_key: Option<ScoreKey>,
	disposed: bool,
}

impl<H: HostEditor, C: CommandCatalog> AnnotationCoordinator<H, C> {
	pub fn new(host: H, catalog: C, settings: AnnotationSettings, document_type: DocumentType) -> Self {
		Self {
			host,
			catalog,
			timing: TimingDecisionEngine::new(settings.to_timing_settings(), document_type),
			settings,
			document_type,
			detector: OpportunityDetector::default(),
			cache: LineAnalysisCache::new(),
			invalidation: CacheInvalidation::default(),
			windower: ViewportWindower::default(),
			overlay: OverlayStateStore::new(),
			metrics: AnalysisMetrics::new(),
			score_key: None,
			disposed: false,
		}
	}

	pub fn with_detector(mut self, detector: OpportunityDetector) -> Self {
		self.detector = detector;
		self.cache.invalidate_all();
		self
	}

	pub fn with_invalidation(mut self, invalidation: CacheInvalidation) -> Self {
		self.invalidation = invalidation;
		self
	}

	pub fn with_windower(mut self, windower: ViewportWindower) -> Self {
		self.windower = windower;
		self
	}

	/// Whether analysis may run for the current document type and settings.
	pub fn is_enabled(&self) -> bool {
		!self.disposed && self.settings.is_enabled_for(self.document_type)
	}

	/// Judges a keystroke.
	///
	/// The cache is invalidated before timing runs, so an analysis scheduled
	/// by this keystroke never reads entries from before the edit. A fast
	/// typing decision clears the overlay.
	pub fn on_keystroke(&mut self, now: Instant) -> TimingDecision {
		if self.invalidation == CacheInvalidation::All {
			self.cache.invalidate_all();
		}

		if !self.is_enabled() {
			self.overlay.clear();
			return TimingDecision::hide(DecisionReason::Disabled);
		}

		let decision = self.timing.on_keystroke(now);
		if matches!(decision.reason, DecisionReason::FastTyping { .. }) {
			self.overlay.clear();
		}
		decision
	}

	/// Applies a document edit made by the user.
	///
	/// Markers are remapped through the edit right away. Cache entries are
	/// dropped according to the invalidation policy.
	pub fn on_edit(&mut self, tx: Transaction) {
		self.apply_to_host(tx);
		match self.invalidation {
			CacheInvalidation::All => self.cache.invalidate_all(),
			CacheInvalidation::EditedLines => self.cache.truncate(self.host.line_count()),
		}
	}

	/// An edit typed by the user: [`Self::on_edit`] then [`Self::on_keystroke`].
	pub fn on_typed(&mut self, now: Instant, tx: Transaction) -> TimingDecision {
		self.on_edit(tx);
		self.on_keystroke(now)
	}

	pub fn on_scroll(&mut self, now: Instant) {
		if self.is_enabled() {
			self.timing.on_scroll(now);
		}
	}

	/// Fires due timers and runs the analysis pass they call for.
	pub fn tick(&mut self, now: Instant) -> Option<AnalysisTrigger> {
		if !self.is_enabled() {
			return None;
		}
		let trigger = self.timing.tick(now)?;
		tracing::debug!(%trigger, "analysis.run");
		self.run_analysis();
		Some(trigger)
	}

	/// Earliest instant at which [`Self::tick`] has work.
	pub fn next_deadline(&self) -> Option<Instant> {
		self.timing.next_deadline()
	}

	/// Applies an edit produced by running a command on `line`, then
	/// re-analyzes immediately.
	///
	/// Only the cache entry for `line` is dropped; other lines are protected
	/// by their hashes.
	pub fn on_command_applied(&mut self, now: Instant, line: usize, tx: Transaction) {
		self.apply_to_host(tx);
		self.cache.invalidate_line(line);
		self.cache.truncate(self.host.line_count());

		if self.is_enabled() {
			self.run_analysis();
			self.timing.note_analysis(now);
		}
	}

	/// Forwards a marker click to the click sink. Never mutates state.
	pub fn click_marker(&mut self, id: MarkerId) -> Option<MarkerClick> {
		self.overlay.click(id)
	}

	pub fn set_click_sink(&mut self, sink: impl FnMut(&MarkerClick) + 'static) {
		self.overlay.set_click_sink(sink);
	}

	pub fn subscribe(&mut self, listener: TimingListener) -> SubscriptionId {
		self.timing.subscribe(listener)
	}

	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		self.timing.unsubscribe(id)
	}

	/// Replaces the user settings. Disabling stops timers and clears markers.
	pub fn set_settings(&mut self, settings: AnnotationSettings) {
		self.timing.set_settings(settings.to_timing_settings());
		self.settings = settings;
		self.apply_gate();
	}

	/// Replaces the timing snapshot directly, after validating it.
	pub fn set_timing_settings(&mut self, timing: TimingSettings) -> Result<()> {
		timing.validate()?;
		self.timing.set_settings(timing);
		Ok(())
	}

	pub fn set_document_type(&mut self, document_type: DocumentType) {
		if self.document_type == document_type {
			return;
		}
		self.document_type = document_type;
		self.timing.set_document_type(document_type);
		self.cache.invalidate_all();
		self.apply_gate();
	}

	/// Stops all timing activity and drops cached state. The coordinator
	/// stays inert afterwards.
	pub fn dispose(&mut self) {
		self.timing.dispose();
		self.cache.invalidate_all();
		self.overlay.clear();
		self.disposed = true;
	}

	pub fn host(&self) -> &H {
		&self.host
	}

	/// Mutable host access for cursor, selection, and geometry updates.
	///
	/// Document edits must go through [`Self::on_edit`] so markers follow them.
	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	pub fn settings(&self) -> &AnnotationSettings {
		&self.settings
	}

	pub fn document_type(&self) -> DocumentType {
		self.document_type
	}

	pub fn timing(&self) -> &TimingDecisionEngine {
		&self.timing
	}

	pub fn cache(&self) -> &LineAnalysisCache {
		&self.cache
	}

	pub fn overlay(&self) -> &OverlayStateStore {
		&self.overlay
	}

	pub fn metrics(&self) -> &AnalysisMetrics {
		&self.metrics
	}

	fn apply_gate(&mut self) {
		if !self.is_enabled() {
			self.timing.cancel_all();
			self.overlay.clear();
		}
	}

	fn apply_to_host(&mut self, tx: Transaction) {
		self.host.apply(&tx);
		self.overlay.note_change(tx.into_changes());
		self.overlay.map_pending(|pos| self.host.line_of_offset(pos));
	}

	fn context(&self) -> DocumentContext {
		DocumentContext {
			document_type: self.document_type,
			selection_text: self.host.selection_text(),
			cursor_context: self.host.cursor_context(),
			word_count: self.host.word_count(),
		}
	}

	/// One pass over the viewport window, published to the overlay.
	fn run_analysis(&mut self) {
		self.metrics.inc_pass();

		let line_count = self.host.line_count();
		let window = self
			.windower
			.window_or_default(self.host.viewport_geometry(), line_count);
		let ctx = self.context();

		let key = ScoreKey::of(&ctx);
		if self.score_key.replace(key) != Some(key) {
			self.cache.invalidate_all();
		}

		let mut found = self.detect_window(&ctx, window);
		if let Some(metrics) = self.detector.detect_metrics(&ctx, window.from) {
			found.push(metrics);
		}

		let shown = apply_intensity(self.settings.intensity(), found);
		let placed: Vec<(Opportunity, Anchor)> = shown
			.into_iter()
			.filter_map(|mut opportunity| {
				let span = self.host.line_span(opportunity.line)?;
				opportunity.commands = self.catalog.commands_for(opportunity.kind);
				Some((opportunity, Anchor::for_span(&span)))
			})
			.collect();

		self.overlay.publish(placed, |pos| self.host.line_of_offset(pos));
		self.metrics.record_published(self.overlay.len());
		self.metrics.log();
	}

	fn detect_window(&mut self, ctx: &DocumentContext, window: LineWindow) -> Vec<Opportunity> {
		let mut found = Vec::new();
		for line in window.lines() {
			// A line that vanished since the window was computed is a miss.
			let Some(text) = self.host.line_text(line) else {
				continue;
			};
			let hash = line_hash(&text);

			if let Some(cached) = self.cache.lookup(line, hash) {
				tracing::trace!(line, "cache.hit");
				self.metrics.inc_cache_hit();
				found.extend_from_slice(cached);
				continue;
			}

			tracing::trace!(line, "cache.miss");
			self.metrics.inc_cache_miss();
			let detector = &self.detector;
			let metrics = &self.metrics;
			let result = catch_unwind(AssertUnwindSafe(|| {
				metrics.inc_detector_invocation();
				detector.detect_line(ctx, line, &text)
			}));
			match result {
				Ok(Ok(opportunities)) => {
					self.cache.put(line, hash, opportunities.clone());
					found.extend(opportunities);
				}
				Ok(Err(error)) => {
					self.metrics.inc_detector_failure();
					tracing::warn!(line, %error, "analysis.detector_failed");
				}
				Err(payload) => {
					self.metrics.inc_detector_failure();
					let message = panic_message(&*payload);
					tracing::warn!(line, %message, "analysis.detector_panicked");
				}
			}
		}
		found
	}
}
