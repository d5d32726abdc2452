//! Incremental document annotation.
//!
//! Watches a document as it is edited and places small markers next to lines
//! that could be improved. The pipeline decides when to analyze from typing
//! speed and debounce timers, analyzes only the lines around the viewport,
//! caches results per line by content hash, and keeps markers anchored to
//! their text while the document changes.
//!
//! [`AnnotationCoordinator`] ties the pieces together for one document. The
//! host editor and the command catalog plug in through [`HostEditor`] and
//! [`CommandCatalog`]. Time is always passed in by the caller.

pub mod cache;
pub mod coordinator;
pub mod detect;
pub mod document;
pub mod error;
pub mod filter;
pub mod host;
pub mod metrics;
pub mod opportunity;
pub mod overlay;
pub mod settings;
pub mod timing;
pub mod viewport;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_log;

pub use cache::{CacheInvalidation, LineAnalysisCache, LineCacheEntry, LineHash, line_hash};
pub use coordinator::AnnotationCoordinator;
pub use detect::{IssueDetector, OpportunityDetector};
pub use document::{DocumentContext, DocumentType};
pub use error::{AnnotateError, Result};
pub use filter::{Intensity, MAX_INDICATORS, apply_intensity};
pub use host::{CommandCatalog, HostEditor, RopeHost, StaticCatalog};
pub use metrics::{AnalysisMetrics, MetricsSnapshot};
pub use opportunity::{CommandRef, FixStrategy, Issue, IssueKind, Opportunity, OpportunityType};
pub use overlay::{Anchor, MarkerClick, MarkerId, OverlayMarker, OverlayStateStore};
pub use settings::{AnnotationSettings, ResponseTime};
pub use timing::{
	AnalysisTrigger, DebounceScheduler, TimingDecision, TimingDecisionEngine, TimingSettings, TypingMetrics,
	TypingSpeedTracker,
};
pub use viewport::{LineWindow, ViewportGeometry, ViewportWindower};
