//! Visible line range plus a buffer, from scroll geometry.

use std::ops::RangeInclusive;

use crate::error::{AnnotateError, Result};

/// Lines analyzed above and below the visible range.
pub const DEFAULT_BUFFER_LINES: usize = 5;
/// Line height used when the host has not measured one.
pub const FALLBACK_LINE_HEIGHT: f32 = 20.0;

/// Scroll state reported by the host, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportGeometry {
	pub scroll_top: f32,
	pub viewport_height: f32,
	/// Measured height of one rendered line, if known.
	pub line_height: Option<f32>,
}

impl ViewportGeometry {
	pub fn new(scroll_top: f32, viewport_height: f32, line_height: Option<f32>) -> Self {
		Self {
			scroll_top,
			viewport_height,
			line_height,
		}
	}

	fn validate(&self) -> Result<()> {
		if !self.scroll_top.is_finite() || !self.viewport_height.is_finite() || self.viewport_height < 0.0 {
			return Err(AnnotateError::Geometry(format!(
				"scroll_top={} viewport_height={}",
				self.scroll_top, self.viewport_height
			)));
		}
		Ok(())
	}
}

/// Inclusive line range `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineWindow {
	pub from: usize,
	pub to: usize,
}

impl LineWindow {
	pub fn new(from: usize, to: usize) -> Self {
		Self { from, to }
	}

	pub fn lines(&self) -> RangeInclusive<usize> {
		self.from..=self.to
	}

	pub fn contains(&self, line: usize) -> bool {
		self.lines().contains(&line)
	}

	pub fn len(&self) -> usize {
		self.to - self.from + 1
	}
}

#[derive(Debug, Clone, Copy)]
pub struct ViewportWindower {
	pub buffer_lines: usize,
	pub fallback_line_height: f32,
}

impl Default for ViewportWindower {
	fn default() -> Self {
		Self {
			buffer_lines: DEFAULT_BUFFER_LINES,
			fallback_line_height: FALLBACK_LINE_HEIGHT,
		}
	}
}

impl ViewportWindower {
	/// Computes the buffered window, clamped to `[0, line_count - 1]`.
	pub fn window(&self, geometry: &ViewportGeometry, line_count: usize) -> Result<LineWindow> {
		geometry.validate()?;
		if line_count == 0 {
			return Ok(LineWindow::default());
		}

		let line_height = geometry
			.line_height
			.filter(|h| h.is_finite() && *h > 0.0)
			.unwrap_or(self.fallback_line_height);
		let top = geometry.scroll_top.max(0.0);
		let first_visible = (top / line_height).floor() as usize;
		let last_visible = ((top + geometry.viewport_height) / line_height).ceil() as usize;

		let last = line_count - 1;
		let to = last_visible.saturating_add(self.buffer_lines).min(last);
		let from = first_visible.saturating_sub(self.buffer_lines).min(to);
		Ok(LineWindow { from, to })
	}

	/// Like [`Self::window`], but degrades to `{0, 0}` when geometry is
	/// unavailable.
	pub fn window_or_default(&self, geometry: Result<ViewportGeometry>, line_count: usize) -> LineWindow {
		match geometry.and_then(|g| self.window(&g, line_count)) {
			Ok(window) => window,
			Err(error) => {
				tracing::warn!(%error, "viewport.degraded");
				LineWindow::default()
			}
		}
	}
}
