//! Timeline view geometry.
//!
//! All positions are in viewport pixels: `(0, 0)` is the top-left of the
//! timeline widget, the track header column occupies `[0, header_width)` and
//! the ruler strip occupies `[0, ruler_height)`. Horizontal scroll shifts
//! clip content left; the header and ruler strip stay fixed.

use reelkit_common::config::LayoutConfig;
use reelkit_timeline::{Document, Event, Frame};
use serde::{Deserialize, Serialize};

/// Extra pixels below the last track so the playhead reaches the bottom edge.
pub const CANVAS_EXTRA: f64 = 10.0;

/// Axis-aligned rectangle in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Inclusive on every edge.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    pub fn intersects_x(&self, left: f64, right: f64) -> bool {
        self.x < right && left < self.right()
    }
}

/// What part of the timeline is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Zoom factor applied to the base pixels-per-second.
    pub zoom: f64,
    /// Horizontal scroll offset in pixels.
    pub scroll_left: f64,
    /// Visible width in pixels, header column included.
    pub width: f64,
    /// Height of the track area in pixels.
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            scroll_left: 0.0,
            width: 1280.0,
            height: 400.0,
        }
    }
}

/// Pixel layout of one document in one viewport.
#[derive(Debug, Clone)]
pub struct TimelineLayout {
    geometry: LayoutConfig,
    fps: u32,
    viewport: Viewport,
    rows: Vec<u32>,
}

impl TimelineLayout {
    pub fn new(geometry: &LayoutConfig, document: &Document, viewport: Viewport) -> Self {
        Self {
            geometry: geometry.clone(),
            fps: document.frame_rate.max(1),
            viewport,
            rows: document.layers(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn geometry(&self) -> &LayoutConfig {
        &self.geometry
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn pixels_per_second(&self) -> f64 {
        self.geometry.base_pixels_per_second * self.viewport.zoom
    }

    /// Width in pixels of a span of frames.
    pub fn frames_to_px(&self, frames: f64) -> f64 {
        frames / self.fps as f64 * self.pixels_per_second()
    }

    /// Whole frames covered by a horizontal pixel delta (may be negative).
    pub fn px_to_frames(&self, px: f64) -> i64 {
        (px / self.pixels_per_second() * self.fps as f64).round() as i64
    }

    /// Viewport x of a frame boundary.
    pub fn frame_to_x(&self, frame: f64) -> f64 {
        self.geometry.header_width + self.frames_to_px(frame) - self.viewport.scroll_left
    }

    /// Nearest frame under a viewport x, never negative.
    pub fn x_to_frame(&self, x: f64) -> Frame {
        let content_px = x - self.geometry.header_width + self.viewport.scroll_left;
        self.px_to_frames(content_px).max(0) as Frame
    }

    /// Layers in display order; the index is the row.
    pub fn rows(&self) -> &[u32] {
        &self.rows
    }

    pub fn row_of_layer(&self, layer: u32) -> Option<usize> {
        self.rows.binary_search(&layer).ok()
    }

    pub fn row_y(&self, row: usize) -> f64 {
        self.geometry.ruler_height + row as f64 * self.geometry.track_height
    }

    /// Row under a viewport y, if it falls on an existing track.
    pub fn row_at(&self, y: f64) -> Option<usize> {
        let offset = y - self.geometry.ruler_height;
        if offset < 0.0 {
            return None;
        }
        let row = (offset / self.geometry.track_height).floor() as usize;
        (row < self.rows.len()).then_some(row)
    }

    /// Bounding box of a clip. Layers missing from the row map use row 0.
    pub fn clip_rect(&self, event: &Event) -> Rect {
        let row = self.row_of_layer(event.layer).unwrap_or(0);
        Rect::new(
            self.frame_to_x(event.start as f64),
            self.row_y(row),
            self.frames_to_px(event.duration() as f64),
            self.geometry.track_height,
        )
    }

    /// Full drawing surface height: ruler, tracks, and a small margin.
    pub fn canvas_height(&self) -> f64 {
        self.viewport.height + self.geometry.ruler_height + CANVAS_EXTRA
    }

    /// Whether any part of `rect` is horizontally inside the clip area.
    pub fn is_on_screen(&self, rect: &Rect) -> bool {
        rect.intersects_x(self.geometry.header_width, self.viewport.width)
    }
}
