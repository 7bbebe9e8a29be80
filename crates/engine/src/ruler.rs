//! Time ruler and playhead.
//!
//! Stateless: the ruler is recomputed from its inputs whenever any of them
//! change and never touches the store.

use reelkit_common::config::LayoutConfig;
use reelkit_timeline::Frame;
use serde::Serialize;

use crate::layout::{Viewport, CANVAS_EXTRA};

/// Seconds of grid drawn past the right edge of the viewport.
pub const LOOKAHEAD_SECS: u64 = 5;

/// Everything the ruler depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulerInput {
    pub fps: u32,
    pub max_frame: Frame,
    pub viewport: Viewport,
    pub current_frame: Frame,
}

/// One grid line per second.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulerTick {
    pub second: u64,
    /// Viewport x of the line.
    pub x: f64,
    pub label: String,
}

/// A vertical line segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VLine {
    pub x: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Drawable ruler output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulerFrame {
    pub ticks: Vec<RulerTick>,
    /// Grid lines span the track area below the ruler strip.
    pub grid_top: f64,
    pub grid_bottom: f64,
    /// The playhead spans the full canvas, ruler included.
    pub playhead: VLine,
}

impl RulerFrame {
    /// Ticks whose line falls inside the clip area.
    pub fn visible_ticks<'a>(
        &'a self,
        geometry: &'a LayoutConfig,
        viewport: &'a Viewport,
    ) -> impl Iterator<Item = &'a RulerTick> + 'a {
        self.ticks
            .iter()
            .filter(move |t| t.x >= geometry.header_width && t.x <= viewport.width)
    }
}

/// Last second that gets a grid line.
///
/// Covers the whole document and the visible viewport plus a lookahead, so
/// scrolling past the end still shows a grid.
pub fn last_tick_second(input: &RulerInput, geometry: &LayoutConfig) -> u64 {
    let fps = input.fps.max(1) as u64;
    let pps = geometry.base_pixels_per_second * input.viewport.zoom;
    let visible_end = ((input.viewport.scroll_left + input.viewport.width) / pps)
        .ceil()
        .max(0.0) as u64
        + LOOKAHEAD_SECS;
    let document_end = input.max_frame.div_ceil(fps);
    visible_end.max(document_end)
}

/// Compute grid ticks and the playhead for the given inputs.
pub fn render_ruler(input: &RulerInput, geometry: &LayoutConfig) -> RulerFrame {
    let pps = geometry.base_pixels_per_second * input.viewport.zoom;
    let fps = input.fps.max(1) as f64;
    let origin = geometry.header_width - input.viewport.scroll_left;

    let ticks = (0..=last_tick_second(input, geometry))
        .map(|second| RulerTick {
            second,
            x: origin + second as f64 * pps,
            label: format!("{second}s"),
        })
        .collect();

    let canvas_bottom = input.viewport.height + geometry.ruler_height + CANVAS_EXTRA;
    RulerFrame {
        ticks,
        grid_top: geometry.ruler_height,
        grid_bottom: input.viewport.height,
        playhead: VLine {
            x: origin + input.current_frame as f64 / fps * pps,
            top: 0.0,
            bottom: canvas_bottom,
        },
    }
}
