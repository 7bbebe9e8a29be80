//! Collision-aware layer selection for inserted clips.
//!
//! Inserts from asset drops and automated actions never land on top of an
//! existing clip on the same layer. Drag gestures are free to overlap; only
//! programmatic placement goes through here.

use crate::event::{Event, Frame, DEFAULT_LAYER};

/// Half-open interval intersection: `a_start < b_end && b_start < a_end`.
pub fn overlaps(a_start: Frame, a_end: Frame, b_start: Frame, b_end: Frame) -> bool {
    a_start < b_end && b_start < a_end
}

/// Whether `layer` has any event intersecting `[start, end)`.
pub fn layer_occupied(events: &[Event], layer: u32, start: Frame, end: Frame) -> bool {
    events
        .iter()
        .any(|e| e.layer == layer && overlaps(e.start, e.end, start, end))
}

/// First layer at or above `desired` that is free for `[start, end)`.
///
/// Layer 0 is not a valid track and is treated as [`DEFAULT_LAYER`].
pub fn resolve_layer(events: &[Event], start: Frame, end: Frame, desired: u32) -> u32 {
    let mut layer = desired.max(DEFAULT_LAYER);
    while layer_occupied(events, layer, start, end) {
        layer += 1;
    }
    if layer != desired {
        tracing::debug!(desired, resolved = layer, start, end, "Placement bumped layer");
    }
    layer
}

/// Lowest free layer for `[start, end)`, starting from the bottom track.
pub fn find_free_layer(events: &[Event], start: Frame, end: Frame) -> u32 {
    resolve_layer(events, start, end, DEFAULT_LAYER)
}
