//! Pointer interaction with the timeline view.
//!
//! One gesture runs from pointer-down to pointer-up:
//!
//! ```text
//! Idle ──down──▶ Seeking            empty track area or ruler
//!            ├─▶ Moving             clip body
//!            ├─▶ Resizing           clip edge (handle)
//!            └─▶ ReorderingTracks   track header
//! ```
//!
//! Moves and resizes write non-committing store updates while the pointer
//! travels and commit a single history entry on pointer-up. Coordinates are
//! viewport pixels, as in [`crate::layout`].

use reelkit_common::config::LayoutConfig;
use reelkit_timeline::asset::AssetRef;
use reelkit_timeline::placement;
use reelkit_timeline::{
    Document, Event, EventId, EventPatch, Frame, TimelineResult, TimelineStore,
};

use crate::layout::{TimelineLayout, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorIcon {
    #[default]
    Default,
    ResizeHorizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleSide {
    Left,
    Right,
}

/// What lies under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    Body(EventId),
    Handle(EventId, HandleSide),
}

impl HitTarget {
    pub fn id(&self) -> &EventId {
        match self {
            HitTarget::Body(id) | HitTarget::Handle(id, _) => id,
        }
    }
}

/// Keyboard modifiers held at pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
}

/// Coarse gesture state, for callers that only need to know what is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Idle,
    Seeking,
    Moving,
    Resizing,
    ReorderingTracks,
}

#[derive(Debug, Clone)]
struct MoveOrigin {
    id: EventId,
    start: Frame,
    end: Frame,
    layer: u32,
    row: usize,
}

#[derive(Debug, Clone)]
struct ResizeOrigin {
    id: EventId,
    side: HandleSide,
    start: Frame,
    end: Frame,
    /// Trim points, present for media kinds.
    trims: Option<(Frame, Frame)>,
    /// Source length, resolved or implied by the trims.
    source_duration: Option<Frame>,
    /// End of the nearest clip to the left on the same layer.
    prev_end: Option<Frame>,
    /// Start of the nearest clip to the right on the same layer.
    next_start: Option<Frame>,
}

#[derive(Debug, Clone)]
enum Gesture {
    Idle,
    Seeking,
    Moving {
        anchor: (f64, f64),
        /// Rows as they were at pointer-down; moves never create tracks.
        rows: Vec<u32>,
        clips: Vec<MoveOrigin>,
    },
    Resizing {
        anchor_x: f64,
        origin: ResizeOrigin,
    },
    ReorderingTracks {
        layer: u32,
    },
}

/// Pointer state machine for one timeline view.
#[derive(Debug, Clone)]
pub struct Interaction {
    geometry: LayoutConfig,
    gesture: Gesture,
}

impl Interaction {
    pub fn new(geometry: &LayoutConfig) -> Self {
        Self {
            geometry: geometry.clone(),
            gesture: Gesture::Idle,
        }
    }

    pub fn gesture(&self) -> GestureKind {
        match self.gesture {
            Gesture::Idle => GestureKind::Idle,
            Gesture::Seeking => GestureKind::Seeking,
            Gesture::Moving { .. } => GestureKind::Moving,
            Gesture::Resizing { .. } => GestureKind::Resizing,
            Gesture::ReorderingTracks { .. } => GestureKind::ReorderingTracks,
        }
    }

    fn layout(&self, document: &Document, viewport: Viewport) -> TimelineLayout {
        TimelineLayout::new(&self.geometry, document, viewport)
    }

    /// Topmost clip under `(x, y)`. Later events in the document draw on top,
    /// so they are tested first.
    pub fn hit_test(&self, document: &Document, viewport: Viewport, x: f64, y: f64) -> Option<HitTarget> {
        if x < self.geometry.header_width {
            return None;
        }
        let layout = self.layout(document, viewport);
        let event = document
            .events
            .iter()
            .rev()
            .find(|e| layout.clip_rect(e).contains(x, y))?;

        let rect = layout.clip_rect(event);
        let handle = self.geometry.handle_width;
        let target = if x - rect.x <= handle {
            HitTarget::Handle(event.id.clone(), HandleSide::Left)
        } else if rect.right() - x <= handle {
            HitTarget::Handle(event.id.clone(), HandleSide::Right)
        } else {
            HitTarget::Body(event.id.clone())
        };
        Some(target)
    }

    /// Hover feedback for `(x, y)`.
    pub fn cursor_at(&self, store: &TimelineStore, viewport: Viewport, x: f64, y: f64) -> CursorIcon {
        match self.gesture {
            Gesture::Resizing { .. } => return CursorIcon::ResizeHorizontal,
            Gesture::Idle => {}
            _ => return CursorIcon::Default,
        }
        match self.hit_test(store.document(), viewport, x, y) {
            Some(HitTarget::Handle(..)) => CursorIcon::ResizeHorizontal,
            _ => CursorIcon::Default,
        }
    }

    pub fn pointer_down(
        &mut self,
        store: &mut TimelineStore,
        viewport: Viewport,
        x: f64,
        y: f64,
        modifiers: Modifiers,
    ) {
        let layout = self.layout(store.document(), viewport);

        if x < self.geometry.header_width {
            self.gesture = match layout.row_at(y) {
                Some(row) => Gesture::ReorderingTracks {
                    layer: layout.rows()[row],
                },
                None => Gesture::Idle,
            };
            return;
        }

        let Some(target) = self.hit_test(store.document(), viewport, x, y) else {
            store.clear_selection();
            store.set_current_frame(layout.x_to_frame(x));
            self.gesture = Gesture::Seeking;
            return;
        };

        let id = target.id().clone();
        if modifiers.shift {
            store.toggle_selection(&id);
            if !store.selection().contains(&id) {
                self.gesture = Gesture::Idle;
                return;
            }
        } else if !store.selection().contains(&id) {
            store.select_event(Some(&id));
        }

        self.gesture = match target {
            HitTarget::Handle(_, side) => match store.event_by_id(&id) {
                Some(event) => Gesture::Resizing {
                    anchor_x: x,
                    origin: resize_origin(store.document(), event, side),
                },
                None => Gesture::Idle,
            },
            HitTarget::Body(_) => {
                let clips = store
                    .selection()
                    .ids()
                    .iter()
                    .filter_map(|sid| store.event_by_id(sid))
                    .map(|e| MoveOrigin {
                        id: e.id.clone(),
                        start: e.start,
                        end: e.end,
                        layer: e.layer,
                        row: layout.row_of_layer(e.layer).unwrap_or(0),
                    })
                    .collect();
                Gesture::Moving {
                    anchor: (x, y),
                    rows: layout.rows().to_vec(),
                    clips,
                }
            }
        };
        tracing::trace!(id = %id, gesture = ?self.gesture(), "Gesture started");
    }

    pub fn pointer_move(&mut self, store: &mut TimelineStore, viewport: Viewport, x: f64, y: f64) {
        let layout = self.layout(store.document(), viewport);
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Seeking => store.set_current_frame(layout.x_to_frame(x)),
            Gesture::Moving {
                anchor,
                rows,
                clips,
            } => {
                let delta_frames = layout.px_to_frames(x - anchor.0);
                let delta_rows = ((y - anchor.1) / self.geometry.track_height).round() as i64;
                // Shift the group as a whole so no clip goes below frame 0.
                let earliest = clips.iter().map(|c| c.start).min().unwrap_or(0);
                let delta_frames = delta_frames.max(-(earliest as i64));
                let last_row = rows.len().saturating_sub(1) as i64;

                for clip in clips.iter() {
                    let start = (clip.start as i64 + delta_frames) as Frame;
                    let row = (clip.row as i64 + delta_rows).clamp(0, last_row) as usize;
                    let layer = rows.get(row).copied().unwrap_or(clip.layer);
                    let patch = EventPatch {
                        layer: Some(layer),
                        ..EventPatch::range(start, start + (clip.end - clip.start))
                    };
                    store.update_event(&clip.id, &patch, false);
                }
            }
            Gesture::Resizing { anchor_x, origin } => {
                let delta = layout.px_to_frames(x - *anchor_x);
                let patch = resize_patch(origin, delta);
                store.update_event(&origin.id, &patch, false);
            }
            Gesture::ReorderingTracks { layer } => {
                let Some(row) = clamped_row(&layout, y) else {
                    return;
                };
                let target = layout.rows()[row];
                if target != *layer {
                    store.reorder_layers(*layer, target);
                    *layer = target;
                }
            }
        }
    }

    /// Finish the gesture. Returns true when a history entry was committed.
    pub fn pointer_up(&mut self, store: &mut TimelineStore, viewport: Viewport, x: f64, y: f64) -> bool {
        self.pointer_move(store, viewport, x, y);

        let changed = match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Moving { clips, .. } => clips.iter().any(|c| {
                store
                    .event_by_id(&c.id)
                    .is_some_and(|e| (e.start, e.end, e.layer) != (c.start, c.end, c.layer))
            }),
            Gesture::Resizing { origin, .. } => store
                .event_by_id(&origin.id)
                .is_some_and(|e| (e.start, e.end) != (origin.start, origin.end)),
            Gesture::Idle | Gesture::Seeking | Gesture::ReorderingTracks { .. } => false,
        };

        if changed {
            store.push_to_history();
            tracing::debug!("Gesture committed");
        }
        changed
    }

    /// Insert an asset dropped at viewport x on the lowest free layer.
    pub fn drop_asset(
        &self,
        store: &mut TimelineStore,
        viewport: Viewport,
        x: f64,
        asset: &AssetRef,
    ) -> TimelineResult<EventId> {
        let layout = self.layout(store.document(), viewport);
        let start = layout.x_to_frame(x);
        let new_event = asset.to_new_event(start, store.document().frame_rate);
        let layer =
            placement::find_free_layer(&store.document().events, new_event.start, new_event.end);
        let id = store.add_event(new_event.on_layer(layer))?;
        store.select_event(Some(&id));
        tracing::debug!(id = %id, asset = %asset.name, layer, "Asset dropped");
        Ok(id)
    }
}

/// Track row under y, clamped to the first or last track.
fn clamped_row(layout: &TimelineLayout, y: f64) -> Option<usize> {
    let last = layout.rows().len().checked_sub(1)?;
    if y < layout.row_y(0) {
        return Some(0);
    }
    Some(layout.row_at(y).unwrap_or(last))
}

fn resize_origin(document: &Document, event: &Event, side: HandleSide) -> ResizeOrigin {
    let neighbours = || {
        document
            .events
            .iter()
            .filter(|e| e.layer == event.layer && e.id != event.id)
    };
    ResizeOrigin {
        id: event.id.clone(),
        side,
        start: event.start,
        end: event.end,
        trims: event.media().map(|m| (m.trim_in, m.trim_out)),
        source_duration: event.source_duration(),
        prev_end: neighbours()
            .filter(|e| e.end <= event.start)
            .map(|e| e.end)
            .max(),
        next_start: neighbours()
            .filter(|e| e.start >= event.end)
            .map(|e| e.start)
            .min(),
    }
}

/// New range and trims for a handle dragged by `delta` frames.
///
/// The clip keeps at least one frame, never crosses its neighbours on the
/// same layer or frame 0, and for media never shows more than the source
/// holds. When the source length was never resolved, the clip can only grow
/// back over the frames its trims already cut.
fn resize_patch(origin: &ResizeOrigin, delta: i64) -> EventPatch {
    match origin.side {
        HandleSide::Left => {
            let mut lower = origin.prev_end.unwrap_or(0) as i64;
            if let (Some((_, trim_out)), Some(source)) = (origin.trims, origin.source_duration) {
                lower = lower.max(origin.end as i64 - (source as i64 - trim_out as i64));
            }
            let upper = origin.end as i64 - 1;
            let start = (origin.start as i64 + delta).min(upper).max(lower).max(0) as Frame;

            let mut patch = EventPatch::range(start, origin.end);
            if let Some((trim_in, _)) = origin.trims {
                let trim_in = (trim_in as i64 + start as i64 - origin.start as i64).max(0);
                patch = patch.with_trim_in(trim_in as Frame);
            }
            patch
        }
        HandleSide::Right => {
            let lower = origin.start + 1;
            let mut end = (origin.end as i64 + delta).max(lower as i64) as Frame;
            if let Some(next) = origin.next_start {
                end = end.min(next);
            }
            if let (Some((trim_in, _)), Some(source)) = (origin.trims, origin.source_duration) {
                end = end.min(origin.start + source.saturating_sub(trim_in));
            }
            let end = end.max(lower);

            let mut patch = EventPatch::range(origin.start, end);
            if let Some((_, trim_out)) = origin.trims {
                let trim_out = (trim_out as i64 + origin.end as i64 - end as i64).max(0);
                patch = patch.with_trim_out(trim_out as Frame);
            }
            patch
        }
    }
}
