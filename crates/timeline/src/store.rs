//! The timeline store: sole owner of the document, selection, and history.
//!
//! Every mutation goes through a store operation. Operations that take a
//! `commit` flag only snapshot history when it is set, so a continuous
//! gesture can issue many non-committing updates and finish with a single
//! undoable step. Operations on unknown ids are silent no-ops.

use reelkit_common::config::{EditorConfig, ZoomConfig};

use crate::document::Document;
use crate::error::{TimelineError, TimelineResult};
use crate::event::{Event, EventId, EventPatch, Frame, NewEvent, DEFAULT_LAYER};
use crate::history::History;
use crate::placement;

/// Title given to fresh documents.
pub const UNTITLED: &str = "Untitled Timeline";

/// Timeline length reported when the document has no events.
pub const EMPTY_MAX_FRAME: Frame = 300;

/// Selected event ids plus the primary selection.
///
/// The primary id is set exactly when a single event is selected; the
/// property panel edits that one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<EventId>,
    primary: Option<EventId>,
}

impl Selection {
    pub fn ids(&self) -> &[EventId] {
        &self.ids
    }

    pub fn primary(&self) -> Option<&EventId> {
        self.primary.as_ref()
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    fn set(&mut self, ids: Vec<EventId>) {
        let mut unique = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        self.primary = match unique.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        };
        self.ids = unique;
    }

    fn retain(&mut self, keep: impl Fn(&EventId) -> bool) {
        let ids = std::mem::take(&mut self.ids);
        let primary = self.primary.take();
        self.ids = ids.into_iter().filter(|id| keep(id)).collect();
        self.primary = primary.filter(|id| keep(id));
    }
}

/// Mutable owner of one timeline.
#[derive(Debug, Clone)]
pub struct TimelineStore {
    document: Document,
    title: String,
    dirty: bool,
    history: History,
    selection: Selection,
    clipboard: Vec<Event>,
    current_frame: Frame,
    playing: bool,
    muted: bool,
    volume: f64,
    zoom: f64,
    zoom_limits: ZoomConfig,
}

impl TimelineStore {
    /// Create a store holding an empty default document.
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_document(Document::default(), config)
    }

    /// Create a store around an existing document. The document becomes the
    /// first history entry.
    pub fn with_document(document: Document, config: &EditorConfig) -> Self {
        let mut history = History::new(config.history.max_snapshots);
        history.push(document.clone());
        Self {
            document,
            title: UNTITLED.to_string(),
            dirty: false,
            history,
            selection: Selection::default(),
            clipboard: Vec::new(),
            current_frame: 0,
            playing: false,
            muted: false,
            volume: 1.0,
            zoom: config.zoom.repaired().clamp(1.0),
            zoom_limits: config.zoom.repaired(),
        }
    }

    // ---- Document lifecycle ----

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Replace the document with a freshly loaded one.
    pub fn set_document(&mut self, document: Document) {
        tracing::debug!(events = document.events.len(), "Document replaced");
        self.document = document;
        self.dirty = false;
        self.selection = Selection::default();
        self.push_to_history();
    }

    /// Start over with an empty document of the given canvas.
    pub fn create_new_document(&mut self, width: u32, height: u32, frame_rate: u32) {
        self.document = Document::new(width, height, frame_rate);
        self.title = UNTITLED.to_string();
        self.dirty = false;
        self.current_frame = 0;
        self.selection = Selection::default();
        self.history.clear();
        self.push_to_history();
    }

    /// Return to the initial state, dropping the document and all history.
    pub fn reset(&mut self) {
        self.document = Document::default();
        self.title = UNTITLED.to_string();
        self.dirty = false;
        self.history.clear();
        self.selection = Selection::default();
        self.clipboard.clear();
        self.current_frame = 0;
        self.playing = false;
        self.muted = false;
        self.volume = 1.0;
        self.zoom = self.zoom_limits.clamp(1.0);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.dirty = true;
    }

    /// Whether there are changes since the last load or [`mark_clean`](Self::mark_clean).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    // ---- Event mutation ----

    /// Append a new event with a fresh id and commit.
    ///
    /// No overlap check is made; see [`add_event_placed`](Self::add_event_placed).
    pub fn add_event(&mut self, new_event: NewEvent) -> TimelineResult<EventId> {
        if new_event.start >= new_event.end {
            return Err(TimelineError::invalid_event(
                self.document.events.len(),
                format!(
                    "start ({}) must be before end ({})",
                    new_event.start, new_event.end
                ),
            ));
        }
        if new_event.layer == Some(0) {
            return Err(TimelineError::invalid_event(
                self.document.events.len(),
                "layer must be at least 1",
            ));
        }

        let id = EventId::generate();
        let event = new_event.into_event(id.clone());
        tracing::debug!(
            id = %id,
            kind = event.kind.name(),
            start = event.start,
            end = event.end,
            layer = event.layer,
            "Event added"
        );
        self.document.events.push(event);
        self.dirty = true;
        self.push_to_history();
        Ok(id)
    }

    /// Insert a new event on the first layer at or above its requested one
    /// that is free for its range.
    pub fn add_event_placed(&mut self, mut new_event: NewEvent) -> TimelineResult<EventId> {
        let desired = new_event.layer.unwrap_or(DEFAULT_LAYER);
        new_event.layer = Some(placement::resolve_layer(
            &self.document.events,
            new_event.start,
            new_event.end,
            desired,
        ));
        self.add_event(new_event)
    }

    /// Merge `patch` into the event `id`.
    ///
    /// Returns false without touching anything when the id is unknown or the
    /// result would have `start >= end` or layer 0.
    pub fn update_event(&mut self, id: &EventId, patch: &EventPatch, commit: bool) -> bool {
        let Some(event) = self.document.event_mut(id) else {
            tracing::debug!(id = %id, "Update ignored: unknown event");
            return false;
        };

        let mut updated = event.clone();
        patch.apply_to(&mut updated);
        if updated.start >= updated.end || updated.layer == 0 {
            tracing::debug!(
                id = %id,
                start = updated.start,
                end = updated.end,
                layer = updated.layer,
                "Update ignored: invalid result"
            );
            return false;
        }

        *event = updated;
        self.dirty = true;
        if commit {
            self.push_to_history();
        }
        true
    }

    pub fn move_event(&mut self, id: &EventId, start: Frame, end: Frame, commit: bool) -> bool {
        self.update_event(id, &EventPatch::range(start, end), commit)
    }

    pub fn resize_event(&mut self, id: &EventId, start: Frame, end: Frame, commit: bool) -> bool {
        self.update_event(id, &EventPatch::range(start, end), commit)
    }

    pub fn change_event_layer(&mut self, id: &EventId, layer: u32, commit: bool) -> bool {
        self.update_event(id, &EventPatch::layer(layer), commit)
    }

    /// Move every event on `from` to `to`, shifting the layers in between by
    /// one so their relative order is kept. Always commits unless `from == to`.
    pub fn reorder_layers(&mut self, from: u32, to: u32) {
        if from == to || from == 0 || to == 0 {
            return;
        }
        for event in &mut self.document.events {
            if event.layer == from {
                event.layer = to;
            } else if from < to && event.layer > from && event.layer <= to {
                event.layer -= 1;
            } else if from > to && event.layer >= to && event.layer < from {
                event.layer += 1;
            }
        }
        tracing::debug!(from, to, "Layers reordered");
        self.dirty = true;
        self.push_to_history();
    }

    pub fn delete_event(&mut self, id: &EventId) {
        self.delete_events(std::slice::from_ref(id));
    }

    /// Remove the given events and drop them from the selection.
    pub fn delete_events(&mut self, ids: &[EventId]) {
        let before = self.document.events.len();
        self.document.events.retain(|e| !ids.contains(&e.id));
        let removed = before - self.document.events.len();
        if removed == 0 {
            tracing::debug!("Delete ignored: no matching events");
            return;
        }
        tracing::debug!(removed, "Events deleted");
        self.selection.retain(|id| !ids.contains(id));
        self.dirty = true;
        self.push_to_history();
    }

    /// Copy an event to `[end, end + len)` on the same layer.
    pub fn duplicate_event(&mut self, id: &EventId) -> Option<EventId> {
        let original = self.document.event(id)?;
        let len = original.duration();
        let mut copy = original.clone();
        copy.id = EventId::generate();
        copy.start = original.end;
        copy.end = original.end + len;

        let new_id = copy.id.clone();
        tracing::debug!(source = %id, id = %new_id, start = copy.start, "Event duplicated");
        self.document.events.push(copy);
        self.dirty = true;
        self.push_to_history();
        Some(new_id)
    }

    // ---- Clipboard ----

    /// Snapshot the given events into the clipboard.
    pub fn copy_events(&mut self, ids: &[EventId]) {
        self.clipboard = self
            .document
            .events
            .iter()
            .filter(|e| ids.contains(&e.id))
            .cloned()
            .collect();
    }

    pub fn clipboard(&self) -> &[Event] {
        &self.clipboard
    }

    /// Paste the clipboard so the earliest copied start lands on
    /// `target_frame`. Returns the new ids in clipboard order.
    pub fn paste_events(&mut self, target_frame: Frame) -> Vec<EventId> {
        let Some(earliest) = self.clipboard.iter().map(|e| e.start).min() else {
            return Vec::new();
        };

        let pasted: Vec<Event> = self
            .clipboard
            .iter()
            .map(|event| {
                let mut copy = event.clone();
                copy.id = EventId::generate();
                copy.start = target_frame + (event.start - earliest);
                copy.end = target_frame + (event.end - earliest);
                copy
            })
            .collect();
        let ids: Vec<EventId> = pasted.iter().map(|e| e.id.clone()).collect();

        tracing::debug!(count = ids.len(), target_frame, "Events pasted");
        self.document.events.extend(pasted);
        self.dirty = true;
        self.push_to_history();
        ids
    }

    // ---- History ----

    /// Snapshot the current document as a new undo step.
    pub fn push_to_history(&mut self) {
        self.history.push(self.document.clone());
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.document = snapshot.clone();
        self.after_restore();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.document = snapshot.clone();
        self.after_restore();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    fn after_restore(&mut self) {
        self.dirty = true;
        let document = &self.document;
        self.selection.retain(|id| document.event(id).is_some());
    }

    // ---- Selection ----

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Select a single event, or clear with `None`.
    pub fn select_event(&mut self, id: Option<&EventId>) {
        self.selection.set(id.cloned().into_iter().collect());
    }

    pub fn select_events(&mut self, ids: &[EventId]) {
        self.selection.set(ids.to_vec());
    }

    pub fn select_all_events(&mut self) {
        let ids = self.document.events.iter().map(|e| e.id.clone()).collect();
        self.selection.set(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.set(Vec::new());
    }

    /// Add `id` to the selection, or remove it if already selected.
    pub fn toggle_selection(&mut self, id: &EventId) {
        let mut ids = self.selection.ids.clone();
        if let Some(pos) = ids.iter().position(|s| s == id) {
            ids.remove(pos);
        } else {
            ids.push(id.clone());
        }
        self.selection.set(ids);
    }

    // ---- Playback-facing state ----

    pub fn current_frame(&self) -> Frame {
        self.current_frame
    }

    /// Move the playhead, clamped to `[0, max_frame]`.
    pub fn set_current_frame(&mut self, frame: Frame) {
        self.current_frame = frame.min(self.max_frame());
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.volume = if volume.is_nan() {
            self.volume
        } else {
            volume.clamp(0.0, 1.0)
        };
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = self.zoom_limits.clamp(zoom);
    }

    // ---- Queries ----

    pub fn event_by_id(&self, id: &EventId) -> Option<&Event> {
        self.document.event(id)
    }

    /// Largest event end, or [`EMPTY_MAX_FRAME`] for an empty document.
    pub fn max_frame(&self) -> Frame {
        self.document.max_end().unwrap_or(EMPTY_MAX_FRAME)
    }

    /// Timeline length rounded to whole seconds.
    pub fn duration_seconds(&self) -> u64 {
        let fps = self.document.frame_rate.max(1) as f64;
        (self.max_frame() as f64 / fps).round() as u64
    }

    pub fn events_in_range(&self, start: Frame, end: Frame) -> Vec<&Event> {
        self.document.events_in_range(start, end)
    }

    pub fn events_at_frame(&self, frame: Frame) -> Vec<&Event> {
        self.document.events_at_frame(frame)
    }

    pub fn layers(&self) -> Vec<u32> {
        self.document.layers()
    }

    // ---- Asset metadata ----

    /// Record the resolved source length of `src` on every media event using
    /// it, shortening clips that now exceed the source. Commits once if
    /// anything changed and returns the number of events touched.
    pub fn apply_resolved_duration(&mut self, src: &str, duration_frames: Frame) -> usize {
        let mut changed = 0;
        for event in &mut self.document.events {
            let start = event.start;
            let end = event.end;
            let Some(media) = event.media_mut() else {
                continue;
            };
            if media.src != src {
                continue;
            }

            let playable = duration_frames
                .saturating_sub(media.trim_in + media.trim_out)
                .max(1);
            let new_end = end.min(start + playable);
            if media.max_duration == Some(duration_frames) && new_end == end {
                continue;
            }
            media.max_duration = Some(duration_frames);
            event.end = new_end;
            changed += 1;
        }

        if changed > 0 {
            tracing::debug!(src, duration_frames, changed, "Applied resolved duration");
            self.dirty = true;
            self.push_to_history();
        }
        changed
    }
}
