//! Clip compositor.
//!
//! Turns the document, the selection, and the viewport into colored quads
//! (one per clip, plus two handle bars per selected clip) and a GPU-ready
//! triangle list in clip space. Drawing is delegated to a [`QuadRenderer`].
//!
//! The compositor also owns the [`TransformTable`]: one [`RenderHandle`] per
//! on-canvas element in the preview. Playback writes transforms into it on
//! every tick without going through the store.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use reelkit_common::config::LayoutConfig;
use reelkit_common::ReelkitResult;
use reelkit_timeline::{Document, Event, EventId, EventKind, Selection};

use crate::layout::{Rect, TimelineLayout, Viewport};

/// Width of the resize handle bars drawn on selected clips.
pub const HANDLE_BAR_PX: f64 = 6.0;

/// Added to each channel of a selected clip's color.
pub const SELECTION_BRIGHTEN: f32 = 0.6;

pub const HANDLE_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// Base color per event kind.
pub fn kind_color(kind: &EventKind) -> [f32; 3] {
    match kind {
        EventKind::Video(_) => [0.13, 0.44, 0.91],
        EventKind::Audio(_) => [0.15, 0.78, 0.35],
        EventKind::Image(_) => [0.6, 0.4, 0.9],
        EventKind::Caption(_) => [0.92, 0.8, 0.25],
        EventKind::Transition(_) => [0.97, 0.33, 0.33],
    }
}

fn brighten(color: [f32; 3]) -> [f32; 3] {
    color.map(|c| (c + SELECTION_BRIGHTEN).min(1.0))
}

/// Vertex layout uploaded to the GPU: clip-space position plus flat color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 2],
    pub color: [f32; 3],
}

/// One drawn clip.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipQuad {
    pub id: EventId,
    /// Pixel rectangle as drawn (half-pixel aligned, 1 px gap on the right).
    pub rect: Rect,
    pub color: [f32; 3],
    pub selected: bool,
    pub label: String,
    /// Left and right resize bars, present on selected clips.
    pub handles: Option<[Rect; 2]>,
}

/// Output of one composition pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorFrame {
    /// Canvas size in pixels.
    pub width: f64,
    pub height: f64,
    pub quads: Vec<ClipQuad>,
    /// Six vertices per filled rectangle.
    pub vertices: Vec<ColorVertex>,
}

impl CompositorFrame {
    /// Vertex data as raw bytes for buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn quad(&self, id: &EventId) -> Option<&ClipQuad> {
        self.quads.iter().find(|q| &q.id == id)
    }
}

/// Backend that draws composed frames.
pub trait QuadRenderer {
    /// Canvas size changed.
    fn resize(&mut self, width: f64, height: f64);

    /// Draw a composed frame, replacing whatever was drawn before.
    fn draw(&mut self, frame: &CompositorFrame) -> ReelkitResult<()>;
}

/// Renderer that keeps every frame it is given. Useful headless and in tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub size: Option<(f64, f64)>,
    pub frames: Vec<CompositorFrame>,
}

impl RecordingRenderer {
    pub fn last(&self) -> Option<&CompositorFrame> {
        self.frames.last()
    }
}

impl QuadRenderer for RecordingRenderer {
    fn resize(&mut self, width: f64, height: f64) {
        self.size = Some((width, height));
    }

    fn draw(&mut self, frame: &CompositorFrame) -> ReelkitResult<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

/// Placement of a preview element on the output canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTransform {
    /// Offset from canvas centre in output pixels.
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl Default for RenderTransform {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale: 1.0,
        }
    }
}

impl RenderTransform {
    pub fn css(&self) -> String {
        format!(
            "translate(-50%,-50%) translate({:.3}px, {:.3}px) scale({:.4})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}

/// Live state of one preview element.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderHandle {
    /// Stable slot index, assigned on first sight of the event.
    pub slot: usize,
    pub transform: RenderTransform,
    pub visible: bool,
    /// Stacking order; higher draws on top.
    pub z_order: u32,
    /// Position inside the source media in seconds, for video and audio.
    pub media_time: Option<f64>,
}

/// Event id → render handle table written by the playback tick.
#[derive(Debug, Default)]
pub struct TransformTable {
    handles: HashMap<EventId, RenderHandle>,
    next_slot: usize,
}

impl TransformTable {
    pub fn get(&self, id: &EventId) -> Option<&RenderHandle> {
        self.handles.get(id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Ids of visible handles, bottom to top.
    pub fn visible_ids(&self) -> Vec<&EventId> {
        let mut visible: Vec<(&EventId, &RenderHandle)> =
            self.handles.iter().filter(|(_, h)| h.visible).collect();
        visible.sort_by_key(|(_, h)| (h.z_order, h.slot));
        visible.into_iter().map(|(id, _)| id).collect()
    }

    fn entry(&mut self, id: &EventId) -> &mut RenderHandle {
        let next_slot = &mut self.next_slot;
        self.handles.entry(id.clone()).or_insert_with(|| {
            let slot = *next_slot;
            *next_slot += 1;
            RenderHandle {
                slot,
                transform: RenderTransform::default(),
                visible: false,
                z_order: 0,
                media_time: None,
            }
        })
    }

    fn retain(&mut self, keep: impl Fn(&EventId) -> bool) {
        self.handles.retain(|id, _| keep(id));
    }
}

/// Builds clip quads and owns the preview handle table.
#[derive(Debug, Default)]
pub struct Compositor {
    geometry: LayoutConfig,
    transforms: TransformTable,
}

impl Compositor {
    pub fn new(geometry: &LayoutConfig) -> Self {
        Self {
            geometry: geometry.clone(),
            transforms: TransformTable::default(),
        }
    }

    pub fn geometry(&self) -> &LayoutConfig {
        &self.geometry
    }

    pub fn transforms(&self) -> &TransformTable {
        &self.transforms
    }

    /// Compose the timeline view. Clips entirely outside the viewport are culled.
    pub fn compose(
        &self,
        document: &Document,
        selection: &Selection,
        viewport: Viewport,
    ) -> CompositorFrame {
        let layout = TimelineLayout::new(&self.geometry, document, viewport);
        let width = viewport.width.max(1.0);
        let height = layout.canvas_height().max(1.0);

        let mut quads = Vec::with_capacity(document.events.len());
        let mut vertices = Vec::with_capacity(document.events.len() * 6);

        for event in &document.events {
            let bounds = layout.clip_rect(event);
            if !layout.is_on_screen(&bounds) {
                continue;
            }
            let quad = self.clip_quad(event, bounds, selection.contains(&event.id));

            push_rect(&mut vertices, &quad.rect, quad.color, width, height);
            if let Some(handles) = &quad.handles {
                for bar in handles {
                    push_rect(&mut vertices, bar, HANDLE_COLOR, width, height);
                }
            }
            quads.push(quad);
        }

        tracing::trace!(quads = quads.len(), "Composed timeline frame");
        CompositorFrame {
            width,
            height,
            quads,
            vertices,
        }
    }

    /// Compose and hand the result to `renderer`.
    pub fn render(
        &self,
        renderer: &mut dyn QuadRenderer,
        document: &Document,
        selection: &Selection,
        viewport: Viewport,
    ) -> ReelkitResult<CompositorFrame> {
        let frame = self.compose(document, selection, viewport);
        renderer.resize(frame.width, frame.height);
        renderer.draw(&frame)?;
        Ok(frame)
    }

    fn clip_quad(&self, event: &Event, bounds: Rect, selected: bool) -> ClipQuad {
        // Align to the half pixel of the grid lines and leave a 1 px gap
        // between adjacent clips.
        let rect = Rect::new(bounds.x + 0.5, bounds.y, (bounds.w - 1.0).max(0.0), bounds.h);
        let base = kind_color(&event.kind);
        let handles = selected.then(|| {
            let bar = HANDLE_BAR_PX.min(rect.w);
            [
                Rect::new(rect.x, rect.y, bar, rect.h),
                Rect::new(rect.right() - bar, rect.y, bar, rect.h),
            ]
        });
        ClipQuad {
            id: event.id.clone(),
            rect,
            color: if selected { brighten(base) } else { base },
            selected,
            label: event.label(),
            handles,
        }
    }

    /// Update preview handles for `frame` (fractional) on a canvas of the
    /// document's size. Called on every playback tick.
    pub fn sync_transforms(&mut self, document: &Document, frame: f64) {
        let fps = document.frame_rate.max(1) as f64;
        let width = document.width as f64;
        let height = document.height as f64;
        let whole = frame.max(0.0).floor() as u64;

        self.transforms
            .retain(|id| document.event(id).is_some_and(|e| has_preview_element(&e.kind)));

        for event in document.events.iter().filter(|e| has_preview_element(&e.kind)) {
            let visible = event.is_visible_at(whole);
            let handle = self.transforms.entry(&event.id);
            handle.visible = visible;
            handle.z_order = event.layer;
            handle.transform = RenderTransform {
                translate_x: event.x_pct.unwrap_or(0.0) * width,
                translate_y: event.y_pct.unwrap_or(0.0) * height,
                scale: event.scale.unwrap_or(1.0),
            };
            handle.media_time = event
                .media()
                .filter(|_| visible)
                .map(|media| (media.trim_in as f64 + frame - event.start as f64) / fps);
        }
    }
}

/// Kinds drawn as an element on the preview canvas.
fn has_preview_element(kind: &EventKind) -> bool {
    match kind {
        EventKind::Video(_) | EventKind::Image(_) | EventKind::Caption(_) => true,
        EventKind::Audio(_) | EventKind::Transition(_) => false,
    }
}

/// Append two triangles covering `rect`, converted from pixels to clip space.
fn push_rect(out: &mut Vec<ColorVertex>, rect: &Rect, color: [f32; 3], width: f64, height: f64) {
    let x1 = (rect.x / width * 2.0 - 1.0) as f32;
    let x2 = (rect.right() / width * 2.0 - 1.0) as f32;
    let y1 = (1.0 - rect.y / height * 2.0) as f32;
    let y2 = (1.0 - rect.bottom() / height * 2.0) as f32;

    for position in [[x1, y1], [x1, y2], [x2, y2], [x1, y1], [x2, y2], [x2, y1]] {
        out.push(ColorVertex { position, color });
    }
}
