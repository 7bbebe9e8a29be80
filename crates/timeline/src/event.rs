//! Timeline event types.
//!
//! An event is a clip placed on the timeline: a `[start, end)` frame range on
//! a layer plus a kind-specific payload. The JSON shape matches the document
//! format consumed by the external renderer (`type` tag, camelCase media
//! fields).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer frame position at the document frame rate.
pub type Frame = u64;

/// Layer every event lands on when none is given.
pub const DEFAULT_LAYER: u32 = 1;

fn default_layer() -> u32 {
    DEFAULT_LAYER
}

/// Stable unique event identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Generate a fresh random (UUID v4) identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A clip on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier, immutable after creation.
    pub id: EventId,

    /// First frame covered by the clip (inclusive).
    pub start: Frame,

    /// Frame after the last covered frame (exclusive).
    pub end: Frame,

    /// Track index, 1-based. Higher layers render on top.
    #[serde(default = "default_layer")]
    pub layer: u32,

    /// Uniform scale (1.0 = 100%).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,

    /// Horizontal offset as a fraction of canvas width, `(0, 0)` is the centre.
    #[serde(rename = "xPct", default, skip_serializing_if = "Option::is_none")]
    pub x_pct: Option<f64>,

    /// Vertical offset as a fraction of canvas height.
    #[serde(rename = "yPct", default, skip_serializing_if = "Option::is_none")]
    pub y_pct: Option<f64>,

    /// The kind-specific payload.
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Discriminated union of event payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Video(MediaClip),
    Audio(MediaClip),
    Image(ImageClip),
    Caption(CaptionClip),
    Transition(TransitionClip),
}

/// Source-backed media payload shared by video and audio clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaClip {
    /// Public URL or storage path of the source.
    pub src: String,

    /// Frames trimmed from the start of the source.
    #[serde(rename = "trimIn", default)]
    pub trim_in: Frame,

    /// Frames trimmed from the end of the source.
    #[serde(rename = "trimOut", default)]
    pub trim_out: Frame,

    /// Source length in frames, when known. Upper bound for trimming.
    #[serde(
        rename = "maxDuration",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_duration: Option<Frame>,

    /// Volume multiplier in `[0.0, 1.0]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageClip {
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionClip {
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<CaptionStyle>,
}

/// Caption styling. Keys the editor does not interpret are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptionStyle {
    #[serde(rename = "fontSize", default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(rename = "textAlign", default, skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionClip {
    pub style: TransitionStyle,

    /// Transition length in frames.
    pub duration: Frame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionStyle {
    Crossfade,
    Slide,
    Wipe,
}

impl fmt::Display for TransitionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransitionStyle::Crossfade => "crossfade",
            TransitionStyle::Slide => "slide",
            TransitionStyle::Wipe => "wipe",
        };
        f.write_str(name)
    }
}

impl MediaClip {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            trim_in: 0,
            trim_out: 0,
            max_duration: None,
            volume: None,
        }
    }
}

impl EventKind {
    /// Wire name of the kind (`"video"`, `"caption"`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Video(_) => "video",
            EventKind::Audio(_) => "audio",
            EventKind::Image(_) => "image",
            EventKind::Caption(_) => "caption",
            EventKind::Transition(_) => "transition",
        }
    }

    /// Source URI for kinds backed by an asset.
    pub fn src(&self) -> Option<&str> {
        match self {
            EventKind::Video(media) | EventKind::Audio(media) => Some(&media.src),
            EventKind::Image(image) => Some(&image.src),
            EventKind::Caption(_) | EventKind::Transition(_) => None,
        }
    }
}

impl Event {
    /// Number of frames covered.
    pub fn duration(&self) -> Frame {
        self.end.saturating_sub(self.start)
    }

    /// Whether `[start, end)` intersects this event's range.
    pub fn overlaps(&self, start: Frame, end: Frame) -> bool {
        self.start < end && start < self.end
    }

    /// Whether the event covers `frame`.
    pub fn is_visible_at(&self, frame: Frame) -> bool {
        self.start <= frame && frame < self.end
    }

    pub fn media(&self) -> Option<&MediaClip> {
        match &self.kind {
            EventKind::Video(media) | EventKind::Audio(media) => Some(media),
            _ => None,
        }
    }

    pub fn media_mut(&mut self) -> Option<&mut MediaClip> {
        match &mut self.kind {
            EventKind::Video(media) | EventKind::Audio(media) => Some(media),
            _ => None,
        }
    }

    /// Total source length in frames for media clips.
    ///
    /// Falls back to `trim_in + trim_out + duration` when the source length
    /// was never resolved, so a clip can always be extended back to what it
    /// originally showed.
    pub fn source_duration(&self) -> Option<Frame> {
        self.media().map(|media| {
            media
                .max_duration
                .unwrap_or(media.trim_in + media.trim_out + self.duration())
        })
    }

    /// Short human-readable label for timeline display.
    pub fn label(&self) -> String {
        match &self.kind {
            EventKind::Video(_) | EventKind::Audio(_) | EventKind::Image(_) => self
                .kind
                .src()
                .and_then(file_stem)
                .unwrap_or_else(|| "Asset".to_string()),
            EventKind::Caption(caption) if !caption.text.is_empty() => caption.text.clone(),
            EventKind::Caption(_) => "Caption".to_string(),
            EventKind::Transition(transition) => transition.style.to_string(),
        }
    }
}

/// Last path segment of a URI without its extension.
fn file_stem(src: &str) -> Option<String> {
    let name = src.split('?').next()?.rsplit('/').next()?;
    let stem = name.split('.').next()?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

/// An event payload before the store assigns it an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub start: Frame,
    pub end: Frame,
    /// Requested layer; `None` means [`DEFAULT_LAYER`].
    pub layer: Option<u32>,
    pub scale: Option<f64>,
    pub x_pct: Option<f64>,
    pub y_pct: Option<f64>,
    pub kind: EventKind,
}

impl NewEvent {
    pub fn new(kind: EventKind, start: Frame, end: Frame) -> Self {
        Self {
            start,
            end,
            layer: None,
            scale: None,
            x_pct: None,
            y_pct: None,
            kind,
        }
    }

    pub fn video(src: impl Into<String>, start: Frame, end: Frame) -> Self {
        Self::new(EventKind::Video(MediaClip::new(src)), start, end)
    }

    pub fn audio(src: impl Into<String>, start: Frame, end: Frame) -> Self {
        Self::new(EventKind::Audio(MediaClip::new(src)), start, end)
    }

    pub fn image(src: impl Into<String>, start: Frame, end: Frame) -> Self {
        Self::new(EventKind::Image(ImageClip { src: src.into() }), start, end)
    }

    pub fn caption(text: impl Into<String>, start: Frame, end: Frame) -> Self {
        Self::new(
            EventKind::Caption(CaptionClip {
                text: text.into(),
                style: None,
            }),
            start,
            end,
        )
    }

    pub fn transition(style: TransitionStyle, start: Frame, end: Frame) -> Self {
        Self::new(
            EventKind::Transition(TransitionClip {
                style,
                duration: end.saturating_sub(start),
            }),
            start,
            end,
        )
    }

    pub fn on_layer(mut self, layer: u32) -> Self {
        self.layer = Some(layer);
        self
    }

    /// Set the known source length for media payloads. No effect on other kinds.
    pub fn with_max_duration(mut self, frames: Frame) -> Self {
        if let EventKind::Video(media) | EventKind::Audio(media) = &mut self.kind {
            media.max_duration = Some(frames);
        }
        self
    }

    /// Attach an id, producing a timeline event.
    pub fn into_event(self, id: EventId) -> Event {
        Event {
            id,
            start: self.start,
            end: self.end,
            layer: self.layer.unwrap_or(DEFAULT_LAYER),
            scale: self.scale,
            x_pct: self.x_pct,
            y_pct: self.y_pct,
            kind: self.kind,
        }
    }
}

/// Partial update merged into an existing event.
///
/// Media-only fields are ignored for kinds without a source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub start: Option<Frame>,
    pub end: Option<Frame>,
    pub layer: Option<u32>,
    pub scale: Option<f64>,
    pub x_pct: Option<f64>,
    pub y_pct: Option<f64>,
    pub trim_in: Option<Frame>,
    pub trim_out: Option<Frame>,
    pub max_duration: Option<Frame>,
    pub volume: Option<f64>,
    pub text: Option<String>,
}

impl EventPatch {
    /// Patch that sets both ends of the frame range.
    pub fn range(start: Frame, end: Frame) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn layer(layer: u32) -> Self {
        Self {
            layer: Some(layer),
            ..Self::default()
        }
    }

    pub fn with_trim_in(mut self, frames: Frame) -> Self {
        self.trim_in = Some(frames);
        self
    }

    pub fn with_trim_out(mut self, frames: Frame) -> Self {
        self.trim_out = Some(frames);
        self
    }

    /// Merge into `event`.
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(start) = self.start {
            event.start = start;
        }
        if let Some(end) = self.end {
            event.end = end;
        }
        if let Some(layer) = self.layer {
            event.layer = layer;
        }
        if self.scale.is_some() {
            event.scale = self.scale;
        }
        if self.x_pct.is_some() {
            event.x_pct = self.x_pct;
        }
        if self.y_pct.is_some() {
            event.y_pct = self.y_pct;
        }
        if let Some(media) = event.media_mut() {
            if let Some(trim_in) = self.trim_in {
                media.trim_in = trim_in;
            }
            if let Some(trim_out) = self.trim_out {
                media.trim_out = trim_out;
            }
            if self.max_duration.is_some() {
                media.max_duration = self.max_duration;
            }
            if let Some(volume) = self.volume {
                media.volume = Some(volume.clamp(0.0, 1.0));
            }
        }
        if let (Some(text), EventKind::Caption(caption)) = (&self.text, &mut event.kind) {
            caption.text = text.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_event_wire_format() {
        let event = NewEvent::video("https://cdn.example/clip.mp4", 0, 90)
            .with_max_duration(120)
            .into_event(EventId::from("a"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "video");
        assert_eq!(json["src"], "https://cdn.example/clip.mp4");
        assert_eq!(json["layer"], 1);
        assert_eq!(json["trimIn"], 0);
        assert_eq!(json["maxDuration"], 120);
        assert!(json.get("volume").is_none());
    }

    #[test]
    fn test_missing_layer_defaults_to_one() {
        let raw = r#"{"id":"c1","type":"caption","start":10,"end":40,"text":"hi"}"#;
        let event: Event = serde_json::from_str(raw).unwrap();
        assert_eq!(event.layer, 1);
        assert_eq!(event.label(), "hi");
    }

    #[test]
    fn test_caption_style_keeps_unknown_keys() {
        let raw = r##"{"id":"c1","type":"caption","start":0,"end":5,"text":"x",
            "style":{"fontSize":48,"color":"#fff","textAlign":"center","stroke":"2px"}}"##;
        let event: Event = serde_json::from_str(raw).unwrap();
        let EventKind::Caption(caption) = &event.kind else {
            panic!("expected caption");
        };
        let style = caption.style.as_ref().unwrap();
        assert_eq!(style.font_size, Some(48.0));
        assert_eq!(style.align, Some(TextAlign::Center));
        assert_eq!(style.extra["stroke"], "2px");

        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back["style"]["stroke"], "2px");
    }

    #[test]
    fn test_transition_parses_style_and_duration() {
        let raw = r#"{"id":"t","type":"transition","start":0,"end":15,"style":"wipe","duration":15}"#;
        let event: Event = serde_json::from_str(raw).unwrap();
        assert_eq!(event.label(), "wipe");
        assert_eq!(event.kind.name(), "transition");
    }

    #[test]
    fn test_source_duration_falls_back_to_trims() {
        let mut event = NewEvent::video("a.mp4", 10, 40).into_event(EventId::from("v"));
        if let Some(media) = event.media_mut() {
            media.trim_in = 5;
            media.trim_out = 7;
        }
        assert_eq!(event.source_duration(), Some(42));

        let image = NewEvent::image("a.png", 0, 10).into_event(EventId::from("i"));
        assert_eq!(image.source_duration(), None);
    }

    #[test]
    fn test_label_uses_file_stem() {
        let event = NewEvent::audio("https://x/y/voice.take2.mp3?sig=1", 0, 1)
            .into_event(EventId::from("a"));
        assert_eq!(event.label(), "voice");
    }

    #[test]
    fn test_patch_ignores_media_fields_on_captions() {
        let mut event = NewEvent::caption("hello", 0, 10).into_event(EventId::from("c"));
        EventPatch::range(5, 20).with_trim_in(3).apply_to(&mut event);
        assert_eq!((event.start, event.end), (5, 20));
        assert!(event.media().is_none());
    }

    #[test]
    fn test_overlap_is_half_open() {
        let event = NewEvent::image("a.png", 100, 200).into_event(EventId::from("i"));
        assert!(event.overlaps(150, 250));
        assert!(!event.overlaps(200, 250));
        assert!(!event.overlaps(0, 100));
        assert!(event.is_visible_at(100));
        assert!(!event.is_visible_at(200));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(EventId::generate(), EventId::generate());
    }
}
