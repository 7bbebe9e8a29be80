//! External assets and their conversion into timeline events.
//!
//! Assets come from the upload/storage collaborator as a name, a public URL,
//! an optional kind, and a duration that may still be unresolved. Unresolved
//! durations get a placeholder length; the real one is applied later through
//! [`TimelineStore::apply_resolved_duration`](crate::store::TimelineStore::apply_resolved_duration).

use std::path::Path;

use reelkit_common::clock::secs_to_frames;
use serde::{Deserialize, Serialize};

use crate::error::TimelineResult;
use crate::event::{EventKind, Frame, ImageClip, MediaClip, NewEvent};

/// Placeholder length for video and audio whose duration is unknown.
pub const FALLBACK_MEDIA_FRAMES: Frame = 900;

/// Length given to stills and unrecognized files.
pub const FALLBACK_STILL_FRAMES: Frame = 300;

/// Initial volume of audio clips created from assets.
pub const DEFAULT_AUDIO_VOLUME: f64 = 0.8;

const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "mov", "avi", "webm", "mkv"];
const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];
const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "wav", "ogg", "aac", "m4a"];

/// Broad media category of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Video,
    #[serde(alias = "photo")]
    Image,
    Audio,
}

impl AssetKind {
    /// Classify a file name or URL by extension.
    pub fn from_extension(name: &str) -> Option<Self> {
        let path = name.split('?').next().unwrap_or(name);
        let ext = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Video)
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Image)
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Audio)
        } else {
            None
        }
    }
}

/// A reference to an uploaded asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Display name, usually the original file name.
    pub name: String,

    /// Public URL used as the event source.
    pub url: String,

    /// Kind reported by the storage collaborator, if any.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<AssetKind>,

    /// Source length in seconds, once metadata has loaded.
    #[serde(rename = "durationSec", default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

impl AssetRef {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            kind: None,
            duration_secs: None,
        }
    }

    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_secs = Some(secs);
        self
    }

    /// Kind from the file extension, then the reported kind.
    pub fn detected_kind(&self) -> Option<AssetKind> {
        AssetKind::from_extension(&self.name).or(self.kind)
    }

    /// Source length in frames, if resolved.
    pub fn duration_frames(&self, fps: u32) -> Option<Frame> {
        self.duration_secs
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(|secs| secs_to_frames(secs, fps).max(1))
    }

    /// Build an event starting at `start`.
    ///
    /// Unrecognized files are treated as video. Media events carry the
    /// resolved source length as their trim bound when it is known.
    pub fn to_new_event(&self, start: Frame, fps: u32) -> NewEvent {
        let known = self.duration_frames(fps);
        let (kind, len) = match self.detected_kind() {
            Some(AssetKind::Video) => (
                EventKind::Video(self.media_clip(known, None)),
                known.unwrap_or(FALLBACK_MEDIA_FRAMES),
            ),
            Some(AssetKind::Audio) => (
                EventKind::Audio(self.media_clip(known, Some(DEFAULT_AUDIO_VOLUME))),
                known.unwrap_or(FALLBACK_MEDIA_FRAMES),
            ),
            Some(AssetKind::Image) => (
                EventKind::Image(ImageClip {
                    src: self.url.clone(),
                }),
                FALLBACK_STILL_FRAMES,
            ),
            None => (
                EventKind::Video(self.media_clip(known, None)),
                known.unwrap_or(FALLBACK_STILL_FRAMES),
            ),
        };

        let mut event = NewEvent::new(kind, start, start + len);
        event.scale = Some(1.0);
        event.x_pct = Some(0.0);
        event.y_pct = Some(0.0);
        event
    }

    fn media_clip(&self, known: Option<Frame>, volume: Option<f64>) -> MediaClip {
        MediaClip {
            max_duration: known,
            volume,
            ..MediaClip::new(self.url.clone())
        }
    }
}

/// Lookup of uploaded assets by kind and search text.
pub trait AssetCatalog {
    /// First asset of `kind` whose name contains `query` (case-insensitive).
    fn find(&self, kind: AssetKind, query: &str) -> Option<AssetRef>;
}

/// An in-memory asset list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetList {
    pub assets: Vec<AssetRef>,
}

impl AssetList {
    pub fn new(assets: Vec<AssetRef>) -> Self {
        Self { assets }
    }

    pub fn from_json(json: &str) -> TimelineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl AssetCatalog for AssetList {
    fn find(&self, kind: AssetKind, query: &str) -> Option<AssetRef> {
        let query = query.to_lowercase();
        self.assets
            .iter()
            .find(|asset| {
                asset.detected_kind() == Some(kind) && asset.name.to_lowercase().contains(&query)
            })
            .cloned()
    }
}
