//! Timeline document: canvas metadata plus the event list.
//!
//! The JSON form (`fps`, `width`, `height`, `background`, `events`) is the
//! exchange format with persistence and the external renderer. Loading
//! validates the whole document up front and reports every missing field
//! instead of attempting partial recovery.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};
use crate::event::{Event, EventId, Frame};

/// Fields every persisted document must carry.
const REQUIRED_FIELDS: [&str; 4] = ["fps", "width", "height", "events"];

/// Fields every persisted event must carry.
const REQUIRED_EVENT_FIELDS: [&str; 4] = ["id", "type", "start", "end"];

fn default_background() -> String {
    "#000000".to_string()
}

/// An editable timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Frames per second. All event positions are expressed at this rate.
    #[serde(rename = "fps")]
    pub frame_rate: u32,

    /// Canvas width in pixels.
    pub width: u32,

    /// Canvas height in pixels.
    pub height: u32,

    /// Canvas fill color (CSS hex).
    #[serde(rename = "background", default = "default_background")]
    pub background_color: String,

    /// Clips in insertion order. Later events draw on top within a layer.
    pub events: Vec<Event>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(1920, 1080, 30)
    }
}

impl Document {
    /// Create an empty document.
    pub fn new(width: u32, height: u32, frame_rate: u32) -> Self {
        Self {
            frame_rate,
            width,
            height,
            background_color: default_background(),
            events: Vec::new(),
        }
    }

    /// Parse and validate a document from JSON text.
    pub fn from_json(json: &str) -> TimelineResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        check_shape(&value)?;
        let document: Document = serde_json::from_value(value)?;
        document.validate()?;
        Ok(document)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> TimelineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a document file.
    pub fn load(path: impl AsRef<Path>) -> TimelineResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| TimelineError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&json)
    }

    /// Write the document as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> TimelineResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TimelineError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = self.to_json_pretty()?;
        std::fs::write(path, json).map_err(|e| TimelineError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Check the structural invariants of an already-typed document.
    pub fn validate(&self) -> TimelineResult<()> {
        let mut invalid = Vec::new();
        if self.frame_rate == 0 {
            invalid.push("fps".to_string());
        }
        if self.width == 0 {
            invalid.push("width".to_string());
        }
        if self.height == 0 {
            invalid.push("height".to_string());
        }
        if !invalid.is_empty() {
            return Err(TimelineError::MissingFields { fields: invalid });
        }

        let mut seen = HashSet::new();
        for (index, event) in self.events.iter().enumerate() {
            if event.start >= event.end {
                return Err(TimelineError::invalid_event(
                    index,
                    format!("start ({}) must be before end ({})", event.start, event.end),
                ));
            }
            if event.layer == 0 {
                return Err(TimelineError::invalid_event(index, "layer must be at least 1"));
            }
            if !seen.insert(&event.id) {
                return Err(TimelineError::invalid_event(
                    index,
                    format!("duplicate id {}", event.id),
                ));
            }
        }
        Ok(())
    }

    /// Largest `end` across all events.
    pub fn max_end(&self) -> Option<Frame> {
        self.events.iter().map(|e| e.end).max()
    }

    pub fn event(&self, id: &EventId) -> Option<&Event> {
        self.events.iter().find(|e| &e.id == id)
    }

    pub fn event_mut(&mut self, id: &EventId) -> Option<&mut Event> {
        self.events.iter_mut().find(|e| &e.id == id)
    }

    /// Distinct layers in use, ascending.
    pub fn layers(&self) -> Vec<u32> {
        self.events
            .iter()
            .map(|e| e.layer)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Events intersecting `[start, end)`, in document order.
    pub fn events_in_range(&self, start: Frame, end: Frame) -> Vec<&Event> {
        self.events.iter().filter(|e| e.overlaps(start, end)).collect()
    }

    /// Events covering `frame`, in document order.
    pub fn events_at_frame(&self, frame: Frame) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.is_visible_at(frame))
            .collect()
    }
}

/// Reject documents missing required fields before typed deserialization,
/// so the error names what is missing rather than the first serde failure.
fn check_shape(value: &serde_json::Value) -> TimelineResult<()> {
    let Some(object) = value.as_object() else {
        return Err(TimelineError::MissingFields {
            fields: REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect(),
        });
    };

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| match object.get(**field) {
            None | Some(serde_json::Value::Null) => true,
            Some(v) if **field == "events" => !v.is_array(),
            Some(v) => !v.as_u64().is_some_and(|n| n > 0),
        })
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(TimelineError::MissingFields { fields: missing });
    }

    if let Some(events) = object.get("events").and_then(|v| v.as_array()) {
        for (index, event) in events.iter().enumerate() {
            let absent: Vec<&str> = REQUIRED_EVENT_FIELDS
                .iter()
                .copied()
                .filter(|field| event.get(*field).map_or(true, |v| v.is_null()))
                .collect();
            if !absent.is_empty() {
                return Err(TimelineError::invalid_event(
                    index,
                    format!("missing {}", absent.join(", ")),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NewEvent;

    fn sample() -> Document {
        let mut doc = Document::default();
        doc.events.push(NewEvent::video("a.mp4", 0, 100).into_event("a".into()));
        doc.events
            .push(NewEvent::caption("hi", 50, 150).on_layer(3).into_event("c".into()));
        doc
    }

    #[test]
    fn test_default_document() {
        let doc = Document::default();
        assert_eq!((doc.width, doc.height, doc.frame_rate), (1920, 1080, 30));
        assert_eq!(doc.background_color, "#000000");
        assert!(doc.events.is_empty());
        assert_eq!(doc.max_end(), None);
    }

    #[test]
    fn test_missing_fields_are_all_named() {
        let err = Document::from_json(r#"{ "fps": 30 }"#).unwrap_err();
        match err {
            TimelineError::MissingFields { fields } => {
                assert_eq!(fields, vec!["width", "height", "events"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_fps_is_rejected() {
        let err =
            Document::from_json(r#"{ "fps": 0, "width": 10, "height": 10, "events": [] }"#)
                .unwrap_err();
        assert!(matches!(err, TimelineError::MissingFields { fields } if fields == ["fps"]));
    }

    #[test]
    fn test_event_missing_fields() {
        let json = r#"{ "fps": 30, "width": 10, "height": 10,
            "events": [ { "id": "a", "type": "image", "src": "x.png", "start": 0 } ] }"#;
        let err = Document::from_json(json).unwrap_err();
        assert_eq!(err.to_string(), "Invalid event at index 0: missing end");
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let json = r#"{ "fps": 30, "width": 10, "height": 10,
            "events": [ { "id": "a", "type": "image", "src": "x.png", "start": 20, "end": 10 } ] }"#;
        assert!(matches!(
            Document::from_json(json),
            Err(TimelineError::InvalidEvent { index: 0, .. })
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let doc = sample();
        let json = doc.to_json_pretty().unwrap();
        assert!(json.contains("\"fps\": 30"));
        assert!(json.contains("\"background\": \"#000000\""));
        assert_eq!(Document::from_json(&json).unwrap(), doc);
    }

    #[test]
    fn test_queries() {
        let doc = sample();
        assert_eq!(doc.max_end(), Some(150));
        assert_eq!(doc.layers(), vec![1, 3]);
        assert_eq!(doc.events_at_frame(100).len(), 1);
        assert_eq!(doc.events_at_frame(60).len(), 2);
        assert_eq!(doc.events_in_range(100, 101)[0].id.as_str(), "c");
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir()
            .join("reelkit_test_document")
            .join("timeline.json");
        let doc = sample();
        doc.save(&path).unwrap();
        assert_eq!(Document::load(&path).unwrap(), doc);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let err = Document::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, TimelineError::Io { .. }));
    }
}
