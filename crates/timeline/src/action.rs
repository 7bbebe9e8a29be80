//! Automated timeline edits.
//!
//! Actions are small JSON commands produced by an assistant (`trim`,
//! `addAsset`, `move`, `layer`, `transform`, `addCaption`). Times are given
//! in seconds and converted at the document frame rate. Inserts go through
//! the placement resolver so they never cover an existing clip. Each applied
//! action is one undo step.

use reelkit_common::clock::secs_to_frames;
use serde::{Deserialize, Serialize};

use crate::asset::{AssetCatalog, AssetKind};
use crate::error::TimelineResult;
use crate::event::{EventId, EventKind, EventPatch, ImageClip, MediaClip, NewEvent};
use crate::store::TimelineStore;

/// Length used for inserted assets whose duration is unknown.
pub const DEFAULT_ASSET_SECS: f64 = 3.0;

/// A single automated edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimelineAction {
    /// Set the range of the first clip on `layer`.
    #[serde(rename_all = "camelCase")]
    Trim { layer: u32, from_sec: f64, to_sec: f64 },

    /// Insert a catalog asset matching `query`.
    #[serde(rename_all = "camelCase")]
    AddAsset {
        asset_kind: AssetKind,
        query: String,
        layer: u32,
        at_sec: f64,
    },

    /// Move a clip keeping its length.
    #[serde(rename_all = "camelCase")]
    Move { id: EventId, to_sec: f64 },

    /// Reassign a clip's layer.
    Layer { id: EventId, layer: u32 },

    /// Update position and scale.
    Transform {
        id: EventId,
        #[serde(rename = "xPct", default)]
        x_pct: Option<f64>,
        #[serde(rename = "yPct", default)]
        y_pct: Option<f64>,
        #[serde(default)]
        scale: Option<f64>,
    },

    /// Insert a caption of `duration` seconds.
    #[serde(rename_all = "camelCase")]
    AddCaption {
        text: String,
        at_sec: f64,
        duration: f64,
        layer: u32,
    },
}

impl TimelineAction {
    pub fn name(&self) -> &'static str {
        match self {
            TimelineAction::Trim { .. } => "trim",
            TimelineAction::AddAsset { .. } => "addAsset",
            TimelineAction::Move { .. } => "move",
            TimelineAction::Layer { .. } => "layer",
            TimelineAction::Transform { .. } => "transform",
            TimelineAction::AddCaption { .. } => "addCaption",
        }
    }
}

/// What applying an action did.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// A new event was inserted.
    Added(EventId),
    /// An existing event was changed.
    Updated(EventId),
    /// Nothing changed.
    Skipped { reason: String },
}

impl ActionOutcome {
    fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub fn is_applied(&self) -> bool {
        !matches!(self, ActionOutcome::Skipped { .. })
    }
}

/// Parse one action or an array of actions.
pub fn parse_actions(json: &str) -> TimelineResult<Vec<TimelineAction>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<TimelineAction>),
        One(TimelineAction),
    }

    let parsed: OneOrMany = serde_json::from_str(json)?;
    Ok(match parsed {
        OneOrMany::Many(actions) => actions,
        OneOrMany::One(action) => vec![action],
    })
}

/// Apply one action to the store.
pub fn apply_action(
    store: &mut TimelineStore,
    action: &TimelineAction,
    catalog: &dyn AssetCatalog,
) -> ActionOutcome {
    let fps = store.document().frame_rate;
    let to_frames = |secs: f64| secs_to_frames(secs, fps);

    let outcome = match action {
        TimelineAction::Trim {
            layer,
            from_sec,
            to_sec,
        } => {
            let target = store
                .document()
                .events
                .iter()
                .find(|e| e.layer == *layer)
                .map(|e| e.id.clone());
            match target {
                Some(id) => {
                    if store.resize_event(&id, to_frames(*from_sec), to_frames(*to_sec), true) {
                        ActionOutcome::Updated(id)
                    } else {
                        ActionOutcome::skipped("trim range is empty")
                    }
                }
                None => ActionOutcome::skipped(format!("no clip on layer {layer}")),
            }
        }

        TimelineAction::AddAsset {
            asset_kind,
            query,
            layer,
            at_sec,
        } => match catalog.find(*asset_kind, query) {
            None => ActionOutcome::skipped(format!("no {asset_kind:?} asset matches {query:?}")),
            Some(asset) => {
                let known = asset.duration_frames(fps);
                let len = known.unwrap_or_else(|| to_frames(DEFAULT_ASSET_SECS)).max(1);
                let media = MediaClip {
                    max_duration: known,
                    ..MediaClip::new(asset.url.clone())
                };
                let kind = match asset_kind {
                    AssetKind::Audio => EventKind::Audio(media),
                    AssetKind::Video => EventKind::Video(media),
                    AssetKind::Image => EventKind::Image(ImageClip { src: asset.url }),
                };
                let start = to_frames(*at_sec);
                let new_event = NewEvent::new(kind, start, start + len).on_layer(*layer);
                match store.add_event_placed(new_event) {
                    Ok(id) => ActionOutcome::Added(id),
                    Err(e) => ActionOutcome::skipped(e.to_string()),
                }
            }
        },

        TimelineAction::Move { id, to_sec } => match store.event_by_id(id).map(|e| e.duration()) {
            Some(len) => {
                let start = to_frames(*to_sec);
                if store.move_event(id, start, start + len, true) {
                    ActionOutcome::Updated(id.clone())
                } else {
                    ActionOutcome::skipped("move rejected")
                }
            }
            None => ActionOutcome::skipped(format!("unknown event {id}")),
        },

        TimelineAction::Layer { id, layer } => {
            if store.change_event_layer(id, *layer, true) {
                ActionOutcome::Updated(id.clone())
            } else {
                ActionOutcome::skipped(format!("cannot move {id} to layer {layer}"))
            }
        }

        TimelineAction::Transform {
            id,
            x_pct,
            y_pct,
            scale,
        } => {
            let patch = EventPatch {
                x_pct: *x_pct,
                y_pct: *y_pct,
                scale: *scale,
                ..EventPatch::default()
            };
            if store.update_event(id, &patch, true) {
                ActionOutcome::Updated(id.clone())
            } else {
                ActionOutcome::skipped(format!("unknown event {id}"))
            }
        }

        TimelineAction::AddCaption {
            text,
            at_sec,
            duration,
            layer,
        } => {
            let start = to_frames(*at_sec);
            let end = to_frames(at_sec + duration);
            match store.add_event_placed(NewEvent::caption(text.clone(), start, end).on_layer(*layer)) {
                Ok(id) => ActionOutcome::Added(id),
                Err(e) => ActionOutcome::skipped(e.to_string()),
            }
        }
    };

    match &outcome {
        ActionOutcome::Skipped { reason } => {
            tracing::warn!(action = action.name(), reason = %reason, "Action skipped");
        }
        _ => tracing::debug!(action = action.name(), "Action applied"),
    }
    outcome
}

/// Apply actions in order.
pub fn apply_actions(
    store: &mut TimelineStore,
    actions: &[TimelineAction],
    catalog: &dyn AssetCatalog,
) -> Vec<ActionOutcome> {
    actions
        .iter()
        .map(|action| apply_action(store, action, catalog))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetList, AssetRef};
    use reelkit_common::config::EditorConfig;

    fn store() -> TimelineStore {
        TimelineStore::new(&EditorConfig::default())
    }

    #[test]
    fn test_parse_wire_format() {
        let actions = parse_actions(
            r#"[
                {"type":"trim","layer":1,"fromSec":0,"toSec":2.5},
                {"type":"addAsset","assetKind":"image","query":"logo","layer":2,"atSec":1},
                {"type":"transform","id":"abc","xPct":0.25},
                {"type":"addCaption","text":"Hello","atSec":0,"duration":2,"layer":3}
            ]"#,
        )
        .unwrap();
        assert_eq!(actions.len(), 4);
        assert_eq!(
            actions[0],
            TimelineAction::Trim {
                layer: 1,
                from_sec: 0.0,
                to_sec: 2.5
            }
        );
        assert!(matches!(
            &actions[2],
            TimelineAction::Transform { x_pct: Some(x), scale: None, .. } if *x == 0.25
        ));

        let single = parse_actions(r#"{"type":"layer","id":"abc","layer":4}"#).unwrap();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_unknown_action_type_is_an_error() {
        assert!(parse_actions(r#"{"type":"autoCaption","layer":1}"#).is_err());
    }

    #[test]
    fn test_trim_first_clip_on_layer() {
        let mut store = store();
        let id = store.add_event(NewEvent::video("a.mp4", 0, 300)).unwrap();
        let action = TimelineAction::Trim {
            layer: 1,
            from_sec: 1.0,
            to_sec: 4.0,
        };
        assert_eq!(
            apply_action(&mut store, &action, &AssetList::default()),
            ActionOutcome::Updated(id.clone())
        );
        let event = store.event_by_id(&id).unwrap();
        assert_eq!((event.start, event.end), (30, 120));
    }

    #[test]
    fn test_add_asset_is_placed_above_occupant() {
        let mut store = store();
        store.add_event(NewEvent::video("bg.mp4", 0, 300)).unwrap();
        let catalog = AssetList::new(vec![AssetRef::new("logo.png", "https://cdn/logo.png")]);
        let action = TimelineAction::AddAsset {
            asset_kind: AssetKind::Image,
            query: "logo".into(),
            layer: 1,
            at_sec: 1.0,
        };
        let ActionOutcome::Added(id) = apply_action(&mut store, &action, &catalog) else {
            panic!("expected insert");
        };
        let event = store.event_by_id(&id).unwrap();
        assert_eq!((event.start, event.end, event.layer), (30, 120, 2));
    }

    #[test]
    fn test_missing_asset_is_skipped() {
        let mut store = store();
        let action = TimelineAction::AddAsset {
            asset_kind: AssetKind::Video,
            query: "nothing".into(),
            layer: 1,
            at_sec: 0.0,
        };
        let outcome = apply_action(&mut store, &action, &AssetList::default());
        assert!(!outcome.is_applied());
        assert!(store.document().events.is_empty());
    }

    #[test]
    fn test_move_keeps_length() {
        let mut store = store();
        let id = store.add_event(NewEvent::caption("x", 0, 45)).unwrap();
        let action = TimelineAction::Move {
            id: id.clone(),
            to_sec: 2.0,
        };
        apply_action(&mut store, &action, &AssetList::default());
        let event = store.event_by_id(&id).unwrap();
        assert_eq!((event.start, event.end), (60, 105));
    }

    #[test]
    fn test_each_action_is_one_undo_step() {
        let mut store = store();
        let actions = vec![
            TimelineAction::AddCaption {
                text: "one".into(),
                at_sec: 0.0,
                duration: 1.0,
                layer: 1,
            },
            TimelineAction::AddCaption {
                text: "two".into(),
                at_sec: 0.5,
                duration: 1.0,
                layer: 1,
            },
        ];
        let outcomes = apply_actions(&mut store, &actions, &AssetList::default());
        assert!(outcomes.iter().all(ActionOutcome::is_applied));
        assert_eq!(store.layers(), vec![1, 2]);

        store.undo();
        assert_eq!(store.document().events.len(), 1);
    }
}
