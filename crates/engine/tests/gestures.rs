use proptest::prelude::*;
use reelkit_common::config::{EditorConfig, LayoutConfig};
use reelkit_engine::{Interaction, Modifiers, Viewport};
use reelkit_timeline::{EventId, NewEvent, TimelineStore};

// 60 px/s at 30 fps: 2 px per frame, clips start at x = 100 + 2 * start.
fn viewport() -> Viewport {
    Viewport {
        zoom: 1.0,
        scroll_left: 0.0,
        width: 4000.0,
        height: 200.0,
    }
}

fn frame_x(frame: u64) -> f64 {
    100.0 + 2.0 * frame as f64
}

const ROW_Y: f64 = 50.0;

fn store_with(events: Vec<NewEvent>) -> (TimelineStore, Vec<EventId>) {
    let mut store = TimelineStore::new(&EditorConfig::default());
    let ids = events
        .into_iter()
        .map(|e| store.add_event(e).expect("valid event"))
        .collect();
    (store, ids)
}

/// Drag the right edge of a clip ending at `end` by `frames`.
fn drag_right_edge(store: &mut TimelineStore, end: u64, frames: i64) {
    let mut interaction = Interaction::new(&LayoutConfig::default());
    let grab = frame_x(end) - 1.0;
    interaction.pointer_down(store, viewport(), grab, ROW_Y, Modifiers::default());
    let release = grab + 2.0 * frames as f64;
    interaction.pointer_move(store, viewport(), release, ROW_Y);
    interaction.pointer_up(store, viewport(), release, ROW_Y);
}

// A 300-frame clip grows to 360 only if the source holds at least 360
// frames, so the extension case uses a 600-frame source and the clamp case
// below uses a source exactly as long as the clip.
#[test]
fn right_resize_extends_within_source() {
    let (mut store, ids) = store_with(vec![
        NewEvent::video("clip.mp4", 0, 300).with_max_duration(600),
    ]);
    drag_right_edge(&mut store, 300, 60);

    let clip = store.event_by_id(&ids[0]).unwrap();
    assert_eq!((clip.start, clip.end), (0, 360));
}

#[test]
fn right_resize_stops_at_source_length() {
    let (mut store, ids) = store_with(vec![
        NewEvent::video("clip.mp4", 0, 300).with_max_duration(300),
    ]);
    drag_right_edge(&mut store, 300, 60);

    let clip = store.event_by_id(&ids[0]).unwrap();
    assert_eq!(clip.end, 300);
}

#[test]
fn right_resize_stops_at_next_clip() {
    let (mut store, ids) = store_with(vec![
        NewEvent::image("a.png", 0, 100),
        NewEvent::image("b.png", 150, 250),
    ]);
    drag_right_edge(&mut store, 100, 200);

    let a = store.event_by_id(&ids[0]).unwrap();
    assert_eq!((a.start, a.end), (0, 150));
}

#[test]
fn shrinking_media_records_trim_out() {
    let (mut store, ids) = store_with(vec![
        NewEvent::video("clip.mp4", 0, 300).with_max_duration(600),
    ]);
    drag_right_edge(&mut store, 300, -45);

    let clip = store.event_by_id(&ids[0]).unwrap();
    assert_eq!(clip.end, 255);
    assert_eq!(clip.media().unwrap().trim_out, 45);
}

#[test]
fn move_drag_is_one_undo_step() {
    let (mut store, ids) = store_with(vec![NewEvent::video("clip.mp4", 30, 90)]);
    let entries = store.history().len();
    let mut interaction = Interaction::new(&LayoutConfig::default());

    interaction.pointer_down(&mut store, viewport(), frame_x(60), ROW_Y, Modifiers::default());
    for step in 1..=20 {
        let x = frame_x(60) + step as f64 * 3.0;
        interaction.pointer_move(&mut store, viewport(), x, ROW_Y);
    }
    let committed = interaction.pointer_up(&mut store, viewport(), frame_x(90), ROW_Y);

    assert!(committed);
    assert_eq!(store.history().len(), entries + 1);
    let clip = store.event_by_id(&ids[0]).unwrap();
    assert_eq!((clip.start, clip.end), (60, 120));

    assert!(store.undo());
    let clip = store.event_by_id(&ids[0]).unwrap();
    assert_eq!((clip.start, clip.end), (30, 90));
}

proptest! {
    /// Dragging either edge of a clip between two neighbours never makes it
    /// overlap them.
    #[test]
    fn resize_never_overlaps_neighbours(
        gap_before in 0u64..60,
        len in 1u64..120,
        gap_after in 0u64..60,
        left in any::<bool>(),
        frames in -400i64..400,
    ) {
        let prev_end = 60;
        let start = prev_end + gap_before;
        let end = start + len;
        let next_start = end + gap_after;
        let (mut store, ids) = store_with(vec![
            NewEvent::caption("prev", 0, prev_end),
            NewEvent::caption("clip", start, end),
            NewEvent::caption("next", next_start, next_start + 60),
        ]);
        prop_assert_eq!(store.document().events[1].id.clone(), ids[1].clone());

        let mut interaction = Interaction::new(&LayoutConfig::default());
        let grab = if left { frame_x(start) + 1.0 } else { frame_x(end) - 1.0 };
        interaction.pointer_down(&mut store, viewport(), grab, ROW_Y, Modifiers::default());
        let release = grab + 2.0 * frames as f64;
        interaction.pointer_move(&mut store, viewport(), release, ROW_Y);
        interaction.pointer_up(&mut store, viewport(), release, ROW_Y);

        let events = &store.document().events;
        for (i, a) in events.iter().enumerate() {
            prop_assert!(a.start < a.end);
            for b in &events[i + 1..] {
                prop_assert!(
                    !(a.start < b.end && b.start < a.end),
                    "{:?} overlaps {:?}", (a.start, a.end), (b.start, b.end)
                );
            }
        }
    }
}
