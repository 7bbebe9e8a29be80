use proptest::prelude::*;

use reelkit_common::config::EditorConfig;
use reelkit_timeline::{EventId, EventPatch, NewEvent, TimelineStore};

#[derive(Debug, Clone)]
enum Op {
    Add { start: u64, len: u64, layer: u32 },
    Move { pick: usize, start: u64, commit: bool },
    Resize { pick: usize, start: u64, end: u64 },
    Layer { pick: usize, layer: u32 },
    Reorder { from: u32, to: u32 },
    Delete { pick: usize },
    Duplicate { pick: usize },
    Copy { pick: usize },
    Paste { target: u64 },
    Undo,
    Redo,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u64..600, 1u64..200, 1u32..5).prop_map(|(start, len, layer)| Op::Add { start, len, layer }),
        (any::<usize>(), 0u64..600, any::<bool>())
            .prop_map(|(pick, start, commit)| Op::Move { pick, start, commit }),
        (any::<usize>(), 0u64..600, 0u64..600).prop_map(|(pick, start, end)| Op::Resize { pick, start, end }),
        (any::<usize>(), 0u32..6).prop_map(|(pick, layer)| Op::Layer { pick, layer }),
        (1u32..6, 1u32..6).prop_map(|(from, to)| Op::Reorder { from, to }),
        any::<usize>().prop_map(|pick| Op::Delete { pick }),
        any::<usize>().prop_map(|pick| Op::Duplicate { pick }),
        any::<usize>().prop_map(|pick| Op::Copy { pick }),
        (0u64..600).prop_map(|target| Op::Paste { target }),
        Just(Op::Undo),
        Just(Op::Redo),
    ]
}

fn pick_id(store: &TimelineStore, pick: usize) -> Option<EventId> {
    let events = &store.document().events;
    if events.is_empty() {
        None
    } else {
        Some(events[pick % events.len()].id.clone())
    }
}

fn run(store: &mut TimelineStore, op: &Op) {
    match op {
        Op::Add { start, len, layer } => {
            store
                .add_event(NewEvent::caption("p", *start, start + len).on_layer(*layer))
                .unwrap();
        }
        Op::Move { pick, start, commit } => {
            if let Some(id) = pick_id(store, *pick) {
                let len = store.event_by_id(&id).unwrap().duration();
                store.move_event(&id, *start, start + len, *commit);
            }
        }
        Op::Resize { pick, start, end } => {
            if let Some(id) = pick_id(store, *pick) {
                store.resize_event(&id, *start, *end, true);
            }
        }
        Op::Layer { pick, layer } => {
            if let Some(id) = pick_id(store, *pick) {
                store.change_event_layer(&id, *layer, true);
            }
        }
        Op::Reorder { from, to } => store.reorder_layers(*from, *to),
        Op::Delete { pick } => {
            if let Some(id) = pick_id(store, *pick) {
                store.delete_event(&id);
            }
        }
        Op::Duplicate { pick } => {
            if let Some(id) = pick_id(store, *pick) {
                store.duplicate_event(&id);
            }
        }
        Op::Copy { pick } => {
            if let Some(id) = pick_id(store, *pick) {
                store.copy_events(&[id]);
            }
        }
        Op::Paste { target } => {
            store.paste_events(*target);
        }
        Op::Undo => {
            store.undo();
        }
        Op::Redo => {
            store.redo();
        }
    }
}

fn seeded_store(clips: &[(u64, u64, u32)]) -> TimelineStore {
    let mut store = TimelineStore::new(&EditorConfig::default());
    for (start, len, layer) in clips {
        store
            .add_event(NewEvent::video("clip.mp4", *start, start + len).on_layer(*layer))
            .unwrap();
    }
    store
}

fn clips() -> impl Strategy<Value = Vec<(u64, u64, u32)>> {
    prop::collection::vec((0u64..500, 1u64..120, 1u32..5), 1..8)
}

proptest! {
    #[test]
    fn every_reachable_event_is_well_formed(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut store = TimelineStore::new(&EditorConfig::default());
        for op in &ops {
            run(&mut store, op);
            for event in &store.document().events {
                prop_assert!(event.start < event.end, "{op:?} produced {event:?}");
                prop_assert!(event.layer >= 1, "{op:?} produced {event:?}");
            }
            if let Some(primary) = store.selection().primary() {
                prop_assert!(store.event_by_id(primary).is_some());
            }
        }
    }

    #[test]
    fn undo_and_redo_restore_snapshots(
        seed in clips(),
        pick in any::<usize>(),
        start in 0u64..600,
    ) {
        let mut store = seeded_store(&seed);
        let id = pick_id(&store, pick).unwrap();
        let before = store.document().clone();

        let len = store.event_by_id(&id).unwrap().duration();
        store.move_event(&id, start, start + len, true);
        let after = store.document().clone();

        prop_assert!(store.undo());
        prop_assert_eq!(store.document(), &before);
        prop_assert!(store.redo());
        prop_assert_eq!(store.document(), &after);
    }

    #[test]
    fn non_committing_gesture_adds_one_entry(
        seed in clips(),
        pick in any::<usize>(),
        steps in prop::collection::vec(0u64..400, 1..30),
    ) {
        let mut store = seeded_store(&seed);
        let id = pick_id(&store, pick).unwrap();
        let entries = store.history().len();

        let len = store.event_by_id(&id).unwrap().duration();
        for start in &steps {
            store.update_event(&id, &EventPatch::range(*start, start + len), false);
        }
        prop_assert_eq!(store.history().len(), entries);

        store.push_to_history();
        prop_assert_eq!(store.history().len(), entries + 1);
    }

    #[test]
    fn reorder_then_reverse_restores_layers(seed in clips(), a in 1u32..6, b in 1u32..6) {
        let mut store = seeded_store(&seed);
        let layers_before: Vec<u32> = store.document().events.iter().map(|e| e.layer).collect();

        store.reorder_layers(a, b);
        store.reorder_layers(b, a);

        let layers_after: Vec<u32> = store.document().events.iter().map(|e| e.layer).collect();
        prop_assert_eq!(layers_before, layers_after);
    }

    #[test]
    fn duplicate_adds_one_event_of_equal_length(seed in clips(), pick in any::<usize>()) {
        let mut store = seeded_store(&seed);
        let id = pick_id(&store, pick).unwrap();
        let count = store.document().events.len();
        let original = store.event_by_id(&id).unwrap().clone();

        let copy = store.duplicate_event(&id).unwrap();
        let copy = store.event_by_id(&copy).unwrap();

        prop_assert_eq!(store.document().events.len(), count + 1);
        prop_assert_eq!(copy.duration(), original.duration());
        prop_assert_eq!(copy.start, original.end);
        prop_assert_eq!(copy.layer, original.layer);
    }
}
