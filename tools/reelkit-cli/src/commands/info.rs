//! Show timeline information.

use std::path::PathBuf;

use reelkit_common::config::EditorConfig;
use reelkit_timeline::TimelineStore;

pub fn run(file: PathBuf, config: &EditorConfig) -> anyhow::Result<()> {
    let document =
        super::load_document(&file).map_err(|e| anyhow::anyhow!("Failed to load timeline: {e}"))?;
    let store = TimelineStore::with_document(document, config);
    let doc = store.document();

    println!("Timeline: {}", file.display());
    println!(
        "  Resolution: {}x{} @ {}fps",
        doc.width, doc.height, doc.frame_rate
    );
    println!("  Background: {}", doc.background_color);
    println!(
        "  Length: {} frames (~{}s)",
        store.max_frame(),
        store.duration_seconds()
    );
    println!();

    println!("Layers:");
    for layer in store.layers() {
        println!("  Layer {layer}:");
        let mut events: Vec<_> = doc.events.iter().filter(|e| e.layer == layer).collect();
        events.sort_by_key(|e| e.start);
        for event in events {
            println!(
                "    [{:>6} - {:>6}) {:<10} {} ({})",
                event.start,
                event.end,
                event.kind.name(),
                event.label(),
                event.id
            );
        }
    }

    Ok(())
}
