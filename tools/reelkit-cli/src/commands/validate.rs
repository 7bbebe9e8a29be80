//! Validate a timeline document.

use std::path::PathBuf;

pub fn run(file: PathBuf) -> anyhow::Result<()> {
    println!("Validating timeline at: {}", file.display());

    let document =
        super::load_document(&file).map_err(|e| anyhow::anyhow!("Failed to load timeline: {e}"))?;

    println!(
        "  Resolution: {}x{} @ {}fps",
        document.width, document.height, document.frame_rate
    );
    println!("  Events: {}", document.events.len());
    println!("  Layers: {}", document.layers().len());
    println!("\nTimeline is valid.");

    Ok(())
}
