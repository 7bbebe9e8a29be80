//! List the events visible at a frame.

use std::path::PathBuf;

use reelkit_engine::VisibilityWorker;

pub async fn run(file: PathBuf, frame: u64) -> anyhow::Result<()> {
    let document =
        super::load_document(&file).map_err(|e| anyhow::anyhow!("Failed to load timeline: {e}"))?;

    let mut worker = VisibilityWorker::new(document.clone());
    worker.request(frame)?;
    let response = worker.next_result().await?;

    println!("Visible at frame {}:", response.frame);
    if response.ids.is_empty() {
        println!("  (nothing)");
    }
    for id in &response.ids {
        if let Some(event) = document.event(id) {
            println!(
                "  L{} {:<10} {} ({})",
                event.layer,
                event.kind.name(),
                event.label(),
                id
            );
        }
    }

    Ok(())
}
