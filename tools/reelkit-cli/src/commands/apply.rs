//! Apply automated edit actions to a timeline.

use std::path::PathBuf;

use anyhow::Context;
use reelkit_common::config::EditorConfig;
use reelkit_timeline::action::{apply_actions, parse_actions, ActionOutcome};
use reelkit_timeline::asset::AssetList;
use reelkit_timeline::TimelineStore;

pub fn run(
    file: PathBuf,
    actions: PathBuf,
    assets: Option<PathBuf>,
    output: Option<PathBuf>,
    config: &EditorConfig,
) -> anyhow::Result<()> {
    let document =
        super::load_document(&file).map_err(|e| anyhow::anyhow!("Failed to load timeline: {e}"))?;

    let actions_json = std::fs::read_to_string(&actions)
        .with_context(|| format!("Failed to read actions from {}", actions.display()))?;
    let actions = parse_actions(&actions_json)?;

    let catalog = match assets {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read assets from {}", path.display()))?;
            AssetList::from_json(&json)?
        }
        None => AssetList::default(),
    };

    let mut store = TimelineStore::with_document(document, config);
    let outcomes = apply_actions(&mut store, &actions, &catalog);

    let mut applied = 0;
    for (action, outcome) in actions.iter().zip(&outcomes) {
        match outcome {
            ActionOutcome::Added(id) => {
                applied += 1;
                eprintln!("  + {} added {id}", action.name());
            }
            ActionOutcome::Updated(id) => {
                applied += 1;
                eprintln!("  ~ {} updated {id}", action.name());
            }
            ActionOutcome::Skipped { reason } => {
                eprintln!("  - {} skipped: {reason}", action.name());
            }
        }
    }
    eprintln!("{applied}/{} action(s) applied.", outcomes.len());

    match output {
        Some(path) => {
            store.document().save(&path)?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{}", store.document().to_json_pretty()?),
    }

    Ok(())
}
