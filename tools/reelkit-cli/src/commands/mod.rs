use std::path::Path;

use reelkit_common::ReelkitResult;
use reelkit_timeline::Document;

pub mod apply;
pub mod info;
pub mod play;
pub mod validate;
pub mod visible;

/// Load the timeline a subcommand operates on.
///
/// A missing file surfaces as [`reelkit_common::ReelkitError::FileNotFound`].
pub fn load_document(file: &Path) -> ReelkitResult<Document> {
    Ok(Document::load(file)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelkit_common::ReelkitError;

    #[test]
    fn test_missing_timeline_is_file_not_found() {
        let path = std::env::temp_dir().join("reelkit_cli_missing").join("timeline.json");
        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, ReelkitError::FileNotFound { .. }));
        assert!(err.to_string().contains("timeline.json"));
    }

    #[test]
    fn test_fixture_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/sample-timeline.json");
        let document = load_document(&path).unwrap();
        assert!(!document.events.is_empty());
    }
}
