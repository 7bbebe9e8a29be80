//! Timeline error types.

use std::path::PathBuf;

/// Errors that can occur when loading, saving, or validating a timeline.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("Timeline must have {} properties", .fields.join(", "))]
    MissingFields { fields: Vec<String> },

    #[error("Invalid event at index {index}: {message}")]
    InvalidEvent { index: usize, message: String },

    #[error("Malformed timeline JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type alias using TimelineError.
pub type TimelineResult<T> = Result<T, TimelineError>;

impl TimelineError {
    pub fn invalid_event(index: usize, msg: impl Into<String>) -> Self {
        Self::InvalidEvent {
            index,
            message: msg.into(),
        }
    }
}

impl From<TimelineError> for reelkit_common::ReelkitError {
    fn from(err: TimelineError) -> Self {
        match err {
            TimelineError::Io { path, source } if source.kind() == std::io::ErrorKind::NotFound => {
                reelkit_common::ReelkitError::FileNotFound { path }
            }
            TimelineError::Io { source, .. } => reelkit_common::ReelkitError::Io(source),
            TimelineError::Json(source) => reelkit_common::ReelkitError::Json(source),
            other => reelkit_common::ReelkitError::timeline(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelkit_common::ReelkitError;

    #[test]
    fn test_missing_fields_message_names_every_field() {
        let err = TimelineError::MissingFields {
            fields: vec!["fps".into(), "width".into()],
        };
        assert_eq!(err.to_string(), "Timeline must have fps, width properties");
    }

    #[test]
    fn test_not_found_maps_to_file_not_found() {
        let err = TimelineError::Io {
            path: PathBuf::from("/nope.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let umbrella: ReelkitError = err.into();
        assert!(matches!(umbrella, ReelkitError::FileNotFound { .. }));
    }

    #[test]
    fn test_validation_maps_to_timeline_error() {
        let umbrella: ReelkitError = TimelineError::invalid_event(2, "start must be before end").into();
        assert_eq!(
            umbrella.to_string(),
            "Timeline error: Invalid event at index 2: start must be before end"
        );
    }
}
