//! Error types for the evaluation harness
//!
//! Collaborator failures (editor, renderer) are recoverable: the runner
//! records them against the case and moves on. Everything else is a hard
//! failure of the run itself.

use scenebench_generator::DatasetError;
use std::path::PathBuf;

/// Errors raised while configuring, running or reporting an evaluation
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// IO error with the offending path
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Invalid or unsupported configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The scene editor produced no usable scene
    #[error("editor failed for {case_id}: {message}")]
    Editor { case_id: String, message: String },

    /// The renderer produced no image
    #[error("render failed: {0}")]
    Render(String),
}

impl HarnessError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn editor(case_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Editor {
            case_id: case_id.into(),
            message: message.into(),
        }
    }

    /// Failure of an external collaborator rather than of the harness
    #[must_use]
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(self, Self::Editor { .. } | Self::Render(_))
    }
}

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_the_path() {
        let err = HarnessError::io_error(
            "/tmp/missing.yaml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/missing.yaml"));
        assert!(!err.is_collaborator_failure());
    }

    #[test]
    fn editor_errors_are_collaborator_failures() {
        let err = HarnessError::editor("simple_0001", "timed out");
        assert_eq!(err.to_string(), "editor failed for simple_0001: timed out");
        assert!(err.is_collaborator_failure());
        assert!(HarnessError::Render("no gpu".into()).is_collaborator_failure());
    }
}
