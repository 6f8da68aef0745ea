//! Operator-facing error taxonomy shared by both tools.

use thiserror::Error;

use crate::loader::LoadError;

/// A fatal condition that ends a tool invocation.
///
/// Each variant maps to one diagnostic line on stderr and a non-zero exit.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The invocation or environment cannot be used as given.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A requested name does not exist.
    #[error("resolution error: {0}")]
    Resolution(String),
    /// A name known to exist earlier is now absent.
    #[error("stale build: {0}")]
    StaleBuild(String),
    /// A class definition exists but cannot be decoded.
    #[error("malformed class: {0}")]
    MalformedClass(String),
    /// Rendering the result failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Why an invocation produced no result.
#[derive(Debug, Error)]
pub enum RunError {
    /// Arguments did not parse, or help/version was requested.
    #[error(transparent)]
    Usage(#[from] clap::Error),
    /// The tool ran and hit a fatal condition.
    #[error(transparent)]
    Tool(#[from] ToolError),
}

impl From<LoadError> for ToolError {
    fn from(err: LoadError) -> Self {
        let message = err.to_string();
        match err {
            LoadError::InvalidLocation { .. } => ToolError::Configuration(message),
            LoadError::ClassNotFound { .. } => ToolError::Resolution(message),
            LoadError::ClassDefinitionMissing { .. } | LoadError::WrongName { .. } => {
                ToolError::StaleBuild(message)
            }
            LoadError::Malformed { .. } => ToolError::MalformedClass(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn load_errors_map_onto_taxonomy() {
        let invalid = LoadError::InvalidLocation {
            path: PathBuf::from("/x"),
            reason: "not a directory".into(),
        };
        let err: ToolError = invalid.into();
        assert!(matches!(err, ToolError::Configuration(_)));
        assert_eq!(
            err.to_string(),
            "configuration error: invalid artifact root /x: not a directory"
        );

        let err: ToolError = LoadError::ClassNotFound { name: "a.B".into() }.into();
        assert_eq!(err.to_string(), "resolution error: class not found: a.B");

        let err: ToolError =
            LoadError::ClassDefinitionMissing { name: "a.B".into(), referenced_by: None }.into();
        assert!(matches!(err, ToolError::StaleBuild(_)));
    }
}
