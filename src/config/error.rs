//! Error types for configuration loading.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a configuration load.
///
/// Every variant is cheap to clone so that a single failed load can be handed
/// to every caller that waited on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// A source could not be parsed into structured key/value data.
    #[error("{}", malformed_message(.path, .reason))]
    MalformedSource { path: Option<PathBuf>, reason: String },

    /// A referenced file or directory does not exist or cannot be read.
    #[error("Failed reading config source {}: {reason}", .path.display())]
    UnreadableSource { path: PathBuf, reason: String },

    #[error("Sources cannot be registered once loading has started")]
    SourcesSealed,

    /// The load pipeline panicked before producing an outcome.
    #[error("Configuration load was interrupted")]
    Interrupted,
}

/// Discriminant of [`LoadError`], for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    MalformedSource,
    UnreadableSource,
    SourcesSealed,
    Interrupted,
}

impl LoadError {
    pub fn kind(&self) -> LoadErrorKind {
        match self {
            LoadError::MalformedSource { .. } => LoadErrorKind::MalformedSource,
            LoadError::UnreadableSource { .. } => LoadErrorKind::UnreadableSource,
            LoadError::SourcesSealed => LoadErrorKind::SourcesSealed,
            LoadError::Interrupted => LoadErrorKind::Interrupted,
        }
    }

    /// Path of the offending file, when the error is tied to one.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            LoadError::MalformedSource { path, .. } => path.as_ref(),
            LoadError::UnreadableSource { path, .. } => Some(path),
            LoadError::SourcesSealed | LoadError::Interrupted => None,
        }
    }

    pub(crate) fn malformed(path: Option<PathBuf>, reason: impl fmt::Display) -> Self {
        LoadError::MalformedSource { path, reason: reason.to_string() }
    }

    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        LoadError::UnreadableSource { path: path.into(), reason: reason.to_string() }
    }
}

fn malformed_message(path: &Option<PathBuf>, reason: &str) -> String {
    match path {
        Some(path) => format!("Error parsing YAML file `{}`: {}", path.display(), reason),
        None => format!("Malformed config source: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_message_names_file_and_reason() {
        let err = LoadError::malformed(Some(PathBuf::from("/etc/loom/bad.yaml")), "unexpected ':'");
        assert_eq!(err.kind(), LoadErrorKind::MalformedSource);
        assert_eq!(
            err.to_string(),
            "Error parsing YAML file `/etc/loom/bad.yaml`: unexpected ':'"
        );
    }

    #[test]
    fn unreadable_carries_path() {
        let err = LoadError::unreadable("missing.yaml", "No such file or directory");
        assert_eq!(err.kind(), LoadErrorKind::UnreadableSource);
        assert_eq!(err.path(), Some(&PathBuf::from("missing.yaml")));
        assert!(err.to_string().contains("missing.yaml"));
    }
}
