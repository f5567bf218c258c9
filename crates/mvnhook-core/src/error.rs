//! Error types for the instrumentation engine
//!
//! Per-file failures are wrapped in [`IntegrationError`] at the file
//! boundary and turned into report entries; none of them abort a batch.

use mvnhook_descriptor::{ApplyError, ParseError, SerializeError};
use std::path::PathBuf;

/// Descriptor is well formed but cannot be instrumented
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Root element is something other than `project`
    #[error("root element is <{root}>, expected <project>")]
    NotAProject { root: String },
}

/// Backup or restore of a descriptor failed
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// Copy between original and backup failed
    #[error("cannot copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No backup exists to restore from
    #[error("no backup found at {0}")]
    Missing(PathBuf),
}

/// Anything that can go wrong while instrumenting one file
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("backup error: {0}")]
    Backup(#[from] BackupError),

    #[error("apply error: {0}")]
    Apply(#[from] ApplyError),

    #[error("serialize error: {0}")]
    Serialize(#[from] SerializeError),
}

impl IntegrationError {
    /// True if the file should be reported as skipped rather than failed
    #[inline]
    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_a_skip() {
        let err: IntegrationError = ValidationError::NotAProject {
            root: "settings".to_string(),
        }
        .into();
        assert!(err.is_skip());
        assert_eq!(
            err.to_string(),
            "validation error: root element is <settings>, expected <project>"
        );
    }

    #[test]
    fn serialize_is_a_failure() {
        let err: IntegrationError = SerializeError::InvalidUtf8.into();
        assert!(!err.is_skip());
    }
}
