//! Batch results

use mvnhook_descriptor::ContentHash;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

/// What happened to one descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Plugin injected and file written
    Instrumented,
    /// Plugin already declared somewhere in the file; left untouched
    SkippedAlreadyInstrumented,
    /// Not a Maven project
    SkippedInvalid,
    /// Read, mutation or write failed
    Failed,
}

impl FileStatus {
    #[inline]
    #[must_use]
    pub const fn is_skipped(self) -> bool {
        matches!(self, Self::SkippedAlreadyInstrumented | Self::SkippedInvalid)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instrumented => "instrumented",
            Self::SkippedAlreadyInstrumented => "already instrumented",
            Self::SkippedInvalid => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl Display for FileStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Outcome for one descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
    /// Hash of the file as it was left on disk, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<ContentHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
    /// Error or skip reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl FileOutcome {
    #[must_use]
    pub fn new(path: &Path, status: FileStatus) -> Self {
        Self {
            path: path.to_path_buf(),
            status,
            checksum: None,
            backup: None,
            detail: None,
        }
    }

    #[must_use]
    pub fn with_checksum(mut self, checksum: Option<ContentHash>) -> Self {
        self.checksum = checksum;
        self
    }

    #[must_use]
    pub fn with_backup(mut self, backup: Option<PathBuf>) -> Self {
        self.backup = backup;
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Outcomes of one pass, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: FileOutcome) {
        self.outcomes.push(outcome);
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    #[must_use]
    pub fn instrumented(&self) -> usize {
        self.count(|status| status == FileStatus::Instrumented)
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(FileStatus::is_skipped)
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|status| status == FileStatus::Failed)
    }

    /// Outcome recorded for `path`
    #[must_use]
    pub fn outcome(&self, path: &Path) -> Option<&FileOutcome> {
        self.outcomes.iter().find(|outcome| outcome.path == path)
    }

    /// Pretty JSON rendering
    ///
    /// # Errors
    /// Returns an error if serialization fails
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&JsonReport {
            instrumented: self.instrumented(),
            skipped: self.skipped(),
            failed: self.failed(),
            files: &self.outcomes,
        })
    }

    fn count(&self, predicate: impl Fn(FileStatus) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| predicate(outcome.status))
            .count()
    }
}

impl Display for BatchReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s): {} instrumented, {} skipped, {} failed",
            self.len(),
            self.instrumented(),
            self.skipped(),
            self.failed()
        )
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    instrumented: usize,
    skipped: usize,
    failed: usize,
    files: &'a [FileOutcome],
}
