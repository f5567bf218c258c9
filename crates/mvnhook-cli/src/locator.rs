//! Descriptor discovery
//!
//! Finds files whose name matches any of a comma separated list of globs,
//! either directly inside each folder or anywhere below it.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Pattern used when none is configured
pub const DEFAULT_PATTERN: &str = "*pom.xml";

/// Discovery could not start
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// File name matcher plus traversal mode
#[derive(Debug, Clone)]
pub struct DescriptorLocator {
    matcher: GlobSet,
    recursive: bool,
}

impl DescriptorLocator {
    /// Compile comma separated file name globs
    ///
    /// Blank input falls back to [`DEFAULT_PATTERN`].
    ///
    /// # Errors
    /// Returns [`DiscoveryError::InvalidPattern`] for a glob that does not
    /// compile
    pub fn new(patterns: &str, recursive: bool) -> Result<Self, DiscoveryError> {
        let mut parts: Vec<&str> = patterns
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            parts.push(DEFAULT_PATTERN);
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in parts {
            let glob = Glob::new(pattern).map_err(|source| DiscoveryError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
            builder.add(glob);
        }
        let matcher = builder
            .build()
            .map_err(|source| DiscoveryError::InvalidPattern {
                pattern: patterns.to_string(),
                source,
            })?;

        Ok(Self { matcher, recursive })
    }

    /// True if the file name of `path` matches a pattern
    #[must_use]
    pub fn is_match(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.matcher.is_match(Path::new(name)))
    }

    /// Matching files, folder by folder
    ///
    /// Within a folder files come in file name order. A file reached
    /// through more than one folder is listed once. Missing folders and
    /// unreadable entries are logged and skipped.
    #[must_use]
    pub fn locate(&self, folders: &[PathBuf]) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for folder in folders {
            if !folder.is_dir() {
                warn!(folder = %folder.display(), "folder does not exist, skipping");
                continue;
            }

            let max_depth = if self.recursive { usize::MAX } else { 1 };
            let walker = WalkDir::new(folder)
                .max_depth(max_depth)
                .sort_by_file_name()
                .into_iter();

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(folder = %folder.display(), error = %e, "cannot read entry");
                        continue;
                    }
                };
                if !entry.file_type().is_file() || !self.is_match(entry.path()) {
                    continue;
                }
                let path = std::fs::canonicalize(entry.path())
                    .unwrap_or_else(|_| entry.path().to_path_buf());
                if seen.insert(path.clone()) {
                    found.push(path);
                }
            }
        }

        debug!(count = found.len(), "descriptors located");
        found
    }
}
