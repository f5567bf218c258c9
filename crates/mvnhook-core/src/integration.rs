//! Batch instrumentation of Maven descriptors
//!
//! The [`Integrator`] walks its files in order. Each file is loaded,
//! checked, backed up, mutated and written on its own; a failure is
//! recorded in the [`BatchReport`] and the next file is processed.

use crate::backup::backup;
use crate::error::{IntegrationError, ValidationError};
use crate::payload::ConfigFragment;
use crate::report::{BatchReport, FileOutcome, FileStatus};
use mvnhook_descriptor::{ContentHash, Document, Element, PluginIdentity};
use mvnhook_model::{GlobalSettings, PluginSettings, TestingFramework};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Oldest test runner release that honours the listener property
const MIN_TEST_RUNNER_VERSION: (u64, u64) = (2, 9);

/// A descriptor to instrument and where to write the result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorFileRef {
    pub source_path: PathBuf,
    /// Defaults to `source_path`
    pub target_path: Option<PathBuf>,
}

impl DescriptorFileRef {
    /// In-place rewrite of `source_path`
    #[must_use]
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            target_path: None,
        }
    }

    #[must_use]
    pub fn with_target(mut self, target_path: impl Into<PathBuf>) -> Self {
        self.target_path = Some(target_path.into());
        self
    }

    /// Path the instrumented descriptor is written to
    #[inline]
    #[must_use]
    pub fn target(&self) -> &Path {
        self.target_path.as_deref().unwrap_or(self.source_path.as_path())
    }
}

impl From<PathBuf> for DescriptorFileRef {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

/// Everything one pass needs to know
#[derive(Debug, Clone, Default)]
pub struct IntegrationInfo {
    pub files: Vec<DescriptorFileRef>,
    pub settings: PluginSettings,
    pub global: GlobalSettings,
    pub framework: TestingFramework,
}

impl IntegrationInfo {
    #[must_use]
    pub fn new(files: Vec<DescriptorFileRef>, settings: PluginSettings) -> Self {
        Self {
            files,
            settings,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_global(mut self, global: GlobalSettings) -> Self {
        self.global = global;
        self
    }

    #[must_use]
    pub fn with_framework(mut self, framework: TestingFramework) -> Self {
        self.framework = framework;
        self
    }
}

/// Pass options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegrateOptions {
    /// Copy each descriptor to `<file>.slbak` before changing it
    pub backup: bool,
}

impl Default for IntegrateOptions {
    fn default() -> Self {
        Self { backup: true }
    }
}

/// Instruments a list of descriptors
#[derive(Debug, Clone)]
pub struct Integrator {
    info: IntegrationInfo,
    options: IntegrateOptions,
}

impl Integrator {
    #[must_use]
    pub fn new(info: IntegrationInfo, options: IntegrateOptions) -> Self {
        Self { info, options }
    }

    #[inline]
    #[must_use]
    pub fn info(&self) -> &IntegrationInfo {
        &self.info
    }

    /// Process every file and report what happened to each
    ///
    /// Never fails as a whole; per-file errors end up in the report.
    #[must_use]
    pub fn integrate(&self) -> BatchReport {
        let fragment =
            ConfigFragment::build(&self.info.settings, &self.info.global, self.info.framework);
        debug!(entries = ?fragment.entries(), framework = %self.info.framework, "plugin configuration");
        let plugin = fragment.to_plugin_element();

        let mut report = BatchReport::new();
        for file in &self.info.files {
            report.push(self.integrate_file(file, &plugin));
        }

        info!(
            files = report.len(),
            instrumented = report.instrumented(),
            skipped = report.skipped(),
            failed = report.failed(),
            "integration finished"
        );
        report
    }

    fn integrate_file(&self, file: &DescriptorFileRef, plugin: &Element) -> FileOutcome {
        let path = file.source_path.as_path();

        let mut document = match Document::load(path) {
            Ok(document) => document,
            Err(e) => {
                error!(path = %path.display(), error = %e, "cannot read descriptor");
                return FileOutcome::new(path, FileStatus::Failed)
                    .with_detail(IntegrationError::from(e).to_string());
            }
        };

        let identity = PluginIdentity::INSTRUMENTATION;
        if document.is_plugin_present_anywhere(identity.group_id, identity.artifact_id) {
            info!(path = %path.display(), "already instrumented, skipping");
            return FileOutcome::new(path, FileStatus::SkippedAlreadyInstrumented)
                .with_checksum(document.checksum().ok());
        }

        let backup_file = if self.options.backup {
            match backup(path) {
                Ok(record) => Some(record.backup),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "backup failed, continuing");
                    None
                }
            }
        } else {
            None
        };

        match self.instrument(file, &mut document, plugin) {
            Ok(checksum) => {
                info!(path = %file.target().display(), checksum = %checksum.short(), "instrumented");
                FileOutcome::new(path, FileStatus::Instrumented)
                    .with_checksum(Some(checksum))
                    .with_backup(backup_file)
            }
            Err(e) if e.is_skip() => {
                info!(path = %path.display(), reason = %e, "not instrumentable, skipping");
                FileOutcome::new(path, FileStatus::SkippedInvalid)
                    .with_backup(backup_file)
                    .with_detail(e.to_string())
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "instrumentation failed");
                FileOutcome::new(path, FileStatus::Failed)
                    .with_backup(backup_file)
                    .with_detail(e.to_string())
            }
        }
    }

    fn instrument(
        &self,
        file: &DescriptorFileRef,
        document: &mut Document,
        plugin: &Element,
    ) -> Result<ContentHash, IntegrationError> {
        if !document.is_valid_project() {
            return Err(ValidationError::NotAProject {
                root: document.root().local_name().to_string(),
            }
            .into());
        }

        let sections = document.add_plugin_to_all_profiles(plugin)?;
        debug!(path = %file.source_path.display(), sections, "plugin injected");

        if let Some(agent_jar) = self.info.settings.api_jar.as_deref().filter(|j| !j.is_empty()) {
            check_test_runner_version(&file.source_path, document);
            let listener = self.info.framework.listener_class();
            let updated = document.update_test_runner_plugin(listener, agent_jar);
            debug!(path = %file.source_path.display(), sections = updated, "test runner wired");
        }

        Ok(document.save(file.target())?)
    }
}

fn check_test_runner_version(path: &Path, document: &Document) {
    let runner = PluginIdentity::TEST_RUNNER;
    let Some(version) = document.plugin_version(runner.group_id, runner.artifact_id) else {
        return;
    };
    if parse_major_minor(&version).is_some_and(|found| found < MIN_TEST_RUNNER_VERSION) {
        warn!(
            path = %path.display(),
            version = %version,
            "{} older than {}.{} may ignore test listeners",
            runner.artifact_id,
            MIN_TEST_RUNNER_VERSION.0,
            MIN_TEST_RUNNER_VERSION.1
        );
    }
}

/// Leading `major.minor` of a version string; `None` for property references
fn parse_major_minor(version: &str) -> Option<(u64, u64)> {
    let mut parts = version
        .split(['.', '-'])
        .map(|part| part.trim().parse::<u64>().ok());
    let major = parts.next().flatten()?;
    let minor = parts.next().flatten().unwrap_or(0);
    Some((major, minor))
}
