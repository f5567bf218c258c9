//! Agent command modes
//!
//! Each mode carries only its own fields; the session id and free-form extra
//! arguments are shared and live on [`CommandInvocation`].

use serde::{Deserialize, Serialize};

/// Technology specific options for the `config` modes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "technology", rename_all = "kebab-case")]
pub enum TechnologyOptions {
    Java {
        #[serde(default)]
        packages_included: Option<String>,
        #[serde(default)]
        packages_excluded: Option<String>,
    },
    #[serde(rename = "dotnet")]
    DotNet {
        #[serde(default)]
        namespaces_included: Option<String>,
        #[serde(default)]
        namespaces_excluded: Option<String>,
    },
}

impl TechnologyOptions {
    fn push_arguments(&self, args: &mut Vec<String>) {
        match self {
            Self::Java {
                packages_included,
                packages_excluded,
            } => {
                push_opt(args, "-packagesincluded", packages_included.as_deref());
                push_opt(args, "-packagesexcluded", packages_excluded.as_deref());
            }
            Self::DotNet {
                namespaces_included,
                namespaces_excluded,
            } => {
                push_opt(args, "-namespacesincluded", namespaces_included.as_deref());
                push_opt(args, "-namespacesexcluded", namespaces_excluded.as_deref());
            }
        }
    }
}

/// Fields shared by `config` and `pr-config`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFields {
    pub app_name: Option<String>,
    pub branch_name: Option<String>,
    pub build_name: Option<String>,
    pub lab_id: Option<String>,
    pub tech_options: Vec<TechnologyOptions>,
}

impl ConfigFields {
    fn push_arguments(&self, args: &mut Vec<String>) {
        push_opt(args, "-appname", self.app_name.as_deref());
        push_opt(args, "-branchname", self.branch_name.as_deref());
        push_opt(args, "-buildname", self.build_name.as_deref());
        push_opt(args, "-labid", self.lab_id.as_deref());
        for options in &self.tech_options {
            options.push_arguments(args);
        }
    }
}

/// Closed set of agent command modes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum CommandMode {
    Start {
        #[serde(default)]
        test_stage: Option<String>,
    },
    End,
    UploadReports {
        #[serde(default)]
        report_files: Option<String>,
        #[serde(default)]
        reports_folders: Option<String>,
        #[serde(default = "default_true")]
        has_more_requests: bool,
        #[serde(default)]
        source: Option<String>,
    },
    ExternalReport {
        #[serde(default)]
        report: Option<String>,
    },
    Config(ConfigFields),
    PrConfig {
        #[serde(flatten)]
        config: ConfigFields,
        #[serde(default)]
        latest_commit: Option<String>,
        #[serde(default)]
        pull_request_number: Option<String>,
        #[serde(default)]
        repo_url: Option<String>,
        #[serde(default)]
        target_branch: Option<String>,
    },
}

fn default_true() -> bool {
    true
}

impl Default for CommandMode {
    fn default() -> Self {
        Self::Config(ConfigFields::default())
    }
}

impl CommandMode {
    /// Name shown to users
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "Start",
            Self::End => "End",
            Self::UploadReports { .. } => "Upload Reports",
            Self::ExternalReport { .. } => "External Report",
            Self::Config(_) => "Config",
            Self::PrConfig { .. } => "PR Config",
        }
    }

    /// Verb passed to the agent command line
    #[must_use]
    pub const fn command_name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::End => "end",
            Self::UploadReports { .. } => "uploadReports",
            Self::ExternalReport { .. } => "externalReport",
            Self::Config(_) => "config",
            Self::PrConfig { .. } => "prConfig",
        }
    }

    /// `Config` is the mode preselected for new jobs
    #[must_use]
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    fn push_arguments(&self, args: &mut Vec<String>) {
        match self {
            Self::Start { test_stage } => push_opt(args, "-testStage", test_stage.as_deref()),
            Self::End => {}
            Self::UploadReports {
                report_files,
                reports_folders,
                has_more_requests,
                source,
            } => {
                push_opt(args, "-reportFile", report_files.as_deref());
                push_opt(args, "-reportFilesFolder", reports_folders.as_deref());
                args.push("-hasMoreRequests".to_string());
                args.push(has_more_requests.to_string());
                push_opt(args, "-source", source.as_deref());
            }
            Self::ExternalReport { report } => push_opt(args, "-report", report.as_deref()),
            Self::Config(config) => config.push_arguments(args),
            Self::PrConfig {
                config,
                latest_commit,
                pull_request_number,
                repo_url,
                target_branch,
            } => {
                config.push_arguments(args);
                push_opt(args, "-latestcommit", latest_commit.as_deref());
                push_opt(args, "-pullrequestnumber", pull_request_number.as_deref());
                push_opt(args, "-repourl", repo_url.as_deref());
                push_opt(args, "-targetbranch", target_branch.as_deref());
            }
        }
    }
}

/// A command mode plus the arguments every mode shares
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInvocation {
    #[serde(default)]
    pub build_session_id: Option<String>,
    #[serde(default)]
    pub additional_arguments: Option<String>,
    #[serde(flatten)]
    pub mode: CommandMode,
}

impl CommandInvocation {
    #[must_use]
    pub fn new(mode: CommandMode) -> Self {
        Self {
            build_session_id: None,
            additional_arguments: None,
            mode,
        }
    }

    #[must_use]
    pub fn with_build_session_id(mut self, id: impl Into<String>) -> Self {
        self.build_session_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_additional_arguments(mut self, extra: impl Into<String>) -> Self {
        self.additional_arguments = Some(extra.into());
        self
    }

    /// Agent command line, verb first
    ///
    /// Unset options are omitted; additional arguments are split on
    /// whitespace and appended last.
    #[must_use]
    pub fn to_arguments(&self) -> Vec<String> {
        let mut args = vec![self.mode.command_name().to_string()];
        push_opt(&mut args, "-buildsessionid", self.build_session_id.as_deref());
        self.mode.push_arguments(&mut args);
        if let Some(extra) = self.additional_arguments.as_deref() {
            args.extend(extra.split_whitespace().map(str::to_string));
        }
        args
    }
}

fn push_opt(args: &mut Vec<String>, flag: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}
