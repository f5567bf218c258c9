//! Settings file
//!
//! ```toml
//! testing_framework = "junit"
//! backup = true
//!
//! [global]
//! customer_id = "acme"
//! server_url = "https://acme.example/api"
//!
//! [settings]
//! app_name = "shop"
//! build_strategy = "build-per-module"
//!
//! [discovery]
//! folders = ["."]
//! patterns = "*pom.xml"
//! recursive = true
//! ```

use crate::locator::DEFAULT_PATTERN;
use mvnhook_model::{CommandInvocation, GlobalSettings, PluginSettings, TestingFramework};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Unreadable or invalid settings file
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Where to look for descriptors
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    pub folders: Vec<PathBuf>,
    /// Comma separated file name globs
    pub patterns: String,
    pub recursive: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            folders: vec![PathBuf::from(".")],
            patterns: DEFAULT_PATTERN.to_string(),
            recursive: true,
        }
    }
}

/// Everything read from a settings file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub testing_framework: TestingFramework,
    pub backup: bool,
    pub global: GlobalSettings,
    pub settings: PluginSettings,
    pub discovery: DiscoveryConfig,
    /// Agent command used by `agent-args`
    pub command: Option<CommandInvocation>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            testing_framework: TestingFramework::default(),
            backup: true,
            global: GlobalSettings::default(),
            settings: PluginSettings::default(),
            discovery: DiscoveryConfig::default(),
            command: None,
        }
    }
}

impl CliConfig {
    /// Read and validate a settings file
    ///
    /// # Errors
    /// Returns [`SettingsError`] if the file cannot be read or is invalid
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse settings from TOML text
    ///
    /// # Errors
    /// Returns [`SettingsError`] if the text is not valid settings
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let config: Self =
            toml::from_str(text).map_err(|e| SettingsError::Invalid(e.message().to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.discovery.folders.is_empty() {
            return Err(SettingsError::Invalid(
                "discovery.folders must name at least one folder".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvnhook_model::{BuildStrategy, CommandMode, LogLevel};

    #[test]
    fn empty_file_gives_defaults() {
        let config = CliConfig::from_toml_str("").unwrap();
        assert_eq!(config, CliConfig::default());
        assert!(config.backup);
        assert!(config.discovery.recursive);
        assert_eq!(config.discovery.patterns, "*pom.xml");
        assert_eq!(config.discovery.folders, vec![PathBuf::from(".")]);
        assert!(config.settings.enabled);
        assert_eq!(config.settings.log_level, LogLevel::Off);
    }

    #[test]
    fn full_file() {
        let text = r#"
            testing_framework = "testng"
            backup = false

            [global]
            customer_id = "acme"
            server_url = "https://acme.example/api"

            [settings]
            app_name = "shop"
            server_url = "https://override.example/api"
            build_strategy = "build-per-module"
            log_level = "warn"

            [discovery]
            folders = ["services", "libs"]
            patterns = "pom.xml, *-pom.xml"
            recursive = false

            [command]
            mode = "start"
            test_stage = "Unit Tests"
        "#;
        let config = CliConfig::from_toml_str(text).unwrap();
        assert_eq!(config.testing_framework, TestingFramework::TestNG);
        assert!(!config.backup);
        assert_eq!(config.global.customer_id.as_deref(), Some("acme"));
        assert_eq!(
            config.settings.identity.server_url.as_deref(),
            Some("https://override.example/api")
        );
        assert_eq!(config.settings.build_strategy, BuildStrategy::BuildPerModule);
        assert_eq!(config.discovery.folders.len(), 2);
        assert!(!config.discovery.recursive);
        let command = config.command.unwrap();
        assert_eq!(
            command.mode,
            CommandMode::Start {
                test_stage: Some("Unit Tests".to_string())
            }
        );
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let err = CliConfig::from_toml_str("bakup = true").unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));
    }

    #[test]
    fn bad_enum_value_is_rejected() {
        let err = CliConfig::from_toml_str("testing_framework = \"spock\"").unwrap_err();
        assert!(err.to_string().contains("invalid settings"));
    }

    #[test]
    fn empty_folder_list_is_rejected() {
        let err = CliConfig::from_toml_str("[discovery]\nfolders = []").unwrap_err();
        assert!(err.to_string().contains("at least one folder"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = CliConfig::load(Path::new("/nonexistent/mvnhook.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }
}
