//! Plugin settings bag and identity resolution

use crate::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Returns true when an optional string carries a non-empty value
#[inline]
#[must_use]
pub fn is_set(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Two-tier resolution: a non-empty override wins, the global value otherwise
#[must_use]
pub fn resolve(override_value: Option<&str>, global: Option<&str>) -> Option<String> {
    if is_set(override_value) {
        override_value.map(str::to_string)
    } else {
        global.map(str::to_string)
    }
}

/// How build sessions map onto Maven modules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildStrategy {
    /// A single build session for the whole reactor
    #[default]
    OneBuild,
    /// One build session per module; the app name is qualified by module
    BuildPerModule,
}

impl BuildStrategy {
    /// Human readable name
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::OneBuild => "One Build",
            Self::BuildPerModule => "Build Per Module",
        }
    }
}

impl Display for BuildStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for BuildStrategy {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace([' ', '_'], "-").as_str() {
            "one-build" => Ok(Self::OneBuild),
            "build-per-module" => Ok(Self::BuildPerModule),
            _ => Err(ModelError::unknown(
                "build strategy",
                s,
                "one-build, build-per-module",
            )),
        }
    }
}

/// Log level handed to the build plugin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Off,
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// Name written into the plugin configuration
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for LogLevel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            _ => Err(ModelError::unknown(
                "log level",
                s,
                "off, error, warn, info, debug",
            )),
        }
    }
}

/// Where the build plugin writes its own log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogDestination {
    #[default]
    Console,
    File,
}

impl FromStr for LogDestination {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "console" => Ok(Self::Console),
            "file" => Ok(Self::File),
            _ => Err(ModelError::unknown("log destination", s, "console, file")),
        }
    }
}

/// Account identity: customer id, server url and proxy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub customer_id: Option<String>,
    pub server_url: Option<String>,
    pub proxy: Option<String>,
}

/// Process-wide defaults used when an invocation leaves identity unset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    pub customer_id: Option<String>,
    pub server_url: Option<String>,
    pub proxy: Option<String>,
}

impl GlobalSettings {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    #[must_use]
    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = Some(server_url.into());
        self
    }

    #[must_use]
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

/// Per-invocation settings bag
///
/// String fields are optional; absent and empty are treated alike when the
/// plugin configuration is generated. Identity fields act as overrides of
/// [`GlobalSettings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginSettings {
    /// Identity overrides
    #[serde(flatten)]
    pub identity: Identity,

    pub enabled: bool,
    pub app_name: Option<String>,
    pub module_name: Option<String>,
    pub workspace_path: Option<String>,
    pub build_name: Option<String>,
    pub branch_name: Option<String>,
    pub environment: Option<String>,

    pub packages_included: Option<String>,
    pub packages_excluded: Option<String>,
    pub files_included: Option<String>,
    pub files_excluded: Option<String>,
    pub recursive: bool,

    /// Agent (api) jar; also wired into the test runner when set
    pub api_jar: Option<String>,
    pub scanner_jar: Option<String>,
    pub listener_jar: Option<String>,
    pub listener_config_file: Option<String>,

    /// Explicit flag; when absent it follows `log_level != Off`
    pub log_enabled: Option<bool>,
    pub log_level: LogLevel,
    pub log_destination: LogDestination,
    pub log_folder: Option<String>,

    pub build_strategy: BuildStrategy,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            identity: Identity::default(),
            enabled: true,
            app_name: None,
            module_name: None,
            workspace_path: None,
            build_name: None,
            branch_name: None,
            environment: None,
            packages_included: None,
            packages_excluded: None,
            files_included: None,
            files_excluded: None,
            recursive: true,
            api_jar: None,
            scanner_jar: None,
            listener_jar: None,
            listener_config_file: None,
            log_enabled: None,
            log_level: LogLevel::Off,
            log_destination: LogDestination::Console,
            log_folder: None,
            build_strategy: BuildStrategy::OneBuild,
        }
    }
}

impl PluginSettings {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    #[must_use]
    pub fn with_module_name(mut self, module_name: impl Into<String>) -> Self {
        self.module_name = Some(module_name.into());
        self
    }

    #[must_use]
    pub fn with_branch_name(mut self, branch_name: impl Into<String>) -> Self {
        self.branch_name = Some(branch_name.into());
        self
    }

    #[must_use]
    pub fn with_build_strategy(mut self, strategy: BuildStrategy) -> Self {
        self.build_strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_api_jar(mut self, api_jar: impl Into<String>) -> Self {
        self.api_jar = Some(api_jar.into());
        self
    }

    #[must_use]
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Whether the plugin should log at all
    #[must_use]
    pub fn is_log_enabled(&self) -> bool {
        self.log_enabled.unwrap_or(self.log_level != LogLevel::Off)
    }

    /// App name as emitted for the configured build strategy
    ///
    /// `BuildPerModule` yields `"[app] - module"`.
    #[must_use]
    pub fn effective_app_name(&self) -> Option<String> {
        match self.build_strategy {
            BuildStrategy::OneBuild => self.app_name.clone(),
            BuildStrategy::BuildPerModule => Some(format!(
                "[{}] - {}",
                self.app_name.as_deref().unwrap_or_default(),
                self.module_name.as_deref().unwrap_or_default()
            )),
        }
    }

    /// Resolve identity overrides against the process-wide defaults
    #[must_use]
    pub fn resolve_identity(&self, global: &GlobalSettings) -> Identity {
        Identity {
            customer_id: resolve(
                self.identity.customer_id.as_deref(),
                global.customer_id.as_deref(),
            ),
            server_url: resolve(
                self.identity.server_url.as_deref(),
                global.server_url.as_deref(),
            ),
            proxy: resolve(self.identity.proxy.as_deref(), global.proxy.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_prefers_non_empty_override() {
        assert_eq!(resolve(Some("local"), Some("global")), Some("local".to_string()));
        assert_eq!(resolve(Some(""), Some("global")), Some("global".to_string()));
        assert_eq!(resolve(None, Some("global")), Some("global".to_string()));
        assert_eq!(resolve(None, None), None);
    }

    #[test]
    fn resolve_identity_mixes_tiers() {
        let global = GlobalSettings::new()
            .with_customer_id("acme")
            .with_server_url("https://global.example")
            .with_proxy("proxy:8080");
        let mut settings = PluginSettings::new();
        settings.identity.server_url = Some("https://override.example".to_string());
        settings.identity.proxy = Some(String::new());

        let identity = settings.resolve_identity(&global);
        assert_eq!(identity.customer_id.as_deref(), Some("acme"));
        assert_eq!(identity.server_url.as_deref(), Some("https://override.example"));
        assert_eq!(identity.proxy.as_deref(), Some("proxy:8080"));
    }

    #[test]
    fn defaults_match_plugin_expectations() {
        let settings = PluginSettings::default();
        assert!(settings.enabled);
        assert!(settings.recursive);
        assert_eq!(settings.log_level, LogLevel::Off);
        assert_eq!(settings.build_strategy, BuildStrategy::OneBuild);
        assert!(!settings.is_log_enabled());
    }

    #[test]
    fn log_enabled_follows_level_unless_explicit() {
        let settings = PluginSettings::new().with_log_level(LogLevel::Info);
        assert!(settings.is_log_enabled());

        let mut settings = settings;
        settings.log_enabled = Some(false);
        assert!(!settings.is_log_enabled());
    }

    #[test]
    fn effective_app_name_per_strategy() {
        let settings = PluginSettings::new()
            .with_app_name("Foo")
            .with_module_name("Bar");
        assert_eq!(settings.effective_app_name().as_deref(), Some("Foo"));

        let settings = settings.with_build_strategy(BuildStrategy::BuildPerModule);
        assert_eq!(settings.effective_app_name().as_deref(), Some("[Foo] - Bar"));
    }

    #[test]
    fn enums_parse_from_text() {
        assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("file".parse::<LogDestination>().unwrap(), LogDestination::File);
        assert_eq!(
            "Build Per Module".parse::<BuildStrategy>().unwrap(),
            BuildStrategy::BuildPerModule
        );
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn settings_deserialize_from_toml() {
        let text = r#"
            customer_id = "acme"
            app_name = "shop"
            recursive = false
            log_level = "debug"
            log_destination = "file"
            build_strategy = "build-per-module"
        "#;
        let settings: PluginSettings = toml::from_str(text).unwrap();
        assert_eq!(settings.identity.customer_id.as_deref(), Some("acme"));
        assert_eq!(settings.app_name.as_deref(), Some("shop"));
        assert!(!settings.recursive);
        assert!(settings.enabled);
        assert_eq!(settings.log_level, LogLevel::Debug);
        assert_eq!(settings.log_destination, LogDestination::File);
        assert_eq!(settings.build_strategy, BuildStrategy::BuildPerModule);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn override_wins_when_non_empty(local in "[a-z]{1,12}", global in proptest::option::of("[a-z]{0,12}")) {
                prop_assert_eq!(resolve(Some(&local), global.as_deref()), Some(local.clone()));
            }

            #[test]
            fn global_used_when_override_unset(local in proptest::option::of(Just(String::new())), global in proptest::option::of("[a-z]{0,12}")) {
                prop_assert_eq!(resolve(local.as_deref(), global.as_deref()), global.clone());
            }
        }
    }
}
