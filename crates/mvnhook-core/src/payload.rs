//! Configuration payload for the instrumentation plugin
//!
//! [`ConfigFragment::build`] is a pure function of the settings: the same
//! inputs always give the same entries in the same order. Most entries are
//! written only when their setting is non-empty; a few booleans are written
//! only when they differ from the plugin's own default.

use mvnhook_descriptor::{Element, PluginIdentity};
use mvnhook_model::{GlobalSettings, LogDestination, PluginSettings, TestingFramework};

/// Version of the instrumentation plugin written into descriptors
pub const PLUGIN_VERSION: &str = "1.0.0";

/// Generated class patterns that are never instrumented
pub const DEFAULT_PACKAGE_EXCLUSIONS: &str =
    "*FastClassByGuice*, *ByCGLIB*, *EnhancerByMockitoWithCGLIB*, *EnhancerBySpringCGLIB*";

/// One `<execution>` of the plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    pub id: &'static str,
    pub goal: &'static str,
}

/// Executions declared on every injected plugin, in order
pub const EXECUTIONS: [Execution; 3] = [
    Execution {
        id: "a1",
        goal: "build-scanner",
    },
    Execution {
        id: "a2",
        goal: "test-listener",
    },
    Execution {
        id: "a3",
        goal: "initialize-test-listener",
    },
];

/// Ordered plugin configuration plus its executions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFragment {
    entries: Vec<(&'static str, String)>,
    executions: Vec<Execution>,
}

impl ConfigFragment {
    /// Build the configuration for one invocation
    ///
    /// Identity fields are resolved against `global`; the listener
    /// initialization flag is derived from `framework`.
    #[must_use]
    pub fn build(
        settings: &PluginSettings,
        global: &GlobalSettings,
        framework: TestingFramework,
    ) -> Self {
        let identity = settings.resolve_identity(global);
        let mut entries = Entries::default();

        if !settings.enabled {
            entries.push("enable", "false");
        }

        entries.push_opt("customerid", identity.customer_id.as_deref());
        entries.push_opt("server", identity.server_url.as_deref());
        entries.push_opt("proxy", identity.proxy.as_deref());
        entries.push_opt("appName", settings.effective_app_name().as_deref());
        entries.push_opt("moduleName", settings.module_name.as_deref());
        entries.push_opt("workspacepath", settings.workspace_path.as_deref());
        entries.push_opt("build", settings.build_name.as_deref());
        entries.push_opt("branch", settings.branch_name.as_deref());
        entries.push_opt("packagesincluded", settings.packages_included.as_deref());
        entries.push("packagesexcluded", &package_exclusions(settings.packages_excluded.as_deref()));
        entries.push_opt("filesincluded", settings.files_included.as_deref());
        entries.push_opt("apiJar", settings.api_jar.as_deref());
        entries.push_opt("buildScannerJar", settings.scanner_jar.as_deref());
        entries.push_opt("testListenerJar", settings.listener_jar.as_deref());
        entries.push_opt("testListenerConfigFile", settings.listener_config_file.as_deref());
        entries.push_opt("environment", settings.environment.as_deref());
        entries.push_opt("filesexcluded", settings.files_excluded.as_deref());

        if !settings.recursive {
            entries.push("recursive", "false");
        }
        if settings.is_log_enabled() {
            entries.push("logEnabled", "true");
        }
        entries.push("logLevel", settings.log_level.display_name());
        if settings.log_destination == LogDestination::File {
            entries.push("logToFile", "true");
        }
        entries.push_opt("logFolder", settings.log_folder.as_deref());
        entries.push(
            "enableTestListenerInitialization",
            if framework.is_auto_detect() { "true" } else { "false" },
        );

        Self {
            entries: entries.0,
            executions: EXECUTIONS.to_vec(),
        }
    }

    /// Configuration entries in emission order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[(&'static str, String)] {
        &self.entries
    }

    /// Value of a configuration entry
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    #[inline]
    #[must_use]
    pub fn executions(&self) -> &[Execution] {
        &self.executions
    }

    /// The complete `<plugin>` element
    #[must_use]
    pub fn to_plugin_element(&self) -> Element {
        let identity = PluginIdentity::INSTRUMENTATION;

        let configuration = self
            .entries
            .iter()
            .fold(Element::new("configuration"), |config, (name, value)| {
                config.with_child(Element::with_text(*name, value))
            });

        let executions = self
            .executions
            .iter()
            .fold(Element::new("executions"), |executions, execution| {
                executions.with_child(
                    Element::new("execution")
                        .with_child(Element::with_text("id", execution.id))
                        .with_child(
                            Element::new("goals")
                                .with_child(Element::with_text("goal", execution.goal)),
                        ),
                )
            });

        Element::new("plugin")
            .with_child(Element::with_text("groupId", identity.group_id))
            .with_child(Element::with_text("artifactId", identity.artifact_id))
            .with_child(Element::with_text("version", PLUGIN_VERSION))
            .with_child(configuration)
            .with_child(executions)
    }
}

/// Fixed exclusions, followed by the user's own when given
#[must_use]
pub fn package_exclusions(user: Option<&str>) -> String {
    match user.filter(|excluded| !excluded.is_empty()) {
        Some(excluded) => format!("{DEFAULT_PACKAGE_EXCLUSIONS}, {excluded}"),
        None => DEFAULT_PACKAGE_EXCLUSIONS.to_string(),
    }
}

#[derive(Default)]
struct Entries(Vec<(&'static str, String)>);

impl Entries {
    fn push(&mut self, name: &'static str, value: &str) {
        self.0.push((name, value.to_string()));
    }

    fn push_opt(&mut self, name: &'static str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.push(name, value);
        }
    }
}
