//! Plugin coordinates

use crate::xml::Element;
use std::fmt::{self, Display, Formatter};

/// Group assumed for a plugin that declares no `groupId`
pub const DEFAULT_PLUGIN_GROUP: &str = "org.apache.maven.plugins";

/// A `groupId`/`artifactId` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginIdentity {
    pub group_id: &'static str,
    pub artifact_id: &'static str,
}

impl PluginIdentity {
    /// The instrumentation plugin
    pub const INSTRUMENTATION: Self = Self {
        group_id: "io.sealights.on-premise.agents.plugin",
        artifact_id: "sealights-maven-plugin",
    };

    /// The unit test runner plugin
    pub const TEST_RUNNER: Self = Self {
        group_id: DEFAULT_PLUGIN_GROUP,
        artifact_id: "maven-surefire-plugin",
    };

    #[must_use]
    pub const fn new(group_id: &'static str, artifact_id: &'static str) -> Self {
        Self {
            group_id,
            artifact_id,
        }
    }

    /// True if a `<plugin>` element declares these coordinates
    #[must_use]
    pub fn matches(&self, plugin: &Element) -> bool {
        plugin_matches(plugin, self.group_id, self.artifact_id)
    }
}

impl Display for PluginIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// Coordinate check against arbitrary strings
pub(crate) fn plugin_matches(plugin: &Element, group_id: &str, artifact_id: &str) -> bool {
    if !plugin.is_named("plugin") {
        return false;
    }
    let group = plugin
        .child_text("groupId")
        .unwrap_or_else(|| DEFAULT_PLUGIN_GROUP.to_string());
    group == group_id && plugin.child_text("artifactId").as_deref() == Some(artifact_id)
}
