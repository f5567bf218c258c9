//! Testing utilities for mvnhook workspace
//!
//! Sample descriptors, settings builders and temporary workspaces.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use mvnhook_model::{GlobalSettings, PluginSettings};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Pretty-printed project with a top-level build section
pub const PLAIN_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
    <modelVersion>4.0.0</modelVersion>
    <groupId>com.acme</groupId>
    <artifactId>shop</artifactId>
    <version>1.0.0</version>
    <build>
        <plugins>
            <plugin>
                <groupId>org.apache.maven.plugins</groupId>
                <artifactId>maven-compiler-plugin</artifactId>
                <version>3.11.0</version>
            </plugin>
        </plugins>
    </build>
</project>
"#;

/// Project without any build section and with two profiles, one of them
/// already carrying a build
pub const PROFILES_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project>
  <modelVersion>4.0.0</modelVersion>
  <artifactId>profiled</artifactId>
  <profiles>
    <profile>
      <id>ci</id>
      <build>
        <plugins>
          <plugin>
            <artifactId>maven-jar-plugin</artifactId>
          </plugin>
        </plugins>
      </build>
    </profile>
    <profile>
      <id>release</id>
    </profile>
  </profiles>
</project>
"#;

/// Project already carrying the instrumentation plugin inside one profile
pub const INSTRUMENTED_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project>
  <modelVersion>4.0.0</modelVersion>
  <artifactId>done</artifactId>
  <profiles>
    <profile>
      <id>ci</id>
      <build>
        <plugins>
          <plugin>
            <groupId>io.sealights.on-premise.agents.plugin</groupId>
            <artifactId>sealights-maven-plugin</artifactId>
            <version>1.0.0</version>
          </plugin>
        </plugins>
      </build>
    </profile>
    <profile>
      <id>other</id>
    </profile>
  </profiles>
</project>
"#;

/// Project whose build declares the test runner without a group id
pub const SUREFIRE_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project>
  <modelVersion>4.0.0</modelVersion>
  <artifactId>tested</artifactId>
  <build>
    <plugins>
      <plugin>
        <artifactId>maven-surefire-plugin</artifactId>
        <version>2.22.2</version>
        <configuration>
          <argLine>-Xmx512m</argLine>
          <properties>
            <property>
              <name>listener</name>
              <value>com.acme.OldListener</value>
            </property>
          </properties>
        </configuration>
      </plugin>
    </plugins>
  </build>
</project>
"#;

/// Test runner older than 2.9
pub const OLD_SUREFIRE_POM: &str = r#"<project>
  <artifactId>legacy</artifactId>
  <build>
    <plugins>
      <plugin>
        <groupId>org.apache.maven.plugins</groupId>
        <artifactId>maven-surefire-plugin</artifactId>
        <version>2.4.3</version>
      </plugin>
    </plugins>
  </build>
</project>
"#;

/// Well-formed XML that is not a Maven project
pub const NOT_A_PROJECT: &str = "<settings>\n  <localRepository>/tmp/m2</localRepository>\n</settings>\n";

/// Mismatched closing tag
pub const MALFORMED_POM: &str = "<project>\n  <build>\n    <plugins>\n  </build>\n</project>\n";

/// Settings with every identity and naming field filled in
pub fn full_settings() -> PluginSettings {
    let mut settings = PluginSettings::new()
        .with_app_name("shop")
        .with_module_name("web")
        .with_branch_name("main");
    settings.build_name = Some("42".to_string());
    settings.workspace_path = Some("/work/shop".to_string());
    settings.packages_included = Some("com.acme.*".to_string());
    settings.scanner_jar = Some("/tmp/sl/build-scanner.jar".to_string());
    settings.listener_jar = Some("/tmp/sl/test-listener.jar".to_string());
    settings.environment = Some("ci".to_string());
    settings
}

/// Settings with an agent jar, which turns on test runner wiring
pub fn agent_settings() -> PluginSettings {
    PluginSettings::new()
        .with_app_name("shop")
        .with_api_jar("/tmp/sl/sl-test-listener.jar")
}

/// Global identity defaults
pub fn global_settings() -> GlobalSettings {
    GlobalSettings::new()
        .with_customer_id("acme")
        .with_server_url("https://acme.sealights.co/api")
}

/// Temporary directory populated with descriptor files
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to a path relative to the workspace root
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, contents).expect("write fixture");
        path
    }

    pub fn read(&self, path: &Path) -> String {
        std::fs::read_to_string(path).expect("read fixture")
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Occurrences of `needle` in `haystack`
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
