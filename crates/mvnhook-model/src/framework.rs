//! Testing framework selection

use crate::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Test framework whose events the agent listens to
///
/// `AutoDetect` registers no listener and leaves the choice to the build
/// plugin at build time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestingFramework {
    #[default]
    #[serde(rename = "auto-detect")]
    AutoDetect,
    #[serde(rename = "junit")]
    JUnit,
    #[serde(rename = "testng")]
    TestNG,
}

impl TestingFramework {
    /// All variants, in display order
    pub const ALL: [Self; 3] = [Self::AutoDetect, Self::JUnit, Self::TestNG];

    /// Listener class registered with the test runner, if any
    #[must_use]
    pub const fn listener_class(self) -> Option<&'static str> {
        match self {
            Self::AutoDetect => None,
            Self::JUnit => {
                Some("io.sealights.onpremise.agents.java.agent.integrations.junit.SlRunListener")
            }
            Self::TestNG => {
                Some("io.sealights.onpremise.agents.java.agent.integrations.testng.TestListener")
            }
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_auto_detect(self) -> bool {
        matches!(self, Self::AutoDetect)
    }

    /// Stable identifier used in settings files and on the command line
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AutoDetect => "auto-detect",
            Self::JUnit => "junit",
            Self::TestNG => "testng",
        }
    }
}

impl Display for TestingFramework {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestingFramework {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "auto-detect" | "autodetect" | "auto" => Ok(Self::AutoDetect),
            "junit" => Ok(Self::JUnit),
            "testng" => Ok(Self::TestNG),
            _ => Err(ModelError::unknown(
                "testing framework",
                s,
                "auto-detect, junit, testng",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_detect_has_no_listener() {
        assert_eq!(TestingFramework::AutoDetect.listener_class(), None);
        assert!(TestingFramework::AutoDetect.is_auto_detect());
    }

    #[test]
    fn concrete_frameworks_have_listeners() {
        assert!(TestingFramework::JUnit
            .listener_class()
            .unwrap()
            .ends_with("junit.SlRunListener"));
        assert!(TestingFramework::TestNG
            .listener_class()
            .unwrap()
            .ends_with("testng.TestListener"));
    }

    #[test]
    fn text_roundtrip() {
        for framework in TestingFramework::ALL {
            assert_eq!(framework.as_str().parse::<TestingFramework>().unwrap(), framework);
        }
        assert_eq!("JUnit".parse::<TestingFramework>().unwrap(), TestingFramework::JUnit);
        assert!("spock".parse::<TestingFramework>().is_err());
    }
}
