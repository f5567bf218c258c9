//! mvnhook Model
//!
//! Plain data types shared by the instrumentation engine and its front ends.
//!
//! # Core Concepts
//!
//! - [`PluginSettings`]: the per-invocation settings bag
//! - [`GlobalSettings`]: process-wide identity defaults
//! - [`TestingFramework`]: which test listener the build should register
//! - [`CommandInvocation`] / [`CommandMode`]: agent command modes
//!
//! # Example
//!
//! ```rust
//! use mvnhook_model::{GlobalSettings, PluginSettings};
//!
//! let global = GlobalSettings::new().with_customer_id("acme");
//! let settings = PluginSettings::new().with_app_name("shop");
//!
//! let identity = settings.resolve_identity(&global);
//! assert_eq!(identity.customer_id.as_deref(), Some("acme"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod command;
mod framework;
mod settings;

pub use command::{CommandInvocation, CommandMode, ConfigFields, TechnologyOptions};
pub use framework::TestingFramework;
pub use settings::{
    is_set, resolve, BuildStrategy, GlobalSettings, Identity, LogDestination, LogLevel,
    PluginSettings,
};

/// Errors produced when converting text into model values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Text did not name any variant of the target enum
    #[error("unknown {kind}: '{value}' (expected one of: {expected})")]
    UnknownVariant {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl ModelError {
    pub(crate) fn unknown(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
