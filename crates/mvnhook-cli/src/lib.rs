//! mvnhook CLI
//!
//! Command line front end for the instrumentation engine:
//! - `integrate`: locate descriptors and inject the build plugin
//! - `restore`: put `<file>.slbak` backups back in place
//! - `agent-args`: print the agent command line for a configured mode
//!
//! Settings come from a TOML file (see [`config`]); flags override it.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod locator;
pub mod logging;

pub use cli::build_cli;
pub use commands::run;
pub use config::{CliConfig, DiscoveryConfig, SettingsError};
pub use locator::{DescriptorLocator, DiscoveryError, DEFAULT_PATTERN};
pub use logging::{init_tracing, LogOptions};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
