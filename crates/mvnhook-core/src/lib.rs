//! mvnhook Core
//!
//! The descriptor instrumentation engine:
//! - Builds the plugin configuration from a settings bag
//! - Backs up descriptors before they change
//! - Injects the plugin into the top-level build and every profile
//! - Wires the agent into the test runner when an agent jar is configured
//! - Isolates failures per file and reports every outcome
//!
//! # Example
//!
//! ```rust,no_run
//! use mvnhook_core::{DescriptorFileRef, IntegrateOptions, IntegrationInfo, Integrator};
//! use mvnhook_model::{GlobalSettings, PluginSettings, TestingFramework};
//!
//! let info = IntegrationInfo::new(
//!     vec![DescriptorFileRef::new("pom.xml")],
//!     PluginSettings::new().with_app_name("shop"),
//! )
//! .with_global(GlobalSettings::new().with_customer_id("acme"))
//! .with_framework(TestingFramework::JUnit);
//!
//! let report = Integrator::new(info, IntegrateOptions::default()).integrate();
//! println!("{report}");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod backup;
pub mod error;
pub mod integration;
pub mod payload;
pub mod report;

pub use backup::{backup, backup_path, restore, BackupRecord, BACKUP_SUFFIX};
pub use error::{BackupError, IntegrationError, ValidationError};
pub use integration::{DescriptorFileRef, IntegrateOptions, IntegrationInfo, Integrator};
pub use payload::{
    package_exclusions, ConfigFragment, Execution, DEFAULT_PACKAGE_EXCLUSIONS, EXECUTIONS,
    PLUGIN_VERSION,
};
pub use report::{BatchReport, FileOutcome, FileStatus};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running an instrumentation pass
    pub use crate::{
        BatchReport, DescriptorFileRef, FileStatus, IntegrateOptions, IntegrationInfo, Integrator,
    };
    pub use mvnhook_model::{GlobalSettings, PluginSettings, TestingFramework};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
