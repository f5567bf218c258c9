//! Tracing setup for the binary
//!
//! Logs go to stderr so stdout carries only the report.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How logs are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Force `debug` regardless of `RUST_LOG`
    pub verbose: bool,
    /// One JSON object per line
    pub json: bool,
}

impl LogOptions {
    /// Filter used when `RUST_LOG` is not set
    #[must_use]
    pub const fn default_directive(self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    fn filter(self) -> EnvFilter {
        if self.verbose {
            return EnvFilter::new(self.default_directive());
        }
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

/// Install the global subscriber
///
/// # Errors
/// Returns an error if a global subscriber is already installed
pub fn init_tracing(options: LogOptions) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = options.filter();
    if options.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_means_debug() {
        assert_eq!(LogOptions::default().default_directive(), "info");
        let options = LogOptions {
            verbose: true,
            json: false,
        };
        assert_eq!(options.default_directive(), "debug");
    }
}
