//! Subcommand handlers

use crate::config::{CliConfig, DiscoveryConfig};
use crate::locator::DescriptorLocator;
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use mvnhook_core::{
    BackupError, BatchReport, DescriptorFileRef, IntegrateOptions, IntegrationInfo, Integrator,
};
use mvnhook_model::{PluginSettings, TestingFramework};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Dispatch a parsed command line
///
/// # Errors
/// Returns an error for problems found before any file is touched:
/// unreadable settings, invalid patterns or missing `[command]` table.
pub fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("integrate", args)) => integrate(args),
        Some(("restore", args)) => restore(args),
        Some(("agent-args", args)) => agent_args(args),
        Some((other, _)) => Err(anyhow!("unknown command '{other}'")),
        None => Err(anyhow!("no command given")),
    }
}

fn integrate(args: &ArgMatches) -> Result<()> {
    let mut config = load_config(args)?;
    apply_discovery_overrides(&mut config.discovery, args);

    if let Some(framework) = args.get_one::<String>("framework") {
        config.testing_framework = framework.parse::<TestingFramework>()?;
    }
    if args.get_flag("no-backup") {
        config.backup = false;
    }
    let settings = &mut config.settings;
    for (flag, field) in [
        ("app-name", &mut settings.app_name),
        ("branch-name", &mut settings.branch_name),
        ("build-name", &mut settings.build_name),
        ("api-jar", &mut settings.api_jar),
    ] {
        if let Some(value) = args.get_one::<String>(flag) {
            *field = Some(value.clone());
        }
    }
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    default_workspace_path(&mut config.settings, &cwd);
    debug!(settings = ?config.settings, global = ?config.global, "effective settings");

    let files = locate(&config.discovery)?;
    if files.is_empty() {
        warn!(patterns = %config.discovery.patterns, "no descriptor files found");
    }

    let info = IntegrationInfo::new(
        files.into_iter().map(DescriptorFileRef::from).collect(),
        config.settings,
    )
    .with_global(config.global)
    .with_framework(config.testing_framework);
    let report = Integrator::new(
        info,
        IntegrateOptions {
            backup: config.backup,
        },
    )
    .integrate();

    if args.get_flag("json") {
        println!("{}", report.to_json().context("cannot render report")?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn restore(args: &ArgMatches) -> Result<()> {
    let mut config = load_config(args)?;
    apply_discovery_overrides(&mut config.discovery, args);

    let mut restored = 0;
    for path in locate(&config.discovery)? {
        match mvnhook_core::restore(&path) {
            Ok(record) => {
                info!(path = %path.display(), bytes = record.bytes, "restored");
                println!("restored  {}", path.display());
                restored += 1;
            }
            Err(BackupError::Missing(backup)) => {
                debug!(path = %path.display(), backup = %backup.display(), "no backup");
            }
            Err(e) => error!(path = %path.display(), error = %e, "restore failed"),
        }
    }
    println!("{restored} file(s) restored");
    Ok(())
}

fn agent_args(args: &ArgMatches) -> Result<()> {
    let config = load_config(args)?;
    let mut invocation = config
        .command
        .ok_or_else(|| anyhow!("settings file has no [command] table"))?;
    if let Some(id) = args.get_one::<String>("build-session-id") {
        invocation.build_session_id = Some(id.clone());
    }
    info!(mode = invocation.mode.display_name(), "agent command");
    println!("{}", invocation.to_arguments().join(" "));
    Ok(())
}

fn load_config(args: &ArgMatches) -> Result<CliConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => Ok(CliConfig::load(path)?),
        None => Ok(CliConfig::default()),
    }
}

fn apply_discovery_overrides(discovery: &mut DiscoveryConfig, args: &ArgMatches) {
    if let Some(folders) = args.get_many::<PathBuf>("folder") {
        discovery.folders = folders.cloned().collect();
    }
    if let Some(patterns) = args.get_one::<String>("pattern") {
        discovery.patterns.clone_from(patterns);
    }
    if args.get_flag("recursive") {
        discovery.recursive = true;
    } else if args.get_flag("no-recursive") {
        discovery.recursive = false;
    }
}

/// Unset or empty workspace path becomes the working directory
fn default_workspace_path(settings: &mut PluginSettings, cwd: &Path) {
    if settings.workspace_path.as_deref().map_or(true, str::is_empty) {
        settings.workspace_path = Some(cwd.display().to_string());
    }
}

fn locate(discovery: &DiscoveryConfig) -> Result<Vec<PathBuf>> {
    let locator = DescriptorLocator::new(&discovery.patterns, discovery.recursive)
        .context("cannot start discovery")?;
    Ok(locator.locate(&discovery.folders))
}

fn print_report(report: &BatchReport) {
    for outcome in &report.outcomes {
        match &outcome.detail {
            Some(detail) => println!(
                "{:<22} {} ({detail})",
                outcome.status,
                outcome.path.display()
            ),
            None => println!("{:<22} {}", outcome.status, outcome.path.display()),
        }
    }
    println!("{report}");
}
