//! Command line definition

use crate::logging::LogOptions;
use clap::builder::PossibleValuesParser;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use mvnhook_model::TestingFramework;
use std::path::PathBuf;

/// The `mvnhook` command
#[must_use]
pub fn build_cli() -> Command {
    Command::new("mvnhook")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Instrument Maven build descriptors with the SeaLights build plugin")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Write logs as JSON lines"),
        )
        .subcommand(
            discovery_args(Command::new("integrate"))
                .about("Inject the build plugin into every matching descriptor")
                .arg(
                    Arg::new("framework")
                        .long("framework")
                        .value_parser(PossibleValuesParser::new(
                            TestingFramework::ALL.map(TestingFramework::as_str),
                        ))
                        .help("Testing framework whose listener is registered"),
                )
                .arg(
                    Arg::new("no-backup")
                        .long("no-backup")
                        .action(ArgAction::SetTrue)
                        .help("Do not copy descriptors to <file>.slbak first"),
                )
                .arg(
                    Arg::new("app-name")
                        .long("app-name")
                        .help("Application name (overrides the settings file)"),
                )
                .arg(
                    Arg::new("branch-name")
                        .long("branch-name")
                        .help("Branch name (overrides the settings file)"),
                )
                .arg(
                    Arg::new("build-name")
                        .long("build-name")
                        .help("Build name (overrides the settings file)"),
                )
                .arg(
                    Arg::new("api-jar")
                        .long("api-jar")
                        .help("Agent jar; also wires the agent into the test runner"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the report as JSON"),
                ),
        )
        .subcommand(
            discovery_args(Command::new("restore"))
                .about("Copy <file>.slbak backups back over matching descriptors"),
        )
        .subcommand(
            Command::new("agent-args")
                .about("Print agent command line arguments for the [command] table")
                .arg(config_arg().required(true))
                .arg(
                    Arg::new("build-session-id")
                        .long("build-session-id")
                        .help("Build session id (overrides the settings file)"),
                ),
        )
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("TOML settings file")
}

fn discovery_args(command: Command) -> Command {
    command
        .arg(config_arg())
        .arg(
            Arg::new("folder")
                .long("folder")
                .short('f')
                .value_name("DIR")
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf))
                .help("Folder to search (repeatable)"),
        )
        .arg(
            Arg::new("pattern")
                .long("pattern")
                .short('p')
                .value_name("GLOBS")
                .help("Comma separated file name patterns [default: *pom.xml]"),
        )
        .arg(
            Arg::new("recursive")
                .long("recursive")
                .action(ArgAction::SetTrue)
                .conflicts_with("no-recursive")
                .help("Search folders recursively (default)"),
        )
        .arg(
            Arg::new("no-recursive")
                .long("no-recursive")
                .action(ArgAction::SetTrue)
                .help("Only look directly inside each folder"),
        )
}

impl LogOptions {
    /// Logging flags from parsed arguments
    #[must_use]
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            verbose: matches.get_flag("verbose"),
            json: matches.get_flag("log-json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let matches = build_cli()
            .try_get_matches_from(["mvnhook", "integrate", "--verbose", "--log-json"])
            .unwrap();
        let options = LogOptions::from_matches(&matches);
        assert!(options.verbose);
        assert!(options.json);
    }

    #[test]
    fn repeated_folders() {
        let matches = build_cli()
            .try_get_matches_from(["mvnhook", "integrate", "-f", "a", "--folder", "b"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        let folders: Vec<&PathBuf> = args.get_many::<PathBuf>("folder").unwrap().collect();
        assert_eq!(folders, vec![&PathBuf::from("a"), &PathBuf::from("b")]);
    }

    #[test]
    fn unknown_framework_is_rejected() {
        let result = build_cli().try_get_matches_from(["mvnhook", "integrate", "--framework", "spock"]);
        assert!(result.is_err());
    }

    #[test]
    fn recursive_flags_conflict() {
        let result = build_cli().try_get_matches_from([
            "mvnhook",
            "restore",
            "--recursive",
            "--no-recursive",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn agent_args_requires_config() {
        let result = build_cli().try_get_matches_from(["mvnhook", "agent-args"]);
        assert!(result.is_err());
    }
}
