use mvnhook_cli::{build_cli, init_tracing, run, LogOptions};
use std::process::ExitCode;

fn main() -> ExitCode {
    let matches = build_cli().get_matches();

    if let Err(e) = init_tracing(LogOptions::from_matches(&matches)) {
        eprintln!("warning: logging unavailable: {e}");
    }

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
