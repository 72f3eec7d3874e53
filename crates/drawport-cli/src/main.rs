use std::process::ExitCode;

use clap::Parser;
use log::{LevelFilter, debug, error, info, warn};

use drawport::pipeline::{EXIT_OK, EXIT_SETUP_FAILED};
use drawport_cli::{Args, CliError, ErrorAdapter};

fn main() -> ExitCode {
    miette::set_panic_hook();

    let args = Args::parse();
    init_logging(&args.log_level);
    debug!(args:?; "Parsed arguments");

    let code = match drawport_cli::run(&args) {
        Ok(code) => code,
        Err(err) => {
            error!("{}", render(&err));
            EXIT_SETUP_FAILED
        }
    };

    if code == EXIT_OK {
        info!("Done");
    } else {
        warn!(exit_code = code; "Finished with errors");
    }
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn init_logging(level: &str) {
    let filter = level.parse::<LevelFilter>().unwrap_or_else(|_| {
        eprintln!("Unknown log level '{level}', logging at info");
        LevelFilter::Info
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(filter)
        .init();
}

/// Format `err` as a miette report, or plain text if rendering fails.
fn render(err: &CliError) -> String {
    let mut report = String::new();
    match miette::GraphicalReportHandler::new().render_report(&mut report, &ErrorAdapter(err)) {
        Ok(()) => report,
        Err(_) => err.to_string(),
    }
}
