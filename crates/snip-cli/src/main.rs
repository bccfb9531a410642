//! `snip` command line

mod cli;
mod config;

use config::CliConfig;
use snip_erase::{erase, EraseError, EraseOptions, EXIT_FAILURE};
use snip_object::FsRepository;
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let matches = cli::command().get_matches();
    let globals = cli::global_args(&matches);

    let config = match globals.config.as_deref().map(CliConfig::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("snip: {e:#}");
            return exit(EXIT_FAILURE);
        }
    };
    init_logging(globals.verbose, config.log.level.as_deref());

    match matches.subcommand() {
        Some(("erase", args)) => {
            let options = cli::erase_options(args);
            match config.repository(globals.repo.as_deref()) {
                Ok(repo) => run_erase(&repo, &options),
                Err(e) => {
                    eprintln!("snip: {e:#}");
                    exit(EXIT_FAILURE)
                }
            }
        }
        _ => exit(EXIT_FAILURE),
    }
}

fn run_erase(repo: &Path, options: &EraseOptions) -> ExitCode {
    let repository = match FsRepository::open(repo) {
        Ok(repository) => repository,
        Err(e) => {
            debug!("{e:?}");
            eprintln!("snip: cannot open repository: {e}");
            return exit(EXIT_FAILURE);
        }
    };
    match erase(&repository, options) {
        Ok(outcome) => {
            println!("new snapshot {}", outcome.snapshot);
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn report(e: &EraseError) -> ExitCode {
    debug!("{e:?}");
    eprintln!("snip: {e}");
    exit(e.exit_code())
}

fn exit(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

/// `RUST_LOG` if set, else the `-v` count, else the configured level
fn init_logging(verbose: u8, configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbose {
            0 => configured.unwrap_or("warn"),
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::new(level)
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
