//! Teller CLI
//!
//! Main entry point for the `teller` binary.

use std::process::ExitCode;

use clap::Parser;
use teller_common_config::{Environment, TellerConfig};
use teller_common_log::{LogConfig, LogFormat, LogLevel};
use tracing::error;

mod cli;
mod commands;
mod error;
mod output;

use cli::Cli;
use error::CliError;

/// Application exit codes
#[repr(u8)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    // .env must be loaded before clap reads env-backed flags.
    if let Err(e) = Environment::init() {
        eprintln!("warning: {e}");
    }

    let cli = Cli::parse();

    let ctx = cli.load_config();
    init_logging(&cli, ctx.as_ref().ok().map(|ctx| &ctx.config));

    let ctx = match ctx {
        Ok(ctx) => ctx,
        Err(e) => return report(&e),
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to start async runtime: {e}");
            return Exit::GeneralError.into();
        }
    };

    match runtime.block_on(cli.execute(ctx)) {
        Ok(()) => Exit::Success.into(),
        Err(e) => report(&e),
    }
}

fn report(e: &CliError) -> ExitCode {
    error!(code = e.code(), "{e}");
    if let Some(hint) = e.hint() {
        eprintln!("  hint: {hint}");
    }
    e.exit_code()
}

/// Flags beat `TELLER_LOG_*`, which beat the `log` config section.
fn init_logging(cli: &Cli, config: Option<&TellerConfig>) {
    let mut log = LogConfig::default();
    if let Some(config) = config {
        log.level = LogLevel::parse(&config.log.level).unwrap_or_default();
        log.format = LogFormat::parse(&config.log.format);
    }

    let mut log = log.with_env();
    if cli.verbose > 0 || cli.quiet {
        log.level = LogLevel::from_verbosity(cli.verbose, cli.quiet);
    }

    if let Err(e) = teller_common_log::init(log) {
        eprintln!("warning: {e}");
    }
}
