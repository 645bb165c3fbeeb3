//! Quest Authoring Studio CLI.

use clap::Parser;
use tracing::level_filters::LevelFilter;

use quest_cli::cli::{Cli, LogFormatArg};
use quest_cli::commands;
use quest_cli::logging::{LogConfig, LogFormat, init_logging};

fn main() {
    let cli = Cli::parse();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match commands::run(&cli.command, &cli.workspace, &cli.user) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter: LevelFilter = cli.verbosity.tracing_level_filter();
    LogConfig {
        level_filter,
        format: match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        },
        log_file: cli.log_file.clone(),
        with_ansi: cli.log_file.is_none(),
    }
}
