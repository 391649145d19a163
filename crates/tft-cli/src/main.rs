use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tft_cli::cli::{Cli, Commands};
use tft_cli::config::{load_tft_config, TftConfig};
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

mod commands;

use crate::commands::{completions, ct, report, short_circuit};

fn init_logging(cli: &Cli, config: Option<&TftConfig>) {
    let level = cli
        .log_level
        .or_else(|| config.and_then(|c| c.logging.level().ok()))
        .unwrap_or(tracing::Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn run(command: &Commands, config: &TftConfig) -> Result<()> {
    match command {
        Commands::ShortCircuit { args, format } => short_circuit::handle(args, *format),
        Commands::Ct { command } => ct::handle(command, config),
        Commands::Report { args } => report::handle(args, config),
        Commands::Completions { shell, out } => completions::handle(*shell, out.as_deref()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = load_tft_config(cli.config.as_deref());
    init_logging(&cli, config.as_ref().ok());

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            return ExitCode::FAILURE;
        }
    };
    if let (None, Err(e)) = (cli.log_level, config.logging.level()) {
        warn!("{e}; logging at info");
    }

    let Some(command) = &cli.command else {
        info!("No subcommand provided. Use `tft --help` for more information.");
        return ExitCode::SUCCESS;
    };

    match run(command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {:?}", e);
            ExitCode::FAILURE
        }
    }
}
