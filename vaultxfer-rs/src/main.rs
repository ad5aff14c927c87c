//! vaultxfer CLI entry point.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use vaultxfer::cli::args::{Cli, Commands};
use vaultxfer::cli::output::Output;
use vaultxfer::cli::transfer::Mode;
use vaultxfer::cli::{destinations, info, settings, transfer};
use vaultxfer::config::Settings;
use vaultxfer::error::{ExitCode as TransferExitCode, TransferError};
use vaultxfer::vault::Vault;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(code) => ExitCode::from(code.code() as u8),
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {}", e);
            }
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`/`-q`.
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vaultxfer={}", cli.log_level())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<TransferExitCode, TransferError> {
    let settings_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let mut config = Settings::load(&settings_path)?;

    let output = Output::new(cli.output_format(), cli.quiet);

    match &cli.command {
        Commands::Transfer(args) => {
            transfer::run(&config, args, Mode::Configured, &output, || open_source_vault(cli))
        }
        Commands::Copy(args) => {
            transfer::run(&config, args, Mode::Copy, &output, || open_source_vault(cli))
        }
        Commands::Move(args) => {
            transfer::run(&config, args, Mode::Move, &output, || open_source_vault(cli))
        }
        Commands::Destinations(command) => {
            destinations::run(&mut config, &settings_path, command, &output)
        }
        Commands::Settings(command) => settings::run(&mut config, &settings_path, command, &output),
        Commands::Info(args) => {
            let vault = open_source_vault(cli)?;
            info::info(&vault, &config, args.path.as_deref(), &output)
        }
    }
}

fn open_source_vault(cli: &Cli) -> Result<Vault, TransferError> {
    let root = match &cli.vault {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };
    Vault::new(root)
}
