//! Audiograph CLI
//!
//! Command-line interface for inspecting audio graph snapshots.

use clap::Parser;
use log::info;
use tracing_subscriber::EnvFilter;

use audiograph::cli::{commands, Cli, Commands};
use audiograph::{Config, Result};

fn main() {
    let cli = Cli::parse();

    // Initialize logger; RUST_LOG overrides the verbosity flag
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Audiograph v{}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = run(cli) {
        eprintln!("error [{}]: {}", err.error_code(), err);
        if let Some(suggestion) = err.recovery_suggestion() {
            eprintln!("hint: {}", suggestion);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Some(cmd) => handle_command(cmd, &config),
        None => {
            println!("Audiograph v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands, config: &Config) -> Result<()> {
    let output = match cmd {
        Commands::Types => commands::list_types(),
        Commands::Template { node_type } => commands::template(&node_type, config)?,
        Commands::Demo => commands::demo(config)?,
        Commands::Inspect { path } => commands::inspect(&path, config)?,
        Commands::Diff { prev, next } => commands::diff(&prev, &next, config)?,
    };
    println!("{}", output.trim_end());
    Ok(())
}
