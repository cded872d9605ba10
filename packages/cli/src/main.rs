mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{conditions, validate, ConditionsArgs, ValidateArgs};
use std::path::PathBuf;

/// Marble CLI - offline checks for scenario rule expressions
#[derive(Parser, Debug)]
#[command(name = "marble")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log editor activity (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the trigger and every rule of an iteration file
    Validate(ValidateArgs),

    /// Print the where/and/or clauses of the trigger or a rule
    Conditions(ConditionsArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let result = match cli.command {
        Command::Validate(args) => validate(args, &cwd),
        Command::Conditions(args) => conditions(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
