pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "orderdesk",
    about = "Orderdesk operator CLI",
    long_about = "Provision the local lookup store, load demo data, and inspect configuration.",
    after_help = "Examples:\n  orderdesk migrate\n  orderdesk seed\n  orderdesk config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Create the customers/orders schema in the configured SQLite store")]
    Migrate,
    #[command(about = "Replace store contents with the deterministic demo dataset and verify it")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
