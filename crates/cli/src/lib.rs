pub mod commands;
pub mod logging;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "coffre",
    about = "Coffre operator CLI",
    long_about = "Run the Discord chat-log listener, inspect configuration, and check gateway readiness.",
    after_help = "Examples:\n  coffre listen\n  coffre doctor --json\n  coffre parse \"**Bob** a déposé 5x Tomate\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Connect to Discord and forward log-channel events to the gateway")]
    Listen,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, ledger and inventory files, roster and listener readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Run the chat-log parser on one message and print the extracted event")]
    Parse {
        #[arg(help = "Embed description as posted in a log channel")]
        text: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Listen => commands::listen::run(),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Parse { text } => commands::parse::run(&text),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
