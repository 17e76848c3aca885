//! pagebrief - web page summarizer with static-first extraction and browser escalation

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use pagebrief::cli::{CacheCommands, Cli, Commands};
use pagebrief::error::Result;

mod commands;

fn main() {
    init_logging();

    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(hint) = e.hint() {
            eprintln!("\n{}", hint.dimmed());
        }
        std::process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pagebrief=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract { url, file, json } => commands::cmd_extract(&url, file, json),
        Commands::Summarize { url, conversation, chat } => {
            commands::cmd_summarize(&url, conversation, chat)
        }
        Commands::Ask { message, conversation, chat } => {
            commands::cmd_ask(message, conversation, chat)
        }
        Commands::Cache(CacheCommands::Show { url, conversation, json }) => {
            commands::cmd_cache_show(&url, &conversation, json)
        }
        Commands::Config => commands::cmd_config(),
    }
}
