use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Conversation id used when none is given
pub const DEFAULT_CONVERSATION: &str = "cli";

#[derive(Parser)]
#[command(name = "pagebrief")]
#[command(author, version, about = "Summarize web pages, escalating to a browser only when static HTML falls short", long_about = None)]
#[command(after_help = r#"Examples:
  pagebrief extract https://example.com/post            Score a page without summarizing
  pagebrief extract https://example.com --file page.html --json
  pagebrief summarize https://example.com/post          Summarize (cached per conversation)
  pagebrief ask "https://example.com/post"              Chat with tools
  pagebrief cache show https://example.com/post         Inspect a cached summary
  pagebrief config                                      Show effective configuration
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run static extraction and scoring on a page (no model call)
    Extract {
        /// Page URL
        url: String,

        /// Read HTML from this file instead of fetching the URL
        #[arg(long)]
        file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize a page, escalating to the browser renderer when needed
    Summarize {
        /// Page URL
        url: String,

        /// Conversation the summary is cached under
        #[arg(long, default_value = DEFAULT_CONVERSATION)]
        conversation: String,

        /// Telegram chat to send progress notices to
        #[arg(long)]
        chat: Option<String>,
    },

    /// Send one message through the tool-use agent
    Ask {
        /// Message text
        message: String,

        /// Conversation the agent's summaries are cached under
        #[arg(long, default_value = DEFAULT_CONVERSATION)]
        conversation: String,

        /// Telegram chat to send progress notices to
        #[arg(long)]
        chat: Option<String>,
    },

    /// Inspect the summary cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Show effective configuration (secrets masked)
    Config,
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show the cached summary for a URL
    Show {
        /// Page URL
        url: String,

        #[arg(long, default_value = DEFAULT_CONVERSATION)]
        conversation: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_summarize_defaults() {
        let cli = Cli::parse_from(["pagebrief", "summarize", "https://a.b"]);
        match cli.command {
            Commands::Summarize { url, conversation, chat } => {
                assert_eq!(url, "https://a.b");
                assert_eq!(conversation, DEFAULT_CONVERSATION);
                assert!(chat.is_none());
            }
            _ => panic!("expected summarize"),
        }
    }

    #[test]
    fn test_parse_cache_show() {
        let cli = Cli::parse_from(["pagebrief", "cache", "show", "https://a.b", "--conversation", "42"]);
        assert!(matches!(
            cli.command,
            Commands::Cache(CacheCommands::Show { ref conversation, .. }) if conversation == "42"
        ));
    }
}
