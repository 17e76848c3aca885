//! Miscellaneous commands: config

use colored::Colorize;

use pagebrief::config::{Config, RenderTarget};
use pagebrief::error::Result;

/// Show effective configuration
pub fn cmd_config() -> Result<()> {
    let config = Config::load()?;

    println!("\n{}\n", "pagebrief configuration".bold());
    if let Ok(path) = Config::config_path() {
        let status = if path.exists() { "" } else { " (not present, using defaults)" };
        println!("  Config file: {}{}", path.display(), status.dimmed());
    }
    if let Ok(path) = Config::db_path() {
        println!("  Cache db:    {}", path.display());
    }

    println!("\n  Model:       {}", config.model.model);
    println!(
        "  Endpoint:    {}",
        config.model.base_url.as_deref().unwrap_or("https://api.anthropic.com")
    );
    println!("  Auth:        {:?}", config.model.auth);
    println!("  API key:     {}", mask_secret(config.model.api_key.as_deref()));

    let render = match &config.render {
        Some(RenderTarget::Http { url }) => format!("http {}", url),
        Some(RenderTarget::Command { command }) => format!("command `{}`", command),
        None => "disabled (no escalation)".to_string(),
    };
    println!("  Renderer:    {}", render);
    println!("  Telegram:    {}", mask_secret(config.telegram_bot_token.as_deref()));

    println!("\n  Locale:      {:?}", config.locale);
    println!("  UTC offset:  {:+}h", config.utc_offset_hours);
    println!("  Max rounds:  {}", config.max_agent_rounds);

    let t = &config.timeouts;
    println!(
        "  Timeouts:    fetch {}s, model {}s, render {}s, notify {}s, search {}s, download {}s",
        t.fetch_secs, t.model_secs, t.render_secs, t.notify_secs, t.search_secs, t.download_secs
    );

    Ok(())
}

/// Show only the first four characters of a secret
fn mask_secret(secret: Option<&str>) -> String {
    match secret {
        None => "(not set)".to_string(),
        Some(s) if s.chars().count() <= 8 => "****".to_string(),
        Some(s) => format!("{}****", s.chars().take(4).collect::<String>()),
    }
}
