//! Page commands: extract, summarize

use std::path::PathBuf;

use colored::Colorize;

use pagebrief::config::Config;
use pagebrief::error::Result;
use pagebrief::extract::{extract_page, ExtractionResult};
use pagebrief::fetch::{browser_headers, build_agent, Fetcher, HttpFetcher};
use pagebrief::normalize::truncate_chars;
use pagebrief::pipeline::{summarize_url, RequestContext, Services};
use pagebrief::scoring::Decision;

/// Characters of extracted text shown by `extract`
const PREVIEW_CHARS: usize = 500;

/// Dry-run the static pipeline: fetch (or read), extract, score
pub fn cmd_extract(url: &str, file: Option<PathBuf>, json: bool) -> Result<()> {
    let html = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let config = Config::load()?;
            let timeout = config.timeouts.fetch();
            let body = HttpFetcher::new(build_agent(timeout)).fetch(url, &browser_headers(), timeout)?;
            String::from_utf8_lossy(&body).into_owned()
        }
    };

    let result = extract_page(&html);

    if json {
        let output = serde_json::json!({
            "url": url,
            "extraction": result,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_extraction(url, &html, &result);
    Ok(())
}

fn print_extraction(url: &str, html: &str, result: &ExtractionResult) {
    println!("\n{} {}", "Page".cyan().bold(), url);
    println!("  {} {} bytes of HTML", "✓".green(), html.len());
    println!("  Title: {}", result.title.as_deref().unwrap_or("(none)"));

    let meta = &result.metadata;
    for (label, value) in [
        ("Description", &meta.description),
        ("Author", &meta.author),
        ("Site", &meta.site_name),
        ("Published", &meta.published_time),
    ] {
        if let Some(value) = value {
            println!("  {}: {}", label, value);
        }
    }

    let sources = if result.sources.is_empty() {
        "(none)".to_string()
    } else {
        result.source_labels().join(", ")
    };
    println!("  Sources: {}", sources);

    let decision = match result.decision {
        Decision::Sufficient => result.decision.to_string().green(),
        Decision::Insufficient => result.decision.to_string().yellow(),
        Decision::Unprocessable => result.decision.to_string().red(),
    };
    println!("  Score: {} ({})", result.quality_score, decision);
    println!("  {}", result.rationale.dimmed());

    println!("\n{}", "─".repeat(60).dimmed());
    let total = result.text.chars().count();
    println!("{}", truncate_chars(&result.text, PREVIEW_CHARS));
    if total > PREVIEW_CHARS {
        println!(
            "\n{}",
            format!("... truncated ({} chars total, showing {})", total, PREVIEW_CHARS).dimmed()
        );
    }
    println!("{}", "─".repeat(60).dimmed());
}

/// Summarize one URL through the full pipeline
pub fn cmd_summarize(url: &str, conversation: String, chat: Option<String>) -> Result<()> {
    let services = Services::from_config(Config::load()?)?;
    let mut ctx = RequestContext::new(conversation);
    ctx.chat_id = chat;

    let summary = summarize_url(&services, &ctx, url);
    println!("{}", summary);
    Ok(())
}
