use colored::Colorize;

use pagebrief::cache::{SqliteCache, SummaryCache};
use pagebrief::error::Result;

/// Print the cached summary for a URL
pub fn cmd_cache_show(url: &str, conversation: &str, json: bool) -> Result<()> {
    let cache = SqliteCache::open()?;

    let Some(entry) = cache.get(conversation, url)? else {
        if json {
            println!("null");
        } else {
            println!("No cached summary for {} in conversation '{}'.", url, conversation);
            let stored = cache.count_for_conversation(conversation)?;
            println!("  {} other page(s) cached in this conversation.", stored);
        }
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    println!("\n{} {}", "Cached".cyan().bold(), entry.url);
    println!("  Conversation: {}", entry.conversation_id);
    println!("  Title: {}", entry.title.as_deref().unwrap_or("(none)"));
    println!("  Cached at: {}", entry.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if let Some(hash) = &entry.content_hash {
        println!("  Hash: {}", short_hash(hash));
    }
    if let Some(raw) = &entry.raw_content {
        println!("  Raw content: {} chars", raw.chars().count());
    }
    println!(
        "  Conversation total: {} page(s)",
        cache.count_for_conversation(conversation)?
    );
    println!("\n{}", entry.summary);
    Ok(())
}

/// First 16 characters of a content hash
fn short_hash(hash: &str) -> String {
    hash.chars().take(16).collect()
}
