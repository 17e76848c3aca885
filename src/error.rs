use thiserror::Error;

#[derive(Error, Debug)]
pub enum PagebriefError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] ureq::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] refinery::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Browser render failed: {0}")]
    RenderFailed(String),

    #[error("Model request failed: {0}")]
    ModelFailed(String),

    #[error("Web search failed: {0}")]
    SearchFailed(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Notification failed: {0}")]
    NotificationError(String),
}

impl PagebriefError {
    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            PagebriefError::HttpError(_) | PagebriefError::FetchFailed(_) => Some(
                "Check your internet connection, or try:\n  pagebrief extract <url> --json"
            ),
            PagebriefError::RenderFailed(_) => Some(
                "Set PAGEBRIEF_RENDER_URL or PAGEBRIEF_RENDER_COMMAND to a working browser renderer"
            ),
            PagebriefError::ModelFailed(_) => Some(
                "Check ANTHROPIC_API_KEY, ANTHROPIC_BASE_URL and ANTHROPIC_AUTH"
            ),
            PagebriefError::ConfigError(_) => Some(
                "Run `pagebrief config` to see where configuration is read from"
            ),
            PagebriefError::DatabaseError(_)
            | PagebriefError::MigrationError(_)
            | PagebriefError::CacheError(_) => Some(
                "Point PAGEBRIEF_DB at a writable path, or delete the cache file to rebuild it"
            ),
            PagebriefError::NotificationError(_) => Some(
                "Check TELEGRAM_BOT_TOKEN and the chat id"
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PagebriefError>;
