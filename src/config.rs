use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{PagebriefError, Result};
use crate::messages::Locale;

/// Global pagebrief configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model endpoint and credentials
    #[serde(default)]
    pub model: ModelConfig,

    /// Heavy browser renderer used for escalation (None disables escalation)
    #[serde(default)]
    pub render: Option<RenderTarget>,

    /// Telegram bot token for best-effort user notices
    #[serde(default)]
    pub telegram_bot_token: Option<String>,

    /// Language of prompts, notices and refusals
    #[serde(default)]
    pub locale: Locale,

    /// UTC offset used for the date line in the agent system prompt
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,

    /// Hard cap on model round-trips in one agent run
    #[serde(default = "default_max_rounds")]
    pub max_agent_rounds: usize,

    #[serde(default)]
    pub timeouts: Timeouts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `x-api-key` header
    #[default]
    ApiKey,
    /// `Authorization: Bearer` header, for gateways in front of the API
    Bearer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub auth: AuthScheme,
    /// Token budget for agent turns
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Token budget for page summaries
    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: u32,
}

/// Where the browser renderer lives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderTarget {
    /// POST `{"url": ...}` to an HTTP endpoint
    Http { url: String },
    /// Run a command with the URL as its last argument; JSON on stdout
    Command { command: String },
}

/// Per-collaborator timeouts in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeouts {
    #[serde(default = "default_fetch_secs")]
    pub fetch_secs: u64,
    #[serde(default = "default_model_secs")]
    pub model_secs: u64,
    #[serde(default = "default_render_secs")]
    pub render_secs: u64,
    #[serde(default = "default_notify_secs")]
    pub notify_secs: u64,
    #[serde(default = "default_search_secs")]
    pub search_secs: u64,
    #[serde(default = "default_download_secs")]
    pub download_secs: u64,
}

impl Timeouts {
    pub fn fetch(&self) -> Duration {
        Duration::from_secs(self.fetch_secs)
    }
    pub fn model(&self) -> Duration {
        Duration::from_secs(self.model_secs)
    }
    pub fn render(&self) -> Duration {
        Duration::from_secs(self.render_secs)
    }
    pub fn notify(&self) -> Duration {
        Duration::from_secs(self.notify_secs)
    }
    pub fn search(&self) -> Duration {
        Duration::from_secs(self.search_secs)
    }
    pub fn download(&self) -> Duration {
        Duration::from_secs(self.download_secs)
    }
}

fn default_utc_offset() -> i32 {
    8
}

fn default_max_rounds() -> usize {
    8
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_summary_max_tokens() -> u32 {
    1500
}

fn default_fetch_secs() -> u64 {
    15
}

fn default_model_secs() -> u64 {
    120
}

fn default_render_secs() -> u64 {
    90
}

fn default_notify_secs() -> u64 {
    10
}

fn default_search_secs() -> u64 {
    10
}

fn default_download_secs() -> u64 {
    60
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_model(),
            auth: AuthScheme::default(),
            max_tokens: default_max_tokens(),
            summary_max_tokens: default_summary_max_tokens(),
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            fetch_secs: default_fetch_secs(),
            model_secs: default_model_secs(),
            render_secs: default_render_secs(),
            notify_secs: default_notify_secs(),
            search_secs: default_search_secs(),
            download_secs: default_download_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            render: None,
            telegram_bot_token: None,
            locale: Locale::default(),
            utc_offset_hours: default_utc_offset(),
            max_agent_rounds: default_max_rounds(),
            timeouts: Timeouts::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override fields from environment-style lookups
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("ANTHROPIC_API_KEY") {
            self.model.api_key = Some(key);
        }
        if let Some(base) = get("ANTHROPIC_BASE_URL") {
            self.model.base_url = Some(base);
        }
        if let Some(model) = get("ANTHROPIC_MODEL") {
            self.model.model = model;
        }
        if let Some(auth) = get("ANTHROPIC_AUTH") {
            self.model.auth = match auth.to_lowercase().as_str() {
                "api_key" | "x-api-key" => AuthScheme::ApiKey,
                "bearer" => AuthScheme::Bearer,
                other => {
                    return Err(PagebriefError::ConfigError(format!(
                        "Unknown ANTHROPIC_AUTH '{}'. Use api_key or bearer",
                        other
                    )))
                }
            };
        }
        if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
            self.telegram_bot_token = Some(token);
        }
        if let Some(url) = get("PAGEBRIEF_RENDER_URL") {
            self.render = Some(RenderTarget::Http { url });
        } else if let Some(command) = get("PAGEBRIEF_RENDER_COMMAND") {
            self.render = Some(RenderTarget::Command { command });
        }
        if let Some(locale) = get("PAGEBRIEF_LOCALE") {
            self.locale = locale.parse()?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "pagebrief").ok_or_else(|| {
            PagebriefError::ConfigError("Could not determine config directory".into())
        })?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "pagebrief").ok_or_else(|| {
            PagebriefError::ConfigError("Could not determine data directory".into())
        })?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Get the summary cache database path
    ///
    /// Supports PAGEBRIEF_DB environment variable for test isolation
    pub fn db_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("PAGEBRIEF_DB") {
            return Ok(PathBuf::from(path));
        }
        Ok(Self::data_dir()?.join("summaries.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_agent_rounds, 8);
        assert_eq!(config.utc_offset_hours, 8);
        assert_eq!(config.timeouts.fetch_secs, 15);
        assert!(config.render.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("ANTHROPIC_API_KEY", "sk-test"),
                ("ANTHROPIC_AUTH", "bearer"),
                ("PAGEBRIEF_RENDER_URL", "http://render.local/invoke"),
                ("PAGEBRIEF_LOCALE", "zh-tw"),
            ]))
            .unwrap();

        assert_eq!(config.model.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.model.auth, AuthScheme::Bearer);
        assert_eq!(
            config.render,
            Some(RenderTarget::Http { url: "http://render.local/invoke".into() })
        );
        assert_eq!(config.locale, Locale::ZhTw);
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[("PAGEBRIEF_RENDER_URL", "  ")])).unwrap();
        assert!(config.render.is_none());
    }

    #[test]
    fn test_unknown_auth_rejected() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[("ANTHROPIC_AUTH", "basic")]));
        assert!(matches!(err, Err(PagebriefError::ConfigError(_))));
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
            locale = "en"
            max_agent_rounds = 3

            [render]
            type = "command"
            command = "node render.mjs"

            [model]
            model = "claude-test"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_agent_rounds, 3);
        assert_eq!(config.model.model, "claude-test");
        assert_eq!(config.model.max_tokens, 2000);
        assert!(matches!(config.render, Some(RenderTarget::Command { .. })));
    }
}
