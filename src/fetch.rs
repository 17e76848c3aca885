use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::error::{PagebriefError, Result};

/// Largest page body read into memory
const MAX_PAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Headers a desktop Chrome sends, so static fetches are not served bot walls
pub const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "User-Agent",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    ),
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
    ),
    ("Accept-Language", "zh-TW,zh;q=0.9,en-US;q=0.8,en;q=0.7"),
];

/// Browser-like request headers as an owned map
pub fn browser_headers() -> HashMap<String, String> {
    BROWSER_HEADERS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Raw HTTP GET
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return the response body. Non-2xx responses are errors.
    fn fetch(&self, url: &str, headers: &HashMap<String, String>, timeout: Duration) -> Result<Vec<u8>>;
}

/// Shared HTTP agent for connection pooling
pub fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

/// Fetcher over a pooled ureq agent
#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, headers: &HashMap<String, String>, timeout: Duration) -> Result<Vec<u8>> {
        let mut request = self.agent.get(url);

        for (key, value) in headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request
            .config()
            .timeout_global(Some(timeout))
            .build()
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(code) => {
                    PagebriefError::FetchFailed(format!("HTTP {} from {}", code, url))
                }
                other => PagebriefError::FetchFailed(other.to_string()),
            })?;

        let body = response
            .into_body()
            .with_config()
            .limit(MAX_PAGE_BYTES)
            .read_to_vec()?;

        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}
