use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{PagebriefError, Result};

/// Outbound user messages (progress notices)
pub trait Messenger: Send + Sync {
    fn notify(&self, chat_id: &str, text: &str) -> Result<()>;
}

/// Telegram Bot API `sendMessage`
pub struct TelegramMessenger {
    agent: ureq::Agent,
    bot_token: String,
}

impl TelegramMessenger {
    pub fn new(bot_token: String, timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self { agent, bot_token }
    }
}

impl Messenger for TelegramMessenger {
    fn notify(&self, chat_id: &str, text: &str) -> Result<()> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);

        let telegram_payload = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });

        self.agent
            .post(&url)
            .header("Content-Type", "application/json")
            .send_json(&telegram_payload)
            .map_err(|e| PagebriefError::NotificationError(e.to_string()))?;

        Ok(())
    }
}

/// Send a notice on a detached thread. Failures are logged and dropped.
pub fn notify_in_background(
    messenger: Arc<dyn Messenger>,
    chat_id: String,
    text: String,
) -> Option<JoinHandle<()>> {
    let spawned = std::thread::Builder::new()
        .name("notice".into())
        .spawn(move || {
            let preview: String = text.chars().take(50).collect();
            info!("Sending notice to chat {}: {}", chat_id, preview);
            if let Err(e) = messenger.notify(&chat_id, &text) {
                warn!("Failed to send notice: {}", e);
            }
        });

    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Could not spawn notice thread: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl Messenger for Recorder {
        fn notify(&self, chat_id: &str, text: &str) -> Result<()> {
            self.sent.lock().unwrap().push((chat_id.into(), text.into()));
            if self.fail {
                return Err(PagebriefError::NotificationError("down".into()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_background_notice_delivers() {
        let recorder = Arc::new(Recorder::default());
        let handle = notify_in_background(recorder.clone(), "42".into(), "hello".into()).unwrap();
        handle.join().unwrap();
        assert_eq!(recorder.sent.lock().unwrap()[0], ("42".to_string(), "hello".to_string()));
    }

    #[test]
    fn test_background_notice_failure_is_swallowed() {
        let recorder = Arc::new(Recorder {
            fail: true,
            ..Default::default()
        });
        let handle = notify_in_background(recorder.clone(), "1".into(), "x".into()).unwrap();
        assert!(handle.join().is_ok());
        assert_eq!(recorder.sent.lock().unwrap().len(), 1);
    }
}
