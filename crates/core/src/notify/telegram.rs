use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{render_message, NotifyError, Notifier};
use crate::catalog::{ContentKind, UploadStatus};
use crate::config::TelegramConfig;
use crate::pipeline::ProcessingOutcome;

const DEFAULT_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Posts upload messages to a Telegram chat through the Bot API.
pub struct TelegramNotifier {
    client: Client,
    api_url: String,
    config: TelegramConfig,
    kind: ContentKind,
    catalog_url: String,
}

impl TelegramNotifier {
    pub fn new(
        config: TelegramConfig,
        kind: ContentKind,
        catalog_url: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(Duration::from_secs(20)).build()?;
        let api_url = config
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            client,
            api_url,
            config,
            kind,
            catalog_url: catalog_url.into(),
        })
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_url.trim_end_matches('/'),
            self.config.token
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(
        &self,
        outcome: &ProcessingOutcome,
        status: &UploadStatus,
    ) -> Result<(), NotifyError> {
        let text = render_message(outcome, status, self.kind, &self.catalog_url, &Local::now());

        let response = self
            .client
            .post(self.send_message_url())
            .form(&[
                ("chat_id", self.config.chat_id.as_str()),
                ("text", text.as_str()),
                ("parse_mode", "Markdown"),
            ])
            .send()
            .await?;

        let body: SendMessageResponse = response.json().await?;
        if !body.ok {
            return Err(NotifyError::Rejected(
                body.description.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        debug!(film_id = outcome.id, status = status.as_str(), "Telegram notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_url() {
        let notifier = TelegramNotifier::new(
            TelegramConfig {
                token: "123:abc".to_string(),
                chat_id: "-100".to_string(),
                api_url: Some("http://localhost:8081/".to_string()),
            },
            ContentKind::Movie,
            "https://kinotam.example",
        )
        .unwrap();
        assert_eq!(
            notifier.send_message_url(),
            "http://localhost:8081/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_default_api_url() {
        let notifier = TelegramNotifier::new(
            TelegramConfig {
                token: "t".to_string(),
                chat_id: "1".to_string(),
                api_url: None,
            },
            ContentKind::Cartoon,
            "https://kinotam.example",
        )
        .unwrap();
        assert!(notifier
            .send_message_url()
            .starts_with("https://api.telegram.org/bot"));
    }
}
