//! Upload notifications.

mod telegram;

pub use telegram::TelegramNotifier;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone};
use thiserror::Error;

use crate::catalog::{ContentKind, UploadStatus};
use crate::pipeline::ProcessingOutcome;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification request failed: {0}")]
    RequestFailed(String),

    #[error("Notification rejected: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        NotifyError::RequestFailed(e.to_string())
    }
}

/// Receives one message per upload attempt.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        outcome: &ProcessingOutcome,
        status: &UploadStatus,
    ) -> Result<(), NotifyError>;
}

/// Headline for an upload status.
pub fn status_headline(status: &UploadStatus, kind: ContentKind) -> String {
    match status {
        UploadStatus::Uploaded => format!("✅ *Uploaded {}:*", kind.label()),
        UploadStatus::Duplicate => "⚠️ *Repeated upload attempt:*".to_string(),
        UploadStatus::Rejected(code) => {
            format!("⛔️ *Failed to upload {} ({}):*", kind.label(), code)
        }
        UploadStatus::Failed(_) => format!("⛔️ *Failed to upload {}:*", kind.label()),
    }
}

/// Markdown message describing one upload.
pub fn render_message<Tz>(
    outcome: &ProcessingOutcome,
    status: &UploadStatus,
    kind: ContentKind,
    catalog_url: &str,
    at: &DateTime<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut message = format!(
        "{}\n\n*Upload date:* {}\n*ID:* `{}`\n*Title:* `{}`\n*Release:* `{}`\n\n[🔗 Catalog page]({})\n",
        status_headline(status, kind),
        at.format("%d.%m.%Y %H:%M"),
        outcome.id,
        outcome.name_to_api,
        outcome.name_release,
        kind.film_page_url(catalog_url, outcome.id),
    );
    if let Some(url) = &outcome.url {
        message.push_str(&format!("[🔗 Release]({})\n", url));
    }
    message
}
