//! Mock notifier for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::UploadStatus;
use crate::notify::{NotifyError, Notifier};
use crate::pipeline::ProcessingOutcome;

/// Records every notification instead of sending it.
#[derive(Debug, Default)]
pub struct MockNotifier {
    notifications: Arc<RwLock<Vec<(ProcessingOutcome, UploadStatus)>>>,
    next_error: Arc<RwLock<Option<NotifyError>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next notification fail (it is still recorded).
    pub async fn set_next_error(&self, error: NotifyError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn notifications(&self) -> Vec<(ProcessingOutcome, UploadStatus)> {
        self.notifications.read().await.clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(
        &self,
        outcome: &ProcessingOutcome,
        status: &UploadStatus,
    ) -> Result<(), NotifyError> {
        self.notifications
            .write()
            .await
            .push((outcome.clone(), status.clone()));

        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
