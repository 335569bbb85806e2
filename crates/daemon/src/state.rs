use kinoscout_core::{Config, RunReport, SanitizedConfig};
use tokio::sync::RwLock;

use crate::metrics::{LAST_RUN_MATCHED, LAST_RUN_TIMESTAMP};

/// Shared application state
pub struct AppState {
    config: Config,
    last_run: RwLock<Option<RunReport>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            last_run: RwLock::new(None),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    /// Remember the report of a finished run.
    pub async fn record_run(&self, report: RunReport) {
        LAST_RUN_TIMESTAMP.set(chrono::Utc::now().timestamp());
        LAST_RUN_MATCHED.set(report.outcomes.len() as i64);
        *self.last_run.write().await = Some(report);
    }

    pub async fn last_run(&self) -> Option<RunReport> {
        self.last_run.read().await.clone()
    }
}
