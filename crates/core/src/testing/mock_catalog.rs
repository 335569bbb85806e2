//! Mock film catalog for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::{CatalogError, ContentKind, FilmCatalog, UploadStatus};
use crate::film::Film;
use crate::pipeline::ProcessingOutcome;

/// Mock implementation of the FilmCatalog trait.
///
/// Serves a configurable film list, records uploads and answers every upload
/// with a configurable status (default [`UploadStatus::Uploaded`]).
#[derive(Debug)]
pub struct MockCatalog {
    films: Arc<RwLock<Vec<Film>>>,
    uploaded: Arc<RwLock<Vec<ProcessingOutcome>>>,
    upload_status: Arc<RwLock<UploadStatus>>,
    next_error: Arc<RwLock<Option<CatalogError>>>,
    kind: ContentKind,
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalog {
    pub fn new() -> Self {
        Self {
            films: Arc::new(RwLock::new(Vec::new())),
            uploaded: Arc::new(RwLock::new(Vec::new())),
            upload_status: Arc::new(RwLock::new(UploadStatus::Uploaded)),
            next_error: Arc::new(RwLock::new(None)),
            kind: ContentKind::Movie,
        }
    }

    pub async fn set_films(&self, films: Vec<Film>) {
        *self.films.write().await = films;
    }

    pub async fn set_upload_status(&self, status: UploadStatus) {
        *self.upload_status.write().await = status;
    }

    /// Make the next `fetch_films` fail.
    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Outcomes submitted through `upload`, in order.
    pub async fn uploaded(&self) -> Vec<ProcessingOutcome> {
        self.uploaded.read().await.clone()
    }
}

#[async_trait]
impl FilmCatalog for MockCatalog {
    async fn fetch_films(&self) -> Result<Vec<Film>, CatalogError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        Ok(self.films.read().await.clone())
    }

    async fn upload(&self, outcome: &ProcessingOutcome) -> UploadStatus {
        self.uploaded.write().await.push(outcome.clone());
        self.upload_status.read().await.clone()
    }

    fn content_kind(&self) -> ContentKind {
        self.kind
    }

    fn base_url(&self) -> &str {
        "https://kinotam.example"
    }
}
