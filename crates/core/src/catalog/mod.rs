//! Film catalog: the site films are pulled from and uploaded to.

mod kinotam;
mod types;

pub use kinotam::KinotamClient;
pub use types::*;

use async_trait::async_trait;

use crate::film::Film;
use crate::pipeline::ProcessingOutcome;

/// Source of films awaiting a release, and sink for matched releases.
#[async_trait]
pub trait FilmCatalog: Send + Sync {
    /// Films awaiting a release, in catalog order.
    async fn fetch_films(&self) -> Result<Vec<Film>, CatalogError>;

    /// Submit a matched release. Never fails; transport errors come back as
    /// [`UploadStatus::Failed`].
    async fn upload(&self, outcome: &ProcessingOutcome) -> UploadStatus;

    fn content_kind(&self) -> ContentKind;

    /// Base URL used to build film page links.
    fn base_url(&self) -> &str;
}
