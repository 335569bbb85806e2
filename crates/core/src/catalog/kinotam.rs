//! Kinotam catalog client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::{CatalogError, ContentKind, FilmCatalog, UploadStatus};
use crate::config::CatalogConfig;
use crate::film::Film;
use crate::pipeline::ProcessingOutcome;
use crate::retry::retry_until_some;

/// Session login response; only the session id is used.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    attributes: Option<LoginAttributes>,
}

#[derive(Debug, Deserialize)]
struct LoginAttributes {
    #[serde(default)]
    sid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FilmListResponse {
    #[serde(default)]
    items: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    code: Option<String>,
}

/// HTTP client for the Kinotam admin API.
///
/// Logs in with the `tm` credential, keeps the returned `sid` plus the
/// `sandbox=beta` cookie in a cookie jar, and sends every later request with
/// those cookies.
pub struct KinotamClient {
    client: Client,
    jar: Arc<Jar>,
    base: Url,
    config: CatalogConfig,
    kind: ContentKind,
}

impl KinotamClient {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let base = Url::parse(&config.url)
            .map_err(|e| CatalogError::InvalidConfig(format!("catalog.url: {}", e)))?;
        let jar = Arc::new(Jar::default());
        jar.add_cookie_str("sandbox=beta", &base);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_provider(jar.clone())
            .build()
            .map_err(|e| CatalogError::InvalidConfig(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            jar,
            base,
            kind: ContentKind::from_category_id(config.category_id),
            config,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    async fn request_sid(&self) -> Result<Option<String>, CatalogError> {
        let response = self
            .client
            .post(self.endpoint("/api/session/login/"))
            .form(&[("tm", self.config.token.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let login: LoginResponse = response.json().await?;
        Ok(login.attributes.and_then(|a| a.sid).filter(|s| !s.is_empty()))
    }

    /// Acquire a fresh session id and store it in the cookie jar.
    pub async fn login(&self) -> Result<(), CatalogError> {
        let sid = retry_until_some(&self.config.retry, "catalog login", |attempt| {
            debug!(attempt = attempt, "Requesting catalog session");
            self.request_sid()
        })
        .await
        .ok_or_else(|| {
            CatalogError::AuthFailed("no session id after max attempts".to_string())
        })?;

        self.jar.add_cookie_str(&format!("sid={}", sid), &self.base);
        info!("Catalog session established");
        Ok(())
    }

    async fn fetch_page(&self, offset: u32, limit: u32) -> Result<Option<Vec<Value>>, CatalogError> {
        let response = self
            .client
            .post(self.endpoint("/api/films/upload/list/"))
            .form(&[
                ("Ot", self.config.category_id.to_string()),
                ("O", offset.to_string()),
                ("L", limit.to_string()),
                ("_origin", self.config.url.clone()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let list: FilmListResponse = response.json().await?;
        Ok(list.items.filter(|items| !items.is_empty()))
    }
}

/// `(offset, limit)` pages covering `total` films, `page_size` at a time.
pub(crate) fn page_plan(total: u32, page_size: u32) -> Vec<(u32, u32)> {
    if page_size == 0 {
        return Vec::new();
    }
    (0..total)
        .step_by(page_size as usize)
        .map(|offset| (offset, page_size.min(total - offset)))
        .collect()
}

/// Decode list items into films, skipping records without a usable id.
fn decode_films(items: Vec<Value>) -> Vec<Film> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Film>(item) {
            Ok(film) => Some(film),
            Err(e) => {
                warn!(error = %e, "Skipping malformed catalog film");
                None
            }
        })
        .collect()
}

#[async_trait]
impl FilmCatalog for KinotamClient {
    async fn fetch_films(&self) -> Result<Vec<Film>, CatalogError> {
        self.login().await?;

        let mut films = Vec::new();
        for (offset, limit) in page_plan(self.config.limit, self.config.max_limit) {
            let label = format!("catalog film list O={} L={}", offset, limit);
            match retry_until_some(&self.config.retry, &label, |_| self.fetch_page(offset, limit))
                .await
            {
                Some(items) => {
                    debug!(offset = offset, limit = limit, items = items.len(), "Fetched catalog page");
                    films.extend(decode_films(items));
                }
                None => warn!(offset = offset, limit = limit, "Catalog page unavailable"),
            }
        }

        if films.is_empty() {
            error!("No films fetched from catalog");
        } else {
            info!(count = films.len(), "Fetched films from catalog");
        }
        Ok(films)
    }

    async fn upload(&self, outcome: &ProcessingOutcome) -> UploadStatus {
        let request = self
            .client
            .post(self.endpoint("/api/films/upload/add/"))
            .form(&[
                ("Ot", self.config.category_id.to_string()),
                ("Oi", outcome.id.to_string()),
                ("title", outcome.name_to_api.clone()),
                ("torrent", outcome.magnet.clone()),
            ]);

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(film_id = outcome.id, error = %e, "Upload request failed");
                return UploadStatus::Failed(e.to_string());
            }
        };

        let status = match response.json::<UploadResponse>().await {
            Ok(body) => UploadStatus::from_code(body.code.as_deref().unwrap_or_default()),
            Err(e) => UploadStatus::Failed(format!("Failed to parse upload response: {}", e)),
        };

        match &status {
            UploadStatus::Uploaded => info!(film_id = outcome.id, kind = self.kind.label(), "Uploaded"),
            UploadStatus::Duplicate => warn!(film_id = outcome.id, "Catalog reported a duplicate upload"),
            UploadStatus::Rejected(code) => warn!(film_id = outcome.id, code = %code, "Upload rejected"),
            UploadStatus::Failed(msg) => warn!(film_id = outcome.id, error = %msg, "Upload failed"),
        }
        status
    }

    fn content_kind(&self) -> ContentKind {
        self.kind
    }

    fn base_url(&self) -> &str {
        &self.config.url
    }
}
