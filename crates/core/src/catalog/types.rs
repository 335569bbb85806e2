//! Types for the film catalog.

use serde::Serialize;
use thiserror::Error;

/// Catalog section a client works against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Movie,
    Cartoon,
    Other,
}

impl ContentKind {
    pub const MOVIE_CATEGORY_ID: u32 = 91;
    pub const CARTOON_CATEGORY_ID: u32 = 104;

    pub fn from_category_id(category_id: u32) -> Self {
        match category_id {
            Self::MOVIE_CATEGORY_ID => ContentKind::Movie,
            Self::CARTOON_CATEGORY_ID => ContentKind::Cartoon,
            _ => ContentKind::Other,
        }
    }

    /// Path segment of a film page on the site.
    pub fn link_path(&self) -> &'static str {
        match self {
            ContentKind::Movie => "movie",
            ContentKind::Cartoon => "cartoon",
            ContentKind::Other => "",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Movie => "film",
            ContentKind::Cartoon => "cartoon",
            ContentKind::Other => "title",
        }
    }

    /// Public page of a film, e.g. `https://kinotam.example/movie/?Oi=42`.
    pub fn film_page_url(&self, base_url: &str, film_id: i64) -> String {
        format!(
            "{}/{}/?Oi={}",
            base_url.trim_end_matches('/'),
            self.link_path(),
            film_id
        )
    }
}

/// Result of submitting one outcome to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum UploadStatus {
    /// Accepted (`00000`).
    Uploaded,
    /// The catalog already has this torrent (`00037`).
    Duplicate,
    /// Any other response code.
    Rejected(String),
    /// The request itself failed.
    Failed(String),
}

impl UploadStatus {
    pub const CODE_OK: &'static str = "00000";
    pub const CODE_DUPLICATE: &'static str = "00037";

    pub fn from_code(code: &str) -> Self {
        match code {
            Self::CODE_OK => UploadStatus::Uploaded,
            Self::CODE_DUPLICATE => UploadStatus::Duplicate,
            other => UploadStatus::Rejected(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Uploaded => "uploaded",
            UploadStatus::Duplicate => "duplicate",
            UploadStatus::Rejected(_) => "rejected",
            UploadStatus::Failed(_) => "failed",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadStatus::Uploaded)
    }
}

/// Errors from the film catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog authentication failed: {0}")]
    AuthFailed(String),

    #[error("Catalog connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Catalog API error: {0}")]
    ApiError(String),

    #[error("Invalid catalog response: {0}")]
    InvalidResponse(String),

    #[error("Invalid catalog configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            CatalogError::ConnectionFailed(e.to_string())
        } else if e.is_decode() {
            CatalogError::InvalidResponse(e.to_string())
        } else {
            CatalogError::ApiError(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind_from_category() {
        assert_eq!(ContentKind::from_category_id(91), ContentKind::Movie);
        assert_eq!(ContentKind::from_category_id(104), ContentKind::Cartoon);
        assert_eq!(ContentKind::from_category_id(7), ContentKind::Other);
    }

    #[test]
    fn test_film_page_url() {
        assert_eq!(
            ContentKind::Movie.film_page_url("https://kinotam.example/", 42),
            "https://kinotam.example/movie/?Oi=42"
        );
        assert_eq!(
            ContentKind::Cartoon.film_page_url("https://kinotam.example", 7),
            "https://kinotam.example/cartoon/?Oi=7"
        );
    }

    #[test]
    fn test_upload_status_from_code() {
        assert_eq!(UploadStatus::from_code("00000"), UploadStatus::Uploaded);
        assert_eq!(UploadStatus::from_code("00037"), UploadStatus::Duplicate);
        assert_eq!(
            UploadStatus::from_code("00012"),
            UploadStatus::Rejected("00012".to_string())
        );
        assert!(UploadStatus::Uploaded.is_success());
        assert!(!UploadStatus::Duplicate.is_success());
        assert_eq!(UploadStatus::Failed("x".to_string()).as_str(), "failed");
    }
}
