use serde::{Deserialize, Serialize};

use crate::film::Film;
use crate::matching::CandidateRelease;

/// A matched release ready to upload.
///
/// Serialized field names are the ones written to the dry-run result file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingOutcome {
    /// Catalog film id.
    pub id: i64,
    /// Film title as shown on the catalog, e.g. `"Альфа | Alpha | 2024"`.
    pub kinotam_name: String,
    /// Release name as published by the tracker.
    pub name_release: String,
    /// Upload title: `kinotam_name` followed by `| <quality tag>`.
    pub name_to_api: String,
    /// Release page on the tracker.
    pub url: Option<String>,
    pub magnet: String,
}

impl ProcessingOutcome {
    pub fn new(film: &Film, candidate: &CandidateRelease, magnet: String) -> Self {
        let kinotam_name = film.display_name();
        let name_to_api = [kinotam_name.as_str(), candidate.tag()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" | ");

        Self {
            id: film.id,
            name_release: candidate.release().name.clone(),
            url: candidate.release().url.clone(),
            kinotam_name,
            name_to_api,
            magnet,
        }
    }
}
