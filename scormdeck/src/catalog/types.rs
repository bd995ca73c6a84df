//! Course descriptor type and asset URL resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A course as described by the metadata provider.
///
/// Owned by the backend; the pipeline caches a read-only copy in the
/// package store alongside the extracted content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDescriptor {
    /// Stable course identifier, also the top store path segment.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Catalog category.
    #[serde(default)]
    pub category: String,
    /// Cover image reference (relative to the backend origin).
    #[serde(default)]
    pub cover_image: Option<String>,
    /// Reference to the zipped package (relative to the backend origin).
    pub source_package: String,
    /// When the package was uploaded.
    pub uploaded_at: DateTime<Utc>,
}

/// Resolve an asset reference against the backend origin.
///
/// Already-absolute HTTP(S) URLs and non-HTTP schemes (`data:` and
/// friends) pass through unchanged; everything else is joined under the
/// origin.
pub fn resolve_asset_url(base_origin: &str, reference: &str) -> String {
    if reference.contains("://") || reference.starts_with("data:") {
        return reference.to_string();
    }
    format!(
        "{}/{}",
        base_origin.trim_end_matches('/'),
        reference.trim_start_matches('/')
    )
}
