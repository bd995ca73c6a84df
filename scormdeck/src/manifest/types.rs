//! Manifest data types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title used when the manifest declares none.
pub const DEFAULT_TITLE: &str = "Untitled Course";

/// The two supported SCORM dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScormVersion {
    /// SCORM 1.2 - the legacy dialect, also the default when the
    /// manifest does not declare a recognizable version.
    #[serde(rename = "1.2")]
    V1_2,
    /// SCORM 2004 (CAM 1.3).
    #[serde(rename = "2004")]
    V2004,
}

impl ScormVersion {
    /// The canonical version tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1_2 => "1.2",
            Self::V2004 => "2004",
        }
    }

    /// Normalize a schema/version declaration by case-insensitive
    /// substring match against the known tokens.
    pub fn from_schema_text(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        if lower.contains("2004") || lower.contains("1.3") {
            Some(Self::V2004)
        } else if lower.contains("1.2") {
            Some(Self::V1_2)
        } else {
            None
        }
    }
}

impl fmt::Display for ScormVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized descriptor derived from a package manifest.
///
/// Immutable once computed: it is created during extraction and only ever
/// re-created wholesale when the course is downloaded again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    /// Relative path of the entry document inside the package.
    pub launch_url: String,
    /// SCORM dialect the package was authored against.
    pub version: ScormVersion,
    /// Display title.
    pub title: String,
    /// Prerequisite declarations of the launch item.
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

/// Structured manifest parse failures.
///
/// Each failure carries enough to tell the cases apart when a package
/// upload is rejected.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// No `<manifest>` root element.
    #[error("manifest root element not found")]
    MissingManifestRoot,

    /// No `<organizations>` section.
    #[error("manifest has no organizations section")]
    MissingOrganizations,

    /// No item in any organization carries a resource reference.
    #[error("no launchable item with a resource reference found")]
    NoLaunchableItem,

    /// The launch item's reference does not resolve to a resource with
    /// an href.
    #[error("resource reference {reference:?} does not resolve to a resource with an href")]
    UnresolvedResource { reference: String },

    /// The markup itself could not be read.
    #[error("malformed manifest markup: {0}")]
    Markup(String),
}
