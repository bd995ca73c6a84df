//! Combined course + manifest record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CourseDescriptor;
use crate::manifest::PackageManifest;

/// The record written at the end of a successful install.
///
/// Its presence in the store is what marks a course as installed; the
/// player reads it back to find the launch URL without re-touching the
/// manifest. Re-downloading a course rewrites it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    /// Cached copy of the catalog descriptor.
    pub course: CourseDescriptor,
    /// Manifest parsed during extraction.
    pub manifest: PackageManifest,
    /// When the install finished.
    pub installed_at: DateTime<Utc>,
}
