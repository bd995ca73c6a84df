//! Canonical on-store layout for a cached course.
//!
//! Per course id the store holds:
//!
//! ```text
//! <courseId>/
//!   package.zip      downloaded archive
//!   content/...      extracted file tree mirroring the package paths
//!   manifest.json    parsed package manifest record
//!   course.json      combined course + manifest record (the install marker)
//! ```
//!
//! `course.json` is written last by the pipeline; its presence is the only
//! thing that marks a course as installed.

use super::error::StoreError;
use super::path::StorePath;

/// File name of the downloaded archive inside a course directory.
pub const ARCHIVE_FILE: &str = "package.zip";

/// File name of the parsed manifest record.
pub const MANIFEST_FILE: &str = "manifest.json";

/// File name of the combined course + manifest record.
pub const COURSE_RECORD_FILE: &str = "course.json";

/// Directory holding the extracted package file tree.
pub const CONTENT_DIR: &str = "content";

/// Top-level path of a course's subtree.
pub fn course_root(course_id: &str) -> Result<StorePath, StoreError> {
    StorePath::single(course_id)
}

/// Path of the downloaded archive file.
pub fn archive_path(course_id: &str) -> Result<StorePath, StoreError> {
    StorePath::new([course_id, ARCHIVE_FILE])
}

/// Path of the manifest record.
pub fn manifest_path(course_id: &str) -> Result<StorePath, StoreError> {
    StorePath::new([course_id, MANIFEST_FILE])
}

/// Path of the course record (install marker).
pub fn course_record_path(course_id: &str) -> Result<StorePath, StoreError> {
    StorePath::new([course_id, COURSE_RECORD_FILE])
}

/// Root of the extracted content tree.
pub fn content_root(course_id: &str) -> Result<StorePath, StoreError> {
    StorePath::new([course_id, CONTENT_DIR])
}

/// Path of one extracted file, given its package-relative segments.
pub fn content_file(course_id: &str, relative: &[String]) -> Result<StorePath, StoreError> {
    content_root(course_id)?.extend(relative.iter().map(String::as_str))
}
