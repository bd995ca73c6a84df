//! Catalog trait definitions.
//!
//! These traits abstract the metadata provider so the pipeline, runtime
//! bridge, and player can be exercised against mocks without a backend.

use std::collections::HashMap;

use thiserror::Error;

use crate::store::BoxFuture;

use super::types::CourseDescriptor;

/// Errors from the metadata provider boundary.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport-level failure.
    #[error("catalog request failed: {0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("catalog request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Response body could not be decoded.
    #[error("catalog response could not be decoded: {0}")]
    Decode(String),

    /// Course unknown to the provider.
    #[error("course {0:?} not found in catalog")]
    CourseNotFound(String),
}

/// Read access to the course catalog.
pub trait CourseCatalog: Send + Sync {
    /// List all available course descriptors.
    fn list_courses(&self) -> BoxFuture<'_, Result<Vec<CourseDescriptor>, CatalogError>>;

    /// Fetch a single course descriptor by id.
    fn get_course<'a>(
        &'a self,
        course_id: &'a str,
    ) -> BoxFuture<'a, Result<CourseDescriptor, CatalogError>>;
}

/// Persistence for per-learner runtime data, keyed by (course, learner).
///
/// This is the provider-side half of the SCORM runtime bridge: Initialize
/// loads through it and Commit/Terminate flush through it.
pub trait LearnerDataStore: Send + Sync {
    /// Load the persisted data model values from a prior session.
    ///
    /// Returns `Ok(None)` when the learner has no recorded attempt.
    fn load_runtime_data<'a>(
        &'a self,
        course_id: &'a str,
        learner_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<HashMap<String, String>>, CatalogError>>;

    /// Persist the full data model for this (course, learner) pair.
    fn save_runtime_data<'a>(
        &'a self,
        course_id: &'a str,
        learner_id: &'a str,
        values: HashMap<String, String>,
    ) -> BoxFuture<'a, Result<(), CatalogError>>;
}
