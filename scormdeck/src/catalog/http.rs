//! HTTP implementation of the catalog traits.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::store::BoxFuture;

use super::traits::{CatalogError, CourseCatalog, LearnerDataStore};
use super::types::CourseDescriptor;

/// Default timeout for catalog requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Catalog client talking JSON to the course backend.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    base_origin: String,
}

impl HttpCatalog {
    /// Create a client for the given backend origin.
    pub fn new(base_origin: impl Into<String>) -> Result<Self, CatalogError> {
        Self::with_timeout(base_origin, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(
        base_origin: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_origin: base_origin.into().trim_end_matches('/').to_string(),
        })
    }

    /// The configured backend origin.
    pub fn base_origin(&self) -> &str {
        &self.base_origin
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_origin, path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, CatalogError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url,
                status: status.as_u16(),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

impl CourseCatalog for HttpCatalog {
    fn list_courses(&self) -> BoxFuture<'_, Result<Vec<CourseDescriptor>, CatalogError>> {
        Box::pin(async move { self.get_json(self.url("/api/courses")).await })
    }

    fn get_course<'a>(
        &'a self,
        course_id: &'a str,
    ) -> BoxFuture<'a, Result<CourseDescriptor, CatalogError>> {
        Box::pin(async move {
            let url = self.url(&format!("/api/courses/{}", course_id));
            match self.get_json::<CourseDescriptor>(url).await {
                Err(CatalogError::Status { status: 404, .. }) => {
                    Err(CatalogError::CourseNotFound(course_id.to_string()))
                }
                other => other,
            }
        })
    }
}

impl LearnerDataStore for HttpCatalog {
    fn load_runtime_data<'a>(
        &'a self,
        course_id: &'a str,
        learner_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<HashMap<String, String>>, CatalogError>> {
        Box::pin(async move {
            let url = self.url(&format!("/api/progress/{}/{}", course_id, learner_id));
            match self.get_json::<HashMap<String, String>>(url).await {
                Ok(values) => Ok(Some(values)),
                // No recorded attempt yet.
                Err(CatalogError::Status { status: 404, .. }) => Ok(None),
                Err(e) => Err(e),
            }
        })
    }

    fn save_runtime_data<'a>(
        &'a self,
        course_id: &'a str,
        learner_id: &'a str,
        values: HashMap<String, String>,
    ) -> BoxFuture<'a, Result<(), CatalogError>> {
        Box::pin(async move {
            let url = self.url(&format!("/api/progress/{}/{}", course_id, learner_id));
            let response = self
                .client
                .put(&url)
                .json(&values)
                .send()
                .await
                .map_err(|e| CatalogError::Transport(e.to_string()))?;
            let status = response.status();
            if status == StatusCode::OK
                || status == StatusCode::CREATED
                || status == StatusCode::NO_CONTENT
            {
                Ok(())
            } else {
                Err(CatalogError::Status {
                    url,
                    status: status.as_u16(),
                })
            }
        })
    }
}
