//! Path-to-store resolution for the synthetic content namespace.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::store::{layout, PackageStore, StoreError};

use super::content_type::{content_type_for, GENERIC_BINARY};

/// Outcome of resolving one request path.
#[derive(Debug, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The path is outside the content namespace; the caller's normal
    /// request handling applies.
    NotHandled,
    /// The path belongs to the namespace; here is the response.
    Response(ContentResponse),
}

/// Transport-agnostic response for a handled request.
#[derive(Debug, PartialEq, Eq)]
pub struct ContentResponse {
    /// HTTP-style status code.
    pub status: u16,
    /// Content-type label.
    pub content_type: String,
    /// Response body.
    pub body: Vec<u8>,
}

impl ContentResponse {
    fn ok(body: Vec<u8>, content_type: &str) -> Self {
        Self {
            status: 200,
            content_type: content_type.to_string(),
            body,
        }
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            content_type: "text/plain".to_string(),
            body: b"not found".to_vec(),
        }
    }

    fn server_error() -> Self {
        Self {
            status: 500,
            content_type: "text/plain".to_string(),
            body: b"storage error".to_vec(),
        }
    }
}

/// Resolves content-namespace requests to package store reads.
pub struct ContentResolver {
    store: Arc<dyn PackageStore>,
    content_root: String,
}

impl ContentResolver {
    /// Create a resolver serving under `/<content_root>/...`.
    pub fn new(store: Arc<dyn PackageStore>, content_root: impl Into<String>) -> Self {
        Self {
            store,
            content_root: content_root.into(),
        }
    }

    /// The namespace tag this resolver answers for.
    pub fn content_root(&self) -> &str {
        &self.content_root
    }

    /// Build the launch path for a course's entry document.
    pub fn launch_path(&self, course_id: &str, launch_url: &str) -> String {
        format!(
            "/{}/{}/{}",
            self.content_root,
            course_id,
            launch_url.trim_start_matches('/')
        )
    }

    /// Resolve a request path.
    ///
    /// Paths with fewer than three segments, or whose first segment is
    /// not the content root, are declined. Everything else produces a
    /// response: 200 with the file bytes, 404 when the file is absent,
    /// 500 on a storage failure. This method never panics.
    pub async fn resolve(&self, request_path: &str) -> ResolveOutcome {
        let segments: Vec<&str> = request_path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < 3 || segments[0] != self.content_root {
            return ResolveOutcome::NotHandled;
        }
        let course_id = segments[1];
        let relative = &segments[2..];

        let path = match layout::content_root(course_id)
            .and_then(|root| root.extend(relative.iter().copied()))
        {
            Ok(path) => path,
            Err(e) => {
                // Malformed segments (`..` and friends) cannot address a
                // stored file; report them as absent rather than erroring.
                debug!(path = request_path, error = %e, "rejected content path");
                return ResolveOutcome::Response(ContentResponse::not_found());
            }
        };

        match self.store.read_file(&path).await {
            Ok(body) => {
                let content_type = relative
                    .last()
                    .map(|name| content_type_for(name))
                    .unwrap_or(GENERIC_BINARY);
                debug!(path = %path, bytes = body.len(), "served content file");
                ResolveOutcome::Response(ContentResponse::ok(body, content_type))
            }
            Err(StoreError::NotFound(_)) => {
                debug!(path = %path, "content file not found");
                ResolveOutcome::Response(ContentResponse::not_found())
            }
            Err(e) => {
                warn!(path = %path, error = %e, "content read failed");
                ResolveOutcome::Response(ContentResponse::server_error())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryPackageStore, StorePath};

    async fn resolver_with_fixture() -> ContentResolver {
        let store = MemoryPackageStore::new();
        store
            .write_file(
                &StorePath::new(["c-1", "content", "index.html"]).unwrap(),
                b"<html>hi</html>".to_vec(),
            )
            .await
            .unwrap();
        store
            .write_file(
                &StorePath::new(["c-1", "content", "media", "logo.png"]).unwrap(),
                b"\x89PNG".to_vec(),
            )
            .await
            .unwrap();
        ContentResolver::new(Arc::new(store), "scorm-content")
    }

    #[tokio::test]
    async fn test_serves_existing_file_with_content_type() {
        let resolver = resolver_with_fixture().await;
        match resolver.resolve("/scorm-content/c-1/index.html").await {
            ResolveOutcome::Response(response) => {
                assert_eq!(response.status, 200);
                assert_eq!(response.content_type, "text/html");
                assert_eq!(response.body, b"<html>hi</html>");
            }
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_serves_nested_path() {
        let resolver = resolver_with_fixture().await;
        match resolver.resolve("/scorm-content/c-1/media/logo.png").await {
            ResolveOutcome::Response(response) => {
                assert_eq!(response.status, 200);
                assert_eq!(response.content_type, "image/png");
            }
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_404_not_500() {
        let resolver = resolver_with_fixture().await;
        match resolver.resolve("/scorm-content/c-1/missing.js").await {
            ResolveOutcome::Response(response) => assert_eq!(response.status, 404),
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_short_or_foreign_paths_not_handled() {
        let resolver = resolver_with_fixture().await;
        assert_eq!(
            resolver.resolve("/scorm-content/c-1").await,
            ResolveOutcome::NotHandled
        );
        assert_eq!(
            resolver.resolve("/api/courses/c-1/details").await,
            ResolveOutcome::NotHandled
        );
        assert_eq!(resolver.resolve("/").await, ResolveOutcome::NotHandled);
    }

    #[tokio::test]
    async fn test_traversal_segments_are_absent_not_served() {
        let resolver = resolver_with_fixture().await;
        match resolver.resolve("/scorm-content/c-1/../c-1/index.html").await {
            ResolveOutcome::Response(response) => assert_eq!(response.status, 404),
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_launch_path() {
        let resolver = resolver_with_fixture().await;
        assert_eq!(
            resolver.launch_path("c-1", "index.html"),
            "/scorm-content/c-1/index.html"
        );
        assert_eq!(
            resolver.launch_path("c-1", "/start/launch.htm"),
            "/scorm-content/c-1/start/launch.htm"
        );
    }
}
