//! Axum mount for the content resolver.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use super::resolver::{ContentResolver, ResolveOutcome};

/// Build a router serving the content namespace.
///
/// The resolver is installed as the fallback handler so every request
/// path reaches it; declined paths answer 404 in a standalone server.
/// Hosts composing their own router can nest this one and keep their
/// normal handling for everything outside the namespace.
pub fn content_router(resolver: Arc<ContentResolver>) -> Router {
    Router::new().fallback(serve).with_state(resolver)
}

/// Bind `addr` and serve content until the task is dropped.
pub async fn serve_content(addr: SocketAddr, resolver: Arc<ContentResolver>) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "content server listening");
    axum::serve(listener, content_router(resolver)).await
}

async fn serve(State(resolver): State<Arc<ContentResolver>>, uri: Uri) -> Response {
    match resolver.resolve(uri.path()).await {
        ResolveOutcome::NotHandled => StatusCode::NOT_FOUND.into_response(),
        ResolveOutcome::Response(response) => {
            let status = StatusCode::from_u16(response.status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                [(header::CONTENT_TYPE, response.content_type)],
                response.body,
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryPackageStore;

    #[test]
    fn test_router_builds() {
        let resolver = Arc::new(ContentResolver::new(
            Arc::new(MemoryPackageStore::new()),
            "scorm-content",
        ));
        let _router = content_router(resolver);
    }
}
