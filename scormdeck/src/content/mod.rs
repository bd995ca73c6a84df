//! Content request interception.
//!
//! Serves extracted course files back to the sandboxed content frame as
//! if from a web server. The [`ContentResolver`] is transport-agnostic:
//! it maps a request path in the synthetic
//! `/<content-root>/<courseId>/<...>` namespace to a store read and an
//! outcome, and never panics. The axum layer in [`server`] mounts it.

mod content_type;
mod resolver;
mod server;

pub use content_type::content_type_for;
pub use resolver::{ContentResolver, ContentResponse, ResolveOutcome};
pub use server::{content_router, serve_content};

/// Default first segment of the synthetic content namespace.
pub const DEFAULT_CONTENT_ROOT: &str = "scorm-content";
