//! Download and extraction pipeline.
//!
//! Takes a course from the catalog to a fully cached, playable state:
//!
//! ```text
//! Idle -> Downloading -> Extracting -> ParsingManifest -> Finalizing -> Done
//!           |                |               |               |
//!           +----------------+-------+-------+---------------+
//!                                    v
//!                                  Failed
//! ```
//!
//! Download streams the archive into the package store through a scoped
//! writer; extraction expands every entry under the course's content
//! subtree; the manifest is parsed and persisted; finally the combined
//! course record is written. That record is the install marker - a failed
//! run leaves the course reported as not installed.

pub(crate) mod fetch;
mod installer;
mod progress;
mod record;
mod state;

pub use fetch::{ByteStream, FetchError, FetchResponse, HttpFetcher, PackageFetcher};
pub use installer::{PackageInstaller, PipelineError, MANIFEST_FILE_NAME};
pub use progress::{ProgressCallback, ProgressTracker};
pub use record::CourseRecord;
pub use state::PipelinePhase;
