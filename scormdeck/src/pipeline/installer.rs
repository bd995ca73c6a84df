//! Install orchestration: download, extract, parse, finalize.

use std::sync::Arc;

use chrono::Utc;
use futures_util::StreamExt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::archive::{ArchiveError, ZipArchive};
use crate::catalog::{resolve_asset_url, CourseDescriptor};
use crate::manifest::{parse_manifest, ManifestError};
use crate::store::{layout, PackageStore, StoreError};

use super::fetch::{FetchError, PackageFetcher};
use super::progress::{ProgressCallback, ProgressTracker};
use super::record::CourseRecord;
use super::state::PipelinePhase;

/// Fixed, case-sensitive name of the manifest at the archive root.
pub const MANIFEST_FILE_NAME: &str = "imsmanifest.xml";

/// Errors from a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Download transport failure.
    #[error("download failed: {0}")]
    Network(#[from] FetchError),

    /// Underlying store failure.
    #[error("storage failed: {0}")]
    Storage(#[from] StoreError),

    /// Archive could not be read.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// The package is structurally not a SCORM course.
    #[error("invalid package: {0}")]
    InvalidPackage(String),

    /// The manifest is present but malformed.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// A persisted record could not be encoded or decoded.
    #[error("course record serialization failed: {0}")]
    Record(#[from] serde_json::Error),
}

/// Drives one course from catalog descriptor to installed state.
pub struct PackageInstaller {
    store: Arc<dyn PackageStore>,
    fetcher: Arc<dyn PackageFetcher>,
    base_origin: String,
}

impl PackageInstaller {
    /// Create an installer over a store and a fetch transport.
    ///
    /// `base_origin` is the backend origin relative package references
    /// are resolved against.
    pub fn new(
        store: Arc<dyn PackageStore>,
        fetcher: Arc<dyn PackageFetcher>,
        base_origin: impl Into<String>,
    ) -> Self {
        Self {
            store,
            fetcher,
            base_origin: base_origin.into(),
        }
    }

    /// Whether the course's install marker exists.
    ///
    /// Partially extracted trees deliberately do not count: only the
    /// course record written at the end of a successful run does.
    pub async fn is_installed(&self, course_id: &str) -> Result<bool, PipelineError> {
        let marker = layout::course_record_path(course_id)?;
        Ok(self.store.exists(&marker).await?)
    }

    /// Load the combined course + manifest record of an installed course.
    pub async fn load_record(&self, course_id: &str) -> Result<CourseRecord, PipelineError> {
        let marker = layout::course_record_path(course_id)?;
        let bytes = self.store.read_file(&marker).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Recursively delete everything cached for the course.
    pub async fn remove(&self, course_id: &str) -> Result<(), PipelineError> {
        let root = layout::course_root(course_id)?;
        self.store.remove_subtree(&root).await?;
        info!(course = course_id, "removed cached course");
        Ok(())
    }

    /// Run the full pipeline for one course.
    ///
    /// Progress is reported through `progress` as a monotonic percentage;
    /// on success the last report is exactly 100. On failure the course
    /// remains not-installed and the error tells which phase broke.
    pub async fn install(
        &self,
        course: &CourseDescriptor,
        progress: Option<ProgressCallback>,
    ) -> Result<CourseRecord, PipelineError> {
        let mut tracker = ProgressTracker::new(progress);
        let mut phase = PipelinePhase::Idle;

        match self.run(course, &mut tracker, &mut phase).await {
            Ok(record) => {
                advance(&mut phase, PipelinePhase::Done, &course.id);
                tracker.complete();
                info!(course = %course.id, title = %record.manifest.title, "course installed");
                Ok(record)
            }
            Err(e) => {
                advance(&mut phase, PipelinePhase::Failed, &course.id);
                warn!(course = %course.id, error = %e, "install failed");
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        course: &CourseDescriptor,
        tracker: &mut ProgressTracker,
        phase: &mut PipelinePhase,
    ) -> Result<CourseRecord, PipelineError> {
        advance(phase, PipelinePhase::Downloading, &course.id);
        self.store.ensure_root().await?;
        self.store
            .ensure_directory(&layout::course_root(&course.id)?)
            .await?;
        self.download_archive(course, tracker).await?;

        advance(phase, PipelinePhase::Extracting, &course.id);
        let archive_bytes = self.store.read_file(&layout::archive_path(&course.id)?).await?;
        let archive = ZipArchive::parse(archive_bytes)?;
        self.extract_entries(&course.id, &archive, tracker).await?;

        advance(phase, PipelinePhase::ParsingManifest, &course.id);
        let manifest = self.parse_and_persist_manifest(&course.id, &archive).await?;

        advance(phase, PipelinePhase::Finalizing, &course.id);
        let record = CourseRecord {
            course: course.clone(),
            manifest,
            installed_at: Utc::now(),
        };
        self.store
            .write_file(
                &layout::course_record_path(&course.id)?,
                serde_json::to_vec_pretty(&record)?,
            )
            .await?;
        Ok(record)
    }

    /// Stream the archive into the store through a scoped writer.
    async fn download_archive(
        &self,
        course: &CourseDescriptor,
        tracker: &mut ProgressTracker,
    ) -> Result<(), PipelineError> {
        let url = resolve_asset_url(&self.base_origin, &course.source_package);
        debug!(course = %course.id, url = %url, "starting package download");

        let response = self.fetcher.fetch(&url).await?;
        let declared = response.declared_length;
        let mut stream = response.stream;

        let archive_path = layout::archive_path(&course.id)?;
        let mut writer = self.store.open_writer(&archive_path).await?;
        let mut received: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    writer.abort().await.ok();
                    return Err(e.into());
                }
            };
            if let Err(e) = writer.write_chunk(&chunk).await {
                writer.abort().await.ok();
                return Err(e.into());
            }
            received += chunk.len() as u64;
            tracker.download_progress(received, declared);
        }

        writer.commit().await?;
        debug!(course = %course.id, bytes = received, "package download complete");
        Ok(())
    }

    /// Expand every non-directory entry under the content subtree.
    async fn extract_entries(
        &self,
        course_id: &str,
        archive: &ZipArchive,
        tracker: &mut ProgressTracker,
    ) -> Result<(), PipelineError> {
        let total = archive.file_count();
        let mut extracted = 0usize;

        for entry in archive.entries() {
            let segments = entry.relative_segments()?;
            if entry.is_dir() {
                if !segments.is_empty() {
                    self.store
                        .ensure_directory(&layout::content_file(course_id, &segments)?)
                        .await?;
                }
                continue;
            }

            // Ancestors first, then the file itself.
            if segments.len() > 1 {
                let dirs = &segments[..segments.len() - 1];
                self.store
                    .ensure_directory(&layout::content_file(course_id, dirs)?)
                    .await?;
            }
            let bytes = archive.decompress(entry)?;
            self.store
                .write_file(&layout::content_file(course_id, &segments)?, bytes)
                .await?;

            extracted += 1;
            tracker.extraction_progress(extracted, total);
        }

        debug!(course = course_id, files = extracted, "extraction complete");
        Ok(())
    }

    /// Locate `imsmanifest.xml` at the archive root, parse and persist it.
    async fn parse_and_persist_manifest(
        &self,
        course_id: &str,
        archive: &ZipArchive,
    ) -> Result<crate::manifest::PackageManifest, PipelineError> {
        let entry = archive.entry(MANIFEST_FILE_NAME).ok_or_else(|| {
            PipelineError::InvalidPackage(format!(
                "{} not found at package root",
                MANIFEST_FILE_NAME
            ))
        })?;
        let xml = archive.decompress(entry)?;
        let manifest = parse_manifest(&String::from_utf8_lossy(&xml))?;

        self.store
            .write_file(
                &layout::manifest_path(course_id)?,
                serde_json::to_vec_pretty(&manifest)?,
            )
            .await?;
        Ok(manifest)
    }
}

fn advance(phase: &mut PipelinePhase, next: PipelinePhase, course_id: &str) {
    debug_assert!(
        phase.can_transition_to(next),
        "pipeline transition {} -> {}",
        phase,
        next
    );
    debug!(course = course_id, from = %phase, to = %next, "pipeline phase");
    *phase = next;
}
