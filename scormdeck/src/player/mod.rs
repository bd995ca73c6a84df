//! Player orchestration.
//!
//! Sequences one playback session end to end: presence check against the
//! store, install through the pipeline if the course is absent, course
//! record lookup, runtime bridge construction, and teardown with the
//! final commit. Also enforces the shared-store policy: at most one
//! in-flight download per course id.

mod readiness;

pub use readiness::ReadinessGate;

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{CatalogError, CourseCatalog, LearnerDataStore};
use crate::content::ContentResolver;
use crate::pipeline::{
    CourseRecord, PackageFetcher, PackageInstaller, PipelineError, ProgressCallback,
};
use crate::runtime::{RuntimeDispatcher, RuntimeSession, SessionContext, SessionState};
use crate::store::PackageStore;

/// Errors surfaced by the orchestrator.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Metadata provider failure.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Download/extraction failure.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Another session is already downloading this course.
    #[error("course {0:?} is already being downloaded")]
    DownloadInProgress(String),
}

/// Orchestrates store, catalog, pipeline, and runtime bridge for
/// playback sessions.
pub struct Player {
    catalog: Arc<dyn CourseCatalog>,
    learner_data: Arc<dyn LearnerDataStore>,
    installer: PackageInstaller,
    resolver: Arc<ContentResolver>,
    in_flight: Mutex<HashSet<String>>,
}

impl Player {
    /// Wire up a player over its collaborators.
    pub fn new(
        store: Arc<dyn PackageStore>,
        catalog: Arc<dyn CourseCatalog>,
        learner_data: Arc<dyn LearnerDataStore>,
        fetcher: Arc<dyn PackageFetcher>,
        base_origin: impl Into<String>,
        content_root: impl Into<String>,
    ) -> Self {
        let resolver = Arc::new(ContentResolver::new(Arc::clone(&store), content_root));
        Self {
            catalog,
            learner_data,
            installer: PackageInstaller::new(store, fetcher, base_origin),
            resolver,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// The resolver serving this player's content namespace.
    pub fn resolver(&self) -> Arc<ContentResolver> {
        Arc::clone(&self.resolver)
    }

    /// Whether the course is fully installed.
    pub async fn is_installed(&self, course_id: &str) -> Result<bool, PlayerError> {
        Ok(self.installer.is_installed(course_id).await?)
    }

    /// Remove a cached course entirely.
    pub async fn remove_course(&self, course_id: &str) -> Result<(), PlayerError> {
        Ok(self.installer.remove(course_id).await?)
    }

    /// Read an installed course's record without touching the network.
    pub async fn course_record(&self, course_id: &str) -> Result<CourseRecord, PlayerError> {
        Ok(self.installer.load_record(course_id).await?)
    }

    /// Make sure the course is installed, downloading it if absent.
    ///
    /// Concurrent calls for the same course id are rejected with
    /// [`PlayerError::DownloadInProgress`]; the store itself takes no
    /// locks.
    pub async fn ensure_course(
        &self,
        course_id: &str,
        progress: Option<ProgressCallback>,
    ) -> Result<CourseRecord, PlayerError> {
        if self.installer.is_installed(course_id).await? {
            return Ok(self.installer.load_record(course_id).await?);
        }

        let _guard = self.begin_download(course_id)?;
        let course = self.catalog.get_course(course_id).await?;
        info!(course = course_id, name = %course.name, "downloading course");
        Ok(self.installer.install(&course, progress).await?)
    }

    /// Start a playback session, installing the course first if needed.
    ///
    /// The returned session already carries the runtime object (the api
    /// is installed before any frame can load); the host marks frame
    /// load and then drives the Initialize handshake via
    /// [`PlaybackSession::begin`].
    pub async fn launch(
        &self,
        course_id: &str,
        learner_id: &str,
        progress: Option<ProgressCallback>,
    ) -> Result<PlaybackSession, PlayerError> {
        let record = self.ensure_course(course_id, progress).await?;

        let session = RuntimeSession::new(
            SessionContext::new(course_id, learner_id),
            record.manifest.version,
            Arc::clone(&self.learner_data),
        );
        let api = Arc::new(RuntimeDispatcher::new(session));
        let launch_path = self
            .resolver
            .launch_path(course_id, &record.manifest.launch_url);

        let mut readiness = ReadinessGate::new();
        readiness.mark_api_installed();

        info!(course = course_id, learner = learner_id, path = %launch_path, "playback session ready");
        Ok(PlaybackSession {
            record,
            api,
            launch_path,
            readiness,
        })
    }

    fn begin_download(&self, course_id: &str) -> Result<InFlightGuard<'_>, PlayerError> {
        let mut in_flight = self.in_flight.lock();
        if !in_flight.insert(course_id.to_string()) {
            return Err(PlayerError::DownloadInProgress(course_id.to_string()));
        }
        Ok(InFlightGuard {
            set: &self.in_flight,
            course_id: course_id.to_string(),
        })
    }
}

/// Releases the per-course download slot on every exit path.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    course_id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.course_id);
    }
}

/// One mounted playback session.
pub struct PlaybackSession {
    record: CourseRecord,
    api: Arc<RuntimeDispatcher>,
    launch_path: String,
    readiness: ReadinessGate,
}

impl PlaybackSession {
    /// The installed course + manifest record.
    pub fn record(&self) -> &CourseRecord {
        &self.record
    }

    /// The runtime object to hand to the content host.
    pub fn api(&self) -> Arc<RuntimeDispatcher> {
        Arc::clone(&self.api)
    }

    /// Content-namespace path of the course's entry document.
    pub fn launch_path(&self) -> &str {
        &self.launch_path
    }

    /// Current readiness state.
    pub fn readiness(&self) -> ReadinessGate {
        self.readiness
    }

    /// The host observed the content frame's load completion.
    pub fn frame_loaded(&mut self) {
        self.readiness.mark_frame_loaded();
    }

    /// Drive the Initialize handshake.
    ///
    /// Refused until the frame load has been observed; the three-way
    /// gate (api installed, frame loaded, session initialized) must hold
    /// before content calls mean anything.
    pub fn begin(&mut self) -> bool {
        if !self.readiness.frame_loaded() {
            warn!("begin() before frame load; handshake refused");
            return false;
        }
        let initialized = self
            .api
            .with_session(|session| session.initialize());
        if initialized {
            self.readiness.mark_session_initialized();
        }
        initialized
    }

    /// Whether content calls are meaningful yet.
    pub fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }

    /// Tear the session down: terminate if initialized and await the
    /// final commit's background persistence.
    pub async fn teardown(self) -> Result<(), String> {
        let receipt = self.api.with_session(|session| {
            if session.state() == SessionState::Initialized {
                session.terminate();
            }
            session.take_final_commit()
        });
        match receipt {
            Some(receipt) => receipt.completed().await,
            None => Ok(()),
        }
    }
}
