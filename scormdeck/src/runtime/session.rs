//! The per-session runtime state machine.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use crate::catalog::LearnerDataStore;
use crate::manifest::ScormVersion;

use super::commit::CommitReceipt;
use super::data_model::DataModel;
use super::error_codes::{error_string, ScormErrorCode};

/// Lifecycle state; `Terminated` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initialized,
    Terminated,
}

/// The (course, learner) pair a session is scoped to.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub course_id: String,
    pub learner_id: String,
}

impl SessionContext {
    pub fn new(course_id: impl Into<String>, learner_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            learner_id: learner_id.into(),
        }
    }
}

/// One playback session's runtime API state.
///
/// Constructed per (course, learner) pair and passed by reference to
/// every bridge operation; dropping it drops the session. Failures are
/// reported to content through return values and the error register,
/// never as Rust errors.
///
/// Must be created inside a tokio runtime: Initialize and Commit spawn
/// background tasks on the current handle.
pub struct RuntimeSession {
    context: SessionContext,
    version: ScormVersion,
    provider: Arc<dyn LearnerDataStore>,
    state: SessionState,
    model: Arc<RwLock<DataModel>>,
    last_error: Arc<Mutex<ScormErrorCode>>,
    handle: Handle,
    final_commit: Option<CommitReceipt>,
}

impl RuntimeSession {
    /// Create a session in the `Uninitialized` state.
    pub fn new(
        context: SessionContext,
        version: ScormVersion,
        provider: Arc<dyn LearnerDataStore>,
    ) -> Self {
        Self {
            context,
            version,
            provider,
            state: SessionState::Uninitialized,
            model: Arc::new(RwLock::new(DataModel::new())),
            last_error: Arc::new(Mutex::new(ScormErrorCode::NoError)),
            handle: Handle::current(),
            final_commit: None,
        }
    }

    /// Start the session.
    ///
    /// Seeds the default data model synchronously and fetches prior
    /// persisted values in the background, so content is never blocked
    /// on the provider. Calling Initialize twice is tolerated with a
    /// warning; a missing course or learner id fails with error 101.
    pub fn initialize(&mut self) -> bool {
        match self.state {
            SessionState::Initialized => {
                warn!(course = %self.context.course_id, "Initialize called on an already initialized session");
                self.set_error(ScormErrorCode::NoError);
                true
            }
            SessionState::Terminated => {
                self.set_error(ScormErrorCode::GeneralException);
                false
            }
            SessionState::Uninitialized => {
                if self.context.course_id.is_empty() || self.context.learner_id.is_empty() {
                    warn!("Initialize without course or learner context");
                    self.set_error(ScormErrorCode::GeneralException);
                    return false;
                }

                {
                    let mut model = self.model.write();
                    model.seed_defaults(&self.context.learner_id);
                    model.normalize_lesson_status(false);
                }
                self.spawn_prior_data_fetch();

                self.state = SessionState::Initialized;
                self.set_error(ScormErrorCode::NoError);
                debug!(
                    course = %self.context.course_id,
                    learner = %self.context.learner_id,
                    version = %self.version,
                    "runtime session initialized"
                );
                true
            }
        }
    }

    /// End the session, triggering the final commit.
    ///
    /// The session becomes `Terminated` and stays that way; further
    /// Terminate calls (and all data operations) fail with error 301.
    pub fn terminate(&mut self) -> bool {
        if self.state != SessionState::Initialized {
            self.set_error(ScormErrorCode::NotInitialized);
            return false;
        }
        let receipt = self.spawn_commit();
        self.final_commit = Some(receipt);
        self.state = SessionState::Terminated;
        self.set_error(ScormErrorCode::NoError);
        debug!(course = %self.context.course_id, "runtime session terminated");
        true
    }

    /// Read one data model element.
    ///
    /// Returns the stored value, or the empty string with error 401 for
    /// an element absent from the model.
    pub fn get_value(&self, element: &str) -> String {
        if self.state != SessionState::Initialized {
            self.set_error(ScormErrorCode::NotInitialized);
            return String::new();
        }
        match self.model.read().get(element) {
            Some(value) => {
                trace!(element, value, "GetValue");
                self.set_error(ScormErrorCode::NoError);
                value.to_string()
            }
            None => {
                trace!(element, "GetValue: undefined element");
                self.set_error(ScormErrorCode::UndefinedElement);
                String::new()
            }
        }
    }

    /// Write one data model element.
    ///
    /// Read-only elements fail with error 403 and keep their prior
    /// value.
    pub fn set_value(&self, element: &str, value: &str) -> bool {
        if self.state != SessionState::Initialized {
            self.set_error(ScormErrorCode::NotInitialized);
            return false;
        }
        if DataModel::is_read_only(element) {
            trace!(element, "SetValue rejected: read-only element");
            self.set_error(ScormErrorCode::ReadOnlyElement);
            return false;
        }
        self.model.write().set(element, value);
        trace!(element, value, "SetValue");
        self.set_error(ScormErrorCode::NoError);
        true
    }

    /// Persist the data model to the provider.
    ///
    /// The receipt's `accepted` flag is the optimistic answer returned
    /// to content; persistence completes in the background and records
    /// a failure only in the error register.
    pub fn commit(&self) -> CommitReceipt {
        if self.state != SessionState::Initialized {
            self.set_error(ScormErrorCode::NotInitialized);
            return CommitReceipt::rejected();
        }
        self.spawn_commit()
    }

    /// Wire code of the last error.
    pub fn get_last_error(&self) -> &'static str {
        self.last_error.lock().as_str()
    }

    /// Message for a wire code.
    pub fn get_error_string(&self, code: &str) -> &'static str {
        error_string(code)
    }

    /// Diagnostic text; an empty argument describes the last error.
    pub fn get_diagnostic(&self, code: &str) -> String {
        if code.is_empty() {
            let last = *self.last_error.lock();
            format!("{}: {}", last.as_str(), last.message())
        } else {
            error_string(code).to_string()
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The (course, learner) context.
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Dialect the course was authored against.
    pub fn version(&self) -> ScormVersion {
        self.version
    }

    /// Cached completion status for host-side status queries.
    pub fn completion_status(&self) -> String {
        self.model.read().completion_status().to_string()
    }

    /// The final commit triggered by Terminate, for hosts that await it
    /// during teardown.
    pub fn take_final_commit(&mut self) -> Option<CommitReceipt> {
        self.final_commit.take()
    }

    fn set_error(&self, code: ScormErrorCode) {
        *self.last_error.lock() = code;
    }

    fn spawn_prior_data_fetch(&self) {
        let provider = Arc::clone(&self.provider);
        let model = Arc::clone(&self.model);
        let course = self.context.course_id.clone();
        let learner = self.context.learner_id.clone();
        self.handle.spawn(async move {
            match provider.load_runtime_data(&course, &learner).await {
                Ok(Some(prior)) => {
                    let mut model = model.write();
                    let resume = model.merge_prior(prior);
                    model.normalize_lesson_status(resume);
                    debug!(course = %course, learner = %learner, resume, "merged prior runtime data");
                }
                Ok(None) => {
                    debug!(course = %course, learner = %learner, "no prior runtime data recorded");
                }
                Err(e) => {
                    warn!(course = %course, learner = %learner, error = %e, "failed to fetch prior runtime data");
                }
            }
        });
    }

    fn spawn_commit(&self) -> CommitReceipt {
        let snapshot = self.model.read().snapshot();
        let provider = Arc::clone(&self.provider);
        let last_error = Arc::clone(&self.last_error);
        let course = self.context.course_id.clone();
        let learner = self.context.learner_id.clone();
        let (tx, rx) = oneshot::channel();

        self.handle.spawn(async move {
            let result = provider.save_runtime_data(&course, &learner, snapshot).await;
            if let Err(e) = &result {
                warn!(course = %course, learner = %learner, error = %e, "background commit failed");
                *last_error.lock() = ScormErrorCode::GeneralException;
            }
            tx.send(result.map_err(|e| e.to_string())).ok();
        });

        self.set_error(ScormErrorCode::NoError);
        CommitReceipt::accepted(rx)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use crate::catalog::CatalogError;
    use crate::runtime::data_model::{ENTRY_ELEMENT, EXIT_ELEMENT, LESSON_STATUS_ELEMENT};
    use crate::store::BoxFuture;

    /// Mock provider with canned prior data and recorded saves.
    pub struct MockLearnerStore {
        pub prior: Option<HashMap<String, String>>,
        pub saved: Arc<Mutex<Vec<HashMap<String, String>>>>,
        pub fail_save: bool,
    }

    impl MockLearnerStore {
        pub fn empty() -> Self {
            Self {
                prior: None,
                saved: Arc::new(Mutex::new(Vec::new())),
                fail_save: false,
            }
        }

        pub fn with_prior(prior: HashMap<String, String>) -> Self {
            Self {
                prior: Some(prior),
                ..Self::empty()
            }
        }
    }

    impl LearnerDataStore for MockLearnerStore {
        fn load_runtime_data<'a>(
            &'a self,
            _course_id: &'a str,
            _learner_id: &'a str,
        ) -> BoxFuture<'a, Result<Option<HashMap<String, String>>, CatalogError>> {
            let prior = self.prior.clone();
            Box::pin(async move { Ok(prior) })
        }

        fn save_runtime_data<'a>(
            &'a self,
            _course_id: &'a str,
            _learner_id: &'a str,
            values: HashMap<String, String>,
        ) -> BoxFuture<'a, Result<(), CatalogError>> {
            let saved = Arc::clone(&self.saved);
            let fail = self.fail_save;
            Box::pin(async move {
                if fail {
                    return Err(CatalogError::Transport("backend down".to_string()));
                }
                saved.lock().push(values);
                Ok(())
            })
        }
    }

    fn session_with(provider: MockLearnerStore) -> RuntimeSession {
        RuntimeSession::new(
            SessionContext::new("c-1", "learner-1"),
            ScormVersion::V1_2,
            Arc::new(provider),
        )
    }

    /// Let spawned background tasks run to completion.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    #[tokio::test]
    async fn test_fresh_session_reports_incomplete() {
        let mut session = session_with(MockLearnerStore::empty());
        assert!(session.initialize());
        settle().await;

        assert_eq!(session.get_value(LESSON_STATUS_ELEMENT), "incomplete");
        assert_eq!(session.get_last_error(), "0");
    }

    #[tokio::test]
    async fn test_operations_before_initialize_fail_with_301() {
        let session = session_with(MockLearnerStore::empty());

        assert_eq!(session.get_value("cmi.core.lesson_status"), "");
        assert_eq!(session.get_last_error(), "301");
        assert!(!session.set_value("cmi.core.score.raw", "10"));
        assert_eq!(session.get_last_error(), "301");
        assert!(!session.commit().accepted);
        assert_eq!(session.get_last_error(), "301");
    }

    #[tokio::test]
    async fn test_initialize_without_context_fails_with_101() {
        let mut session = RuntimeSession::new(
            SessionContext::new("", "learner-1"),
            ScormVersion::V1_2,
            Arc::new(MockLearnerStore::empty()),
        );
        assert!(!session.initialize());
        assert_eq!(session.get_last_error(), "101");
        assert_eq!(session.state(), SessionState::Uninitialized);
    }

    #[tokio::test]
    async fn test_double_initialize_is_tolerated() {
        let mut session = session_with(MockLearnerStore::empty());
        assert!(session.initialize());
        assert!(session.initialize());
        assert_eq!(session.get_last_error(), "0");
        assert_eq!(session.state(), SessionState::Initialized);
    }

    #[tokio::test]
    async fn test_set_then_get_round_trip() {
        let mut session = session_with(MockLearnerStore::empty());
        session.initialize();

        assert!(session.set_value("cmi.core.score.raw", "87"));
        assert_eq!(session.get_value("cmi.core.score.raw"), "87");
        assert_eq!(session.get_last_error(), "0");
    }

    #[tokio::test]
    async fn test_read_only_elements_reject_writes() {
        let mut session = session_with(MockLearnerStore::empty());
        session.initialize();

        let before = session.get_value("cmi.core.student_id");
        assert!(!session.set_value("cmi.core.student_id", "intruder"));
        assert_eq!(session.get_last_error(), "403");
        assert_eq!(session.get_value("cmi.core.student_id"), before);
    }

    #[tokio::test]
    async fn test_undefined_element_returns_empty_with_401() {
        let mut session = session_with(MockLearnerStore::empty());
        session.initialize();

        assert_eq!(session.get_value("cmi.no.such.element"), "");
        assert_eq!(session.get_last_error(), "401");
    }

    #[tokio::test]
    async fn test_status_write_updates_completion_cache() {
        let mut session = session_with(MockLearnerStore::empty());
        session.initialize();

        session.set_value(LESSON_STATUS_ELEMENT, "completed");
        assert_eq!(session.completion_status(), "completed");
    }

    #[tokio::test]
    async fn test_commit_persists_in_background() {
        let store = MockLearnerStore::empty();
        let saved = Arc::clone(&store.saved);
        let mut session = session_with(store);
        session.initialize();
        session.set_value("cmi.suspend_data", "bookmark=2");

        let receipt = session.commit();
        assert!(receipt.accepted);
        receipt.completed().await.unwrap();

        let saved = saved.lock();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].get("cmi.suspend_data").unwrap(), "bookmark=2");
    }

    #[tokio::test]
    async fn test_failed_commit_lands_in_error_register_only() {
        let store = MockLearnerStore {
            fail_save: true,
            ..MockLearnerStore::empty()
        };
        let mut session = session_with(store);
        session.initialize();

        let receipt = session.commit();
        // Optimistic contract: the synchronous answer is still success.
        assert!(receipt.accepted);
        assert!(receipt.completed().await.is_err());
        assert_eq!(session.get_last_error(), "101");
    }

    #[tokio::test]
    async fn test_terminate_runs_final_commit_and_is_terminal() {
        let store = MockLearnerStore::empty();
        let saved = Arc::clone(&store.saved);
        let mut session = session_with(store);
        session.initialize();
        session.set_value(LESSON_STATUS_ELEMENT, "passed");

        assert!(session.terminate());
        session.take_final_commit().unwrap().completed().await.unwrap();
        assert_eq!(saved.lock().len(), 1);

        // Terminal: everything now fails with 301.
        assert!(!session.terminate());
        assert_eq!(session.get_last_error(), "301");
        assert_eq!(session.get_value(LESSON_STATUS_ELEMENT), "");
        assert_eq!(session.get_last_error(), "301");
        assert!(!session.set_value("cmi.core.score.raw", "1"));
        assert!(!session.commit().accepted);
    }

    #[tokio::test]
    async fn test_resumed_session_keeps_prior_status() {
        let mut prior = HashMap::new();
        prior.insert(EXIT_ELEMENT.to_string(), "suspend".to_string());
        prior.insert(LESSON_STATUS_ELEMENT.to_string(), "not attempted".to_string());
        prior.insert("cmi.suspend_data".to_string(), "page=7".to_string());

        let mut session = session_with(MockLearnerStore::with_prior(prior));
        session.initialize();
        settle().await;

        assert_eq!(session.get_value(ENTRY_ELEMENT), "resume");
        assert_eq!(session.get_value(LESSON_STATUS_ELEMENT), "not attempted");
        assert_eq!(session.get_value("cmi.suspend_data"), "page=7");
    }

    #[tokio::test]
    async fn test_non_resume_prior_normalizes_status() {
        let mut prior = HashMap::new();
        prior.insert(LESSON_STATUS_ELEMENT.to_string(), "unknown".to_string());

        let mut session = session_with(MockLearnerStore::with_prior(prior));
        session.initialize();
        settle().await;

        assert_eq!(session.get_value(LESSON_STATUS_ELEMENT), "incomplete");
    }

    #[tokio::test]
    async fn test_diagnostics() {
        let session = session_with(MockLearnerStore::empty());
        session.get_value("x");
        assert_eq!(session.get_diagnostic(""), "301: Not initialized");
        assert_eq!(session.get_error_string("403"), "Data model element is read only");
        assert_eq!(session.get_error_string("777"), "Unknown error");
    }
}
