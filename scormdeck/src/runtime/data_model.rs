//! The SCORM runtime data model.
//!
//! A mapping from dot-separated element names to string values, scoped
//! to one (course, learner) pair for one playback session. Content
//! mutates it through the bridge; the provider's persisted values are
//! merged in when they arrive without clobbering anything content has
//! already written this session.

use std::collections::{HashMap, HashSet};

/// SCORM 1.2 lesson status element.
pub const LESSON_STATUS_ELEMENT: &str = "cmi.core.lesson_status";

/// SCORM 2004 completion status element.
pub const COMPLETION_STATUS_2004: &str = "cmi.completion_status";

/// SCORM 1.2 entry element ("resume" on a resumed attempt).
pub const ENTRY_ELEMENT: &str = "cmi.core.entry";

/// SCORM 1.2 exit element ("suspend" marks a resumable exit).
pub const EXIT_ELEMENT: &str = "cmi.core.exit";

/// Elements content may read but never write: learner identity, credit
/// and lesson mode, launch data, and the score bounds - in both dialect
/// spellings.
const READ_ONLY_ELEMENTS: &[&str] = &[
    "cmi.core.student_id",
    "cmi.core.student_name",
    "cmi.core.credit",
    "cmi.core.lesson_mode",
    "cmi.core.score.min",
    "cmi.core.score.max",
    "cmi.launch_data",
    "cmi.learner_id",
    "cmi.learner_name",
    "cmi.credit",
    "cmi.mode",
    "cmi.score.min",
    "cmi.score.max",
];

/// Lesson statuses normalized to "incomplete" on a non-resumed entry.
const UNSTARTED_STATUSES: &[&str] = &["", "not attempted", "unknown"];

/// Per-session value store with a cached completion status.
#[derive(Debug, Default)]
pub struct DataModel {
    values: HashMap<String, String>,
    /// Elements content wrote this session; merges never touch these.
    written: HashSet<String>,
    completion_status: String,
}

impl DataModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the minimal defaults a fresh session needs so content is not
    /// blocked waiting for the provider fetch.
    pub fn seed_defaults(&mut self, learner_id: &str) {
        self.values
            .insert("cmi.core.student_id".to_string(), learner_id.to_string());
        self.values
            .insert("cmi.core.student_name".to_string(), learner_id.to_string());
        self.values
            .insert(ENTRY_ELEMENT.to_string(), "ab-initio".to_string());
        self.values
            .insert(LESSON_STATUS_ELEMENT.to_string(), "not attempted".to_string());
        self.values
            .insert("cmi.core.score.raw".to_string(), String::new());
        self.completion_status = "not attempted".to_string();
    }

    /// Whether content is forbidden from writing this element.
    pub fn is_read_only(element: &str) -> bool {
        READ_ONLY_ELEMENTS.contains(&element)
    }

    /// Look up an element value.
    pub fn get(&self, element: &str) -> Option<&str> {
        self.values.get(element).map(String::as_str)
    }

    /// Store a content-written value.
    ///
    /// Read-only enforcement happens in the session, which knows how to
    /// report the error; this always writes.
    pub fn set(&mut self, element: &str, value: &str) {
        self.values.insert(element.to_string(), value.to_string());
        self.written.insert(element.to_string());
        if element == LESSON_STATUS_ELEMENT || element == COMPLETION_STATUS_2004 {
            self.completion_status = value.to_string();
        }
    }

    /// Merge values persisted by a prior session.
    ///
    /// Elements already written by content this session keep their fresh
    /// value; a slow provider response cannot clobber them. Returns true
    /// when the prior attempt ended in a resumable exit.
    pub fn merge_prior(&mut self, prior: HashMap<String, String>) -> bool {
        let resume = prior
            .get(EXIT_ELEMENT)
            .map(|exit| exit == "suspend")
            .unwrap_or(false);
        for (element, value) in prior {
            if self.written.contains(&element) {
                continue;
            }
            if element == LESSON_STATUS_ELEMENT || element == COMPLETION_STATUS_2004 {
                self.completion_status = value.clone();
            }
            self.values.insert(element, value);
        }
        if resume {
            self.values
                .insert(ENTRY_ELEMENT.to_string(), "resume".to_string());
        }
        resume
    }

    /// Apply entry-mode semantics: unless the session is a resume, an
    /// unstarted lesson status becomes "incomplete".
    pub fn normalize_lesson_status(&mut self, resume: bool) {
        if resume {
            return;
        }
        let status = self
            .values
            .get(LESSON_STATUS_ELEMENT)
            .map(String::as_str)
            .unwrap_or("");
        if UNSTARTED_STATUSES.contains(&status) {
            self.values
                .insert(LESSON_STATUS_ELEMENT.to_string(), "incomplete".to_string());
            self.completion_status = "incomplete".to_string();
        }
    }

    /// Cached completion status, updated by status writes.
    pub fn completion_status(&self) -> &str {
        &self.completion_status
    }

    /// Copy of the full model for persistence.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values.clone()
    }
}
