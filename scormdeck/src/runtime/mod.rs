//! SCORM runtime API bridge.
//!
//! Implements the runtime object SCORM content expects to find: the
//! `Uninitialized -> Initialized -> Terminated` lifecycle, the
//! dot-separated data model with its read-only elements, the error-code
//! register content polls instead of catching exceptions, and the
//! optimistic commit that persists to the metadata provider in the
//! background.
//!
//! One [`RuntimeSession`] exists per (course, learner) playback session;
//! there is no process-global state. The [`RuntimeDispatcher`] accepts
//! both the SCORM 1.2 (`LMSInitialize`, ...) and SCORM 2004
//! (`Initialize`, ...) method names, so the host can hand one object to
//! content authored against either dialect.

mod commit;
mod data_model;
mod dispatch;
mod error_codes;
pub(crate) mod session;

pub use commit::CommitReceipt;
pub use data_model::{DataModel, ENTRY_ELEMENT, EXIT_ELEMENT, LESSON_STATUS_ELEMENT};
pub use dispatch::{ApiDialect, RuntimeDispatcher};
pub use error_codes::{error_string, ScormErrorCode};
pub use session::{RuntimeSession, SessionContext, SessionState};
