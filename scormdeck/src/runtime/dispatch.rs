//! Dual-dialect method dispatch.
//!
//! SCORM 1.2 content calls `LMSInitialize`/`LMSFinish`/`LMSGetValue`...;
//! SCORM 2004 content calls `Initialize`/`Terminate`/`GetValue`...
//! The dispatcher accepts both namings against one session, so the host
//! installs a single object into the content frame at mount time and
//! content authored against either dialect finds what it expects.
//! Unknown method names are declined so the host can fall through.

use parking_lot::Mutex;

use crate::manifest::ScormVersion;

use super::session::RuntimeSession;

/// The two global object names content looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiDialect {
    /// SCORM 1.2 - content looks for a global `API` object.
    Scorm12,
    /// SCORM 2004 - content looks for `API_1484_11`.
    Scorm2004,
}

impl ApiDialect {
    /// Dialect matching a manifest version.
    pub fn for_version(version: ScormVersion) -> Self {
        match version {
            ScormVersion::V1_2 => Self::Scorm12,
            ScormVersion::V2004 => Self::Scorm2004,
        }
    }

    /// Name the content host should install the runtime object under.
    pub fn object_name(&self) -> &'static str {
        match self {
            Self::Scorm12 => "API",
            Self::Scorm2004 => "API_1484_11",
        }
    }
}

/// String-call surface over a [`RuntimeSession`].
///
/// The content host relays each runtime call as a method name plus
/// string arguments; results come back as the strings the protocol
/// defines (`"true"`/`"false"` for the boolean operations).
pub struct RuntimeDispatcher {
    session: Mutex<RuntimeSession>,
}

impl RuntimeDispatcher {
    /// Wrap a session for content-facing dispatch.
    pub fn new(session: RuntimeSession) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }

    /// Dialect of the wrapped session's course.
    pub fn dialect(&self) -> ApiDialect {
        ApiDialect::for_version(self.session.lock().version())
    }

    /// Dispatch one runtime call.
    ///
    /// Returns `None` for a method name outside the runtime surface;
    /// the host's normal handling applies then.
    pub fn call(&self, method: &str, args: &[&str]) -> Option<String> {
        let mut session = self.session.lock();
        let arg = |i: usize| args.get(i).copied().unwrap_or("");
        let result = match method {
            "LMSInitialize" | "Initialize" => bool_str(session.initialize()),
            "LMSFinish" | "Terminate" => bool_str(session.terminate()),
            "LMSGetValue" | "GetValue" => session.get_value(arg(0)),
            "LMSSetValue" | "SetValue" => bool_str(session.set_value(arg(0), arg(1))),
            "LMSCommit" | "Commit" => bool_str(session.commit().accepted),
            "LMSGetLastError" | "GetLastError" => session.get_last_error().to_string(),
            "LMSGetErrorString" | "GetErrorString" => session.get_error_string(arg(0)).to_string(),
            "LMSGetDiagnostic" | "GetDiagnostic" => session.get_diagnostic(arg(0)),
            _ => return None,
        };
        Some(result)
    }

    /// Run a closure against the wrapped session.
    ///
    /// Host-side access (teardown, status queries) without going through
    /// the string surface.
    pub fn with_session<T>(&self, f: impl FnOnce(&mut RuntimeSession) -> T) -> T {
        f(&mut self.session.lock())
    }
}

fn bool_str(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}
