//! SCORM error-code register.
//!
//! Errors are reported to content through return values plus this code
//! register, never as exceptions; `"0"` means no error. The string
//! lookups are pure table lookups and cannot fail - unknown codes map to
//! a generic message.

/// Error codes the runtime can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScormErrorCode {
    /// "0" - no error.
    NoError,
    /// "101" - general exception (missing session context, failed
    /// background persistence).
    GeneralException,
    /// "301" - operation before Initialize or after Terminate.
    NotInitialized,
    /// "401" - element not in the data model.
    UndefinedElement,
    /// "403" - element is read-only.
    ReadOnlyElement,
}

impl ScormErrorCode {
    /// Wire representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoError => "0",
            Self::GeneralException => "101",
            Self::NotInitialized => "301",
            Self::UndefinedElement => "401",
            Self::ReadOnlyElement => "403",
        }
    }

    /// Human-readable message for the code.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoError => "No error",
            Self::GeneralException => "General exception",
            Self::NotInitialized => "Not initialized",
            Self::UndefinedElement => "Undefined data model element",
            Self::ReadOnlyElement => "Data model element is read only",
        }
    }

    /// Parse a wire code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(Self::NoError),
            "101" => Some(Self::GeneralException),
            "301" => Some(Self::NotInitialized),
            "401" => Some(Self::UndefinedElement),
            "403" => Some(Self::ReadOnlyElement),
            _ => None,
        }
    }
}

/// Message for a wire code; unknown codes get a generic message instead
/// of failing.
pub fn error_string(code: &str) -> &'static str {
    ScormErrorCode::from_code(code)
        .map(|c| c.message())
        .unwrap_or("Unknown error")
}
