//! Validated store paths.
//!
//! A [`StorePath`] is an ordered list of non-empty segment names. Validation
//! happens once, at construction: empty segments, `.`, `..`, and segments
//! containing path separators are rejected rather than silently creating
//! ambiguous entries deeper in the store.

use std::fmt;

use super::error::StoreError;

/// An ordered, validated sequence of path segments addressing a store entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorePath(Vec<String>);

impl StorePath {
    /// Build a path from segments, validating each one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyPath`] for zero segments and
    /// [`StoreError::InvalidSegment`] for empty, `.`-like, or
    /// separator-containing segments.
    pub fn new<I, S>(segments: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(StoreError::EmptyPath);
        }
        for segment in &segments {
            validate_segment(segment)?;
        }
        Ok(Self(segments))
    }

    /// Build a single-segment path.
    pub fn single(segment: impl Into<String>) -> Result<Self, StoreError> {
        Self::new([segment.into()])
    }

    /// Return a new path with one more segment appended.
    pub fn join(&self, segment: impl Into<String>) -> Result<Self, StoreError> {
        let segment = segment.into();
        validate_segment(&segment)?;
        let mut segments = self.0.clone();
        segments.push(segment);
        Ok(Self(segments))
    }

    /// Return a new path with several segments appended.
    pub fn extend<I, S>(&self, segments: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all = self.0.clone();
        for segment in segments {
            let segment = segment.into();
            validate_segment(&segment)?;
            all.push(segment);
        }
        Ok(Self(all))
    }

    /// The path segments in order.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The final segment (file or directory name).
    pub fn leaf(&self) -> &str {
        // Invariant: a StorePath always has at least one segment.
        self.0.last().map(String::as_str).unwrap_or("")
    }

    /// The path without its final segment, or `None` at the top level.
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() <= 1 {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

fn validate_segment(segment: &str) -> Result<(), StoreError> {
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains('/')
        || segment.contains('\\')
        || segment.contains('\0')
    {
        return Err(StoreError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}
