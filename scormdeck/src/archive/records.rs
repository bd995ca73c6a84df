//! Central directory records and entry metadata.

use std::io;

use thiserror::Error;

/// Errors that can occur while reading a zip archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// No end-of-central-directory record in the file.
    #[error("not a zip archive: end of central directory not found")]
    MissingEndOfDirectory,

    /// A record claimed more bytes than the archive contains.
    #[error("archive truncated while reading {0}")]
    Truncated(&'static str),

    /// A record signature did not match the expected value.
    #[error("bad {record} signature at offset {offset}")]
    BadSignature { record: &'static str, offset: u64 },

    /// Entry uses a compression method other than stored or deflate.
    #[error("entry {name:?} uses unsupported compression method {method}")]
    UnsupportedCompression { name: String, method: u16 },

    /// Entry is encrypted.
    #[error("entry {0:?} is encrypted")]
    Encrypted(String),

    /// Decompressed bytes did not match the recorded CRC-32.
    #[error("CRC mismatch for {name:?}: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },

    /// Entry path escapes the extraction root.
    #[error("entry path {0:?} is not a safe relative path")]
    UnsafeEntryPath(String),

    /// Decompression I/O failure.
    #[error("decompression failed: {0}")]
    Io(#[from] io::Error),
}

/// Compression method of a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Method 0 - bytes stored verbatim.
    Stored,
    /// Method 8 - raw deflate stream.
    Deflate,
}

impl CompressionMethod {
    /// Map the wire value, rejecting anything SCORM packages do not use.
    pub fn from_wire(name: &str, method: u16) -> Result<Self, ArchiveError> {
        match method {
            0 => Ok(Self::Stored),
            8 => Ok(Self::Deflate),
            other => Err(ArchiveError::UnsupportedCompression {
                name: name.to_string(),
                method: other,
            }),
        }
    }
}

/// One entry from the archive's central directory.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Entry path as recorded in the archive (forward slashes).
    pub name: String,
    /// Compression method.
    pub compression: CompressionMethod,
    /// Size of the compressed data.
    pub compressed_size: u64,
    /// Size after decompression.
    pub uncompressed_size: u64,
    /// CRC-32 of the decompressed data.
    pub crc32: u32,
    /// Offset of the entry's local file header.
    pub(crate) local_header_offset: u64,
}

impl ArchiveEntry {
    /// Whether this entry is a directory marker.
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }

    /// The entry path split into safe relative segments.
    ///
    /// Empty and `.` segments are dropped; `..` makes the whole path
    /// unsafe (it could escape the extraction root) and is rejected.
    pub fn relative_segments(&self) -> Result<Vec<String>, ArchiveError> {
        let normalized = self.name.replace('\\', "/");
        let mut segments = Vec::new();
        for segment in normalized.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return Err(ArchiveError::UnsafeEntryPath(self.name.clone())),
                other => segments.push(other.to_string()),
            }
        }
        if segments.is_empty() && !self.is_dir() {
            return Err(ArchiveError::UnsafeEntryPath(self.name.clone()));
        }
        Ok(segments)
    }
}
