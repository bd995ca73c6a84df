//! Zip archive reading for SCORM packages.
//!
//! SCORM courses ship as plain zip files with stored or deflate entries,
//! so this module implements exactly that subset: end-of-central-directory
//! lookup, central directory enumeration, per-entry decompression, and
//! CRC-32 verification. Zip64, encryption, and the other compression
//! methods are out of scope and rejected with distinct errors.

mod reader;
mod records;
#[cfg(test)]
pub(crate) mod testutil;

pub use reader::ZipArchive;
pub use records::{ArchiveEntry, ArchiveError, CompressionMethod};
