//! Core traits for the package store.
//!
//! The [`PackageStore`] trait is the storage seam of the whole pipeline:
//! downloads stream into it, extraction expands into it, and the content
//! resolver reads back out of it. It is deliberately domain-light - course
//! layout conventions live in [`super::layout`], not here.
//!
//! # Dyn Compatibility
//!
//! Async methods return `Pin<Box<dyn Future>>` so the store can be held as
//! `Arc<dyn PackageStore>` and swapped between the disk and memory providers.

use std::future::Future;
use std::pin::Pin;

use super::error::StoreError;
use super::path::StorePath;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A scoped write handle for streaming bytes into a single file.
///
/// A writer must be explicitly closed on every exit path: [`commit`] makes
/// the write durable and visible, [`abort`] discards it. Until one of the
/// two is called, readers never observe a partially written file.
///
/// [`commit`]: StoreWriter::commit
/// [`abort`]: StoreWriter::abort
pub trait StoreWriter: Send {
    /// Append a chunk to the in-progress write.
    fn write_chunk<'a>(&'a mut self, chunk: &'a [u8]) -> BoxFuture<'a, Result<(), StoreError>>;

    /// Flush and publish the file at its final path.
    fn commit(self: Box<Self>) -> BoxFuture<'static, Result<(), StoreError>>;

    /// Discard everything written through this handle.
    fn abort(self: Box<Self>) -> BoxFuture<'static, Result<(), StoreError>>;
}

/// Durable hierarchical byte storage addressed by validated path segments.
///
/// Invariants all providers uphold:
///
/// - no entry exists without its ancestor directories existing
/// - directory creation is idempotent
/// - [`read_file`] on a missing path fails with [`StoreError::NotFound`]
/// - [`remove_subtree`] removes everything or returns an error; it never
///   partially fails silently
///
/// [`read_file`]: PackageStore::read_file
/// [`remove_subtree`]: PackageStore::remove_subtree
pub trait PackageStore: Send + Sync {
    /// Create the top-level namespace directory if absent. Idempotent.
    fn ensure_root(&self) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Create every missing directory along the path. No-op for existing ones.
    fn ensure_directory<'a>(&'a self, path: &'a StorePath)
        -> BoxFuture<'a, Result<(), StoreError>>;

    /// Create or replace the file at `path` with `bytes` in one step.
    ///
    /// Equivalent to opening a writer, writing once, and committing.
    fn write_file<'a>(
        &'a self,
        path: &'a StorePath,
        bytes: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    /// Open a scoped write handle for streaming content to `path`.
    fn open_writer<'a>(
        &'a self,
        path: &'a StorePath,
    ) -> BoxFuture<'a, Result<Box<dyn StoreWriter>, StoreError>>;

    /// Read the full byte content of the file at `path`.
    fn read_file<'a>(&'a self, path: &'a StorePath) -> BoxFuture<'a, Result<Vec<u8>, StoreError>>;

    /// Whether a file or directory exists at `path`.
    fn exists<'a>(&'a self, path: &'a StorePath) -> BoxFuture<'a, Result<bool, StoreError>>;

    /// List the names of direct children of the directory at `path`.
    fn list_directory<'a>(
        &'a self,
        path: &'a StorePath,
    ) -> BoxFuture<'a, Result<Vec<String>, StoreError>>;

    /// Recursively delete the entry at `path` and everything under it.
    ///
    /// Deleting a path that does not exist is a successful no-op.
    fn remove_subtree<'a>(&'a self, path: &'a StorePath) -> BoxFuture<'a, Result<(), StoreError>>;
}
