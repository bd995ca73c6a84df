//! In-memory package store provider.
//!
//! Keeps the whole hierarchy in a map guarded by a `parking_lot` lock.
//! Used by tests and by hosts that want a throwaway preview store; the
//! operations complete synchronously but keep the async trait surface so
//! callers cannot tell the providers apart.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use super::error::StoreError;
use super::path::StorePath;
use super::traits::{BoxFuture, PackageStore, StoreWriter};

#[derive(Debug, Default)]
struct MemoryState {
    files: HashMap<Vec<String>, Vec<u8>>,
    dirs: HashSet<Vec<String>>,
}

impl MemoryState {
    fn insert_ancestors(&mut self, segments: &[String]) {
        for depth in 1..segments.len() {
            self.dirs.insert(segments[..depth].to_vec());
        }
    }
}

/// Ephemeral package store holding all entries in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryPackageStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryPackageStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of files currently stored.
    pub fn file_count(&self) -> usize {
        self.state.read().files.len()
    }
}

impl PackageStore for MemoryPackageStore {
    fn ensure_root(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        // The root namespace is implicit for the in-memory provider.
        Box::pin(async { Ok(()) })
    }

    fn ensure_directory<'a>(
        &'a self,
        path: &'a StorePath,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        let mut state = self.state.write();
        state.insert_ancestors(path.segments());
        state.dirs.insert(path.segments().to_vec());
        Box::pin(async { Ok(()) })
    }

    fn write_file<'a>(
        &'a self,
        path: &'a StorePath,
        bytes: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        let mut state = self.state.write();
        state.insert_ancestors(path.segments());
        state.files.insert(path.segments().to_vec(), bytes);
        Box::pin(async { Ok(()) })
    }

    fn open_writer<'a>(
        &'a self,
        path: &'a StorePath,
    ) -> BoxFuture<'a, Result<Box<dyn StoreWriter>, StoreError>> {
        let writer = MemoryStoreWriter {
            buffer: Some(Vec::new()),
            segments: path.segments().to_vec(),
            state: Arc::clone(&self.state),
        };
        Box::pin(async move { Ok(Box::new(writer) as Box<dyn StoreWriter>) })
    }

    fn read_file<'a>(&'a self, path: &'a StorePath) -> BoxFuture<'a, Result<Vec<u8>, StoreError>> {
        let result = self
            .state
            .read()
            .files
            .get(path.segments())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()));
        Box::pin(async move { result })
    }

    fn exists<'a>(&'a self, path: &'a StorePath) -> BoxFuture<'a, Result<bool, StoreError>> {
        let state = self.state.read();
        let found =
            state.files.contains_key(path.segments()) || state.dirs.contains(path.segments());
        Box::pin(async move { Ok(found) })
    }

    fn list_directory<'a>(
        &'a self,
        path: &'a StorePath,
    ) -> BoxFuture<'a, Result<Vec<String>, StoreError>> {
        let state = self.state.read();
        let result = if state.dirs.contains(path.segments()) {
            let depth = path.depth();
            let mut names: Vec<String> = state
                .files
                .keys()
                .chain(state.dirs.iter())
                .filter(|key| key.len() == depth + 1 && key.starts_with(path.segments()))
                .map(|key| key[depth].clone())
                .collect();
            names.sort();
            names.dedup();
            Ok(names)
        } else {
            Err(StoreError::NotFound(path.to_string()))
        };
        Box::pin(async move { result })
    }

    fn remove_subtree<'a>(&'a self, path: &'a StorePath) -> BoxFuture<'a, Result<(), StoreError>> {
        let mut state = self.state.write();
        let prefix = path.segments();
        state.files.retain(|key, _| !key.starts_with(prefix));
        state.dirs.retain(|key| !key.starts_with(prefix));
        Box::pin(async { Ok(()) })
    }
}

/// Write handle buffering into memory until commit.
struct MemoryStoreWriter {
    buffer: Option<Vec<u8>>,
    segments: Vec<String>,
    state: Arc<RwLock<MemoryState>>,
}

impl StoreWriter for MemoryStoreWriter {
    fn write_chunk<'a>(&'a mut self, chunk: &'a [u8]) -> BoxFuture<'a, Result<(), StoreError>> {
        let result = match self.buffer.as_mut() {
            Some(buffer) => {
                buffer.extend_from_slice(chunk);
                Ok(())
            }
            None => Err(StoreError::WriterClosed),
        };
        Box::pin(async move { result })
    }

    fn commit(mut self: Box<Self>) -> BoxFuture<'static, Result<(), StoreError>> {
        let result = match self.buffer.take() {
            Some(buffer) => {
                let mut state = self.state.write();
                state.insert_ancestors(&self.segments);
                state.files.insert(self.segments.clone(), buffer);
                Ok(())
            }
            None => Err(StoreError::WriterClosed),
        };
        Box::pin(async move { result })
    }

    fn abort(mut self: Box<Self>) -> BoxFuture<'static, Result<(), StoreError>> {
        self.buffer.take();
        Box::pin(async { Ok(()) })
    }
}
