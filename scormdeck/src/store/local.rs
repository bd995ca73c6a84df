//! Filesystem-backed package store provider.
//!
//! Stores entries as real directories and files under a root directory.
//! Streamed writes go to a `.part` sibling and are renamed into place on
//! commit, so readers never observe a partially written file and aborted
//! downloads leave no visible entry.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::error::StoreError;
use super::path::StorePath;
use super::traits::{BoxFuture, PackageStore, StoreWriter};

/// Durable package store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalPackageStore {
    root: PathBuf,
}

impl LocalPackageStore {
    /// Create a store rooted at `root`. The directory is created lazily by
    /// [`PackageStore::ensure_root`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &StorePath) -> PathBuf {
        let mut full = self.root.clone();
        for segment in path.segments() {
            full.push(segment);
        }
        full
    }
}

impl PackageStore for LocalPackageStore {
    fn ensure_root(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            fs::create_dir_all(&self.root)
                .await
                .map_err(|e| StoreError::io(self.root.display().to_string(), e))
        })
    }

    fn ensure_directory<'a>(
        &'a self,
        path: &'a StorePath,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let full = self.resolve(path);
            fs::create_dir_all(&full)
                .await
                .map_err(|e| StoreError::io(path.to_string(), e))
        })
    }

    fn write_file<'a>(
        &'a self,
        path: &'a StorePath,
        bytes: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let mut writer = self.open_writer(path).await?;
            if let Err(e) = writer.write_chunk(&bytes).await {
                writer.abort().await.ok();
                return Err(e);
            }
            writer.commit().await
        })
    }

    fn open_writer<'a>(
        &'a self,
        path: &'a StorePath,
    ) -> BoxFuture<'a, Result<Box<dyn StoreWriter>, StoreError>> {
        Box::pin(async move {
            let target = self.resolve(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::io(path.to_string(), e))?;
            }
            let tmp = target.with_file_name(format!("{}.part", path.leaf()));
            let file = fs::File::create(&tmp)
                .await
                .map_err(|e| StoreError::io(path.to_string(), e))?;
            Ok(Box::new(LocalStoreWriter {
                file: Some(file),
                tmp,
                target,
                display: path.to_string(),
            }) as Box<dyn StoreWriter>)
        })
    }

    fn read_file<'a>(&'a self, path: &'a StorePath) -> BoxFuture<'a, Result<Vec<u8>, StoreError>> {
        Box::pin(async move {
            match fs::read(self.resolve(path)).await {
                Ok(bytes) => Ok(bytes),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(StoreError::NotFound(path.to_string()))
                }
                Err(e) => Err(StoreError::io(path.to_string(), e)),
            }
        })
    }

    fn exists<'a>(&'a self, path: &'a StorePath) -> BoxFuture<'a, Result<bool, StoreError>> {
        Box::pin(async move {
            match fs::metadata(self.resolve(path)).await {
                Ok(_) => Ok(true),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(StoreError::io(path.to_string(), e)),
            }
        })
    }

    fn list_directory<'a>(
        &'a self,
        path: &'a StorePath,
    ) -> BoxFuture<'a, Result<Vec<String>, StoreError>> {
        Box::pin(async move {
            let mut entries = match fs::read_dir(self.resolve(path)).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(StoreError::NotFound(path.to_string()))
                }
                Err(e) => return Err(StoreError::io(path.to_string(), e)),
            };
            let mut names = Vec::new();
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StoreError::io(path.to_string(), e))?
            {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
            names.sort();
            Ok(names)
        })
    }

    fn remove_subtree<'a>(&'a self, path: &'a StorePath) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let full = self.resolve(path);
            let meta = match fs::metadata(&full).await {
                Ok(meta) => meta,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
                Err(e) => return Err(StoreError::io(path.to_string(), e)),
            };
            let result = if meta.is_dir() {
                fs::remove_dir_all(&full).await
            } else {
                fs::remove_file(&full).await
            };
            result.map_err(|e| StoreError::io(path.to_string(), e))
        })
    }
}

/// Write handle backed by a `.part` temp file.
struct LocalStoreWriter {
    file: Option<fs::File>,
    tmp: PathBuf,
    target: PathBuf,
    display: String,
}

impl StoreWriter for LocalStoreWriter {
    fn write_chunk<'a>(&'a mut self, chunk: &'a [u8]) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let file = self.file.as_mut().ok_or(StoreError::WriterClosed)?;
            file.write_all(chunk)
                .await
                .map_err(|e| StoreError::io(self.display.clone(), e))
        })
    }

    fn commit(mut self: Box<Self>) -> BoxFuture<'static, Result<(), StoreError>> {
        Box::pin(async move {
            let mut file = self.file.take().ok_or(StoreError::WriterClosed)?;
            file.flush()
                .await
                .map_err(|e| StoreError::io(self.display.clone(), e))?;
            file.sync_all()
                .await
                .map_err(|e| StoreError::io(self.display.clone(), e))?;
            drop(file);
            fs::rename(&self.tmp, &self.target)
                .await
                .map_err(|e| StoreError::io(self.display.clone(), e))
        })
    }

    fn abort(mut self: Box<Self>) -> BoxFuture<'static, Result<(), StoreError>> {
        Box::pin(async move {
            self.file.take();
            match fs::remove_file(&self.tmp).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StoreError::io(self.display.clone(), e)),
            }
        })
    }
}

impl Drop for LocalStoreWriter {
    fn drop(&mut self) {
        // Leaked handle: clean up the temp file so no partial write survives.
        if self.file.take().is_some() {
            std::fs::remove_file(&self.tmp).ok();
        }
    }
}
