//! Durable hierarchical package storage.
//!
//! The [`PackageStore`] trait provides an origin-scoped, path-addressed
//! byte store that survives process restarts. Two providers implement it:
//!
//! - [`LocalPackageStore`] - durable storage on the local filesystem
//! - [`MemoryPackageStore`] - ephemeral storage for tests and previews
//!
//! Paths are ordered segment lists validated at construction ([`StorePath`]);
//! the store itself never sees ambiguous or relative path components.

mod error;
pub mod layout;
mod local;
mod memory;
mod path;
mod traits;

pub use error::StoreError;
pub use local::LocalPackageStore;
pub use memory::MemoryPackageStore;
pub use path::StorePath;
pub use traits::{BoxFuture, PackageStore, StoreWriter};
