//! Cubelog Client - local cube storage and backup restore.
//!
//! This crate holds everything around the pure merge logic in
//! `cubelog-engine`: the on-device [`EntityStore`], the [`SyncWriter`] that
//! converges it onto a merge result, the [`BackupFetcher`] that retrieves the
//! remote snapshot, and the [`Restorer`] that runs the whole pipeline.

pub mod config;
pub mod cubes;
pub mod error;
pub mod fetch;
pub mod restore;
pub mod store;
pub mod writer;

pub use config::{BackupSource, Config, ConfigError};
pub use error::{FetchError, RestoreError, StoreError, StoreResult};
pub use fetch::{BackupFetcher, FileBackupFetcher, HttpBackupFetcher};
pub use restore::{RestoreReport, Restorer, DEFAULT_FETCH_TIMEOUT};
pub use store::{EntityStore, Exclusive, MemoryStore, SharedStore, SqliteStore};
pub use writer::{SyncReport, SyncWriter, WriteFailure, WriteKind};
