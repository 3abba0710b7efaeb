//! Entity store: durable keyed storage for cubes.
//!
//! [`EntityStore`] is the contract the restore pipeline and the ordinary cube
//! operations are written against. Implementations:
//! - [`SqliteStore`] - the on-device database
//! - [`MemoryStore`] - process-local, for tests and ephemeral use
//! - [`SharedStore`] - wraps either one and serializes every mutation

mod memory;
mod shared;
mod sqlite;

pub use memory::MemoryStore;
pub use shared::{Exclusive, SharedStore};
pub use sqlite::SqliteStore;

use crate::error::StoreResult;
use async_trait::async_trait;
use cubelog_engine::{Cube, IndexQuery};

/// Keyed storage for cubes. The primary key is `Cube::id`.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Point lookup. A missing key is `Ok(None)`, not an error.
    async fn get(&self, id: &str) -> StoreResult<Option<Cube>>;

    /// Full scan. Callers must not rely on the order.
    async fn get_all(&self) -> StoreResult<Vec<Cube>>;

    /// Insert or replace.
    async fn put(&self, cube: &Cube) -> StoreResult<()>;

    /// Insert or replace several cubes as one logical write.
    ///
    /// On failure the error is [`StoreError::Batch`](crate::StoreError::Batch)
    /// naming every cube that was not applied.
    async fn put_batch(&self, cubes: &[Cube]) -> StoreResult<()>;

    /// Delete by id. Removing a missing key succeeds.
    async fn remove(&self, id: &str) -> StoreResult<()>;

    /// Remove every cube. Only for a full reset.
    async fn clear(&self) -> StoreResult<()>;

    /// Look up cubes through a secondary index.
    async fn find(&self, query: &IndexQuery) -> StoreResult<Vec<Cube>> {
        Ok(query.apply(self.get_all().await?))
    }
}
