//! In-memory entity store.

use super::EntityStore;
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use cubelog_engine::{Cube, CubeId};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-local cube store.
///
/// Batches are applied entry by entry; a concurrent reader may observe part
/// of a batch, but a batch either fails up front or lands completely.
#[derive(Debug, Default)]
pub struct MemoryStore {
    cubes: DashMap<CubeId, Cube>,
    closed: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `cubes`.
    pub fn with_cubes(cubes: impl IntoIterator<Item = Cube>) -> Self {
        let store = Self::new();
        for cube in cubes {
            store.cubes.insert(cube.id.clone(), cube);
        }
        store
    }

    /// Close the store. Every later call fails with [`StoreError::Unavailable`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Number of stored cubes.
    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    /// Check if the store holds no cubes.
    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    fn check_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is closed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get(&self, id: &str) -> StoreResult<Option<Cube>> {
        self.check_open()?;
        Ok(self.cubes.get(id).map(|entry| entry.value().clone()))
    }

    async fn get_all(&self) -> StoreResult<Vec<Cube>> {
        self.check_open()?;
        Ok(self.cubes.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn put(&self, cube: &Cube) -> StoreResult<()> {
        self.check_open()?;
        self.cubes.insert(cube.id.clone(), cube.clone());
        Ok(())
    }

    async fn put_batch(&self, cubes: &[Cube]) -> StoreResult<()> {
        self.check_open().map_err(|e| StoreError::Batch {
            unapplied: cubes.iter().map(|c| c.id.clone()).collect(),
            source: Box::new(e),
        })?;

        for cube in cubes {
            self.cubes.insert(cube.id.clone(), cube.clone());
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> StoreResult<()> {
        self.check_open()?;
        self.cubes.remove(id);
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        self.check_open()?;
        self.cubes.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_cubes_prepopulates() {
        let store = MemoryStore::with_cubes(vec![
            Cube::new("c1", "A", "3x3", 1),
            Cube::new("c2", "B", "2x2", 2),
        ]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("c2").await.unwrap().unwrap().name, "B");
    }

    #[tokio::test]
    async fn closed_store_rejects_calls() {
        let store = MemoryStore::new();
        store.close();

        assert!(matches!(
            store.get("c1").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.put_batch(&[Cube::new("c1", "A", "3x3", 1)]).await,
            Err(StoreError::Batch { unapplied, .. }) if unapplied == vec!["c1".to_string()]
        ));
        assert!(store.is_empty());
    }
}
