//! Serialized access to a store.
//!
//! The store itself has no locking, and a restore's read-diff-write sequence
//! is not transactional. Every mutation in the process goes through one
//! [`SharedStore`], and a restore holds [`SharedStore::exclusive`] for its
//! whole run so no other write can interleave.

use super::EntityStore;
use crate::error::StoreResult;
use async_trait::async_trait;
use cubelog_engine::{Cube, IndexQuery};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// A long-lived, cloneable handle to one store with a single write gate.
pub struct SharedStore<S> {
    inner: Arc<S>,
    gate: Arc<Mutex<()>>,
}

impl<S> Clone for SharedStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            gate: Arc::clone(&self.gate),
        }
    }
}

impl<S: EntityStore> SharedStore<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(store),
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// The wrapped store, bypassing the gate. Use for lifecycle calls only.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Wait for the gate and hold it until the returned handle is dropped.
    pub async fn exclusive(&self) -> Exclusive<'_, S> {
        Exclusive {
            _guard: self.gate.lock().await,
            store: &self.inner,
        }
    }
}

/// Store access while holding the gate.
pub struct Exclusive<'a, S> {
    _guard: MutexGuard<'a, ()>,
    store: &'a S,
}

#[async_trait]
impl<S: EntityStore> EntityStore for SharedStore<S> {
    async fn get(&self, id: &str) -> StoreResult<Option<Cube>> {
        let _gate = self.gate.lock().await;
        self.inner.get(id).await
    }

    async fn get_all(&self) -> StoreResult<Vec<Cube>> {
        let _gate = self.gate.lock().await;
        self.inner.get_all().await
    }

    async fn put(&self, cube: &Cube) -> StoreResult<()> {
        let _gate = self.gate.lock().await;
        self.inner.put(cube).await
    }

    async fn put_batch(&self, cubes: &[Cube]) -> StoreResult<()> {
        let _gate = self.gate.lock().await;
        self.inner.put_batch(cubes).await
    }

    async fn remove(&self, id: &str) -> StoreResult<()> {
        let _gate = self.gate.lock().await;
        self.inner.remove(id).await
    }

    async fn clear(&self) -> StoreResult<()> {
        let _gate = self.gate.lock().await;
        self.inner.clear().await
    }

    async fn find(&self, query: &IndexQuery) -> StoreResult<Vec<Cube>> {
        let _gate = self.gate.lock().await;
        self.inner.find(query).await
    }
}

#[async_trait]
impl<'a, S: EntityStore> EntityStore for Exclusive<'a, S> {
    async fn get(&self, id: &str) -> StoreResult<Option<Cube>> {
        self.store.get(id).await
    }

    async fn get_all(&self) -> StoreResult<Vec<Cube>> {
        self.store.get_all().await
    }

    async fn put(&self, cube: &Cube) -> StoreResult<()> {
        self.store.put(cube).await
    }

    async fn put_batch(&self, cubes: &[Cube]) -> StoreResult<()> {
        self.store.put_batch(cubes).await
    }

    async fn remove(&self, id: &str) -> StoreResult<()> {
        self.store.remove(id).await
    }

    async fn clear(&self) -> StoreResult<()> {
        self.store.clear().await
    }

    async fn find(&self, query: &IndexQuery) -> StoreResult<Vec<Cube>> {
        self.store.find(query).await
    }
}
