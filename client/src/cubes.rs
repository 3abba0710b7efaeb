//! Everyday cube operations: create, time a solve, edit, delete.
//!
//! Each read-modify-write runs under the store's exclusive gate so it cannot
//! interleave with a restore.

use crate::error::{StoreError, StoreResult};
use crate::store::{EntityStore, SharedStore};
use cubelog_engine::{Cube, Solve, Timestamp};

/// Create and store a cube with a fresh id, the current time, no solves, and
/// no favorite flag.
pub async fn create_cube<S: EntityStore>(
    store: &SharedStore<S>,
    name: &str,
    category: &str,
) -> StoreResult<Cube> {
    let cube = Cube::new(new_id(), name, category, now_millis());
    store.put(&cube).await?;
    tracing::debug!("Created cube {} ({})", cube.id, cube.name);
    Ok(cube)
}

/// Record a finished solve on a cube, in its history and current session.
pub async fn record_solve<S: EntityStore>(
    store: &SharedStore<S>,
    cube_id: &str,
    time: f64,
    rating: f64,
) -> StoreResult<Solve> {
    let solve = Solve::new(new_id(), cube_id, time, now_millis(), rating);
    let recorded = solve.clone();
    update(store, cube_id, move |cube| cube.record_solve(solve)).await?;
    Ok(recorded)
}

/// Change a cube's display name.
pub async fn rename_cube<S: EntityStore>(
    store: &SharedStore<S>,
    cube_id: &str,
    name: &str,
) -> StoreResult<Cube> {
    update(store, cube_id, |cube| cube.name = name.to_string()).await
}

/// Pin or unpin a cube.
pub async fn set_favorite<S: EntityStore>(
    store: &SharedStore<S>,
    cube_id: &str,
    favorite: bool,
) -> StoreResult<Cube> {
    update(store, cube_id, |cube| cube.favorite = favorite).await
}

/// Delete a cube. Deleting an unknown id succeeds.
pub async fn delete_cube<S: EntityStore>(store: &SharedStore<S>, cube_id: &str) -> StoreResult<()> {
    store.remove(cube_id).await
}

/// Remove every cube.
pub async fn reset<S: EntityStore>(store: &SharedStore<S>) -> StoreResult<()> {
    tracing::warn!("Clearing the cube store");
    store.clear().await
}

async fn update<S: EntityStore>(
    store: &SharedStore<S>,
    cube_id: &str,
    change: impl FnOnce(&mut Cube),
) -> StoreResult<Cube> {
    let store = store.exclusive().await;
    let mut cube = store
        .get(cube_id)
        .await?
        .ok_or_else(|| StoreError::NotFound(cube_id.to_string()))?;

    change(&mut cube);
    store.put(&cube).await?;
    Ok(cube)
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn now_millis() -> Timestamp {
    Timestamp::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}
