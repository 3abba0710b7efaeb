//! Sync writer - converges a store onto a target cube set.
//!
//! The writer diffs what the store holds against the target with
//! [`SyncPlan`], then applies the puts and removes one by one. A failed write
//! is recorded and the writer moves on; nothing is rolled back.

use crate::error::StoreError;
use crate::store::EntityStore;
use cubelog_engine::{Cube, CubeId, SyncPlan};
use serde::Serialize;
use std::collections::HashSet;

/// Which store call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteKind {
    Put,
    Remove,
}

/// One cube that did not reach its target state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteFailure {
    pub id: CubeId,
    pub kind: WriteKind,
    pub reason: String,
}

/// Outcome of a sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Cubes inserted or replaced
    pub written: Vec<CubeId>,
    /// Cubes deleted
    pub removed: Vec<CubeId>,
    /// Cubes skipped because the stored value already matched
    pub unchanged: usize,
    /// Every failed write, in the order attempted
    pub failures: Vec<WriteFailure>,
}

impl SyncReport {
    /// Whether every write succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Ids of the cubes whose write failed.
    pub fn failed_ids(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.id.as_str()).collect()
    }
}

/// Applies sync plans to a store.
pub struct SyncWriter<'a, S: ?Sized> {
    store: &'a S,
    batched: bool,
}

impl<'a, S: EntityStore + ?Sized> SyncWriter<'a, S> {
    /// Create a writer that issues one `put` per changed cube.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            batched: false,
        }
    }

    /// Send all puts through a single `put_batch` instead.
    ///
    /// A failed batch leaves the store in an unknown state for the cubes it
    /// names; rerunning the restore is the recovery path.
    pub fn batched(mut self, batched: bool) -> Self {
        self.batched = batched;
        self
    }

    /// Converge the store from `existing` (its current contents) to `target`.
    pub async fn sync(&self, existing: Vec<Cube>, target: Vec<Cube>) -> SyncReport {
        self.apply(SyncPlan::between(existing, target)).await
    }

    /// Apply a precomputed plan.
    pub async fn apply(&self, plan: SyncPlan) -> SyncReport {
        let mut report = SyncReport {
            unchanged: plan.unchanged.len(),
            ..SyncReport::default()
        };

        tracing::debug!(
            "Sync plan: {} put(s), {} remove(s), {} unchanged",
            plan.puts.len(),
            plan.removes.len(),
            report.unchanged
        );

        if self.batched {
            self.put_batched(plan.puts, &mut report).await;
        } else {
            for cube in plan.puts {
                match self.store.put(&cube).await {
                    Ok(()) => {
                        tracing::debug!("Wrote cube {} ({})", cube.id, cube.name);
                        report.written.push(cube.id);
                    }
                    Err(e) => record_failure(&mut report, cube.id, WriteKind::Put, &e),
                }
            }
        }

        for id in plan.removes {
            match self.store.remove(&id).await {
                Ok(()) => {
                    tracing::debug!("Removed cube {}", id);
                    report.removed.push(id);
                }
                Err(e) => record_failure(&mut report, id, WriteKind::Remove, &e),
            }
        }

        report
    }

    async fn put_batched(&self, cubes: Vec<Cube>, report: &mut SyncReport) {
        if cubes.is_empty() {
            return;
        }

        match self.store.put_batch(&cubes).await {
            Ok(()) => report.written.extend(cubes.into_iter().map(|c| c.id)),
            Err(StoreError::Batch { unapplied, source }) => {
                let unapplied: HashSet<CubeId> = unapplied.into_iter().collect();
                for cube in cubes {
                    if unapplied.contains(&cube.id) {
                        record_failure(report, cube.id, WriteKind::Put, &source);
                    } else {
                        report.written.push(cube.id);
                    }
                }
            }
            Err(e) => {
                for cube in cubes {
                    record_failure(report, cube.id, WriteKind::Put, &e);
                }
            }
        }
    }
}

fn record_failure(report: &mut SyncReport, id: CubeId, kind: WriteKind, error: &StoreError) {
    tracing::warn!("{:?} of cube {} failed: {}", kind, id, error);
    report.failures.push(WriteFailure {
        id,
        kind,
        reason: error.to_string(),
    });
}
