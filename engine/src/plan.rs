//! Sync plans: the minimal writes that make a store match a target set.

use crate::{Cube, CubeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Writes needed to converge stored cubes onto a target set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPlan {
    /// Cubes that are new or differ from their stored value, in target order
    pub puts: Vec<Cube>,
    /// Stored cubes absent from the target, in stored order
    pub removes: Vec<CubeId>,
    /// Cubes already stored with an identical value
    pub unchanged: Vec<CubeId>,
}

impl SyncPlan {
    /// Diff `existing` (what the store holds) against `target`.
    ///
    /// A target cube is skipped only when a stored cube with the same id is
    /// deep-equal to it. Each stored id is matched at most once.
    pub fn between(existing: Vec<Cube>, target: Vec<Cube>) -> Self {
        let order: Vec<CubeId> = existing.iter().map(|c| c.id.clone()).collect();
        let mut stored: HashMap<CubeId, Cube> =
            existing.into_iter().map(|c| (c.id.clone(), c)).collect();

        let mut plan = SyncPlan::default();

        for cube in target {
            match stored.remove(&cube.id) {
                Some(current) if current == cube => plan.unchanged.push(cube.id),
                _ => plan.puts.push(cube),
            }
        }

        plan.removes = order
            .into_iter()
            .filter(|id| stored.contains_key(id))
            .collect();

        plan
    }

    /// Whether applying the plan would write anything.
    pub fn is_empty(&self) -> bool {
        self.puts.is_empty() && self.removes.is_empty()
    }

    /// Number of store writes the plan needs.
    pub fn write_count(&self) -> usize {
        self.puts.len() + self.removes.len()
    }
}
