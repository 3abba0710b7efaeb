//! Reconciliation of a local cube collection with a remote backup.
//!
//! This is the core of the restore flow. Given the current on-device cubes
//! and a backup snapshot, this module produces a single merged target set.
//!
//! # Algorithm
//!
//! 1. Start from a copy of the remote snapshot
//! 2. For each local cube, find the remote cube with the same id
//!    - found: take the local name and favorite flag, append local solves
//!      the remote lacks
//!    - missing: append the local cube unchanged
//! 3. Under [`IdentityPolicy::LocalAuthoritative`], drop every cube whose id
//!    is not in the local snapshot (local deletions win)
//! 4. Return the merged set together with a summary of what changed

use crate::{Cube, CubeId, Error, Solve};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;

/// Which side decides the set of cubes that survive a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdentityPolicy {
    /// Only cubes present locally survive (default). An empty local store
    /// therefore merges to an empty set.
    #[default]
    LocalAuthoritative,
    /// Union of both sides; local still wins on metadata.
    Union,
}

impl FromStr for IdentityPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "local-authoritative" => Ok(Self::LocalAuthoritative),
            "union" => Ok(Self::Union),
            other => Err(Error::UnknownPolicy(other.to_string())),
        }
    }
}

/// What a merge changed relative to the remote snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSummary {
    /// Cubes whose remote name was replaced by the local one
    pub renamed: Vec<CubeId>,
    /// Cubes whose remote favorite flag was replaced by the local one
    pub refavorited: Vec<CubeId>,
    /// Local cubes the remote snapshot did not know
    pub added: Vec<CubeId>,
    /// Remote cubes dropped because they are absent locally
    pub dropped: Vec<CubeId>,
    /// Number of local solves appended to each remote cube
    pub appended_solves: BTreeMap<CubeId, usize>,
}

impl MergeSummary {
    /// Total number of solves appended across all cubes.
    pub fn total_appended(&self) -> usize {
        self.appended_solves.values().sum()
    }
}

/// Result of reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResult {
    /// The target cube set: remote order first, then local-only cubes
    pub merged: Vec<Cube>,
    /// Change details
    pub summary: MergeSummary,
}

/// The reconciler merges a local snapshot with a remote one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    policy: IdentityPolicy,
}

impl Reconciler {
    /// Create a new reconciler.
    pub fn new(policy: IdentityPolicy) -> Self {
        Self { policy }
    }

    /// The identity policy in effect.
    pub fn policy(&self) -> IdentityPolicy {
        self.policy
    }

    /// Reconcile the local cubes with the remote snapshot.
    ///
    /// Never fails. `solves.session` is neither read nor written.
    pub fn reconcile(self, local: Vec<Cube>, remote: Vec<Cube>) -> ReconcileResult {
        let mut summary = MergeSummary::default();
        let mut merged = remote;

        // First occurrence wins, like a linear search would
        let mut positions: HashMap<CubeId, usize> = HashMap::with_capacity(merged.len());
        for (i, cube) in merged.iter().enumerate() {
            positions.entry(cube.id.clone()).or_insert(i);
        }

        let mut local_ids: HashSet<CubeId> = HashSet::with_capacity(local.len());

        for cube in local {
            local_ids.insert(cube.id.clone());

            match positions.get(&cube.id).copied() {
                Some(i) => {
                    let target = &mut merged[i];
                    let appended = merge_into(target, &cube);

                    if target.name != cube.name {
                        target.name = cube.name;
                        summary.renamed.push(target.id.clone());
                    }
                    if target.favorite != cube.favorite {
                        target.favorite = cube.favorite;
                        summary.refavorited.push(target.id.clone());
                    }
                    if appended > 0 {
                        *summary
                            .appended_solves
                            .entry(target.id.clone())
                            .or_default() += appended;
                    }
                }
                None => {
                    positions.insert(cube.id.clone(), merged.len());
                    summary.added.push(cube.id.clone());
                    merged.push(cube);
                }
            }
        }

        if self.policy == IdentityPolicy::LocalAuthoritative {
            merged.retain(|cube| {
                let keep = local_ids.contains(&cube.id);
                if !keep {
                    summary.dropped.push(cube.id.clone());
                }
                keep
            });
        }

        ReconcileResult { merged, summary }
    }
}

/// Append the local solves `target` does not know yet, in local order.
///
/// Duplicates are detected against the target's history as it was before the
/// append, so a duplicated id inside `local` passes through.
fn merge_into(target: &mut Cube, local: &Cube) -> usize {
    let known: HashSet<&str> = target.solve_ids().collect();
    let fresh: Vec<Solve> = local
        .solves
        .all
        .iter()
        .filter(|s| !known.contains(s.id.as_str()))
        .cloned()
        .collect();

    let appended = fresh.len();
    target.solves.all.extend(fresh);
    appended
}
