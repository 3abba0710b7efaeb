//! # Cubelog Engine
//!
//! Deterministic merge logic for a local-first cube timer.
//!
//! This crate owns the data model (cubes and their solves) and the pure
//! functions that reconcile an on-device collection against a remote backup.
//! Everything here is synchronous and free of IO; persistence, networking and
//! scheduling live in `cubelog-client`.
//!
//! ## Design Principles
//!
//! - **No IO**: Engine has no knowledge of files, network, or platform
//! - **Deterministic**: Same inputs always produce same outputs
//! - **Total**: Reconciliation never fails, callers own all error handling
//!
//! ## Core Concepts
//!
//! ### Cubes and Solves
//!
//! A [`Cube`] is the top-level entity a user manages. It carries display
//! metadata (name, category, favorite flag) and two solve collections:
//! - `solves.all` - the full, append-only history
//! - `solves.session` - the current session, never touched by a merge
//!
//! ### Reconciliation
//!
//! The [`Reconciler`] merges a local snapshot with a remote backup:
//! - Local metadata wins whenever both sides know a cube
//! - Remote solves missing locally are appended, never mutated or removed
//! - Under [`IdentityPolicy::LocalAuthoritative`] (default) cubes unknown
//!   locally are dropped from the result
//!
//! ### Sync Plans
//!
//! [`SyncPlan`] diffs what a store currently holds against a merge result and
//! yields the minimal puts and removes that make the store converge.
//!
//! ## Quick Start
//!
//! ```rust
//! use cubelog_engine::{Cube, Reconciler, Solve, SyncPlan};
//!
//! let mut local = Cube::new("c1", "Speed", "3x3", 1706745600000);
//! local.record_solve(Solve::new("s1", "c1", 9120.0, 1706745609120, 4.0));
//!
//! let mut remote = Cube::new("c1", "Old", "3x3", 1706745600000);
//! remote.solves.all.push(Solve::new("s2", "c1", 10250.0, 1706745700000, 3.0));
//!
//! let result = Reconciler::default().reconcile(vec![local.clone()], vec![remote]);
//! assert_eq!(result.merged.len(), 1);
//! assert_eq!(result.merged[0].name, "Speed");
//! assert_eq!(result.merged[0].solves.all.len(), 2);
//!
//! let plan = SyncPlan::between(vec![local], result.merged);
//! assert_eq!(plan.puts.len(), 1);
//! assert!(plan.removes.is_empty());
//! ```

pub mod cube;
pub mod error;
pub mod plan;
pub mod query;
pub mod reconcile;
pub mod snapshot;

// Re-export main types at crate root
pub use cube::{Cube, Solve, Solves};
pub use error::Error;
pub use plan::SyncPlan;
pub use query::IndexQuery;
pub use reconcile::{IdentityPolicy, MergeSummary, ReconcileResult, Reconciler};
pub use snapshot::{decode_backup, encode_backup, Backup, BackupEntry};

/// Type aliases for clarity
pub type CubeId = String;
pub type SolveId = String;
pub type Category = String;
pub type Timestamp = u64;
