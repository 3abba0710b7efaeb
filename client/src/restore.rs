//! Restore pipeline: fetch backup, reconcile, write.
//!
//! Steps:
//! 1. Fetch the backup under a timeout (timeout aborts, nothing written)
//! 2. Decode it; a failed fetch or a non-array response degrades to an empty
//!    remote snapshot, unusable entries are skipped, both reported as a warning
//! 3. Take exclusive store access and read the local snapshot (failure
//!    aborts, nothing written)
//! 4. Reconcile local with remote
//! 5. Converge the store onto the merged set with the sync writer
//!
//! The store is not held during the fetch, so reads and writes elsewhere in
//! the process proceed while the backup downloads.

use crate::error::RestoreError;
use crate::fetch::BackupFetcher;
use crate::store::{EntityStore, SharedStore};
use crate::writer::{SyncReport, SyncWriter};
use cubelog_engine::{decode_backup, Cube, IdentityPolicy, MergeSummary, Reconciler};
use serde::Serialize;
use std::time::Duration;

/// Default upper bound on the backup fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of a restore that got as far as writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    /// What the merge changed
    pub summary: MergeSummary,
    /// What the writer did
    pub sync: SyncReport,
    /// Set when the backup could not be used and an empty one was assumed, or
    /// when some of its entries were skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_warning: Option<String>,
}

impl RestoreReport {
    /// Whether every write succeeded. A degraded fetch still counts.
    pub fn is_success(&self) -> bool {
        self.sync.is_clean()
    }

    /// Cubes that failed to sync.
    pub fn failed_ids(&self) -> Vec<&str> {
        self.sync.failed_ids()
    }
}

/// Runs restores against one store.
pub struct Restorer<S, F> {
    store: SharedStore<S>,
    fetcher: F,
    policy: IdentityPolicy,
    fetch_timeout: Duration,
    batched: bool,
}

impl<S: EntityStore, F: BackupFetcher> Restorer<S, F> {
    /// Create a restorer with the default policy and timeout.
    pub fn new(store: SharedStore<S>, fetcher: F) -> Self {
        Self {
            store,
            fetcher,
            policy: IdentityPolicy::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            batched: false,
        }
    }

    pub fn with_policy(mut self, policy: IdentityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_batched_writes(mut self, batched: bool) -> Self {
        self.batched = batched;
        self
    }

    /// Merge the account's backup into the local store.
    ///
    /// Safe to rerun: with the same inputs a second run writes nothing.
    pub async fn restore(&self, account: &str) -> Result<RestoreReport, RestoreError> {
        let (remote, fetch_warning) = self.fetch_remote(account).await?;
        tracing::info!("Remote snapshot: {} cube(s)", remote.len());

        let store = self.store.exclusive().await;

        let local = store.get_all().await.map_err(|e| {
            tracing::error!("Reading local cubes failed, restore aborted: {}", e);
            RestoreError::StoreRead(e)
        })?;
        tracing::info!("Local snapshot: {} cube(s)", local.len());

        let existing = local.clone();
        let result = Reconciler::new(self.policy).reconcile(local, remote);
        tracing::info!(
            "Merged into {} cube(s): {} renamed, {} refavorited, {} added, {} dropped, {} solve(s) appended",
            result.merged.len(),
            result.summary.renamed.len(),
            result.summary.refavorited.len(),
            result.summary.added.len(),
            result.summary.dropped.len(),
            result.summary.total_appended()
        );

        let sync = SyncWriter::new(&store)
            .batched(self.batched)
            .sync(existing, result.merged)
            .await;

        if sync.is_clean() {
            tracing::info!(
                "Restore complete: {} written, {} removed, {} unchanged",
                sync.written.len(),
                sync.removed.len(),
                sync.unchanged
            );
        } else {
            tracing::warn!(
                "Restore partially failed, {} cube(s) not synced: {:?}",
                sync.failures.len(),
                sync.failed_ids()
            );
        }

        Ok(RestoreReport {
            summary: result.summary,
            sync,
            fetch_warning,
        })
    }

    async fn fetch_remote(
        &self,
        account: &str,
    ) -> Result<(Vec<Cube>, Option<String>), RestoreError> {
        let response =
            match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch_backup(account))
                .await
            {
                Ok(response) => response,
                Err(_) => {
                    tracing::error!(
                        "Backup fetch timed out after {:?}, restore aborted",
                        self.fetch_timeout
                    );
                    return Err(RestoreError::FetchTimeout(self.fetch_timeout));
                }
            };

        let decoded = match response {
            Ok(value) => decode_backup(&value).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match decoded {
            Ok(backup) if backup.is_complete() => Ok((backup.cubes, None)),
            Ok(backup) => {
                let reasons: Vec<String> = backup.skipped.iter().map(|e| e.to_string()).collect();
                let warning = format!(
                    "skipped {} backup entr{}: {}",
                    reasons.len(),
                    if reasons.len() == 1 { "y" } else { "ies" },
                    reasons.join("; ")
                );
                tracing::warn!("Backup partially unusable: {}", warning);
                Ok((backup.cubes, Some(warning)))
            }
            Err(warning) => {
                tracing::warn!(
                    "Backup unavailable, merging against an empty snapshot: {}",
                    warning
                );
                Ok((Vec::new(), Some(warning)))
            }
        }
    }
}
