//! Configuration management for the restore tool.

use cubelog_engine::IdentityPolicy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Where the backup comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupSource {
    /// Backup service base URL, with an optional bearer token
    Http { url: String, token: Option<String> },
    /// A backup exported to disk
    File(PathBuf),
}

/// Configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL of the local cube store
    pub database_url: String,
    /// Account whose backup is restored
    pub account: String,
    /// Backup location
    pub backup: BackupSource,
    /// Upper bound on the backup fetch
    pub fetch_timeout: Duration,
    /// Which side decides the surviving cubes
    pub identity_policy: IdentityPolicy,
    /// Write all changed cubes in one batch
    pub batched_writes: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://cubelog.db".to_string());

        let account = lookup("ACCOUNT_EMAIL").ok_or(ConfigError::MissingAccount)?;

        let backup = match (lookup("BACKUP_FILE"), lookup("BACKUP_URL")) {
            (Some(path), _) => BackupSource::File(PathBuf::from(path)),
            (None, Some(url)) => BackupSource::Http {
                url,
                token: lookup("BACKUP_TOKEN"),
            },
            (None, None) => return Err(ConfigError::MissingBackupSource),
        };

        let fetch_timeout = lookup("FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidTimeout)?;

        let identity_policy = match lookup("IDENTITY_POLICY") {
            Some(raw) => raw
                .parse::<IdentityPolicy>()
                .map_err(|_| ConfigError::InvalidPolicy(raw))?,
            None => IdentityPolicy::default(),
        };

        let batched_writes = match lookup("BATCH_WRITES").as_deref() {
            None | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(_) => return Err(ConfigError::InvalidBatchWrites),
        };

        Ok(Self {
            database_url,
            account,
            backup,
            fetch_timeout,
            identity_policy,
            batched_writes,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ACCOUNT_EMAIL environment variable is required")]
    MissingAccount,

    #[error("Either BACKUP_URL or BACKUP_FILE is required")]
    MissingBackupSource,

    #[error("Invalid FETCH_TIMEOUT_SECS value")]
    InvalidTimeout,

    #[error("Invalid IDENTITY_POLICY value: {0} (expected local or union)")]
    InvalidPolicy(String),

    #[error("Invalid BATCH_WRITES value")]
    InvalidBatchWrites,
}
