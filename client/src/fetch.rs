//! Backup fetchers - where the remote snapshot comes from.

use crate::error::FetchError;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;

/// Source of the remote snapshot for an account.
///
/// Returns the raw response; decoding and the degrade policy belong to the
/// restore pipeline.
#[async_trait]
pub trait BackupFetcher: Send + Sync {
    async fn fetch_backup(&self, account: &str) -> Result<Value, FetchError>;
}

/// Fetches `GET {base_url}/backup?email={account}` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackupFetcher {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackupFetcher {
    /// Create a fetcher for the backup service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Send `token` as a bearer credential.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/backup", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl BackupFetcher for HttpBackupFetcher {
    async fn fetch_backup(&self, account: &str) -> Result<Value, FetchError> {
        let mut request = self.client.get(self.endpoint()).query(&[("email", account)]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }
}

/// Reads a previously exported backup from disk. The account is ignored.
#[derive(Debug, Clone)]
pub struct FileBackupFetcher {
    path: PathBuf,
}

impl FileBackupFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl BackupFetcher for FileBackupFetcher {
    async fn fetch_backup(&self, _account: &str) -> Result<Value, FetchError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}
