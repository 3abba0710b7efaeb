//! Cubelog Restore - merges an account's backup into the local cube store.
//!
//! Configuration comes from the environment (and `.env`), see [`Config`].
//! The restore report is printed to stdout as JSON; the exit status is
//! non-zero if any cube failed to sync.

use cubelog_client::{
    BackupFetcher, BackupSource, Config, FileBackupFetcher, HttpBackupFetcher, RestoreError,
    RestoreReport, Restorer, SharedStore, SqliteStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cubelog_client=debug,cubelog_restore=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Opening cube store at {}", config.database_url);
    let store = SharedStore::new(SqliteStore::open(&config.database_url).await?);

    let outcome = match &config.backup {
        BackupSource::Http { url, token } => {
            tracing::info!("Restoring {} from {}", config.account, url);
            let mut fetcher = HttpBackupFetcher::new(url.as_str());
            if let Some(token) = token {
                fetcher = fetcher.with_token(token.as_str());
            }
            run(&store, fetcher, &config).await
        }
        BackupSource::File(path) => {
            tracing::info!("Restoring {} from {}", config.account, path.display());
            run(&store, FileBackupFetcher::new(path.clone()), &config).await
        }
    };

    store.inner().close().await;

    let report = outcome?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.is_success() {
        tracing::error!("Cubes not synced: {:?}", report.failed_ids());
        std::process::exit(1);
    }

    Ok(())
}

async fn run<F: BackupFetcher>(
    store: &SharedStore<SqliteStore>,
    fetcher: F,
    config: &Config,
) -> Result<RestoreReport, RestoreError> {
    Restorer::new(store.clone(), fetcher)
        .with_policy(config.identity_policy)
        .with_fetch_timeout(config.fetch_timeout)
        .with_batched_writes(config.batched_writes)
        .restore(&config.account)
        .await
}
