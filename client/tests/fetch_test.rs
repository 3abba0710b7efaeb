//! Backup fetcher tests against a mock backup service.

use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use cubelog_client::{
    BackupFetcher, EntityStore, FetchError, FileBackupFetcher, HttpBackupFetcher, Restorer,
    SharedStore, SqliteStore,
};
use cubelog_engine::{decode_backup, encode_backup, Cube, Solve};
use serde_json::{json, Value};
use std::collections::HashMap;

const ACCOUNT: &str = "someone@example.com";

#[derive(Clone)]
struct MockBackup {
    body: Value,
    token: Option<&'static str>,
}

async fn backup(
    State(mock): State<MockBackup>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    if let Some(token) = mock.token {
        let expected = format!("Bearer {}", token);
        let sent = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        if sent != Some(expected.as_str()) {
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    match params.get("email").map(String::as_str) {
        Some(ACCOUNT) => Ok(Json(mock.body.clone())),
        _ => Ok(Json(json!([]))),
    }
}

/// Start a mock backup service and return its base URL.
async fn serve(mock: MockBackup) -> String {
    let app = Router::new()
        .route("/backup", get(backup))
        .route("/broken/backup", get(|| async { "<html>maintenance</html>" }))
        .route(
            "/down/backup",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "down") }),
        )
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn fixture() -> Vec<Cube> {
    let mut speed = Cube::new("c1", "Old", "3x3", 1706745600000);
    speed
        .solves
        .all
        .push(Solve::new("s2", "c1", 10400.0, 1706745700000, 3.0));
    vec![speed, Cube::new("c9", "Deleted", "2x2", 1706745600000)]
}

#[tokio::test]
async fn fetches_backup_for_account() {
    let base = serve(MockBackup {
        body: encode_backup(&fixture()),
        token: None,
    })
    .await;

    let value = HttpBackupFetcher::new(base.as_str())
        .fetch_backup(ACCOUNT)
        .await
        .unwrap();
    assert_eq!(decode_backup(&value).unwrap().cubes, fixture());

    let other = HttpBackupFetcher::new(base)
        .fetch_backup("nobody@example.com")
        .await
        .unwrap();
    assert_eq!(other, json!([]));
}

#[tokio::test]
async fn sends_bearer_token() {
    let base = serve(MockBackup {
        body: encode_backup(&fixture()),
        token: Some("secret"),
    })
    .await;

    let err = HttpBackupFetcher::new(base.as_str())
        .fetch_backup(ACCOUNT)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status(401)));

    let value = HttpBackupFetcher::new(base)
        .with_token("secret")
        .fetch_backup(ACCOUNT)
        .await
        .unwrap();
    assert_eq!(decode_backup(&value).unwrap().cubes.len(), 2);
}

#[tokio::test]
async fn server_errors_and_bad_bodies_fail() {
    let base = serve(MockBackup {
        body: json!([]),
        token: None,
    })
    .await;

    let err = HttpBackupFetcher::new(format!("{}/down", base))
        .fetch_backup(ACCOUNT)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status(500)));

    let err = HttpBackupFetcher::new(format!("{}/broken", base))
        .fetch_backup(ACCOUNT)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Http(_)));
}

#[tokio::test]
async fn restore_over_http_into_sqlite() {
    let base = serve(MockBackup {
        body: encode_backup(&fixture()),
        token: None,
    })
    .await;

    let store = SharedStore::new(SqliteStore::open("sqlite::memory:").await.unwrap());
    let mut local = Cube::new("c1", "Speed", "3x3", 1706745600000);
    local.record_solve(Solve::new("s1", "c1", 9800.0, 1706745650000, 2.0));
    store.put(&local).await.unwrap();

    let report = Restorer::new(store.clone(), HttpBackupFetcher::new(base))
        .restore(ACCOUNT)
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.summary.dropped, vec!["c9"]);

    let cubes = store.get_all().await.unwrap();
    assert_eq!(cubes.len(), 1);
    assert_eq!(cubes[0].name, "Speed");
    assert_eq!(cubes[0].solve_ids().collect::<Vec<_>>(), vec!["s2", "s1"]);
    // The merged cube keeps the remote session, which is empty
    assert!(cubes[0].solves.session.is_empty());
}

#[tokio::test]
async fn restore_from_exported_file() {
    let path = std::env::temp_dir().join(format!("cubelog-backup-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, encode_backup(&fixture()).to_string()).unwrap();

    let store = SharedStore::new(SqliteStore::open("sqlite::memory:").await.unwrap());
    store.put(&Cube::new("c9", "Kept", "2x2", 1)).await.unwrap();

    let report = Restorer::new(store.clone(), FileBackupFetcher::new(&path))
        .restore(ACCOUNT)
        .await
        .unwrap();
    let _ = std::fs::remove_file(&path);

    assert!(report.fetch_warning.is_none());
    let cubes = store.get_all().await.unwrap();
    assert_eq!(cubes.len(), 1);
    assert_eq!(cubes[0].name, "Kept");
    assert_eq!(cubes[0].category, "2x2");
}
