//! Entity store contract tests, run against every store implementation.

use cubelog_client::{EntityStore, MemoryStore, SharedStore, SqliteStore, StoreError};
use cubelog_engine::{Cube, IndexQuery, Solve};

fn cube(id: &str, name: &str, category: &str, created_at: u64) -> Cube {
    Cube::new(id, name, category, created_at)
}

fn sorted(mut cubes: Vec<Cube>) -> Vec<Cube> {
    cubes.sort_by(|a, b| a.id.cmp(&b.id));
    cubes
}

async fn check_contract<S: EntityStore>(store: &S) {
    // Missing key is an explicit "not found"
    assert_eq!(store.get("c1").await.unwrap(), None);
    assert!(store.get_all().await.unwrap().is_empty());

    // put is insert-or-replace and idempotent
    let mut c1 = cube("c1", "Speed", "3x3", 300);
    c1.record_solve(Solve::new("s1", "c1", 9120.5, 1706745600000, 3.0));
    store.put(&c1).await.unwrap();
    store.put(&c1).await.unwrap();
    assert_eq!(store.get("c1").await.unwrap(), Some(c1.clone()));
    assert_eq!(store.get_all().await.unwrap().len(), 1);

    c1.name = "Main".into();
    store.put(&c1).await.unwrap();
    assert_eq!(store.get("c1").await.unwrap().unwrap().name, "Main");

    // Batch
    let mut c3 = cube("c3", "Big", "4x4", 100);
    c3.favorite = true;
    let batch = vec![cube("c2", "Small", "2x2", 200), c3.clone()];
    store.put_batch(&batch).await.unwrap();
    store.put_batch(&[]).await.unwrap();
    assert_eq!(
        sorted(store.get_all().await.unwrap()),
        vec![c1.clone(), batch[0].clone(), c3.clone()]
    );

    // Secondary indexes
    assert_eq!(store.find(&IndexQuery::Favorites).await.unwrap(), vec![c3.clone()]);
    assert_eq!(
        store.find(&IndexQuery::category("3x3")).await.unwrap(),
        vec![c1.clone()]
    );
    let ids: Vec<String> = store
        .find(&IndexQuery::all_by_created_at())
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec!["c3", "c2", "c1"]);
    let ranged = store
        .find(&IndexQuery::CreatedAt {
            from: Some(150),
            to: Some(250),
        })
        .await
        .unwrap();
    assert_eq!(ranged, vec![batch[0].clone()]);

    // Remove, including an absent key
    store.remove("c2").await.unwrap();
    store.remove("c2").await.unwrap();
    store.remove("never-existed").await.unwrap();
    assert_eq!(store.get("c2").await.unwrap(), None);
    assert_eq!(store.get_all().await.unwrap().len(), 2);

    // Clear
    store.clear().await.unwrap();
    assert!(store.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn memory_store_contract() {
    check_contract(&MemoryStore::new()).await;
}

#[tokio::test]
async fn sqlite_store_contract() {
    check_contract(&SqliteStore::open("sqlite::memory:").await.unwrap()).await;
}

#[tokio::test]
async fn shared_store_contract() {
    check_contract(&SharedStore::new(MemoryStore::new())).await;

    let shared = SharedStore::new(MemoryStore::new());
    check_contract(&shared.exclusive().await).await;
}

#[tokio::test]
async fn sqlite_store_persists_across_reopen() {
    let path = std::env::temp_dir().join(format!("cubelog-{}.db", uuid::Uuid::new_v4()));
    let url = format!("sqlite://{}", path.display());

    let mut stored = cube("c1", "Speed", "3x3", 1);
    stored
        .extra
        .insert("description".into(), serde_json::json!("main cube"));

    let store = SqliteStore::open(&url).await.unwrap();
    store.put(&stored).await.unwrap();
    store.close().await;

    let store = SqliteStore::open(&url).await.unwrap();
    assert_eq!(store.get_all().await.unwrap(), vec![stored]);
    store.close().await;

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn closed_sqlite_store_fails_reads() {
    let store = SqliteStore::open("sqlite::memory:").await.unwrap();
    store.close().await;

    assert!(matches!(
        store.get_all().await,
        Err(StoreError::Database(_))
    ));
}
