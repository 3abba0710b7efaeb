//! SQLite-backed entity store.

use super::EntityStore;
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use cubelog_engine::{Cube, CubeId, IndexQuery, Timestamp};
use futures::TryStreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Executor, Row, Sqlite};
use std::str::FromStr;
use std::time::Duration;

/// The on-device cube database.
///
/// Open once at startup and share; [`close`](Self::close) on shutdown.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `database_url` and run
    /// migrations. `sqlite::memory:` gives a private in-memory database.
    pub async fn open(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        // One connection: writes are serialized anyway, and an in-memory
        // database only lives as long as its connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!("Cube store ready at {}", database_url);

        Ok(Self { pool })
    }

    /// Close the pool. Later calls fail with a database error.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl EntityStore for SqliteStore {
    async fn get(&self, id: &str) -> StoreResult<Option<Cube>> {
        let row = sqlx::query("SELECT id, data FROM cubes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(decode_row).transpose()
    }

    async fn get_all(&self) -> StoreResult<Vec<Cube>> {
        let mut rows = sqlx::query("SELECT id, data FROM cubes").fetch(&self.pool);

        let mut cubes = Vec::new();
        while let Some(row) = rows.try_next().await? {
            cubes.push(decode_row(&row)?);
        }
        Ok(cubes)
    }

    async fn put(&self, cube: &Cube) -> StoreResult<()> {
        upsert(&self.pool, cube).await
    }

    async fn put_batch(&self, cubes: &[Cube]) -> StoreResult<()> {
        if cubes.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| batch_error(cubes, e.into()))?;

        for cube in cubes {
            if let Err(e) = upsert(&mut *tx, cube).await {
                // Dropping the transaction rolls it back
                return Err(batch_error(cubes, e));
            }
        }

        tx.commit()
            .await
            .map_err(|e| batch_error(cubes, e.into()))
    }

    async fn remove(&self, id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM cubes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        sqlx::query("DELETE FROM cubes").execute(&self.pool).await?;
        Ok(())
    }

    async fn find(&self, query: &IndexQuery) -> StoreResult<Vec<Cube>> {
        let rows = match query {
            IndexQuery::Category { category } => {
                sqlx::query(
                    "SELECT id, data FROM cubes WHERE category = ? ORDER BY created_at, id",
                )
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            IndexQuery::Favorites => {
                sqlx::query("SELECT id, data FROM cubes WHERE favorite = 1 ORDER BY created_at, id")
                    .fetch_all(&self.pool)
                    .await?
            }
            IndexQuery::CreatedAt { from, to } => {
                sqlx::query(
                    r#"
                    SELECT id, data FROM cubes
                    WHERE created_at >= ? AND created_at <= ?
                    ORDER BY created_at, id
                    "#,
                )
                .bind(from.map(to_i64).unwrap_or(i64::MIN))
                .bind(to.map(to_i64).unwrap_or(i64::MAX))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(decode_row).collect()
    }
}

/// Insert or replace one cube through any executor (pool or transaction).
async fn upsert<'e, E>(executor: E, cube: &Cube) -> StoreResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let data = serde_json::to_string(cube).map_err(|source| StoreError::Codec {
        id: cube.id.clone(),
        source,
    })?;

    sqlx::query(
        r#"
        INSERT INTO cubes (id, name, category, created_at, favorite, data)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (id) DO UPDATE SET
            name = excluded.name,
            category = excluded.category,
            created_at = excluded.created_at,
            favorite = excluded.favorite,
            data = excluded.data
        "#,
    )
    .bind(&cube.id)
    .bind(&cube.name)
    .bind(&cube.category)
    .bind(to_i64(cube.created_at))
    .bind(cube.favorite)
    .bind(data)
    .execute(executor)
    .await?;

    Ok(())
}

fn decode_row(row: &SqliteRow) -> StoreResult<Cube> {
    let id: String = row.try_get("id")?;
    let data: String = row.try_get("data")?;
    serde_json::from_str(&data).map_err(|source| StoreError::Codec { id, source })
}

fn batch_error(cubes: &[Cube], source: StoreError) -> StoreError {
    StoreError::Batch {
        unapplied: cubes.iter().map(|c| c.id.clone()).collect::<Vec<CubeId>>(),
        source: Box::new(source),
    }
}

fn to_i64(ts: Timestamp) -> i64 {
    i64::try_from(ts).unwrap_or(i64::MAX)
}
