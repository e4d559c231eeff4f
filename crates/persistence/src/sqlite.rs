//! Named save slots in a SQLite database.

use sim_core::WorldState;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::info;

use crate::{decode_world, encode_world, PersistError};

const CREATE_SAVES: &str = "CREATE TABLE IF NOT EXISTS saves (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    note TEXT,
    week INTEGER NOT NULL DEFAULT 0,
    schema_version INTEGER NOT NULL DEFAULT 0,
    blob TEXT,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)";

/// Returns the default SQLite URL used for local saves.
pub fn default_sqlite_url() -> &'static str {
    "sqlite://./saves/main.db"
}

/// Connect and make sure the schema exists.
pub async fn init_db(url: &str) -> Result<SqlitePool, PersistError> {
    let pool = SqlitePoolOptions::new().max_connections(1).connect(url).await?;
    sqlx::query(CREATE_SAVES).execute(&pool).await?;
    Ok(pool)
}

/// Create a save slot (or refresh its note) and return its id.
pub async fn create_save(pool: &SqlitePool, name: &str, note: Option<&str>) -> Result<i64, PersistError> {
    sqlx::query(
        "INSERT INTO saves (name, note) VALUES (?1, ?2)
         ON CONFLICT(name) DO UPDATE SET note = COALESCE(excluded.note, saves.note)",
    )
    .bind(name)
    .bind(note)
    .execute(pool)
    .await?;
    let id: i64 = sqlx::query_scalar("SELECT id FROM saves WHERE name = ?1")
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

/// Store the world in the named slot, creating it if needed.
pub async fn write_world(pool: &SqlitePool, name: &str, world: &WorldState) -> Result<i64, PersistError> {
    let id = create_save(pool, name, None).await?;
    let blob = encode_world(world)?;
    sqlx::query(
        "UPDATE saves SET blob = ?1, week = ?2, schema_version = ?3, updated_at = CURRENT_TIMESTAMP
         WHERE id = ?4",
    )
    .bind(&blob)
    .bind(i64::from(world.week))
    .bind(i64::from(world.schema_version))
    .bind(id)
    .execute(pool)
    .await?;
    info!(name, id, week = world.week, "world written to sqlite");
    Ok(id)
}

/// Load the named slot. Empty or missing slots read as `None`.
pub async fn read_world(pool: &SqlitePool, name: &str) -> Result<Option<WorldState>, PersistError> {
    let blob: Option<Option<String>> = sqlx::query_scalar("SELECT blob FROM saves WHERE name = ?1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    blob.flatten().map(|b| decode_world(&b)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{Brand, SimConfig};

    #[test]
    fn url_is_sqlite() {
        assert!(default_sqlite_url().starts_with("sqlite://"));
    }

    #[tokio::test]
    async fn slots_round_trip() {
        let pool = init_db("sqlite::memory:").await.unwrap();
        let id = create_save(&pool, "default", Some("initialized")).await.unwrap();
        assert_eq!(create_save(&pool, "default", None).await.unwrap(), id);
        assert!(read_world(&pool, "default").await.unwrap().is_none());
        assert!(read_world(&pool, "missing").await.unwrap().is_none());

        let mut w = sim_runtime::new_world(9, Brand::SmackDown, &SimConfig::default());
        w.week = 5;
        assert_eq!(write_world(&pool, "default", &w).await.unwrap(), id);
        let back = read_world(&pool, "default").await.unwrap().unwrap();
        assert_eq!(back.week, 5);
        assert_eq!(back.user_brand, Brand::SmackDown);
        assert_eq!(back.titles, w.titles);
        assert_eq!(back.roster.len(), w.roster.len());

        let note: Option<String> = sqlx::query_scalar("SELECT note FROM saves WHERE id = ?1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(note.as_deref(), Some("initialized"));
    }
}
