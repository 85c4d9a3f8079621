//! User repository: the `UserStore` port over SQLite.
//!
//! `save` is an atomic insert-if-absent (`ON CONFLICT DO NOTHING`), so racing
//! first-contact saves for the same chat id all succeed and the first write
//! wins. Users are never updated or deleted here.

use async_trait::async_trait;

use kono_core::{
    domain::{ChatId, User},
    ports::UserStore,
    Error, Result,
};
use tracing::info;

use crate::sqlite_pool::SqlitePoolManager;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: ChatId(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

#[derive(Clone)]
pub struct SqliteUserStore {
    pool_manager: SqlitePoolManager,
}

impl SqliteUserStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool_manager = SqlitePoolManager::new(database_url)
            .await
            .map_err(store_err)?;
        let store = Self { pool_manager };
        store.init().await.map_err(store_err)?;
        Ok(store)
    }

    async fn init(&self) -> std::result::Result<(), sqlx::Error> {
        info!("Creating users table if not exists");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                first_name TEXT,
                last_name TEXT
            )
            "#,
        )
        .execute(self.pool_manager.pool())
        .await?;

        Ok(())
    }

    async fn fetch(&self, id: ChatId) -> std::result::Result<Option<User>, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, first_name, last_name FROM users WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(self.pool_manager.pool())
        .await?;

        Ok(row.map(User::from))
    }
}

fn store_err(e: sqlx::Error) -> Error {
    Error::Store(e.to_string())
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_by_id(&self, id: ChatId) -> Result<Option<User>> {
        self.fetch(id).await.map_err(store_err)
    }

    async fn save(&self, user: &User) -> Result<User> {
        sqlx::query(
            "INSERT INTO users (id, first_name, last_name) VALUES (?, ?, ?) \
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(user.id.0)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .execute(self.pool_manager.pool())
        .await
        .map_err(store_err)?;

        let stored = self
            .fetch(user.id)
            .await
            .map_err(store_err)?
            .ok_or_else(|| Error::Store(format!("user {} missing right after save", user.id.0)))?;

        info!("Saved user: id={}", stored.id.0);
        Ok(stored)
    }
}
