//! SQLite backend — users, FAQ table, and append-only query log.
//!
//! A single database file with three tables:
//! - `users`     — one row per contact (primary key = contact digits)
//! - `faqs`      — canned question/answer pairs, ordered by rowid
//! - `query_log` — append-only history of answered queries
//!
//! Uses runtime `sqlx::query` with in-crate migrations, WAL journaling,
//! and `create_if_missing`.

use async_trait::async_trait;
use chaty_core::contact::ContactId;
use chaty_core::error::StoreError;
use chaty_core::store::{FaqEntry, KnowledgeBase, UserDirectory, UserRecord};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// The production SQLite store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store from a file path.
    ///
    /// The database and all tables are created automatically.
    /// Pass `":memory:"` for an in-process ephemeral database (useful for tests).
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite store initialized at {path}");
        Ok(store)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Run schema migrations — creates the three tables.
    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id         TEXT PRIMARY KEY,
                name       TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("users table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS faqs (
                id       INTEGER PRIMARY KEY AUTOINCREMENT,
                question TEXT NOT NULL,
                answer   TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("faqs table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS query_log (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id    TEXT NOT NULL REFERENCES users(id),
                question   TEXT NOT NULL,
                answer     TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("query_log table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    /// Parse a `UserRecord` from a SQLite row.
    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<UserRecord, StoreError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?;
        let name: String = row
            .try_get("name")
            .map_err(|e| StoreError::QueryFailed(format!("name column: {e}")))?;
        let created_at_str: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;

        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(UserRecord {
            id,
            name,
            created_at,
        })
    }
}

#[async_trait]
impl UserDirectory for SqliteStore {
    async fn upsert(&self, contact_id: &ContactId, name: &str) -> Result<UserRecord, StoreError> {
        let id = contact_id.digits();
        sqlx::query(
            r#"
            INSERT INTO users (id, name, created_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("user upsert: {e}")))?;

        let row = sqlx::query("SELECT id, name, created_at FROM users WHERE id = ?1")
            .bind(&id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("user fetch after upsert: {e}")))?;

        Self::row_to_user(&row)
    }

    async fn find_by_contact(
        &self,
        contact_id: &ContactId,
    ) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query("SELECT id, name, created_at FROM users WHERE id = ?1")
            .bind(contact_id.digits())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("user lookup: {e}")))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn log_query(
        &self,
        user_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO query_log (user_id, question, answer, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(user_id)
        .bind(question)
        .bind(answer)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("query log insert: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl KnowledgeBase for SqliteStore {
    async fn find_answer(&self, text: &str) -> Result<Option<String>, StoreError> {
        // First match by rowid order; `instr` gives us the case-insensitive
        // substring check against the lowered question text.
        let row = sqlx::query(
            "SELECT answer FROM faqs WHERE instr(lower(question), lower(?1)) > 0 ORDER BY id LIMIT 1",
        )
        .bind(text)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("faq lookup: {e}")))?;

        row.map(|r| {
            r.try_get::<String, _>("answer")
                .map_err(|e| StoreError::QueryFailed(format!("answer column: {e}")))
        })
        .transpose()
    }
}

#[async_trait]
impl crate::seed::FaqAdmin for SqliteStore {
    async fn insert_faq(&self, entry: FaqEntry) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO faqs (question, answer) VALUES (?1, ?2)")
            .bind(&entry.question)
            .bind(&entry.answer)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("faq insert: {e}")))?;
        Ok(())
    }

    async fn faq_count(&self) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM faqs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("faq count: {e}")))?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| StoreError::QueryFailed(format!("count column: {e}")))?;
        Ok(n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{FaqAdmin, seed_faqs};

    async fn test_store() -> SqliteStore {
        SqliteStore::new(":memory:").await.unwrap()
    }

    fn contact() -> ContactId {
        ContactId::new("+15550001@c.us")
    }

    #[tokio::test]
    async fn upsert_and_find() {
        let store = test_store().await;
        let created = store.upsert(&contact(), "Ada").await.unwrap();
        assert_eq!(created.id, "15550001");
        assert_eq!(created.name, "Ada");

        let found = store.find_by_contact(&contact()).await.unwrap().unwrap();
        assert_eq!(found.name, "Ada");
    }

    #[tokio::test]
    async fn upsert_updates_name_keeps_created_at() {
        let store = test_store().await;
        let created = store.upsert(&contact(), "Ada").await.unwrap();
        let updated = store.upsert(&contact(), "Grace").await.unwrap();
        assert_eq!(updated.name, "Grace");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn unknown_contact_is_none() {
        let store = test_store().await;
        assert!(store.find_by_contact(&contact()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn seeded_faq_matches_substring() {
        let store = test_store().await;
        seed_faqs(&store).await.unwrap();

        let hit = store.find_answer("what is your RETURN policy").await.unwrap();
        assert!(hit.unwrap().contains("8 - 10 business days"));

        let miss = store.find_answer("do you ship overseas").await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn first_faq_by_id_wins() {
        let store = test_store().await;
        store
            .insert_faq(FaqEntry {
                question: "Where are your stores in Oslo?".into(),
                answer: "Two downtown.".into(),
            })
            .await
            .unwrap();
        store
            .insert_faq(FaqEntry {
                question: "Where are your stores in Bergen?".into(),
                answer: "One by the harbor.".into(),
            })
            .await
            .unwrap();

        let hit = store.find_answer("your stores").await.unwrap();
        assert_eq!(hit.as_deref(), Some("Two downtown."));
    }

    #[tokio::test]
    async fn query_log_insert_requires_nothing_back() {
        let store = test_store().await;
        store.upsert(&contact(), "Ada").await.unwrap();
        store
            .log_query("15550001", "what now", "this")
            .await
            .unwrap();
    }
}
