//! Store traits — durable user directory, knowledge lookup, and query log.

use crate::contact::ContactId;
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A durable user record. One per contact identifier; never deleted by
/// the core (deletion is an administrative action outside scope).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Derived from the contact identifier (its digits).
    pub id: String,

    /// Display name captured during onboarding.
    pub name: String,

    /// When the record was first created.
    pub created_at: DateTime<Utc>,
}

/// A canned question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// An append-only record of an answered query. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub user_id: String,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

/// The user directory: maps contact identifiers to durable user records
/// and records query history.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Create the record for a contact, or update its name if one exists.
    async fn upsert(
        &self,
        contact_id: &ContactId,
        name: &str,
    ) -> std::result::Result<UserRecord, StoreError>;

    /// Look up the durable record for a contact, if any.
    async fn find_by_contact(
        &self,
        contact_id: &ContactId,
    ) -> std::result::Result<Option<UserRecord>, StoreError>;

    /// Append a query-log entry for a known user.
    async fn log_query(
        &self,
        user_id: &str,
        question: &str,
        answer: &str,
    ) -> std::result::Result<(), StoreError>;
}

/// Canned-answer lookup against the stored question/answer table.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Case-insensitive substring match of `text` against stored questions.
    ///
    /// When several stored questions match, the first match in stored
    /// order wins; no relevance ranking is attempted.
    async fn find_answer(&self, text: &str) -> std::result::Result<Option<String>, StoreError>;
}
