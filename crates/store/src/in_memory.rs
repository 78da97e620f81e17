//! In-memory store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chaty_core::contact::ContactId;
use chaty_core::error::StoreError;
use chaty_core::store::{FaqEntry, KnowledgeBase, QueryLogEntry, UserDirectory, UserRecord};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::seed::FaqAdmin;

/// An in-memory store keyed the same way the SQLite backend is.
/// Nothing survives a restart; useful for tests and demo runs.
#[derive(Default)]
pub struct InMemoryStore {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
    faqs: Arc<RwLock<Vec<FaqEntry>>>,
    query_log: Arc<RwLock<Vec<QueryLogEntry>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the query log, oldest first (for tests).
    pub async fn query_log(&self) -> Vec<QueryLogEntry> {
        self.query_log.read().await.clone()
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn upsert(&self, contact_id: &ContactId, name: &str) -> Result<UserRecord, StoreError> {
        let id = contact_id.digits();
        let mut users = self.users.write().await;
        let record = users
            .entry(id.clone())
            .and_modify(|u| u.name = name.to_string())
            .or_insert_with(|| UserRecord {
                id,
                name: name.to_string(),
                created_at: Utc::now(),
            });
        Ok(record.clone())
    }

    async fn find_by_contact(
        &self,
        contact_id: &ContactId,
    ) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(&contact_id.digits()).cloned())
    }

    async fn log_query(
        &self,
        user_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<(), StoreError> {
        self.query_log.write().await.push(QueryLogEntry {
            user_id: user_id.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }
}

#[async_trait]
impl KnowledgeBase for InMemoryStore {
    async fn find_answer(&self, text: &str) -> Result<Option<String>, StoreError> {
        let needle = text.to_lowercase();
        let faqs = self.faqs.read().await;
        // First match in insertion order, no ranking.
        Ok(faqs
            .iter()
            .find(|f| f.question.to_lowercase().contains(&needle))
            .map(|f| f.answer.clone()))
    }
}

#[async_trait]
impl FaqAdmin for InMemoryStore {
    async fn insert_faq(&self, entry: FaqEntry) -> Result<(), StoreError> {
        self.faqs.write().await.push(entry);
        Ok(())
    }

    async fn faq_count(&self) -> Result<usize, StoreError> {
        Ok(self.faqs.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ContactId {
        ContactId::new("+15550001@c.us")
    }

    #[tokio::test]
    async fn upsert_creates_then_updates() {
        let store = InMemoryStore::new();
        let created = store.upsert(&contact(), "Ada").await.unwrap();
        assert_eq!(created.name, "Ada");
        assert_eq!(created.id, "15550001");

        let updated = store.upsert(&contact(), "Grace").await.unwrap();
        assert_eq!(updated.name, "Grace");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn find_unknown_contact_is_none() {
        let store = InMemoryStore::new();
        let found = store.find_by_contact(&contact()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn find_answer_is_case_insensitive_substring() {
        let store = InMemoryStore::new();
        store
            .insert_faq(FaqEntry {
                question: "What is your return policy?".into(),
                answer: "8 - 10 business days.".into(),
            })
            .await
            .unwrap();

        let hit = store.find_answer("RETURN POLICY").await.unwrap();
        assert_eq!(hit.as_deref(), Some("8 - 10 business days."));

        let miss = store.find_answer("shipping cost").await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn first_match_in_insertion_order_wins() {
        let store = InMemoryStore::new();
        store
            .insert_faq(FaqEntry {
                question: "What are your opening hours on weekdays?".into(),
                answer: "9 to 5.".into(),
            })
            .await
            .unwrap();
        store
            .insert_faq(FaqEntry {
                question: "What are your opening hours on weekends?".into(),
                answer: "Closed.".into(),
            })
            .await
            .unwrap();

        let hit = store.find_answer("opening hours").await.unwrap();
        assert_eq!(hit.as_deref(), Some("9 to 5."));
    }

    #[tokio::test]
    async fn query_log_appends_in_order() {
        let store = InMemoryStore::new();
        store.log_query("15550001", "q1", "a1").await.unwrap();
        store.log_query("15550001", "q2", "a2").await.unwrap();

        let log = store.query_log().await;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].question, "q1");
        assert_eq!(log[1].answer, "a2");
    }
}
