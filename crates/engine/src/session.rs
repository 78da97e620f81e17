//! Conversation sessions — ephemeral, in-memory onboarding state.

use async_trait::async_trait;
use chaty_core::contact::ContactId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Where a contact is in the onboarding flow. A contact with no session
/// at all is "unknown" — the next message starts onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Session exists but no name has been captured yet.
    AwaitingName,
    /// Name captured; free-form Q&A.
    Active,
}

/// Per-contact session state. Does not survive a restart.
#[derive(Debug, Clone)]
pub struct Session {
    pub contact_id: ContactId,
    pub display_name: String,
    pub stage: Stage,
}

impl Session {
    pub fn new(contact_id: ContactId) -> Self {
        Self {
            contact_id,
            display_name: String::new(),
            stage: Stage::AwaitingName,
        }
    }
}

/// The session store, injected into the engine so tests can swap it.
/// The engine is the only component that mutates sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, contact_id: &ContactId) -> Option<Session>;
    async fn put(&self, session: Session);
    async fn remove(&self, contact_id: &ContactId);
    /// Drop every session (used when the transport reconnects).
    async fn clear(&self);
}

/// The default in-memory session store.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<ContactId, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, contact_id: &ContactId) -> Option<Session> {
        self.sessions.read().await.get(contact_id).cloned()
    }

    async fn put(&self, session: Session) {
        self.sessions
            .write()
            .await
            .insert(session.contact_id.clone(), session);
    }

    async fn remove(&self, contact_id: &ContactId) {
        self.sessions.write().await.remove(contact_id);
    }

    async fn clear(&self) {
        self.sessions.write().await.clear();
    }
}
