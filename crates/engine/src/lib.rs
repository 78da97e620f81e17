//! The conversation engine — one state machine per contact.
//!
//! Consumes inbound message events, consults the knowledge base, the
//! generative fallback, and the user directory, and produces exactly one
//! reply per inbound message (no silent drops, no duplicates).
//!
//! Session mutations happen before the reply that announces them, so a
//! crash between mutation and reply leaves the session in the new state
//! with no reply sent — acceptable under at-most-once delivery.

pub mod replies;
pub mod session;

pub use session::{InMemorySessionStore, Session, SessionStore, Stage};

use chaty_core::contact::ContactId;
use chaty_core::provider::Generative;
use chaty_core::store::{KnowledgeBase, UserDirectory};
use std::sync::Arc;
use tracing::{debug, warn};

/// The outcome of handling one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// The single reply to send back.
    pub reply: String,

    /// A query-log append to perform after the reply has gone out.
    /// Present only when the contact has a durable user record.
    pub followup: Option<PendingLog>,
}

impl Turn {
    fn reply(text: impl Into<String>) -> Self {
        Self {
            reply: text.into(),
            followup: None,
        }
    }
}

/// A deferred query-log entry. Recording it must never block or fail the
/// reply path, so it is handed back to the caller and committed after the
/// reply is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLog {
    pub user_id: String,
    pub question: String,
    pub answer: String,
}

/// The per-contact conversation state machine.
pub struct ConversationEngine {
    sessions: Arc<dyn SessionStore>,
    directory: Arc<dyn UserDirectory>,
    knowledge: Arc<dyn KnowledgeBase>,
    generative: Arc<dyn Generative>,
}

impl ConversationEngine {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        directory: Arc<dyn UserDirectory>,
        knowledge: Arc<dyn KnowledgeBase>,
        generative: Arc<dyn Generative>,
    ) -> Self {
        Self {
            sessions,
            directory,
            knowledge,
            generative,
        }
    }

    /// Handle one inbound message, producing exactly one reply.
    pub async fn handle_message(&self, contact_id: &ContactId, body: &str) -> Turn {
        let text = body.trim();

        let Some(mut session) = self.sessions.get(contact_id).await else {
            // First contact: open a session and ask for a name.
            self.sessions.put(Session::new(contact_id.clone())).await;
            debug!(contact = %contact_id, "New session opened");
            return Turn::reply(replies::NAME_PROMPT);
        };

        match session.stage {
            Stage::AwaitingName => {
                // An empty or whitespace-only body is not a name.
                if text.is_empty() {
                    return Turn::reply(replies::NAME_REPROMPT);
                }

                session.display_name = text.to_string();
                session.stage = Stage::Active;
                self.sessions.put(session).await;

                if let Err(e) = self.directory.upsert(contact_id, text).await {
                    warn!(contact = %contact_id, error = %e, "User upsert failed");
                }

                Turn::reply(replies::greeting(text))
            }

            Stage::Active => match text.to_lowercase().as_str() {
                "help" => Turn::reply(replies::HELP),
                "exit" => {
                    self.sessions.remove(contact_id).await;
                    debug!(contact = %contact_id, "Session ended");
                    Turn::reply(replies::FAREWELL)
                }
                "reset" => {
                    session.display_name.clear();
                    session.stage = Stage::AwaitingName;
                    self.sessions.put(session).await;
                    Turn::reply(replies::RESET)
                }
                _ => self.resolve_answer(contact_id, text).await,
            },
        }
    }

    /// Resolve a free-text query: canned answer first, generative
    /// fallback second, fixed apology when the fallback fails.
    async fn resolve_answer(&self, contact_id: &ContactId, text: &str) -> Turn {
        let canned = match self.knowledge.find_answer(&text.to_lowercase()).await {
            Ok(hit) => hit,
            Err(e) => {
                // A lookup failure degrades to "no match"; the fallback
                // still gets its single attempt.
                warn!(error = %e, "Knowledge lookup failed");
                None
            }
        };

        let answer = match canned {
            Some(answer) => answer,
            None => match self.generative.complete(text).await {
                Ok(answer) => answer,
                Err(e) => {
                    warn!(error = %e, "Generative fallback failed");
                    replies::APOLOGY.to_string()
                }
            },
        };

        let followup = match self.directory.find_by_contact(contact_id).await {
            Ok(Some(user)) => Some(PendingLog {
                user_id: user.id,
                question: text.to_string(),
                answer: answer.clone(),
            }),
            Ok(None) => None,
            Err(e) => {
                warn!(contact = %contact_id, error = %e, "User lookup for query log failed");
                None
            }
        };

        Turn { reply: answer, followup }
    }

    /// Commit a deferred query-log entry. Failures are reported and
    /// swallowed — a missing log entry is an acceptable degradation, a
    /// missing reply is not.
    pub async fn record(&self, log: PendingLog) {
        if let Err(e) = self
            .directory
            .log_query(&log.user_id, &log.question, &log.answer)
            .await
        {
            warn!(user_id = %log.user_id, error = %e, "Query log append failed");
        }
    }
}
