//! Generative fallback trait — free-text answering for unmatched queries.

use crate::error::GenerativeError;
use async_trait::async_trait;

/// A generative completion backend.
///
/// Invoked with the raw query when the knowledge base has no canned
/// answer. Errors are never surfaced to the remote party; the engine
/// replies with a fixed apology instead. There is no retry beyond the
/// single attempt per message.
#[async_trait]
pub trait Generative: Send + Sync {
    /// Provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Generate a free-text answer for the query.
    async fn complete(&self, query: &str) -> std::result::Result<String, GenerativeError>;
}
