//! Transport trait — the abstraction over the messaging connection.
//!
//! A Transport connects Chaty to the external messaging platform. It emits
//! lifecycle and message events and delivers replies back to contacts. The
//! platform's own protocol (handshake, delivery guarantees, media) is the
//! transport's problem, not ours.

use crate::contact::ContactId;
use crate::error::TransportError;
use crate::event::TransportEvent;
use async_trait::async_trait;

/// The core Transport trait.
///
/// Implementations handle platform-specific connection logic. The event
/// receiver yields one event per inbound callback; the runtime processes
/// each to completion before dispatching the next.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Human-readable transport name (e.g., "whatsapp").
    fn name(&self) -> &str;

    /// Start the connection and begin emitting events.
    ///
    /// Returns a receiver that yields transport events. The implementation
    /// handles pairing, reconnect handshakes, and polling internally.
    async fn start(
        &self,
    ) -> std::result::Result<tokio::sync::mpsc::Receiver<TransportEvent>, TransportError>;

    /// Send a reply to a contact.
    async fn send_reply(
        &self,
        contact_id: &ContactId,
        text: &str,
    ) -> std::result::Result<(), TransportError>;

    /// Establish (or re-establish) the underlying connection.
    async fn initialize(&self) -> std::result::Result<(), TransportError>;

    /// Tear down the underlying connection.
    async fn destroy(&self) -> std::result::Result<(), TransportError>;

    /// Health check — is the transport connected and operational?
    async fn health_check(&self) -> std::result::Result<bool, TransportError> {
        Ok(true)
    }
}
