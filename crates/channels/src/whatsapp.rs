//! WhatsApp transport adapter (stub).
//!
//! Implements the Transport trait for a WhatsApp Web bridge. In
//! production this would drive a headless WhatsApp Web session; currently
//! a stub that can emit/accept events via an in-process channel, which is
//! also how the runtime tests drive it.

use async_trait::async_trait;
use chaty_core::contact::ContactId;
use chaty_core::error::TransportError;
use chaty_core::event::TransportEvent;
use chaty_core::transport::Transport;
use tokio::sync::{Mutex, mpsc};
use tracing::info;
use uuid::Uuid;

/// WhatsApp transport configuration.
#[derive(Clone)]
pub struct WhatsAppConfig {
    /// Path to the bridge's local auth state (shared with the pairing
    /// manager's data directory).
    pub auth_state_dir: std::path::PathBuf,
    /// Session marker from a previous run, if any; lets the bridge skip
    /// re-pairing.
    pub session: Option<serde_json::Value>,
}

impl std::fmt::Debug for WhatsAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppConfig")
            .field("auth_state_dir", &self.auth_state_dir)
            .field("session", &self.session.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// WhatsApp transport adapter.
pub struct WhatsAppTransport {
    config: WhatsAppConfig,
    /// Sender for injecting events (tests and the stub bridge).
    inject_tx: Mutex<Option<mpsc::Sender<TransportEvent>>>,
    /// Replies delivered through the stub, for test assertions.
    sent: Mutex<Vec<(ContactId, String)>>,
}

impl WhatsAppTransport {
    pub fn new(config: WhatsAppConfig) -> Self {
        Self {
            config,
            inject_tx: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Inject an event as if it came from the bridge (for testing).
    pub async fn inject_event(&self, event: TransportEvent) -> Result<(), TransportError> {
        let guard = self.inject_tx.lock().await;
        if let Some(tx) = guard.as_ref() {
            tx.send(event)
                .await
                .map_err(|_| TransportError::ConnectionLost("Event channel closed".into()))
        } else {
            Err(TransportError::ConnectionLost("Transport not started".into()))
        }
    }

    /// Inject an inbound message (convenience for tests).
    pub async fn inject_message(
        &self,
        contact_id: &str,
        body: &str,
    ) -> Result<(), TransportError> {
        self.inject_event(TransportEvent::MessageReceived {
            contact_id: ContactId::new(contact_id),
            body: body.to_string(),
        })
        .await
    }

    /// Replies captured by the stub, oldest first (for tests).
    pub async fn sent_replies(&self) -> Vec<(ContactId, String)> {
        self.sent.lock().await.clone()
    }

    /// A fresh message reference for outbound sends.
    fn next_message_ref() -> String {
        Uuid::new_v4().to_string()
    }
}

#[async_trait]
impl Transport for WhatsAppTransport {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn start(&self) -> Result<mpsc::Receiver<TransportEvent>, TransportError> {
        info!(
            resumed = self.config.session.is_some(),
            "WhatsApp transport starting (stub mode)"
        );
        let (tx, rx) = mpsc::channel(64);
        *self.inject_tx.lock().await = Some(tx);
        // In production: spawn the WhatsApp Web bridge loop here, feeding
        // pairing/auth/message callbacks into `tx`.
        Ok(rx)
    }

    async fn send_reply(
        &self,
        contact_id: &ContactId,
        text: &str,
    ) -> Result<(), TransportError> {
        let message_ref = Self::next_message_ref();
        info!(
            contact = %contact_id,
            message_ref = %message_ref,
            text_len = text.len(),
            "WhatsApp send (stub)"
        );
        self.sent
            .lock()
            .await
            .push((contact_id.clone(), text.to_string()));
        Ok(())
    }

    async fn initialize(&self) -> Result<(), TransportError> {
        info!("WhatsApp transport initializing");
        // In production: start the bridge handshake.
        Ok(())
    }

    async fn destroy(&self) -> Result<(), TransportError> {
        info!("WhatsApp transport destroyed");
        *self.inject_tx.lock().await = None;
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, TransportError> {
        Ok(self.inject_tx.lock().await.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> WhatsAppConfig {
        WhatsAppConfig {
            auth_state_dir: std::path::PathBuf::from("/tmp/chaty-test/auth_state"),
            session: None,
        }
    }

    #[tokio::test]
    async fn start_and_inject() {
        let transport = WhatsAppTransport::new(test_config());
        let mut rx = transport.start().await.unwrap();

        transport
            .inject_message("+15550001@c.us", "hello")
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            TransportEvent::MessageReceived { contact_id, body } => {
                assert_eq!(contact_id.as_str(), "+15550001@c.us");
                assert_eq!(body, "hello");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn inject_before_start_fails() {
        let transport = WhatsAppTransport::new(test_config());
        assert!(transport.inject_message("x@c.us", "hi").await.is_err());
    }

    #[tokio::test]
    async fn send_records_reply() {
        let transport = WhatsAppTransport::new(test_config());
        transport
            .send_reply(&ContactId::new("+15550001@c.us"), "Hello!")
            .await
            .unwrap();

        let sent = transport.sent_replies().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "Hello!");
    }

    #[tokio::test]
    async fn destroy_closes_injection() {
        let transport = WhatsAppTransport::new(test_config());
        let _rx = transport.start().await.unwrap();
        assert!(transport.health_check().await.unwrap());

        transport.destroy().await.unwrap();
        assert!(!transport.health_check().await.unwrap());
        assert!(transport.inject_message("x@c.us", "hi").await.is_err());
    }

    #[test]
    fn debug_redacts_session() {
        let config = WhatsAppConfig {
            auth_state_dir: std::path::PathBuf::from("/tmp/auth"),
            session: Some(serde_json::json!({"token": "secret"})),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
    }
}
