//! The bot runtime — dispatches transport events to the pairing manager
//! and the conversation engine, one event at a time.
//!
//! Single-threaded, event-driven: each event is processed to completion
//! (including suspending store/provider calls) before the next one is
//! dispatched, so per-contact session state is always observed
//! consistently. Cross-contact interleaving never shares mutable state.

use chaty_core::error::Error;
use chaty_core::event::{Outbound, TransportEvent};
use chaty_core::transport::Transport;
use chaty_engine::{ConversationEngine, PendingLog, SessionStore};
use chaty_pairing::PairingManager;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Wires the transport, credential lifecycle, and conversation engine.
pub struct BotRuntime {
    transport: Arc<dyn Transport>,
    engine: Arc<ConversationEngine>,
    pairing: Arc<PairingManager>,
    sessions: Arc<dyn SessionStore>,
}

impl BotRuntime {
    pub fn new(
        transport: Arc<dyn Transport>,
        engine: Arc<ConversationEngine>,
        pairing: Arc<PairingManager>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            transport,
            engine,
            pairing,
            sessions,
        }
    }

    /// Consume the event stream until the transport closes it.
    ///
    /// Unrecoverable credential-cleanup failures propagate out so the
    /// process supervisor can act; everything else is handled in place.
    pub async fn run(&self, mut events: mpsc::Receiver<TransportEvent>) -> Result<(), Error> {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await?;
        }
        info!("Transport event stream closed");
        Ok(())
    }

    /// Dispatch one transport event to completion.
    ///
    /// Handling is split in two: the event is first turned into an
    /// [`Outbound`] command (plus a possible deferred query-log entry),
    /// then the command is executed against the transport. Events that
    /// only touch the pairing manager produce no command.
    pub async fn handle_event(&self, event: TransportEvent) -> Result<(), Error> {
        if let Some((command, followup)) = self.plan(event).await? {
            self.execute(command, followup).await?;
        }
        Ok(())
    }

    /// Decide what, if anything, to send back for an inbound event.
    async fn plan(
        &self,
        event: TransportEvent,
    ) -> Result<Option<(Outbound, Option<PendingLog>)>, Error> {
        match event {
            TransportEvent::PairingCodeIssued { code } => {
                self.pairing.on_pairing_code(&code).await?;
                Ok(None)
            }

            TransportEvent::Authenticated { session } => {
                info!("Authenticated successfully");
                self.pairing.on_authenticated(&session).await?;
                Ok(None)
            }

            TransportEvent::AuthFailed { message } => {
                error!(message = %message, "Authentication failed");
                self.pairing.on_auth_failure().await?;
                Ok(None)
            }

            TransportEvent::Ready => {
                info!("Transport is ready");
                Ok(None)
            }

            TransportEvent::Disconnected { reason } => {
                info!(reason = %reason, "Transport disconnected");
                Ok(Some((Outbound::Reconnect, None)))
            }

            TransportEvent::MessageReceived { contact_id, body } => {
                let turn = self.engine.handle_message(&contact_id, &body).await;
                let command = Outbound::Reply {
                    contact_id,
                    text: turn.reply,
                };
                Ok(Some((command, turn.followup)))
            }

            TransportEvent::MessageAcked { message_ref, ack } => {
                debug!(message_ref = %message_ref, status = %ack, "Message acknowledged");
                Ok(None)
            }
        }
    }

    /// Execute an outbound command.
    async fn execute(
        &self,
        command: Outbound,
        followup: Option<PendingLog>,
    ) -> Result<(), Error> {
        match command {
            Outbound::Reply { contact_id, text } => {
                match self.transport.send_reply(&contact_id, &text).await {
                    Ok(()) => {
                        // The query log is appended only after the reply
                        // has actually gone out.
                        if let Some(log) = followup {
                            self.engine.record(log).await;
                        }
                    }
                    Err(e) => {
                        warn!(contact = %contact_id, error = %e, "Reply delivery failed");
                    }
                }
                Ok(())
            }

            Outbound::Reconnect => self.reconnect().await,
        }
    }

    /// Handle a disconnect: at most one reconnection attempt at a time.
    async fn reconnect(&self) -> Result<(), Error> {
        if !self.pairing.begin_reconnect().await? {
            // A reconnect is already in flight; this event is dropped.
            return Ok(());
        }

        // Sessions do not survive a connection cycle.
        self.sessions.clear().await;

        if let Err(e) = self.transport.destroy().await {
            warn!(error = %e, "Transport destroy failed");
        }
        if let Err(e) = self.transport.initialize().await {
            error!(error = %e, "Transport re-initialization failed");
        }

        // Release the slot whether the attempt succeeded or failed.
        self.pairing.end_reconnect().await;
        Ok(())
    }
}
