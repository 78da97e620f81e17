//! Transport events and outbound commands.
//!
//! The transport is modeled as an explicit inbound event enum dispatched to
//! handler functions that return an outbound command, rather than as
//! free-standing registered callbacks. This keeps the conversation state
//! machine testable without a live connection.

use crate::contact::ContactId;
use serde::{Deserialize, Serialize};

/// Every lifecycle and message event the transport can emit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TransportEvent {
    /// A fresh pairing code was issued; the operator must scan it to log in.
    PairingCodeIssued { code: String },

    /// Authentication succeeded; the transport handed over a session blob
    /// that allows a future process start to skip re-pairing.
    Authenticated { session: serde_json::Value },

    /// Authentication failed. Terminal for the current login attempt.
    AuthFailed { message: String },

    /// The transport is connected and will start delivering messages.
    Ready,

    /// The authenticated session was logged out or the connection dropped.
    Disconnected { reason: String },

    /// An inbound chat message.
    MessageReceived { contact_id: ContactId, body: String },

    /// Delivery acknowledgement for a previously sent message.
    MessageAcked { message_ref: String, ack: AckLevel },
}

/// Delivery acknowledgement levels reported by the transport (0..3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckLevel {
    Sent,
    Delivered,
    Read,
    Played,
    /// Anything outside the documented 0..3 range.
    Unknown,
}

impl From<u8> for AckLevel {
    fn from(level: u8) -> Self {
        match level {
            0 => AckLevel::Sent,
            1 => AckLevel::Delivered,
            2 => AckLevel::Read,
            3 => AckLevel::Played,
            _ => AckLevel::Unknown,
        }
    }
}

impl std::fmt::Display for AckLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AckLevel::Sent => "MESSAGE SENT",
            AckLevel::Delivered => "MESSAGE DELIVERED",
            AckLevel::Read => "MESSAGE READ",
            AckLevel::Played => "MESSAGE PLAYED",
            AckLevel::Unknown => "UNKNOWN",
        };
        write!(f, "{s}")
    }
}

/// What a handler wants sent back through the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outbound {
    /// Send a reply to a contact.
    Reply { contact_id: ContactId, text: String },

    /// Tear down and re-initialize the transport connection.
    Reconnect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_level_from_raw() {
        assert_eq!(AckLevel::from(0), AckLevel::Sent);
        assert_eq!(AckLevel::from(3), AckLevel::Played);
        assert_eq!(AckLevel::from(7), AckLevel::Unknown);
    }

    #[test]
    fn ack_level_display() {
        assert_eq!(AckLevel::Delivered.to_string(), "MESSAGE DELIVERED");
        assert_eq!(AckLevel::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn event_serialization_round_trip() {
        let event = TransportEvent::MessageReceived {
            contact_id: ContactId::new("+15550001@c.us"),
            body: "hi".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("+15550001@c.us"));
    }
}
