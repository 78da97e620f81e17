//! Contact identifiers — the sole key for session state and directory lookups.

use serde::{Deserialize, Serialize};

/// Opaque, stable identifier for a remote party on the transport.
///
/// For WhatsApp-style transports this is the normalized JID, e.g.
/// `"+15550001@c.us"`. Never reused across different remote parties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactId(pub String);

impl ContactId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the durable user id: the digits of the identifier.
    ///
    /// Matches the transport's phone-number normalization, so the same
    /// remote party always maps to the same directory record.
    pub fn digits(&self) -> String {
        self.0.chars().filter(|c| c.is_ascii_digit()).collect()
    }
}

impl std::fmt::Display for ContactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContactId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
