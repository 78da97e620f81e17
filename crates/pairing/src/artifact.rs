//! The pairing credential artifact record.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The persisted pairing artifact: the transport-issued code plus the
/// bookkeeping needed for lazy expiry and display-once semantics.
///
/// At most one artifact is current at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingArtifact {
    /// Opaque transport-issued token.
    pub code: String,

    /// When the artifact was generated.
    pub issued_at: DateTime<Utc>,

    /// Validity window in milliseconds.
    pub valid_for_ms: i64,

    /// Whether the terminal QR has already been shown to the operator.
    pub displayed: bool,
}

impl PairingArtifact {
    /// Build a fresh, not-yet-displayed artifact issued now.
    pub fn new(code: impl Into<String>, valid_for: Duration) -> Self {
        Self {
            code: code.into(),
            issued_at: Utc::now(),
            valid_for_ms: valid_for.num_milliseconds(),
            displayed: false,
        }
    }

    pub fn valid_for(&self) -> Duration {
        Duration::milliseconds(self.valid_for_ms)
    }

    /// An artifact is expired when `now - issued_at >= valid_for`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.issued_at) >= self.valid_for()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_artifact_is_valid_and_undisplayed() {
        let artifact = PairingArtifact::new("code-1", Duration::days(30));
        assert!(!artifact.is_expired());
        assert!(!artifact.displayed);
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let valid_for = Duration::days(30);
        let artifact = PairingArtifact::new("code-1", valid_for);
        let issued = artifact.issued_at;

        // One millisecond before the boundary: still valid.
        assert!(!artifact.is_expired_at(issued + valid_for - Duration::milliseconds(1)));
        // Exactly at the boundary: expired.
        assert!(artifact.is_expired_at(issued + valid_for));
        // Past the boundary: expired.
        assert!(artifact.is_expired_at(issued + valid_for + Duration::days(1)));
    }

    #[test]
    fn record_round_trips_through_json() {
        let artifact = PairingArtifact::new("code-xyz", Duration::days(30));
        let json = serde_json::to_string(&artifact).unwrap();
        let parsed: PairingArtifact = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, artifact);
    }
}
