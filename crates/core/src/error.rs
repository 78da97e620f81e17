//! Error types for the Chaty domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Chaty operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Transport errors ---
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    // --- Store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Generative fallback errors ---
    #[error("Generative error: {0}")]
    Generative(#[from] GenerativeError),

    // --- Pairing/credential errors ---
    #[error("Pairing error: {0}")]
    Pairing(#[from] PairingError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Transport not configured: {0}")]
    NotConfigured(String),

    #[error("Reply delivery failed to {contact_id}: {reason}")]
    DeliveryFailed { contact_id: String, reason: String },

    #[error("Transport connection lost: {0}")]
    ConnectionLost(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

#[derive(Debug, Error)]
pub enum GenerativeError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Empty completion returned by {0}")]
    EmptyCompletion(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum PairingError {
    #[error("Artifact persistence failed at {path}: {reason}")]
    Persist { path: String, reason: String },

    #[error("Artifact cleanup failed at {path}: {reason}")]
    Cleanup { path: String, reason: String },

    #[error("QR render failed: {0}")]
    Render(String),

    #[error("Invalid artifact record: {0}")]
    InvalidRecord(String),
}
