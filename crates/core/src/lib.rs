//! # Chaty Core
//!
//! Domain types, traits, and error definitions for the Chaty support bot.
//! This crate has **zero framework dependencies** — it defines the domain
//! model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here. Implementations
//! live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod contact;
pub mod error;
pub mod event;
pub mod provider;
pub mod store;
pub mod transport;

// Re-export key types at crate root for ergonomics
pub use contact::ContactId;
pub use error::{Error, Result};
pub use event::{AckLevel, Outbound, TransportEvent};
pub use provider::Generative;
pub use store::{FaqEntry, KnowledgeBase, QueryLogEntry, UserDirectory, UserRecord};
pub use transport::Transport;
