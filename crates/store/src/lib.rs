//! Durable storage for Chaty — user directory, FAQ table, and query log.
//!
//! Two implementations of the core store traits:
//! - [`InMemoryStore`] — ephemeral, for tests and demo runs
//! - [`SqliteStore`] — production backend (behind the `sqlite` feature)
//!
//! Plus [`seed`] for the idempotent FAQ seeder.

pub mod in_memory;
pub mod seed;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use seed::{default_faqs, seed_faqs};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
