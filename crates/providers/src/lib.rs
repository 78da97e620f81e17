//! Generative fallback providers for Chaty.
//!
//! Currently one implementation: Google's Gemini `generateContent` REST
//! API. The engine treats any provider error as "reply with the apology",
//! so implementations report failures honestly instead of papering over
//! them.

pub mod gemini;
pub mod noop;

pub use gemini::GeminiProvider;
pub use noop::NoopGenerative;
