//! Transport adapters for Chaty.
//!
//! One adapter today: WhatsApp. The adapter owns the platform protocol
//! and surfaces the event stream the runtime dispatches on.

pub mod whatsapp;

pub use whatsapp::{WhatsAppConfig, WhatsAppTransport};
