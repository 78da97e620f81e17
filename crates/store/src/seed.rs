//! FAQ seeding — populate the knowledge base on first run.
//!
//! Idempotent: if any FAQ rows already exist, nothing is added.

use async_trait::async_trait;
use chaty_core::error::StoreError;
use chaty_core::store::FaqEntry;
use tracing::info;

/// Administrative surface the seeder needs. Both store backends implement
/// it; the conversation engine itself only ever reads through
/// `KnowledgeBase`.
#[async_trait]
pub trait FaqAdmin: Send + Sync {
    async fn insert_faq(&self, entry: FaqEntry) -> Result<(), StoreError>;
    async fn faq_count(&self) -> Result<usize, StoreError>;
}

/// The stock FAQ set shipped with the bot.
pub fn default_faqs() -> Vec<FaqEntry> {
    vec![
        FaqEntry {
            question: "What is your return policy?".into(),
            answer: "Our return policy is 8 - 10 business days from the day of purchase.".into(),
        },
        FaqEntry {
            question: "What are your business hours?".into(),
            answer: "I am online 24/7.".into(),
        },
    ]
}

/// Seed the FAQ table unless it already has rows.
///
/// Returns the number of entries inserted (zero when the table was
/// already populated).
pub async fn seed_faqs(store: &dyn FaqAdmin) -> Result<usize, StoreError> {
    let existing = store.faq_count().await?;
    if existing > 0 {
        info!(existing, "FAQs already present, skipping seed");
        return Ok(0);
    }

    let faqs = default_faqs();
    let count = faqs.len();
    info!(count, "Seeding FAQs");
    for faq in faqs {
        store.insert_faq(faq).await?;
    }

    Ok(count)
}
