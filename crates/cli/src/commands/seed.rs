//! `chaty seed` — Seed the FAQ table with the default entries.

use chaty_store::seed::FaqAdmin;
use chaty_store::{InMemoryStore, SqliteStore, seed_faqs};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config =
        chaty_config::AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if config.store.backend == "in_memory" {
        // Nothing durable to seed; the runtime seeds its own store at startup.
        println!("Store backend is in_memory; seeding happens at startup.");
        let store = InMemoryStore::new();
        let seeded = seed_faqs(&store as &dyn FaqAdmin).await?;
        println!("Would seed {seeded} FAQ entries.");
        return Ok(());
    }

    let db_path = config.db_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let store = SqliteStore::new(&db_path.to_string_lossy()).await?;
    let seeded = seed_faqs(&store as &dyn FaqAdmin).await?;
    let total = store.faq_count().await?;

    println!("Seeded {seeded} new FAQ entries ({total} total).");
    println!("Database: {}", db_path.display());
    Ok(())
}
