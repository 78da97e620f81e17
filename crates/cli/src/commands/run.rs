//! `chaty run` — Full bot runtime.

use chaty_channels::{WhatsAppConfig, WhatsAppTransport};
use chaty_core::provider::Generative;
use chaty_core::store::{KnowledgeBase, UserDirectory};
use chaty_core::transport::Transport;
use chaty_engine::{ConversationEngine, InMemorySessionStore, SessionStore};
use chaty_gateway::GatewayState;
use chaty_pairing::PairingManager;
use chaty_providers::{GeminiProvider, NoopGenerative};
use chaty_runtime::BotRuntime;
use chaty_store::seed::FaqAdmin;
use chaty_store::{InMemoryStore, SqliteStore, seed_faqs};
use chrono::Duration;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn run(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config =
        chaty_config::AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if let Some(port) = port {
        config.gateway.port = port;
    }

    println!("{} — Starting bot runtime", config.bot_name);
    println!("   Store:   {}", config.store.backend);
    println!(
        "   Gateway: {}:{}",
        config.gateway.host, config.gateway.port
    );

    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)?;

    // Durable store
    let (directory, knowledge, faq_admin): (
        Arc<dyn UserDirectory>,
        Arc<dyn KnowledgeBase>,
        Arc<dyn FaqAdmin>,
    ) = match config.store.backend.as_str() {
        "in_memory" => {
            let store = Arc::new(InMemoryStore::new());
            (store.clone(), store.clone(), store)
        }
        _ => {
            let db_path = config.db_path();
            let store = Arc::new(SqliteStore::new(&db_path.to_string_lossy()).await?);
            info!(path = %db_path.display(), "SQLite store opened");
            (store.clone(), store.clone(), store)
        }
    };

    let seeded = seed_faqs(faq_admin.as_ref()).await?;
    if seeded > 0 {
        info!(seeded, "Default FAQs inserted");
    }

    // Generative fallback
    let generative: Arc<dyn Generative> = match &config.generative.api_key {
        Some(key) => Arc::new(GeminiProvider::new(
            &config.generative.api_url,
            &config.generative.model,
            key,
        )?),
        None => {
            warn!("No generative API key configured; FAQ misses will get the apology reply");
            Arc::new(NoopGenerative)
        }
    };

    // Pairing credential lifecycle
    let pairing = Arc::new(
        PairingManager::new(&data_dir, Duration::days(config.pairing.validity_days)).await?,
    );

    // Transport, resuming a prior session when a marker survives
    let session = pairing.session_marker().await?;
    if session.is_some() {
        info!("Found a saved session marker, skipping re-pairing");
    }
    let transport: Arc<dyn Transport> = Arc::new(WhatsAppTransport::new(WhatsAppConfig {
        auth_state_dir: data_dir.join("auth_state"),
        session,
    }));

    // Conversation engine
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let engine = Arc::new(ConversationEngine::new(
        sessions.clone(),
        directory,
        knowledge,
        generative,
    ));

    transport.initialize().await?;
    let events = transport.start().await?;

    let runtime = BotRuntime::new(transport, engine, pairing.clone(), sessions);
    let runtime_handle = tokio::spawn(async move {
        if let Err(e) = runtime.run(events).await {
            tracing::error!("Runtime stopped with error: {e}");
        }
    });

    // Start gateway (this blocks)
    chaty_gateway::start(&config.gateway, GatewayState { pairing }).await?;

    runtime_handle.abort();
    Ok(())
}
