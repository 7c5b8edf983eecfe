//! Referral Engine service entry point
//!
//! Startup order: config -> logging -> Postgres pool -> schema -> progression
//! consumer -> HTTP gateway. The progression trigger runs on its own task,
//! fed through the event channel by whatever transport adapter is deployed
//! (or the mock-api endpoint in dev builds).

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;

use referral_engine::config::AppConfig;
use referral_engine::db::Database;
use referral_engine::gateway::{self, AppState};
use referral_engine::logging::init_logging;
use referral_engine::progression::ProgressionTrigger;
use referral_engine::referral::{ReferralService, ReferralStore, schema};

/// Buffered lifecycle events awaiting the progression trigger
const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("REFERRAL_ENV").unwrap_or_else(|_| "dev".to_string());
    let config = AppConfig::load(&env);
    let _log_guard = init_logging(&config);

    tracing::info!(
        env = %env,
        version = env!("CARGO_PKG_VERSION"),
        rev = env!("REFERRAL_BUILD_REV"),
        "Starting referral engine"
    );

    let db = Arc::new(
        Database::connect(&config.postgres_url)
            .await
            .context("Failed to connect to PostgreSQL")?,
    );
    schema::init_schema(db.pool())
        .await
        .context("Failed to initialize referral schema")?;

    let store = Arc::new(ReferralStore::new(db.pool().clone()));
    let service = Arc::new(ReferralService::new(store.clone(), config.referral.clone()));

    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let trigger = ProgressionTrigger::new(store);
    tokio::spawn(async move {
        trigger.run(event_rx).await;
    });

    let state = Arc::new(AppState {
        db,
        referral: service,
        events: event_tx,
    });

    gateway::serve(state, &config.gateway.host, config.gateway.port).await
}
