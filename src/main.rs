use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use portfolio_admin::app::app;
use portfolio_admin::config::config;
use portfolio_admin::middleware::RequestAccessToken;
use portfolio_admin::remote::{PgRecordStore, SupabaseAuth, SupabaseStorage};
use portfolio_admin::session::SessionProvider;
use portfolio_admin::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SUPABASE_URL, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config();
    tracing::info!("Starting portfolio admin in {:?} mode", config.environment);
    if portfolio_admin::is_development!() {
        tracing::debug!("Backend at {}", config.backend.url);
    }

    let records = Arc::new(
        PgRecordStore::connect(&config.database)
            .await
            .context("failed to connect to the record store")?,
    );
    let auth = Arc::new(SupabaseAuth::new(&config.backend, &config.security)?);
    let session = Arc::new(
        SessionProvider::new(auth).with_expiry_skew(config.security.token_expiry_skew_secs),
    );
    // uploads run as the user whose bearer token passed the guard
    let blobs = Arc::new(SupabaseStorage::new(&config.backend)?.with_token_source(Arc::new(RequestAccessToken)));

    // Callers authenticate per request; resolve so the guard stops reporting loading
    let resolving = session.clone();
    tokio::spawn(async move {
        resolving.init(None).await;
    });

    let state = AppState::new(session, records, blobs, config.storage.clone());
    let router = app(state, config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Portfolio admin listening on http://{}", bind_addr);
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
