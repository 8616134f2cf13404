use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod routes;
mod session;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mabot_server=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let db = mabot_storage::create_db(&config.database_url)
        .await
        .context("failed to open database")?;

    let engine = mabot_ai::ChatEngine::new(mabot_ai::GeminiModel::new(
        mabot_ai::GeminiConfig::new(config.gemini_api_key.clone()),
    )?);

    let auth = mabot_sheets::ServiceAccountAuth::from_key_file(&config.service_account_path)
        .context("failed to load Google service account key")?;
    let sheets = mabot_sheets::SheetsClient::new(Arc::new(auth), config.sheet_name.clone())?;

    let state = AppState {
        db,
        engine: Arc::new(engine),
        sheets: Arc::new(sheets),
        config: Arc::new(config),
    };

    // ── Session sweeper ───────────────────────────────────────────────────────
    let db_for_sweeper = state.db.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(3600));
        loop {
            tick.tick().await;
            match mabot_storage::cleanup_expired_sessions(&db_for_sweeper).await {
                Ok(n) if n > 0 => tracing::info!(removed = n, "expired sessions purged"),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "session cleanup failed"),
            }
        }
    });

    let addr = state.config.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on {addr}");

    axum::serve(listener, routes::router(state)).await?;
    Ok(())
}
