use std::{sync::Arc, time::Duration};

use sqlx::postgres::PgPoolOptions;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sabiflow_backend::{api, config::Config, repository::PgUserRepository, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (dev convenience)
    let _ = dotenvy::dotenv();

    let cfg = Config::from_env()?;

    init_tracing(&cfg);

    // Database pool
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Database connected and migrations applied");

    if cfg.google.is_none() {
        tracing::warn!("Google OAuth credentials not set; Google sign-in is disabled");
    }

    let state = AppState::new(&cfg, Arc::new(PgUserRepository::new(pool)));

    let app = api::router(state)
        .layer(api::cors_layer(&cfg.cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!(env = %cfg.app_env, "Listening on {}", cfg.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Human-readable logs in development, JSON lines everywhere else.
fn init_tracing(cfg: &Config) {
    let default_level = if cfg.is_development() { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());

    let registry = tracing_subscriber::registry().with(filter);
    if cfg.is_development() {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    }
}
