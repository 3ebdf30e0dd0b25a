//! Application entry point for the `weatherlog` backend service.
//!
//! This binary orchestrates the full startup sequence, including:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Selecting the record store (PostgreSQL pool, or in-memory when no
//!   `DATABASE_URL` is given) and creating the schema if needed
//! - Seeding the default admin account
//! - Starting the optional weather collector
//! - Mounting all API routes via the `routes` gateway (EMBP pattern)
//! - Binding the Axum HTTP server and serving until Ctrl-C / SIGTERM
//!
//! # Environment Variables
//! - `JWT_SECRET` (**required**) – token signing secret
//! - `DATABASE_URL` (optional) – PostgreSQL connection string
//! - `HTTP_PORT` (optional) – listen port (default: 3001)
//! - `AXUM_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `AXUM_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! See `config.rs` for the full list.
use std::{env, io::IsTerminal, net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use weatherlog::{
    auth::TokenKeys,
    collector, config, routes, schema,
    store::{MemoryStore, PgStore, UserStore, WeatherStore},
    AppState, Config,
};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let (weather_store, user_store) = open_stores(&cfg).await?;
    let state = AppState::new(
        weather_store,
        user_store,
        TokenKeys::new(&cfg.jwt_secret, cfg.jwt_ttl_secs),
    );

    state.users.ensure_default_admin(&cfg.admin).await?;

    if let Some(collector_cfg) = cfg.collector.clone() {
        collector::spawn(state.weather.clone(), collector_cfg);
    }

    // Build app from routes gateway (EMBP)
    let app: Router = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.http_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Connect to PostgreSQL when configured, otherwise fall back to the
/// volatile in-memory store.
async fn open_stores(cfg: &Config) -> Result<(Arc<dyn WeatherStore>, Arc<dyn UserStore>)> {
    // ---
    let Some(db_url) = cfg.db_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, using in-memory store (data is lost on restart)");
        let store = Arc::new(MemoryStore::new());
        let weather: Arc<dyn WeatherStore> = store.clone();
        let users: Arc<dyn UserStore> = store;
        return Ok((weather, users));
    };

    tracing::info!("Attempting to connect to database: {}", config::mask_db_url(db_url));

    let pool = PgPoolOptions::new()
        .max_connections(cfg.db_pool_max)
        .connect(db_url)
        .await
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to connect to database '{}': {}",
                config::mask_db_url(db_url),
                e
            )
        })?;

    tracing::info!("Successfully connected to database");

    schema::create_schema(&pool).await?;

    let store = Arc::new(PgStore::new(pool));
    let weather: Arc<dyn WeatherStore> = store.clone();
    let users: Arc<dyn UserStore> = store;
    Ok((weather, users))
}

async fn shutdown_signal() {
    // ---
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `AXUM_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by `RUST_LOG`, else the `AXUM_LOG_LEVEL` env var
///
/// Called once at startup, after `.env` is loaded and before any logging.
fn init_tracing() {
    // ---
    let span_events = match env::var("AXUM_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("AXUM_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},sqlx::query=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
