use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::{routing::get, Router};
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Sqlite};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod error;
mod repository;
mod routes;
mod state;
mod types;

use error::AppError;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging (stdout + tägliche Datei-Rotation unter ./logs)
    std::fs::create_dir_all("logs").ok();
    let (stdout_nb, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let file_appender = tracing_appender::rolling::daily("logs", "leseliste.log");
    let (file_nb, file_guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(stdout_nb))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_nb))
        .init();
    // Guards am Leben halten (nicht fallen lassen), damit Non-Blocking Writer korrekt flushen
    let _log_guards = (stdout_guard, file_guard);

    // Load configuration (embedded defaults -> leseliste.toml -> env/.env)
    let app_cfg = config::load()?;

    // Prepare data dir and database file
    let db_url = &app_cfg.database.url;
    config::ensure_sqlite_parent_dir(db_url)?;
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        info!("Creating SQLite database at {}", db_url);
        Sqlite::create_database(db_url).await?;
    }

    // Bounded pool: max_connections caps concurrent statements, waiters time
    // out after acquire_timeout_ms
    let pool = SqlitePoolOptions::new()
        .max_connections(app_cfg.database.max_connections)
        .acquire_timeout(Duration::from_millis(app_cfg.database.acquire_timeout_ms))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                let _ = sqlx::query("PRAGMA foreign_keys=ON;").execute(&mut *conn).await;
                let _ = sqlx::query("PRAGMA busy_timeout=10000;").execute(&mut *conn).await;
                Ok(())
            })
        })
        .connect(db_url)
        .await?;

    // Initialize DB schema
    db::init_db(&pool).await?;

    // App state: pool and repository built here, injected everywhere else
    let state = AppState::new(pool, app_cfg.clone());

    let cors = build_cors_layer(&app_cfg.cors)?;

    let app = Router::new()
        .route("/healthz", get(routes::health::healthz))
        .route("/readyz", get(routes::health::readyz))
        .route("/version", get(routes::health::version))
        .merge(routes::api_router())
        .fallback(not_found)
        .with_state(state)
        // Globales Body-Limit (1 MB) – schützt vor übergroßen Requests
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Server listen addr (from config)
    let port: u16 = app_cfg.server.port;
    let host: String = app_cfg.server.host.clone();
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid listen addr {}:{} - {}", host, port, e))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Leseliste listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn not_found() -> AppError {
    AppError::NotFound("The resource you are looking for is not found".to_string())
}

fn build_cors_layer(cfg: &config::CorsConfig) -> anyhow::Result<CorsLayer> {
    let mut cors = CorsLayer::new();

    cors = if cfg.origin.trim() == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origin: HeaderValue = cfg
            .origin
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid cors.origin {:?} - {}", cfg.origin, e))?;
        cors.allow_origin(origin)
    };

    let methods = cfg
        .methods
        .split(',')
        .map(|m| m.trim().parse::<Method>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow::anyhow!("invalid cors.methods {:?} - {}", cfg.methods, e))?;
    cors = cors.allow_methods(methods);

    let headers = parse_header_names(&cfg.headers)
        .map_err(|e| anyhow::anyhow!("invalid cors.headers {:?} - {}", cfg.headers, e))?;
    cors = cors.allow_headers(headers);

    let expose = parse_header_names(&cfg.expose_headers)
        .map_err(|e| anyhow::anyhow!("invalid cors.expose_headers {:?} - {}", cfg.expose_headers, e))?;
    cors = cors.expose_headers(expose);

    Ok(cors)
}

fn parse_header_names(list: &str) -> Result<Vec<HeaderName>, axum::http::header::InvalidHeaderName> {
    list.split(',')
        .map(|h| h.trim())
        .filter(|h| !h.is_empty())
        .map(|h| h.parse::<HeaderName>())
        .collect()
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received. Stopping server...");
}
