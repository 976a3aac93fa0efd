/*
 * Responsibility
 * - Config読み込み → tracing 初期化 → 依存生成 (DB pool, TokenCodec) → Router 組み立て
 * - Middleware の適用 (security headers / CORS / request-id, trace, limit, timeout)
 * - axum::serve() で起動
 */
use std::panic;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::{health, ready};
use crate::config::{Config, LogConfig};
use crate::db;
use crate::error::AppError;
use crate::middleware;
use crate::services::auth::build_token_codec;
use crate::state::AppState;

fn init_tracing(log: &LogConfig) {
    // RUST_LOG wins when set; otherwise LOG_LEVEL decides.
    // Ex:
    // RUST_LOG=info,flex_api=debug,tower_http=debug cargo run
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", log.level)));

    let registry = tracing_subscriber::registry().with(filter);

    if log.is_local() {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    }
}

// Handler panics are answered by CatchPanicLayer; the hook only makes sure
// every panic (including ones outside a request) reaches the log.
fn init_panic_hook() {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");
        default_hook(info);
    }))
}

pub async fn run() -> Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    init_tracing(&config.log);
    init_panic_hook();

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .await
        .context("http server terminated")?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = db::init_pool(&config.database)
        .await
        .context("failed to initialise postgres pool")?;

    let auth = build_token_codec(config).context("failed to build token codec")?;

    Ok(AppState::new(db, auth))
}

async fn not_found() -> AppError {
    AppError::NotFound
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .nest("/api/v1", api::v1::routes(state.auth.clone()))
        .fallback(not_found)
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}
