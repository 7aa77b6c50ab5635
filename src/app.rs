/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (request-id / trace / session context)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::{Router, middleware, routing::get};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::idp::{self, MockIdp};
use crate::middleware::auth_context;
use crate::services::mailer::{LogMailer, Mailer, ResendMailer};
use crate::services::object_store::MemoryObjectStore;
use crate::services::token_codec::TokenCodec;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,jwt_experience=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get "lost"
        // (stderr can be hidden depending on how the process is launched.)
        tracing::error!(?info, "panic");

        // In development, fail fast: crash the whole process so we notice
        // immediately. In production, prefer the default behavior (stderr)
        // and let the server keep running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    let abort_on_panic = !config.app_env.is_production();
    init_panic_hook(abort_on_panic);

    tracing::info!(
        "starting jwt-experience in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let addr = config.addr;
    let state = build_state(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build process-level services and inject them into the shared state.
/// Infallible after startup: RSA key generation and codec construction
/// happen exactly once, here.
pub fn build_state(config: Config) -> Result<AppState> {
    let codec = TokenCodec::new(
        &config.session_secret,
        config.session_algorithm,
        config.enforce_expiry,
    )?;

    let idp = MockIdp::new(config.idp_audience.clone())?;

    let http = reqwest::Client::new();

    let mailer: Arc<dyn Mailer> = match &config.resend_api_key {
        Some(key) => Arc::new(ResendMailer::new(
            http.clone(),
            key.clone(),
            config.mail_from.clone(),
        )),
        None => Arc::new(LogMailer),
    };

    let store = Arc::new(MemoryObjectStore::new(config.storage_base_url.clone()));

    Ok(AppState {
        config: Arc::new(config),
        codec,
        idp,
        mailer,
        store,
        http,
    })
}

pub fn build_router(state: AppState) -> Router {
    async fn health() -> &'static str {
        "ok"
    }

    Router::new()
        .route("/health", get(health))
        .merge(api::routes::routes())
        .nest("/idp", idp::routes())
        // Session decoding runs on every request, inside tracing so failures
        // land in the request span.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_context::attach,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
