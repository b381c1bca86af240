/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (ルール表, 検証器, upstream client) → Router 組み立て
 * - layer の順序 (外側から): http, cors, security headers, gatekeeper
 * - axum::serve()
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::access::RuleTable;
use crate::services::gatekeeper::{Gatekeeper, PIPELINE};
use crate::services::identity::build_verifier;
use crate::services::upstream::UpstreamClient;
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,challenge_gateway=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics via tracing; stderr can be hidden depending on how the process is launched.
        tracing::error!(?info, "panic");

        // Development: crash the whole process so it gets noticed immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("loading configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting gateway in {:?} mode on {} -> {}",
        config.app_env,
        config.addr,
        config.upstream_url
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

fn build_state(config: &Config) -> Result<AppState> {
    // Malformed patterns fail here, at startup, never per request.
    let rules = RuleTable::default_gateway().context("building route rules")?;
    for (order, rule) in rules.rules().enumerate() {
        tracing::debug!(
            order,
            pattern = rule.pattern(),
            methods = ?rule.methods(),
            requirement = ?rule.requirement(),
            "route rule"
        );
    }
    tracing::debug!(
        stages = ?PIPELINE.map(|stage| stage.name()),
        "gatekeeper pipeline"
    );

    let verifier = build_verifier(config).context("building access token verifier")?;
    let gatekeeper = Gatekeeper::new(Arc::new(rules), verifier);

    let upstream = UpstreamClient::new(
        &config.upstream_url,
        Duration::from_secs(config.upstream_timeout_seconds),
    )
    .context("building upstream client")?;

    Ok(AppState::new(gatekeeper, Arc::new(upstream)))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = middleware::gatekeeper::apply(api::routes(), state.gatekeeper.clone());
    let router = router.with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(
        router,
        Duration::from_secs(config.upstream_timeout_seconds),
    )
}
