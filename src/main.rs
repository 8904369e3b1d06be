// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use dimension_market_server::{
    api::router,
    config::{AppConfig, LOG_FORMAT_ENV},
    nonce_sweeper::NonceSweeper,
    oracle::{MoralisClient, NetWorthOracle},
    state::AppState,
    storage::MarketDb,
};

const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

fn init_logging() {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true))
            .init();
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

fn build_oracle(config: &AppConfig) -> Option<Arc<dyn NetWorthOracle>> {
    let Some(oracle_config) = &config.oracle else {
        warn!("MORALIS_API_KEY not set; net-worth lookups disabled");
        return None;
    };
    match MoralisClient::from_config(oracle_config) {
        Ok(client) => {
            info!(
                base_url = %oracle_config.base_url,
                timeout_secs = oracle_config.timeout.as_secs(),
                "Net-worth oracle enabled"
            );
            let oracle: Arc<dyn NetWorthOracle> = Arc::new(client);
            Some(oracle)
        }
        Err(e) => {
            warn!(error = %e, "Net-worth oracle misconfigured; lookups disabled");
            None
        }
    }
}

#[tokio::main]
async fn main() {
    init_logging();

    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = AppConfig::from_env();

    let db_path = config.database_path();
    let db = Arc::new(MarketDb::open(&db_path).expect("Failed to open database"));
    info!(path = %db_path.display(), "Database opened");

    let state = AppState::new(db.clone(), build_oracle(&config), config.nonce_ttl);
    let app = router(state);

    let shutdown = CancellationToken::new();
    let sweeper = NonceSweeper::new(db, config.nonce_ttl, config.nonce_sweep_interval);
    let sweeper_handle = tokio::spawn(sweeper.run(shutdown.clone()));

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown.cancel();
        });
    }

    let addr = config.bind_addr;
    match &config.tls {
        Some(tls) => {
            let tls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
                .await
                .expect("Failed to load TLS certificate and key");

            info!("Dimension Market server listening on https://{addr} (docs at /docs)");
            let server = axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service());
            tokio::select! {
                result = server => result.expect("HTTPS server failed"),
                () = shutdown.cancelled() => {},
            }
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .expect("Failed to bind listener");

            info!("Dimension Market server listening on http://{addr} (docs at /docs)");
            let signal = shutdown.clone();
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { signal.cancelled().await })
                .await
                .expect("HTTP server failed");
        }
    }

    shutdown.cancel();
    if let Err(e) = sweeper_handle.await {
        warn!(error = %e, "Nonce sweeper task failed");
    }
    info!("Server stopped");
}
