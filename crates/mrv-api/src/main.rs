//! # mrv-api Binary Entry Point
//!
//! Starts the Axum HTTP server for the usage and credential API.
//! Binds to a configurable port (default 8080) and shuts down gracefully
//! on SIGINT or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use mrv_anchor_client::{AnchorConfig, AnchorSigner};
use mrv_api::config::ApiConfig;
use mrv_api::middleware::metrics::ApiMetrics;
use mrv_api::state::{AppState, UsageTable};
use mrv_crypto::FsKeyStore;
use mrv_vc::{CredentialIssuer, IssuerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ApiConfig::from_env().context("configuration failed")?;

    // Database pool is optional; absent means in-memory only.
    let pool = mrv_api::db::init_pool()
        .await
        .context("database initialization failed")?;

    let keystore = Arc::new(FsKeyStore::new(&config.keys_dir));
    tracing::info!(keys_dir = %config.keys_dir.display(), "key store ready");

    let mut issuer = CredentialIssuer::new(
        IssuerConfig::with_did(config.issuer_did.clone()),
        keystore,
    );
    if let Some(anchor_url) = &config.anchor_url {
        let anchor_config =
            AnchorConfig::new(anchor_url.clone()).with_timeout(config.anchor_timeout_secs);
        let anchor = AnchorSigner::new(&anchor_config).context("anchor client failed")?;
        tracing::info!(url = %anchor_url, "anchor signing enabled");
        issuer = issuer.with_anchor(anchor);
    } else {
        tracing::info!("signing locally from the key store");
    }

    let port = config.port;
    let state = AppState {
        config: Arc::new(config),
        issuer: Arc::new(issuer),
        usage: UsageTable::new(),
        pool,
        metrics: ApiMetrics::new(),
    };

    let app = mrv_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("MRV API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

/// Resolve when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("ctrl-c handler can be installed");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler can be installed")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
