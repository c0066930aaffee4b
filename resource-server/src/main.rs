/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! Resource server entry point.
//!
//! Discovery failure is fatal: the process exits before binding its listener.

use std::sync::Arc;

use anyhow::Context;
use resource_server::config::Config;
use resource_server::error::StartupError;
use resource_server::oidc::ProviderBinding;
use resource_server::routes;
use resource_server::state::AppState;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()
        .map_err(StartupError::Config)
        .context("failed to load configuration")?;

    let binding = match ProviderBinding::discover(&config).await {
        Ok(binding) => Arc::new(binding),
        Err(e) => {
            tracing::error!(provider = %config.provider_url, "Provider discovery failed: {e}");
            return Err(e).context("cannot start without an identity provider");
        }
    };

    let state = AppState::new(binding, &config);
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(StartupError::Bind)
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    tracing::info!("Listening on http://{}/", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down");
}
