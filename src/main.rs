// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gym check-in API server.

use gym_checkin::{
    config::{Config, IdentityMode},
    db::FirestoreDb,
    services::{IdentityResolver, TestHeaderIdentity, WhopIdentity},
    AppState,
};
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        environment = ?config.environment,
        identity_mode = ?config.identity_mode,
        "Starting gym check-in API"
    );

    let db = FirestoreDb::new(&config.gcp_project_id).await?;

    let identity: Arc<dyn IdentityResolver> = match config.identity_mode {
        IdentityMode::Whop => {
            let whop = config
                .whop
                .as_ref()
                .ok_or("Whop identity mode requires WHOP_* settings")?;
            Arc::new(WhopIdentity::new(whop)?)
        }
        IdentityMode::TestHeader => {
            tracing::warn!("Trusting x-test-user-id header for caller identity");
            Arc::new(TestHeaderIdentity)
        }
    };

    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        identity,
    });

    let app = gym_checkin::routes::create_router(state.clone());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Last reference to the Firestore client goes away here.
    drop(state);
    tracing::info!("Server stopped");
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gym_checkin=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}

/// Resolve on Ctrl+C or SIGTERM (Cloud Run sends the latter).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
}
