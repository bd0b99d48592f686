// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

use std::{env, net::SocketAddr};

use medibook_server::{
    api::router,
    auth::{CredentialVerifier, Role},
    config::ServerConfig,
    state::AppState,
    store::InMemoryStore,
};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("Configuration error: {message}");
            std::process::exit(1);
        }
    };

    let mut store = InMemoryStore::new();
    seed_admin(&mut store);

    let state = AppState::new(store, &config);
    let app = router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");

    tracing::info!("Medibook server listening on http://{addr} (docs at /docs)");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    if env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Seed the admin principal from the environment, if configured.
fn seed_admin(store: &mut InMemoryStore) {
    let (Ok(email), Ok(password)) = (env::var("SEED_ADMIN_EMAIL"), env::var("SEED_ADMIN_PASSWORD"))
    else {
        return;
    };

    let verifier = CredentialVerifier::new();
    let hash = match verifier.hash(&password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::warn!(error = %e, "could not hash seed admin password");
            return;
        }
    };

    match store.insert_user(email, "Administrator", Role::Admin, hash, None) {
        Ok(user) => tracing::info!(email = %user.email, "seeded admin account"),
        Err(e) => tracing::warn!(error = %e.message, "could not seed admin account"),
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
