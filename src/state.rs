// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::auth::{CredentialVerifier, TokenService};
use crate::config::ServerConfig;
use crate::notify::{LogSender, NotificationSender};
use crate::reset::ResetCodeStore;
use crate::store::InMemoryStore;

/// Shared application state.
///
/// The store's `RwLock` is the transaction boundary for appointment
/// mutations; everything else here is read-only after construction.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<InMemoryStore>>,
    pub tokens: Arc<TokenService>,
    pub verifier: Arc<CredentialVerifier>,
    pub reset_codes: Arc<ResetCodeStore>,
    pub notifier: Arc<dyn NotificationSender>,
}

impl AppState {
    pub fn new(store: InMemoryStore, config: &ServerConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            tokens: Arc::new(TokenService::new(&config.token_secret, config.token_ttl_secs)),
            verifier: Arc::new(CredentialVerifier::new()),
            reset_codes: Arc::new(ResetCodeStore::new(Duration::from_secs(
                config.reset_code_ttl_secs,
            ))),
            notifier: Arc::new(LogSender),
        }
    }

    /// Swap the notification sender (tests inject a recording or failing one).
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSender>) -> Self {
        self.notifier = notifier;
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        let config = ServerConfig {
            token_secret: "insecure-default-secret".to_string(),
            token_ttl_secs: crate::config::DEFAULT_TOKEN_TTL_SECS,
            reset_code_ttl_secs: crate::config::DEFAULT_RESET_CODE_TTL_SECS,
        };
        Self::new(InMemoryStore::new(), &config)
    }
}
