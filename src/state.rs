// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::{AuthGate, CredentialIssuer, CredentialVerifier, IdentityResolver};
use crate::config::ServerConfig;
use crate::storage::{AccountStore, InMemoryAccountStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AccountStore>,
    pub gate: AuthGate,
    pub issuer: Arc<CredentialIssuer>,
}

impl AppState {
    /// Wire the gate and issuer from `config` around `store`.
    pub fn new(config: &ServerConfig, store: Arc<dyn AccountStore>) -> Self {
        let gate = AuthGate::new(
            CredentialVerifier::new(&config.secret),
            IdentityResolver::new(Arc::clone(&store)),
        )
        .with_reject_inactive(config.reject_inactive);

        Self {
            gate,
            issuer: Arc::new(CredentialIssuer::new(&config.secret, config.token_ttl)),
            store,
        }
    }

    /// In-memory state, for tests and ephemeral runs.
    pub fn in_memory(config: &ServerConfig) -> Self {
        Self::new(config, Arc::new(InMemoryAccountStore::new()))
    }
}

impl FromRef<AppState> for AuthGate {
    fn from_ref(state: &AppState) -> Self {
        state.gate.clone()
    }
}
