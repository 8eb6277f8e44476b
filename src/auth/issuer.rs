// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential issuing for the login flow.

use std::time::Duration;

use jsonwebtoken::{encode, EncodingKey, Header};

use super::claims::Claims;
use super::verifier::CREDENTIAL_ALGORITHM;
use super::SigningSecret;

/// Signing failure.
#[derive(Debug, thiserror::Error)]
#[error("credential signing failed: {0}")]
pub struct IssueError(String);

/// Signs credentials with the process-wide secret.
#[derive(Clone)]
pub struct CredentialIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl CredentialIssuer {
    /// Create an issuer bound to `secret` producing credentials valid for `ttl`.
    pub fn new(secret: &SigningSecret, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.expose()),
            ttl,
        }
    }

    /// Lifetime of issued credentials.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a credential for `account_id` starting at `now` (Unix seconds).
    pub fn issue_at(&self, account_id: &str, now: i64) -> Result<(String, Claims), IssueError> {
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims::new(account_id, now, ttl);

        let token = encode(&Header::new(CREDENTIAL_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| IssueError(e.to_string()))?;

        Ok((token, claims))
    }

    /// Issue a credential for `account_id` starting now.
    pub fn issue(&self, account_id: &str) -> Result<(String, Claims), IssueError> {
        self.issue_at(account_id, chrono::Utc::now().timestamp())
    }
}

impl std::fmt::Debug for CredentialIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
