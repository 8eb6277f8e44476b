// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the authenticated account.
//!
//! ```rust,ignore
//! async fn my_handler(Auth(identity): Auth) -> impl IntoResponse {
//!     // identity is AuthenticatedAccount
//! }
//! ```

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use super::middleware::{log_rejection, AuthGate};
use super::{AuthError, AuthenticatedAccount};

/// Extractor for the account attached by the authentication gate.
///
/// Behind [`require_auth`](super::middleware::require_auth) this only reads
/// the request extensions. On a route without the middleware it runs the
/// gate itself, so a handler taking `Auth` is never reachable anonymously.
pub struct Auth(pub AuthenticatedAccount);

impl<S> FromRequestParts<S> for Auth
where
    AuthGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<AuthenticatedAccount>().cloned() {
            return Ok(Auth(identity));
        }

        let gate = AuthGate::from_ref(state);
        match gate.authenticate(&parts.headers).await {
            Ok(identity) => {
                parts.extensions.insert(identity.clone());
                Ok(Auth(identity))
            }
            Err(e) => {
                log_rejection(&e, parts.uri.path());
                Err(e)
            }
        }
    }
}
