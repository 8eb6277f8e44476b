// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization middleware for Axum.
//!
//! ## Request Flow
//!
//! ```text
//! Authorization header ──► bearer token ──► verify ──► resolve ──► attach
//!        │                      │              │           │
//!        └── MissingToken ──────┘   InvalidToken   AccountNotFound / InternalFailure
//! ```
//!
//! [`require_auth`] runs the gate and inserts the [`AuthenticatedAccount`]
//! into the request extensions. [`require_role`] must be layered inside it
//! and only reads what the gate attached.
//!
//! ```rust,ignore
//! let admin_routes = Router::new()
//!     .route("/api/users", get(list_accounts))
//!     .route_layer(from_fn_with_state(RolePolicy::ANY_ADMIN, require_role))
//!     .route_layer(from_fn_with_state(gate, require_auth));
//! ```
//!
//! If the request is dropped while the account lookup is pending, the
//! pipeline is abandoned: nothing has been attached and nothing written.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::claims::AuthenticatedAccount;
use super::resolver::{IdentityResolver, ResolveError};
use super::roles::RolePolicy;
use super::verifier::CredentialVerifier;
use super::AuthError;

/// The authentication gate: verifier plus resolver.
#[derive(Clone, Debug)]
pub struct AuthGate {
    verifier: Arc<CredentialVerifier>,
    resolver: IdentityResolver,
    reject_inactive: bool,
}

impl AuthGate {
    pub fn new(verifier: CredentialVerifier, resolver: IdentityResolver) -> Self {
        Self {
            verifier: Arc::new(verifier),
            resolver,
            reject_inactive: false,
        }
    }

    /// Refuse accounts whose `is_active` flag is cleared.
    pub fn with_reject_inactive(mut self, reject: bool) -> Self {
        self.reject_inactive = reject;
        self
    }

    pub fn rejects_inactive(&self) -> bool {
        self.reject_inactive
    }

    /// Run the gate against the current clock.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthenticatedAccount, AuthError> {
        self.authenticate_at(headers, chrono::Utc::now().timestamp())
            .await
    }

    /// Run the gate with `now` as the expiry reference (Unix seconds).
    pub async fn authenticate_at(
        &self,
        headers: &HeaderMap,
        now: i64,
    ) -> Result<AuthenticatedAccount, AuthError> {
        let token = bearer_token(headers)?;

        let claims = self.verifier.verify(token, now)?;

        let account = match self.resolver.resolve(&claims.subject_id).await {
            Ok(account) => account,
            Err(ResolveError::NotFound) => return Err(AuthError::AccountNotFound),
            Err(ResolveError::Store(e)) => return Err(AuthError::InternalFailure(e.to_string())),
        };

        if self.reject_inactive && !account.is_active {
            return Err(AuthError::AccountDisabled);
        }

        Ok(AuthenticatedAccount::new(account, claims))
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// Exactly one space separates scheme and token. Anything else, including
/// an empty token or any surrounding or embedded whitespace, counts as no
/// token at all.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MissingToken)?;

    let token = value.strip_prefix("Bearer ").ok_or(AuthError::MissingToken)?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Log a rejection with its precise reason. The response only carries the
/// collapsed caller code.
pub(crate) fn log_rejection(error: &AuthError, path: &str) {
    match error {
        AuthError::InternalFailure(detail) => {
            tracing::error!(reason = error.reason(), %path, error = %detail, "Authentication failed");
        }
        AuthError::PreconditionViolated => {
            tracing::error!(reason = error.reason(), %path, "Authorization wired without authentication");
        }
        _ => {
            tracing::warn!(reason = error.reason(), %path, "Request rejected");
        }
    }
}

/// Authentication middleware.
///
/// On success the request continues with an [`AuthenticatedAccount`] in its
/// extensions; on failure it ends here with the mapped response.
pub async fn require_auth(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Response {
    let outcome = gate.authenticate(request.headers()).await;
    match outcome {
        Ok(identity) => {
            tracing::debug!(
                account_id = %identity.account_id(),
                role = %identity.role(),
                "Request authenticated"
            );
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            log_rejection(&e, request.uri().path());
            e.into_response()
        }
    }
}

/// Decide whether `identity` may pass `policy`.
///
/// A missing identity means the route was wired without [`require_auth`];
/// that is asserted in debug builds and reported as a server error.
pub fn authorize(
    identity: Option<&AuthenticatedAccount>,
    policy: &RolePolicy,
) -> Result<(), AuthError> {
    let Some(identity) = identity else {
        debug_assert!(false, "authorization ran before authentication");
        return Err(AuthError::PreconditionViolated);
    };

    if identity.satisfies(policy) {
        Ok(())
    } else {
        Err(AuthError::InsufficientRole)
    }
}

/// Authorization middleware parameterized by the route's [`RolePolicy`].
pub async fn require_role(
    State(policy): State<RolePolicy>,
    request: Request,
    next: Next,
) -> Response {
    let identity = request.extensions().get::<AuthenticatedAccount>();

    match authorize(identity, &policy) {
        Ok(()) => next.run(request).await,
        Err(e) => {
            if let Some(identity) = identity {
                tracing::warn!(
                    account_id = %identity.account_id(),
                    role = %identity.role(),
                    required = %policy,
                    "Role not permitted"
                );
            }
            log_rejection(&e, request.uri().path());
            e.into_response()
        }
    }
}
