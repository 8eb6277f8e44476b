// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.
//!
//! Each variant keeps its precise reason for logging, while the response
//! carries only the caller-facing code: the three verifier failures all
//! surface as `invalid_token`, and dependency faults never leak detail.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::verifier::VerifyError;

/// Rejection produced by the authentication or authorization gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No authorization header, or not of the form `Bearer <token>`
    MissingToken,
    /// Token cannot be parsed as a signed credential
    Malformed,
    /// Token does not verify against the signing secret
    SignatureInvalid,
    /// Token verified but is past its expiry
    Expired,
    /// Token subject names no account
    AccountNotFound,
    /// Account is deactivated (only when inactive accounts are rejected)
    AccountDisabled,
    /// Account role is outside the route's policy
    InsufficientRole,
    /// Account store fault while resolving the identity
    InternalFailure(String),
    /// Authorization ran without a prior authentication
    PreconditionViolated,
}

/// JSON body of every gate rejection.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthErrorBody {
    pub error: String,
    pub error_code: String,
}

impl AuthError {
    /// Caller-facing error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::Malformed | AuthError::SignatureInvalid | AuthError::Expired => {
                "invalid_token"
            }
            AuthError::AccountNotFound => "account_not_found",
            AuthError::AccountDisabled => "account_disabled",
            AuthError::InsufficientRole => "insufficient_role",
            AuthError::InternalFailure(_) | AuthError::PreconditionViolated => "internal_error",
        }
    }

    /// Precise reason, for logs only.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::Malformed => "malformed",
            AuthError::SignatureInvalid => "signature_invalid",
            AuthError::Expired => "expired",
            AuthError::AccountNotFound => "account_not_found",
            AuthError::AccountDisabled => "account_disabled",
            AuthError::InsufficientRole => "insufficient_role",
            AuthError::InternalFailure(_) => "internal_failure",
            AuthError::PreconditionViolated => "precondition_violated",
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InsufficientRole => StatusCode::UNAUTHORIZED,
            AuthError::Malformed
            | AuthError::SignatureInvalid
            | AuthError::Expired
            | AuthError::AccountDisabled => StatusCode::FORBIDDEN,
            AuthError::AccountNotFound => StatusCode::NOT_FOUND,
            AuthError::InternalFailure(_) | AuthError::PreconditionViolated => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to return to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Not authorized, no token",
            AuthError::Malformed | AuthError::SignatureInvalid | AuthError::Expired => {
                "Invalid token"
            }
            AuthError::AccountNotFound => "User not found",
            AuthError::AccountDisabled => "Account is disabled",
            AuthError::InsufficientRole => "Not authorized for this operation",
            AuthError::InternalFailure(_) | AuthError::PreconditionViolated => {
                "Internal server error"
            }
        }
    }
}

impl From<VerifyError> for AuthError {
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::Malformed => AuthError::Malformed,
            VerifyError::SignatureInvalid => AuthError::SignatureInvalid,
            VerifyError::Expired => AuthError::Expired,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Bearer token is missing"),
            AuthError::Malformed => write!(f, "Token is malformed"),
            AuthError::SignatureInvalid => write!(f, "Token signature is invalid"),
            AuthError::Expired => write!(f, "Token has expired"),
            AuthError::AccountNotFound => write!(f, "Token subject matches no account"),
            AuthError::AccountDisabled => write!(f, "Account is deactivated"),
            AuthError::InsufficientRole => write!(f, "Account role is not permitted"),
            AuthError::InternalFailure(msg) => write!(f, "Identity resolution failed: {msg}"),
            AuthError::PreconditionViolated => {
                write!(f, "Authorization invoked without an authenticated account")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.public_message().to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(error: AuthError) -> (StatusCode, AuthErrorBody) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_token_returns_401() {
        let (status, body) = body_of(AuthError::MissingToken).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error_code, "missing_token");
    }

    #[tokio::test]
    async fn verifier_failures_collapse_to_invalid_token() {
        for error in [AuthError::Malformed, AuthError::SignatureInvalid, AuthError::Expired] {
            let (status, body) = body_of(error).await;
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(body.error_code, "invalid_token");
            assert_eq!(body.error, "Invalid token");
        }
    }

    #[tokio::test]
    async fn account_not_found_returns_404() {
        let (status, body) = body_of(AuthError::AccountNotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error_code, "account_not_found");
    }

    #[tokio::test]
    async fn insufficient_role_returns_401() {
        let (status, body) = body_of(AuthError::InsufficientRole).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error_code, "insufficient_role");
    }

    #[tokio::test]
    async fn internal_failure_hides_detail() {
        let (status, body) =
            body_of(AuthError::InternalFailure("db at 10.0.0.5 refused".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error_code, "internal_error");
        assert!(!body.error.contains("10.0.0.5"));

        let (status, body) = body_of(AuthError::PreconditionViolated).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error_code, "internal_error");
    }

    #[test]
    fn reason_keeps_precise_kind() {
        assert_eq!(AuthError::from(VerifyError::Expired).reason(), "expired");
        assert_eq!(AuthError::from(VerifyError::Malformed).reason(), "malformed");
        assert_eq!(
            AuthError::from(VerifyError::SignatureInvalid).reason(),
            "signature_invalid"
        );
    }
}
