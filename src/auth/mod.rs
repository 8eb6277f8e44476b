// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-credential authentication and role-based authorization for the
//! back-office API.
//!
//! ## Auth Flow
//!
//! 1. `POST /api/users/login` re-verifies the Argon2 password hash and
//!    issues an HS256 credential carrying `{ id, iat, exp }`
//! 2. Callers send `Authorization: Bearer <credential>`
//! 3. The gate:
//!    - verifies the signature against the process-wide secret, then expiry
//!    - resolves `id` to the current account with a fresh store lookup
//!    - attaches the account to the request
//! 4. Route-level policies admit or refuse the attached account's role
//!
//! ## Security
//!
//! - The signing secret is injected at construction; request code never
//!   reads the environment
//! - No clock-skew leeway: a credential is dead the second after `exp`
//! - Identity is never cached across requests

pub mod claims;
pub mod error;
pub mod extractor;
pub mod issuer;
pub mod middleware;
pub mod password;
pub mod resolver;
pub mod roles;
pub mod secret;
pub mod verifier;

pub use claims::{AuthenticatedAccount, Claims};
pub use error::{AuthError, AuthErrorBody};
pub use extractor::Auth;
pub use issuer::{CredentialIssuer, IssueError};
pub use middleware::{authorize, require_auth, require_role, AuthGate};
pub use resolver::{IdentityResolver, ResolveError};
pub use roles::{Role, RolePolicy};
pub use secret::SigningSecret;
pub use verifier::{CredentialVerifier, VerifyError};
