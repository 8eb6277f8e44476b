// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential claims and the authenticated account representation.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::roles::{Role, RolePolicy};
use crate::models::Account;

/// Claims carried by a signed bearer credential.
///
/// Wire names follow the issued token format: the subject travels as `id`,
/// the validity window as the registered `iat` / `exp` claims (Unix seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Id of the account the credential was issued for
    #[serde(rename = "id")]
    pub subject_id: String,

    /// Issued at timestamp
    #[serde(rename = "iat")]
    pub issued_at: i64,

    /// Expiration timestamp
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl Claims {
    /// Claims for `subject_id` valid from `issued_at` for `ttl_secs`.
    pub fn new(subject_id: impl Into<String>, issued_at: i64, ttl_secs: i64) -> Self {
        Self {
            subject_id: subject_id.into(),
            issued_at,
            expires_at: issued_at.saturating_add(ttl_secs),
        }
    }

    /// Whether the credential is past its expiry at `now` (Unix seconds).
    ///
    /// A credential is still valid at exactly `expires_at`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.expires_at
    }

    /// Expiry as a UTC timestamp, if representable.
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.expires_at, 0).single()
    }
}

/// The account bound to a single request after authentication.
///
/// Produced only by the authentication gate and threaded through the rest
/// of that request's pipeline. It is immutable and never outlives the
/// request; the next request resolves the account again.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    account: Arc<Account>,
    claims: Claims,
}

impl AuthenticatedAccount {
    pub(crate) fn new(account: Account, claims: Claims) -> Self {
        Self {
            account: Arc::new(account),
            claims,
        }
    }

    /// The account as resolved for this request.
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Claims of the credential that authenticated this request.
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Account id.
    pub fn account_id(&self) -> &str {
        &self.account.id
    }

    /// Role at the moment of resolution.
    pub fn role(&self) -> Role {
        self.account.role
    }

    /// Whether the account's role is admitted by `policy`.
    ///
    /// Only `role` is consulted; the legacy `is_admin` flag never grants or
    /// denies access.
    pub fn satisfies(&self, policy: &RolePolicy) -> bool {
        policy.allows(self.account.role)
    }

    /// Whether this account may modify or delete `target`.
    pub fn can_manage(&self, target: &Account) -> bool {
        self.account.role.can_manage(target.role)
    }
}
