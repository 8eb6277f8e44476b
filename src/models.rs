// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Account Model and API Data Models
//!
//! [`Account`] is the persisted shape of a back-office operator. It is the
//! only type that ever holds a password hash; every response goes through
//! [`PublicAccount`] instead.
//!
//! ## Invariants
//!
//! - The password is derived (salted Argon2id) before the record exists.
//! - `email` is stored normalized (trimmed, NFKC, lowercase) so uniqueness
//!   is decided on a canonical form.
//! - `role` is always one of the [`Role`] values; registration without a
//!   role yields the least privileged one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::password::{self, PasswordError};
use crate::auth::Role;

// =============================================================================
// Account
// =============================================================================

/// Validation failure while building or mutating an [`Account`].
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("email address is invalid")]
    InvalidEmail,
    #[error("password must not be empty")]
    EmptyPassword,
    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// A persisted back-office account.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Opaque unique identifier, immutable after creation.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Normalized, unique email address.
    pub email: String,
    /// Argon2id PHC string. Never serialized to a response.
    pub password_hash: String,
    /// Privilege tier used for authorization.
    #[serde(default)]
    pub role: Role,
    /// Whether the account is enabled.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Legacy privilege marker, independent of `role`.
    #[serde(default)]
    pub is_admin: bool,
    /// Postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// Input for [`Account::new`].
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

impl Account {
    /// Build a new account, deriving the password hash first.
    pub fn new(input: NewAccount) -> Result<Self, AccountError> {
        if input.password.is_empty() {
            return Err(AccountError::EmptyPassword);
        }
        let password_hash = password::hash_password(&input.password)?;

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AccountError::EmptyName);
        }
        let email = normalize_email(&input.email).ok_or(AccountError::InvalidEmail)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
            role: input.role.unwrap_or_default(),
            is_active: true,
            is_admin: false,
            address: input.address,
            phone_number: input.phone_number,
            created_at: now,
            updated_at: now,
        })
    }

    /// Re-run the stored derivation against `password`.
    ///
    /// A stored hash that cannot be parsed never verifies.
    pub fn verify_password(&self, password: &str) -> bool {
        match password::verify_password(password, &self.password_hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::error!(account_id = %self.id, error = %e, "Stored password hash is unusable");
                false
            }
        }
    }

    /// Apply a prepared update. Fields left as `None` are unchanged.
    pub fn apply(&mut self, update: AccountUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(password_hash) = update.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(is_admin) = update.is_admin {
            self.is_admin = is_admin;
        }
        if let Some(address) = update.address {
            self.address = Some(address);
        }
        if let Some(phone_number) = update.phone_number {
            self.phone_number = Some(phone_number);
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        self.touch();
    }

    /// Change the role.
    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.touch();
    }

    /// Record a mutation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Response-safe view of this account.
    pub fn to_public(&self) -> PublicAccount {
        PublicAccount::from(self)
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("is_active", &self.is_active)
            .field("is_admin", &self.is_admin)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

/// Canonical form of an email address, or `None` if it is not one.
///
/// Trims, applies NFKC and lowercases, then requires exactly one `@` with a
/// non-empty local part and a dotted domain, and no whitespace.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email: String = raw.trim().nfkc().collect::<String>().to_lowercase();

    if email.chars().any(char::is_whitespace) {
        return None;
    }
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.contains('@') {
        return None;
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return None;
    }
    Some(email)
}

/// Validated partial update of an [`Account`].
///
/// Built with [`AccountUpdate::prepare`] or [`AccountUpdate::role`], so the
/// email is already normalized and any new password already derived. The
/// store applies it to the current record under its write path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountUpdate {
    name: Option<String>,
    email: Option<String>,
    password_hash: Option<String>,
    is_active: Option<bool>,
    is_admin: Option<bool>,
    address: Option<String>,
    phone_number: Option<String>,
    role: Option<Role>,
}

impl AccountUpdate {
    /// Validate a profile update and derive its password hash.
    ///
    /// CPU-bound when a password is present.
    pub fn prepare(request: UpdateAccountRequest) -> Result<Self, AccountError> {
        let name = match request.name {
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(AccountError::EmptyName);
                }
                Some(name)
            }
            None => None,
        };
        let email = match request.email {
            Some(email) => Some(normalize_email(&email).ok_or(AccountError::InvalidEmail)?),
            None => None,
        };
        let password_hash = match request.password {
            Some(password) if password.is_empty() => return Err(AccountError::EmptyPassword),
            Some(password) => Some(password::hash_password(&password)?),
            None => None,
        };

        Ok(Self {
            name,
            email,
            password_hash,
            is_active: request.is_active,
            is_admin: request.is_admin,
            address: request.address,
            phone_number: request.phone_number,
            role: None,
        })
    }

    /// A role change and nothing else.
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    /// The role this update assigns, if any.
    pub fn new_role(&self) -> Option<Role> {
        self.role
    }
}

/// Account as returned by the API (no password hash).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccount {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for PublicAccount {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role,
            is_active: account.is_active,
            is_admin: account.is_admin,
            address: account.address.clone(),
            phone_number: account.phone_number.clone(),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

// =============================================================================
// Request / Response Models
// =============================================================================

/// Request to register a new account.
///
/// Registration always yields the least privileged role; a `role` field in
/// the body is ignored. Elevated accounts are created through
/// `POST /api/admins`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAccountRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl From<RegisterAccountRequest> for NewAccount {
    fn from(request: RegisterAccountRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            password: request.password,
            role: None,
            address: request.address,
            phone_number: request.phone_number,
        }
    }
}

/// Request to create an account with an explicit role (superadmin only).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl From<CreateAdminRequest> for NewAccount {
    fn from(request: CreateAdminRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            password: request.password,
            role: Some(request.role),
            address: None,
            phone_number: None,
        }
    }
}

/// Request to update an account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_admin: Option<bool>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Request to change an account's role.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response carrying a freshly issued bearer credential.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Always `Bearer`.
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub account: PublicAccount,
}
