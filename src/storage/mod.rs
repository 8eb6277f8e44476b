// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Account Storage
//!
//! The authentication core reaches persistence only through the
//! [`AccountStore`] trait. Two implementations are provided:
//!
//! - [`InMemoryAccountStore`] - process-local map, for tests and ephemeral runs
//! - [`FileAccountStore`] - one JSON file per account under `DATA_DIR`
//!
//! ## Storage Layout
//!
//! ```text
//! <DATA_DIR>/
//!   accounts/
//!     {account_id}.json
//! ```
//!
//! Every lookup is a point read; implementations own their own
//! concurrency discipline. Email uniqueness is enforced here, at the
//! persistence boundary.

use async_trait::async_trait;

use crate::models::{Account, AccountUpdate};

pub mod account_files;
pub mod file_store;
pub mod memory;
pub mod paths;
pub mod repository;

pub use account_files::{AccountFiles, StorageError, StorageResult};
pub use file_store::FileAccountStore;
pub use memory::InMemoryAccountStore;
pub use paths::StoragePaths;
pub use repository::AccountRepository;

/// Failure reported by an [`AccountStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No account with this id.
    #[error("account not found: {0}")]
    NotFound(String),
    /// Another account already uses this email.
    #[error("an account with email {0} already exists")]
    DuplicateAccount(String),
    /// The store itself failed (I/O, corruption, unreachable backend).
    #[error("account store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for account store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistent account collaborator.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Point lookup by id.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Account>>;

    /// Point lookup by email; the input is normalized before comparison.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Insert a new account. Fails with `DuplicateAccount` if the email is taken.
    async fn create(&self, account: Account) -> StoreResult<Account>;

    /// Replace an existing account. Fails with `NotFound` if absent and with
    /// `DuplicateAccount` if the new email belongs to another account.
    async fn update(&self, account: Account) -> StoreResult<Account>;

    /// Apply `update` to the current stored record and persist it, atomically
    /// with respect to other writes. Fails with `NotFound` if absent and with
    /// `DuplicateAccount` if the new email belongs to another account.
    async fn modify(&self, id: &str, update: AccountUpdate) -> StoreResult<Account>;

    /// Remove an account.
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// All accounts, oldest first.
    async fn list(&self) -> StoreResult<Vec<Account>>;

    /// Check that the backend is usable.
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

impl From<StorageError> for StoreError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(entity) => StoreError::NotFound(entity),
            StorageError::AlreadyExists(entity) => StoreError::DuplicateAccount(entity),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}
