// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity resolution: verified subject id to current account.
//!
//! Every call performs a fresh point lookup. Nothing is cached, so a role
//! change or deletion is visible on the next request that presents the
//! same credential.

use std::sync::Arc;

use crate::models::Account;
use crate::storage::{AccountStore, StoreError};

/// Resolution failure.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No account has this id.
    #[error("no account for subject")]
    NotFound,
    /// The store could not answer.
    #[error(transparent)]
    Store(StoreError),
}

/// Looks verified subjects up in the account store.
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn AccountStore>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn AccountStore> {
        &self.store
    }

    /// Fetch the account named by `subject_id`.
    pub async fn resolve(&self, subject_id: &str) -> Result<Account, ResolveError> {
        match self.store.find_by_id(subject_id).await {
            Ok(Some(account)) => Ok(account),
            Ok(None) | Err(StoreError::NotFound(_)) => Err(ResolveError::NotFound),
            Err(e) => Err(ResolveError::Store(e)),
        }
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::models::{AccountUpdate, NewAccount};
    use crate::storage::{InMemoryAccountStore, StoreResult};
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl AccountStore for FailingStore {
        async fn find_by_id(&self, _id: &str) -> StoreResult<Option<Account>> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn find_by_email(&self, _email: &str) -> StoreResult<Option<Account>> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn create(&self, _account: Account) -> StoreResult<Account> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn update(&self, _account: Account) -> StoreResult<Account> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn modify(&self, _id: &str, _update: AccountUpdate) -> StoreResult<Account> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn delete(&self, _id: &str) -> StoreResult<()> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn list(&self) -> StoreResult<Vec<Account>> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn resolves_fresh_state_each_time() {
        let store = Arc::new(InMemoryAccountStore::new());
        let account = store
            .create(
                Account::new(NewAccount {
                    name: "Ada".to_string(),
                    email: "ada@example.com".to_string(),
                    password: "pw".to_string(),
                    role: None,
                    address: None,
                    phone_number: None,
                })
                .unwrap(),
            )
            .await
            .unwrap();
        let resolver = IdentityResolver::new(store.clone());

        assert_eq!(resolver.resolve(&account.id).await.unwrap().role, Role::Admin);

        let mut promoted = account.clone();
        promoted.set_role(Role::Superadmin);
        store.update(promoted).await.unwrap();

        assert_eq!(
            resolver.resolve(&account.id).await.unwrap().role,
            Role::Superadmin
        );
    }

    #[tokio::test]
    async fn unknown_subject_is_not_found() {
        let resolver = IdentityResolver::new(Arc::new(InMemoryAccountStore::new()));
        assert!(matches!(
            resolver.resolve("ghost").await,
            Err(ResolveError::NotFound)
        ));
    }

    #[tokio::test]
    async fn store_fault_is_distinct_from_not_found() {
        let resolver = IdentityResolver::new(Arc::new(FailingStore));
        assert!(matches!(
            resolver.resolve("anyone").await,
            Err(ResolveError::Store(StoreError::Unavailable(_)))
        ));
    }
}
