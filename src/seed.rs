// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bootstrap superadmin.
//!
//! Public registration only yields admins, and creating or promoting a
//! superadmin needs a superadmin, so a fresh deployment needs one created
//! out of band.

use crate::auth::Role;
use crate::config::SeedAccount;
use crate::models::{Account, AccountError, NewAccount};
use crate::storage::{AccountStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What [`ensure_superadmin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    AlreadyPresent,
}

/// Create the seed superadmin unless an account with its email exists.
///
/// An existing account is left untouched, whatever its role.
pub async fn ensure_superadmin(
    store: &dyn AccountStore,
    seed: &SeedAccount,
) -> Result<SeedOutcome, SeedError> {
    if store.find_by_email(&seed.email).await?.is_some() {
        return Ok(SeedOutcome::AlreadyPresent);
    }

    let input = NewAccount {
        name: seed.name.clone(),
        email: seed.email.clone(),
        password: seed.password.clone(),
        role: Some(Role::Superadmin),
        address: None,
        phone_number: None,
    };
    let account = tokio::task::spawn_blocking(move || Account::new(input))
        .await
        .map_err(|e| StoreError::Unavailable(format!("seed task failed: {e}")))??;

    match store.create(account).await {
        Ok(account) => {
            tracing::info!(account_id = %account.id, "Seed superadmin created");
            Ok(SeedOutcome::Created)
        }
        Err(StoreError::DuplicateAccount(_)) => Ok(SeedOutcome::AlreadyPresent),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryAccountStore;

    fn seed() -> SeedAccount {
        SeedAccount {
            name: "Root".to_string(),
            email: "root@example.com".to_string(),
            password: "change-me".to_string(),
        }
    }

    #[tokio::test]
    async fn creates_superadmin_once() {
        let store = InMemoryAccountStore::new();

        assert_eq!(ensure_superadmin(&store, &seed()).await.unwrap(), SeedOutcome::Created);
        assert_eq!(
            ensure_superadmin(&store, &seed()).await.unwrap(),
            SeedOutcome::AlreadyPresent
        );

        let accounts = store.list().await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].role, Role::Superadmin);
        assert!(accounts[0].verify_password("change-me"));
    }

    #[tokio::test]
    async fn existing_account_is_not_promoted() {
        let store = InMemoryAccountStore::new();
        let existing = Account::new(NewAccount {
            name: "Someone".to_string(),
            email: "ROOT@example.com".to_string(),
            password: "pw".to_string(),
            role: None,
            address: None,
            phone_number: None,
        })
        .unwrap();
        store.create(existing).await.unwrap();

        assert_eq!(
            ensure_superadmin(&store, &seed()).await.unwrap(),
            SeedOutcome::AlreadyPresent
        );
        let account = store.find_by_email("root@example.com").await.unwrap().unwrap();
        assert_eq!(account.role, Role::Admin);
    }
}
