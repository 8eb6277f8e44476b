// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-local account store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AccountStore, StoreError, StoreResult};
use crate::models::{normalize_email, Account, AccountUpdate};

/// Account store backed by a map behind an async `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `accounts`.
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let accounts = accounts.into_iter().map(|a| (a.id.clone(), a)).collect();
        Self {
            accounts: RwLock::new(accounts),
        }
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Account>> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let Some(email) = normalize_email(email) else {
            return Ok(None);
        };
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn create(&self, account: Account) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.id) || accounts.values().any(|a| a.email == account.email)
        {
            return Err(StoreError::DuplicateAccount(account.email));
        }
        accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn update(&self, account: Account) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        if !accounts.contains_key(&account.id) {
            return Err(StoreError::NotFound(account.id));
        }
        if accounts
            .values()
            .any(|a| a.id != account.id && a.email == account.email)
        {
            return Err(StoreError::DuplicateAccount(account.email));
        }
        accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn modify(&self, id: &str, update: AccountUpdate) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        let mut account = accounts
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        account.apply(update);
        if accounts
            .values()
            .any(|a| a.id != account.id && a.email == account.email)
        {
            return Err(StoreError::DuplicateAccount(account.email));
        }
        accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        match self.accounts.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn list(&self) -> StoreResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self.accounts.read().await.values().cloned().collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::models::NewAccount;

    fn account(email: &str) -> Account {
        Account::new(NewAccount {
            name: "Test".to_string(),
            email: email.to_string(),
            password: "pw".to_string(),
            role: Some(Role::Superadmin),
            address: None,
            phone_number: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn create_then_find() {
        let store = InMemoryAccountStore::new();
        let acc = store.create(account("a@example.com")).await.unwrap();

        assert_eq!(store.find_by_id(&acc.id).await.unwrap(), Some(acc.clone()));
        assert_eq!(
            store.find_by_email("A@EXAMPLE.COM").await.unwrap().map(|a| a.id),
            Some(acc.id)
        );
        assert_eq!(store.find_by_id("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryAccountStore::new();
        store.create(account("a@example.com")).await.unwrap();
        let result = store.create(account("a@example.com")).await;
        assert!(matches!(result, Err(StoreError::DuplicateAccount(_))));
    }

    #[tokio::test]
    async fn update_and_delete() {
        let store = InMemoryAccountStore::new();
        let mut acc = store.create(account("a@example.com")).await.unwrap();

        acc.set_role(Role::Admin);
        store.update(acc.clone()).await.unwrap();
        assert_eq!(
            store.find_by_id(&acc.id).await.unwrap().map(|a| a.role),
            Some(Role::Admin)
        );

        store.delete(&acc.id).await.unwrap();
        assert!(matches!(
            store.delete(&acc.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.update(acc).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn modify_keeps_concurrent_role_change() {
        let store = InMemoryAccountStore::new();
        let mut acc = account("a@example.com");
        acc.role = Role::Admin;
        let acc = store.create(acc).await.unwrap();

        store
            .modify(&acc.id, AccountUpdate::role(Role::Superadmin))
            .await
            .unwrap();
        let rename = AccountUpdate::prepare(crate::models::UpdateAccountRequest {
            name: Some("Renamed".to_string()),
            ..Default::default()
        })
        .unwrap();
        let stored = store.modify(&acc.id, rename).await.unwrap();

        assert_eq!(stored.name, "Renamed");
        assert_eq!(stored.role, Role::Superadmin);
    }

    #[tokio::test]
    async fn modify_rejects_taken_email() {
        let store = InMemoryAccountStore::new();
        store.create(account("a@example.com")).await.unwrap();
        let b = store.create(account("b@example.com")).await.unwrap();

        let steal = AccountUpdate::prepare(crate::models::UpdateAccountRequest {
            email: Some("A@example.com".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(
            store.modify(&b.id, steal).await,
            Err(StoreError::DuplicateAccount(_))
        ));
        assert_eq!(
            store.find_by_id(&b.id).await.unwrap().map(|a| a.email),
            Some("b@example.com".to_string())
        );
    }
}
