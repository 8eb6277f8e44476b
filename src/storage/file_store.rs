// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account store persisted as JSON files under `DATA_DIR`.
//!
//! Reads go straight to disk. Writes are serialized through a mutex whose
//! guard moves into the blocking task, so the email uniqueness check and
//! the write stay exclusive until the write has finished, even if the
//! caller stops waiting. Blocking file I/O runs on the blocking pool.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{
    AccountFiles, AccountRepository, AccountStore, StorageError, StoragePaths, StoreError,
    StoreResult,
};
use crate::models::{Account, AccountUpdate};

/// File-backed [`AccountStore`].
#[derive(Debug, Clone)]
pub struct FileAccountStore {
    files: Arc<AccountFiles>,
    write_lock: Arc<Mutex<()>>,
}

impl FileAccountStore {
    /// Open (and create if needed) the store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let files = AccountFiles::open(StoragePaths::new(root))?;
        Ok(Self {
            files: Arc::new(files),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    async fn read<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(AccountRepository<'_>) -> Result<T, StorageError> + Send + 'static,
    {
        let files = Arc::clone(&self.files);
        join(tokio::task::spawn_blocking(move || op(AccountRepository::new(&files))).await)
    }

    async fn write<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(AccountRepository<'_>) -> Result<T, StorageError> + Send + 'static,
    {
        let guard = Arc::clone(&self.write_lock).lock_owned().await;
        let files = Arc::clone(&self.files);
        join(
            tokio::task::spawn_blocking(move || {
                let _guard = guard;
                op(AccountRepository::new(&files))
            })
            .await,
        )
    }
}

fn join<T>(
    joined: Result<Result<T, StorageError>, tokio::task::JoinError>,
) -> StoreResult<T> {
    joined
        .map_err(|e| StoreError::Unavailable(format!("storage task failed: {e}")))?
        .map_err(StoreError::from)
}

#[async_trait]
impl AccountStore for FileAccountStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Account>> {
        let id = id.to_string();
        self.read(move |repo| match repo.get(&id) {
            Ok(account) => Ok(Some(account)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let email = email.to_string();
        self.read(move |repo| repo.get_by_email(&email)).await
    }

    async fn create(&self, account: Account) -> StoreResult<Account> {
        self.write(move |repo| repo.create(&account).map(|()| account))
            .await
    }

    async fn update(&self, account: Account) -> StoreResult<Account> {
        self.write(move |repo| repo.update(&account).map(|()| account))
            .await
    }

    async fn modify(&self, id: &str, update: AccountUpdate) -> StoreResult<Account> {
        let id = id.to_string();
        self.write(move |repo| repo.modify(&id, update)).await
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let id = id.to_string();
        self.write(move |repo| repo.delete(&id)).await
    }

    async fn list(&self) -> StoreResult<Vec<Account>> {
        self.read(|repo| repo.list()).await
    }

    async fn health_check(&self) -> StoreResult<()> {
        let files = Arc::clone(&self.files);
        join(tokio::task::spawn_blocking(move || files.health_check()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::models::NewAccount;
    use tempfile::TempDir;

    fn account(email: &str) -> Account {
        Account::new(NewAccount {
            name: "File".to_string(),
            email: email.to_string(),
            password: "pw".to_string(),
            role: Some(Role::Admin),
            address: Some("1 Main St".to_string()),
            phone_number: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn accounts_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let acc = {
            let store = FileAccountStore::open(temp.path()).unwrap();
            store.create(account("keep@example.com")).await.unwrap()
        };

        let store = FileAccountStore::open(temp.path()).unwrap();
        let loaded = store.find_by_id(&acc.id).await.unwrap().unwrap();
        assert_eq!(loaded, acc);
        assert!(loaded.verify_password("pw"));
    }

    #[tokio::test]
    async fn missing_and_unsafe_ids_are_none() {
        let temp = TempDir::new().unwrap();
        let store = FileAccountStore::open(temp.path()).unwrap();

        assert!(store.find_by_id("nope").await.unwrap().is_none());
        assert!(store.find_by_id("../../etc/passwd").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_maps_to_duplicate_account() {
        let temp = TempDir::new().unwrap();
        let store = FileAccountStore::open(temp.path()).unwrap();

        store.create(account("dup@example.com")).await.unwrap();
        let result = store.create(account("DUP@example.com")).await;
        assert!(matches!(result, Err(StoreError::DuplicateAccount(_))));
    }

    #[tokio::test]
    async fn corrupt_file_is_unavailable() {
        let temp = TempDir::new().unwrap();
        let store = FileAccountStore::open(temp.path()).unwrap();
        std::fs::write(temp.path().join("accounts").join("broken.json"), b"{not json").unwrap();

        let result = store.find_by_id("broken").await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn health_check_passes() {
        let temp = TempDir::new().unwrap();
        let store = FileAccountStore::open(temp.path()).unwrap();
        store.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn modify_applies_under_write_path() {
        let temp = TempDir::new().unwrap();
        let store = FileAccountStore::open(temp.path()).unwrap();
        let acc = store.create(account("mod@example.com")).await.unwrap();

        let stored = store
            .modify(&acc.id, AccountUpdate::role(Role::Superadmin))
            .await
            .unwrap();
        assert_eq!(stored.role, Role::Superadmin);
        assert_eq!(store.find_by_id(&acc.id).await.unwrap().unwrap().role, Role::Superadmin);

        assert!(matches!(
            store.modify("ghost", AccountUpdate::role(Role::Admin)).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn abandoned_create_still_excludes_next_writer() {
        let temp = TempDir::new().unwrap();
        let store = FileAccountStore::open(temp.path()).unwrap();

        // Enough records that the uniqueness scan outlives the timeout.
        let files = AccountFiles::open(StoragePaths::new(temp.path())).unwrap();
        let template = account("filler@example.com");
        for i in 0..3000 {
            let mut filler = template.clone();
            filler.id = format!("filler-{i}");
            filler.email = format!("filler-{i}@example.com");
            files.write(&filler).unwrap();
        }

        let first = account("dup@example.com");
        let second = account("dup@example.com");

        let _ = tokio::time::timeout(std::time::Duration::from_millis(1), store.create(first)).await;
        let next = store.create(second).await;

        // Abandoned or not, the first write completes before the second
        // writer can scan.
        assert!(matches!(next, Err(StoreError::DuplicateAccount(_))));
        let holders: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter(|a| a.email == "dup@example.com")
            .collect();
        assert_eq!(holders.len(), 1);
    }
}
