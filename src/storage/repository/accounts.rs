// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account repository over the JSON record files.
//!
//! ## Storage Layout
//!
//! ```text
//! /data/accounts/{account_id}.json
//! ```
//!
//! Email lookups scan the directory. Callers that mutate must serialize
//! writes themselves; the repository does no locking.

use super::super::{AccountFiles, StorageError, StorageResult};
use crate::models::{normalize_email, Account, AccountUpdate};

/// Repository for account operations on the record files.
pub struct AccountRepository<'a> {
    files: &'a AccountFiles,
}

impl<'a> AccountRepository<'a> {
    pub fn new(files: &'a AccountFiles) -> Self {
        Self { files }
    }

    /// Check if an account exists.
    pub fn exists(&self, account_id: &str) -> bool {
        self.files.contains(account_id)
    }

    /// Get an account by ID.
    pub fn get(&self, account_id: &str) -> StorageResult<Account> {
        self.files.read(account_id)
    }

    /// Find an account by email. The input is normalized first.
    pub fn get_by_email(&self, email: &str) -> StorageResult<Option<Account>> {
        let Some(email) = normalize_email(email) else {
            return Ok(None);
        };
        Ok(self.list()?.into_iter().find(|a| a.email == email))
    }

    /// Create a new account.
    ///
    /// # Returns
    /// - `Err(StorageError::AlreadyExists)` if the id or the email is taken
    pub fn create(&self, account: &Account) -> StorageResult<()> {
        if self.exists(&account.id) || self.get_by_email(&account.email)?.is_some() {
            return Err(StorageError::AlreadyExists(account.email.clone()));
        }
        self.files.write(account)
    }

    /// Replace an existing account.
    pub fn update(&self, account: &Account) -> StorageResult<()> {
        if !self.exists(&account.id) {
            return Err(StorageError::NotFound(format!("Account {}", account.id)));
        }
        self.ensure_email_free(account)?;
        self.files.write(account)
    }

    /// Apply `update` to the stored record and write it back.
    pub fn modify(&self, account_id: &str, update: AccountUpdate) -> StorageResult<Account> {
        let mut account = self.get(account_id)?;
        account.apply(update);
        self.ensure_email_free(&account)?;
        self.files.write(&account)?;
        Ok(account)
    }

    fn ensure_email_free(&self, account: &Account) -> StorageResult<()> {
        match self.get_by_email(&account.email)? {
            Some(other) if other.id != account.id => {
                Err(StorageError::AlreadyExists(account.email.clone()))
            }
            _ => Ok(()),
        }
    }

    /// Delete an account.
    pub fn delete(&self, account_id: &str) -> StorageResult<()> {
        self.files.remove(account_id)
    }

    /// List all accounts, oldest first.
    ///
    /// Unreadable files are logged and skipped.
    pub fn list(&self) -> StorageResult<Vec<Account>> {
        let ids = self.files.ids()?;

        let mut accounts = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.get(id) {
                Ok(account) => accounts.push(account),
                Err(e) => tracing::warn!(account_id = %id, error = %e, "Skipping unreadable account file"),
            }
        }
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::models::{NewAccount, UpdateAccountRequest};
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn test_files() -> (TempDir, AccountFiles) {
        let temp = TempDir::new().unwrap();
        let files = AccountFiles::open(StoragePaths::new(temp.path())).expect("Failed to open");
        (temp, files)
    }

    fn account(email: &str) -> Account {
        Account::new(NewAccount {
            name: "Test".to_string(),
            email: email.to_string(),
            password: "pw".to_string(),
            role: Some(Role::Admin),
            address: None,
            phone_number: None,
        })
        .unwrap()
    }

    #[test]
    fn create_and_get_account() {
        let (_temp, files) = test_files();
        let repo = AccountRepository::new(&files);

        let acc = account("a@example.com");
        repo.create(&acc).unwrap();

        let loaded = repo.get(&acc.id).unwrap();
        assert_eq!(loaded, acc);
    }

    #[test]
    fn create_duplicate_email_fails() {
        let (_temp, files) = test_files();
        let repo = AccountRepository::new(&files);

        repo.create(&account("dup@example.com")).unwrap();
        let result = repo.create(&account("dup@example.com"));

        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
    }

    #[test]
    fn get_by_email_normalizes_input() {
        let (_temp, files) = test_files();
        let repo = AccountRepository::new(&files);

        let acc = account("ops@example.com");
        repo.create(&acc).unwrap();

        let found = repo.get_by_email("  OPS@Example.com").unwrap().unwrap();
        assert_eq!(found.id, acc.id);
        assert!(repo.get_by_email("nobody@example.com").unwrap().is_none());
        assert!(repo.get_by_email("not an email").unwrap().is_none());
    }

    #[test]
    fn update_rejects_email_of_other_account() {
        let (_temp, files) = test_files();
        let repo = AccountRepository::new(&files);

        repo.create(&account("one@example.com")).unwrap();
        let mut two = account("two@example.com");
        repo.create(&two).unwrap();

        two.email = "one@example.com".to_string();
        assert!(matches!(repo.update(&two), Err(StorageError::AlreadyExists(_))));
    }

    #[test]
    fn modify_applies_to_current_record() {
        let (_temp, files) = test_files();
        let repo = AccountRepository::new(&files);

        let acc = account("mod@example.com");
        repo.create(&acc).unwrap();
        repo.modify(&acc.id, AccountUpdate::role(Role::Superadmin)).unwrap();

        let rename = AccountUpdate::prepare(UpdateAccountRequest {
            name: Some("Renamed".to_string()),
            ..Default::default()
        })
        .unwrap();
        let stored = repo.modify(&acc.id, rename).unwrap();

        assert_eq!(stored.name, "Renamed");
        assert_eq!(stored.role, Role::Superadmin);
        assert_eq!(repo.get(&acc.id).unwrap(), stored);
    }

    #[test]
    fn modify_rejects_taken_email_and_missing_account() {
        let (_temp, files) = test_files();
        let repo = AccountRepository::new(&files);

        repo.create(&account("one@example.com")).unwrap();
        let two = account("two@example.com");
        repo.create(&two).unwrap();

        let steal = AccountUpdate::prepare(UpdateAccountRequest {
            email: Some("ONE@example.com".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(
            repo.modify(&two.id, steal),
            Err(StorageError::AlreadyExists(_))
        ));
        assert_eq!(repo.get(&two.id).unwrap().email, "two@example.com");

        assert!(matches!(
            repo.modify("ghost", AccountUpdate::role(Role::Admin)),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let (_temp, files) = test_files();
        let repo = AccountRepository::new(&files);

        let acc = account("gone@example.com");
        repo.create(&acc).unwrap();
        repo.delete(&acc.id).unwrap();

        assert!(matches!(repo.get(&acc.id), Err(StorageError::NotFound(_))));
        assert!(matches!(repo.delete(&acc.id), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn list_is_oldest_first() {
        let (_temp, files) = test_files();
        let repo = AccountRepository::new(&files);

        let mut first = account("first@example.com");
        first.created_at = chrono::Utc::now() - chrono::Duration::hours(1);
        let second = account("second@example.com");
        repo.create(&second).unwrap();
        repo.create(&first).unwrap();

        let emails: Vec<_> = repo.list().unwrap().into_iter().map(|a| a.email).collect();
        assert_eq!(emails, vec!["first@example.com", "second@example.com"]);
    }
}
