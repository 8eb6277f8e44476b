// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! One pretty-printed JSON file per account.
//!
//! Writes land in `{id}.json.tmp` and are renamed over the record, so a
//! reader sees either the old or the new account, never a torn one.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use super::StoragePaths;
use crate::models::Account;

const RECORD_EXTENSION: &str = "json";
const HEALTH_MARKER: &str = ".health_check";

/// Error type for account file operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
    #[error("corrupt account record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    /// The health marker read back different bytes than it wrote
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound(e.to_string())
        } else {
            StorageError::Io(e)
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// The account records under `DATA_DIR/accounts`.
#[derive(Debug, Clone)]
pub struct AccountFiles {
    paths: StoragePaths,
}

impl AccountFiles {
    /// Open the record directory, creating it if needed.
    pub fn open(paths: StoragePaths) -> StorageResult<Self> {
        fs::create_dir_all(paths.accounts_dir())?;
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    fn record(&self, account_id: &str) -> StorageResult<PathBuf> {
        self.paths
            .account(account_id)
            .ok_or_else(|| StorageError::NotFound(format!("Account {account_id}")))
    }

    /// Whether a record exists for `account_id`. Unsafe ids never exist.
    pub fn contains(&self, account_id: &str) -> bool {
        self.paths
            .account(account_id)
            .is_some_and(|path| path.is_file())
    }

    /// Load one account.
    pub fn read(&self, account_id: &str) -> StorageResult<Account> {
        let path = self.record(account_id)?;
        let file = File::open(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(format!("Account {account_id}")),
            _ => StorageError::Io(e),
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Persist `account`, replacing any previous record with the same id.
    pub fn write(&self, account: &Account) -> StorageResult<()> {
        let path = self.record(&account.id)?;
        let temp_path = path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&temp_path)?);
            serde_json::to_writer_pretty(&mut writer, account)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    /// Delete one record.
    pub fn remove(&self, account_id: &str) -> StorageResult<()> {
        fs::remove_file(self.record(account_id)?).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(format!("Account {account_id}")),
            _ => StorageError::Io(e),
        })
    }

    /// Ids of every stored record. Temporary and foreign files are skipped.
    pub fn ids(&self) -> StorageResult<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(self.paths.accounts_dir())? {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != RECORD_EXTENSION) {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|s| s.to_str()) {
                if self.paths.account(id).is_some() {
                    ids.push(id.to_string());
                }
            }
        }
        Ok(ids)
    }

    /// Write, read back and delete a marker file under the root.
    pub fn health_check(&self) -> StorageResult<()> {
        let marker = self.paths.root().join(HEALTH_MARKER);
        let expected = b"backoffice-health";

        fs::write(&marker, expected)?;
        let read_back = fs::read(&marker)?;
        fs::remove_file(&marker)?;

        if read_back != expected {
            return Err(StorageError::IntegrityViolation(
                "health marker read back different bytes".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::models::NewAccount;
    use tempfile::TempDir;

    fn files() -> (TempDir, AccountFiles) {
        let temp = TempDir::new().unwrap();
        let files = AccountFiles::open(StoragePaths::new(temp.path())).unwrap();
        (temp, files)
    }

    fn account(email: &str) -> Account {
        Account::new(NewAccount {
            name: "Disk".to_string(),
            email: email.to_string(),
            password: "pw".to_string(),
            role: Some(Role::Admin),
            address: None,
            phone_number: None,
        })
        .unwrap()
    }

    #[test]
    fn open_creates_accounts_dir() {
        let (_temp, files) = files();
        assert!(files.paths().accounts_dir().is_dir());
    }

    #[test]
    fn write_then_read_leaves_no_temp_file() {
        let (_temp, files) = files();
        let acc = account("disk@example.com");

        files.write(&acc).unwrap();
        assert_eq!(files.read(&acc.id).unwrap(), acc);
        assert!(files.contains(&acc.id));

        let leftovers: Vec<_> = fs::read_dir(files.paths().accounts_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn ids_skip_foreign_files() {
        let (_temp, files) = files();
        let a = account("a@example.com");
        let b = account("b@example.com");
        files.write(&a).unwrap();
        files.write(&b).unwrap();
        let dir = files.paths().accounts_dir();
        fs::write(dir.join("notes.txt"), b"ignored").unwrap();
        fs::write(dir.join("half.json.tmp"), b"{").unwrap();

        let mut ids = files.ids().unwrap();
        ids.sort();
        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[test]
    fn missing_and_unsafe_records_are_not_found() {
        let (_temp, files) = files();
        assert!(matches!(files.read("nope"), Err(StorageError::NotFound(_))));
        assert!(matches!(files.read("../escape"), Err(StorageError::NotFound(_))));
        assert!(matches!(files.remove("nope"), Err(StorageError::NotFound(_))));
        assert!(!files.contains("../escape"));
    }

    #[test]
    fn corrupt_record_is_json_error() {
        let (_temp, files) = files();
        fs::write(files.paths().accounts_dir().join("broken.json"), b"{not json").unwrap();
        assert!(matches!(files.read("broken"), Err(StorageError::Json(_))));
    }

    #[test]
    fn health_check_passes() {
        let (_temp, files) = files();
        files.health_check().unwrap();
        assert!(!files.paths().root().join(HEALTH_MARKER).exists());
    }
}
