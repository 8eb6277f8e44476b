// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path utilities for the account storage layout.

use std::path::{Path, PathBuf};

/// Storage path utilities rooted at `DATA_DIR`.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    /// Create a new StoragePaths rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory containing all accounts.
    pub fn accounts_dir(&self) -> PathBuf {
        self.root.join("accounts")
    }

    /// Path to a specific account file.
    ///
    /// Returns `None` for ids that could escape the accounts directory;
    /// only ASCII alphanumerics, `-` and `_` are accepted.
    pub fn account(&self, account_id: &str) -> Option<PathBuf> {
        if !is_safe_id(account_id) {
            return None;
        }
        Some(self.accounts_dir().join(format!("{account_id}.json")))
    }
}

fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
