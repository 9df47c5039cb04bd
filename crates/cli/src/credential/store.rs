// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential persistence: load/save a single JSON record with atomic writes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::credential::CredentialRecord;

/// File-backed store for the installation's one [`CredentialRecord`].
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record from disk.
    ///
    /// A missing, unreadable or malformed file all mean "not authenticated"
    /// and yield `None`.
    pub fn load(&self) -> Option<CredentialRecord> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) => {
                debug!(path = %self.path.display(), "no persisted credentials: {e}");
                return None;
            }
        };

        match serde_json::from_str(&data) {
            Ok(record) => {
                debug!(path = %self.path.display(), "loaded persisted credentials");
                Some(record)
            }
            Err(e) => {
                warn!(path = %self.path.display(), "failed to parse persisted credentials: {e}");
                None
            }
        }
    }

    /// Replace the record on disk atomically (write tmp + rename).
    ///
    /// Uses a unique temp filename (PID + counter) so two saves never share a
    /// partially written temp file.
    pub fn save(&self, record: &CredentialRecord) -> anyhow::Result<()> {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create credential directory {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(record)?;
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_name = format!(
            "{}.{}.{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy(),
            std::process::id(),
            seq,
        );
        let tmp_path = self.path.with_file_name(tmp_name);

        std::fs::write(&tmp_path, json)
            .with_context(|| format!("write credentials to {}", tmp_path.display()))?;
        if let Err(e) = std::fs::rename(&tmp_path, &self.path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e).with_context(|| format!("replace {}", self.path.display()));
        }

        info!(path = %self.path.display(), "persisted credentials");
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
