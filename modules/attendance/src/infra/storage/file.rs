//! JSON snapshot store: the in-memory store, written through to one file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::contract::model::{Registration, RegistrationAttempt};
use crate::domain::repo::{RegistrationsRepository, RepoError};
use crate::infra::storage::memory::{MemoryRegistrationsRepository, Snapshot};

pub struct FileRegistrationsRepository {
    path: PathBuf,
    inner: MemoryRegistrationsRepository,
    // Serializes read-modify-write so snapshots land on disk in order.
    write_lock: Mutex<()>,
}

impl FileRegistrationsRepository {
    /// Load `path` if it exists, otherwise start empty. Parent directories are created.
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let snapshot = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Snapshot::default(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("failed to parse {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        };

        info!(
            path = %path.display(),
            registrations = snapshot.registrations.len(),
            "Opened registration file store"
        );

        Ok(Self {
            path,
            inner: MemoryRegistrationsRepository::from_snapshot(snapshot),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `next` to disk, then make it the live state. On error the live state is untouched.
    /// Callers hold `write_lock`.
    async fn commit(&self, next: Snapshot) -> anyhow::Result<()> {
        self.persist(&next).await?;
        self.inner.replace(next);
        Ok(())
    }

    async fn persist(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec_pretty(snapshot)
            .context("failed to serialize registrations")?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &bytes)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Snapshot written");
        Ok(())
    }
}

#[async_trait]
impl RegistrationsRepository for FileRegistrationsRepository {
    async fn insert(&self, registration: Registration) -> Result<(), RepoError> {
        let _guard = self.write_lock.lock().await;
        let mut next = self.inner.snapshot();
        next.insert(registration)?;
        self.commit(next).await?;
        Ok(())
    }

    async fn find_for_day(
        &self,
        fingerprint: &str,
        date_key: NaiveDate,
    ) -> Result<Option<Registration>, RepoError> {
        self.inner.find_for_day(fingerprint, date_key).await
    }

    async fn record_attempt(&self, attempt: RegistrationAttempt) -> Result<(), RepoError> {
        let _guard = self.write_lock.lock().await;
        let mut next = self.inner.snapshot();
        next.attempts.push(attempt);
        self.commit(next).await?;
        Ok(())
    }

    async fn day_total(&self, date_key: NaiveDate) -> Result<i64, RepoError> {
        self.inner.day_total(date_key).await
    }

    async fn list_registrations(&self) -> Result<Vec<Registration>, RepoError> {
        self.inner.list_registrations().await
    }

    async fn list_attempts(&self) -> Result<Vec<RegistrationAttempt>, RepoError> {
        self.inner.list_attempts().await
    }

    async fn delete_day(&self, date_key: NaiveDate) -> Result<u64, RepoError> {
        let _guard = self.write_lock.lock().await;
        let mut next = self.inner.snapshot();
        let deleted = next.delete_day(date_key);
        self.commit(next).await?;
        Ok(deleted)
    }
}
