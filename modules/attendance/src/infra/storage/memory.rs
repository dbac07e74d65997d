//! In-process store. Dedup is an atomic check-and-insert under one write lock.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::contract::model::{Registration, RegistrationAttempt};
use crate::domain::repo::{RegistrationsRepository, RepoError};

/// Everything the in-process store holds; also the on-disk format of the file store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub registrations: Vec<Registration>,
    #[serde(default)]
    pub attempts: Vec<RegistrationAttempt>,
}

impl Snapshot {
    /// Push `registration` unless its (fingerprint, date_key) slot is taken.
    pub(crate) fn insert(&mut self, registration: Registration) -> Result<(), RepoError> {
        let taken = self.registrations.iter().any(|r| {
            r.fingerprint == registration.fingerprint && r.date_key == registration.date_key
        });
        if taken {
            return Err(RepoError::Duplicate);
        }
        self.registrations.push(registration);
        Ok(())
    }

    /// Drop registrations and attempts of `date_key`; returns removed registrations.
    pub(crate) fn delete_day(&mut self, date_key: NaiveDate) -> u64 {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.date_key != date_key);
        self.attempts.retain(|a| a.date_key != date_key);
        (before - self.registrations.len()) as u64
    }
}

#[derive(Default)]
pub struct MemoryRegistrationsRepository {
    state: RwLock<Snapshot>,
}

impl MemoryRegistrationsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.read().clone()
    }

    /// Swap in a whole new state.
    pub(crate) fn replace(&self, snapshot: Snapshot) {
        *self.state.write() = snapshot;
    }
}

#[async_trait]
impl RegistrationsRepository for MemoryRegistrationsRepository {
    async fn insert(&self, registration: Registration) -> Result<(), RepoError> {
        self.state.write().insert(registration)
    }

    async fn find_for_day(
        &self,
        fingerprint: &str,
        date_key: NaiveDate,
    ) -> Result<Option<Registration>, RepoError> {
        Ok(self
            .state
            .read()
            .registrations
            .iter()
            .find(|r| r.fingerprint == fingerprint && r.date_key == date_key)
            .cloned())
    }

    async fn record_attempt(&self, attempt: RegistrationAttempt) -> Result<(), RepoError> {
        self.state.write().attempts.push(attempt);
        Ok(())
    }

    async fn day_total(&self, date_key: NaiveDate) -> Result<i64, RepoError> {
        Ok(self
            .state
            .read()
            .registrations
            .iter()
            .filter(|r| r.date_key == date_key)
            .map(|r| i64::from(r.party_size))
            .sum())
    }

    async fn list_registrations(&self) -> Result<Vec<Registration>, RepoError> {
        let mut rows = self.state.read().registrations.clone();
        rows.sort_by_key(|r| r.created_at);
        Ok(rows)
    }

    async fn list_attempts(&self) -> Result<Vec<RegistrationAttempt>, RepoError> {
        let mut rows = self.state.read().attempts.clone();
        rows.sort_by_key(|a| a.created_at);
        Ok(rows)
    }

    async fn delete_day(&self, date_key: NaiveDate) -> Result<u64, RepoError> {
        Ok(self.state.write().delete_day(date_key))
    }
}
