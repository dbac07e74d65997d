use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::contract::model::{Registration, RegistrationAttempt};

#[derive(Debug, Error)]
pub enum RepoError {
    /// A registration for the same (fingerprint, date_key) already exists.
    #[error("registration already exists for this fingerprint and day")]
    Duplicate,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait RegistrationsRepository: Send + Sync {
    /// Store a registration. Must fail with `RepoError::Duplicate` when the
    /// (fingerprint, date_key) slot is taken, atomically with the insert.
    async fn insert(&self, registration: Registration) -> Result<(), RepoError>;

    /// Registration holding the (fingerprint, date_key) slot, if any.
    async fn find_for_day(
        &self,
        fingerprint: &str,
        date_key: NaiveDate,
    ) -> Result<Option<Registration>, RepoError>;

    /// Append a rejected attempt to the audit log.
    async fn record_attempt(&self, attempt: RegistrationAttempt) -> Result<(), RepoError>;

    /// Sum of party sizes registered on `date_key`.
    async fn day_total(&self, date_key: NaiveDate) -> Result<i64, RepoError>;

    /// All registrations, oldest first.
    async fn list_registrations(&self) -> Result<Vec<Registration>, RepoError>;

    /// All rejected attempts, oldest first.
    async fn list_attempts(&self) -> Result<Vec<RegistrationAttempt>, RepoError>;

    /// Remove registrations and attempts for `date_key`.
    /// Returns the number of registrations removed.
    async fn delete_day(&self, date_key: NaiveDate) -> Result<u64, RepoError>;
}
