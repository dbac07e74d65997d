use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{
    AdminSession, AttemptReason, ClearedDay, Export, Registration, RegistrationAttempt,
    RegistrationReceipt, Statistics, Submission,
};
use crate::domain::error::DomainError;
use crate::domain::fingerprint::{fingerprint, DEFAULT_FINGERPRINT_LEN};
use crate::domain::ports::{Clock, SystemClock};
use crate::domain::repo::{RegistrationsRepository, RepoError};
use crate::domain::stats::StatsAggregator;
use crate::domain::validation;

/// Recorded on the audit row of a rejected duplicate.
pub const MSG_ALREADY_REGISTERED: &str = "Allerede registreret i dag";

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub fingerprint_len: usize,
    /// Event time zone as minutes east of UTC; decides which day a registration belongs to.
    pub utc_offset_minutes: i32,
    pub daily_breakdown_days: usize,
    pub admin_username: String,
    /// Empty disables admin login.
    pub admin_password: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            fingerprint_len: DEFAULT_FINGERPRINT_LEN,
            utc_offset_minutes: 60,
            daily_breakdown_days: 30,
            admin_username: "admin".to_string(),
            admin_password: String::new(),
        }
    }
}

impl ServiceConfig {
    /// Event offset; out-of-range values fall back to UTC.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }
}

/// Domain service: registration intake, dashboard figures and admin operations.
/// Depends only on the repository and clock ports.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn RegistrationsRepository>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

impl Service {
    pub fn new(repo: Arc<dyn RegistrationsRepository>, config: ServiceConfig) -> Self {
        Self::with_clock(repo, Arc::new(SystemClock), config)
    }

    pub fn with_clock(
        repo: Arc<dyn RegistrationsRepository>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Calendar day of "now" in the event time zone.
    pub fn today(&self) -> NaiveDate {
        self.clock
            .now()
            .with_timezone(&self.config.offset())
            .date_naive()
    }

    #[instrument(
        name = "attendance.service.register",
        skip(self, submission),
        fields(municipality = ?submission.municipality, client_ip = %submission.client.ip)
    )]
    pub async fn register(
        &self,
        submission: Submission,
    ) -> Result<RegistrationReceipt, DomainError> {
        let now = self.clock.now();
        let date_key = now.with_timezone(&self.config.offset()).date_naive();
        let fp = fingerprint(
            &submission.client.ip,
            submission.client.user_agent.as_deref().unwrap_or(""),
            self.config.fingerprint_len,
        );

        let accepted =
            match validation::accept(submission.municipality.as_deref(), &submission.party_size) {
                Ok(accepted) => accepted,
                Err(validation) => {
                    info!(errors = ?validation.errors, "Rejected invalid registration");
                    self.audit(
                        &submission,
                        &fp,
                        date_key,
                        AttemptReason::Invalid,
                        validation.errors.clone(),
                        None,
                    )
                    .await;
                    return Err(DomainError::validation(validation.errors));
                }
            };

        let registration = Registration {
            id: Uuid::new_v4(),
            municipality: accepted.municipality.to_string(),
            party_size: accepted.party_size,
            fingerprint: fp.clone(),
            date_key,
            created_at: now,
        };

        match self.repo.insert(registration.clone()).await {
            Ok(()) => {}
            Err(RepoError::Duplicate) => {
                let existing = match self.repo.find_for_day(&fp, date_key).await {
                    Ok(found) => found.map(|r| r.id),
                    Err(e) => {
                        warn!(error = %e, "Could not look up the existing registration");
                        None
                    }
                };
                info!(fingerprint = %fp, %date_key, "Rejected duplicate registration");
                self.audit(
                    &submission,
                    &fp,
                    date_key,
                    AttemptReason::Duplicate,
                    vec![MSG_ALREADY_REGISTERED.to_string()],
                    existing,
                )
                .await;
                return Err(DomainError::already_registered(fp, date_key));
            }
            Err(e) => return Err(DomainError::database(e.to_string())),
        }

        let today_count = self
            .repo
            .day_total(date_key)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!(
            id = %registration.id,
            party_size = registration.party_size,
            today_count,
            "Registration accepted"
        );

        Ok(RegistrationReceipt {
            message: format!(
                "Registreret som besøgende #{today_count} i dag fra {}",
                registration.municipality
            ),
            registration,
            today_count,
        })
    }

    #[instrument(name = "attendance.service.statistics", skip(self))]
    pub async fn statistics(&self) -> Result<Statistics, DomainError> {
        let now = self.clock.now();
        let offset = self.config.offset();
        let rows = self
            .repo
            .list_registrations()
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        debug!(rows = rows.len(), "Computing statistics");

        let aggregator = StatsAggregator::new(offset, self.config.daily_breakdown_days);
        Ok(aggregator.compute(&rows, now.with_timezone(&offset).date_naive(), now))
    }

    #[instrument(name = "attendance.service.login", skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<AdminSession, DomainError> {
        let cfg = &self.config;
        if cfg.admin_password.is_empty() {
            warn!("Admin login attempted but no admin password is configured");
            return Err(DomainError::invalid_credentials());
        }
        if username != cfg.admin_username || password != cfg.admin_password {
            info!("Admin login rejected");
            return Err(DomainError::invalid_credentials());
        }

        info!("Admin logged in");
        Ok(AdminSession {
            token: format!("admin_session_{}", self.clock.now().timestamp_millis()),
        })
    }

    #[instrument(name = "attendance.service.export", skip(self))]
    pub async fn export(&self) -> Result<Export, DomainError> {
        let registrations = self
            .repo
            .list_registrations()
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        let attempts = self
            .repo
            .list_attempts()
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!(
            registrations = registrations.len(),
            attempts = attempts.len(),
            "Exporting dataset"
        );
        Ok(Export {
            exported_at: self.clock.now(),
            registrations,
            attempts,
        })
    }

    #[instrument(name = "attendance.service.clear_day", skip(self))]
    pub async fn clear_day(&self, date: NaiveDate) -> Result<ClearedDay, DomainError> {
        let deleted = self
            .repo
            .delete_day(date)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        warn!(%date, deleted, "Cleared registrations for day");
        Ok(ClearedDay { date, deleted })
    }

    pub async fn clear_today(&self) -> Result<ClearedDay, DomainError> {
        self.clear_day(self.today()).await
    }

    /// Record a rejected attempt. Failures are logged and swallowed.
    async fn audit(
        &self,
        submission: &Submission,
        fp: &str,
        date_key: NaiveDate,
        reason: AttemptReason,
        errors: Vec<String>,
        duplicate_of: Option<Uuid>,
    ) {
        let attempt = RegistrationAttempt {
            id: Uuid::new_v4(),
            municipality: submission.municipality.clone(),
            party_size: submission.party_size.as_integer(),
            fingerprint: fp.to_string(),
            date_key,
            created_at: self.clock.now(),
            reason,
            errors,
            duplicate_of,
            client_ip: Some(submission.client.ip.clone()),
            user_agent: submission.client.user_agent.clone(),
        };

        if let Err(e) = self.repo.record_attempt(attempt).await {
            warn!(error = %e, %reason, "Failed to record registration attempt");
        }
    }
}
