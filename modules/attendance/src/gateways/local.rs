use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::AttendanceApi,
    error::AttendanceError,
    model::{AdminSession, ClearedDay, Export, RegistrationReceipt, Statistics, Submission},
};
use crate::domain::{error::DomainError, service::Service};

/// Local implementation of the AttendanceApi trait that delegates to the domain service
pub struct AttendanceLocalClient {
    service: Arc<Service>,
}

impl AttendanceLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl AttendanceApi for AttendanceLocalClient {
    async fn register(&self, submission: Submission) -> anyhow::Result<RegistrationReceipt> {
        self.service
            .register(submission)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn statistics(&self) -> anyhow::Result<Statistics> {
        self.service
            .statistics()
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn login(&self, username: &str, password: &str) -> anyhow::Result<AdminSession> {
        self.service
            .login(username, password)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn export(&self) -> anyhow::Result<Export> {
        self.service
            .export()
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn clear_today(&self) -> anyhow::Result<ClearedDay> {
        self.service
            .clear_today()
            .await
            .map_err(map_domain_error_to_anyhow)
    }
}

/// Map domain errors to contract errors wrapped in anyhow
fn map_domain_error_to_anyhow(domain_error: DomainError) -> anyhow::Error {
    let contract_error = match &domain_error {
        DomainError::Validation { .. } => {
            AttendanceError::validation(domain_error.first_message())
        }
        DomainError::AlreadyRegistered { .. } => AttendanceError::conflict(),
        DomainError::InvalidCredentials => AttendanceError::unauthorized(),
        DomainError::Database { .. } => AttendanceError::internal(),
    };

    anyhow::Error::new(contract_error)
}
