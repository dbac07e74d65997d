use async_trait::async_trait;

use crate::contract::model::{
    AdminSession, ClearedDay, Export, RegistrationReceipt, Statistics, Submission,
};

/// Public API trait for the attendance module that other modules can use.
///
/// Errors are `AttendanceError` values wrapped in `anyhow::Error`.
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    /// Validate and store a visitor registration.
    async fn register(&self, submission: Submission) -> anyhow::Result<RegistrationReceipt>;

    /// Current dashboard figures.
    async fn statistics(&self) -> anyhow::Result<Statistics>;

    /// Check admin credentials and hand out a session token.
    async fn login(&self, username: &str, password: &str) -> anyhow::Result<AdminSession>;

    /// Dump every registration and rejected attempt.
    async fn export(&self) -> anyhow::Result<Export>;

    /// Delete everything recorded for the current event day.
    async fn clear_today(&self) -> anyhow::Result<ClearedDay>;
}
