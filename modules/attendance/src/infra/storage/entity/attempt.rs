use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::contract::model::{AttemptReason, RegistrationAttempt};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "registration_attempts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Raw submitted value.
    #[sea_orm(column_type = "Text", nullable)]
    pub municipality: Option<String>,
    pub party_size: Option<i64>,
    pub fingerprint: String,
    pub date_key: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub reason: String,
    /// JSON array of messages.
    #[sea_orm(column_type = "Text")]
    pub errors: String,
    pub duplicate_of: Option<Uuid>,
    #[sea_orm(column_type = "Text", nullable)]
    pub client_ip: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for RegistrationAttempt {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let reason = m
            .reason
            .parse::<AttemptReason>()
            .map_err(anyhow::Error::msg)?;
        let errors: Vec<String> = serde_json::from_str(&m.errors)
            .with_context(|| format!("attempt {} has malformed errors column", m.id))?;

        Ok(Self {
            id: m.id,
            municipality: m.municipality,
            party_size: m.party_size,
            fingerprint: m.fingerprint,
            date_key: m.date_key,
            created_at: m.created_at,
            reason,
            errors,
            duplicate_of: m.duplicate_of,
            client_ip: m.client_ip,
            user_agent: m.user_agent,
        })
    }
}
