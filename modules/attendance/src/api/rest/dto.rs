use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{
    DailyCount, Export, MunicipalityCount, PartySizeInput, Registration, RegistrationAttempt,
    RegistrationReceipt, Statistics,
};

/// Registration form body. Both fields are checked by the domain validator,
/// so they are accepted loosely here.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct RegisterReq {
    /// Municipality name, one of the fixed list.
    #[serde(default)]
    pub kommune: Option<String>,
    /// Party size, integer in 1..=50.
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub antal: Option<serde_json::Value>,
}

impl RegisterReq {
    pub fn party_size(&self) -> PartySizeInput {
        match &self.antal {
            None | Some(serde_json::Value::Null) => PartySizeInput::Missing,
            Some(serde_json::Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    PartySizeInput::Integer(i)
                } else {
                    // 3.0 is an integer, 3.5 is not
                    match n.as_f64() {
                        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
                            PartySizeInput::Integer(f as i64)
                        }
                        _ => PartySizeInput::NotInteger,
                    }
                }
            }
            Some(_) => PartySizeInput::NotInteger,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResp {
    pub success: bool,
    pub today_count: i64,
    pub message: String,
    pub registration_id: Uuid,
}

impl From<RegistrationReceipt> for RegisterResp {
    fn from(r: RegistrationReceipt) -> Self {
        Self {
            success: true,
            today_count: r.today_count,
            message: r.message,
            registration_id: r.registration.id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MunicipalityCountDto {
    pub kommune: String,
    pub count: i64,
}

impl From<MunicipalityCount> for MunicipalityCountDto {
    fn from(m: MunicipalityCount) -> Self {
        Self {
            kommune: m.municipality,
            count: m.count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DailyCountDto {
    pub date: NaiveDate,
    pub registrations: i64,
    pub visitors: i64,
}

impl From<DailyCount> for DailyCountDto {
    fn from(d: DailyCount) -> Self {
        Self {
            date: d.date,
            registrations: d.registrations,
            visitors: d.visitors,
        }
    }
}

/// Dashboard statistics.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    pub today_total: i64,
    pub total_visitors: i64,
    pub total_days: i64,
    pub avg_daily: i64,
    pub total_registrations: i64,
    pub today_registrations: i64,
    /// Leading municipality today, or "Ingen data".
    pub top_kommune: String,
    /// `HH:MM` of the latest registration, or "Ingen endnu".
    pub last_registration: String,
    /// Today's visitors per municipality.
    pub kommune_stats: BTreeMap<String, i64>,
    /// Same figures as `kommuneStats`, highest first.
    pub kommune_ranking: Vec<MunicipalityCountDto>,
    pub daily_breakdown: Vec<DailyCountDto>,
    pub last_update: DateTime<Utc>,
}

impl From<Statistics> for StatsDto {
    fn from(s: Statistics) -> Self {
        Self {
            today_total: s.today_total,
            total_visitors: s.total_visitors,
            total_days: s.total_days,
            avg_daily: s.avg_daily,
            total_registrations: s.total_registrations,
            today_registrations: s.today_registrations,
            top_kommune: s.top_kommune,
            last_registration: s.last_registration,
            kommune_stats: s
                .kommune_stats
                .iter()
                .map(|m| (m.municipality.clone(), m.count))
                .collect(),
            kommune_ranking: s.kommune_stats.into_iter().map(Into::into).collect(),
            daily_breakdown: s.daily_breakdown.into_iter().map(Into::into).collect(),
            last_update: s.last_update,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginReq {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResp {
    pub success: bool,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClearTodayResp {
    pub success: bool,
    pub deleted: u64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDto {
    pub id: Uuid,
    pub kommune: String,
    pub antal: i32,
    pub fingerprint: String,
    pub date_key: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<Registration> for RegistrationDto {
    fn from(r: Registration) -> Self {
        Self {
            id: r.id,
            kommune: r.municipality,
            antal: r.party_size,
            fingerprint: r.fingerprint,
            date_key: r.date_key,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttemptDto {
    pub id: Uuid,
    pub kommune: Option<String>,
    pub antal: Option<i64>,
    pub fingerprint: String,
    pub date_key: NaiveDate,
    pub created_at: DateTime<Utc>,
    /// `invalid` or `duplicate`.
    pub reason: String,
    pub validation_errors: Vec<String>,
    pub duplicate_of: Option<Uuid>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl From<RegistrationAttempt> for AttemptDto {
    fn from(a: RegistrationAttempt) -> Self {
        Self {
            id: a.id,
            kommune: a.municipality,
            antal: a.party_size,
            fingerprint: a.fingerprint,
            date_key: a.date_key,
            created_at: a.created_at,
            reason: a.reason.to_string(),
            validation_errors: a.errors,
            duplicate_of: a.duplicate_of,
            ip_address: a.client_ip,
            user_agent: a.user_agent,
        }
    }
}

/// Downloadable dump of the whole dataset.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportDto {
    pub exported_at: DateTime<Utc>,
    pub total_registrations: usize,
    pub total_attempts: usize,
    pub registrations: Vec<RegistrationDto>,
    pub attempts: Vec<AttemptDto>,
}

impl From<Export> for ExportDto {
    fn from(e: Export) -> Self {
        Self {
            exported_at: e.exported_at,
            total_registrations: e.registrations.len(),
            total_attempts: e.attempts.len(),
            registrations: e.registrations.into_iter().map(Into::into).collect(),
            attempts: e.attempts.into_iter().map(Into::into).collect(),
        }
    }
}
