use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An accepted visitor registration. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: Uuid,
    pub municipality: String,
    pub party_size: i32,
    pub fingerprint: String,
    pub date_key: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Why a submission was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptReason {
    Invalid,
    Duplicate,
}

impl AttemptReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptReason::Invalid => "invalid",
            AttemptReason::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for AttemptReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttemptReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invalid" => Ok(AttemptReason::Invalid),
            "duplicate" => Ok(AttemptReason::Duplicate),
            other => Err(format!("unknown attempt reason '{other}'")),
        }
    }
}

/// Audit record of a rejected submission. Raw values are kept as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationAttempt {
    pub id: Uuid,
    pub municipality: Option<String>,
    pub party_size: Option<i64>,
    pub fingerprint: String,
    pub date_key: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub reason: AttemptReason,
    pub errors: Vec<String>,
    /// Registration that already held the (fingerprint, day) slot.
    #[serde(default)]
    pub duplicate_of: Option<Uuid>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
}

/// Party size exactly as the client sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartySizeInput {
    /// Absent or `null`. A submitted `0` is `Integer(0)` and fails the 1-50 range check,
    /// it is not reported as missing.
    Missing,
    Integer(i64),
    NotInteger,
}

impl PartySizeInput {
    /// Raw integer value, if one was submitted.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PartySizeInput::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

/// Where a submission came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMeta {
    pub ip: String,
    pub user_agent: Option<String>,
}

/// A registration request before validation.
#[derive(Debug, Clone)]
pub struct Submission {
    pub municipality: Option<String>,
    pub party_size: PartySizeInput,
    pub client: ClientMeta,
}

/// Result of an accepted registration.
#[derive(Debug, Clone)]
pub struct RegistrationReceipt {
    pub registration: Registration,
    /// Sum of party sizes registered for the day, this one included.
    pub today_count: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalityCount {
    pub municipality: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub registrations: i64,
    pub visitors: i64,
}

/// Aggregated figures shown on the dashboard. Computed on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub today_total: i64,
    pub total_visitors: i64,
    pub total_days: i64,
    pub avg_daily: i64,
    pub total_registrations: i64,
    pub today_registrations: i64,
    /// Today's visitors per municipality, highest first.
    pub kommune_stats: Vec<MunicipalityCount>,
    pub top_kommune: String,
    pub daily_breakdown: Vec<DailyCount>,
    pub last_registration: String,
    pub last_update: DateTime<Utc>,
}

/// Full dataset dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Export {
    pub exported_at: DateTime<Utc>,
    pub registrations: Vec<Registration>,
    pub attempts: Vec<RegistrationAttempt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearedDay {
    pub date: NaiveDate,
    pub deleted: u64,
}
