use serde::{Deserialize, Serialize};

/// Which registration store backs the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Process memory, lost on restart.
    Memory,
    /// JSON snapshot on disk.
    File,
    /// Relational database from the `database` section.
    #[default]
    Database,
}

/// Configuration for the attendance module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttendanceConfig {
    #[serde(default)]
    pub storage: StorageKind,
    /// Snapshot path for `storage: file`, relative to the server home dir.
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_fingerprint_len")]
    pub fingerprint_len: usize,
    /// Offset of the event's local time from UTC; decides where a day starts.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_daily_breakdown_days")]
    pub daily_breakdown_days: usize,
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    /// Empty disables admin login.
    #[serde(default)]
    pub admin_password: String,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            storage: StorageKind::default(),
            data_file: default_data_file(),
            fingerprint_len: default_fingerprint_len(),
            utc_offset_minutes: default_utc_offset_minutes(),
            daily_breakdown_days: default_daily_breakdown_days(),
            admin_username: default_admin_username(),
            admin_password: String::new(),
        }
    }
}

fn default_data_file() -> String {
    "data/registrations.json".to_string()
}

fn default_fingerprint_len() -> usize {
    32
}

fn default_utc_offset_minutes() -> i32 {
    60
}

fn default_daily_breakdown_days() -> usize {
    30
}

fn default_admin_username() -> String {
    "admin".to_string()
}
