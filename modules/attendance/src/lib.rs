// === PUBLIC CONTRACT ===
// Only the contract module should be public for other modules to consume
pub mod contract;

// Re-export the public contract components
pub use contract::{client, error, model};

// === MODULE DEFINITION ===
pub mod module;
pub use module::Attendance;

pub use config::{AttendanceConfig, StorageKind};
pub use infra::storage::migrations::{migrate, pending as pending_migrations};

// === INTERNAL MODULES ===
// Exposed for the server binary and for tests; external consumers should stick to `contract`.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
