use chrono::NaiveDate;
use thiserror::Error;

pub const MSG_DUPLICATE: &str = "Du har allerede registreret dig i dag";
pub const MSG_INVALID_CREDENTIALS: &str = "Forkert brugernavn eller adgangskode";
pub const MSG_INTERNAL: &str = "Intern serverfejl";

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {}", errors.join("; "))]
    Validation { errors: Vec<String> },

    #[error("Fingerprint '{fingerprint}' already registered on {date}")]
    AlreadyRegistered { fingerprint: String, date: NaiveDate },

    #[error("Invalid admin credentials")]
    InvalidCredentials,

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn validation(errors: Vec<String>) -> Self {
        Self::Validation { errors }
    }

    pub fn already_registered(fingerprint: impl Into<String>, date: NaiveDate) -> Self {
        Self::AlreadyRegistered {
            fingerprint: fingerprint.into(),
            date,
        }
    }

    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// First user-facing message carried by the error, in Danish like the rest of the UI.
    pub fn first_message(&self) -> String {
        match self {
            DomainError::Validation { errors } => errors
                .first()
                .cloned()
                .unwrap_or_else(|| "Ugyldig registrering".to_string()),
            DomainError::AlreadyRegistered { .. } => MSG_DUPLICATE.to_string(),
            DomainError::InvalidCredentials => MSG_INVALID_CREDENTIALS.to_string(),
            DomainError::Database { .. } => MSG_INTERNAL.to_string(),
        }
    }
}
