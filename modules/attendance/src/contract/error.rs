use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttendanceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Already registered today")]
    Conflict,

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Internal error")]
    Internal,
}

impl AttendanceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict() -> Self {
        Self::Conflict
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}
