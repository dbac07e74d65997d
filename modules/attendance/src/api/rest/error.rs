use axum::{extract::rejection::JsonRejection, http::StatusCode};
use modkit::api::problem::{Problem, ProblemResponse};
use modkit::ValidationError;

use crate::domain::error::DomainError;
use crate::domain::validation::{
    MSG_MUNICIPALITY_INVALID, MSG_MUNICIPALITY_REQUIRED, MSG_PARTY_SIZE_RANGE,
    MSG_PARTY_SIZE_REQUIRED,
};

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    ProblemResponse(Problem::coded(status, code, title, detail).with_instance(instance))
}

fn pointer_for(message: &str) -> &'static str {
    match message {
        MSG_MUNICIPALITY_REQUIRED | MSG_MUNICIPALITY_INVALID => "/kommune",
        MSG_PARTY_SIZE_REQUIRED | MSG_PARTY_SIZE_RANGE => "/antal",
        _ => "",
    }
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::Validation { errors } => {
            let mut resp = from_parts(
                StatusCode::BAD_REQUEST,
                "ATTENDANCE_VALIDATION",
                "Validation error",
                e.first_message(),
                instance,
            );
            resp.0 = resp.0.with_errors(
                errors
                    .iter()
                    .map(|m| ValidationError {
                        detail: m.clone(),
                        pointer: pointer_for(m).to_string(),
                    })
                    .collect(),
            );
            resp
        }
        DomainError::AlreadyRegistered { .. } => from_parts(
            StatusCode::CONFLICT,
            "ATTENDANCE_ALREADY_REGISTERED",
            "Already registered",
            e.first_message(),
            instance,
        ),
        DomainError::InvalidCredentials => from_parts(
            StatusCode::UNAUTHORIZED,
            "ATTENDANCE_UNAUTHORIZED",
            "Unauthorized",
            e.first_message(),
            instance,
        ),
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                e.first_message(),
                instance,
            )
        }
    }
}

/// Malformed or non-JSON request body.
pub fn map_json_rejection(rejection: &JsonRejection, instance: &str) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "ATTENDANCE_BAD_REQUEST",
        "Bad request",
        rejection.body_text(),
        instance,
    )
}
