use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    Extension,
};
use modkit::api::problem::{Problem, ProblemResponse};
use tracing::{debug, info};

use crate::api::rest::client_info::ClientInfo;
use crate::api::rest::dto::{
    ClearTodayResp, ExportDto, LoginReq, LoginResp, RegisterReq, RegisterResp, StatsDto,
};
use crate::api::rest::error::{map_domain_error, map_json_rejection};
use crate::contract::model::Submission;
use crate::domain::service::Service;

pub const STATS_PATH: &str = "/api/stats";
pub const REGISTER_PATH: &str = "/api/register";
pub const LOGIN_PATH: &str = "/api/admin/login";
pub const EXPORT_PATH: &str = "/api/admin/export";
pub const CLEAR_TODAY_PATH: &str = "/api/admin/clear-today";

/// Live dashboard figures
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "attendance",
    responses(
        (status = 200, description = "Current statistics", body = StatsDto),
        (status = 500, description = "Internal error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn get_stats(
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Json<StatsDto>, ProblemResponse> {
    debug!("Fetching statistics");
    let stats = svc
        .statistics()
        .await
        .map_err(|e| map_domain_error(&e, STATS_PATH))?;
    Ok(Json(stats.into()))
}

/// Register a visitor party
#[utoipa::path(
    post,
    path = "/api/register",
    tag = "attendance",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Registration accepted", body = RegisterResp),
        (status = 400, description = "Invalid municipality or party size", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Already registered today", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn register(
    Extension(svc): Extension<Arc<Service>>,
    ClientInfo(client): ClientInfo,
    payload: Result<Json<RegisterReq>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResp>), ProblemResponse> {
    let Json(req) = payload.map_err(|rej| map_json_rejection(&rej, REGISTER_PATH))?;
    info!(kommune = ?req.kommune, antal = ?req.antal, "Registration submitted");

    let submission = Submission {
        party_size: req.party_size(),
        municipality: req.kommune,
        client,
    };

    let receipt = svc
        .register(submission)
        .await
        .map_err(|e| map_domain_error(&e, REGISTER_PATH))?;
    Ok((StatusCode::CREATED, Json(receipt.into())))
}

/// Exchange admin credentials for a session token
#[utoipa::path(
    post,
    path = "/api/admin/login",
    tag = "admin",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Logged in", body = LoginResp),
        (status = 401, description = "Wrong username or password", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn admin_login(
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<LoginReq>, JsonRejection>,
) -> Result<Json<LoginResp>, ProblemResponse> {
    let Json(req) = payload.map_err(|rej| map_json_rejection(&rej, LOGIN_PATH))?;
    let session = svc
        .login(&req.username, &req.password)
        .await
        .map_err(|e| map_domain_error(&e, LOGIN_PATH))?;
    Ok(Json(LoginResp {
        success: true,
        token: session.token,
    }))
}

/// Download every registration and rejected attempt as JSON
#[utoipa::path(
    get,
    path = "/api/admin/export",
    tag = "admin",
    responses(
        (status = 200, description = "Dataset attachment", body = ExportDto),
        (status = 500, description = "Internal error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn admin_export(
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Response, ProblemResponse> {
    let export = svc
        .export()
        .await
        .map_err(|e| map_domain_error(&e, EXPORT_PATH))?;

    let filename = format!(
        "attachment; filename=\"visitcount-export-{}.json\"",
        export.exported_at.format("%Y-%m-%d")
    );
    Ok((
        [(header::CONTENT_DISPOSITION, filename)],
        Json(ExportDto::from(export)),
    )
        .into_response())
}

/// Delete everything recorded for the current event day
#[utoipa::path(
    delete,
    path = "/api/admin/clear-today",
    tag = "admin",
    responses(
        (status = 200, description = "Day cleared", body = ClearTodayResp),
        (status = 500, description = "Internal error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn clear_today(
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Json<ClearTodayResp>, ProblemResponse> {
    let cleared = svc
        .clear_today()
        .await
        .map_err(|e| map_domain_error(&e, CLEAR_TODAY_PATH))?;
    Ok(Json(ClearTodayResp {
        success: true,
        deleted: cleared.deleted,
        date: cleared.date,
    }))
}
