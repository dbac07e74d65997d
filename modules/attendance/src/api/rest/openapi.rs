use modkit::api::problem::{Problem, ValidationError};
use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "visitcount",
        description = "Event attendance counter"
    ),
    paths(
        handlers::get_stats,
        handlers::register,
        handlers::admin_login,
        handlers::admin_export,
        handlers::clear_today
    ),
    components(schemas(
        dto::RegisterReq,
        dto::RegisterResp,
        dto::StatsDto,
        dto::MunicipalityCountDto,
        dto::DailyCountDto,
        dto::LoginReq,
        dto::LoginResp,
        dto::ClearTodayResp,
        dto::ExportDto,
        dto::RegistrationDto,
        dto::AttemptDto,
        Problem,
        ValidationError
    )),
    tags(
        (name = "attendance", description = "Visitor registration and statistics"),
        (name = "admin", description = "Event administration")
    )
)]
pub struct AttendanceApiDoc;

/// OpenAPI document for the attendance routes.
pub fn openapi() -> utoipa::openapi::OpenApi {
    AttendanceApiDoc::openapi()
}
