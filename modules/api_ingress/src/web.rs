use axum::{
    http::Uri,
    response::{Html, Json},
};
use modkit::{not_found, ProblemResponse};
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Fallback for unknown routes.
pub async fn not_found_fallback(uri: Uri) -> ProblemResponse {
    let mut resp = not_found("Endpoint ikke fundet");
    resp.0 = resp.0.with_instance(uri.path());
    resp
}

pub async fn serve_docs() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>visitcount API</title>
  <script src="https://unpkg.com/@stoplight/elements@latest/web-components.min.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements@latest/styles.min.css">
</head>
<body>
  <elements-api apiDescriptionUrl="/openapi.json" router="hash" layout="sidebar"></elements-api>
</body>
</html>"#,
    )
}
