mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Duration;
use serde_json::json;
use tower::ServiceExt;

use attendance::infra::storage::SeaOrmRegistrationsRepository;

use common::{
    body_json, event_morning, memory_service, register_request, router, service_with, sqlite_db,
    TestClock, ADMIN_PASSWORD,
};

fn problem_content_type(resp: &axum::response::Response) -> &str {
    resp.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn registration_scenario() {
    let app = router(memory_service(TestClock::at(event_morning())));

    // Fresh visitor
    let resp = app
        .clone()
        .oneshot(register_request("203.0.113.10", json!({"kommune": "Aalborg", "antal": 3})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["todayCount"], 3);
    assert_eq!(body["message"], "Registreret som besøgende #3 i dag fra Aalborg");
    assert!(body["registrationId"].is_string());

    // Same visitor, same day
    let resp = app
        .clone()
        .oneshot(register_request("203.0.113.10", json!({"kommune": "Aalborg", "antal": 3})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(problem_content_type(&resp), "application/problem+json");
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "Du har allerede registreret dig i dag");
    assert_eq!(body["code"], "ATTENDANCE_ALREADY_REGISTERED");

    // Unknown municipality
    let resp = app
        .clone()
        .oneshot(register_request("203.0.113.11", json!({"kommune": "Nowhere", "antal": 3})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "Ugyldig kommune");
    assert_eq!(body["errors"][0]["pointer"], "/kommune");

    // Party size out of range
    let resp = app
        .clone()
        .oneshot(register_request("203.0.113.12", json!({"kommune": "Aalborg", "antal": 0})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "Antal skal være mellem 1-50");

    // Only the first submission was counted.
    let body = body_json(app.oneshot(get("/api/stats")).await.unwrap()).await;
    assert_eq!(body["todayTotal"], 3);
}

#[tokio::test]
async fn missing_fields_are_reported() {
    let app = router(memory_service(TestClock::at(event_morning())));

    let resp = app
        .oneshot(register_request("198.51.100.1", json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "Kommune er påkrævet");
    assert_eq!(body["errors"][1]["detail"], "Antal er påkrævet");
}

#[tokio::test]
async fn malformed_body_is_a_problem() {
    let app = router(memory_service(TestClock::at(event_morning())));

    let req = Request::builder()
        .method("POST")
        .uri("/api/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(problem_content_type(&resp), "application/problem+json");
}

#[tokio::test]
async fn top_kommune_sentinel_and_overtake() {
    let app = router(memory_service(TestClock::at(event_morning())));

    let body = body_json(app.clone().oneshot(get("/api/stats")).await.unwrap()).await;
    assert_eq!(body["topKommune"], "Ingen data");
    assert_eq!(body["lastRegistration"], "Ingen endnu");
    assert_eq!(body["todayTotal"], 0);
    assert_eq!(body["totalDays"], 1);
    assert_eq!(body["avgDaily"], 0);

    app.clone()
        .oneshot(register_request("10.0.0.1", json!({"kommune": "Aalborg", "antal": 3})))
        .await
        .unwrap();
    let body = body_json(app.clone().oneshot(get("/api/stats")).await.unwrap()).await;
    assert_eq!(body["topKommune"], "Aalborg");

    app.clone()
        .oneshot(register_request("10.0.0.2", json!({"kommune": "Thisted", "antal": 5})))
        .await
        .unwrap();
    let body = body_json(app.oneshot(get("/api/stats")).await.unwrap()).await;
    assert_eq!(body["topKommune"], "Thisted");
    assert_eq!(body["todayTotal"], 8);
    assert_eq!(body["kommuneStats"]["Aalborg"], 3);
    assert_eq!(body["kommuneStats"]["Thisted"], 5);
    assert_eq!(body["kommuneRanking"][0]["kommune"], "Thisted");
    assert_eq!(body["lastRegistration"], "11:00");
}

#[tokio::test]
async fn next_day_accepts_the_same_client() {
    let clock = TestClock::at(event_morning());
    let app = router(memory_service(clock.clone()));

    let body = json!({"kommune": "Jammerbugt", "antal": 2});
    let first = app
        .clone()
        .oneshot(register_request("10.9.9.9", body.clone()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    clock.advance(Duration::days(1));
    let resp = app
        .oneshot(register_request("10.9.9.9", body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_json(resp).await["todayCount"], 2);
}

#[tokio::test]
async fn admin_login() {
    let app = router(memory_service(TestClock::at(event_morning())));

    let login = |password: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/admin/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"username": "admin", "password": password}).to_string(),
            ))
            .unwrap()
    };

    let resp = app.clone().oneshot(login(ADMIN_PASSWORD)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(
        body["token"],
        format!("admin_session_{}", event_morning().timestamp_millis())
    );

    let resp = app.oneshot(login("wrong")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(problem_content_type(&resp), "application/problem+json");
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "Forkert brugernavn eller adgangskode");
}

#[tokio::test]
async fn export_is_an_attachment() {
    let app = router(memory_service(TestClock::at(event_morning())));

    app.clone()
        .oneshot(register_request("10.0.0.1", json!({"kommune": "Rebild", "antal": 4})))
        .await
        .unwrap();
    app.clone()
        .oneshot(register_request("10.0.0.2", json!({"kommune": "Rebild", "antal": 99})))
        .await
        .unwrap();

    let resp = app.oneshot(get("/api/admin/export")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    assert!(disposition.starts_with("attachment;"), "{disposition}");
    assert!(disposition.contains("visitcount-export-2025-08-15.json"));

    let body = body_json(resp).await;
    assert_eq!(body["totalRegistrations"], 1);
    assert_eq!(body["totalAttempts"], 1);
    assert_eq!(body["registrations"][0]["kommune"], "Rebild");
    assert_eq!(body["attempts"][0]["reason"], "invalid");
    assert_eq!(body["attempts"][0]["antal"], 99);
    assert_eq!(body["attempts"][0]["ipAddress"], "10.0.0.2");
}

#[tokio::test]
async fn clear_today_over_sqlite() {
    let db = sqlite_db().await.unwrap();
    let clock = TestClock::at(event_morning());
    let svc = service_with(Arc::new(SeaOrmRegistrationsRepository::new(db)), clock);
    let app = router(svc);

    for (ip, kommune) in [("10.0.0.1", "Aalborg"), ("10.0.0.2", "Hjørring")] {
        let resp = app
            .clone()
            .oneshot(register_request(ip, json!({"kommune": kommune, "antal": 2})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = Request::builder()
        .method("DELETE")
        .uri("/api/admin/clear-today")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["deleted"], 2);
    assert_eq!(body["date"], "2025-08-15");

    let body = body_json(app.oneshot(get("/api/stats")).await.unwrap()).await;
    assert_eq!(body["todayTotal"], 0);
    assert_eq!(body["topKommune"], "Ingen data");
}
