use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use consultant_cell::router::consultant_routes;
use shared_utils::test_utils::{TestConfig, TestUser};

fn recurring_template_row(consultant_id: Uuid, day_of_week: i32) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "consultant_id": consultant_id,
        "day_of_week": day_of_week,
        "date": null,
        "start_time": "09:00:00",
        "end_time": "10:00:00",
        "slot_duration_min": 30,
        "max_concurrent": 1,
        "active": true,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

async fn get_availability(
    server: &MockServer,
    consultant_id: Uuid,
    query: &str,
) -> (StatusCode, Value) {
    let config = TestConfig::with_base_url(&server.uri());
    let caller = TestUser::patient("patient@test.example");
    let app = consultant_routes(config.to_arc());

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}/availability{}", consultant_id, query))
                .header("Authorization", format!("Bearer {}", caller.token(&config.jwt_secret)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn availability_expands_templates_into_slots() {
    let server = MockServer::start().await;
    let consultant_id = Uuid::new_v4();

    // 2025-03-03 is a Monday (weekday index 1).
    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            recurring_template_row(consultant_id, 1)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (status, body) = get_availability(&server, consultant_id, "?date=2025-03-03").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    let slots = body["data"].as_array().unwrap();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0]["start_at"], "2025-03-03T09:00:00Z");
    assert_eq!(slots[1]["start_at"], "2025-03-03T09:30:00Z");
}

#[tokio::test]
async fn booked_starts_are_excluded() {
    let server = MockServer::start().await;
    let consultant_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            recurring_template_row(consultant_id, 1)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "start_at": "2025-03-03T09:00:00Z" }
        ])))
        .mount(&server)
        .await;

    let (status, body) = get_availability(&server, consultant_id, "?date=2025-03-03").await;

    assert_eq!(status, StatusCode::OK);
    let slots = body["data"].as_array().unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0]["start_at"], "2025-03-03T09:30:00Z");
}

#[tokio::test]
async fn invalid_date_is_rejected_before_any_store_access() {
    let server = MockServer::start().await;

    let (status, body) = get_availability(&server, Uuid::new_v4(), "?date=03-03-2025").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_date_is_rejected() {
    let server = MockServer::start().await;

    let (status, body) = get_availability(&server, Uuid::new_v4(), "").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn availability_requires_authentication() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());
    let app = consultant_routes(config.to_arc());

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}/availability?date=2025-03-03", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn consultant_can_create_own_template() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());
    let consultant = TestUser::consultant("doc@test.example");

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([consultant.to_row()])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/availability_templates"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            recurring_template_row(consultant.id, 1)
        ])))
        .mount(&server)
        .await;

    let app = consultant_routes(config.to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/{}/availability", consultant.id))
                .header("Authorization", format!("Bearer {}", consultant.token(&config.jwt_secret)))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "dayOfWeek": 1, "startTime": "09:00", "endTime": "10:00" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn patient_cannot_create_templates() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());
    let patient = TestUser::patient("patient@test.example");

    let app = consultant_routes(config.to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/{}/availability", Uuid::new_v4()))
                .header("Authorization", format!("Bearer {}", patient.token(&config.jwt_secret)))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "dayOfWeek": 1, "startTime": "09:00", "endTime": "10:00" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn template_with_both_day_and_date_is_rejected() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());
    let consultant = TestUser::consultant("doc@test.example");

    let app = consultant_routes(config.to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/{}/availability", consultant.id))
                .header("Authorization", format!("Bearer {}", consultant.token(&config.jwt_secret)))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "dayOfWeek": 1,
                        "date": "2025-03-03",
                        "startTime": "09:00",
                        "endTime": "10:00"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
