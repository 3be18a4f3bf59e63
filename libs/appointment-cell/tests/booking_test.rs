use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::router::{appointment_routes, calendar_routes};
use shared_utils::test_utils::{MockStoreResponses, TestConfig, TestUser};

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn patient_books_an_appointment() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());
    let patient = TestUser::patient("patient@test.example");
    let consultant = TestUser::consultant("doc@test.example");

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([consultant.to_row()])))
        .mount(&server)
        .await;
    // The booking function returns the inserted row as a single object.
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/book_appointment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::appointment_row(
            Uuid::new_v4(),
            patient.id,
            consultant.id,
            "2025-03-03T09:00:00Z",
            "2025-03-03T09:30:00Z",
            "pending",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let app = appointment_routes(config.to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Authorization", format!("Bearer {}", patient.token(&config.jwt_secret)))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "consultantId": consultant.id,
                        "startAt": "2025-03-03T09:00:00Z",
                        "endAt": "2025-03-03T09:30:00Z"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ok"], true);
    assert_eq!(body["data"]["status"], "pending");
}

#[tokio::test]
async fn double_booking_surfaces_as_slot_conflict() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());
    let patient = TestUser::patient("patient@test.example");
    let consultant = TestUser::consultant("doc@test.example");

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([consultant.to_row()])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/book_appointment"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(MockStoreResponses::duplicate_key_error()),
        )
        .mount(&server)
        .await;

    let app = appointment_routes(config.to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Authorization", format!("Bearer {}", patient.token(&config.jwt_secret)))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "consultantId": consultant.id,
                        "startAt": "2025-03-03T09:00:00Z",
                        "endAt": "2025-03-03T09:30:00Z"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "SLOT_BOOKED");
}

#[tokio::test]
async fn consultant_cannot_book_appointments() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());
    let consultant = TestUser::consultant("doc@test.example");

    let app = appointment_routes(config.to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Authorization", format!("Bearer {}", consultant.token(&config.jwt_secret)))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "consultantId": Uuid::new_v4(),
                        "startAt": "2025-03-03T09:00:00Z",
                        "endAt": "2025-03-03T09:30:00Z"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn booking_a_non_consultant_is_rejected() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());
    let patient = TestUser::patient("patient@test.example");
    let other_patient = TestUser::patient("other@test.example");

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([other_patient.to_row()])))
        .mount(&server)
        .await;

    let app = appointment_routes(config.to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Authorization", format!("Bearer {}", patient.token(&config.jwt_secret)))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "consultantId": other_patient.id,
                        "startAt": "2025-03-03T09:00:00Z",
                        "endAt": "2025-03-03T09:30:00Z"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn consultant_confirms_a_pending_appointment() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());
    let patient = TestUser::patient("patient@test.example");
    let consultant = TestUser::consultant("doc@test.example");
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_row(
                appointment_id,
                patient.id,
                consultant.id,
                "2025-03-03T09:00:00Z",
                "2025-03-03T09:30:00Z",
                "pending",
            )
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_row(
                appointment_id,
                patient.id,
                consultant.id,
                "2025-03-03T09:00:00Z",
                "2025-03-03T09:30:00Z",
                "confirmed",
            )
        ])))
        .expect(1)
        .mount(&server)
        .await;
    // Confirmation notifies the patient.
    Mock::given(method("POST"))
        .and(path("/rest/v1/notifications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::notification_row(Uuid::new_v4(), patient.id, "appointment_confirmed")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let app = appointment_routes(config.to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/{}/confirm", appointment_id))
                .header("Authorization", format!("Bearer {}", consultant.token(&config.jwt_secret)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "confirmed");
}

#[tokio::test]
async fn patient_cannot_confirm() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());
    let patient = TestUser::patient("patient@test.example");
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_row(
                appointment_id,
                patient.id,
                Uuid::new_v4(),
                "2025-03-03T09:00:00Z",
                "2025-03-03T09:30:00Z",
                "pending",
            )
        ])))
        .mount(&server)
        .await;

    let app = appointment_routes(config.to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/{}/confirm", appointment_id))
                .header("Authorization", format!("Bearer {}", patient.token(&config.jwt_secret)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn cancelling_a_cancelled_appointment_is_invalid() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());
    let patient = TestUser::patient("patient@test.example");
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_row(
                appointment_id,
                patient.id,
                Uuid::new_v4(),
                "2025-03-03T09:00:00Z",
                "2025-03-03T09:30:00Z",
                "cancelled",
            )
        ])))
        .mount(&server)
        .await;

    let app = appointment_routes(config.to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/{}/cancel", appointment_id))
                .header("Authorization", format!("Bearer {}", patient.token(&config.jwt_secret)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_STATUS");
}

#[tokio::test]
async fn patient_cancel_notifies_the_consultant() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());
    let patient = TestUser::patient("patient@test.example");
    let consultant = TestUser::consultant("doc@test.example");
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_row(
                appointment_id,
                patient.id,
                consultant.id,
                "2025-03-03T09:00:00Z",
                "2025-03-03T09:30:00Z",
                "confirmed",
            )
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_row(
                appointment_id,
                patient.id,
                consultant.id,
                "2025-03-03T09:00:00Z",
                "2025-03-03T09:30:00Z",
                "cancelled",
            )
        ])))
        .mount(&server)
        .await;
    // Exactly one notification: the counterparty, not the actor.
    Mock::given(method("POST"))
        .and(path("/rest/v1/notifications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::notification_row(Uuid::new_v4(), consultant.id, "appointment_cancelled")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let app = appointment_routes(config.to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/{}/cancel", appointment_id))
                .header("Authorization", format!("Bearer {}", patient.token(&config.jwt_secret)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");
}

#[tokio::test]
async fn calendar_groups_appointments_by_day() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());
    let patient = TestUser::patient("patient@test.example");
    let consultant_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_row(
                Uuid::new_v4(),
                patient.id,
                consultant_id,
                "2025-03-03T09:00:00Z",
                "2025-03-03T09:30:00Z",
                "confirmed",
            ),
            MockStoreResponses::appointment_row(
                Uuid::new_v4(),
                patient.id,
                consultant_id,
                "2025-03-03T14:00:00Z",
                "2025-03-03T14:30:00Z",
                "pending",
            ),
            MockStoreResponses::appointment_row(
                Uuid::new_v4(),
                patient.id,
                consultant_id,
                "2025-03-10T09:00:00Z",
                "2025-03-10T09:30:00Z",
                "confirmed",
            ),
        ])))
        .mount(&server)
        .await;

    let app = calendar_routes(config.to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}/events?month=2025-03", patient.id))
                .header("Authorization", format!("Bearer {}", patient.token(&config.jwt_secret)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    let days = body["data"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], "2025-03-03");
    assert_eq!(days[0]["count"], 2);
    assert_eq!(days[1]["date"], "2025-03-10");
    assert_eq!(days[1]["count"], 1);
}

#[tokio::test]
async fn admin_can_read_any_calendar() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());
    let admin = TestUser::admin("admin@test.example");

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let app = calendar_routes(config.to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}/events?month=2025-03", Uuid::new_v4()))
                .header("Authorization", format!("Bearer {}", admin.token(&config.jwt_secret)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn calendar_of_another_user_is_forbidden() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());
    let patient = TestUser::patient("patient@test.example");

    let app = calendar_routes(config.to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}/events?month=2025-03", Uuid::new_v4()))
                .header("Authorization", format!("Bearer {}", patient.token(&config.jwt_secret)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
