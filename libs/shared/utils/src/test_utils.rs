use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

use crate::jwt::issue_token;

/// Configuration builder for integration tests: points every external base
/// URL at one mock server so wiremock can stand in for the store, the mail
/// API and the video API at once.
pub struct TestConfig {
    pub jwt_secret: String,
    pub base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            base_url: "http://localhost:54321".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.base_url.clone(),
            supabase_service_key: "test-service-key".to_string(),
            jwt_secret: self.jwt_secret.clone(),
            reminder_schedule: "24h before,1h before,10m before".to_string(),
            mail_api_base: self.base_url.clone(),
            mail_api_key: "test-mail-key".to_string(),
            email_from: "no-reply@test.example".to_string(),
            video_api_base: self.base_url.clone(),
            video_api_key: "test-video-key".to_string(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn consultant(email: &str) -> Self {
        Self::new(email, "consultant")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn token(&self, secret: &str) -> String {
        issue_token(&self.id.to_string(), &self.email, &self.role, secret, 24)
            .expect("test token")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.to_string(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
        }
    }

    /// The row shape PostgREST returns for this user.
    pub fn to_row(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "email": self.email,
            "role": self.role,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }
}

pub struct MockStoreResponses;

impl MockStoreResponses {
    pub fn appointment_row(
        id: Uuid,
        patient_id: Uuid,
        consultant_id: Uuid,
        start_at: &str,
        end_at: &str,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "consultant_id": consultant_id,
            "doctor_id": null,
            "start_at": start_at,
            "end_at": end_at,
            "status": status,
            "booked_at": "2024-01-01T00:00:00Z",
            "video_room_id": null,
            "notes": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn notification_row(id: Uuid, user_id: Uuid, kind: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user_id,
            "type": kind,
            "title": "Test",
            "body": "Test notification",
            "read": false,
            "meta": {},
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn session_record_row(id: Uuid, appointment_id: Uuid) -> serde_json::Value {
        json!({
            "id": id,
            "appointment_id": appointment_id,
            "started_at": "2024-01-01T10:00:00Z",
            "ended_at": "2024-01-01T10:30:00Z",
            "participants": [Uuid::new_v4(), Uuid::new_v4()],
            "notes": null,
            "consultant_rating_by_patient": null,
            "patient_rating_by_consultant": null,
            "patient_comment": null,
            "consultant_comment": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn duplicate_key_error() -> serde_json::Value {
        json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"appointments_consultant_start_key\"",
            "details": null,
            "hint": null
        })
    }
}
