use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub iat: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// The authenticated caller, extracted from a validated bearer token and
/// stored in request extensions by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }

    pub fn is_patient(&self) -> bool {
        self.role.as_deref() == Some("patient")
    }

    pub fn is_consultant(&self) -> bool {
        self.role.as_deref() == Some("consultant")
    }

    /// True when the user's id equals the given stored id.
    pub fn is_same(&self, id: &Uuid) -> bool {
        self.id == id.to_string()
    }

    /// The token subject parsed as a Uuid; `None` for malformed subjects.
    pub fn uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.id).ok()
    }

    pub fn email_or_id(&self) -> String {
        self.email.clone().unwrap_or_else(|| self.id.clone())
    }
}

/// A user row as stored in the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub created_at: Option<DateTime<Utc>>,
}
