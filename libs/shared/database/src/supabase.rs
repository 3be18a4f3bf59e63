use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::UserRecord;

/// Postgres unique-violation SQLSTATE, surfaced in PostgREST error bodies.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum StoreError {
    /// A write was rejected by a unique index. Callers translate this into a
    /// domain conflict (e.g. slot already booked).
    #[error("duplicate key")]
    DuplicateKey,

    #[error("store authentication error: {0}")]
    Auth(String),

    #[error("store error ({status}): {message}")]
    Request { status: u16, message: String },

    #[error("store error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Other(e.to_string())
    }
}

impl From<StoreError> for shared_models::error::AppError {
    fn from(e: StoreError) -> Self {
        shared_models::error::AppError::Database(e.to_string())
    }
}

/// Thin PostgREST client. All cells share one of these per request; state is
/// just a connection pool plus the project credentials.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    fn headers(&self, representation: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(key) = HeaderValue::from_str(&self.service_key) {
            headers.insert("apikey", key);
        }
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", self.service_key)) {
            headers.insert(AUTHORIZATION, bearer);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if representation {
            headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        }

        headers
    }

    async fn request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        representation: bool,
    ) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Store request: {} {}", method, url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.headers(representation));

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Store error ({}): {}", status, error_text);

            if status == StatusCode::CONFLICT || error_text.contains(UNIQUE_VIOLATION) {
                return Err(StoreError::DuplicateKey);
            }
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(StoreError::Auth(error_text));
            }
            return Err(StoreError::Request {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let data = response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Other(format!("failed to parse store response: {}", e)))?;
        Ok(data)
    }

    /// GET a filtered collection, e.g. `select("/rest/v1/appointments?id=eq.…")`.
    pub async fn select<T>(&self, path: &str) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        self.request(Method::GET, path, None, false).await
    }

    /// GET a single row by filter; `Ok(None)` when the filter matches nothing.
    pub async fn select_one<T>(&self, path: &str) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let mut rows: Vec<T> = self.select(path).await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }

    /// INSERT one row and return the stored representation.
    pub async fn insert<T>(&self, table: &str, body: Value) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}", table);
        let mut rows: Vec<T> = self.request(Method::POST, &path, Some(body), true).await?;
        if rows.is_empty() {
            return Err(StoreError::Other(format!("insert into {} returned no rows", table)));
        }
        Ok(rows.remove(0))
    }

    /// PATCH rows matching the filter path and return the updated representations.
    pub async fn update<T>(&self, path: &str, body: Value) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, path, Some(body), true).await
    }

    /// Call a SQL function through PostgREST. Functions are the unit of
    /// multi-row atomicity: everything inside one call commits or rolls back
    /// together.
    pub async fn rpc<T>(&self, function: &str, args: Value) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/rpc/{}", function);
        self.request(Method::POST, &path, Some(args), false).await
    }

    /// Fetch a user row by id. `Ok(None)` when no such user exists.
    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let path = format!("/rest/v1/users?id=eq.{}", id);
        self.select_one(&path).await
    }
}
