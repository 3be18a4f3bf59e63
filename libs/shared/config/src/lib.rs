use std::env;
use tracing::warn;

/// Application configuration, resolved once at startup and injected into
/// every cell. Cells never read the process environment themselves.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub jwt_secret: String,
    /// Comma-separated reminder lead times, e.g. "24h before,1h before,10m before".
    pub reminder_schedule: String,
    pub mail_api_base: String,
    pub mail_api_key: String,
    pub email_from: String,
    pub video_api_base: String,
    pub video_api_key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL").unwrap_or_else(|_| {
                warn!("SUPABASE_URL not set, using empty value");
                String::new()
            }),
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY").unwrap_or_else(|_| {
                warn!("SUPABASE_SERVICE_KEY not set, using empty value");
                String::new()
            }),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                warn!("JWT_SECRET not set, using empty value");
                String::new()
            }),
            reminder_schedule: env::var("REMINDER_SCHEDULE")
                .unwrap_or_else(|_| "24h before,1h before,10m before".to_string()),
            mail_api_base: env::var("MAIL_API_BASE")
                .unwrap_or_else(|_| "https://api.sendgrid.com".to_string()),
            mail_api_key: env::var("SENDGRID_API_KEY").unwrap_or_default(),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "no-reply@arogyam.com".to_string()),
            video_api_base: env::var("VIDEO_API_BASE")
                .unwrap_or_else(|_| "https://api.daily.co/v1".to_string()),
            video_api_key: env::var("DAILY_API_KEY").unwrap_or_default(),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_service_key.is_empty()
            && !self.jwt_secret.is_empty()
    }

    pub fn is_mail_configured(&self) -> bool {
        !self.mail_api_key.is_empty()
    }

    pub fn is_video_configured(&self) -> bool {
        !self.video_api_key.is_empty() && !self.video_api_base.is_empty()
    }
}
