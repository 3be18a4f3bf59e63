use reqwest::Client;
use serde_json::json;
use tracing::{debug, error};

use shared_config::AppConfig;

/// SendGrid-style mail API client. When no API key is configured every send
/// becomes a logged no-op, so environments without mail still run the sweep.
pub struct MailClient {
    client: Client,
    base_url: String,
    api_key: String,
    from: String,
    configured: bool,
}

impl MailClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.mail_api_base.clone(),
            api_key: config.mail_api_key.clone(),
            from: config.email_from.clone(),
            configured: config.is_mail_configured(),
        }
    }

    /// Send one plain-text email.
    /// POST {base}/v3/mail/send
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        if !self.configured {
            debug!("Mail not configured, skipping email to {}", to);
            return Ok(());
        }

        let url = format!("{}/v3/mail/send", self.base_url);
        let payload = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.from },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }]
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Mail send failed: {} - {}", status, text);
            return Err(format!("HTTP {}: {}", status, text));
        }

        debug!("Email sent to {}: {}", to, subject);
        Ok(())
    }
}
