use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::SessionError;

/// Room URL base used when no provider is configured. Joining then relies on
/// the room name alone, with no access token.
const FALLBACK_ROOM_BASE: &str = "https://meet.jit.si";

#[derive(Debug, Deserialize)]
pub struct VideoRoom {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct MeetingTokenResponse {
    token: String,
}

/// Daily-style video provider client: named rooms plus short-lived meeting
/// tokens scoped to one room and one participant.
pub struct VideoRoomClient {
    client: Client,
    base_url: String,
    api_key: String,
    configured: bool,
}

impl VideoRoomClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.video_api_base.clone(),
            api_key: config.video_api_key.clone(),
            configured: config.is_video_configured(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn fallback_room_url(room_name: &str) -> String {
        format!("{}/{}", FALLBACK_ROOM_BASE, room_name)
    }

    /// Create a private room with the given name.
    /// POST {base}/rooms
    pub async fn create_room(&self, name: &str) -> Result<VideoRoom, SessionError> {
        info!("Creating video room: {}", name);

        let url = format!("{}/rooms", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({ "name": name, "privacy": "private" }))
            .send()
            .await
            .map_err(|e| SessionError::Upstream(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SessionError::Upstream(e.to_string()))?;
        debug!("Video room creation response: {} - {}", status, text);

        if !status.is_success() {
            error!("Video room creation failed: {} - {}", status, text);
            return Err(SessionError::Upstream(format!("HTTP {}: {}", status, text)));
        }

        serde_json::from_str(&text)
            .map_err(|e| SessionError::Upstream(format!("Failed to parse room response: {}", e)))
    }

    /// Look up an existing room by name.
    /// GET {base}/rooms/{name}
    pub async fn get_room(&self, name: &str) -> Result<VideoRoom, SessionError> {
        let url = format!("{}/rooms/{}", self.base_url, name);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| SessionError::Upstream(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SessionError::Upstream(e.to_string()))?;

        if !status.is_success() {
            error!("Video room lookup failed: {} - {}", status, text);
            return Err(SessionError::Upstream(format!("HTTP {}: {}", status, text)));
        }

        serde_json::from_str(&text)
            .map_err(|e| SessionError::Upstream(format!("Failed to parse room response: {}", e)))
    }

    /// Mint a meeting token for one participant in one room. The room owner
    /// can admit participants and end the call.
    /// POST {base}/meeting-tokens
    pub async fn meeting_token(
        &self,
        room_name: &str,
        user_id: &str,
        is_owner: bool,
    ) -> Result<String, SessionError> {
        debug!("Minting meeting token for {} in room {}", user_id, room_name);

        let url = format!("{}/meeting-tokens", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "properties": {
                    "room_name": room_name,
                    "user_id": user_id,
                    "is_owner": is_owner
                }
            }))
            .send()
            .await
            .map_err(|e| SessionError::Upstream(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SessionError::Upstream(e.to_string()))?;

        if !status.is_success() {
            error!("Meeting token request failed: {} - {}", status, text);
            return Err(SessionError::Upstream(format!("HTTP {}: {}", status, text)));
        }

        let parsed: MeetingTokenResponse = serde_json::from_str(&text)
            .map_err(|e| SessionError::Upstream(format!("Failed to parse token response: {}", e)))?;
        Ok(parsed.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_url_embeds_the_room_name() {
        let url = VideoRoomClient::fallback_room_url("appointment-abc");
        assert_eq!(url, "https://meet.jit.si/appointment-abc");
    }
}
