use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{StoreError, SupabaseClient};

use crate::models::Notification;

/// Cap applied to inbox reads; older entries stay stored but are not listed.
const INBOX_PAGE_LIMIT: u32 = 50;

pub struct InboxService {
    supabase: SupabaseClient,
}

impl InboxService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// List the newest notifications for a user, optionally only unread ones.
    pub async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<Notification>, StoreError> {
        let mut path = format!(
            "/rest/v1/notifications?user_id=eq.{}&order=created_at.desc&limit={}",
            user_id, INBOX_PAGE_LIMIT
        );
        if unread_only {
            path.push_str("&read=eq.false");
        }

        self.supabase.select(&path).await
    }

    /// Flip the read flag on a notification owned by `user_id`. Returns
    /// `Ok(None)` when the notification does not exist or belongs to someone
    /// else; ownership is part of the filter, not a separate check.
    pub async fn mark_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> Result<Option<Notification>, StoreError> {
        debug!("Marking notification {} read for user {}", notification_id, user_id);

        let path = format!(
            "/rest/v1/notifications?id=eq.{}&user_id=eq.{}",
            notification_id, user_id
        );
        let mut updated: Vec<Notification> =
            self.supabase.update(&path, json!({ "read": true })).await?;

        if updated.is_empty() {
            Ok(None)
        } else {
            Ok(Some(updated.remove(0)))
        }
    }
}
