//! Posting embeds through Discord webhooks.

use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: Option<&'a str>,
    embeds: [&'a Value; 1],
    username: &'a str,
    avatar_url: &'a str,
}

/// A Discord webhook posting under a fixed name and avatar.
pub struct Webhook {
    http: reqwest::Client,
    url: String,
    username: String,
    avatar_url: String,
}

impl Webhook {
    pub fn new(http: reqwest::Client, url: String, username: &str, avatar_url: &str) -> Self {
        Self {
            http,
            url,
            username: username.to_string(),
            avatar_url: avatar_url.to_string(),
        }
    }

    /// Posts a single embed.
    ///
    /// A rejected post is logged and not returned as an error, so one bad embed
    /// doesn't stop the ones after it.
    pub async fn post_embed(&self, embed: &Value) -> Result<(), AppError> {
        let payload = WebhookPayload {
            content: None,
            embeds: [embed],
            username: &self.username,
            avatar_url: &self.avatar_url,
        };

        let response = self.http.post(&self.url).json(&payload).send().await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            tracing::error!(
                "Error sending embed. Status code {}. Data: {}",
                status.as_u16(),
                serde_json::to_string(&payload)?
            );
        }

        Ok(())
    }
}
