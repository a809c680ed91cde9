//! [`MessageSink`] backed by Serenity's HTTP client.

use serenity::all::{ChannelId, CreateMessage, EditMessage, MessageId, ReactionType};
use serenity::async_trait;
use serenity::http::{Http, HttpError};
use std::sync::Arc;

use crate::{
    discord::{MessageSink, OutgoingMessage, SentMessage},
    error::AppError,
};

/// Sends, edits and deletes messages through the bot's Discord HTTP client.
///
/// The HTTP client is shared with the gateway client so that handlers and
/// background tasks reuse one rate limiter.
pub struct HttpSink {
    http: Arc<Http>,
}

impl HttpSink {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

/// Whether a Serenity error is Discord reporting the target as unknown.
fn is_not_found(err: &serenity::Error) -> bool {
    matches!(
        err,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404
    )
}

#[async_trait]
impl MessageSink for HttpSink {
    async fn send(
        &self,
        channel_id: ChannelId,
        message: OutgoingMessage,
    ) -> Result<SentMessage, AppError> {
        let mut builder = CreateMessage::new();
        if let Some(content) = message.content {
            builder = builder.content(content);
        }
        if !message.embeds.is_empty() {
            builder = builder.embeds(message.embeds);
        }
        if let Some(reply_to) = message.reply_to {
            builder = builder.reference_message((channel_id, reply_to));
        }

        let sent = channel_id.send_message(&self.http, builder).await?;

        Ok(SentMessage {
            id: sent.id,
            channel_id: sent.channel_id,
        })
    }

    async fn edit(&self, message: &SentMessage, content: &str) -> Result<(), AppError> {
        let edit_message = EditMessage::new().content(content);

        self.http
            .edit_message(message.channel_id, message.id, &edit_message, vec![])
            .await?;

        Ok(())
    }

    async fn delete(&self, message: &SentMessage) -> Result<(), AppError> {
        match self
            .http
            .delete_message(message.channel_id, message.id, None)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => {
                tracing::warn!(
                    "Message {} in channel {} was already deleted",
                    message.id,
                    message.channel_id
                );
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_many(
        &self,
        channel_id: ChannelId,
        message_ids: &[MessageId],
    ) -> Result<(), AppError> {
        // Bulk delete only accepts 2 to 100 messages
        match message_ids {
            [] => Ok(()),
            [message_id] => {
                self.delete(&SentMessage {
                    id: *message_id,
                    channel_id,
                })
                .await
            }
            _ => {
                for chunk in message_ids.chunks(100) {
                    let result = if let [message_id] = chunk {
                        self.http.delete_message(channel_id, *message_id, None).await
                    } else {
                        let map = serde_json::json!({ "messages": chunk });
                        self.http.delete_messages(channel_id, &map, None).await
                    };

                    match result {
                        Ok(()) => {}
                        Err(e) if is_not_found(&e) => {
                            tracing::warn!(
                                "Messages not found while trying to delete {:?} in channel {}",
                                chunk,
                                channel_id
                            );
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                Ok(())
            }
        }
    }

    async fn add_reaction(&self, message: &SentMessage, emoji: &str) -> Result<(), AppError> {
        let reaction = ReactionType::Unicode(emoji.to_string());

        self.http
            .create_reaction(message.channel_id, message.id, &reaction)
            .await?;

        Ok(())
    }
}
