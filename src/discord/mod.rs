//! Outbound side of the Discord integration.
//!
//! Handlers and tasks never talk to Serenity's HTTP client directly; they go
//! through [`MessageSink`], which keeps the dispatch core testable against an
//! in-memory recording sink. [`http_sink::HttpSink`] is the production
//! implementation.

pub mod http_sink;
pub mod long_message;
pub mod ready;

#[cfg(test)]
pub mod testing;

use serenity::all::{ChannelId, CreateEmbed, MessageId};
use serenity::async_trait;

use crate::error::AppError;

/// Handle to a message the bot has sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SentMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
}

/// Message to be sent to a channel.
#[derive(Debug, Clone, Default)]
pub struct OutgoingMessage {
    pub content: Option<String>,
    pub embeds: Vec<CreateEmbed>,
    /// Message to reply to, in the same channel.
    pub reply_to: Option<MessageId>,
}

impl OutgoingMessage {
    /// Plain text message.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn embed(mut self, embed: CreateEmbed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn reply_to(mut self, message_id: MessageId) -> Self {
        self.reply_to = Some(message_id);
        self
    }
}

/// Outbound channel operations used by handlers and tasks.
///
/// Deleting a message that no longer exists is not an error for any
/// implementation.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Sends a message and returns a handle to it.
    async fn send(
        &self,
        channel_id: ChannelId,
        message: OutgoingMessage,
    ) -> Result<SentMessage, AppError>;

    /// Replaces the text content of a sent message.
    async fn edit(&self, message: &SentMessage, content: &str) -> Result<(), AppError>;

    /// Deletes a single message.
    async fn delete(&self, message: &SentMessage) -> Result<(), AppError>;

    /// Deletes a set of messages from one channel.
    async fn delete_many(
        &self,
        channel_id: ChannelId,
        message_ids: &[MessageId],
    ) -> Result<(), AppError>;

    /// Adds a unicode emoji reaction to a message.
    async fn add_reaction(&self, message: &SentMessage, emoji: &str) -> Result<(), AppError>;
}
