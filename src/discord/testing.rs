//! In-memory stand-ins for Discord used by unit tests.

use serenity::all::{ChannelId, GuildId, MessageId, RoleId, UserId};
use serenity::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::{
    discord::{MessageSink, OutgoingMessage, SentMessage},
    error::AppError,
    model::event::{Author, IncomingMessage, IncomingReaction},
};

/// Guild used by event builders for non-private messages.
pub const TEST_GUILD: GuildId = GuildId::new(100);

/// Records every outbound operation instead of calling Discord.
///
/// Message ids are handed out sequentially starting at 1000.
pub struct RecordingSink {
    next_id: AtomicU64,
    fail_sends: AtomicBool,
    sent: Mutex<Vec<(SentMessage, OutgoingMessage)>>,
    edited: Mutex<Vec<(SentMessage, String)>>,
    deleted: Mutex<Vec<SentMessage>>,
    reactions: Mutex<Vec<(SentMessage, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1000),
            fail_sends: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
            edited: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            reactions: Mutex::new(Vec::new()),
        }
    }

    /// Makes every subsequent `send` fail.
    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<(SentMessage, OutgoingMessage)> {
        self.sent.lock().await.clone()
    }

    /// Text content of every sent message, in order.
    pub async fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|(_, message)| message.content.clone().unwrap_or_default())
            .collect()
    }

    pub async fn edited(&self) -> Vec<(SentMessage, String)> {
        self.edited.lock().await.clone()
    }

    pub async fn deleted(&self) -> Vec<SentMessage> {
        self.deleted.lock().await.clone()
    }

    pub async fn reactions(&self) -> Vec<(SentMessage, String)> {
        self.reactions.lock().await.clone()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send(
        &self,
        channel_id: ChannelId,
        message: OutgoingMessage,
    ) -> Result<SentMessage, AppError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(AppError::InternalError("send failed".to_string()));
        }

        let sent = SentMessage {
            id: MessageId::new(self.next_id.fetch_add(1, Ordering::SeqCst)),
            channel_id,
        };
        self.sent.lock().await.push((sent, message));
        Ok(sent)
    }

    async fn edit(&self, message: &SentMessage, content: &str) -> Result<(), AppError> {
        self.edited
            .lock()
            .await
            .push((*message, content.to_string()));
        Ok(())
    }

    async fn delete(&self, message: &SentMessage) -> Result<(), AppError> {
        self.deleted.lock().await.push(*message);
        Ok(())
    }

    async fn delete_many(
        &self,
        channel_id: ChannelId,
        message_ids: &[MessageId],
    ) -> Result<(), AppError> {
        let mut deleted = self.deleted.lock().await;
        deleted.extend(message_ids.iter().map(|id| SentMessage {
            id: *id,
            channel_id,
        }));
        Ok(())
    }

    async fn add_reaction(&self, message: &SentMessage, emoji: &str) -> Result<(), AppError> {
        self.reactions
            .lock()
            .await
            .push((*message, emoji.to_string()));
        Ok(())
    }
}

/// Builds a guild message from a human author.
pub fn guild_message(channel_id: u64, content: &str) -> IncomingMessage {
    IncomingMessage {
        id: MessageId::new(1),
        channel_id: ChannelId::new(channel_id),
        guild_id: Some(TEST_GUILD),
        author: Author {
            id: UserId::new(42),
            name: "tester".to_string(),
            bot: false,
        },
        content: content.to_string(),
        attachments: Vec::new(),
        reply_to: None,
        member_roles: Vec::new(),
    }
}

/// Builds a direct message from a human author.
pub fn direct_message(channel_id: u64, content: &str) -> IncomingMessage {
    IncomingMessage {
        guild_id: None,
        ..guild_message(channel_id, content)
    }
}

/// Builds a reaction by a human member on a guild message.
pub fn reaction(channel_id: u64, emoji: &str) -> IncomingReaction {
    IncomingReaction {
        message: guild_message(channel_id, "reacted to"),
        user: Author {
            id: UserId::new(43),
            name: "reactor".to_string(),
            bot: false,
        },
        emoji: emoji.to_string(),
        member_roles: Vec::new(),
    }
}

/// Role id helper for gating tests.
pub fn role(id: u64) -> RoleId {
    RoleId::new(id)
}
