//! Conversations with the chat model.
//!
//! A conversation starts with a message that mentions the bot and continues
//! with replies to any message that belongs to it: the user's messages and the
//! bot's answers. Reacting with ❌ to one of those messages forgets the whole
//! conversation.

use chrono::{DateTime, TimeDelta, Utc};
use serenity::all::{ChannelId, MessageId};
use serenity::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    discord::{
        long_message::send_long_message, ready::ReadyGate, MessageSink, OutgoingMessage,
        SentMessage,
    },
    error::{openai::OpenAiError, AppError},
    model::{
        chat::ChatMessage,
        event::{IncomingMessage, IncomingReaction},
    },
    router::{
        handler::{Command, ReactionHandler},
        HandlerOptions,
    },
    service::openai::ChatBackend,
};

const SYSTEM_PROMPT: &str = "The assistant should be informative.";
const LOADING: &str = "⏳";
const MAX_IMAGES: usize = 5;
const UNAVAILABLE: &str = "Sorry I can't answer at the moment, try again later";
const FORGET_EMOJI: &str = "❌";
const FORGOTTEN_EMOJI: &str = "✅";

struct Conversation {
    id: u64,
    started_at: DateTime<Utc>,
    discord_messages: HashSet<MessageId>,
    messages: Vec<ChatMessage>,
}

/// Active conversations, shared by the chat command, its reaction handler and
/// the cleanup task.
#[derive(Default)]
pub struct ConversationStore {
    conversations: Mutex<Vec<Conversation>>,
    next_id: AtomicU64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the conversation `message_id` belongs to.
    pub async fn find(&self, message_id: MessageId) -> Option<u64> {
        self.conversations
            .lock()
            .await
            .iter()
            .find(|conversation| conversation.discord_messages.contains(&message_id))
            .map(|conversation| conversation.id)
    }

    /// Adds a user message to the conversation `message_id` belongs to, or to a
    /// new one, and returns the conversation id with its full history.
    pub async fn push_user_message(
        &self,
        message_id: MessageId,
        user_message: IncomingUserMessage,
        now: DateTime<Utc>,
    ) -> (u64, Vec<ChatMessage>) {
        let mut conversations = self.conversations.lock().await;

        let index = match conversations
            .iter()
            .position(|conversation| conversation.discord_messages.contains(&message_id))
        {
            Some(index) => index,
            None => {
                conversations.push(Conversation {
                    id: self.next_id.fetch_add(1, Ordering::SeqCst),
                    started_at: now,
                    discord_messages: HashSet::new(),
                    messages: vec![ChatMessage::system(SYSTEM_PROMPT)],
                });
                conversations.len() - 1
            }
        };

        let conversation = &mut conversations[index];
        conversation.discord_messages.insert(user_message.id);
        conversation.messages.push(user_message.message);

        (conversation.id, conversation.messages.clone())
    }

    /// Records the bot's response messages, and the answer if there was one.
    pub async fn push_response(&self, conversation_id: u64, sent: &[SentMessage], answer: Option<String>) {
        let mut conversations = self.conversations.lock().await;
        let Some(conversation) = conversations
            .iter_mut()
            .find(|conversation| conversation.id == conversation_id)
        else {
            tracing::debug!("Conversation {} expired before its answer arrived", conversation_id);
            return;
        };

        conversation
            .discord_messages
            .extend(sent.iter().map(|message| message.id));
        if let Some(answer) = answer {
            conversation.messages.push(ChatMessage::assistant(answer));
        }
    }

    /// Forgets the conversation `message_id` belongs to.
    ///
    /// # Returns
    /// - `true` - A conversation was removed
    /// - `false` - The message isn't part of any conversation
    pub async fn forget(&self, message_id: MessageId) -> bool {
        let mut conversations = self.conversations.lock().await;
        let before = conversations.len();
        conversations.retain(|conversation| !conversation.discord_messages.contains(&message_id));
        conversations.len() != before
    }

    /// Drops conversations started more than `max_age` before `now`.
    ///
    /// # Returns
    /// Number of conversations removed.
    pub async fn remove_older_than(&self, max_age: TimeDelta, now: DateTime<Utc>) -> usize {
        let mut conversations = self.conversations.lock().await;
        let before = conversations.len();
        conversations.retain(|conversation| now - conversation.started_at <= max_age);
        before - conversations.len()
    }

    pub async fn len(&self) -> usize {
        self.conversations.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.lock().await.is_empty()
    }
}

/// A user's Discord message converted for the chat model.
pub struct IncomingUserMessage {
    pub id: MessageId,
    pub message: ChatMessage,
}

/// Message id used to find the conversation a message continues.
fn conversation_key(message: &IncomingMessage) -> MessageId {
    message.reply_to.unwrap_or(message.id)
}

pub struct ChatCommand {
    options: HandlerOptions,
    ready: ReadyGate,
    backend: Arc<dyn ChatBackend>,
    conversations: Arc<ConversationStore>,
}

impl ChatCommand {
    pub fn new(
        ready: ReadyGate,
        backend: Arc<dyn ChatBackend>,
        conversations: Arc<ConversationStore>,
    ) -> Self {
        Self {
            options: HandlerOptions::new().allow_pm(),
            ready,
            backend,
            conversations,
        }
    }

    /// Content with a leading bot mention removed.
    fn prompt(&self, content: &str) -> String {
        let content = content.trim();
        let Some(bot) = self.ready.current() else {
            return content.to_string();
        };

        bot.mentions()
            .iter()
            .find_map(|mention| content.strip_prefix(mention.as_str()))
            .unwrap_or(content)
            .trim()
            .to_string()
    }

    fn mentions_bot(&self, content: &str) -> bool {
        let content = content.trim_start();
        self.ready.current().is_some_and(|bot| {
            bot.mentions()
                .iter()
                .any(|mention| content.starts_with(mention.as_str()))
        })
    }

    async fn answer_or_error(&self, history: &[ChatMessage], user: &str) -> Result<String, String> {
        match self.backend.complete(history, Some(user)).await {
            Ok(answer) => Ok(answer),
            Err(AppError::OpenAiErr(OpenAiError::ModerationFlagged(flags))) => Err(format!(
                "Your message violates the following content policies: {}",
                flags.join(", ")
            )),
            Err(e) => {
                tracing::error!("Unexpected chat completion error: {}", e);
                Err(UNAVAILABLE.to_string())
            }
        }
    }
}

#[async_trait]
impl Command for ChatCommand {
    fn name(&self) -> &str {
        "chat"
    }

    fn options(&self) -> &HandlerOptions {
        &self.options
    }

    async fn matches(&self, message: &IncomingMessage) -> bool {
        self.mentions_bot(&message.content)
            || self
                .conversations
                .find(conversation_key(message))
                .await
                .is_some()
    }

    async fn handle(
        &self,
        sink: &dyn MessageSink,
        channel_id: ChannelId,
        message: &IncomingMessage,
    ) -> Result<Option<SentMessage>, AppError> {
        let loading = if message.is_private() {
            None
        } else {
            Some(sink.send(channel_id, OutgoingMessage::text(LOADING)).await?)
        };

        let image_urls = message
            .attachments
            .iter()
            .filter(|attachment| attachment.is_image())
            .take(MAX_IMAGES)
            .map(|attachment| attachment.url.clone())
            .collect();

        let user_message = IncomingUserMessage {
            id: message.id,
            message: ChatMessage::user(self.prompt(&message.content), image_urls),
        };
        let (conversation_id, history) = self
            .conversations
            .push_user_message(conversation_key(message), user_message, Utc::now())
            .await;

        let answer = self.answer_or_error(&history, &message.author.name).await;

        if let Some(loading) = loading {
            if let Err(e) = sink.delete(&loading).await {
                tracing::warn!("Failed to delete loading message {}: {}", loading.id, e);
            }
        }

        let (sent, answer) = match answer {
            Ok(answer) => {
                let sent = send_long_message(sink, channel_id, &answer, Some(message.id)).await?;
                (sent, Some(answer))
            }
            Err(error_message) => {
                let reply = OutgoingMessage::text(error_message).reply_to(message.id);
                (vec![sink.send(channel_id, reply).await?], None)
            }
        };

        self.conversations
            .push_response(conversation_id, &sent, answer)
            .await;

        Ok(sent.first().copied())
    }
}

/// ❌ on a conversation message forgets that conversation.
pub struct ForgetConversationReaction {
    options: HandlerOptions,
    conversations: Arc<ConversationStore>,
}

impl ForgetConversationReaction {
    pub fn new(conversations: Arc<ConversationStore>) -> Self {
        Self {
            options: HandlerOptions::new().allow_pm(),
            conversations,
        }
    }
}

#[async_trait]
impl ReactionHandler for ForgetConversationReaction {
    fn name(&self) -> &str {
        "forget_conversation"
    }

    fn options(&self) -> &HandlerOptions {
        &self.options
    }

    fn emoji(&self) -> &[&str] {
        &[FORGET_EMOJI]
    }

    async fn handle(
        &self,
        sink: &dyn MessageSink,
        _channel_id: ChannelId,
        reaction: &IncomingReaction,
    ) -> Result<Option<SentMessage>, AppError> {
        let message = &reaction.message;
        if !self.conversations.forget(message.id).await {
            return Ok(None);
        }

        tracing::info!("{} ended a chat conversation", reaction.user.name);

        let reacted = SentMessage {
            id: message.id,
            channel_id: message.channel_id,
        };
        sink.add_reaction(&reacted, FORGOTTEN_EMOJI).await?;

        Ok(None)
    }
}
